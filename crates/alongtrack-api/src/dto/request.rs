use axum::extract::Multipart;

use crate::error::ApiError;

/// Fields of a `POST /api/process` multipart form
#[derive(Debug, Default)]
pub struct ProcessForm {
    pub filename: Option<String>,
    pub data: Vec<u8>,
    pub project_name: Option<String>,
    pub radius_km: Option<f64>,
    pub step_km: Option<f64>,
    pub presets: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ProcessForm {
    /// Read every field of the form.
    ///
    /// List fields may repeat; each value is kept whole, since OSM tag
    /// values such as `cuisine=pizza;burger` contain semicolons. Unknown
    /// fields are ignored.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            ApiError::bad_request("Failed to parse multipart form").with_details(e.to_string())
        })? {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" {
                form.filename = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    ApiError::bad_request("Failed to read file data").with_details(e.to_string())
                })?;
                form.data = data.to_vec();
                continue;
            }

            let value = field.text().await.map_err(|e| {
                ApiError::bad_request(format!("Failed to read field '{}'", name))
                    .with_details(e.to_string())
            })?;
            let value = value.trim();

            match name.as_str() {
                "project_name" if !value.is_empty() => form.project_name = Some(value.to_string()),
                "radius_km" if !value.is_empty() => form.radius_km = Some(parse_number(&name, value)?),
                "step_km" if !value.is_empty() => form.step_km = Some(parse_number(&name, value)?),
                "preset" | "presets" if !value.is_empty() => form.presets.push(value.to_string()),
                "include" if !value.is_empty() => form.include.push(value.to_string()),
                "exclude" if !value.is_empty() => form.exclude.push(value.to_string()),
                _ => {}
            }
        }

        Ok(form)
    }
}

fn parse_number(name: &str, value: &str) -> Result<f64, ApiError> {
    value.parse::<f64>().map_err(|_| {
        ApiError::bad_request(format!("Invalid value for '{}'", name))
            .with_details(format!("'{}' is not a number", value))
    })
}
