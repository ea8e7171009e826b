//! Named filter presets and filter resolution
//!
//! A run's active filters are the union of the base configuration rules, the
//! rules of every requested preset and the caller's own rules. Duplicates are
//! dropped (first occurrence wins) and every rule is validated before any
//! query is built.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{AlongTrackError, Result};
use crate::models::{Filter, FilterSet};

/// Named bundle of inclusion/exclusion rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// All presets known to the application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetCatalog {
    #[serde(default)]
    presets: BTreeMap<String, Preset>,
}

impl PresetCatalog {
    pub fn new(presets: BTreeMap<String, Preset>) -> Self {
        Self { presets }
    }

    /// Parse a catalog from TOML with one `[presets.<name>]` table per preset
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AlongTrackError::ConfigInvalid {
            key: "presets".to_string(),
            reason: format!("Failed to parse presets TOML: {}", e),
        })
    }

    /// Load a catalog from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| AlongTrackError::ConfigInvalid {
                key: "presets_file".to_string(),
                reason: format!(
                    "Failed to read presets file {}: {}",
                    path.as_ref().display(),
                    e
                ),
            })?;
        Self::from_toml_str(&content)
    }

    /// Load a catalog, returning an empty one when the file does not exist
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            tracing::warn!(path = %path.as_ref().display(), "Presets file not found, no presets available");
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Preset)> {
        self.presets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// Filter sources merged into one run's [`FilterSet`]
#[derive(Debug, Clone, Default)]
pub struct FilterRequest<'a> {
    pub base_include: &'a [String],
    pub base_exclude: &'a [String],
    pub presets: &'a [String],
    pub include: &'a [String],
    pub exclude: &'a [String],
}

/// Merge base rules, presets and caller rules, then validate every rule.
///
/// Fails with `InvalidFilterSyntax` on an unknown preset name or a malformed
/// rule.
pub fn resolve_filters(catalog: &PresetCatalog, request: &FilterRequest<'_>) -> Result<FilterSet> {
    let mut include: Vec<&str> = request.base_include.iter().map(String::as_str).collect();
    let mut exclude: Vec<&str> = request.base_exclude.iter().map(String::as_str).collect();

    for name in request.presets {
        let preset = catalog.get(name).ok_or_else(|| {
            AlongTrackError::invalid_filter(
                format!("preset:{}", name),
                format!("preset '{}' not found", name),
            )
        })?;
        include.extend(preset.include.iter().map(String::as_str));
        exclude.extend(preset.exclude.iter().map(String::as_str));
    }

    include.extend(request.include.iter().map(String::as_str));
    exclude.extend(request.exclude.iter().map(String::as_str));

    let filters = FilterSet::new(parse_unique(&include)?, parse_unique(&exclude)?);

    tracing::debug!(
        include = filters.include.len(),
        exclude = filters.exclude.len(),
        "Resolved filters"
    );

    Ok(filters)
}

fn parse_unique(raw: &[&str]) -> Result<Vec<Filter>> {
    let mut filters: Vec<Filter> = Vec::with_capacity(raw.len());
    for s in raw {
        let filter = Filter::parse(s)?;
        if !filters.contains(&filter) {
            filters.push(filter);
        }
    }
    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PresetCatalog {
        PresetCatalog::from_toml_str(
            r#"
[presets.camping]
include = ["tourism=camp_site", "tourism=caravan_site"]
exclude = ["access=private"]

[presets.water]
include = ["amenity=drinking_water", "tourism=camp_site"]
"#,
        )
        .unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_catalog_names() {
        let catalog = catalog();
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["camping", "water"]);
    }

    #[test]
    fn test_resolve_unions_in_order_without_duplicates() {
        let base = strings(&["shop=bakery"]);
        let presets = strings(&["camping", "water"]);
        let include = strings(&["shop=bakery", "amenity=shelter"]);

        let filters = resolve_filters(
            &catalog(),
            &FilterRequest {
                base_include: &base,
                presets: &presets,
                include: &include,
                ..Default::default()
            },
        )
        .unwrap();

        let labels: Vec<String> = filters.include.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "shop=bakery",
                "tourism=camp_site",
                "tourism=caravan_site",
                "amenity=drinking_water",
                "amenity=shelter",
            ]
        );
        assert_eq!(filters.exclude, vec![Filter::new("access", "private")]);
    }

    #[test]
    fn test_resolve_unknown_preset() {
        let presets = strings(&["nope"]);
        let err = resolve_filters(
            &catalog(),
            &FilterRequest {
                presets: &presets,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AlongTrackError::InvalidFilterSyntax { .. }));
    }

    #[test]
    fn test_resolve_rejects_malformed_rule() {
        for bad in ["amenity", "=value"] {
            let include = strings(&[bad]);
            let err = resolve_filters(
                &catalog(),
                &FilterRequest {
                    include: &include,
                    ..Default::default()
                },
            )
            .unwrap_err();
            assert!(matches!(err, AlongTrackError::InvalidFilterSyntax { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_resolve_rejects_malformed_exclude() {
        let exclude = strings(&["access="]);
        assert!(resolve_filters(
            &catalog(),
            &FilterRequest {
                exclude: &exclude,
                ..Default::default()
            },
        )
        .is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(PresetCatalog::from_toml_str("[presets.x]\ninclude = 3").is_err());
    }
}
