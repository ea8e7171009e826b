//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::models::{Job, JobId, ResolvedPoi, TrackPoint};

/// Port for decoding a caller-supplied track into ordered points
pub trait TrackDecoder: Send + Sync {
    /// Decode raw file content into (lon, lat) points in track order
    fn decode(&self, data: &[u8]) -> Result<Vec<TrackPoint>>;

    /// Decode a track stored on disk
    fn decode_file(&self, path: &Path) -> Result<Vec<TrackPoint>> {
        let data = std::fs::read(path)?;
        self.decode(&data)
    }
}

/// Port for posting a query to one geodata endpoint
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Post `query` to `endpoint` and return the raw response body.
    ///
    /// Any non-success status must be reported as an error.
    async fn post(&self, endpoint: &str, query: &str) -> Result<String>;
}

/// Port for writing the result table
pub trait TableSink: Send + Sync {
    fn export(&self, rows: &[ResolvedPoi], path: &Path) -> Result<()>;

    /// File extension written by this sink, without the dot
    fn extension(&self) -> &str;
}

/// Marker colours for rendered maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub track_color: String,
    pub default_marker_color: String,

    /// Colours assigned by inclusion rule rank, cycled when exhausted
    pub palette: Vec<String>,

    /// Inclusion labels in rank order
    pub ranked_labels: Vec<String>,
}

impl ColorScheme {
    /// Colour for a POI with the given matching-filter label
    pub fn marker_color(&self, label: &str) -> &str {
        if label.is_empty() || self.palette.is_empty() {
            return &self.default_marker_color;
        }
        match self.ranked_labels.iter().position(|l| l == label) {
            Some(rank) => &self.palette[rank % self.palette.len()],
            None => &self.default_marker_color,
        }
    }
}

/// Port for rendering the track and its POIs onto a map
pub trait MapRenderer: Send + Sync {
    fn render(
        &self,
        track: &[TrackPoint],
        rows: &[ResolvedPoi],
        colors: &ColorScheme,
        title: &str,
        path: &Path,
    ) -> Result<()>;

    /// File extension written by this renderer, without the dot
    fn extension(&self) -> &str;
}

/// Port for delivering job progress to subscribers.
///
/// Delivery is best effort. Callers catch and log errors, they never
/// propagate them into the pipeline.
pub trait ProgressNotifier: Send + Sync {
    fn notify(&self, job_id: JobId, percent: u8, message: &str) -> Result<()>;

    /// Deliver a full job snapshot
    fn snapshot(&self, _job: &Job) -> Result<()> {
        Ok(())
    }
}

/// Notifier that drops every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ProgressNotifier for NoopNotifier {
    fn notify(&self, _job_id: JobId, _percent: u8, _message: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme() -> ColorScheme {
        ColorScheme {
            track_color: "blue".to_string(),
            default_marker_color: "gray".to_string(),
            palette: vec!["orange".to_string(), "purple".to_string()],
            ranked_labels: vec![
                "tourism=camp_site".to_string(),
                "amenity=shelter".to_string(),
                "shop=bakery".to_string(),
            ],
        }
    }

    #[test]
    fn test_marker_color_by_rank() {
        let colors = scheme();
        assert_eq!(colors.marker_color("tourism=camp_site"), "orange");
        assert_eq!(colors.marker_color("amenity=shelter"), "purple");
    }

    #[test]
    fn test_marker_color_cycles_palette() {
        assert_eq!(scheme().marker_color("shop=bakery"), "orange");
    }

    #[test]
    fn test_marker_color_default_for_unlabeled() {
        let colors = scheme();
        assert_eq!(colors.marker_color(""), "gray");
        assert_eq!(colors.marker_color("amenity=toilets"), "gray");
    }
}
