//! Partitioning of a track into query windows and batches

use serde::Serialize;

use alongtrack_core::error::{AlongTrackError, Result};
use alongtrack_core::models::{Filter, TrackPoint};

use crate::track::TrackModel;

/// Upper bound on search centers for one track
pub const MAX_WINDOWS: usize = 100_000;

/// One search center on the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryWindow {
    /// Along-track position of the center, in km
    pub km: f64,
    pub center: TrackPoint,
}

/// Consecutive windows sent to the geodata source as one query
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub index: usize,
    pub windows: Vec<QueryWindow>,
    pub radius_km: f64,
    pub include: Vec<Filter>,
}

/// Places search centers every `step_km` along a track and groups them
/// into batches covering roughly `batch_span_km` each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryWindower {
    step_km: f64,
    radius_km: f64,
    batch_span_km: f64,
}

impl QueryWindower {
    pub fn new(step_km: f64, radius_km: f64, batch_span_km: f64) -> Result<Self> {
        check_positive("step_km", step_km)?;
        check_positive("radius_km", radius_km)?;
        check_positive("batch_span_km", batch_span_km)?;
        Ok(Self {
            step_km,
            radius_km,
            batch_span_km,
        })
    }

    pub fn step_km(&self) -> f64 {
        self.step_km
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Number of windows per batch: `max(1, floor(batch_span / step))`
    pub fn windows_per_batch(&self) -> usize {
        ((self.batch_span_km / self.step_km).floor() as usize).max(1)
    }

    /// Search centers from the start up to and including the end of the
    /// track; the last center is clamped to the total length.
    ///
    /// Fails with `InvalidParameters` when the step would place more than
    /// [`MAX_WINDOWS`] centers on the track.
    pub fn windows(&self, track: &TrackModel) -> Result<Vec<QueryWindow>> {
        let total = track.total_length_km();
        let steps = self.step_count(total)?;

        Ok((0..=steps)
            .map(|i| {
                let km = (i as f64 * self.step_km).min(total);
                QueryWindow {
                    km,
                    center: track.point_at_distance(km),
                }
            })
            .collect())
    }

    fn step_count(&self, total_km: f64) -> Result<usize> {
        let steps = (total_km / self.step_km).ceil();
        if !steps.is_finite() || steps >= MAX_WINDOWS as f64 {
            return Err(AlongTrackError::invalid_parameter(
                "step_km",
                format!(
                    "step of {} km over {:.1} km exceeds {} query windows",
                    self.step_km, total_km, MAX_WINDOWS
                ),
            ));
        }
        Ok(steps as usize)
    }

    /// Group the track's windows into batches sharing the radius and the
    /// full inclusion filter list.
    pub fn batches(&self, track: &TrackModel, include: &[Filter]) -> Result<Vec<Batch>> {
        let windows = self.windows(track)?;
        let per_batch = self.windows_per_batch();

        let batches: Vec<Batch> = windows
            .chunks(per_batch)
            .enumerate()
            .map(|(index, chunk)| Batch {
                index,
                windows: chunk.to_vec(),
                radius_km: self.radius_km,
                include: include.to_vec(),
            })
            .collect();

        tracing::info!(
            length_km = track.total_length_km(),
            windows = windows.len(),
            batches = batches.len(),
            per_batch,
            "Partitioned track into query batches"
        );

        Ok(batches)
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AlongTrackError::invalid_parameter(
            name,
            format!("must be a positive number, got {}", value),
        ))
    }
}
