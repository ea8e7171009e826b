//! Exclusion, radius and inclusion-label rules turning candidates into rows

use alongtrack_core::models::poi::{OPENING_HOURS_KEYS, PHONE_KEYS, UNNAMED, WEBSITE_KEYS};
use alongtrack_core::models::{poi::round2, Candidate, FilterSet, ResolvedPoi, TrackPoint};
use alongtrack_geo::{TrackModel, TrackProjector};

/// Resolves candidates against a track and the active filters.
pub struct FilterEngine<'a> {
    projector: TrackProjector<'a>,
    filters: &'a FilterSet,
}

impl<'a> FilterEngine<'a> {
    pub fn new(track: &'a TrackModel, radius_km: f64, filters: &'a FilterSet) -> Self {
        Self {
            projector: TrackProjector::new(track, radius_km),
            filters,
        }
    }

    /// Resolve a single candidate.
    ///
    /// Exclusion is checked before any distance work; candidates beyond the
    /// radius are dropped. A candidate that matches no inclusion rule is still
    /// admitted with an empty label.
    pub fn resolve_one(&self, candidate: &Candidate) -> Option<ResolvedPoi> {
        if self.filters.is_excluded(&candidate.tags) {
            return None;
        }

        let projection = self
            .projector
            .project(TrackPoint::new(candidate.lon, candidate.lat))?;

        let tags = &candidate.tags;
        Some(ResolvedPoi {
            id: candidate.id.clone(),
            name: tags.first_of_or(&["name"], UNNAMED),
            lat: candidate.lat,
            lon: candidate.lon,
            km_from_start: round2(projection.along_track_km),
            distance_from_track_km: round2(projection.distance_km),
            matching_filter: self
                .filters
                .matching_include(tags)
                .map(|f| f.to_string())
                .unwrap_or_default(),
            website: tags.first_of_or(WEBSITE_KEYS, ""),
            phone: tags.first_of_or(PHONE_KEYS, ""),
            opening_hours: tags.first_of_or(OPENING_HOURS_KEYS, ""),
            tags: tags.clone(),
        })
    }

    /// Resolve all candidates into the final table: rows with identical
    /// content are collapsed and the rest stable-sorted by along-track km.
    pub fn resolve(&self, candidates: &[Candidate]) -> Vec<ResolvedPoi> {
        let mut rows: Vec<ResolvedPoi> = Vec::new();
        for row in candidates.iter().filter_map(|c| self.resolve_one(c)) {
            if !rows.iter().any(|r| r.same_row(&row)) {
                rows.push(row);
            }
        }

        rows.sort_by(|a, b| a.km_from_start.total_cmp(&b.km_from_start));

        tracing::debug!(
            candidates = candidates.len(),
            admitted = rows.len(),
            "Filtered candidates"
        );
        rows
    }
}
