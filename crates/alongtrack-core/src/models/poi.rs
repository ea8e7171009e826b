use serde::{Deserialize, Serialize};

use super::Tags;

/// Name used when a POI carries no `name` tag
pub const UNNAMED: &str = "Unnamed";

/// Tag keys tried in order for each contact field
pub const WEBSITE_KEYS: &[&str] = &["website", "contact:website", "url"];
pub const PHONE_KEYS: &[&str] = &["phone", "contact:phone", "contact:mobile"];
pub const OPENING_HOURS_KEYS: &[&str] = &["opening_hours"];

/// Admitted POI with its position relative to the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoi {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,

    /// Along-track distance from the start, km (2 decimals)
    pub km_from_start: f64,

    /// Distance to the nearest track segment, km (2 decimals)
    pub distance_from_track_km: f64,

    /// `key=value` of the first matching inclusion rule, empty if none matched
    pub matching_filter: String,

    pub website: String,
    pub phone: String,
    pub opening_hours: String,
    pub tags: Tags,
}

impl ResolvedPoi {
    /// True when the row has the same content as `other`, ignoring the source id.
    ///
    /// Two elements with different ids but identical tags and position produce
    /// the same table row; the final result keeps only one of them.
    pub fn same_row(&self, other: &Self) -> bool {
        self.name == other.name
            && self.lat == other.lat
            && self.lon == other.lon
            && self.km_from_start == other.km_from_start
            && self.distance_from_track_km == other.distance_from_track_km
            && self.matching_filter == other.matching_filter
            && self.website == other.website
            && self.phone == other.phone
            && self.opening_hours == other.opening_hours
            && self.tags == other.tags
    }
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(0.0), 0.0);
    }
}
