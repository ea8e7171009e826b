//! Overpass QL query construction

use std::fmt::Write;

use alongtrack_geo::Batch;

/// OSM element types searched for every inclusion filter
pub const ELEMENT_TYPES: &[&str] = &["node", "way", "relation"];

/// Server-side timeout requested in the query header, in seconds
pub const QUERY_TIMEOUT_SECS: u32 = 60;

/// Build one Overpass QL union query for a batch.
///
/// There is one `around` clause per inclusion filter, window center and
/// element type. Non-point elements are returned with their center.
pub fn build_query(batch: &Batch) -> String {
    let radius_m = batch.radius_km * 1000.0;

    let mut query = format!("[out:json][timeout:{}];\n(\n", QUERY_TIMEOUT_SECS);
    for filter in &batch.include {
        let key = escape(&filter.key);
        let value = escape(&filter.value);
        for window in &batch.windows {
            for element_type in ELEMENT_TYPES {
                // Writing to a String cannot fail
                let _ = writeln!(
                    query,
                    "  {}[\"{}\"=\"{}\"](around:{},{},{});",
                    element_type, key, value, radius_m, window.center.lat, window.center.lon
                );
            }
        }
    }
    query.push_str(");\nout center tags;\n");
    query
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
