use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Filter;

/// Free-form key/value tags attached to a geodata element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Look up keys in priority order; the first present, non-empty value wins.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key).filter(|value| !value.is_empty()))
    }

    /// Like [`Tags::first_of`], falling back to `default` when no key is present.
    pub fn first_of_or(&self, keys: &[&str], default: &str) -> String {
        self.first_of(keys).unwrap_or(default).to_string()
    }

    /// Exact key/value equality against a filter
    pub fn matches(&self, filter: &Filter) -> bool {
        self.get(&filter.key) == Some(filter.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Unfiltered POI returned by the geodata source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Source identifier, prefixed with the element type (e.g. "N123", "W42")
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub tags: Tags,
}

impl Candidate {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, tags: Tags) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camp_tags() -> Tags {
        [
            ("tourism", "camp_site"),
            ("contact:website", "https://camp.example"),
            ("phone", ""),
            ("contact:phone", "+49 123"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_first_of_uses_priority_order() {
        let tags = camp_tags();
        assert_eq!(
            tags.first_of(&["website", "contact:website", "url"]),
            Some("https://camp.example")
        );
    }

    #[test]
    fn test_first_of_skips_empty_values() {
        let tags = camp_tags();
        assert_eq!(tags.first_of(&["phone", "contact:phone"]), Some("+49 123"));
    }

    #[test]
    fn test_first_of_or_default() {
        let tags = camp_tags();
        assert_eq!(tags.first_of_or(&["name"], "Unnamed"), "Unnamed");
    }

    #[test]
    fn test_matches_is_exact() {
        let tags = camp_tags();
        assert!(tags.matches(&Filter::new("tourism", "camp_site")));
        assert!(!tags.matches(&Filter::new("tourism", "camp")));
        assert!(!tags.matches(&Filter::new("amenity", "camp_site")));
    }

    #[test]
    fn test_display_is_sorted() {
        let tags: Tags = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(tags.to_string(), "a=1; b=2");
    }
}
