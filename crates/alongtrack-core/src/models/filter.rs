use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Tags;
use crate::error::{AlongTrackError, Result};

/// Tag equality rule written as `key=value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Filter {
    pub key: String,
    pub value: String,
}

impl Filter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse and validate a `key=value` filter string.
    ///
    /// Only the first `=` separates key from value, so `name=a=b` is a valid
    /// filter with value `a=b`. Both sides are trimmed and must be non-empty.
    pub fn parse(raw: &str) -> Result<Self> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| AlongTrackError::invalid_filter(raw, "expected key=value"))?;

        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return Err(AlongTrackError::invalid_filter(raw, "empty key or value"));
        }

        Ok(Self::new(key, value))
    }
}

impl FromStr for Filter {
    type Err = AlongTrackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Filter {
    type Error = AlongTrackError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Filter> for String {
    fn from(filter: Filter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Active inclusion and exclusion rules for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub include: Vec<Filter>,
    pub exclude: Vec<Filter>,
}

impl FilterSet {
    pub fn new(include: Vec<Filter>, exclude: Vec<Filter>) -> Self {
        Self { include, exclude }
    }

    /// True if any exclusion rule matches a present tag.
    pub fn is_excluded(&self, tags: &Tags) -> bool {
        self.exclude.iter().any(|f| tags.matches(f))
    }

    /// First inclusion rule (in merge order) matching the tags.
    pub fn matching_include(&self, tags: &Tags) -> Option<&Filter> {
        self.include.iter().find(|f| tags.matches(f))
    }
}
