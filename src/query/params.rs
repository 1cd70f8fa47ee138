//! Untyped request parameters and their coercion into typed filter values.

use bson::Bson;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One request parameter: a single value or a repeated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// The value a single-valued reader should use (the last one given).
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        match self {
            Self::One(s) => Some(s.as_str()),
            Self::Many(v) => v.last().map(String::as_str),
        }
    }

    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(s) => vec![s.as_str()],
            Self::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

/// Request query parameters keyed by raw name (`duration[gte]`, `sort`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(pub BTreeMap<String, ParamValue>);

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from key/value pairs; a repeated key becomes `Many`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut out = Self::new();
        for (k, v) in pairs {
            out.append(k.into(), v.into());
        }
        out
    }

    /// Parses an `application/x-www-form-urlencoded` query string.
    #[must_use]
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()).into_owned())
    }

    pub fn append(&mut self, key: String, value: String) {
        match self.0.remove(&key) {
            None => {
                self.0.insert(key, ParamValue::One(value));
            }
            Some(ParamValue::One(prev)) => {
                self.0.insert(key, ParamValue::Many(vec![prev, value]));
            }
            Some(ParamValue::Many(mut prev)) => {
                prev.push(value);
                self.0.insert(key, ParamValue::Many(prev));
            }
        }
    }

    /// Replaces any existing value for `key`.
    pub fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), ParamValue::from(value));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }
}

/// Types a raw parameter string: integer, float, boolean, ISO date, else string.
#[must_use]
pub fn coerce_value(raw: &str) -> Bson {
    let s = raw.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Bson::Int64(i);
    }
    if let Ok(f) = s.parse::<f64>()
        && f.is_finite()
    {
        return Bson::Double(f);
    }
    match s {
        "true" => return Bson::Boolean(true),
        "false" => return Bson::Boolean(false),
        _ => {}
    }
    if let Some(ms) = parse_timestamp_millis(s) {
        return Bson::DateTime(bson::DateTime::from_millis(ms));
    }
    Bson::String(raw.to_string())
}

/// Milliseconds since the epoch for `YYYY-MM-DD`, `YYYY-MM-DD,HH:MM`, naive or RFC 3339 date-times (UTC).
#[must_use]
pub fn parse_timestamp_millis(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d,%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc().timestamp_millis())
}
