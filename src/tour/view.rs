//! Read-boundary rendering of stored documents.

use bson::{Bson, Document as BsonDocument};
use serde_json::Value;

use crate::query::eval::as_f64_num;

pub const DURATION_WEEKS_FIELD: &str = "durationWeeks";
const DAYS_PER_WEEK: f64 = 7.0;

/// Relaxed extended JSON for a (possibly projected) tour document.
///
/// `durationWeeks` is derived from `duration` when the projection kept it.
#[must_use]
pub fn to_json(doc: &BsonDocument) -> Value {
    let weeks = doc
        .get("duration")
        .map(as_f64_num)
        .filter(|d| d.is_finite())
        .map(|d| d / DAYS_PER_WEEK);
    let mut value = Bson::Document(doc.clone()).into_relaxed_extjson();
    if let (Some(w), Value::Object(map)) = (weeks, &mut value) {
        map.insert(DURATION_WEEKS_FIELD.to_string(), Value::from(w));
    }
    value
}

/// Renders a batch of documents as a JSON array.
#[must_use]
pub fn to_json_array(docs: &[BsonDocument]) -> Value {
    Value::Array(docs.iter().map(to_json).collect())
}
