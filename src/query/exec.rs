use bson::Document as BsonDocument;

use super::eval::{apply_projection, compare_docs, eval_filter};
use super::types::ListQuery;

/// Runs a refined query over an in-memory document set.
///
/// Filter first, then a stable sort, then the skip/limit window, then projection;
/// sorting sees fields the projection later removes.
pub fn find_docs<'a, I>(docs: I, query: &ListQuery) -> Vec<BsonDocument>
where
    I: IntoIterator<Item = &'a BsonDocument>,
{
    let mut hits: Vec<&BsonDocument> =
        docs.into_iter().filter(|d| eval_filter(d, &query.filter)).collect();
    if !query.sort.is_empty() {
        hits.sort_by(|a, b| compare_docs(a, b, &query.sort));
    }
    let limit = query.limit.unwrap_or(usize::MAX);
    hits.into_iter()
        .skip(query.skip)
        .take(limit)
        .map(|d| apply_projection(d, &query.projection))
        .collect()
}
