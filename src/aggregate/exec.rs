use bson::{Bson, Document as BsonDocument};
use chrono::Datelike;
use std::cmp::Ordering;

use super::stage::{Accumulator, Expr, Pipeline, Stage};
use crate::errors::CatalogError;
use crate::query::Projection;
use crate::query::eval::{as_f64_num, bson_eq, compare_bson, compare_docs, eval_filter, get_path};

/// Executes `pipeline` over `docs` in memory.
///
/// # Errors
/// `Store` when an expression meets a value it cannot evaluate (e.g. `Month` of a string).
pub fn run_pipeline<I>(docs: I, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, CatalogError>
where
    I: IntoIterator<Item = BsonDocument>,
{
    let mut records: Vec<BsonDocument> = docs.into_iter().collect();
    for stage in &pipeline.stages {
        records = match stage {
            Stage::Match(filter) => records.into_iter().filter(|d| eval_filter(d, filter)).collect(),
            Stage::Group { key, fields } => group(records, key, fields)?,
            Stage::Sort(sort) => {
                records.sort_by(|a, b| compare_docs(a, b, sort));
                records
            }
            Stage::Unwind(path) => unwind(records, path),
            Stage::AddFields(fields) => {
                for rec in &mut records {
                    for (name, expr) in fields {
                        if let Some(v) = eval_expr(rec, expr)? {
                            rec.insert(name.clone(), v);
                        }
                    }
                }
                records
            }
            Stage::Project(projection) => records.into_iter().map(|r| project(r, projection)).collect(),
            Stage::Limit(n) => {
                records.truncate(*n);
                records
            }
        };
    }
    Ok(records)
}

pub(crate) fn eval_expr(doc: &BsonDocument, expr: &Expr) -> Result<Option<Bson>, CatalogError> {
    Ok(match expr {
        Expr::Field(path) => get_path(doc, path).cloned(),
        Expr::ToUpper(inner) => Some(Bson::String(match eval_expr(doc, inner)? {
            None | Some(Bson::Null) => String::new(),
            Some(Bson::String(s)) => s.to_uppercase(),
            Some(other) => other.to_string().to_uppercase(),
        })),
        Expr::Month(inner) => match eval_expr(doc, inner)? {
            None | Some(Bson::Null) => Some(Bson::Null),
            Some(Bson::DateTime(dt)) => {
                let month = chrono::DateTime::from_timestamp_millis(dt.timestamp_millis())
                    .map(|d| d.month())
                    .ok_or_else(|| CatalogError::Store(format!("date out of range: {dt}")))?;
                Some(Bson::Int32(i32::try_from(month).unwrap_or_default()))
            }
            Some(other) => {
                return Err(CatalogError::Store(format!(
                    "can't convert from BSON type {:?} to Date",
                    other.element_type()
                )));
            }
        },
    })
}

enum AccState {
    Count(i64),
    Sum { int: i64, float: f64, all_int: bool },
    Avg { sum: f64, n: u64 },
    Min(Option<Bson>),
    Max(Option<Bson>),
    Push(Vec<Bson>),
}

impl AccState {
    fn new(acc: &Accumulator) -> Self {
        match acc {
            Accumulator::Count => Self::Count(0),
            Accumulator::Sum(_) => Self::Sum { int: 0, float: 0.0, all_int: true },
            Accumulator::Avg(_) => Self::Avg { sum: 0.0, n: 0 },
            Accumulator::Min(_) => Self::Min(None),
            Accumulator::Max(_) => Self::Max(None),
            Accumulator::Push(_) => Self::Push(Vec::new()),
        }
    }

    fn feed(&mut self, acc: &Accumulator, doc: &BsonDocument) -> Result<(), CatalogError> {
        let value = match acc {
            Accumulator::Count => None,
            Accumulator::Sum(e)
            | Accumulator::Avg(e)
            | Accumulator::Min(e)
            | Accumulator::Max(e)
            | Accumulator::Push(e) => eval_expr(doc, e)?,
        };
        match (self, value) {
            (Self::Count(n), _) => *n += 1,
            (Self::Sum { int, float, all_int }, Some(v)) => match v {
                Bson::Int32(i) => *int = int.saturating_add(i64::from(i)),
                Bson::Int64(i) => *int = int.saturating_add(i),
                Bson::Double(d) => {
                    *float += d;
                    *all_int = false;
                }
                _ => {}
            },
            (Self::Avg { sum, n }, Some(v)) if matches!(v, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => {
                *sum += as_f64_num(&v);
                *n += 1;
            }
            (Self::Min(cur), Some(v)) if v != Bson::Null => {
                if cur.as_ref().is_none_or(|c| compare_bson(&v, c) == Ordering::Less) {
                    *cur = Some(v);
                }
            }
            (Self::Max(cur), Some(v)) if v != Bson::Null => {
                if cur.as_ref().is_none_or(|c| compare_bson(&v, c) == Ordering::Greater) {
                    *cur = Some(v);
                }
            }
            (Self::Push(items), v) => items.push(v.unwrap_or(Bson::Null)),
            _ => {}
        }
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> Bson {
        match self {
            Self::Count(n) => i32::try_from(n).map_or(Bson::Int64(n), Bson::Int32),
            Self::Sum { int, all_int: true, .. } => Bson::Int64(int),
            Self::Sum { int, float, .. } => Bson::Double(float + int as f64),
            Self::Avg { n: 0, .. } => Bson::Null,
            Self::Avg { sum, n } => Bson::Double(sum / n as f64),
            Self::Min(v) | Self::Max(v) => v.unwrap_or(Bson::Null),
            Self::Push(items) => Bson::Array(items),
        }
    }
}

fn group(
    records: Vec<BsonDocument>,
    key: &Expr,
    fields: &[(String, Accumulator)],
) -> Result<Vec<BsonDocument>, CatalogError> {
    // First-seen order keeps output deterministic for equal inputs.
    let mut groups: Vec<(Bson, Vec<AccState>)> = Vec::new();
    for rec in &records {
        let k = eval_expr(rec, key)?.unwrap_or(Bson::Null);
        let idx = match groups.iter().position(|(g, _)| bson_eq(g, &k)) {
            Some(i) => i,
            None => {
                groups.push((k, fields.iter().map(|(_, a)| AccState::new(a)).collect()));
                groups.len() - 1
            }
        };
        for (state, (_, acc)) in groups[idx].1.iter_mut().zip(fields) {
            state.feed(acc, rec)?;
        }
    }
    Ok(groups
        .into_iter()
        .map(|(k, states)| {
            let mut out = BsonDocument::new();
            out.insert("_id", k);
            for (state, (name, _)) in states.into_iter().zip(fields) {
                out.insert(name.clone(), state.finish());
            }
            out
        })
        .collect())
}

fn unwind(records: Vec<BsonDocument>, path: &str) -> Vec<BsonDocument> {
    let mut out = Vec::with_capacity(records.len());
    for rec in records {
        match rec.get(path) {
            Some(Bson::Array(items)) => {
                for item in items.clone() {
                    let mut copy = rec.clone();
                    copy.insert(path.to_string(), item);
                    out.push(copy);
                }
            }
            None | Some(Bson::Null) => {}
            Some(_) => out.push(rec),
        }
    }
    out
}

fn project(mut rec: BsonDocument, projection: &Projection) -> BsonDocument {
    match projection {
        Projection::Default => rec,
        Projection::Exclude(fields) => {
            for f in fields {
                rec.remove(f);
            }
            rec
        }
        Projection::Include(fields) => {
            let mut out = BsonDocument::new();
            if let Some(id) = rec.remove("_id") {
                out.insert("_id", id);
            }
            for f in fields {
                if let Some(v) = rec.remove(f) {
                    out.insert(f.clone(), v);
                }
            }
            out
        }
    }
}
