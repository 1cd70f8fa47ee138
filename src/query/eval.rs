use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{
    CmpOp, Filter, MAX_IN_SET, MAX_PATH_DEPTH, MAX_PROJECTION_FIELDS, MAX_SORT_FIELDS, Order,
    Projection, REVISION_FIELD, CREATED_AT_FIELD, SortSpec,
};

pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Not(f) => !eval_filter(doc, f),
        Filter::In { path, values } => get_path(doc, path).is_some_and(|v| is_in_set(v, values)),
        Filter::Cmp { path, op: CmpOp::Ne, value } => {
            !get_path(doc, path).is_some_and(|v| matches_eq(v, value))
        }
        Filter::Cmp { path, op, value } => get_path(doc, path).is_some_and(|v| match v {
            // Array fields match when any element satisfies the comparison.
            Bson::Array(items) if !matches!(value, Bson::Array(_)) => {
                items.iter().any(|x| cmp_scalar(x, *op, value))
            }
            v => cmp_scalar(v, *op, value),
        }),
    }
}

fn cmp_scalar(v: &Bson, op: CmpOp, value: &Bson) -> bool {
    match op {
        CmpOp::Eq => bson_eq(v, value),
        CmpOp::Ne => !bson_eq(v, value),
        CmpOp::Gt => ordered(v, value).is_some_and(Ordering::is_gt),
        CmpOp::Gte => ordered(v, value).is_some_and(Ordering::is_ge),
        CmpOp::Lt => ordered(v, value).is_some_and(Ordering::is_lt),
        CmpOp::Lte => ordered(v, value).is_some_and(Ordering::is_le),
    }
}

fn matches_eq(v: &Bson, value: &Bson) -> bool {
    match v {
        Bson::Array(items) if !matches!(value, Bson::Array(_)) => {
            items.iter().any(|x| bson_eq(x, value))
        }
        v => bson_eq(v, value),
    }
}

fn is_in_set(v: &Bson, set: &[Bson]) -> bool {
    set.iter().take(MAX_IN_SET).any(|x| matches_eq(v, x))
}

/// Equality that treats all numeric representations alike.
#[must_use]
pub fn bson_eq(a: &Bson, b: &Bson) -> bool {
    if is_num(a) && is_num(b) {
        return as_f64_num(a) == as_f64_num(b);
    }
    a == b
}

/// Ordering between values of the same comparison class; `None` across classes.
fn ordered(a: &Bson, b: &Bson) -> Option<Ordering> {
    use bson::Bson as T;
    if is_num(a) && is_num(b) {
        return Some(compare_bson(a, b));
    }
    match (a, b) {
        (T::String(_), T::String(_))
        | (T::Boolean(_), T::Boolean(_))
        | (T::DateTime(_), T::DateTime(_))
        | (T::ObjectId(_), T::ObjectId(_)) => Some(compare_bson(a, b)),
        _ => None,
    }
}

pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &[SortSpec]) -> Ordering {
    for s in sort.iter().take(MAX_SORT_FIELDS) {
        let va = get_path(a, &s.field);
        let vb = get_path(b, &s.field);
        let ord = match (va, vb) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if matches!(s.order, Order::Asc) { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

pub(crate) fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() > MAX_PATH_DEPTH {
        return None;
    }
    let (last, init) = parts.split_last()?;
    let mut cur = doc;
    for part in init {
        match cur.get(*part) {
            Some(Bson::Document(d)) => cur = d,
            _ => return None,
        }
    }
    cur.get(*last)
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn as_f64_num(x: &Bson) -> f64 {
    match x {
        Bson::Int32(i) => f64::from(*i),
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f,
        _ => f64::NAN,
    }
}

/// Total order over values: numbers by magnitude, then by type rank.
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    use bson::Bson as T;
    if is_num(a) && is_num(b) {
        return as_f64_num(a).total_cmp(&as_f64_num(b));
    }
    match (a, b) {
        (T::String(x), T::String(y)) => x.cmp(y),
        (T::Boolean(x), T::Boolean(y)) => x.cmp(y),
        (T::DateTime(x), T::DateTime(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
        (T::ObjectId(x), T::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (T::Array(x), T::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let o = compare_bson(l, r);
                if o != Ordering::Equal {
                    return o;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    use bson::Bson as T;
    match v {
        T::MinKey => 0,
        T::Null | T::Undefined => 1,
        T::Int32(_) | T::Int64(_) | T::Double(_) | T::Decimal128(_) => 2,
        T::Symbol(_) | T::String(_) => 3,
        T::Document(_) => 4,
        T::Array(_) => 5,
        T::Binary(_) => 6,
        T::ObjectId(_) => 7,
        T::Boolean(_) => 8,
        T::DateTime(_) => 9,
        T::Timestamp(_) => 10,
        T::RegularExpression(_) => 11,
        T::MaxKey => 255,
        _ => 12,
    }
}

/// Shapes a stored document for output.
pub fn apply_projection(doc: &BsonDocument, projection: &Projection) -> BsonDocument {
    match projection {
        Projection::Default => hide(doc, &[]),
        Projection::Exclude(fields) => {
            let mut out = hide(doc, fields);
            for f in fields.iter().filter(|f| f.contains('.')).take(MAX_PROJECTION_FIELDS) {
                remove_path(&mut out, f);
            }
            out
        }
        Projection::Include(fields) => {
            let mut out = BsonDocument::new();
            if let Some(id) = doc.get("_id") {
                out.insert("_id", id.clone());
            }
            for f in fields.iter().take(MAX_PROJECTION_FIELDS) {
                if f == REVISION_FIELD {
                    continue;
                }
                if let Some(v) = get_path(doc, f) {
                    insert_path(&mut out, f, v.clone());
                }
            }
            out
        }
    }
}

/// Writes `value` at a dotted `path`, creating or reusing intermediate documents.
fn insert_path(out: &mut BsonDocument, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            out.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(out.get(head), Some(Bson::Document(_))) {
                out.insert(head, BsonDocument::new());
            }
            if let Some(Bson::Document(inner)) = out.get_mut(head) {
                insert_path(inner, rest, value);
            }
        }
    }
}

fn remove_path(out: &mut BsonDocument, path: &str) {
    match path.split_once('.') {
        None => {
            out.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(inner)) = out.get_mut(head) {
                remove_path(inner, rest);
            }
        }
    }
}

fn hide(doc: &BsonDocument, extra: &[String]) -> BsonDocument {
    doc.iter()
        .filter(|(k, _)| {
            k.as_str() != REVISION_FIELD
                && k.as_str() != CREATED_AT_FIELD
                && !extra.iter().any(|e| e == k.as_str())
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
