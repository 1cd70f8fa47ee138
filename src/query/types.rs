use bson::Bson;
use serde::{Deserialize, Serialize};

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_IN_SET: usize = 1000;
pub const MAX_SORT_FIELDS: usize = 8;
pub(crate) const MAX_PROJECTION_FIELDS: usize = 64;

/// Revision metadata written by the store; never projected.
pub const REVISION_FIELD: &str = "__v";
/// Creation timestamp; hidden unless an allow-list names it.
pub const CREATED_AT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Desc }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    /// Maps a request comparison marker (`gte`, `gt`, `lte`, `lt`) to an operator.
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "gte" => Some(Self::Gte),
            "gt" => Some(Self::Gt),
            "lte" => Some(Self::Lte),
            "lt" => Some(Self::Lt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Not(Box<Filter>),
    In { path: String, values: Vec<Bson> },
    Cmp { path: String, op: CmpOp, value: Bson },
}

impl Filter {
    pub fn cmp(path: impl Into<String>, op: CmpOp, value: impl Into<Bson>) -> Self {
        Self::Cmp { path: path.into(), op, value: value.into() }
    }

    pub fn eq(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::cmp(path, CmpOp::Eq, value)
    }

    /// A filter no document satisfies.
    #[must_use]
    pub fn none() -> Self {
        Self::Not(Box::new(Self::True))
    }

    /// Conjunction that flattens nested `And`s and drops `True` operands.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut parts = Vec::new();
        for f in [self, other] {
            match f {
                Self::True => {}
                Self::And(inner) => parts.extend(inner),
                f => parts.push(f),
            }
        }
        match parts.len() {
            0 => Self::True,
            1 => parts.pop().unwrap_or(Self::True),
            _ => Self::And(parts),
        }
    }

    /// True when `needle` is this filter or one of its top-level conjuncts.
    #[must_use]
    pub fn has_conjunct(&self, needle: &Self) -> bool {
        match self {
            Self::And(parts) => parts.iter().any(|p| p == needle),
            f => f == needle,
        }
    }
}

/// Result shape of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Everything except hidden fields (`__v`, `createdAt`).
    Default,
    /// Allow-list; `_id` is always kept, `__v` is always dropped.
    Include(Vec<String>),
    /// Deny-list on top of the default hidden fields.
    Exclude(Vec<String>),
}

/// A refined single-collection query, ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: Filter,
    pub sort: Vec<SortSpec>,
    pub projection: Projection,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// The base "find all" query every refinement starts from.
    #[must_use]
    pub fn find_all() -> Self {
        Self {
            filter: Filter::True,
            sort: Vec::new(),
            projection: Projection::Default,
            skip: 0,
            limit: None,
        }
    }

    /// Single-document query by field equality.
    pub fn by(path: &str, value: impl Into<Bson>) -> Self {
        Self { filter: Filter::eq(path, value), limit: Some(1), ..Self::find_all() }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::find_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_flattens_and_drops_true() {
        let a = Filter::eq("a", 1);
        let b = Filter::eq("b", 2);
        assert_eq!(Filter::True.and(a.clone()), a);
        let ab = a.clone().and(b.clone());
        assert_eq!(ab, Filter::And(vec![a.clone(), b.clone()]));
        let abc = ab.and(Filter::eq("c", 3));
        match abc {
            Filter::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn markers_map_to_operators() {
        assert_eq!(CmpOp::from_marker("gte"), Some(CmpOp::Gte));
        assert_eq!(CmpOp::from_marker("lt"), Some(CmpOp::Lt));
        assert_eq!(CmpOp::from_marker("ne"), None);
    }
}
