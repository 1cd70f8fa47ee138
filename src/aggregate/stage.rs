use crate::query::{Filter, Projection, SortSpec};

/// Value expression evaluated against one pipeline record.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Dotted field path, without the leading `$`.
    Field(String),
    ToUpper(Box<Expr>),
    /// Calendar month (1-12, UTC) of a date value.
    Month(Box<Expr>),
}

impl Expr {
    pub fn field(path: impl Into<String>) -> Self {
        Self::Field(path.into())
    }

    #[must_use]
    pub fn to_upper(self) -> Self {
        Self::ToUpper(Box::new(self))
    }

    #[must_use]
    pub fn month(self) -> Self {
        Self::Month(Box::new(self))
    }
}

/// Per-group accumulator.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Number of records in the group.
    Count,
    Sum(Expr),
    Avg(Expr),
    Min(Expr),
    Max(Expr),
    /// Values in input order.
    Push(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    /// Output records carry the key under `_id` plus one field per accumulator.
    Group { key: Expr, fields: Vec<(String, Accumulator)> },
    Sort(Vec<SortSpec>),
    /// One output record per element of the array at this path.
    Unwind(String),
    AddFields(Vec<(String, Expr)>),
    Project(Projection),
    Limit(usize),
}

impl Stage {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Match(_) => "match",
            Self::Group { .. } => "group",
            Self::Sort(_) => "sort",
            Self::Unwind(_) => "unwind",
            Self::AddFields(_) => "addFields",
            Self::Project(_) => "project",
            Self::Limit(_) => "limit",
        }
    }
}

/// Ordered stage list, executed front to back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    #[must_use]
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
