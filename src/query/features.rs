//! Query feature translator: request parameters -> refined `ListQuery`.
//!
//! Every parameter other than the control keys (`page`, `sort`, `limit`, `fields`)
//! becomes a typed [`Constraint`]. Keys may carry a comparison marker suffix
//! (`duration[gte]=5`); markers are mapped onto [`CmpOp`] so no string marker
//! reaches the executed query. Malformed input follows [`ParamPolicy`] uniformly.

use crate::config::{CatalogConfig, ParamPolicy};
use crate::errors::CatalogError;
use bson::Bson;

use super::params::{ParamValue, QueryParams, coerce_value};
use super::types::{
    CREATED_AT_FIELD, CmpOp, Filter, ListQuery, MAX_IN_SET, MAX_SORT_FIELDS, Projection, SortSpec,
};

pub const RESERVED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];
pub const DEFAULT_PAGE: usize = 1;

/// One field constraint parsed from a request parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Compare { field: String, op: CmpOp, value: Bson },
    OneOf { field: String, values: Vec<Bson> },
}

impl Constraint {
    #[must_use]
    pub fn into_filter(self) -> Filter {
        match self {
            Self::Compare { field, op, value } => Filter::Cmp { path: field, op, value },
            Self::OneOf { field, values } => Filter::In { path: field, values },
        }
    }
}

/// Chainable refinements over a base query, applied in caller order.
pub struct QueryFeatures<'a> {
    query: ListQuery,
    params: &'a QueryParams,
    cfg: &'a CatalogConfig,
}

impl<'a> QueryFeatures<'a> {
    #[must_use]
    pub fn new(base: ListQuery, params: &'a QueryParams, cfg: &'a CatalogConfig) -> Self {
        Self { query: base, params, cfg }
    }

    /// ANDs every non-control parameter onto the base filter.
    ///
    /// # Errors
    /// `MalformedParameter` under the reject policy for unusable filter keys.
    pub fn filter(mut self) -> Result<Self, CatalogError> {
        let constraints = parse_constraints(self.params, self.cfg.param_policy)?;
        let mut filter = std::mem::replace(&mut self.query.filter, Filter::True);
        for c in constraints {
            filter = filter.and(c.into_filter());
        }
        self.query.filter = filter;
        Ok(self)
    }

    /// Composite sort from `sort`; newest-first by creation time when absent.
    ///
    /// # Errors
    /// `MalformedParameter` under the reject policy.
    pub fn sort(mut self) -> Result<Self, CatalogError> {
        let policy = self.cfg.param_policy;
        let sort = match control(self.params, "sort", policy)? {
            Some(raw) => parse_sort(raw, policy)?,
            None => Vec::new(),
        };
        if !sort.is_empty() {
            self.query.sort = sort;
        } else if self.query.sort.is_empty() {
            self.query.sort = vec![SortSpec::desc(CREATED_AT_FIELD)];
        }
        Ok(self)
    }

    /// Field projection from `fields`; revision metadata is always dropped.
    ///
    /// # Errors
    /// `MalformedParameter` under the reject policy.
    pub fn limit_fields(mut self) -> Result<Self, CatalogError> {
        let policy = self.cfg.param_policy;
        if let Some(raw) = control(self.params, "fields", policy)? {
            self.query.projection = parse_projection(raw, policy)?;
        }
        Ok(self)
    }

    /// Skip/limit window from `page` (default 1) and `limit` (default from config).
    ///
    /// # Errors
    /// `MalformedParameter` under the reject policy.
    pub fn paginate(mut self) -> Result<Self, CatalogError> {
        let policy = self.cfg.param_policy;
        let page = match control(self.params, "page", policy)? {
            Some(raw) => positive_or_default("page", raw, DEFAULT_PAGE, usize::MAX, policy)?,
            None => DEFAULT_PAGE,
        };
        let max = self.cfg.max_limit.max(1);
        let default_limit = self.cfg.default_limit.clamp(1, max);
        let limit = match control(self.params, "limit", policy)? {
            Some(raw) => positive_or_default("limit", raw, default_limit, max, policy)?,
            None => default_limit,
        };
        self.query.skip = (page - 1).saturating_mul(limit);
        self.query.limit = Some(limit);
        Ok(self)
    }

    #[must_use]
    pub fn into_query(self) -> ListQuery {
        self.query
    }
}

/// Applies filter, sort, projection and pagination in the conventional order.
///
/// # Errors
/// `MalformedParameter` under the reject policy.
pub fn translate_list_query(
    base: ListQuery,
    params: &QueryParams,
    cfg: &CatalogConfig,
) -> Result<ListQuery, CatalogError> {
    Ok(QueryFeatures::new(base, params, cfg)
        .filter()?
        .sort()?
        .limit_fields()?
        .paginate()?
        .into_query())
}

/// Classifies every non-control parameter into a typed constraint.
///
/// # Errors
/// `MalformedParameter` under the reject policy for unusable keys.
pub fn parse_constraints(
    params: &QueryParams,
    policy: ParamPolicy,
) -> Result<Vec<Constraint>, CatalogError> {
    let mut out = Vec::new();
    for (key, value) in params.iter() {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Some((field, op)) = split_key(key, policy)? else {
            continue;
        };
        match (op, value) {
            (None, ParamValue::Many(vals)) => out.push(Constraint::OneOf {
                field,
                values: vals.iter().take(MAX_IN_SET).map(|v| coerce_value(v)).collect(),
            }),
            (op, value) => {
                let op = op.unwrap_or(CmpOp::Eq);
                for raw in value.values() {
                    out.push(Constraint::Compare {
                        field: field.clone(),
                        op,
                        value: coerce_value(raw),
                    });
                }
            }
        }
    }
    Ok(out)
}

fn split_key(key: &str, policy: ParamPolicy) -> Result<Option<(String, Option<CmpOp>)>, CatalogError> {
    let (field, op) = match key.find('[') {
        Some(open) if key.ends_with(']') => {
            let marker = &key[open + 1..key.len() - 1];
            match CmpOp::from_marker(marker) {
                Some(op) => (&key[..open], Some(op)),
                None => return reject_or_skip(policy, key, "unknown comparison marker"),
            }
        }
        Some(_) => return reject_or_skip(policy, key, "unbalanced brackets"),
        None => (key, None),
    };
    let field = field.trim();
    if field.is_empty() {
        return reject_or_skip(policy, key, "empty field name");
    }
    if field.starts_with('$') || field.contains('[') || field.contains(']') {
        return reject_or_skip(policy, key, "illegal field name");
    }
    Ok(Some((field.to_string(), op)))
}

fn reject_or_skip<T>(policy: ParamPolicy, key: &str, reason: &str) -> Result<Option<T>, CatalogError> {
    match policy {
        ParamPolicy::Reject => Err(CatalogError::malformed(key, reason)),
        ParamPolicy::Clamp => {
            log::warn!("dropping filter parameter {key:?}: {reason}");
            Ok(None)
        }
    }
}

fn control<'p>(
    params: &'p QueryParams,
    key: &str,
    policy: ParamPolicy,
) -> Result<Option<&'p str>, CatalogError> {
    match params.get(key) {
        None => Ok(None),
        Some(ParamValue::Many(_)) if policy == ParamPolicy::Reject => {
            Err(CatalogError::malformed(key, "given more than once"))
        }
        Some(v) => Ok(v.last()),
    }
}

fn split_list<'r>(
    param: &str,
    raw: &'r str,
    policy: ParamPolicy,
) -> Result<Vec<&'r str>, CatalogError> {
    let mut out = Vec::new();
    for part in raw.split(',').map(str::trim) {
        let bare = part.trim_start_matches(['-', '+']);
        if bare.is_empty() || bare.starts_with('$') {
            if policy == ParamPolicy::Reject {
                return Err(CatalogError::malformed(param, format!("bad entry {part:?}")));
            }
            continue;
        }
        out.push(part);
    }
    Ok(out)
}

fn parse_sort(raw: &str, policy: ParamPolicy) -> Result<Vec<SortSpec>, CatalogError> {
    let entries = split_list("sort", raw, policy)?;
    if entries.len() > MAX_SORT_FIELDS && policy == ParamPolicy::Reject {
        return Err(CatalogError::malformed("sort", format!("more than {MAX_SORT_FIELDS} fields")));
    }
    Ok(entries
        .into_iter()
        .take(MAX_SORT_FIELDS)
        .map(|e| match e.strip_prefix('-') {
            Some(f) => SortSpec::desc(f),
            None => SortSpec::asc(e.trim_start_matches('+')),
        })
        .collect())
}

fn parse_projection(raw: &str, policy: ParamPolicy) -> Result<Projection, CatalogError> {
    let entries = split_list("fields", raw, policy)?;
    let (excl, incl): (Vec<&str>, Vec<&str>) = entries.into_iter().partition(|e| e.starts_with('-'));
    if !excl.is_empty() && !incl.is_empty() && policy == ParamPolicy::Reject {
        return Err(CatalogError::malformed("fields", "cannot mix inclusion and exclusion"));
    }
    if !incl.is_empty() {
        return Ok(Projection::Include(
            incl.into_iter().map(|f| f.trim_start_matches('+').to_string()).collect(),
        ));
    }
    if !excl.is_empty() {
        return Ok(Projection::Exclude(
            excl.into_iter().map(|f| f.trim_start_matches('-').to_string()).collect(),
        ));
    }
    Ok(Projection::Default)
}

fn positive_or_default(
    param: &str,
    raw: &str,
    default: usize,
    max: usize,
    policy: ParamPolicy,
) -> Result<usize, CatalogError> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => match policy {
            ParamPolicy::Clamp => Ok(default),
            ParamPolicy::Reject => {
                Err(CatalogError::malformed(param, format!("expected a positive integer, got {raw:?}")))
            }
        },
        Ok(n) if n > max => match policy {
            ParamPolicy::Clamp => Ok(max),
            ParamPolicy::Reject => Err(CatalogError::malformed(param, format!("must be at most {max}"))),
        },
        Ok(n) => Ok(n),
    }
}
