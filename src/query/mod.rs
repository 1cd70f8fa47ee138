pub mod eval;
pub mod exec;
pub mod features;
pub mod params;
pub mod types;

pub use eval::{apply_projection, bson_eq, compare_bson, compare_docs, eval_filter};
pub use exec::find_docs;
pub use features::{Constraint, QueryFeatures, RESERVED_KEYS, parse_constraints, translate_list_query};
pub use params::{ParamValue, QueryParams, coerce_value, parse_timestamp_millis};
pub use types::{CmpOp, Filter, ListQuery, Order, Projection, SortSpec};
