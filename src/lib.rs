pub mod aggregate;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod devlog;
pub mod errors;
pub mod logger;
pub mod query;
pub mod store;
pub mod telemetry;
pub mod tour;
pub mod types;
pub mod visibility;

pub use crate::aggregate::{Pipeline, Stage, monthly_plan_pipeline, tier_stats_pipeline};
pub use crate::catalog::TourCatalog;
pub use crate::config::{CatalogConfig, ParamPolicy};
pub use crate::errors::{CatalogError, ErrorKind, ValidationErrors};
pub use crate::query::{ListQuery, QueryParams, translate_list_query};
pub use crate::store::{DocumentStore, MemoryStore};
pub use crate::tour::{NewTour, Tour, TourPatch, derive_slug};
pub use crate::types::DocumentId;
pub use crate::visibility::apply_visibility_filter;
