//! Aggregation pipelines as data: tagged stages, the two analytics builders,
//! and an in-memory executor for stores without a native aggregation engine.

pub mod exec;
pub mod pipelines;
pub mod stage;

pub use exec::run_pipeline;
pub use pipelines::{monthly_plan_pipeline, tier_stats_pipeline};
pub use stage::{Accumulator, Expr, Pipeline, Stage};
