//! Catalog entry points a request layer calls.
//!
//! Every read builds its query or pipeline, merges the visibility constraint
//! explicitly, then executes it under a [`QueryTimer`]. Updates and deletes are
//! timed the same way. Single-identity operations
//! report `NotFound` when nothing visible matches.

use bson::Document as BsonDocument;

use crate::aggregate::{Pipeline, monthly_plan_pipeline, tier_stats_pipeline};
use crate::config::CatalogConfig;
use crate::errors::CatalogError;
use crate::query::{Filter, ListQuery, Projection, QueryParams, apply_projection, translate_list_query};
use crate::store::DocumentStore;
use crate::telemetry::{self, OpKind, QueryTimer};
use crate::tour::{NewTour, TourPatch};
use crate::types::DocumentId;
use crate::visibility::apply_visibility_filter;

pub const TOP_CHEAP_LIMIT: &str = "5";
pub const TOP_CHEAP_SORT: &str = "-ratingsAverage,price";
pub const TOP_CHEAP_FIELDS: &str = "name,price,ratingsAverage,difficulty,summary";

const NOT_FOUND: &str = "No tour found with that ID";

pub struct TourCatalog<S: DocumentStore> {
    store: S,
    cfg: CatalogConfig,
}

impl<S: DocumentStore> TourCatalog<S> {
    pub fn new(store: S, cfg: CatalogConfig) -> Self {
        telemetry::set_slow_query_ms(cfg.slow_query_ms);
        Self { store, cfg }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.cfg
    }

    /// Filtered, sorted, projected and paginated listing of visible tours.
    ///
    /// # Errors
    /// `MalformedParameter` under the reject policy, or whatever the store raises.
    pub fn get_all_tours(&self, params: &QueryParams) -> Result<Vec<BsonDocument>, CatalogError> {
        let query = translate_list_query(ListQuery::find_all(), params, &self.cfg)?;
        self.find(OpKind::Find, &apply_visibility_filter(query))
    }

    /// The five best-rated, cheapest tours, with a short field list.
    ///
    /// Filter parameters still apply; the control keys are overridden.
    ///
    /// # Errors
    /// Same as [`Self::get_all_tours`].
    pub fn top_cheap_tours(&self, params: &QueryParams) -> Result<Vec<BsonDocument>, CatalogError> {
        let mut params = params.clone();
        params.set("limit", TOP_CHEAP_LIMIT);
        params.set("sort", TOP_CHEAP_SORT);
        params.set("fields", TOP_CHEAP_FIELDS);
        self.get_all_tours(&params)
    }

    /// # Errors
    /// `MalformedParameter` for a bad id; `NotFound` when absent or secret.
    pub fn get_tour(&self, id: &str) -> Result<BsonDocument, CatalogError> {
        let id = DocumentId::parse(id)?;
        let query = apply_visibility_filter(ListQuery::by("_id", id.0));
        let timer = QueryTimer::start(OpKind::FindOne, self.store.collection());
        let found = self.store.find_one(&query)?;
        timer.finish(usize::from(found.is_some()));
        found.ok_or_else(|| CatalogError::NotFound(NOT_FOUND.into()))
    }

    /// Validates and inserts a new tour; returns it in the default projection.
    ///
    /// # Errors
    /// `Validation` or `DuplicateKey` for bad input; store failures as raised.
    pub fn create_tour(&self, input: NewTour) -> Result<BsonDocument, CatalogError> {
        let tour = input.into_tour(bson::DateTime::now())?;
        let doc = tour.to_document()?;
        let id = self.store.insert_one(doc.clone())?;
        telemetry::log_write("insert", self.store.collection(), &id.to_string());
        Ok(apply_projection(&doc, &Projection::Default))
    }

    /// Applies a validated partial update to a visible tour and returns the result.
    ///
    /// # Errors
    /// `MalformedParameter` for a bad id, `Validation`/`DuplicateKey` for bad
    /// fields, `NotFound` when absent or secret.
    pub fn update_tour(&self, id: &str, patch: TourPatch) -> Result<BsonDocument, CatalogError> {
        let id = DocumentId::parse(id)?;
        let set = patch.into_set_document()?;
        let filter = apply_visibility_filter(Filter::eq("_id", id.0));
        let timer = QueryTimer::start(OpKind::Update, self.store.collection());
        let updated = self.store.find_one_and_update(&filter, set)?;
        timer.finish(usize::from(updated.is_some()));
        let updated = updated.ok_or_else(|| CatalogError::NotFound(NOT_FOUND.into()))?;
        telemetry::log_write("update", self.store.collection(), &id.to_string());
        Ok(apply_projection(&updated, &Projection::Default))
    }

    /// # Errors
    /// `MalformedParameter` for a bad id; `NotFound` when absent or secret.
    pub fn delete_tour(&self, id: &str) -> Result<(), CatalogError> {
        let id = DocumentId::parse(id)?;
        let filter = apply_visibility_filter(Filter::eq("_id", id.0));
        let timer = QueryTimer::start(OpKind::Delete, self.store.collection());
        let deleted = self.store.find_one_and_delete(&filter)?;
        timer.finish(usize::from(deleted.is_some()));
        deleted.ok_or_else(|| CatalogError::NotFound(NOT_FOUND.into()))?;
        telemetry::log_write("delete", self.store.collection(), &id.to_string());
        Ok(())
    }

    /// Per-difficulty statistics over top-rated visible tours.
    ///
    /// # Errors
    /// Store failures as raised.
    pub fn tour_stats(&self) -> Result<Vec<BsonDocument>, CatalogError> {
        self.aggregate(apply_visibility_filter(tier_stats_pipeline()))
    }

    /// Busiest months of `year`. A year that is not an integer yields an empty plan.
    ///
    /// # Errors
    /// Store failures as raised.
    pub fn monthly_plan(&self, year: &str) -> Result<Vec<BsonDocument>, CatalogError> {
        match year.trim().parse::<i32>() {
            Ok(year) => self.monthly_plan_for(year),
            Err(_) => {
                log::debug!("monthly plan for non-numeric year {year:?} is empty");
                Ok(Vec::new())
            }
        }
    }

    /// # Errors
    /// Store failures as raised.
    pub fn monthly_plan_for(&self, year: i32) -> Result<Vec<BsonDocument>, CatalogError> {
        self.aggregate(apply_visibility_filter(monthly_plan_pipeline(year)))
    }

    /// Creates every input through the validated path; stops at the first failure.
    ///
    /// # Errors
    /// The first create error, annotated with the input's position.
    pub fn seed<I>(&self, inputs: I) -> Result<usize, CatalogError>
    where
        I: IntoIterator<Item = NewTour>,
    {
        let mut n = 0;
        for input in inputs {
            self.create_tour(input).map_err(|e| match e {
                CatalogError::Validation(_) | CatalogError::DuplicateKey { .. } => e,
                other => CatalogError::Store(format!("seed entry {n}: {other}")),
            })?;
            n += 1;
        }
        log::info!("seeded {n} tours into {}", self.store.collection());
        Ok(n)
    }

    fn find(&self, op: OpKind, query: &ListQuery) -> Result<Vec<BsonDocument>, CatalogError> {
        let timer = QueryTimer::start(op, self.store.collection());
        let docs = self.store.find(query)?;
        timer.finish(docs.len());
        Ok(docs)
    }

    fn aggregate(&self, pipeline: Pipeline) -> Result<Vec<BsonDocument>, CatalogError> {
        let timer = QueryTimer::start(OpKind::Aggregate, self.store.collection());
        let docs = self.store.aggregate(&pipeline)?;
        timer.finish(docs.len());
        Ok(docs)
    }
}
