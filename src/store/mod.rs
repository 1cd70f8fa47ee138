//! Persistence boundary for the catalog.
//!
//! The catalog only ever talks to a [`DocumentStore`]; queries and pipelines reach
//! it as data, already refined and visibility-filtered.

pub mod memory;

use bson::Document as BsonDocument;

use crate::aggregate::Pipeline;
use crate::errors::CatalogError;
use crate::query::{Filter, ListQuery};
use crate::types::DocumentId;

pub use memory::MemoryStore;

/// A single document collection.
pub trait DocumentStore: Send + Sync {
    /// Name of the backing collection, used in logs and telemetry.
    fn collection(&self) -> &str;

    /// Executes a refined list query: filter, sort, skip/limit, projection.
    fn find(&self, query: &ListQuery) -> Result<Vec<BsonDocument>, CatalogError>;

    /// First document the query selects.
    fn find_one(&self, query: &ListQuery) -> Result<Option<BsonDocument>, CatalogError> {
        let mut q = query.clone();
        q.limit = Some(1);
        Ok(self.find(&q)?.into_iter().next())
    }

    /// Inserts a full document. Fails with `DuplicateKey` on a unique-field clash.
    fn insert_one(&self, doc: BsonDocument) -> Result<DocumentId, CatalogError>;

    /// Sets `set`'s fields on the first match and returns the updated document.
    fn find_one_and_update(
        &self,
        filter: &Filter,
        set: BsonDocument,
    ) -> Result<Option<BsonDocument>, CatalogError>;

    /// Removes the first match and returns it.
    fn find_one_and_delete(&self, filter: &Filter) -> Result<Option<BsonDocument>, CatalogError>;

    /// Runs an aggregation pipeline over the collection.
    fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, CatalogError>;
}
