use bson::{Bson, Document as BsonDocument, oid::ObjectId};
use parking_lot::RwLock;
use std::fs;
use std::path::Path;

use super::DocumentStore;
use crate::aggregate::{Pipeline, run_pipeline};
use crate::errors::CatalogError;
use crate::query::{Filter, ListQuery, bson_eq, eval_filter, find_docs};
use crate::types::{CollectionName, DocumentId};

/// In-process collection kept in insertion order behind a `RwLock`.
pub struct MemoryStore {
    name: CollectionName,
    unique: Vec<String>,
    docs: RwLock<Vec<BsonDocument>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), unique: Vec::new(), docs: RwLock::new(Vec::new()) }
    }

    /// Store for the tours collection; `name` is unique.
    #[must_use]
    pub fn for_tours() -> Self {
        Self::new(crate::tour::COLLECTION).with_unique("name")
    }

    /// Adds a field whose values must be distinct across documents.
    #[must_use]
    pub fn with_unique(mut self, field: &str) -> Self {
        self.unique.push(field.to_string());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Copy of every stored document, in insertion order.
    #[must_use]
    pub fn documents(&self) -> Vec<BsonDocument> {
        self.docs.read().clone()
    }

    /// Loads documents from a JSON array of relaxed extended-JSON objects.
    ///
    /// # Errors
    /// `Io` when the file cannot be read, `Json` when it is not JSON, `Store`
    /// when an element is not an object or repeats a unique value.
    pub fn load_json(&self, path: &Path) -> Result<usize, CatalogError> {
        let text = fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        let arr = value
            .as_array()
            .ok_or_else(|| CatalogError::Store(format!("{}: expected JSON array", path.display())))?;
        let mut loaded = 0;
        for (i, v) in arr.iter().enumerate() {
            let obj = v
                .as_object()
                .ok_or_else(|| CatalogError::Store(format!("element {i} is not an object")))?;
            let doc = BsonDocument::try_from(obj.clone())
                .map_err(|e| CatalogError::Store(format!("element {i}: {e}")))?;
            self.insert_one(doc)?;
            loaded += 1;
        }
        log::info!("loaded {loaded} documents into {} from {}", self.name, path.display());
        Ok(loaded)
    }

    /// Writes the collection as a pretty JSON array of relaxed extended-JSON objects.
    ///
    /// # Errors
    /// `Io` when the file cannot be written.
    pub fn dump_json(&self, path: &Path) -> Result<(), CatalogError> {
        let arr: Vec<serde_json::Value> = self
            .docs
            .read()
            .iter()
            .map(|d| Bson::Document(d.clone()).into_relaxed_extjson())
            .collect();
        let text = serde_json::to_string_pretty(&arr)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        log::debug!("dumped {} documents from {} to {}", arr.len(), self.name, path.display());
        Ok(())
    }

    fn check_unique(
        &self,
        docs: &[BsonDocument],
        candidate: &BsonDocument,
        skip: Option<usize>,
    ) -> Result<(), CatalogError> {
        for field in &self.unique {
            let Some(value) = candidate.get(field) else { continue };
            let clash = docs
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != skip)
                .any(|(_, d)| d.get(field).is_some_and(|v| bson_eq(v, value)));
            if clash {
                let shown = match value {
                    Bson::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Err(CatalogError::DuplicateKey { field: field.clone(), value: shown });
            }
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn collection(&self) -> &str {
        &self.name
    }

    fn find(&self, query: &ListQuery) -> Result<Vec<BsonDocument>, CatalogError> {
        Ok(find_docs(self.docs.read().iter(), query))
    }

    fn insert_one(&self, mut doc: BsonDocument) -> Result<DocumentId, CatalogError> {
        let id = match doc.get("_id") {
            Some(Bson::ObjectId(oid)) => *oid,
            Some(other) => {
                return Err(CatalogError::Store(format!("unsupported _id type: {:?}", other.element_type())));
            }
            None => {
                let oid = ObjectId::new();
                let mut with_id = BsonDocument::new();
                with_id.insert("_id", oid);
                for (k, v) in doc {
                    with_id.insert(k, v);
                }
                doc = with_id;
                oid
            }
        };
        let mut docs = self.docs.write();
        if docs.iter().any(|d| matches!(d.get("_id"), Some(Bson::ObjectId(o)) if *o == id)) {
            return Err(CatalogError::DuplicateKey { field: "_id".into(), value: id.to_hex() });
        }
        self.check_unique(&docs, &doc, None)?;
        docs.push(doc);
        Ok(DocumentId(id))
    }

    fn find_one_and_update(
        &self,
        filter: &Filter,
        set: BsonDocument,
    ) -> Result<Option<BsonDocument>, CatalogError> {
        let mut docs = self.docs.write();
        let Some(pos) = docs.iter().position(|d| eval_filter(d, filter)) else {
            return Ok(None);
        };
        let mut updated = docs[pos].clone();
        for (k, v) in set {
            if k == "_id" {
                continue;
            }
            updated.insert(k, v);
        }
        self.check_unique(&docs, &updated, Some(pos))?;
        docs[pos] = updated.clone();
        Ok(Some(updated))
    }

    fn find_one_and_delete(&self, filter: &Filter) -> Result<Option<BsonDocument>, CatalogError> {
        let mut docs = self.docs.write();
        Ok(docs.iter().position(|d| eval_filter(d, filter)).map(|pos| docs.remove(pos)))
    }

    fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, CatalogError> {
        let snapshot = self.docs.read().clone();
        run_pipeline(snapshot, pipeline)
    }
}
