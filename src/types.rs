use crate::errors::CatalogError;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type CollectionName = String;

/// Identity of a stored document (`_id`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DocumentId(pub ObjectId);

impl DocumentId {
    #[must_use]
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parses a request-supplied identity.
    ///
    /// # Errors
    /// Returns `MalformedParameter` when `s` is not a 24-digit hex object id.
    pub fn parse(s: &str) -> Result<Self, CatalogError> {
        ObjectId::parse_str(s.trim())
            .map(Self)
            .map_err(|_| CatalogError::malformed("id", format!("invalid id: {s}")))
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for DocumentId {
    type Err = CatalogError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}
