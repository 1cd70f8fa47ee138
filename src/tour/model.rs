use bson::Document as BsonDocument;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CatalogError;
use crate::types::DocumentId;

pub const COLLECTION: &str = "tours";
pub const DEFAULT_RATINGS_AVERAGE: f64 = 4.5;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|d| d.as_str() == s).ok_or(())
    }
}

/// A stored tour document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    pub slug: String,
    pub duration: f64,
    pub max_group_size: f64,
    pub difficulty: Difficulty,
    pub ratings_average: f64,
    pub ratings_quantity: f64,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image_cover: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: bson::DateTime,
    #[serde(default)]
    pub start_dates: Vec<bson::DateTime>,
    #[serde(default)]
    pub secret_tour: bool,
    #[serde(rename = "__v", default)]
    pub revision: i32,
}

impl Tour {
    /// # Errors
    /// `Bson` when the tour cannot be encoded.
    pub fn to_document(&self) -> Result<BsonDocument, CatalogError> {
        Ok(bson::serialize_to_document(self)?)
    }

    /// Decodes a full (unprojected) stored document.
    ///
    /// # Errors
    /// `Bson` when required fields are missing or mistyped.
    pub fn from_document(doc: BsonDocument) -> Result<Self, CatalogError> {
        Ok(bson::deserialize_from_document(doc)?)
    }
}
