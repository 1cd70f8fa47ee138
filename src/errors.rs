use std::fmt;
use thiserror::Error;

/// One failing field invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

/// Every field invariant a write violated, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(FieldError { path: path.to_string(), message: message.into() });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when some error was reported for `path`.
    #[must_use]
    pub fn has(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }

    /// # Errors
    /// Returns `CatalogError::Validation` when at least one error was collected.
    pub fn into_result(self) -> Result<(), CatalogError> {
        if self.is_empty() { Ok(()) } else { Err(CatalogError::Validation(self)) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tour validation failed: ")?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", e.path, e.message)?;
        }
        Ok(())
    }
}

/// The four failure kinds a caller has to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationFailure,
    NotFound,
    MalformedParameter,
    StoreFailure,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Duplicate field value: {field} = {value:?}")]
    DuplicateKey { field: String, value: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed parameter {param}: {reason}")]
    MalformedParameter { param: String, reason: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BSON: {0}")]
    Bson(#[from] bson::error::Error),
}

impl CatalogError {
    pub(crate) fn malformed(param: &str, reason: impl Into<String>) -> Self {
        Self::MalformedParameter { param: param.to_string(), reason: reason.into() }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::DuplicateKey { .. } => ErrorKind::ValidationFailure,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MalformedParameter { .. } | Self::Json(_) => ErrorKind::MalformedParameter,
            Self::Store(_) | Self::Io(_) | Self::Bson(_) => ErrorKind::StoreFailure,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
