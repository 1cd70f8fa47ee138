use std::path::PathBuf;

/// One catalog operation requested from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create every tour in a JSON array file through the validated path.
    Seed { file: PathBuf },
    /// Listing driven by a URL query string (`difficulty=easy&sort=price`).
    List { query: String },
    TopCheap { query: String },
    Get { id: String },
    /// `body` is inline JSON, or `@path` to read it from a file.
    Create { body: String },
    Update { id: String, body: String },
    Delete { id: String },
    Stats,
    Plan { year: String },
    Metrics,
}

impl Command {
    /// True when a successful run changed the collection.
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Seed { .. } | Self::Create { .. } | Self::Update { .. } | Self::Delete { .. }
        )
    }
}
