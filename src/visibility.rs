//! Read-path visibility: documents flagged `secretTour` never reach a standard
//! find or aggregate. Callers compose this explicitly before touching the store.

use crate::aggregate::{Pipeline, Stage};
use crate::query::{CmpOp, Filter, ListQuery};

pub const SECRET_FIELD: &str = "secretTour";

/// `secretTour != true`; also admits documents without the flag.
#[must_use]
pub fn visibility_constraint() -> Filter {
    Filter::cmp(SECRET_FIELD, CmpOp::Ne, true)
}

/// Something a visibility constraint can be merged into. Applying twice equals applying once.
pub trait ApplyVisibility: Sized {
    #[must_use]
    fn apply_visibility(self) -> Self;
}

impl ApplyVisibility for Filter {
    fn apply_visibility(self) -> Self {
        let hidden = visibility_constraint();
        if self.has_conjunct(&hidden) {
            return self;
        }
        // Caller constraints first, visibility last; both must hold.
        self.and(hidden)
    }
}

impl ApplyVisibility for ListQuery {
    fn apply_visibility(mut self) -> Self {
        self.filter = self.filter.apply_visibility();
        self
    }
}

impl ApplyVisibility for Pipeline {
    fn apply_visibility(mut self) -> Self {
        let hidden = Stage::Match(visibility_constraint());
        if self.stages.first() != Some(&hidden) {
            self.stages.insert(0, hidden);
        }
        self
    }
}

/// Merges the secret-document exclusion into a query or pipeline.
#[must_use]
pub fn apply_visibility_filter<T: ApplyVisibility>(target: T) -> T {
    target.apply_visibility()
}
