//! The tour resource: stored shape, write inputs, slug derivation and JSON rendering.

pub mod input;
pub mod model;
pub mod slug;
pub mod view;

pub use input::{NewTour, TourPatch};
pub use model::{COLLECTION, DEFAULT_RATINGS_AVERAGE, Difficulty, Tour};
pub use slug::derive_slug;
pub use view::{to_json, to_json_array};
