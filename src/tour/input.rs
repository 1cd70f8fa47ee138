//! Write-path inputs and their field validators.
//!
//! Creation validates every field and applies defaults; a partial update
//! validates only the fields it sets and never re-checks `priceDiscount`.

use bson::{Bson, Document as BsonDocument};
use serde::{Deserialize, Serialize};

use super::model::{DEFAULT_RATINGS_AVERAGE, Difficulty, Tour};
use super::slug::derive_slug;
use crate::errors::{CatalogError, ValidationErrors};
use crate::query::parse_timestamp_millis;
use crate::types::DocumentId;

pub const NAME_MIN_LEN: usize = 10;
pub const NAME_MAX_LEN: usize = 40;

/// Body of a create request. `slug`, `durationWeeks` and unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTour {
    pub name: Option<String>,
    pub duration: Option<f64>,
    pub max_group_size: Option<f64>,
    pub difficulty: Option<String>,
    pub ratings_average: Option<f64>,
    pub ratings_quantity: Option<f64>,
    pub price: Option<f64>,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub images: Vec<String>,
    pub created_at: Option<String>,
    pub start_dates: Vec<String>,
    pub secret_tour: Option<bool>,
}

/// Body of a partial update; only present fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TourPatch {
    pub name: Option<String>,
    pub duration: Option<f64>,
    pub max_group_size: Option<f64>,
    pub difficulty: Option<String>,
    pub ratings_average: Option<f64>,
    pub ratings_quantity: Option<f64>,
    pub price: Option<f64>,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<String>>,
    pub secret_tour: Option<bool>,
}

impl NewTour {
    /// Validates, applies defaults and derives `slug`.
    ///
    /// # Errors
    /// `Validation` listing every failing field.
    pub fn into_tour(self, now: bson::DateTime) -> Result<Tour, CatalogError> {
        let mut errs = ValidationErrors::new();

        let name = required(&mut errs, "name", self.name.map(|n| n.trim().to_string()), "Tour must have a name");
        if let Some(n) = &name {
            check_name(&mut errs, n);
        }
        let duration = required(&mut errs, "duration", self.duration, "A Tour must have a duration");
        if let Some(d) = duration {
            check_positive(&mut errs, "duration", d);
        }
        let max_group_size =
            required(&mut errs, "maxGroupSize", self.max_group_size, "A Tour must have a group size");
        if let Some(g) = max_group_size {
            check_positive(&mut errs, "maxGroupSize", g);
        }
        let difficulty = required(&mut errs, "difficulty", self.difficulty, "A Tour must have a difficulty")
            .and_then(|d| check_difficulty(&mut errs, &d));
        let ratings_average = self.ratings_average.unwrap_or(DEFAULT_RATINGS_AVERAGE);
        check_rating(&mut errs, ratings_average);
        let ratings_quantity = self.ratings_quantity.unwrap_or(0.0);
        check_non_negative(&mut errs, "ratingsQuantity", ratings_quantity);
        let price = required(&mut errs, "price", self.price, "Tour must have a price");
        if let Some(p) = price {
            check_positive(&mut errs, "price", p);
        }
        if let (Some(discount), Some(p)) = (self.price_discount, price)
            && discount >= p
        {
            errs.push("priceDiscount", format!("Discount price ({discount}) should be below regular price"));
        }
        let image_cover = trimmed(self.image_cover).filter(|c| !c.is_empty());
        if image_cover.is_none() {
            errs.push("imageCover", "A tour must have a cover image");
        }
        let created_at = match self.created_at.as_deref() {
            None => Some(now),
            Some(raw) => parse_date(&mut errs, "createdAt", raw),
        };
        let start_dates: Vec<bson::DateTime> = self
            .start_dates
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| parse_date(&mut errs, &format!("startDates.{i}"), raw))
            .collect();

        errs.into_result()?;
        match (name, duration, max_group_size, difficulty, price, image_cover, created_at) {
            (Some(name), Some(duration), Some(max_group_size), Some(difficulty), Some(price), Some(image_cover), Some(created_at)) => {
                Ok(Tour {
                    id: DocumentId::new(),
                    slug: derive_slug(&name),
                    name,
                    duration,
                    max_group_size,
                    difficulty,
                    ratings_average,
                    ratings_quantity,
                    price,
                    price_discount: self.price_discount,
                    summary: trimmed(self.summary),
                    description: trimmed(self.description),
                    image_cover,
                    images: self.images,
                    created_at,
                    start_dates,
                    secret_tour: self.secret_tour.unwrap_or(false),
                    revision: 0,
                })
            }
            _ => Err(CatalogError::Validation(ValidationErrors::new())),
        }
    }
}

impl TourPatch {
    /// Validates the present fields and renders them as a `$set` document.
    ///
    /// `slug` is re-derived when `name` is set. `priceDiscount` is not compared
    /// against `price` here.
    ///
    /// # Errors
    /// `Validation` listing every failing field.
    pub fn into_set_document(self) -> Result<BsonDocument, CatalogError> {
        let mut errs = ValidationErrors::new();
        let mut set = BsonDocument::new();

        if let Some(name) = self.name.map(|n| n.trim().to_string()) {
            check_name(&mut errs, &name);
            set.insert("slug", derive_slug(&name));
            set.insert("name", name);
        }
        for (path, value) in [
            ("duration", self.duration),
            ("maxGroupSize", self.max_group_size),
            ("price", self.price),
        ] {
            if let Some(v) = value {
                check_positive(&mut errs, path, v);
                set.insert(path, v);
            }
        }
        if let Some(d) = self.difficulty
            && let Some(d) = check_difficulty(&mut errs, &d)
        {
            set.insert("difficulty", d.as_str());
        }
        if let Some(r) = self.ratings_average {
            check_rating(&mut errs, r);
            set.insert("ratingsAverage", r);
        }
        if let Some(q) = self.ratings_quantity {
            check_non_negative(&mut errs, "ratingsQuantity", q);
            set.insert("ratingsQuantity", q);
        }
        if let Some(d) = self.price_discount {
            set.insert("priceDiscount", d);
        }
        for (path, value) in [("summary", self.summary), ("description", self.description)] {
            if let Some(v) = value {
                set.insert(path, v.trim());
            }
        }
        if let Some(cover) = self.image_cover.map(|c| c.trim().to_string()) {
            if cover.is_empty() {
                errs.push("imageCover", "A tour must have a cover image");
            }
            set.insert("imageCover", cover);
        }
        if let Some(images) = self.images {
            set.insert("images", images);
        }
        if let Some(dates) = self.start_dates {
            let parsed: Vec<Bson> = dates
                .iter()
                .enumerate()
                .filter_map(|(i, raw)| parse_date(&mut errs, &format!("startDates.{i}"), raw))
                .map(Bson::DateTime)
                .collect();
            set.insert("startDates", parsed);
        }
        if let Some(secret) = self.secret_tour {
            set.insert("secretTour", secret);
        }
        errs.into_result()?;
        Ok(set)
    }
}

fn required<T>(errs: &mut ValidationErrors, path: &str, value: Option<T>, message: &str) -> Option<T> {
    if value.is_none() {
        errs.push(path, message);
    }
    value
}

fn check_name(errs: &mut ValidationErrors, name: &str) {
    let len = name.chars().count();
    if name.is_empty() {
        errs.push("name", "Tour must have a name");
    } else if len > NAME_MAX_LEN {
        errs.push("name", format!("A Tour must have length less than or equal to {NAME_MAX_LEN}"));
    } else if len < NAME_MIN_LEN {
        errs.push("name", format!("A Tour length must be greater than or equal to {NAME_MIN_LEN}"));
    }
}

fn check_positive(errs: &mut ValidationErrors, path: &str, v: f64) {
    if !(v.is_finite() && v > 0.0) {
        errs.push(path, format!("{path} must be positive, got {v}"));
    }
}

fn check_non_negative(errs: &mut ValidationErrors, path: &str, v: f64) {
    if !(v.is_finite() && v >= 0.0) {
        errs.push(path, format!("{path} must not be negative, got {v}"));
    }
}

fn check_rating(errs: &mut ValidationErrors, v: f64) {
    if v.is_nan() || v < 1.0 {
        errs.push("ratingsAverage", "tour rating avg should be more than 1.0");
    } else if v > 5.0 {
        errs.push("ratingsAverage", "tour rating avg must be less than 5.0");
    }
}

fn check_difficulty(errs: &mut ValidationErrors, raw: &str) -> Option<Difficulty> {
    let parsed = raw.parse::<Difficulty>().ok();
    if parsed.is_none() {
        errs.push("difficulty", "Difficulty is either: easy, medium, hard");
    }
    parsed
}

fn parse_date(errs: &mut ValidationErrors, path: &str, raw: &str) -> Option<bson::DateTime> {
    let parsed = parse_timestamp_millis(raw.trim()).map(bson::DateTime::from_millis);
    if parsed.is_none() {
        errs.push(path, format!("Cast to date failed for value {raw:?}"));
    }
    parsed
}

fn trimmed(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn valid() -> NewTour {
        NewTour {
            name: Some("  The Sea Explorer ".into()),
            duration: Some(7.0),
            max_group_size: Some(15.0),
            difficulty: Some("medium".into()),
            price: Some(497.0),
            image_cover: Some("tour-2-cover.jpg".into()),
            start_dates: vec!["2021-06-19,10:00".into(), "2021-07-20".into()],
            ..NewTour::default()
        }
    }

    fn errors_of(r: Result<impl std::fmt::Debug, CatalogError>) -> ValidationErrors {
        match r {
            Err(CatalogError::Validation(v)) => v,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn create_applies_defaults_and_slug() {
        let now = bson::DateTime::from_millis(1_000);
        let t = valid().into_tour(now).unwrap();
        assert_eq!(t.name, "The Sea Explorer");
        assert_eq!(t.slug, "the-sea-explorer");
        assert!((t.ratings_average - 4.5).abs() < f64::EPSILON);
        assert!(t.ratings_quantity.abs() < f64::EPSILON);
        assert!(!t.secret_tour);
        assert_eq!(t.created_at, now);
        assert_eq!(t.start_dates.len(), 2);
        assert_eq!(t.revision, 0);
    }

    #[test]
    fn create_reports_every_missing_field() {
        let errs = errors_of(NewTour::default().into_tour(bson::DateTime::now()));
        for path in ["name", "duration", "maxGroupSize", "difficulty", "price", "imageCover"] {
            assert!(errs.has(path), "missing error for {path}");
        }
    }

    #[test]
    fn create_bounds() {
        let short = NewTour { name: Some("Short".into()), ..valid() };
        assert!(errors_of(short.into_tour(bson::DateTime::now())).has("name"));
        let long = NewTour { name: Some("x".repeat(41)), ..valid() };
        assert!(errors_of(long.into_tour(bson::DateTime::now())).has("name"));
        let rating = NewTour { ratings_average: Some(5.5), ..valid() };
        assert!(errors_of(rating.into_tour(bson::DateTime::now())).has("ratingsAverage"));
        let level = NewTour { difficulty: Some("extreme".into()), ..valid() };
        assert!(errors_of(level.into_tour(bson::DateTime::now())).has("difficulty"));
        let dur = NewTour { duration: Some(-1.0), ..valid() };
        assert!(errors_of(dur.into_tour(bson::DateTime::now())).has("duration"));
    }

    #[test]
    fn blank_cover_image_is_rejected_at_creation() {
        for cover in ["", "   "] {
            let errs = errors_of(
                NewTour { image_cover: Some(cover.into()), ..valid() }.into_tour(bson::DateTime::now()),
            );
            let paths: Vec<_> = errs.errors.iter().map(|e| e.path.as_str()).collect();
            assert_eq!(paths, ["imageCover"]);
        }
        let t = NewTour { image_cover: Some(" cover.jpg ".into()), ..valid() }
            .into_tour(bson::DateTime::now())
            .unwrap();
        assert_eq!(t.image_cover, "cover.jpg");
    }

    #[test]
    fn discount_must_be_below_price_at_creation() {
        for discount in [497.0, 600.0] {
            let t = NewTour { price_discount: Some(discount), ..valid() };
            let err = t.into_tour(bson::DateTime::now()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        }
        let ok = NewTour { price_discount: Some(100.0), ..valid() };
        assert_eq!(ok.into_tour(bson::DateTime::now()).unwrap().price_discount, Some(100.0));
    }

    #[test]
    fn patch_rederives_slug_only_on_rename() {
        let set = TourPatch { price: Some(10.0), ..TourPatch::default() }.into_set_document().unwrap();
        assert!(!set.contains_key("slug"));
        let set = TourPatch { name: Some("The Snow Adventurer".into()), ..TourPatch::default() }
            .into_set_document()
            .unwrap();
        assert_eq!(set.get_str("slug").unwrap(), "the-snow-adventurer");
    }

    #[test]
    fn patch_does_not_compare_discount_with_price() {
        let set = TourPatch { price: Some(50.0), price_discount: Some(80.0), ..TourPatch::default() }
            .into_set_document()
            .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn patch_validates_present_fields() {
        let errs = errors_of(
            TourPatch { ratings_average: Some(0.5), name: Some("tiny".into()), ..TourPatch::default() }
                .into_set_document(),
        );
        assert!(errs.has("ratingsAverage"));
        assert!(errs.has("name"));
    }

    #[test]
    fn ignores_unknown_and_derived_input_keys() {
        let t: NewTour = serde_json::from_str(
            r#"{"name":"The Park Camper","slug":"hacked","durationWeeks":9,"rating":3}"#,
        )
        .unwrap();
        assert_eq!(t.name.as_deref(), Some("The Park Camper"));
    }
}
