#![allow(dead_code)]

use bson::{Document as BsonDocument, doc, oid::ObjectId};
use chrono::NaiveDate;
use tourlite::{CatalogConfig, DocumentStore, MemoryStore, NewTour, TourCatalog};

pub fn catalog() -> TourCatalog<MemoryStore> {
    TourCatalog::new(MemoryStore::for_tours(), CatalogConfig::default())
}

pub fn date(y: i32, m: u32, d: u32) -> bson::DateTime {
    let ms = NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap();
    bson::DateTime::from_millis(ms)
}

/// A stored tour document with the fields listings and pipelines read.
pub fn tour_doc(name: &str, difficulty: &str, rating: f64, price: f64, created_ms: i64) -> BsonDocument {
    doc! {
        "_id": ObjectId::new(),
        "name": name,
        "slug": tourlite::derive_slug(name),
        "duration": 7.0,
        "maxGroupSize": 10.0,
        "difficulty": difficulty,
        "ratingsAverage": rating,
        "ratingsQuantity": 10.0,
        "price": price,
        "imageCover": "cover.jpg",
        "createdAt": bson::DateTime::from_millis(created_ms),
        "startDates": [],
        "secretTour": false,
        "__v": 0,
    }
}

pub fn insert_all(catalog: &TourCatalog<MemoryStore>, docs: Vec<BsonDocument>) {
    for d in docs {
        catalog.store().insert_one(d).unwrap();
    }
}

/// `n` visible tours, `Tour 00`..; creation time increases with the index.
pub fn numbered(n: usize) -> Vec<BsonDocument> {
    (0..n)
        .map(|i| tour_doc(&format!("Numbered Tour {i:02}"), "easy", 4.0, 100.0 + i as f64, i as i64 * 1000))
        .collect()
}

pub fn valid_input(name: &str) -> NewTour {
    NewTour {
        name: Some(name.into()),
        duration: Some(5.0),
        max_group_size: Some(25.0),
        difficulty: Some("easy".into()),
        price: Some(397.0),
        image_cover: Some("tour-1-cover.jpg".into()),
        summary: Some("Breathtaking hike through the Canadian Banff National Park".into()),
        ..NewTour::default()
    }
}

pub fn names(docs: &[BsonDocument]) -> Vec<String> {
    docs.iter().map(|d| d.get_str("name").unwrap().to_string()).collect()
}
