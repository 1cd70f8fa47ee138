mod common;

use bson::{Bson, doc};
use common::*;
use tourlite::aggregate::{Stage, monthly_plan_pipeline, run_pipeline, tier_stats_pipeline};
use tourlite::apply_visibility_filter;

#[test]
fn tier_stats_groups_top_rated_by_upper_difficulty() {
    let c = catalog();
    insert_all(
        &c,
        vec![
            tour_doc("Tour Alpha Easy", "easy", 4.6, 100.0, 1),
            tour_doc("Tour Bravo Easy", "easy", 4.8, 200.0, 2),
            tour_doc("Tour Charlie Hard", "hard", 4.0, 900.0, 3),
        ],
    );
    let stats = c.tour_stats().unwrap();
    assert_eq!(stats.len(), 1);
    let easy = &stats[0];
    assert_eq!(easy.get_str("_id").unwrap(), "EASY");
    assert_eq!(easy.get_i32("numTour").unwrap(), 2);
    assert!((easy.get_f64("avgPrice").unwrap() - 150.0).abs() < 1e-9);
    assert!((easy.get_f64("minPrice").unwrap() - 100.0).abs() < 1e-9);
    assert!((easy.get_f64("maxPrice").unwrap() - 200.0).abs() < 1e-9);
    assert!((easy.get_f64("avgRating").unwrap() - 4.7).abs() < 1e-9);
    assert!((easy.get_f64("numRatings").unwrap() - 20.0).abs() < 1e-9);
}

#[test]
fn tier_stats_sorted_by_average_price() {
    let c = catalog();
    insert_all(
        &c,
        vec![
            tour_doc("Tour Hard Pricey", "hard", 4.9, 900.0, 1),
            tour_doc("Tour Medium Mid", "medium", 4.9, 500.0, 2),
            tour_doc("Tour Easy Cheap", "easy", 4.9, 100.0, 3),
        ],
    );
    let ids: Vec<String> =
        c.tour_stats().unwrap().iter().map(|g| g.get_str("_id").unwrap().to_string()).collect();
    assert_eq!(ids, ["EASY", "MEDIUM", "HARD"]);
}

#[test]
fn monthly_plan_counts_starts_per_month() {
    let c = catalog();
    let mut d = tour_doc("The Forest Hiker", "easy", 4.7, 397.0, 1);
    d.insert("startDates", vec![Bson::DateTime(date(2021, 3, 1)), Bson::DateTime(date(2021, 3, 15)), Bson::DateTime(date(2021, 7, 1))]);
    insert_all(&c, vec![d]);

    let plan = c.monthly_plan("2021").unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].get_i32("month").unwrap(), 3);
    assert_eq!(plan[0].get_i32("numTourStarts").unwrap(), 2);
    assert_eq!(plan[0].get_array("tours").unwrap().len(), 2);
    assert!(!plan[0].contains_key("_id"));
    assert_eq!(plan[1].get_i32("month").unwrap(), 7);
    assert_eq!(plan[1].get_i32("numTourStarts").unwrap(), 1);
}

#[test]
fn monthly_plan_year_window_includes_new_years_eve_only() {
    let c = catalog();
    let mut d = tour_doc("The Snow Adventurer", "hard", 4.5, 997.0, 1);
    let eve = bson::DateTime::from_millis(date(2021, 12, 31).timestamp_millis() + 23 * 3_600_000);
    d.insert(
        "startDates",
        vec![Bson::DateTime(date(2020, 12, 31)), Bson::DateTime(eve), Bson::DateTime(date(2022, 1, 1))],
    );
    insert_all(&c, vec![d]);
    let plan = c.monthly_plan("2021").unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].get_i32("month").unwrap(), 12);
    assert!(c.monthly_plan("abc").unwrap().is_empty());
    assert!(c.monthly_plan("1999").unwrap().is_empty());
}

#[test]
fn monthly_plan_skips_secret_tours() {
    let c = catalog();
    let mut visible = tour_doc("The Forest Hiker", "easy", 4.7, 397.0, 1);
    visible.insert("startDates", vec![Bson::DateTime(date(2021, 5, 1))]);
    let mut secret = tour_doc("The Secret Valley", "easy", 4.7, 397.0, 2);
    secret.insert("startDates", vec![Bson::DateTime(date(2021, 5, 2))]);
    secret.insert("secretTour", true);
    insert_all(&c, vec![visible, secret]);
    let plan = c.monthly_plan("2021").unwrap();
    assert_eq!(plan[0].get_i32("numTourStarts").unwrap(), 1);
}

#[test]
fn pipelines_are_idempotent_under_visibility() {
    let once = apply_visibility_filter(tier_stats_pipeline());
    let twice = apply_visibility_filter(once.clone());
    assert_eq!(once, twice);
    assert!(matches!(once.stages[0], Stage::Match(_)));
    assert_eq!(monthly_plan_pipeline(2021).len(), 7);
}

#[test]
fn rerunning_gives_identical_output() {
    let docs = vec![
        doc! { "difficulty": "easy", "ratingsAverage": 4.6, "ratingsQuantity": 3, "price": 100 },
        doc! { "difficulty": "medium", "ratingsAverage": 4.9, "ratingsQuantity": 1, "price": 300 },
    ];
    let p = tier_stats_pipeline();
    assert_eq!(run_pipeline(docs.clone(), &p).unwrap(), run_pipeline(docs, &p).unwrap());
}
