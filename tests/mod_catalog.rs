mod common;

use common::*;
use tourlite::query::QueryParams;
use tourlite::{CatalogConfig, ErrorKind, MemoryStore, NewTour, ParamPolicy, TourCatalog, TourPatch};

#[test]
fn default_listing_is_newest_first_without_hidden_fields() {
    let c = catalog();
    insert_all(&c, numbered(3));
    let docs = c.get_all_tours(&QueryParams::new()).unwrap();
    assert_eq!(names(&docs), ["Numbered Tour 02", "Numbered Tour 01", "Numbered Tour 00"]);
    for d in &docs {
        assert!(!d.contains_key("__v"));
        assert!(!d.contains_key("createdAt"));
        assert!(d.contains_key("price"));
    }
}

#[test]
fn default_page_size_is_one_hundred() {
    let c = catalog();
    insert_all(&c, numbered(120));
    assert_eq!(c.get_all_tours(&QueryParams::new()).unwrap().len(), 100);
}

#[test]
fn second_page_of_fifteen_has_five() {
    let c = catalog();
    insert_all(&c, numbered(15));
    let params = QueryParams::from_query_str("page=2&limit=10&sort=name");
    let docs = c.get_all_tours(&params).unwrap();
    let expected: Vec<String> = (10..15).map(|i| format!("Numbered Tour {i:02}")).collect();
    assert_eq!(names(&docs), expected);

    let past_end = c.get_all_tours(&QueryParams::from_query_str("page=9&limit=10")).unwrap();
    assert!(past_end.is_empty());
}

#[test]
fn comparison_filters_and_composite_sort() {
    let c = catalog();
    insert_all(
        &c,
        vec![
            tour_doc("The Forest Hiker", "easy", 4.7, 397.0, 1),
            tour_doc("The Sea Explorer", "medium", 4.8, 497.0, 2),
            tour_doc("The Snow Adventurer", "hard", 4.5, 997.0, 3),
            tour_doc("The City Wanderer", "easy", 4.6, 1197.0, 4),
        ],
    );
    let docs = c
        .get_all_tours(&QueryParams::from_query_str("price[gte]=400&price[lt]=1000&sort=-ratingsAverage"))
        .unwrap();
    assert_eq!(names(&docs), ["The Sea Explorer", "The Snow Adventurer"]);

    let docs = c
        .get_all_tours(&QueryParams::from_query_str("difficulty=easy&sort=price&fields=name,price"))
        .unwrap();
    assert_eq!(names(&docs), ["The Forest Hiker", "The City Wanderer"]);
    assert!(docs.iter().all(|d| d.len() == 3 && d.contains_key("_id")));
}

#[test]
fn secret_tours_never_listed_even_when_asked_for() {
    let c = catalog();
    let mut secret = tour_doc("The Secret Valley", "easy", 4.9, 10.0, 5);
    secret.insert("secretTour", true);
    insert_all(&c, vec![secret, tour_doc("The Forest Hiker", "easy", 4.7, 397.0, 1)]);

    for q in ["", "secretTour=true", "name=The%20Secret%20Valley", "price[lte]=10"] {
        let docs = c.get_all_tours(&QueryParams::from_query_str(q)).unwrap();
        assert!(
            docs.iter().all(|d| d.get_str("name").unwrap() != "The Secret Valley"),
            "leaked for {q:?}"
        );
    }
    assert!(c.tour_stats().unwrap().iter().all(|g| g.get_i32("numTour").unwrap() == 1));
}

#[test]
fn top_cheap_overrides_controls() {
    let c = catalog();
    insert_all(&c, numbered(8));
    let params = QueryParams::from_query_str("limit=50&sort=name");
    let docs = c.top_cheap_tours(&params).unwrap();
    assert_eq!(docs.len(), 5);
    // equal ratings, so cheapest first
    assert_eq!(docs[0].get_str("name").unwrap(), "Numbered Tour 00");
    let keys: Vec<&str> = docs[0].keys().map(String::as_str).collect();
    assert_eq!(keys, ["_id", "name", "price", "ratingsAverage", "difficulty"]);
}

#[test]
fn lookup_by_absent_or_secret_id_is_not_found() {
    let c = catalog();
    let created = c
        .create_tour(NewTour { secret_tour: Some(true), ..valid_input("The Hidden Garden") })
        .unwrap();
    let secret_id = created.get_object_id("_id").unwrap().to_hex();
    assert_eq!(c.get_tour(&secret_id).unwrap_err().kind(), ErrorKind::NotFound);
    let absent = bson::oid::ObjectId::new().to_hex();
    assert_eq!(c.get_tour(&absent).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(c.get_tour("abc").unwrap_err().kind(), ErrorKind::MalformedParameter);
}

#[test]
fn create_then_get_reads_back() {
    let c = catalog();
    let created = c.create_tour(valid_input("The Forest Hiker")).unwrap();
    let id = created.get_object_id("_id").unwrap().to_hex();
    let got = c.get_tour(&id).unwrap();
    assert_eq!(got.get_str("slug").unwrap(), "the-forest-hiker");
    assert!((got.get_f64("ratingsAverage").unwrap() - 4.5).abs() < f64::EPSILON);
    assert!(!got.contains_key("__v"));
}

#[test]
fn discount_checked_at_creation_only() {
    let c = catalog();
    let err = c
        .create_tour(NewTour { price_discount: Some(397.0), ..valid_input("The Forest Hiker") })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    assert!(err.to_string().contains("priceDiscount"));

    let created = c
        .create_tour(NewTour { price_discount: Some(300.0), ..valid_input("The Forest Hiker") })
        .unwrap();
    let id = created.get_object_id("_id").unwrap().to_hex();
    let updated = c.update_tour(&id, TourPatch { price: Some(100.0), ..TourPatch::default() }).unwrap();
    assert!((updated.get_f64("price").unwrap() - 100.0).abs() < f64::EPSILON);
    assert!((updated.get_f64("priceDiscount").unwrap() - 300.0).abs() < f64::EPSILON);
}

#[test]
fn duplicate_name_is_a_validation_failure() {
    let c = catalog();
    c.create_tour(valid_input("The Forest Hiker")).unwrap();
    let err = c.create_tour(valid_input("The Forest Hiker")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    assert_eq!(c.store().len(), 1);
}

#[test]
fn rename_rederives_slug() {
    let c = catalog();
    let created = c.create_tour(valid_input("The Forest Hiker")).unwrap();
    let id = created.get_object_id("_id").unwrap().to_hex();
    let patch = TourPatch { name: Some("The Mountain Biker".into()), ..TourPatch::default() };
    let updated = c.update_tour(&id, patch).unwrap();
    assert_eq!(updated.get_str("slug").unwrap(), "the-mountain-biker");

    let patch = TourPatch { duration: Some(9.0), ..TourPatch::default() };
    let updated = c.update_tour(&id, patch).unwrap();
    assert_eq!(updated.get_str("slug").unwrap(), "the-mountain-biker");
}

#[test]
fn delete_removes_and_then_reports_not_found() {
    let c = catalog();
    let created = c.create_tour(valid_input("The Forest Hiker")).unwrap();
    let id = created.get_object_id("_id").unwrap().to_hex();
    c.delete_tour(&id).unwrap();
    assert!(c.store().is_empty());
    assert_eq!(c.delete_tour(&id).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn reject_policy_surfaces_bad_pagination() {
    let cfg = CatalogConfig { param_policy: ParamPolicy::Reject, ..CatalogConfig::default() };
    let c = TourCatalog::new(MemoryStore::for_tours(), cfg);
    let err = c.get_all_tours(&QueryParams::from_query_str("page=abc")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedParameter);

    let lenient = catalog();
    insert_all(&lenient, numbered(2));
    let docs = lenient.get_all_tours(&QueryParams::from_query_str("page=abc&limit=-3")).unwrap();
    assert_eq!(docs.len(), 2);
}

#[test]
fn seed_goes_through_validation() {
    let c = catalog();
    let raw = r#"[
        {"name":"The Forest Hiker","duration":5,"maxGroupSize":25,"difficulty":"easy",
         "price":397,"imageCover":"tour-1-cover.jpg","startDates":["2021-04-25,10:00"]},
        {"name":"The Sea Explorer","duration":7,"maxGroupSize":15,"difficulty":"medium",
         "price":497,"imageCover":"tour-2-cover.jpg","id":1}
    ]"#;
    let inputs: Vec<NewTour> = serde_json::from_str(raw).unwrap();
    assert_eq!(c.seed(inputs).unwrap(), 2);
    let docs = c.store().documents();
    assert_eq!(docs[1].get_str("slug").unwrap(), "the-sea-explorer");
    assert_eq!(docs[0].get_array("startDates").unwrap().len(), 1);
    assert!(!docs[1].contains_key("id"));
}
