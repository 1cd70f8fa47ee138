//! The two fixed analytics pipelines.

use bson::Bson;
use chrono::NaiveDate;

use super::stage::{Accumulator, Expr, Pipeline, Stage};
use crate::query::{CmpOp, Filter, Projection, SortSpec};

pub const TOP_RATED_THRESHOLD: f64 = 4.5;
pub const MONTHS_PER_YEAR: usize = 12;

/// Per-difficulty statistics over top-rated tours, cheapest tier first.
#[must_use]
pub fn tier_stats_pipeline() -> Pipeline {
    Pipeline::new(vec![
        Stage::Match(Filter::cmp("ratingsAverage", CmpOp::Gte, TOP_RATED_THRESHOLD)),
        Stage::Group {
            key: Expr::field("difficulty").to_upper(),
            fields: vec![
                ("numTour".into(), Accumulator::Count),
                ("numRatings".into(), Accumulator::Sum(Expr::field("ratingsQuantity"))),
                ("avgRating".into(), Accumulator::Avg(Expr::field("ratingsAverage"))),
                ("avgPrice".into(), Accumulator::Avg(Expr::field("price"))),
                ("minPrice".into(), Accumulator::Min(Expr::field("price"))),
                ("maxPrice".into(), Accumulator::Max(Expr::field("price"))),
            ],
        },
        Stage::Sort(vec![SortSpec::asc("avgPrice")]),
    ])
}

/// Tour starts per calendar month of `year`, busiest month first.
#[must_use]
pub fn monthly_plan_pipeline(year: i32) -> Pipeline {
    Pipeline::new(vec![
        Stage::Unwind("startDates".into()),
        Stage::Match(year_window("startDates", year)),
        Stage::Group {
            key: Expr::field("startDates").month(),
            fields: vec![
                ("numTourStarts".into(), Accumulator::Count),
                ("tours".into(), Accumulator::Push(Expr::field("name"))),
            ],
        },
        Stage::AddFields(vec![("month".into(), Expr::field("_id"))]),
        Stage::Project(Projection::Exclude(vec!["_id".into()])),
        Stage::Sort(vec![SortSpec::desc("numTourStarts")]),
        Stage::Limit(MONTHS_PER_YEAR),
    ])
}

/// `[Y-01-01, (Y+1)-01-01)` in UTC; matches nothing for unrepresentable years.
fn year_window(path: &str, year: i32) -> Filter {
    let start = jan_first_millis(year);
    let end = year.checked_add(1).and_then(jan_first_millis);
    match (start, end) {
        (Some(start), Some(end)) => Filter::And(vec![
            Filter::cmp(path, CmpOp::Gte, Bson::DateTime(bson::DateTime::from_millis(start))),
            Filter::cmp(path, CmpOp::Lt, Bson::DateTime(bson::DateTime::from_millis(end))),
        ]),
        _ => Filter::none(),
    }
}

fn jan_first_millis(year: i32) -> Option<i64> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc().timestamp_millis())
}
