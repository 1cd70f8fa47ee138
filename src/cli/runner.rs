use bson::Document as BsonDocument;
use serde_json::{Value, json};
use std::io::Write;

use super::command::Command;
use crate::catalog::TourCatalog;
use crate::errors::{CatalogError, ErrorKind};
use crate::query::QueryParams;
use crate::store::DocumentStore;
use crate::telemetry;
use crate::tour::{NewTour, TourPatch, to_json, to_json_array};

/// Runs one command and writes its JSON envelope (or metrics text) to `out`.
///
/// # Errors
/// Catalog failures, and `Io` when `out` cannot be written.
pub fn run<S, W>(catalog: &TourCatalog<S>, cmd: Command, out: &mut W) -> Result<(), CatalogError>
where
    S: DocumentStore,
    W: Write,
{
    let envelope = match cmd {
        Command::Seed { file } => {
            let text = std::fs::read_to_string(&file)?;
            let inputs: Vec<NewTour> = serde_json::from_str(&text)?;
            let n = catalog.seed(inputs)?;
            json!({ "status": "success", "results": n, "data": null })
        }
        Command::List { query } => {
            listing(&catalog.get_all_tours(&QueryParams::from_query_str(&query))?)
        }
        Command::TopCheap { query } => {
            listing(&catalog.top_cheap_tours(&QueryParams::from_query_str(&query))?)
        }
        Command::Get { id } => single(&catalog.get_tour(&id)?),
        Command::Create { body } => {
            let input: NewTour = serde_json::from_str(&read_body(&body)?)?;
            single(&catalog.create_tour(input)?)
        }
        Command::Update { id, body } => {
            let patch: TourPatch = serde_json::from_str(&read_body(&body)?)?;
            single(&catalog.update_tour(&id, patch)?)
        }
        Command::Delete { id } => {
            catalog.delete_tour(&id)?;
            json!({ "status": "success", "data": null })
        }
        Command::Stats => {
            let stats = catalog.tour_stats()?;
            json!({ "status": "success", "data": { "stats": to_json_array(&stats) } })
        }
        Command::Plan { year } => {
            let plan = catalog.monthly_plan(&year)?;
            json!({ "status": "success", "results": plan.len(), "data": { "plan": to_json_array(&plan) } })
        }
        Command::Metrics => {
            out.write_all(telemetry::metrics_text().as_bytes())?;
            return Ok(());
        }
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&envelope)?)?;
    Ok(())
}

/// `{status, message}` for a failed command: `fail` for caller mistakes, `error` otherwise.
#[must_use]
pub fn error_envelope(err: &CatalogError) -> Value {
    let status = match err.kind() {
        ErrorKind::StoreFailure => "error",
        ErrorKind::ValidationFailure | ErrorKind::NotFound | ErrorKind::MalformedParameter => "fail",
    };
    json!({ "status": status, "message": err.to_string() })
}

fn listing(docs: &[BsonDocument]) -> Value {
    json!({ "status": "success", "results": docs.len(), "data": { "tours": to_json_array(docs) } })
}

fn single(doc: &BsonDocument) -> Value {
    json!({ "status": "success", "data": { "tour": to_json(doc) } })
}

fn read_body(body: &str) -> Result<String, CatalogError> {
    match body.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(body.to_string()),
    }
}
