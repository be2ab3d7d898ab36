use crate::config::Config;
use crate::error::AppError;
use crate::models::{GeoReport, GeoReportResponse, Location};
use crate::store::Db;
use rocket::http::Status;
use rocket::post;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

/// `POST /api/geo-report` — ingest a batched report from a remote agent
/// (C7). Unknown location is rejected before any store access; a malformed
/// batch fails atomically, matching `submit_probe`'s shape in the teacher
/// but with whole-batch-or-nothing semantics instead of per-row partial
/// acceptance. Every rejection goes through `AppError` so there is one place
/// that decides the `{"error": ..., "code": ...}` shape, not one per call site.
#[post("/geo-report", data = "<body>")]
pub fn geo_report(
    body: Json<GeoReport>,
    db: &State<Arc<Db>>,
    config: &State<Config>,
) -> Result<Json<GeoReportResponse>, (Status, Json<serde_json::Value>)> {
    let location = Location::parse(&body.location)
        .filter(|loc| *loc != Location::Local && config.allowed_locations.contains(loc))
        .ok_or_else(|| AppError::UnauthorizedLocation(body.location.clone()))
        .map_err(AppError::into_response)?;

    if body.results.is_empty() {
        return Err(AppError::MalformedReport("results must contain at least one entry".to_string()).into_response());
    }

    for result in &body.results {
        if result.subdomain.trim().is_empty() {
            return Err(AppError::MalformedReport("malformed result entry: subdomain is required".to_string()).into_response());
        }
    }

    let received = db.apply_geo_report(location, &config.target_domain, &body.results)
        .map_err(AppError::into_response)?;

    Ok(Json(GeoReportResponse { status: "success", received }))
}
