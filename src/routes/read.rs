use crate::config::Config;
use crate::error::AppError;
use crate::models::{AgentStatus, NonUpSummary, Subdomain, SubdomainWithStats};
use crate::store::Db;
use chrono::NaiveDateTime;
use rocket::get;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

/// `GET /api/subdomains` — full active registry with 24h stats (C8).
#[get("/subdomains")]
pub fn subdomains(db: &State<Arc<Db>>) -> Result<Json<Vec<SubdomainWithStats>>, (Status, Json<serde_json::Value>)> {
    db.all_with_stats()
        .map(Json)
        .map_err(|e| e.into_response())
}

/// `GET /api/subdomains/non-up` — active entries whose `current_status !=
/// UP`, partitioned into DOWN/FLAPPING/UNKNOWN (C8 `non_up_subdomains()`).
#[get("/subdomains/non-up")]
pub fn non_up_subdomains(db: &State<Arc<Db>>) -> Result<Json<NonUpSummary>, (Status, Json<serde_json::Value>)> {
    let entries = db.non_up().map_err(|e| e.into_response())?;
    let (mut down, mut flapping, mut unknown) = (Vec::new(), Vec::new(), Vec::new());
    for entry in entries {
        match entry.current_status {
            crate::models::Status::Down => down.push(entry),
            crate::models::Status::Flapping => flapping.push(entry),
            crate::models::Status::Unknown => unknown.push(entry),
            crate::models::Status::Up => {}
        }
    }
    Ok(Json(NonUpSummary { down, flapping, unknown }))
}

/// `GET /api/subdomains/inactive` — discovered hosts no longer active (C8
/// `inactive_subdomains()`).
#[get("/subdomains/inactive")]
pub fn inactive_subdomains(db: &State<Arc<Db>>) -> Result<Json<Vec<Subdomain>>, (Status, Json<serde_json::Value>)> {
    db.inactive().map(Json).map_err(|e| e.into_response())
}

/// `GET /api/subdomains/dns-enumeration` — hosts discovered only via DNS
/// enumeration that never came up (C8 `other_dns()`, spec.md §9's
/// resolution: a `discovery_method` value, not a separate table).
#[get("/subdomains/dns-enumeration")]
pub fn other_dns(db: &State<Arc<Db>>) -> Result<Json<Vec<Subdomain>>, (Status, Json<serde_json::Value>)> {
    db.dns_enumeration_only().map(Json).map_err(|e| e.into_response())
}

/// `GET /api/subdomains/{host}/checks?hours=N` — reverse-chronological
/// check history for one host (C8). Defaults to 24 hours. 404s via
/// `AppError::NotFound` if `host` was never registered.
#[get("/subdomains/<host>/checks?<hours>")]
pub fn check_history(
    host: &str,
    hours: Option<u32>,
    db: &State<Arc<Db>>,
) -> Result<Json<serde_json::Value>, (Status, Json<serde_json::Value>)> {
    if !db.exists(host).map_err(|e| e.into_response())? {
        return Err(AppError::NotFound(host.to_string()).into_response());
    }

    let hours = hours.unwrap_or(24).clamp(1, 24 * 90);
    let records = db.range(host, hours).map_err(|e| e.into_response())?;
    Ok(Json(serde_json::json!({ "subdomain": host, "hours": hours, "checks": records })))
}

/// `GET /api/agent-status` — per-location heartbeat summary (C8), online if
/// the last-seen delta is under the configured window (default 10 minutes).
#[get("/agent-status")]
pub fn agent_status(
    db: &State<Arc<Db>>,
    config: &State<Config>,
) -> Result<Json<Vec<AgentStatus>>, (Status, Json<serde_json::Value>)> {
    let heartbeats = db.list_heartbeats().map_err(|e| e.into_response())?;
    let now = chrono::Utc::now().naive_utc();

    let statuses = heartbeats
        .into_iter()
        .map(|(location, last_seen)| {
            let minutes_since = NaiveDateTime::parse_from_str(&last_seen, "%Y-%m-%d %H:%M:%S")
                .map(|ts| (now - ts).num_minutes())
                .unwrap_or(i64::MAX);
            AgentStatus {
                location,
                last_seen,
                minutes_since_last_seen: minutes_since,
                online: minutes_since < config.heartbeat_online_window_minutes,
            }
        })
        .collect();

    Ok(Json(statuses))
}
