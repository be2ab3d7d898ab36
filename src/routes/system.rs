use crate::models::{HealthStatus, SchedulerStartRequest};
use crate::scheduler::Scheduler;
use crate::store::Db;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use std::sync::Arc;

/// `GET /api/health` — liveness, scheduler state, registry count.
#[get("/health")]
pub fn health(
    db: &State<Arc<Db>>,
    scheduler: &State<Arc<Scheduler>>,
) -> Result<Json<HealthStatus>, (Status, Json<serde_json::Value>)> {
    let registry_count = db.registry_count().map_err(|e| e.into_response())?;
    Ok(Json(HealthStatus {
        status: "ok",
        registry_count,
        scheduler: scheduler.snapshot(),
    }))
}

/// `POST /api/scheduler/start` — resume firing, optionally at a new probe
/// interval.
#[post("/scheduler/start", data = "<body>")]
pub fn scheduler_start(
    body: Option<Json<SchedulerStartRequest>>,
    scheduler: &State<Arc<Scheduler>>,
) -> Json<serde_json::Value> {
    let interval = body.and_then(|b| b.interval_minutes);
    scheduler.start(interval);
    Json(serde_json::json!({ "status": "started" }))
}

/// `POST /api/scheduler/stop` — stop new firings; in-flight jobs still drain.
#[post("/scheduler/stop")]
pub fn scheduler_stop(scheduler: &State<Arc<Scheduler>>) -> Json<serde_json::Value> {
    scheduler.stop();
    Json(serde_json::json!({ "status": "stopped" }))
}

/// `POST /api/checks/run` — manually trigger one discovery+probe cycle,
/// still subject to the `max_instances = 1` guard each job already has.
#[post("/checks/run")]
pub async fn checks_run(scheduler: &State<Arc<Scheduler>>) -> Json<serde_json::Value> {
    let scheduler = scheduler.inner().clone();
    scheduler.trigger_discovery_now().await;
    scheduler.trigger_probe_now().await;
    Json(serde_json::json!({ "status": "triggered" }))
}
