use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use subwatch::config::Config;
use subwatch::models::Location;

/// Per-test-unique suffix so concurrently-running tests in this binary never
/// collide on the same sqlite file — `cargo test` runs tests in this file on
/// multiple threads of one process, so anything keyed on `process::id()`
/// alone is shared, not unique, across them.
fn unique_suffix() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64;
    nanos.wrapping_add(COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Builds a `Config` directly instead of through `Config::from_env()` —
/// tests in this file run concurrently in one process, so routing
/// configuration through `std::env::set_var` plus shared process
/// environment would race every other test reading the same variables.
fn test_config(db_path: &str) -> Config {
    Config {
        database_path: db_path.to_string(),
        target_domain: "example.test".to_string(),
        probe_interval_minutes: 1,
        discovery_interval_hours: 6,
        probe_timeout: Duration::from_secs(10),
        connection_cap: 10,
        probe_body_limit_bytes: 10 * 1024,
        heartbeat_online_window_minutes: 10,
        allowed_locations: vec![Location::Eu, Location::Ph, Location::Sg],
        seed_subdomains: vec!["example.test".to_string()],
    }
}

fn test_client() -> Client {
    let db_path = format!("/tmp/subwatch_test_{}_{}.db", std::process::id(), unique_suffix());
    let _ = std::fs::remove_file(&db_path);

    let config = test_config(&db_path);
    let db = Arc::new(subwatch::store::Db::new(&db_path).expect("DB init failed"));
    let scheduler = Arc::new(subwatch::scheduler::Scheduler::new(
        db.clone(),
        config.clone(),
        config.seed_subdomains.clone(),
    ));

    let rocket = rocket::build()
        .manage(db)
        .manage(config)
        .manage(scheduler)
        .mount("/api", rocket::routes![
            subwatch::routes::geo_report,
            subwatch::routes::subdomains,
            subwatch::routes::non_up_subdomains,
            subwatch::routes::inactive_subdomains,
            subwatch::routes::other_dns,
            subwatch::routes::check_history,
            subwatch::routes::agent_status,
            subwatch::routes::health,
            subwatch::routes::scheduler_start,
            subwatch::routes::scheduler_stop,
            subwatch::routes::checks_run,
        ])
        .register("/", rocket::catchers![
            subwatch::catchers::bad_request,
            subwatch::catchers::forbidden,
            subwatch::catchers::not_found,
            subwatch::catchers::unprocessable_entity,
            subwatch::catchers::internal_error,
        ]);

    Client::tracked(rocket).expect("valid rocket instance")
}

#[test]
fn health_reports_empty_registry() {
    let client = test_client();
    let response = client.get("/api/health").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["registry_count"], 0);
}

#[test]
fn geo_report_accepts_known_location_lowercase() {
    let client = test_client();
    let payload = serde_json::json!({
        "location": "sg",
        "results": [{
            "subdomain": "api.example.test",
            "up": true,
            "status_code": 200,
            "response_time_ms": 120
        }]
    });

    let response = client
        .post("/api/geo-report")
        .header(ContentType::JSON)
        .body(payload.to_string())
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["received"], 1);

    let agents = client.get("/api/agent-status").dispatch();
    let agents: serde_json::Value = agents.into_json().unwrap();
    assert_eq!(agents[0]["location"], "SG");
    assert_eq!(agents[0]["online"], true);
}

#[test]
fn geo_report_rejects_unknown_location() {
    let client = test_client();
    let payload = serde_json::json!({
        "location": "US",
        "results": [{ "subdomain": "api.example.test", "up": true }]
    });

    let response = client
        .post("/api/geo-report")
        .header(ContentType::JSON)
        .body(payload.to_string())
        .dispatch();

    assert_eq!(response.status(), Status::Forbidden);
    let body: serde_json::Value = response.into_json().unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED_LOCATION");

    let subdomains = client.get("/api/subdomains").dispatch();
    let subdomains: serde_json::Value = subdomains.into_json().unwrap();
    assert!(subdomains.as_array().unwrap().is_empty());
}

#[test]
fn geo_report_registers_unknown_host_lazily() {
    let client = test_client();
    let payload = serde_json::json!({
        "location": "EU",
        "results": [{ "subdomain": "never-seen.example.test", "up": true, "status_code": 200 }]
    });

    let response = client
        .post("/api/geo-report")
        .header(ContentType::JSON)
        .body(payload.to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let subdomains = client.get("/api/subdomains").dispatch();
    let subdomains: serde_json::Value = subdomains.into_json().unwrap();
    let hosts: Vec<&str> = subdomains.as_array().unwrap().iter()
        .map(|s| s["subdomain"].as_str().unwrap())
        .collect();
    assert!(hosts.contains(&"never-seen.example.test"));
}

#[test]
fn three_consecutive_ups_flip_status_to_up() {
    let client = test_client();
    for _ in 0..3 {
        let payload = serde_json::json!({
            "location": "PH",
            "results": [{ "subdomain": "steady.example.test", "up": true, "status_code": 200 }]
        });
        let response = client
            .post("/api/geo-report")
            .header(ContentType::JSON)
            .body(payload.to_string())
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
    }

    let subdomains = client.get("/api/subdomains").dispatch();
    let subdomains: serde_json::Value = subdomains.into_json().unwrap();
    let entry = subdomains.as_array().unwrap().iter()
        .find(|s| s["subdomain"] == "steady.example.test")
        .expect("host present");
    assert_eq!(entry["current_status"], "UP");
}

#[test]
fn check_history_returns_records_for_host() {
    let client = test_client();
    let payload = serde_json::json!({
        "location": "EU",
        "results": [{ "subdomain": "history.example.test", "up": true, "status_code": 200, "response_time_ms": 50 }]
    });
    client.post("/api/geo-report").header(ContentType::JSON).body(payload.to_string()).dispatch();

    let response = client.get("/api/subdomains/history.example.test/checks?hours=24").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().unwrap();
    assert_eq!(body["checks"].as_array().unwrap().len(), 1);
}

#[test]
fn check_history_404s_for_unknown_host() {
    let client = test_client();
    let response = client.get("/api/subdomains/never-registered.example.test/checks").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    let body: serde_json::Value = response.into_json().unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[test]
fn non_up_subdomains_partitions_by_status() {
    let client = test_client();
    for _ in 0..3 {
        let payload = serde_json::json!({
            "location": "EU",
            "results": [{ "subdomain": "flaky.example.test", "up": false, "status_code": 503 }]
        });
        client.post("/api/geo-report").header(ContentType::JSON).body(payload.to_string()).dispatch();
    }

    let response = client.get("/api/subdomains/non-up").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().unwrap();
    let down = body["down"].as_array().unwrap();
    assert!(down.iter().any(|s| s["subdomain"] == "flaky.example.test"));
    assert!(body["flapping"].as_array().unwrap().is_empty());
    assert!(body["unknown"].as_array().unwrap().is_empty());
}

#[test]
fn dns_enumeration_only_lists_matching_discovery_method() {
    let client = test_client();
    let response = client.get("/api/subdomains/dns-enumeration").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().unwrap();
    assert!(body.as_array().unwrap().is_empty());
}

#[test]
fn inactive_subdomains_starts_empty() {
    let client = test_client();
    let response = client.get("/api/subdomains/inactive").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().unwrap();
    assert!(body.as_array().unwrap().is_empty());
}

#[test]
fn scheduler_stop_then_start_round_trips() {
    let client = test_client();
    let stopped = client.post("/api/scheduler/stop").dispatch();
    assert_eq!(stopped.status(), Status::Ok);

    let health = client.get("/api/health").dispatch();
    let body: serde_json::Value = health.into_json().unwrap();
    assert_eq!(body["scheduler"]["running"], false);

    let started = client
        .post("/api/scheduler/start")
        .header(ContentType::JSON)
        .body(serde_json::json!({ "interval_minutes": 5 }).to_string())
        .dispatch();
    assert_eq!(started.status(), Status::Ok);

    let health = client.get("/api/health").dispatch();
    let body: serde_json::Value = health.into_json().unwrap();
    assert_eq!(body["scheduler"]["running"], true);
    assert_eq!(body["scheduler"]["probe_interval_minutes"], 5);
}
