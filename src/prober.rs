use crate::config::Config;
use crate::fingerprint::{self, Headers};
use crate::models::{CheckRecord, Location};
use crate::store::Db;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;

/// One probe outcome before it's handed to the state machine and written.
struct ProbeOutcome {
    subdomain: String,
    status_code: Option<u16>,
    response_time_ms: Option<u32>,
    up: bool,
    platform: Option<String>,
    error_message: Option<String>,
    headers: serde_json::Value,
}

/// Probes every active subdomain concurrently, bounded by
/// `config.connection_cap` in-flight requests at a time, and persists each
/// outcome. Mirrors `execute_http_check`/`process_check_result` from the
/// teacher's checker, generalized to HTTPS-then-HTTP fallback and the
/// fingerprint/state-machine pipeline this crate's spec requires.
pub async fn run_probe_cycle(db: &Arc<Db>, config: &Config, client: &reqwest::Client) {
    let hosts = match db.list_active() {
        Ok(h) => h,
        Err(e) => {
            tracing::warn!(error = %e, "probe cycle: failed to list active registry");
            return;
        }
    };

    if hosts.is_empty() {
        tracing::debug!("probe cycle: registry empty, nothing to probe");
        return;
    }

    tracing::info!(count = hosts.len(), "probe cycle starting");

    let cap = config.connection_cap.max(1);
    let results: Vec<ProbeOutcome> = stream::iter(hosts.into_iter())
        .map(|host| probe_one(client, host, config))
        .buffer_unordered(cap)
        .collect()
        .await;

    for outcome in results {
        persist_outcome(db, outcome);
    }

    tracing::info!("probe cycle complete");
}

async fn probe_one(client: &reqwest::Client, host: String, config: &Config) -> ProbeOutcome {
    let start = Instant::now();

    let https_url = format!("https://{}", host);
    let http_url = format!("http://{}", host);

    let mut response = client.get(&https_url).send().await;
    if response.is_err() {
        response = client.get(&http_url).send().await;
    }

    match response {
        Ok(resp) => {
            let status_code = resp.status().as_u16();
            let up = status_code < 500;

            let mut headers_map: Headers = Headers::new();
            let mut headers_json = serde_json::Map::new();
            for (name, value) in resp.headers().iter() {
                if let Ok(v) = value.to_str() {
                    headers_map.insert(name.as_str().to_ascii_lowercase(), v.to_string());
                    headers_json.insert(name.as_str().to_string(), serde_json::Value::String(v.to_string()));
                }
            }

            let body_prefix = match resp.bytes().await {
                Ok(bytes) => {
                    let cap = config.probe_body_limit_bytes.min(bytes.len());
                    String::from_utf8_lossy(&bytes[..cap]).to_string()
                }
                Err(_) => String::new(),
            };

            let response_time_ms = start.elapsed().as_millis() as u32;
            let platform = fingerprint::fingerprint(&headers_map, &body_prefix);

            ProbeOutcome {
                subdomain: host,
                status_code: Some(status_code),
                response_time_ms: Some(response_time_ms),
                up,
                platform: Some(platform),
                error_message: None,
                headers: serde_json::Value::Object(headers_json),
            }
        }
        Err(e) => {
            let reason = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connection refused"
            } else {
                "request failed"
            };
            ProbeOutcome {
                subdomain: host,
                status_code: None,
                response_time_ms: None,
                up: false,
                platform: None,
                error_message: Some(format!("{}: {}", reason, e)),
                headers: serde_json::json!({}),
            }
        }
    }
}

fn persist_outcome(db: &Arc<Db>, outcome: ProbeOutcome) {
    let record = CheckRecord {
        time: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        subdomain: outcome.subdomain.clone(),
        location: Location::Local,
        status_code: outcome.status_code,
        response_time_ms: outcome.response_time_ms,
        up: outcome.up,
        platform: outcome.platform.clone(),
        error_message: outcome.error_message,
        headers: outcome.headers,
    };

    if let Err(e) = db.record_probe_outcome(&outcome.subdomain, outcome.platform.as_deref(), &record, outcome.up) {
        tracing::warn!(host = %outcome.subdomain, error = %e, "failed to record probe outcome");
    }
}

pub fn build_client(config: &Config) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(config.probe_timeout)
        .connect_timeout(std::time::Duration::from_secs(5))
        .build()
}
