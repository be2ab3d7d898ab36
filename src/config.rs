use std::time::Duration;

/// Typed configuration, loaded once at startup via `dotenvy` + `std::env`.
/// Mirrors the options spec.md §6 recognizes; no option has a hidden default
/// beyond what's documented here. `DATABASE_PATH` is the one exception spec.md
/// calls out explicitly as "required; no default" — `from_env` panics at
/// startup rather than picking an implicit path if it's unset.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub target_domain: String,
    pub probe_interval_minutes: u32,
    pub discovery_interval_hours: u32,
    pub probe_timeout: Duration,
    pub connection_cap: usize,
    pub probe_body_limit_bytes: usize,
    pub heartbeat_online_window_minutes: i64,
    pub allowed_locations: Vec<crate::models::Location>,
    pub seed_subdomains: Vec<String>,
}

impl Config {
    /// Loads configuration from the environment. `.env` is read first (if
    /// present) the way the teacher loads it in `main.rs`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_path = std::env::var("DATABASE_PATH")
            .expect("DATABASE_PATH must be set: the database connection string has no default (spec.md §6)");

        let target_domain = std::env::var("TARGET_DOMAIN")
            .unwrap_or_else(|_| "bettergov.ph".to_string());

        let probe_interval_minutes = env_u32("PROBE_INTERVAL_MINUTES", 1);
        let discovery_interval_hours = env_u32("DISCOVERY_INTERVAL_HOURS", 6);
        let probe_timeout = Duration::from_secs(env_u32("PROBE_TIMEOUT_SECONDS", 10) as u64);
        let connection_cap = env_u32("CONNECTION_CAP", 10) as usize;
        let probe_body_limit_bytes = env_u32("PROBE_BODY_LIMIT_BYTES", 10 * 1024) as usize;
        let heartbeat_online_window_minutes = env_u32("HEARTBEAT_ONLINE_WINDOW_MINUTES", 10) as i64;

        let allowed_locations = std::env::var("ALLOWED_AGENT_LOCATIONS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .filter_map(|s| crate::models::Location::parse(s.trim()))
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| vec![
                crate::models::Location::Eu,
                crate::models::Location::Ph,
                crate::models::Location::Sg,
            ]);

        let seed_subdomains = std::env::var("SEED_SUBDOMAINS")
            .ok()
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .filter(|v: &Vec<String>| !v.is_empty())
            .unwrap_or_else(|| vec![target_domain.clone()]);

        Config {
            database_path,
            target_domain,
            probe_interval_minutes,
            discovery_interval_hours,
            probe_timeout,
            connection_cap,
            probe_body_limit_bytes,
            heartbeat_online_window_minutes,
            allowed_locations,
            seed_subdomains,
        }
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_minutes as u64 * 60)
    }

    pub fn discovery_interval(&self) -> Duration {
        Duration::from_secs(self.discovery_interval_hours as u64 * 3600)
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
