use serde::{Deserialize, Serialize};

/// Health classification of a subdomain. Initial value for a freshly
/// discovered host is `Unknown` until three agreeing outcomes accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
    Flapping,
    Unknown,
}

impl Status {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
            Status::Flapping => "FLAPPING",
            Status::Unknown => "UNKNOWN",
        }
    }

    pub fn from_db_str(s: &str) -> Status {
        match s {
            "UP" => Status::Up,
            "DOWN" => Status::Down,
            "FLAPPING" => Status::Flapping,
            _ => Status::Unknown,
        }
    }
}

/// How a registry entry came to exist. Closed per the Open Questions
/// resolution: DNS-enumeration survivors that never came up are still rows
/// here with this method, not a separate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryMethod {
    Seed,
    PrefixScan,
    HtmlScrape,
    DnsEnumeration,
}

impl DiscoveryMethod {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            DiscoveryMethod::Seed => "seed",
            DiscoveryMethod::PrefixScan => "prefix-scan",
            DiscoveryMethod::HtmlScrape => "html-scrape",
            DiscoveryMethod::DnsEnumeration => "dns-enumeration",
        }
    }

    pub fn from_db_str(s: &str) -> DiscoveryMethod {
        match s {
            "prefix-scan" => DiscoveryMethod::PrefixScan,
            "html-scrape" => DiscoveryMethod::HtmlScrape,
            "dns-enumeration" => DiscoveryMethod::DnsEnumeration,
            _ => DiscoveryMethod::Seed,
        }
    }
}

/// Vantage point a check was performed from. `Local` is the engine's own
/// prober (C3); the three geo tags are remote agents (C7) and the only
/// values the ingest whitelist accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Location {
    Eu,
    Ph,
    Sg,
    Local,
}

impl Location {
    /// Case-insensitive parse, matching spec.md §6's canonicalization rule.
    pub fn parse(raw: &str) -> Option<Location> {
        match raw.to_ascii_uppercase().as_str() {
            "EU" => Some(Location::Eu),
            "PH" => Some(Location::Ph),
            "SG" => Some(Location::Sg),
            "LOCAL" => Some(Location::Local),
            _ => None,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            Location::Eu => "EU",
            Location::Ph => "PH",
            Location::Sg => "SG",
            Location::Local => "LOCAL",
        }
    }

    pub fn from_db_str(s: &str) -> Location {
        Location::parse(s).unwrap_or(Location::Local)
    }
}

/// State-machine fields carried on each registry entry (spec.md §3).
#[derive(Debug, Clone, Copy)]
pub struct StateFields {
    pub current_status: Status,
    pub consecutive_up_count: u32,
    pub consecutive_down_count: u32,
    pub is_flapping: bool,
}

impl Default for StateFields {
    fn default() -> Self {
        StateFields {
            current_status: Status::Unknown,
            consecutive_up_count: 0,
            consecutive_down_count: 0,
            is_flapping: false,
        }
    }
}

/// A single subdomain registry entry, as returned by the Read API.
#[derive(Debug, Clone, Serialize)]
pub struct Subdomain {
    pub subdomain: String,
    pub domain: String,
    pub discovered_at: String,
    pub last_seen: Option<String>,
    pub active: bool,
    pub platform: Option<String>,
    pub last_platform_check: Option<String>,
    pub discovery_method: DiscoveryMethod,
    pub current_status: Status,
    pub consecutive_up_count: u32,
    pub consecutive_down_count: u32,
    pub is_flapping: bool,
    pub last_status_change: Option<String>,
}

/// A subdomain joined with its 24h aggregate, as `GET /api/subdomains` returns.
#[derive(Debug, Clone, Serialize)]
pub struct SubdomainWithStats {
    #[serde(flatten)]
    pub subdomain: Subdomain,
    pub checks_24h: u32,
    pub uptime_pct_24h: f64,
    pub latest_response_time_ms: Option<u32>,
}

/// One outcome as read back from the store for state-machine evaluation.
/// Reverse-chronological; `recent(host, 5)` returns these newest-first.
#[derive(Debug, Clone, Copy)]
pub struct CheckOutcome {
    pub up: bool,
}

/// An immutable, append-only check record (spec.md §3).
#[derive(Debug, Clone, Serialize)]
pub struct CheckRecord {
    pub time: String,
    pub subdomain: String,
    pub location: Location,
    pub status_code: Option<u16>,
    pub response_time_ms: Option<u32>,
    pub up: bool,
    pub platform: Option<String>,
    pub error_message: Option<String>,
    pub headers: serde_json::Value,
}

/// Per-location heartbeat (spec.md §3/§4.8).
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub location: Location,
    pub last_seen: String,
    pub minutes_since_last_seen: i64,
    pub online: bool,
}

// ── Geo-Ingest wire types (C7) ──

#[derive(Debug, Deserialize)]
pub struct GeoReport {
    pub location: String,
    pub results: Vec<GeoReportResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeoReportResult {
    pub subdomain: String,
    pub timestamp: Option<String>,
    pub status_code: Option<u16>,
    pub response_time_ms: Option<u32>,
    pub up: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeoReportResponse {
    pub status: &'static str,
    pub received: usize,
}

// ── Read API response shapes (C8) ──

#[derive(Debug, Serialize)]
pub struct NonUpSummary {
    pub down: Vec<Subdomain>,
    pub flapping: Vec<Subdomain>,
    pub unknown: Vec<Subdomain>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub registry_count: u32,
    pub scheduler: crate::scheduler::SchedulerSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SchedulerStartRequest {
    pub interval_minutes: Option<u32>,
}
