use crate::error::AppError;
use crate::models::{
    CheckOutcome, CheckRecord, DiscoveryMethod, Location, StateFields,
    Status, Subdomain, SubdomainWithStats,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

/// Wraps a single `rusqlite::Connection` behind a mutex, the same shape the
/// teacher uses in `db.rs`. All mutations for one inbound report (heartbeat +
/// check rows + state commits) run while holding this one guard for the
/// duration of the batch, giving the atomicity spec.md §4.1 requires without
/// needing rusqlite's own transaction API to cross an await point.
pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    pub fn new(path: &str) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;",
        )?;
        let db = Db { conn: Mutex::new(conn) };
        db.migrate()?;
        Ok(db)
    }

    #[cfg(test)]
    pub fn in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let db = Db { conn: Mutex::new(conn) };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS subdomains (
                subdomain TEXT PRIMARY KEY,
                domain TEXT NOT NULL,
                discovered_at TEXT NOT NULL DEFAULT (datetime('now')),
                last_seen TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                platform TEXT,
                last_platform_check TEXT,
                discovery_method TEXT NOT NULL DEFAULT 'seed',
                current_status TEXT NOT NULL DEFAULT 'UNKNOWN',
                consecutive_up_count INTEGER NOT NULL DEFAULT 0,
                consecutive_down_count INTEGER NOT NULL DEFAULT 0,
                is_flapping INTEGER NOT NULL DEFAULT 0,
                last_status_change TEXT
            );

            CREATE TABLE IF NOT EXISTS uptime_checks (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                time TEXT NOT NULL DEFAULT (datetime('now')),
                subdomain TEXT NOT NULL REFERENCES subdomains(subdomain) ON DELETE CASCADE,
                status_code INTEGER,
                response_time_ms INTEGER,
                up INTEGER NOT NULL,
                platform TEXT,
                error_message TEXT,
                location TEXT NOT NULL,
                headers TEXT NOT NULL DEFAULT '{}'
            );
            CREATE INDEX IF NOT EXISTS idx_uptime_checks_subdomain_time ON uptime_checks(subdomain, time DESC);
            CREATE INDEX IF NOT EXISTS idx_uptime_checks_subdomain_seq ON uptime_checks(subdomain, seq DESC);

            CREATE TABLE IF NOT EXISTS agent_heartbeats (
                location TEXT PRIMARY KEY,
                last_seen TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active'
            );
            ",
        )?;

        Ok(())
    }

    // ── Registry ──

    pub fn list_active(&self) -> Result<Vec<String>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT subdomain FROM subdomains WHERE active = 1 ORDER BY subdomain ASC")
            .map_err(store_err)?;
        let hosts = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(store_err)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(hosts)
    }

    pub fn exists(&self, host: &str) -> Result<bool, AppError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT 1 FROM subdomains WHERE subdomain = ?1", params![host], |_| Ok(()))
            .optional()
            .map(|o| o.is_some())
            .map_err(store_err)
    }

    pub fn upsert(&self, host: &str, domain: &str, method: DiscoveryMethod) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        with_write_retry(|| {
            conn.execute(
                "INSERT INTO subdomains (subdomain, domain, discovered_at, last_seen, discovery_method)
                 VALUES (?1, ?2, datetime('now'), datetime('now'), ?3)
                 ON CONFLICT(subdomain) DO UPDATE SET last_seen = datetime('now')",
                params![host, domain, method.as_db_str()],
            )
        })?;
        Ok(())
    }

    /// Lazily registers `host` if it is not already present. Used by C7 when
    /// a geo-report names a subdomain the registry has never seen — this
    /// crate's resolution of the open "register or drop" sub-question is to
    /// register, consistent with C2's "registry never shrinks" rule.
    pub fn ensure_registered(&self, host: &str, domain: &str) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        with_write_retry(|| {
            conn.execute(
                "INSERT OR IGNORE INTO subdomains (subdomain, domain, discovered_at, discovery_method)
                 VALUES (?1, ?2, datetime('now'), 'seed')",
                params![host, domain],
            )
        })?;
        Ok(())
    }

    pub fn set_platform(&self, host: &str, platform: &str) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        set_platform_locked(&conn, host, platform)
    }

    pub fn load_state(&self, host: &str) -> Result<StateFields, AppError> {
        let conn = self.conn.lock().unwrap();
        load_state_locked(&conn, host)
    }

    pub fn commit_state(&self, host: &str, state: StateFields, status_changed: bool) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        commit_state_locked(&conn, host, state, status_changed)
    }

    // ── Checks ──

    pub fn append(&self, record: &CheckRecord) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        append_locked(&conn, record)
    }

    /// Reverse-chronological, most recent first. Inclusive of anything
    /// appended earlier in the same transaction, since both calls share the
    /// one `Mutex` guard.
    pub fn recent(&self, host: &str, n: u32) -> Result<Vec<CheckOutcome>, AppError> {
        let conn = self.conn.lock().unwrap();
        recent_locked(&conn, host, n)
    }

    pub fn range(&self, host: &str, since_hours: u32) -> Result<Vec<CheckRecord>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT time, subdomain, location, status_code, response_time_ms, up, platform, error_message, headers
                 FROM uptime_checks
                 WHERE subdomain = ?1 AND time > datetime('now', ?2)
                 ORDER BY time DESC",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map(params![host, format!("-{} hours", since_hours)], row_to_check_record)
            .map_err(store_err)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    // ── Heartbeats ──

    pub fn touch_heartbeat(&self, location: Location) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        touch_heartbeat_locked(&conn, location)
    }

    pub fn list_heartbeats(&self) -> Result<Vec<(Location, String)>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT location, last_seen FROM agent_heartbeats ORDER BY location ASC")
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], |row| {
                let loc: String = row.get(0)?;
                let last_seen: String = row.get(1)?;
                Ok((Location::from_db_str(&loc), last_seen))
            })
            .map_err(store_err)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    // ── Aggregates ──

    pub fn stats_24h(&self, host: &str) -> Result<(u32, f64), AppError> {
        let conn = self.conn.lock().unwrap();
        stats_24h_locked(&conn, host)
    }

    pub fn latest(&self, host: &str) -> Result<Option<CheckRecord>, AppError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT time, subdomain, location, status_code, response_time_ms, up, platform, error_message, headers
             FROM uptime_checks WHERE subdomain = ?1 ORDER BY seq DESC LIMIT 1",
            params![host],
            row_to_check_record,
        )
        .optional()
        .map_err(store_err)
    }

    pub fn all_with_stats(&self) -> Result<Vec<SubdomainWithStats>, AppError> {
        let conn = self.conn.lock().unwrap();
        let hosts: Vec<Subdomain> = {
            let mut stmt = conn
                .prepare("SELECT * FROM subdomains WHERE active = 1 ORDER BY subdomain ASC")
                .map_err(store_err)?;
            stmt.query_map([], row_to_subdomain)
                .map_err(store_err)?
                .filter_map(|r| r.ok())
                .collect()
        };

        let mut out = Vec::with_capacity(hosts.len());
        for s in hosts {
            let (count, pct) = stats_24h_locked(&conn, &s.subdomain)?;
            let latest_rt: Option<u32> = conn
                .query_row(
                    "SELECT response_time_ms FROM uptime_checks WHERE subdomain = ?1 ORDER BY seq DESC LIMIT 1",
                    params![s.subdomain],
                    |row| row.get(0),
                )
                .optional()
                .map_err(store_err)?
                .flatten();
            out.push(SubdomainWithStats {
                subdomain: s,
                checks_24h: count,
                uptime_pct_24h: pct,
                latest_response_time_ms: latest_rt,
            });
        }
        Ok(out)
    }

    pub fn non_up(&self) -> Result<Vec<Subdomain>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT * FROM subdomains WHERE active = 1 AND current_status != 'UP' ORDER BY subdomain ASC")
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], row_to_subdomain)
            .map_err(store_err)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    pub fn inactive(&self) -> Result<Vec<Subdomain>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT * FROM subdomains WHERE active = 0 ORDER BY subdomain ASC")
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], row_to_subdomain)
            .map_err(store_err)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    pub fn dns_enumeration_only(&self) -> Result<Vec<Subdomain>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT * FROM subdomains WHERE discovery_method = 'dns-enumeration' ORDER BY subdomain ASC")
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], row_to_subdomain)
            .map_err(store_err)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    pub fn registry_count(&self) -> Result<u32, AppError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM subdomains WHERE active = 1", [], |r| r.get(0))
            .map_err(store_err)
    }

    /// Applies one geo-ingest batch atomically: upsert the heartbeat, then
    /// for each result append the check record and run the state machine,
    /// all under the one connection guard so no partial batch is ever
    /// observable (spec.md §4.7).
    pub fn apply_geo_report(
        &self,
        location: Location,
        domain: &str,
        results: &[crate::models::GeoReportResult],
    ) -> Result<usize, AppError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(store_err)?;

        touch_heartbeat_locked(&tx, location)?;

        for result in results {
            with_write_retry(|| {
                tx.execute(
                    "INSERT OR IGNORE INTO subdomains (subdomain, domain, discovered_at, discovery_method)
                     VALUES (?1, ?2, datetime('now'), 'seed')",
                    params![result.subdomain, domain],
                )
            })?;

            let now = result.timestamp.clone().unwrap_or_else(|| chrono_now());
            let record = CheckRecord {
                time: now,
                subdomain: result.subdomain.clone(),
                location,
                status_code: result.status_code,
                response_time_ms: result.response_time_ms,
                up: result.up,
                platform: None,
                error_message: result.error.clone(),
                headers: serde_json::json!({}),
            };
            append_locked(&tx, &record)?;

            let state = load_state_locked(&tx, &result.subdomain)?;
            let outcomes = recent_locked(&tx, &result.subdomain, 5)?;
            let (new_state, changed) = crate::state_machine::apply(state, &outcomes, result.up);
            commit_state_locked(&tx, &result.subdomain, new_state, changed)?;
        }

        tx.commit().map_err(store_err)?;
        Ok(results.len())
    }

    /// Applies one prober (C3) outcome for a single host atomically: record
    /// the platform, append the check record, then read the five-wide
    /// window and commit the state machine — all under one transaction, the
    /// same shape as `apply_geo_report`. Without this, a geo-report for the
    /// same host could commit between this call's `append` and its
    /// `recent`/`commit_state`, letting the two sources' state commits race
    /// each other; spec.md §5 requires sources to interleave only at
    /// transaction boundaries, so the whole append-through-commit sequence
    /// for one host has to be one boundary, not four.
    pub fn record_probe_outcome(
        &self,
        host: &str,
        platform: Option<&str>,
        record: &CheckRecord,
        is_up: bool,
    ) -> Result<(), AppError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(store_err)?;

        if let Some(platform) = platform {
            set_platform_locked(&tx, host, platform)?;
        }

        append_locked(&tx, record)?;

        let state = load_state_locked(&tx, host)?;
        let outcomes = recent_locked(&tx, host, 5)?;
        let (new_state, changed) = crate::state_machine::apply(state, &outcomes, is_up);
        commit_state_locked(&tx, host, new_state, changed)?;

        tx.commit().map_err(store_err)?;
        Ok(())
    }
}

fn chrono_now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn store_err(e: rusqlite::Error) -> AppError {
    AppError::StoreFatal(e.to_string())
}

const WRITE_RETRY_ATTEMPTS: u32 = 3;
const WRITE_RETRY_DELAY: std::time::Duration = std::time::Duration::from_millis(50);

fn is_transient(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::DatabaseBusy || err.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

/// Constraint violations are fatal to the one record (spec.md §7); anything
/// else that survives three attempts is surfaced as a transient failure.
fn classify_err(e: rusqlite::Error) -> AppError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            AppError::StoreFatal(e.to_string())
        }
        _ => AppError::StoreTransient(e.to_string()),
    }
}

/// Retries a write up to three times on a busy/locked connection, the same
/// shape as `save_check_result`'s retry loop in
/// `original_source/backend/uptime_checker.py` (there: `max_retries = 3`,
/// sleep between attempts). Non-transient failures (constraint violations)
/// return immediately on the first attempt — retrying those would just
/// repeat the same failure.
fn with_write_retry<T>(mut op: impl FnMut() -> rusqlite::Result<T>) -> Result<T, AppError> {
    let mut last_err = None;
    for attempt in 0..WRITE_RETRY_ATTEMPTS {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) => {
                if !is_transient(&e) {
                    return Err(classify_err(e));
                }
                last_err = Some(e);
                if attempt + 1 < WRITE_RETRY_ATTEMPTS {
                    std::thread::sleep(WRITE_RETRY_DELAY);
                }
            }
        }
    }
    Err(AppError::StoreTransient(last_err.unwrap().to_string()))
}

fn set_platform_locked(conn: &Connection, host: &str, platform: &str) -> Result<(), AppError> {
    with_write_retry(|| {
        conn.execute(
            "UPDATE subdomains SET platform = ?1, last_platform_check = datetime('now'), last_seen = datetime('now') WHERE subdomain = ?2",
            params![platform, host],
        )
    })?;
    Ok(())
}

fn load_state_locked(conn: &Connection, host: &str) -> Result<StateFields, AppError> {
    conn.query_row(
        "SELECT current_status, consecutive_up_count, consecutive_down_count, is_flapping FROM subdomains WHERE subdomain = ?1",
        params![host],
        |row| {
            Ok(StateFields {
                current_status: Status::from_db_str(&row.get::<_, String>(0)?),
                consecutive_up_count: row.get::<_, i64>(1)? as u32,
                consecutive_down_count: row.get::<_, i64>(2)? as u32,
                is_flapping: row.get::<_, i64>(3)? != 0,
            })
        },
    )
    .optional()
    .map_err(store_err)
    .map(|o| o.unwrap_or_default())
}

fn commit_state_locked(conn: &Connection, host: &str, state: StateFields, status_changed: bool) -> Result<(), AppError> {
    with_write_retry(|| {
        if status_changed {
            conn.execute(
                "UPDATE subdomains SET current_status = ?1, consecutive_up_count = ?2, consecutive_down_count = ?3,
                 is_flapping = ?4, last_status_change = datetime('now') WHERE subdomain = ?5",
                params![
                    state.current_status.as_db_str(),
                    state.consecutive_up_count,
                    state.consecutive_down_count,
                    state.is_flapping,
                    host,
                ],
            )
        } else {
            conn.execute(
                "UPDATE subdomains SET current_status = ?1, consecutive_up_count = ?2, consecutive_down_count = ?3,
                 is_flapping = ?4 WHERE subdomain = ?5",
                params![
                    state.current_status.as_db_str(),
                    state.consecutive_up_count,
                    state.consecutive_down_count,
                    state.is_flapping,
                    host,
                ],
            )
        }
    })?;
    Ok(())
}

fn append_locked(conn: &Connection, record: &CheckRecord) -> Result<(), AppError> {
    with_write_retry(|| {
        conn.execute(
            "INSERT INTO uptime_checks (time, subdomain, status_code, response_time_ms, up, platform, error_message, location, headers)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.time,
                record.subdomain,
                record.status_code,
                record.response_time_ms,
                record.up,
                record.platform,
                record.error_message,
                record.location.as_db_str(),
                record.headers.to_string(),
            ],
        )
    })?;
    Ok(())
}

fn recent_locked(conn: &Connection, host: &str, n: u32) -> Result<Vec<CheckOutcome>, AppError> {
    let mut stmt = conn
        .prepare("SELECT up FROM uptime_checks WHERE subdomain = ?1 ORDER BY seq DESC LIMIT ?2")
        .map_err(store_err)?;
    let rows = stmt
        .query_map(params![host, n], |row| Ok(CheckOutcome { up: row.get::<_, bool>(0)? }))
        .map_err(store_err)?
        .filter_map(|r| r.ok())
        .collect();
    Ok(rows)
}

fn touch_heartbeat_locked(conn: &Connection, location: Location) -> Result<(), AppError> {
    with_write_retry(|| {
        conn.execute(
            "INSERT INTO agent_heartbeats (location, last_seen, status) VALUES (?1, datetime('now'), 'active')
             ON CONFLICT(location) DO UPDATE SET last_seen = datetime('now'), status = 'active'",
            params![location.as_db_str()],
        )
    })?;
    Ok(())
}

fn stats_24h_locked(conn: &Connection, host: &str) -> Result<(u32, f64), AppError> {
    let total: u32 = conn
        .query_row(
            "SELECT COUNT(*) FROM uptime_checks WHERE subdomain = ?1 AND time > datetime('now', '-24 hours')",
            params![host],
            |row| row.get(0),
        )
        .map_err(store_err)?;
    if total == 0 {
        return Ok((0, 100.0));
    }
    let up: u32 = conn
        .query_row(
            "SELECT COUNT(*) FROM uptime_checks WHERE subdomain = ?1 AND up = 1 AND time > datetime('now', '-24 hours')",
            params![host],
            |row| row.get(0),
        )
        .map_err(store_err)?;
    Ok((total, (up as f64 / total as f64) * 100.0))
}

fn row_to_subdomain(row: &rusqlite::Row) -> rusqlite::Result<Subdomain> {
    Ok(Subdomain {
        subdomain: row.get("subdomain")?,
        domain: row.get("domain")?,
        discovered_at: row.get("discovered_at")?,
        last_seen: row.get("last_seen")?,
        active: row.get::<_, i64>("active")? != 0,
        platform: row.get("platform")?,
        last_platform_check: row.get("last_platform_check")?,
        discovery_method: DiscoveryMethod::from_db_str(&row.get::<_, String>("discovery_method")?),
        current_status: Status::from_db_str(&row.get::<_, String>("current_status")?),
        consecutive_up_count: row.get::<_, i64>("consecutive_up_count")? as u32,
        consecutive_down_count: row.get::<_, i64>("consecutive_down_count")? as u32,
        is_flapping: row.get::<_, i64>("is_flapping")? != 0,
        last_status_change: row.get("last_status_change")?,
    })
}

fn row_to_check_record(row: &rusqlite::Row) -> rusqlite::Result<CheckRecord> {
    let headers_raw: String = row.get(8)?;
    Ok(CheckRecord {
        time: row.get(0)?,
        subdomain: row.get(1)?,
        location: Location::from_db_str(&row.get::<_, String>(2)?),
        status_code: row.get(3)?,
        response_time_ms: row.get(4)?,
        up: row.get::<_, bool>(5)?,
        platform: row.get(6)?,
        error_message: row.get(7)?,
        headers: serde_json::from_str(&headers_raw).unwrap_or(serde_json::json!({})),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoReportResult;

    fn sample_result(subdomain: &str, up: bool) -> GeoReportResult {
        GeoReportResult {
            subdomain: subdomain.to_string(),
            timestamp: None,
            status_code: Some(if up { 200 } else { 503 }),
            response_time_ms: Some(42),
            up,
            error: None,
        }
    }

    #[test]
    fn recent_is_reverse_chronological_and_includes_same_batch_appends() {
        let db = Db::in_memory().unwrap();
        db.apply_geo_report(Location::Eu, "example.test", &[
            sample_result("a.example.test", true),
            sample_result("a.example.test", false),
            sample_result("a.example.test", true),
        ]).unwrap();

        let recent = db.recent("a.example.test", 5).unwrap();
        assert_eq!(recent.len(), 3);
        // newest first: true, false, true
        assert!(recent[0].up);
        assert!(!recent[1].up);
        assert!(recent[2].up);
    }

    #[test]
    fn apply_geo_report_registers_unknown_host_and_commits_state() {
        let db = Db::in_memory().unwrap();
        let received = db
            .apply_geo_report(Location::Sg, "example.test", &[sample_result("fresh.example.test", true)])
            .unwrap();
        assert_eq!(received, 1);

        let state = db.load_state("fresh.example.test").unwrap();
        assert_eq!(state.consecutive_up_count, 1);
        assert_eq!(state.current_status, Status::Unknown);

        let heartbeats = db.list_heartbeats().unwrap();
        assert!(heartbeats.iter().any(|(loc, _)| *loc == Location::Sg));
    }

    #[test]
    fn non_up_and_inactive_and_dns_enumeration_partitions() {
        let db = Db::in_memory().unwrap();
        db.upsert("seeded.example.test", "example.test", DiscoveryMethod::Seed).unwrap();
        db.upsert("dns-only.example.test", "example.test", DiscoveryMethod::DnsEnumeration).unwrap();

        let dns_only = db.dns_enumeration_only().unwrap();
        assert_eq!(dns_only.len(), 1);
        assert_eq!(dns_only[0].subdomain, "dns-only.example.test");

        // fresh registrations start UNKNOWN, which counts as non-up.
        let non_up = db.non_up().unwrap();
        assert_eq!(non_up.len(), 2);

        // nothing has been deactivated yet.
        assert!(db.inactive().unwrap().is_empty());
    }

    #[test]
    fn stats_24h_on_fresh_host_is_zero_count_full_uptime() {
        let db = Db::in_memory().unwrap();
        db.upsert("quiet.example.test", "example.test", DiscoveryMethod::Seed).unwrap();
        let (count, pct) = db.stats_24h("quiet.example.test").unwrap();
        assert_eq!(count, 0);
        assert_eq!(pct, 100.0);
    }
}
