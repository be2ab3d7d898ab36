use crate::config::Config;
use crate::store::Db;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

/// The four states spec.md §4.6 names. `Idle` is the resting state between
/// ticks; the scheduler only ever occupies `RunningProbe`/`RunningDiscovery`
/// for the duration of one job invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulerState {
    Idle,
    RunningProbe,
    RunningDiscovery,
    Stopping,
}

#[derive(Debug, Serialize)]
pub struct SchedulerSnapshot {
    pub state: SchedulerState,
    pub running: bool,
    pub probe_interval_minutes: u32,
    pub discovery_interval_hours: u32,
}

/// Drives C3 (short interval) and C2 (long interval) with `max_instances =
/// 1` per job, a misfire-grace window, and a graceful-drain shutdown. The
/// teacher drives its one job with a spawned tokio task and `time::sleep`;
/// this generalizes that to two independent jobs sharing the at-most-one
/// discipline via a non-blocking try-lock, as C3 itself requires.
pub struct Scheduler {
    db: Arc<Db>,
    config: Config,
    client: reqwest::Client,
    seeds: Vec<String>,
    probe_guard: AsyncMutex<()>,
    discovery_guard: AsyncMutex<()>,
    state: std::sync::Mutex<SchedulerState>,
    running: AtomicBool,
    probe_interval_secs: AtomicU64,
}

const PROBE_MISFIRE_GRACE: Duration = Duration::from_secs(30);
const DISCOVERY_MISFIRE_GRACE: Duration = Duration::from_secs(300);

impl Scheduler {
    pub fn new(db: Arc<Db>, config: Config, seeds: Vec<String>) -> Self {
        let client = crate::prober::build_client(&config).expect("failed to build probe HTTP client");
        let probe_interval_secs = AtomicU64::new(config.probe_interval_minutes as u64 * 60);
        Scheduler {
            db,
            config,
            client,
            seeds,
            probe_guard: AsyncMutex::new(()),
            discovery_guard: AsyncMutex::new(()),
            state: std::sync::Mutex::new(SchedulerState::Idle),
            running: AtomicBool::new(true),
            probe_interval_secs,
        }
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            state: *self.state.lock().unwrap(),
            running: self.running.load(Ordering::SeqCst),
            probe_interval_minutes: (self.probe_interval_secs.load(Ordering::SeqCst) / 60) as u32,
            discovery_interval_hours: self.config.discovery_interval_hours,
        }
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn start(&self, interval_minutes: Option<u32>) {
        if let Some(m) = interval_minutes {
            self.probe_interval_secs.store(m.max(1) as u64 * 60, Ordering::SeqCst);
        }
        self.running.store(true, Ordering::SeqCst);
    }

    /// Attempts one probe cycle right now, respecting `max_instances = 1`
    /// via a non-blocking try-lock — a concurrent attempt is dropped
    /// silently rather than queued, exactly as spec.md §4.3 requires.
    pub async fn trigger_probe_now(self: &Arc<Self>) {
        self.clone().run_probe_once().await;
    }

    pub async fn trigger_discovery_now(self: &Arc<Self>) {
        self.clone().run_discovery_once().await;
    }

    async fn run_probe_once(self: Arc<Self>) {
        let Ok(_guard) = self.probe_guard.try_lock() else {
            tracing::debug!("probe tick skipped: previous invocation still running");
            return;
        };
        *self.state.lock().unwrap() = SchedulerState::RunningProbe;
        crate::prober::run_probe_cycle(&self.db, &self.config, &self.client).await;
        *self.state.lock().unwrap() = SchedulerState::Idle;
    }

    async fn run_discovery_once(self: Arc<Self>) {
        let Ok(_guard) = self.discovery_guard.try_lock() else {
            tracing::debug!("discovery tick skipped: previous invocation still running");
            return;
        };
        *self.state.lock().unwrap() = SchedulerState::RunningDiscovery;
        crate::discovery::run_discovery_cycle(&self.db, &self.config, &self.client, &self.seeds).await;
        *self.state.lock().unwrap() = SchedulerState::Idle;
    }

    /// Spawns the two timer loops. Each loop computes misfire grace by
    /// comparing the tick's due time against wall clock: a late tick inside
    /// the grace window still fires once; anything further behind is
    /// coalesced into that same single run rather than replayed.
    pub fn spawn_loops(self: &Arc<Self>, shutdown: rocket::Shutdown) {
        let probe_self = self.clone();
        let probe_shutdown = shutdown.clone();
        tokio::spawn(async move { probe_self.probe_loop(probe_shutdown).await });

        let discovery_self = self.clone();
        tokio::spawn(async move { discovery_self.discovery_loop(shutdown).await });
    }

    async fn probe_loop(self: Arc<Self>, shutdown: rocket::Shutdown) {
        let mut due = Instant::now() + Duration::from_secs(self.probe_interval_secs.load(Ordering::SeqCst));
        loop {
            let interval = Duration::from_secs(self.probe_interval_secs.load(Ordering::SeqCst));
            tokio::select! {
                _ = tokio::time::sleep_until(due) => {},
                _ = shutdown.clone() => {
                    *self.state.lock().unwrap() = SchedulerState::Stopping;
                    return;
                }
            }

            let lateness = Instant::now().saturating_duration_since(due);
            due = Instant::now() + interval;

            if !self.running.load(Ordering::SeqCst) {
                continue;
            }
            if lateness > PROBE_MISFIRE_GRACE + interval {
                tracing::debug!(?lateness, "probe: missed firing beyond grace, coalescing into next run");
            }
            self.clone().run_probe_once().await;
        }
    }

    async fn discovery_loop(self: Arc<Self>, shutdown: rocket::Shutdown) {
        let interval = Duration::from_secs(self.config.discovery_interval_hours as u64 * 3600);
        let mut due = Instant::now() + interval;
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(due) => {},
                _ = shutdown.clone() => {
                    *self.state.lock().unwrap() = SchedulerState::Stopping;
                    return;
                }
            }

            let lateness = Instant::now().saturating_duration_since(due);
            due = Instant::now() + interval;

            if !self.running.load(Ordering::SeqCst) {
                continue;
            }
            if lateness > DISCOVERY_MISFIRE_GRACE + interval {
                tracing::debug!(?lateness, "discovery: missed firing beyond grace, coalescing into next run");
            }
            self.clone().run_discovery_once().await;
        }
    }
}
