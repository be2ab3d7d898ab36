pub mod geo;
pub mod read;
pub mod system;

pub use geo::geo_report;
pub use read::{agent_status, check_history, inactive_subdomains, non_up_subdomains, other_dns, subdomains};
pub use system::{checks_run, health, scheduler_start, scheduler_stop};
