use crate::config::Config;
use crate::models::DiscoveryMethod;
use crate::store::Db;
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Prefixes tried against the target domain in addition to the seed list,
/// ported from `original_source/backend/subdomain_discovery.py`'s
/// `COMMON_PREFIXES` table.
const COMMON_PREFIXES: &[&str] = &[
    "www", "api", "admin", "portal", "dashboard", "docs", "dev", "staging", "test", "app", "web",
    "service", "services", "data", "db", "database", "auth", "login", "secure", "ssl", "mail",
    "email", "smtp", "ftp", "git", "gitlab", "github", "jenkins", "ci", "cd", "build", "deploy",
    "monitor", "monitoring", "metrics", "logs", "log", "status", "health", "ping", "check",
    "probe", "grafana", "kibana", "elasticsearch",
];

/// Runs one discovery cycle: seed the candidate set, scrape the homepage for
/// in-domain links, HEAD-probe every candidate, and upsert survivors. Never
/// shrinks the registry (spec.md §4.2) and never aborts on a partial
/// failure — a dead homepage or a single failed HEAD just drops that
/// candidate.
pub async fn run_discovery_cycle(db: &Arc<Db>, config: &Config, client: &reqwest::Client, seeds: &[String]) {
    let domain = &config.target_domain;
    tracing::info!(domain = %domain, "discovery cycle starting");

    let mut candidates: Vec<(String, DiscoveryMethod)> = seeds
        .iter()
        .map(|h| (h.clone(), DiscoveryMethod::Seed))
        .collect();

    let mut seen: HashSet<String> = candidates.iter().map(|(h, _)| h.clone()).collect();

    for prefix in COMMON_PREFIXES {
        let host = format!("{}.{}", prefix, domain);
        if seen.insert(host.clone()) {
            candidates.push((host, DiscoveryMethod::PrefixScan));
        }
    }

    match scrape_homepage(client, domain).await {
        Ok(links) => {
            for host in links {
                if seen.insert(host.clone()) {
                    candidates.push((host, DiscoveryMethod::HtmlScrape));
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "discovery: homepage scrape failed, continuing without it");
        }
    }

    let cap = config.connection_cap.max(1);
    let survivors: Vec<(String, DiscoveryMethod)> = stream::iter(candidates.into_iter())
        .map(|(host, method)| async move {
            if probe_reachable(client, &host).await {
                Some((host, method))
            } else {
                None
            }
        })
        .buffer_unordered(cap)
        .filter_map(|r| async move { r })
        .collect()
        .await;

    tracing::info!(survivors = survivors.len(), "discovery cycle: upserting survivors");

    for (host, method) in survivors {
        if let Err(e) = db.upsert(&host, domain, method) {
            tracing::warn!(host = %host, error = %e, "discovery: failed to upsert candidate");
        }
    }
}

/// Fetches `https://<domain>/` and collects in-domain absolute/protocol-
/// relative link hosts. A total fetch failure is reported to the caller,
/// who treats it as "skip this step" rather than aborting discovery.
async fn scrape_homepage(client: &reqwest::Client, domain: &str) -> Result<Vec<String>, reqwest::Error> {
    let url = format!("https://{}/", domain);
    let resp = client
        .get(&url)
        .timeout(Duration::from_secs(10))
        .send()
        .await?;
    if !resp.status().is_success() {
        return Ok(Vec::new());
    }
    let body = resp.text().await?;

    let document = Html::parse_document(&body);
    let selector = Selector::parse("a[href]").unwrap();
    let suffix = format!(".{}", domain);

    let mut hosts = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else { continue };
        let host = if let Some(rest) = href.strip_prefix("//") {
            rest.split('/').next().unwrap_or("").to_ascii_lowercase()
        } else if let Ok(parsed) = url::Url::parse(href) {
            parsed.host_str().unwrap_or("").to_ascii_lowercase()
        } else {
            continue;
        };
        if host.ends_with(&suffix) || host == domain {
            hosts.push(host);
        }
    }
    Ok(hosts)
}

/// HTTPS-then-HTTP HEAD probe; retains the host on any response with
/// `status < 400` within the ambient client timeout.
async fn probe_reachable(client: &reqwest::Client, host: &str) -> bool {
    for scheme in ["https", "http"] {
        let url = format!("{}://{}", scheme, host);
        if let Ok(resp) = client.head(&url).send().await {
            if resp.status().as_u16() < 400 {
                return true;
            }
        }
    }
    false
}
