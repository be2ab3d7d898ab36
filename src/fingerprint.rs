use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Case-insensitive header bag handed to [`fingerprint`]. Keys are expected
/// lower-cased by the caller (the prober normalizes once per response).
pub type Headers = HashMap<String, String>;

fn version_suffix(re_pattern: &str, haystack: &str) -> String {
    static CACHE: OnceLock<std::sync::Mutex<HashMap<String, Regex>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| std::sync::Mutex::new(HashMap::new()));
    let mut guard = cache.lock().unwrap();
    let re = guard
        .entry(re_pattern.to_string())
        .or_insert_with(|| Regex::new(re_pattern).unwrap());
    match re.captures(haystack) {
        Some(caps) => format!(" {}", &caps[1]),
        None => String::new(),
    }
}

/// Pure, total, side-effect-free platform classifier. Same precedence order
/// the original checker used: Cloudflare, then `Server`, then
/// `X-Powered-By`, then CDN/PaaS header table, then a body sniff, defaulting
/// to `Unknown`.
pub fn fingerprint(headers: &Headers, body_prefix: &str) -> String {
    let get = |k: &str| headers.get(k).map(|s| s.as_str()).unwrap_or("");

    if headers.contains_key("cf-ray")
        || headers.contains_key("cf-cache-status")
        || headers.contains_key("cf-request-id")
    {
        return "Cloudflare".to_string();
    }

    let raw_server = get("server");
    let server = raw_server.to_ascii_lowercase();

    if !server.is_empty() {
        if server.contains("nginx") {
            return format!("Nginx{}", version_suffix(r"(?i)nginx/([\d.]+)", raw_server));
        } else if server.contains("apache") {
            return format!("Apache{}", version_suffix(r"(?i)apache/([\d.]+)", raw_server));
        } else if server.contains("iis") || server.contains("microsoft-iis") {
            return format!("IIS{}", version_suffix(r"(?i)microsoft-iis/([\d.]+)", raw_server));
        } else if server.contains("lighttpd") {
            return format!("Lighttpd{}", version_suffix(r"(?i)lighttpd/([\d.]+)", raw_server));
        } else if server.contains("caddy") {
            return format!("Caddy{}", version_suffix(r"(?i)caddy/([\d.]+)", raw_server));
        } else if server.contains("node.js") || server.contains("express") {
            return "Node.js".to_string();
        } else if server.contains("gunicorn") {
            return format!("Gunicorn{}", version_suffix(r"(?i)gunicorn/([\d.]+)", raw_server));
        } else if server.contains("uwsgi") {
            return "uWSGI".to_string();
        } else if server.contains("uvicorn") {
            return format!("Uvicorn{}", version_suffix(r"(?i)uvicorn/([\d.]+)", raw_server));
        } else if server.contains("hypercorn") {
            return "Hypercorn".to_string();
        } else if server.contains("daphne") {
            return "Daphne".to_string();
        } else if server.contains("tomcat") {
            return format!("Tomcat{}", version_suffix(r"(?i)tomcat/([\d.]+)", raw_server));
        } else if server.contains("jetty") {
            return format!("Jetty{}", version_suffix(r"(?i)jetty/([\d.]+)", raw_server));
        }
    }

    let raw_powered_by = get("x-powered-by");
    let powered_by = raw_powered_by.to_ascii_lowercase();

    if !powered_by.is_empty() {
        if powered_by.contains("php") {
            return format!("PHP{}", version_suffix(r"(?i)php/([\d.]+)", raw_powered_by));
        } else if powered_by.contains("asp.net") {
            return "ASP.NET".to_string();
        } else if powered_by.contains("django") {
            return format!("Django{}", version_suffix(r"(?i)django/([\d.]+)", raw_powered_by));
        } else if powered_by.contains("flask") {
            return "Flask".to_string();
        } else if powered_by.contains("fastapi") {
            return "FastAPI".to_string();
        } else if powered_by.contains("express") {
            return "Express.js".to_string();
        } else if powered_by.contains("rails") {
            return "Ruby on Rails".to_string();
        } else if powered_by.contains("laravel") {
            return "Laravel".to_string();
        } else if powered_by.contains("symfony") {
            return "Symfony".to_string();
        } else if powered_by.contains("spring") {
            return "Spring Boot".to_string();
        } else if powered_by.contains("next.js") {
            return "Next.js".to_string();
        } else if powered_by.contains("nuxt") {
            return "Nuxt.js".to_string();
        }
    }

    const CDN_HEADERS: &[(&str, &str)] = &[
        ("x-amz-cf-id", "CloudFront (AWS)"),
        ("x-vercel-id", "Vercel"),
        ("x-netlify", "Netlify"),
        ("x-github-request-id", "GitHub Pages"),
        ("x-render-id", "Render"),
        ("x-fly-request-id", "Fly.io"),
        ("x-railway-static-url", "Railway"),
        ("x-replit-user-name", "Replit"),
        ("x-glitch-request-id", "Glitch"),
        ("x-surge-id", "Surge.sh"),
        ("x-fastly-request-id", "Fastly"),
        ("x-akamai-transformed", "Akamai"),
        ("x-varnish", "Varnish"),
        ("x-squid-error", "Squid"),
        ("x-keycdn-request-id", "KeyCDN"),
    ];
    for (header, label) in CDN_HEADERS {
        if headers.contains_key(*header) {
            return label.to_string();
        }
    }
    if get("x-cdn").to_ascii_lowercase().contains("stackpath") {
        return "StackPath".to_string();
    }

    if !body_prefix.is_empty() {
        let body = body_prefix.to_ascii_lowercase();

        if body.contains("wp-content") || body.contains("wp-includes") || body.contains("wp-json") {
            return "WordPress".to_string();
        } else if body.contains("drupal") {
            return "Drupal".to_string();
        } else if body.contains("joomla") {
            return "Joomla".to_string();
        } else if body.contains("magento") {
            return "Magento".to_string();
        } else if body.contains("shopify") {
            return "Shopify".to_string();
        } else if body.contains("squarespace") {
            return "Squarespace".to_string();
        } else if body.contains("wix") {
            return "Wix".to_string();
        } else if body.contains("weebly") {
            return "Weebly".to_string();
        } else if body.contains("jekyll") {
            return "Jekyll".to_string();
        } else if body.contains("hugo") {
            return "Hugo".to_string();
        } else if body.contains("gatsby") {
            return "Gatsby".to_string();
        } else if body.contains("eleventy") || body.contains("11ty") {
            return "Eleventy".to_string();
        } else if body.contains("react") && body.contains("data-reactroot") {
            return "React".to_string();
        } else if body.contains("vue") && body_prefix.contains("data-v-") {
            return "Vue.js".to_string();
        } else if body.contains("angular") {
            return "Angular".to_string();
        }
    }

    "Unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn nginx_with_version() {
        let h = headers(&[("server", "nginx/1.21.6")]);
        assert_eq!(fingerprint(&h, ""), "Nginx 1.21.6");
    }

    #[test]
    fn cloudflare_precedes_server() {
        let h = headers(&[("cf-ray", "abc"), ("server", "nginx")]);
        assert_eq!(fingerprint(&h, ""), "Cloudflare");
    }

    #[test]
    fn wordpress_body_sniff() {
        let h = headers(&[("server", "")]);
        assert_eq!(fingerprint(&h, "...wp-content/themes/twentytwenty..."), "WordPress");
    }

    #[test]
    fn react_spa() {
        let h = Headers::new();
        assert_eq!(fingerprint(&h, "<div data-reactroot>hello</div>"), "React");
    }

    #[test]
    fn everything_empty_is_unknown() {
        let h = Headers::new();
        assert_eq!(fingerprint(&h, ""), "Unknown");
    }

    #[test]
    fn idempotent_under_duplicate_headers() {
        let h = headers(&[("server", "nginx/1.21.6")]);
        let a = fingerprint(&h, "");
        let b = fingerprint(&h, "");
        assert_eq!(a, b);
    }

    #[test]
    fn unrelated_headers_do_not_change_label() {
        let h1 = headers(&[("server", "nginx/1.21.6")]);
        let h2 = headers(&[("server", "nginx/1.21.6"), ("x-request-id", "abc123")]);
        assert_eq!(fingerprint(&h1, ""), fingerprint(&h2, ""));
    }
}
