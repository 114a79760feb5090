//! Candidate backend URLs.
//!
//! Order: explicit override, local default (development only), secondary
//! override, then the fixed production mirrors.

/// Local development backend
pub const LOCAL_DEFAULT_URL: &str = "http://localhost:8000";

/// Known-good production deployments, tried last
pub const PRODUCTION_MIRRORS: &[&str] = &["https://web-production-9dfcb.up.railway.app"];

pub const ENV_API_URL: &str = "DHRUVA_API_URL";
pub const ENV_SECONDARY_URL: &str = "DHRUVA_RAILWAY_URL";
pub const ENV_MIRRORS: &str = "DHRUVA_MIRRORS";

#[derive(Debug, Clone, Default)]
pub struct EndpointConfig {
    pub explicit: Option<String>,
    pub secondary: Option<String>,
    pub mirrors: Vec<String>,
    pub production: bool,
}

impl EndpointConfig {
    /// Build from environment. `DHRUVA_MIRRORS` is comma separated and
    /// replaces the built-in mirror list when set.
    pub fn from_env(production: bool) -> Self {
        let mirrors = match std::env::var(ENV_MIRRORS) {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => PRODUCTION_MIRRORS.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            explicit: non_empty_var(ENV_API_URL),
            secondary: non_empty_var(ENV_SECONDARY_URL),
            mirrors,
            production,
        }
    }

    /// Ordered, de-duplicated candidate list without trailing slashes.
    pub fn candidates(&self) -> Vec<String> {
        let mut ordered: Vec<&str> = Vec::new();
        if let Some(url) = &self.explicit {
            ordered.push(url);
        }
        if !self.production {
            ordered.push(LOCAL_DEFAULT_URL);
        }
        if let Some(url) = &self.secondary {
            ordered.push(url);
        }
        ordered.extend(self.mirrors.iter().map(String::as_str));

        let mut out: Vec<String> = Vec::with_capacity(ordered.len());
        for url in ordered {
            let url = normalize_url(url);
            if !url.is_empty() && !out.contains(&url) {
                out.push(url);
            }
        }
        out
    }
}

pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
