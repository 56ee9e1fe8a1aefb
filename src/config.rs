use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/analyze";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashConfig {
    pub endpoint: String,
    /// `None` means no client-side timeout.
    pub request_timeout: Option<Duration>,
    pub demo: bool,
    pub export_dir: PathBuf,
    pub initial_league_id: Option<String>,
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            demo: false,
            export_dir: PathBuf::from("."),
            initial_league_id: None,
            log_file: None,
            log_filter: "info".to_string(),
        }
    }
}

impl DashConfig {
    /// Reads `FFA_*` variables from the process environment. Call after
    /// the `.env` files have been loaded.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let request_timeout = match non_empty("FFA_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
        {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.request_timeout,
        };

        let demo = non_empty("FFA_DEMO")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Self {
            endpoint: non_empty("FFA_ENDPOINT").unwrap_or(defaults.endpoint),
            request_timeout,
            demo,
            export_dir: non_empty("FFA_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            initial_league_id: non_empty("FFA_LEAGUE_ID"),
            log_file: non_empty("FFA_LOG_FILE").map(PathBuf::from),
            log_filter: non_empty("FFA_LOG").unwrap_or(defaults.log_filter),
        }
    }
}
