use std::env;
use std::time::Duration;

/// Dashboard settings derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DashboardConfig {
    pub(crate) bind: String,
    pub(crate) port: u16,
    /// Pause after each Yahoo request.
    pub(crate) request_delay: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8501,
            request_delay: Duration::from_millis(250),
        }
    }
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl DashboardConfig {
    /// Read `FRONTIER_BIND`, `FRONTIER_PORT` and `FRONTIER_REQUEST_DELAY_MS`.
    /// Unset or unparsable values fall back to the defaults.
    pub(crate) fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind: env_str("FRONTIER_BIND", &defaults.bind),
            port: env_u16("FRONTIER_PORT", defaults.port),
            request_delay: Duration::from_millis(env_u64(
                "FRONTIER_REQUEST_DELAY_MS",
                defaults.request_delay.as_millis() as u64,
            )),
        }
    }

    /// Apply command-line overrides.
    pub(crate) fn with_overrides(mut self, bind: Option<String>, port: Option<u16>) -> Self {
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}
