use crate::application::live_feed_service::DEFAULT_WINDOW;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub live: LiveSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Where remembered selections are written; in memory only when unset.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SelectionSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LiveSettings {
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `config/dashboard.toml` (optional) overlaid with `DASHBOARD__SECTION__KEY`
/// environment variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> DashboardConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = from_toml("");
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.api.base_url, "http://localhost:8000");
        assert_eq!(cfg.api.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.selection.path, None);
        assert_eq!(cfg.live.window, 300);
    }

    #[test]
    fn test_overrides() {
        let cfg = from_toml(
            r#"
            [api]
            base_url = "https://telemetry.example.org"

            [selection]
            path = "/var/lib/dash/selection.json"

            [live]
            window = 50
            "#,
        );
        assert_eq!(cfg.api.base_url, "https://telemetry.example.org");
        assert_eq!(cfg.api.timeout_secs, 10);
        assert_eq!(
            cfg.selection.path,
            Some(PathBuf::from("/var/lib/dash/selection.json"))
        );
        assert_eq!(cfg.live.window, 50);
    }
}
