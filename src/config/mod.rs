use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the scheduler backend. `None` runs against demo data.
    pub api_url: Option<String>,

    /// Force demo data even when an API URL is configured
    pub demo: bool,

    /// Directory for logs and other local state
    pub data_dir: PathBuf,

    /// Items requested per list page
    pub page_size: usize,

    /// UI tick interval in milliseconds
    pub tick_rate_ms: u64,

    /// Timeout for backend requests
    pub request_timeout_secs: u64,

    /// Focus the first job once the list loads
    pub auto_focus_first: bool,

    /// Open the first job's menu once the list loads
    pub auto_select_first: bool,

    /// Enable mouse support
    pub mouse_enabled: bool,

    /// Number of generated jobs in demo mode
    pub demo_jobs: usize,

    /// Interval between synthetic job events in demo mode
    pub demo_event_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            demo: false,
            data_dir: dirs::data_local_dir()
                .map(|dir| dir.join("jobdeck"))
                .unwrap_or_else(|| PathBuf::from("./data")),
            page_size: 50,
            tick_rate_ms: 100,
            request_timeout_secs: 10,
            auto_focus_first: true,
            auto_select_first: false,
            mouse_enabled: true,
            demo_jobs: 240,
            demo_event_interval_ms: 1500,
        }
    }
}

impl Config {
    /// Initialize configuration from various sources
    pub async fn init() -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match Self::load_from_file().await? {
            Some(config) => config,
            None => Self::default(),
        };

        // Environment wins over files
        config.load_from_env();

        Ok(config)
    }

    /// Candidate configuration files, highest priority first
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("./.jobdeck.json"),
            PathBuf::from("./jobdeck.json"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("jobdeck").join("jobdeck.json"));
        }
        paths
    }

    /// Load the first configuration file that exists
    pub async fn load_from_file() -> Result<Option<Self>> {
        for path in Self::config_paths() {
            if path.exists() {
                return Self::load_from_path(&path).await.map(Some);
            }
        }
        Ok(None)
    }

    pub async fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid configuration in {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        if let Ok(url) = std::env::var("JOBDECK_API_URL") {
            if !url.is_empty() {
                self.api_url = Some(url);
            }
        }

        if let Ok(demo) = std::env::var("JOBDECK_DEMO") {
            self.demo = matches!(demo.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Ok(dir) = std::env::var("JOBDECK_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(page_size) = parse_env("JOBDECK_PAGE_SIZE") {
            self.page_size = page_size;
        }

        if let Some(tick) = parse_env("JOBDECK_TICK_MS") {
            self.tick_rate_ms = tick;
        }

        if let Some(timeout) = parse_env("JOBDECK_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = timeout;
        }
    }

    /// Whether the dashboard should run against in-memory demo data
    pub fn use_demo_data(&self) -> bool {
        self.demo || self.api_url.is_none()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!(
                    "api_url must start with http:// or https://, got {}",
                    url
                ));
            }
        }

        if self.page_size == 0 {
            return Err(anyhow::anyhow!("page_size must be greater than 0"));
        }

        if self.tick_rate_ms == 0 {
            return Err(anyhow::anyhow!("tick_rate_ms must be greater than 0"));
        }

        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("request_timeout_secs must be greater than 0"));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    match std::env::var(key) {
        Ok(value) => match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!("Ignoring invalid value for {}: {}", key, value);
                None
            }
        },
        Err(_) => None,
    }
}
