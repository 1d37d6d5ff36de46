use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SALES_DASHBOARD_CONFIG";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub dashboard: DashboardConfig,
    pub raw_data: RawDataConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub url: String,
    /// Read this JSON file instead of calling `url`.
    #[serde(default)]
    pub file: Option<PathBuf>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub first_year: i32,
    pub last_year: i32,
    pub top_locations: usize,
    pub default_top_sellers: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawDataConfig {
    pub price_max: f64,
    pub default_file_name: String,
    pub export_cache_capacity: usize,
    pub notification_secs: u64,
}

/// Bounds of the "top N sellers" input.
pub const TOP_SELLERS_RANGE: std::ops::RangeInclusive<usize> = 2..=10;

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[source]
url = "https://labdados.com/produtos"
timeout_secs = 30

[dashboard]
first_year = 2020
last_year = 2023
top_locations = 5
default_top_sellers = 5

[raw_data]
price_max = 5000.0
default_file_name = "data"
export_cache_capacity = 8
notification_secs = 5
"#;

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.raw_data.notification_secs)
    }

    fn validate(self) -> Result<Self> {
        ensure!(
            self.dashboard.first_year <= self.dashboard.last_year,
            "dashboard.first_year ({}) is after dashboard.last_year ({})",
            self.dashboard.first_year,
            self.dashboard.last_year
        );
        ensure!(
            TOP_SELLERS_RANGE.contains(&self.dashboard.default_top_sellers),
            "dashboard.default_top_sellers must be within {:?}",
            TOP_SELLERS_RANGE
        );
        ensure!(
            self.raw_data.export_cache_capacity >= 1,
            "raw_data.export_cache_capacity must be at least 1"
        );
        Ok(self)
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        parse(DEFAULT_CONFIG).expect("embedded default config is valid")
    }
}

/// Parse and validate a TOML document.
pub fn parse(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text).context("parsing config TOML")?;
    config.validate()
}

/// Load configuration from config.toml
///
/// Search order:
/// 1. `$SALES_DASHBOARD_CONFIG`
/// 2. Next to the executable
/// 3. The working directory
/// 4. Falls back to embedded default config
pub fn load_config() -> Result<Config> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        return load_from(Path::new(&explicit));
    }

    let candidates = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE)))
        .into_iter()
        .chain(std::iter::once(PathBuf::from(CONFIG_FILE)));

    for path in candidates {
        if path.exists() {
            return load_from(&path);
        }
        log::debug!("{} not found", path.display());
    }

    log::info!("Using default embedded configuration");
    parse(DEFAULT_CONFIG)
}

fn load_from(path: &Path) -> Result<Config> {
    log::info!("Loading config from: {}", path.display());
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse(&contents).with_context(|| format!("in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.source.url, "https://labdados.com/produtos");
        assert!(config.source.file.is_none());
        assert_eq!(config.dashboard.first_year, 2020);
        assert_eq!(config.dashboard.last_year, 2023);
        assert_eq!(config.raw_data.default_file_name, "data");
        assert_eq!(config.notification_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn file_source_is_optional() {
        let text = DEFAULT_CONFIG.replace(
            "timeout_secs = 30",
            "timeout_secs = 30\nfile = \"sample_sales.json\"",
        );
        let config = parse(&text).unwrap();
        assert_eq!(config.source.file, Some(PathBuf::from("sample_sales.json")));
    }

    #[test]
    fn inverted_year_range_is_rejected() {
        let text = DEFAULT_CONFIG.replace("first_year = 2020", "first_year = 2030");
        assert!(parse(&text).is_err());
    }

    #[test]
    fn top_sellers_default_must_be_in_range() {
        let text = DEFAULT_CONFIG.replace("default_top_sellers = 5", "default_top_sellers = 11");
        assert!(parse(&text).is_err());
    }

    #[test]
    fn zero_cache_capacity_is_rejected() {
        let text = DEFAULT_CONFIG.replace("export_cache_capacity = 8", "export_cache_capacity = 0");
        assert!(parse(&text).is_err());
    }
}
