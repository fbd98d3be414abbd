//! Provider configuration.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GOOGLE_CLOUD_VISION_API_KEY, GOOGLE_PLACES_API_KEY,
//!    ELLIO_TIMEOUT_SECONDS)
//! 2. Config file (`ELLIO_CONFIG`, else `.ellio/config.yaml` in the current
//!    directory or a parent, else `~/.ellio/config.yaml`)
//! 3. Defaults (no credentials: barcode databases and mock stores only)
//!
//! Credentials that are empty or still hold a `YOUR_...` placeholder are
//! treated as absent.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::{cloud_vision, open_food_facts, places, upc_item_db};
use crate::domain::Coordinates;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ProviderSettings, String>> = OnceLock::new();

const DEFAULT_TIMEOUT_SECONDS: u64 = 8;
const DEFAULT_LATITUDE: f64 = 37.7749;
const DEFAULT_LONGITUDE: f64 = -122.4194;
const DEFAULT_RADIUS_METERS: u32 = 5000;
const DEFAULT_MAX_STORES: usize = 5;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    pub vision_api_key: Option<String>,
    pub places_api_key: Option<String>,
    pub open_food_facts_url: Option<String>,
    pub upc_item_db_url: Option<String>,
    pub vision_endpoint: Option<String>,
    pub places_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<u32>,
    pub max_results: Option<usize>,
}

/// Resolved provider settings
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub vision_api_key: Option<String>,
    pub places_api_key: Option<String>,
    pub open_food_facts_url: String,
    pub upc_item_db_url: String,
    pub vision_endpoint: String,
    pub places_endpoint: String,
    /// Per-call timeout for every provider
    pub timeout: Duration,
    pub search_center: Coordinates,
    pub radius_meters: u32,
    pub max_stores: usize,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            vision_api_key: None,
            places_api_key: None,
            open_food_facts_url: open_food_facts::DEFAULT_BASE_URL.to_string(),
            upc_item_db_url: upc_item_db::DEFAULT_BASE_URL.to_string(),
            vision_endpoint: cloud_vision::DEFAULT_ENDPOINT.to_string(),
            places_endpoint: places::DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            search_center: Coordinates::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE),
            radius_meters: DEFAULT_RADIUS_METERS,
            max_stores: DEFAULT_MAX_STORES,
            config_file: None,
        }
    }
}

impl ProviderSettings {
    /// Whether image recognition credentials are present
    pub fn has_vision(&self) -> bool {
        self.vision_api_key.is_some()
    }

    /// Whether nearby-store credentials are present
    pub fn has_places(&self) -> bool {
        self.places_api_key.is_some()
    }

    pub fn search_area(&self) -> places::SearchArea {
        places::SearchArea {
            center: self.search_center,
            radius_meters: self.radius_meters,
            max_results: self.max_stores,
        }
    }

    /// Layer a parsed config file over these settings
    fn apply_file(&mut self, file: ConfigFile) {
        let p = file.providers;
        if let Some(key) = credential(p.vision_api_key) {
            self.vision_api_key = Some(key);
        }
        if let Some(key) = credential(p.places_api_key) {
            self.places_api_key = Some(key);
        }
        if let Some(url) = p.open_food_facts_url {
            self.open_food_facts_url = url;
        }
        if let Some(url) = p.upc_item_db_url {
            self.upc_item_db_url = url;
        }
        if let Some(url) = p.vision_endpoint {
            self.vision_endpoint = url;
        }
        if let Some(url) = p.places_endpoint {
            self.places_endpoint = url;
        }
        if let Some(seconds) = file.timeout_seconds {
            self.timeout = Duration::from_secs(seconds);
        }
        if let Some(search) = file.search {
            self.search_center = Coordinates::new(
                search.latitude.unwrap_or(self.search_center.latitude),
                search.longitude.unwrap_or(self.search_center.longitude),
            );
            self.radius_meters = search.radius_meters.unwrap_or(self.radius_meters);
            self.max_stores = search.max_results.unwrap_or(self.max_stores);
        }
    }

    /// Layer environment variables over these settings
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = credential(var("GOOGLE_CLOUD_VISION_API_KEY")) {
            self.vision_api_key = Some(key);
        }
        if let Some(key) = credential(var("GOOGLE_PLACES_API_KEY")) {
            self.places_api_key = Some(key);
        }
        if let Some(seconds) = var("ELLIO_TIMEOUT_SECONDS") {
            let seconds: u64 = seconds
                .trim()
                .parse()
                .with_context(|| format!("Invalid ELLIO_TIMEOUT_SECONDS: {}", seconds))?;
            self.timeout = Duration::from_secs(seconds);
        }
        Ok(())
    }
}

/// A usable credential, or None for blank / placeholder values
fn credential(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.starts_with("YOUR_"))
}

/// Find config file: ELLIO_CONFIG, then current directory and parents, then home
fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("ELLIO_CONFIG") {
        return Some(PathBuf::from(explicit));
    }

    let mut current = std::env::current_dir().ok()?;
    loop {
        let config_path = current.join(".ellio").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::home_dir()
        .map(|home| home.join(".ellio").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load settings from all sources
fn load_config() -> Result<ProviderSettings> {
    let mut settings = ProviderSettings::default();

    if let Some(path) = find_config_file() {
        let file = load_config_file(&path)?;
        settings.apply_file(file);
        settings.config_file = Some(path);
    }

    settings.apply_env(|name| std::env::var(name).ok())?;
    Ok(settings)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ProviderSettings> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ProviderSettings> {
    load_config()
}
