use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use reqwest::Url;
use serde::de::Deserializer;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "cmgr.log";
const APP_NAME: &str = "cmgr";

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SPINNER: &str = "Loading...";

#[derive(Debug, Clone)]
pub struct Config {
    /// File the configuration was read from, if any
    pub config_path: Option<PathBuf>,
    pub api: ApiConfig,
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            api: ApiConfig::default(),
            ui: UiFile::default().into(),
        }
    }
}

// =============================================================================
// Contacts API
// =============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the contacts service, e.g. `http://localhost:9000`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Replace the base URL after validating it.
    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        validate_base_url(url)?;
        self.base_url = url.trim().to_string();
        Ok(())
    }
}

pub fn validate_base_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url.trim())
        .with_context(|| format!("invalid contacts API URL `{}`", url))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => bail!("contacts API URL must use http or https, got `{}`", other),
    }
    if parsed.cannot_be_a_base() {
        bail!("contacts API URL `{}` cannot be used as a base", url);
    }
    Ok(())
}

// =============================================================================
// UI
// =============================================================================

#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Text shown by the loading indicator
    pub spinner: String,
    pub colors: UiColors,
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub accent: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub error_fg: RgbColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
        };
        Ok(RgbColor { r, g, b })
    }
}

// =============================================================================
// File format
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    api: ApiFile,
    ui: UiFile,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ApiFile {
    base_url: String,
    timeout_secs: u64,
}

impl Default for ApiFile {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiFile {
    fn into_config(self) -> Result<ApiConfig> {
        validate_base_url(&self.base_url).context("in [api] base_url")?;
        let timeout_secs = if self.timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            self.timeout_secs
        };
        Ok(ApiConfig {
            base_url: self.base_url.trim().to_string(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiFile {
    spinner: String,
    colors: UiColorsFile,
}

impl Default for UiFile {
    fn default() -> Self {
        Self {
            spinner: DEFAULT_SPINNER.to_string(),
            colors: UiColorsFile::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    accent: RgbColor,
    selection_bg: RgbColor,
    selection_fg: RgbColor,
    error_fg: RgbColor,
}

impl Default for UiColorsFile {
    fn default() -> Self {
        Self {
            accent: RgbColor::new(255, 165, 0),
            selection_bg: RgbColor::new(255, 165, 0),
            selection_fg: RgbColor::new(0, 0, 0),
            error_fg: RgbColor::new(220, 50, 47),
        }
    }
}

impl From<UiFile> for UiConfig {
    fn from(file: UiFile) -> Self {
        let spinner = if file.spinner.trim().is_empty() {
            DEFAULT_SPINNER.to_string()
        } else {
            file.spinner
        };
        Self {
            spinner,
            colors: UiColors {
                accent: file.colors.accent,
                selection_bg: file.colors.selection_bg,
                selection_fg: file.colors.selection_fg,
                error_fg: file.colors.error_fg,
            },
        }
    }
}

// =============================================================================
// Locations and loading
// =============================================================================

fn base_dirs() -> Result<BaseDirs> {
    BaseDirs::new().context("unable to determine base directories")
}

pub fn config_path() -> Result<PathBuf> {
    Ok(base_dirs()?.config_dir().join(APP_NAME).join(CONFIG_FILE_NAME))
}

/// Log file used while the terminal view owns the screen.
pub fn log_path() -> Result<PathBuf> {
    let dir = base_dirs()?.data_local_dir().join(APP_NAME);
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data dir: {}", dir.display()))?;
    }
    Ok(dir.join(LOG_FILE_NAME))
}

/// Load configuration from `explicit`, or from the default location.
///
/// A missing default file yields the built-in defaults; a missing explicit file is an error.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("configuration file not found at {}", path.display());
            }
            path.to_path_buf()
        }
        None => {
            let path = config_path()?;
            if !path.exists() {
                return Ok(Config::default());
            }
            path
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;

    let mut config = parse(&raw)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    config.config_path = Some(path);
    Ok(config)
}

fn parse(raw: &str) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw).context("failed to parse TOML")?;

    warn_unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .context("failed to deserialize configuration")?;

    Ok(Config {
        config_path: None,
        api: cfg_file.api.into_config()?,
        ui: cfg_file.ui.into(),
    })
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn warn_unknown_keys(value: &toml::Value) {
    warn_unknown_in_context(value, "", &["api", "ui"]);

    let Some(table) = value.as_table() else {
        return;
    };
    if let Some(api) = table.get("api") {
        warn_unknown_in_context(api, "api", &["base_url", "timeout_secs"]);
    }
    if let Some(ui) = table.get("ui") {
        warn_unknown_in_context(ui, "ui", &["spinner", "colors"]);
        if let Some(colors) = ui.get("colors") {
            warn_unknown_in_context(
                colors,
                "ui.colors",
                &["accent", "selection_bg", "selection_fg", "error_fg"],
            );
        }
    }
}

fn warn_unknown_in_context(value: &toml::Value, context: &str, known: &[&str]) {
    let Some(table) = value.as_table() else {
        return;
    };
    let known: HashSet<&str> = known.iter().copied().collect();
    for key in table.keys() {
        if known.contains(key.as_str()) {
            continue;
        }
        if context.is_empty() {
            eprintln!("warning: unknown configuration key `{}`", key);
        } else {
            eprintln!("warning: unknown {} entry `{}`", context, key);
        }
    }
}
