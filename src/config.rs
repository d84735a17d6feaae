use crate::error::{RelayError, Result};
use crate::scoring::ScoringRules;
use crate::utils::normalize_url;
use directories::BaseDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_VAR: &str = "WILLOW_CONFIG";
pub const CRM_TOKEN_VAR: &str = "WILLOW_CRM_TOKEN";
pub const CRM_BASE_URL_VAR: &str = "WILLOW_CRM_BASE_URL";
pub const CRM_TIMEOUT_VAR: &str = "WILLOW_CRM_TIMEOUT_SECS";

/// Process-wide settings. Loaded once at startup and handed to the pieces
/// that need them; nothing in the scoring core reads it directly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub crm: CrmConfig,
    pub scoring: ScoringRules,
    pub cma: CmaConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    pub base_url: String,
    pub api_token: String,
    pub timeout_secs: u64,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.followupboss.com/v1".into(),
            api_token: String::new(),
            timeout_secs: 10,
        }
    }
}

impl CrmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_configured(&self) -> bool {
        !self.api_token.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CmaConfig {
    pub default_template: String,
}

impl Default for CmaConfig {
    fn default() -> Self {
        Self {
            default_template: "GLENN_PERFECT_CMA_FINAL_DEFAULT.html".into(),
        }
    }
}

impl RelayConfig {
    // `WILLOW_CONFIG` wins over the per-user config dir.
    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("willow.toml"))
    }

    /// Reads the config file (if any) and then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match Self::config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// A missing file is not an error and yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let cfg = Self::from_toml(&text)?;
        log::info!("loaded config from {:?}", path);
        Ok(cfg)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let mut cfg: RelayConfig = toml::from_str(text)?;
        cfg.crm.base_url = normalize_url(&cfg.crm.base_url);
        Ok(cfg)
    }

    /// Overlays values from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(CRM_TOKEN_VAR) {
            self.crm.api_token = token;
        }
        if let Some(url) = lookup(CRM_BASE_URL_VAR) {
            self.crm.base_url = normalize_url(&url);
        }
        if let Some(raw) = lookup(CRM_TIMEOUT_VAR) {
            self.crm.timeout_secs = raw.trim().parse().map_err(|_| RelayError::InvalidConfig {
                key: CRM_TIMEOUT_VAR,
                value: raw.clone(),
            })?;
        }
        Ok(())
    }
}
