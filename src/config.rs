//! Connection settings
//!
//! Values are resolved in order, later wins: built-in defaults, the settings
//! file, then environment and flags (clap reads `BLOXONE_*` for the flags).
//! Empty strings count as unset everywhere.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::paths;

/// Default service endpoint
pub const DEFAULT_CSP_URL: &str = "https://csp.infoblox.com";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Contents of `config.toml`
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub csp_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub page_limit: Option<usize>,
}

impl SettingsFile {
    /// Load a settings file; a missing file is empty
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid settings in {}", path.display()))
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub csp_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub page_limit: Option<usize>,
}

/// Resolved settings
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub csp_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub page_limit: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            csp_url: DEFAULT_CSP_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_limit: None,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("csp_url", &self.csp_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Layer a settings file and overrides over the defaults
    pub fn resolve(file: SettingsFile, overrides: Overrides) -> Self {
        let mut settings = Self::default();

        if let Some(url) = non_empty(overrides.csp_url).or(non_empty(file.csp_url)) {
            settings.csp_url = url;
        }
        settings.api_key = non_empty(overrides.api_key).or(non_empty(file.api_key));
        if let Some(secs) = overrides.timeout_secs.or(file.timeout_secs) {
            settings.timeout = Duration::from_secs(secs);
        }
        settings.page_limit = overrides.page_limit.or(file.page_limit);

        settings
    }

    /// Resolve from the default settings file
    pub fn load(overrides: Overrides) -> Result<Self> {
        let path = paths::config_file()?;
        let file = SettingsFile::load(&path)?;
        let settings = Self::resolve(file, overrides);
        log::debug!("Resolved settings: {settings:?}");
        Ok(settings)
    }

    /// Build the API client
    pub fn client(&self) -> Result<ddi::HttpClient> {
        let api_key = self.api_key.clone().unwrap_or_default();
        let config = ddi::ClientConfig::new(&self.csp_url, api_key)
            .with_timeout(self.timeout)
            .with_user_agent(concat!("ddictl/", env!("CARGO_PKG_VERSION")));
        ddi::HttpClient::new(config)
            .map_err(|e| anyhow::anyhow!("{e}\n  hint: {}", e.category().advice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(SettingsFile::default(), Overrides::default());
        assert_eq!(settings.csp_url, DEFAULT_CSP_URL);
        assert!(settings.api_key.is_none());
        assert_eq!(settings.timeout, Duration::from_secs(60));
        assert!(settings.page_limit.is_none());
    }

    #[test]
    fn test_file_over_defaults() {
        let file = SettingsFile {
            csp_url: Some("https://csp.eu.example.com".to_string()),
            api_key: Some("from-file".to_string()),
            timeout_secs: Some(5),
            page_limit: Some(200),
        };
        let settings = Settings::resolve(file, Overrides::default());
        assert_eq!(settings.csp_url, "https://csp.eu.example.com");
        assert_eq!(settings.api_key.as_deref(), Some("from-file"));
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.page_limit, Some(200));
    }

    #[test]
    fn test_overrides_over_file() {
        let file = SettingsFile {
            api_key: Some("from-file".to_string()),
            ..SettingsFile::default()
        };
        let overrides = Overrides {
            api_key: Some("from-flag".to_string()),
            ..Overrides::default()
        };
        let settings = Settings::resolve(file, overrides);
        assert_eq!(settings.api_key.as_deref(), Some("from-flag"));
    }

    #[test]
    fn test_empty_is_unset() {
        let file = SettingsFile {
            csp_url: Some("https://csp.eu.example.com".to_string()),
            api_key: Some("from-file".to_string()),
            ..SettingsFile::default()
        };
        let overrides = Overrides {
            csp_url: Some(String::new()),
            api_key: Some("  ".to_string()),
            ..Overrides::default()
        };
        let settings = Settings::resolve(file, overrides);
        assert_eq!(settings.csp_url, "https://csp.eu.example.com");
        assert_eq!(settings.api_key.as_deref(), Some("from-file"));

        let settings = Settings::resolve(
            SettingsFile {
                csp_url: Some(String::new()),
                ..SettingsFile::default()
            },
            Overrides::default(),
        );
        assert_eq!(settings.csp_url, DEFAULT_CSP_URL);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let file = SettingsFile::load(&temp.path().join("config.toml")).unwrap();
        assert_eq!(file, SettingsFile::default());
    }

    #[test]
    fn test_load_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "csp_url = \"https://csp.example.com\"\napi_key = \"abc\"\ntimeout_secs = 10\n",
        )
        .unwrap();
        let file = SettingsFile::load(&path).unwrap();
        assert_eq!(file.csp_url.as_deref(), Some("https://csp.example.com"));
        assert_eq!(file.api_key.as_deref(), Some("abc"));
        assert_eq!(file.timeout_secs, Some(10));
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "cps_url = \"typo\"\n").unwrap();
        assert!(SettingsFile::load(&path).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = Settings {
            api_key: Some("super-secret".to_string()),
            ..Settings::default()
        };
        assert!(!format!("{settings:?}").contains("super-secret"));
    }

    #[test]
    fn test_client_requires_key() {
        assert!(Settings::default().client().is_err());
        let settings = Settings {
            api_key: Some("abc".to_string()),
            ..Settings::default()
        };
        assert!(settings.client().is_ok());
    }
}
