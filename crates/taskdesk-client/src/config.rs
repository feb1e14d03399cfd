use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Global configuration for the taskdesk client.
///
/// Centralizes the API URL, transport timeout and on-disk paths.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub api_url: String,
    /// Transport-level timeout handed to the HTTP client. `None` keeps the
    /// transport default.
    pub http_timeout: Option<Duration>,
    pub home_dir: PathBuf,
    pub settings_file: PathBuf,
    pub storage_file: PathBuf,
}

/// Optional overrides stored in settings.json.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout_secs: Option<u64>,
}

impl Configuration {
    /// Create configuration from environment variables and defaults.
    pub fn create() -> anyhow::Result<Self> {
        let home_dir = match std::env::var("TASKDESK_HOME") {
            Ok(home) => expand_home(&home),
            Err(_) => dirs_next::home_dir()
                .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?
                .join(".taskdesk"),
        };
        Self::with_home(home_dir)
    }

    /// Build a configuration rooted at `home_dir`, still honouring the
    /// API URL and timeout environment variables.
    pub fn with_home(home_dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&home_dir)
            .with_context(|| format!("failed to create {}", home_dir.display()))?;

        let api_url = std::env::var("TASKDESK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let http_timeout = std::env::var("TASKDESK_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        Ok(Self {
            api_url: normalize_url(&api_url),
            http_timeout,
            settings_file: home_dir.join("settings.json"),
            storage_file: home_dir.join("storage.json"),
            home_dir,
        })
    }

    /// Load settings from file and merge with env-based config.
    ///
    /// Priority: env > settings file > default.
    pub fn load_with_settings(&mut self) -> anyhow::Result<()> {
        let settings = read_settings(&self.settings_file)?;

        if std::env::var("TASKDESK_API_URL").is_err() {
            if let Some(ref url) = settings.api_url {
                tracing::debug!("API URL loaded from settings file");
                self.api_url = normalize_url(url);
            }
        }

        if std::env::var("TASKDESK_HTTP_TIMEOUT_SECS").is_err() {
            if let Some(secs) = settings.http_timeout_secs {
                self.http_timeout = Some(Duration::from_secs(secs));
            }
        }

        Ok(())
    }
}

pub fn read_settings(path: &std::path::Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(user_home) = dirs_next::home_dir() {
            return user_home.join(rest);
        }
    }
    PathBuf::from(raw)
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(normalize_url("http://host:8000/ "), "http://host:8000");
    }

    #[test]
    fn settings_file_supplies_api_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Configuration::with_home(dir.path().to_path_buf()).unwrap();
        std::fs::write(
            &config.settings_file,
            r#"{"apiUrl": "http://example.test/", "httpTimeoutSecs": 5}"#,
        )
        .unwrap();

        config.load_with_settings().unwrap();
        if std::env::var("TASKDESK_API_URL").is_err() {
            assert_eq!(config.api_url, "http://example.test");
        }
        if std::env::var("TASKDESK_HTTP_TIMEOUT_SECS").is_err() {
            assert_eq!(config.http_timeout, Some(Duration::from_secs(5)));
        }
    }

    #[test]
    fn missing_settings_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = read_settings(&dir.path().join("settings.json")).unwrap();
        assert!(settings.api_url.is_none());
    }
}
