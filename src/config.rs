use crate::error::{PhotoGeoError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const API_KEY_ENV: &str = "LOCATIONIQ_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    /// 逆ジオコーディングのエンドポイント
    pub endpoint: String,
    /// レート制限時の再試行間隔
    pub retry_delay_ms: u64,
    /// 再試行の上限（None = 成功するまで）
    pub max_retry_attempts: Option<u32>,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://us1.locationiq.com/v1/reverse.php".into(),
            retry_delay_ms: 1000,
            max_retry_attempts: None,
            timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// 読めない設定ファイルは既定値として扱う（`config` コマンドで上書きして直せるように）
    pub fn load_or_default(config_path: &Path) -> Self {
        Self::load_from(config_path).unwrap_or_else(|e| {
            tracing::warn!("設定ファイルを読めないため既定値を使います: {} ({})", config_path.display(), e);
            Self::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PhotoGeoError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-geo").join("config.json"))
    }

    /// APIキーを取得（コマンドライン > 環境変数 > 設定ファイル）
    pub fn get_api_key(&self, cli_key: Option<&str>) -> Result<String> {
        if let Some(key) = cli_key.filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(PhotoGeoError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert!(config.max_retry_attempts.is_none());
        assert!(config.endpoint.contains("reverse"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"api_key":"abc"}"#).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load_from(&path), Err(PhotoGeoError::JsonParse(_))));
        let config = Config::load_or_default(&path);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.retry_delay_ms, 1000);
    }

    #[test]
    fn test_cli_key_wins() {
        let config = Config {
            api_key: Some("from-file".into()),
            ..Default::default()
        };
        assert_eq!(config.get_api_key(Some("from-cli")).unwrap(), "from-cli");
    }
}
