use crate::error::{InvoiceExtractError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/process";
pub const ENDPOINT_ENV: &str = "INVOICE_EXTRACT_ENDPOINT";

/// PDFラスタライザの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RasterizerKind {
    #[default]
    Pdftoppm,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub preview_dir: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
    pub modal_max_size: u32,
    pub rasterizer: RasterizerKind,
    pub extra_fields: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_seconds: 300,
            preview_dir: None,
            download_dir: None,
            modal_max_size: 1568,
            rasterizer: RasterizerKind::default(),
            extra_fields: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// 設定JSONを読み込み、値を検証する
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(InvoiceExtractError::Config("timeout_seconds must be at least 1".into()));
        }
        if self.modal_max_size == 0 {
            return Err(InvoiceExtractError::Config("modal_max_size must be at least 1".into()));
        }
        Ok(())
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
            .ok_or_else(|| InvoiceExtractError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("invoice-extract").join("config.json"))
    }

    /// 抽出APIのURL（環境変数を優先）
    pub fn endpoint(&self) -> String {
        match std::env::var(ENDPOINT_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.endpoint.clone(),
        }
    }

    pub fn preview_dir(&self) -> PathBuf {
        self.preview_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("invoice-extract-previews"))
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn set_endpoint(&mut self, endpoint: String) -> Result<()> {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(InvoiceExtractError::Config(format!(
                "endpoint must be an http(s) URL: {}",
                endpoint
            )));
        }
        self.endpoint = endpoint;
        self.save()
    }

    pub fn set_timeout(&mut self, seconds: u64) -> Result<()> {
        let previous = self.timeout_seconds;
        self.timeout_seconds = seconds;
        if let Err(e) = self.validate() {
            self.timeout_seconds = previous;
            return Err(e);
        }
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = Config::from_json(r#"{"endpoint":"http://extract.local/process"}"#).unwrap();
        assert_eq!(config.endpoint, "http://extract.local/process");
        assert_eq!(config.timeout_seconds, 300);
        assert_eq!(config.rasterizer, RasterizerKind::Pdftoppm);
        assert!(config.extra_fields.is_empty());
    }

    #[test]
    fn test_rasterizer_kind_lowercase() {
        let config = Config::from_json(r#"{"rasterizer":"none"}"#).unwrap();
        assert_eq!(config.rasterizer, RasterizerKind::None);
    }

    #[test]
    fn test_zero_values_are_rejected() {
        let err = Config::from_json(r#"{"timeout_seconds":0}"#).unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));

        let err = Config::from_json(r#"{"modal_max_size":0}"#).unwrap_err();
        assert!(err.to_string().contains("modal_max_size"));

        let config = Config::from_json(r#"{"timeout_seconds":30}"#).unwrap();
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_set_timeout_rejects_zero_before_saving() {
        let mut config = Config::default();
        assert!(config.set_timeout(0).is_err());
        assert_eq!(config.timeout_seconds, 300);
    }

    #[test]
    fn test_default_endpoint() {
        assert_eq!(Config::default().endpoint, DEFAULT_ENDPOINT);
    }
}
