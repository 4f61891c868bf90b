use crate::core::calendar::WeekStart;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Display currency; every amount is in this single currency.
    pub currency: String,
    #[serde(default)]
    pub week_start: WeekStart,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "subtrack", "subtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "subtrack", "subtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency: "EUR"
week_start: sunday
data_path: "/tmp/subtrack"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.week_start, WeekStart::Sunday);
        assert_eq!(config.data_path.as_deref(), Some("/tmp/subtrack"));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/subtrack")
        );
    }

    #[test]
    fn test_week_start_defaults_to_monday() {
        let config: AppConfig = serde_yaml::from_str("currency: USD").unwrap();
        assert_eq!(config.week_start, WeekStart::Monday);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_missing_currency_is_rejected() {
        let result: Result<AppConfig, _> = serde_yaml::from_str("week_start: monday");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_path_reports_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yaml");

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));

        fs::write(&path, "currency: [unclosed")?;
        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));

        fs::write(&path, "currency: GBP\n")?;
        assert_eq!(AppConfig::load_from_path(&path)?.currency, "GBP");
        Ok(())
    }
}
