//! Garden Studio configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{DesignComplexity, GardenStyle};

/// Main Garden Studio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model provider configuration
    pub llm: LlmConfig,

    /// Project storage configuration
    pub storage: StorageConfig,

    /// Studio defaults
    pub studio: StudioConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the API key environment variable is set. Call this before
    /// commands that talk to the model; gallery commands don't need it.
    pub fn validate(&self) -> Result<()> {
        self.llm.get_api_key()?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .gardenstudio.yml
        let local_config = PathBuf::from(".gardenstudio.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/gardenstudio/gardenstudio.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("gardenstudio").join("gardenstudio.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Vision model used for feature detection
    #[serde(rename = "detect-model")]
    pub detect_model: String,

    /// Image model used for design generation
    #[serde(rename = "design-model")]
    pub design_model: String,

    /// Text model used for advisory chat
    #[serde(rename = "chat-model")]
    pub chat_model: String,

    /// Request timeout in milliseconds; unset waits indefinitely
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Retries on transient HTTP errors; 0 disables retrying
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            detect_model: "gemini-3-flash-preview".to_string(),
            design_model: "gemini-2.5-flash-image".to_string(),
            chat_model: "gemini-3-flash-preview".to_string(),
            timeout_ms: None,
            max_retries: 0,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(eyre::eyre!(
                "API key not found. Set the {} environment variable.",
                self.api_key_env
            )),
        }
    }
}

/// Project storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the key-value store
    pub path: PathBuf,

    /// Byte quota for all stored values; unset is unlimited
    #[serde(rename = "quota-bytes")]
    pub quota_bytes: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: keystore::default_store_path(),
            quota_bytes: Some(keystore::DEFAULT_QUOTA_BYTES),
        }
    }
}

/// Studio defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Style preselected on the landing view
    #[serde(rename = "default-style")]
    pub default_style: Option<GardenStyle>,

    /// Complexity preselected on the landing view
    #[serde(rename = "default-complexity")]
    pub default_complexity: DesignComplexity,

    /// Where rendered designs are written
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Directory of `.pmt` prompt overrides
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: Option<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            default_style: Some(GardenStyle::Modern),
            default_complexity: DesignComplexity::Balanced,
            output_dir: PathBuf::from("."),
            prompts_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.max_retries, 0);
        assert!(config.llm.timeout_ms.is_none());
        assert_eq!(config.studio.default_style, Some(GardenStyle::Modern));
        assert_eq!(config.studio.default_complexity, DesignComplexity::Balanced);
        assert_eq!(config.storage.quota_bytes, Some(keystore::DEFAULT_QUOTA_BYTES));
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();

        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com/v1beta");
        assert_eq!(config.design_model, "gemini-2.5-flash-image");
        assert!(config.detect_model.contains("flash"));
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: gemini
  api-key-env: MY_GEMINI_KEY
  base-url: https://proxy.example.com/v1beta
  design-model: gemini-3-pro-image-preview
  timeout-ms: 120000
  max-retries: 2

storage:
  path: /tmp/garden
  quota-bytes: 5242880

studio:
  default-style: Japanese Zen
  default-complexity: Luxury & High-End
  output-dir: renders
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.api_key_env, "MY_GEMINI_KEY");
        assert_eq!(config.llm.design_model, "gemini-3-pro-image-preview");
        assert_eq!(config.llm.timeout_ms, Some(120_000));
        assert_eq!(config.llm.max_retries, 2);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/garden"));
        assert_eq!(config.storage.quota_bytes, Some(5_242_880));
        assert_eq!(config.studio.default_style, Some(GardenStyle::Zen));
        assert_eq!(config.studio.default_complexity, DesignComplexity::Premium);
        assert_eq!(config.studio.output_dir, PathBuf::from("renders"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  chat-model: gemini-2.5-pro
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.llm.chat_model, "gemini-2.5-pro");

        // Defaults for unspecified
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.studio.default_complexity, DesignComplexity::Balanced);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("gardenstudio.yml");
        std::fs::write(&path, "studio:\n  default-style: Mediterranean\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.studio.default_style, Some(GardenStyle::Mediterranean));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/gardenstudio.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_get_api_key() {
        let config = LlmConfig {
            api_key_env: "GARDENSTUDIO_TEST_API_KEY".to_string(),
            ..Default::default()
        };

        // SAFETY: serialized test, no other thread reads this variable
        unsafe { std::env::remove_var("GARDENSTUDIO_TEST_API_KEY") };
        assert!(config.get_api_key().is_err());

        unsafe { std::env::set_var("GARDENSTUDIO_TEST_API_KEY", "  secret  ") };
        assert_eq!(config.get_api_key().unwrap(), "secret");

        unsafe { std::env::set_var("GARDENSTUDIO_TEST_API_KEY", "") };
        assert!(config.get_api_key().is_err());

        unsafe { std::env::remove_var("GARDENSTUDIO_TEST_API_KEY") };
    }
}
