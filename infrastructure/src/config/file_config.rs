//! On-disk configuration schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Model used when neither config file nor environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Root configuration, merged from defaults, config files, and environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Active model identifier.
    pub model: String,
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Chat backend endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub key_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl ApiConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.key_env).ok().filter(|k| !k.is_empty())
    }
}

/// Where the session snapshot lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Explicit data directory; platform data dir when unset.
    pub dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the directory the session store writes into.
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("palaver")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_the_fixed_fallback_model() {
        let config = FileConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api.base_url, "https://api.openai.com/v1");
        assert_eq!(config.api.key_env, "OPENAI_API_KEY");
        assert!(config.storage.dir.is_none());
    }

    #[test]
    fn explicit_storage_dir_wins_over_platform_dir() {
        let storage = StorageConfig {
            dir: Some(PathBuf::from("/tmp/palaver-test")),
        };
        assert_eq!(
            storage.resolve_dir(),
            Some(PathBuf::from("/tmp/palaver-test"))
        );
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        use figment::Figment;
        use figment::providers::{Format, Serialized, Toml};

        let config: FileConfig = Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Toml::string("model = \"gpt-4.1\""))
            .extract()
            .unwrap();
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.api.key_env, "OPENAI_API_KEY");
    }
}
