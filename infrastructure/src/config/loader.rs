//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;
use tracing::debug;

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `MODEL` (model id only), then `PALAVER_*`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./palaver.toml` or `./.palaver.toml`
    /// 4. XDG config: `~/.config/palaver/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Merging global config {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        for filename in &["palaver.toml", ".palaver.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                debug!("Merging project config {filename}");
                figment = figment.merge(Toml::file(&path));
                break;
            }
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Nested keys via double underscore: PALAVER_API__BASE_URL etc.
        figment = figment.merge(Env::prefixed("PALAVER_").split("__"));

        // The deployment contract names the model via a bare MODEL variable.
        if let Ok(model) = std::env::var("MODEL")
            && !model.is_empty()
        {
            figment = figment.merge(Serialized::default("model", model));
        }

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for `--no-config`)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("palaver").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_defaults_matches_file_config_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.model, super::super::file_config::DEFAULT_MODEL);
    }

    #[test]
    fn global_config_path_is_under_palaver() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("palaver"));
    }
}
