//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

const PROJECT_FILES: [&str; 2] = ["ragdash.toml", ".ragdash.toml"];
const ENV_PREFIX: &str = "RAGDASH_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `RAGDASH_API__BASE_URL`, `RAGDASH_MODELS__DEFAULT`, ...
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./ragdash.toml` or `./.ragdash.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/ragdash/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    fn figment(config_path: Option<&PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/ragdash/config.toml if set,
    /// otherwise falls back to ~/.config/ragdash/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ragdash").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Env:     {}* (sections split by '__')", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Flag:    {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./ragdash.toml or ./.ragdash.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use ragdash_domain::{DecodeMode, Model};

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.models.default, Model::Llama2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("ragdash"));
    }

    /// Run `body` in a scratch directory with no global config.
    fn isolated(body: impl FnOnce(&mut Jail) -> figment::error::Result<()>) {
        Jail::expect_with(|jail| {
            let xdg = jail.directory().join("xdg");
            jail.set_env("XDG_CONFIG_HOME", xdg.display());
            body(jail)
        });
    }

    fn load(path: Option<&str>) -> figment::error::Result<FileConfig> {
        ConfigLoader::load(path.map(PathBuf::from).as_ref()).map_err(|e| *e)
    }

    #[test]
    fn test_explicit_file_merges_over_defaults() {
        isolated(|jail| {
            jail.create_file(
                "custom.toml",
                "[api]\nbase_url = \"http://10.0.0.5:9000\"\n\n[stream]\ndecode = \"strict\"",
            )?;

            let config = load(Some("custom.toml"))?;
            assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
            assert_eq!(config.stream.decode, DecodeMode::Strict);
            // untouched sections keep their defaults
            assert_eq!(config.health.poll_interval_seconds, 300);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        isolated(|jail| {
            jail.create_file(
                "ragdash.toml",
                "[models]\ndefault = \"llama3.2\"\n\n[health]\npoll_interval_seconds = 30",
            )?;
            jail.create_file("custom.toml", "[health]\npoll_interval_seconds = 90")?;

            let config = load(Some("custom.toml"))?;
            assert_eq!(config.models.default, Model::Llama32);
            assert_eq!(config.health.poll_interval_seconds, 90);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_explicit_file() {
        isolated(|jail| {
            jail.create_file(
                "custom.toml",
                "[api]\nbase_url = \"http://10.0.0.5:9000\"\n\n[health]\npoll_interval_seconds = 60",
            )?;
            jail.set_env("RAGDASH_API__BASE_URL", "http://dash.internal:8000");
            jail.set_env("RAGDASH_STREAM__DECODE", "strict");

            let config = load(Some("custom.toml"))?;
            assert_eq!(config.api.base_url, "http://dash.internal:8000");
            assert_eq!(config.stream.decode, DecodeMode::Strict);
            assert_eq!(config.health.poll_interval_seconds, 60);
            Ok(())
        });
    }

    #[test]
    fn test_type_errors_are_reported() {
        isolated(|jail| {
            jail.create_file("custom.toml", "[health]\npoll_interval_seconds = \"soon\"")?;
            assert!(load(Some("custom.toml")).is_err());
            Ok(())
        });
    }
}
