//! # Application Configuration
//!
//! Settings come from three places, highest precedence first:
//!
//! 1. command-line flags
//! 2. the config file (`--config`, or `objfactory.toml` in the working directory)
//! 3. the `OBJFACTORY_STRATEGY` environment variable (strategy only)
//!
//! Anything still unset takes the engine default.

use crate::cli::CliError;
use objfactory_core::Strategy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "objfactory.toml";

/// Environment variable holding a strategy name.
pub const STRATEGY_ENV: &str = "OBJFACTORY_STRATEGY";

/// Contents of a config file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Default strategy name.
    pub strategy: Option<String>,
    /// Specification file. Relative paths are taken from the config file's directory.
    pub specifications: Option<PathBuf>,
}

impl AppConfig {
    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config: Self = toml::from_str(&text)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;

        if let (Some(specs), Some(dir)) = (&config.specifications, path.parent())
            && specs.is_relative()
        {
            config.specifications = Some(dir.join(specs));
        }
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Read the explicit config file, or the default one if it exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, CliError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Effective settings after precedence is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub strategy: Strategy,
    pub specifications: Option<PathBuf>,
}

impl Settings {
    /// Merge flag values, the config file and the environment.
    pub fn resolve(
        flag_strategy: Option<&str>,
        flag_specs: Option<&Path>,
        file: &AppConfig,
        env_strategy: Option<&str>,
    ) -> Result<Self, CliError> {
        let strategy = match flag_strategy
            .or(file.strategy.as_deref())
            .or(env_strategy)
        {
            Some(name) => name.parse::<Strategy>()?,
            None => Strategy::default(),
        };
        let specifications = flag_specs
            .map(Path::to_path_buf)
            .or_else(|| file.specifications.clone());

        Ok(Self {
            strategy,
            specifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_win_over_file_and_environment() {
        let file = AppConfig {
            strategy: Some("specification".into()),
            specifications: Some(PathBuf::from("file.toml")),
        };
        let settings = Settings::resolve(
            Some("reflection"),
            Some(Path::new("flag.toml")),
            &file,
            Some("both"),
        )
        .expect("settings");

        assert_eq!(settings.strategy, Strategy::ReflectionOnly);
        assert_eq!(settings.specifications, Some(PathBuf::from("flag.toml")));
    }

    #[test]
    fn environment_is_used_last() {
        let settings =
            Settings::resolve(None, None, &AppConfig::default(), Some("specification")).expect("settings");
        assert_eq!(settings.strategy, Strategy::SpecificationOnly);
        assert_eq!(settings.specifications, None);

        let settings = Settings::resolve(None, None, &AppConfig::default(), None).expect("settings");
        assert_eq!(settings.strategy, Strategy::Both);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let result = Settings::resolve(Some("sometimes"), None, &AppConfig::default(), None);
        assert!(result.is_err());
    }

    #[test]
    fn relative_specifications_follow_the_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("objfactory.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "strategy = \"both\"\nspecifications = \"specs.toml\"").expect("write");

        let config = AppConfig::load(&path).expect("load");
        assert_eq!(config.specifications, Some(dir.path().join("specs.toml")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("objfactory.toml");
        std::fs::write(&path, "colour = \"blue\"\n").expect("write");

        assert!(matches!(AppConfig::load(&path), Err(CliError::Config(_))));
    }
}
