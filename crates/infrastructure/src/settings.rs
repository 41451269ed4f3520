//! Layered session settings.
//!
//! Sources, lowest precedence first:
//! - built-in defaults
//! - the user config file (Linux: `~/.config/dnac-session/config.toml`)
//! - an explicitly named file
//! - `DNAC_` environment variables, with `__` between nested keys
//!   (`DNAC_TRUST__FORCE_TRUST=true`)

use std::path::PathBuf;

use config::{Config, Environment, File};
use dnac_domain::SessionSettings;

use crate::persistence::FileCredentialStore;

const ENV_PREFIX: &str = "DNAC";

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or does not match the settings shape.
    #[error("invalid settings: {0}")]
    Load(#[from] config::ConfigError),

    /// No store directory configured and no platform data directory.
    #[error("could not determine a directory for the session store")]
    NoDataDir,
}

/// Builds [`SessionSettings`] from layered sources.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    user_file: Option<PathBuf>,
    explicit_file: Option<PathBuf>,
    environment: bool,
    environment_source: Option<config::Map<String, String>>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Loader reading the user config file and the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_file: Self::user_config_path(),
            explicit_file: None,
            environment: true,
            environment_source: None,
        }
    }

    /// Path of the per-user config file, if the platform has a config dir.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dnac-session").join("config.toml"))
    }

    /// Skip the per-user config file.
    #[must_use]
    pub fn without_user_config(mut self) -> Self {
        self.user_file = None;
        self
    }

    /// Skip environment variables.
    #[must_use]
    pub fn without_environment(mut self) -> Self {
        self.environment = false;
        self
    }

    /// Read environment variables from `vars` instead of the process.
    #[must_use]
    pub fn with_environment_source(mut self, vars: config::Map<String, String>) -> Self {
        self.environment = true;
        self.environment_source = Some(vars);
        self
    }

    /// Add a settings file that must exist. Format follows the extension.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// Merges all sources into settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] if the explicit file is missing, a
    /// file fails to parse, or a value has the wrong type.
    pub fn load(&self) -> Result<SessionSettings, SettingsError> {
        let mut builder = Config::builder();

        if let Some(path) = &self.user_file {
            builder = builder.add_source(File::from(path.clone()).required(false));
        }
        if let Some(path) = &self.explicit_file {
            builder = builder.add_source(File::from(path.clone()).required(true));
        }
        if self.environment {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(self.environment_source.clone()),
            );
        }

        let settings: SessionSettings = builder.build()?.try_deserialize()?;
        tracing::debug!(
            scheme = %settings.scheme,
            login_path = %settings.login_path,
            force_trust = settings.trust.force_trust,
            "settings loaded"
        );
        Ok(settings)
    }
}

/// Directory for the session store: the configured one, else the platform
/// data directory.
///
/// # Errors
///
/// Returns [`SettingsError::NoDataDir`] when neither is available.
pub fn resolve_store_dir(settings: &SessionSettings) -> Result<PathBuf, SettingsError> {
    settings
        .store_dir
        .clone()
        .or_else(FileCredentialStore::<crate::TokioFileSystem>::default_dir)
        .ok_or(SettingsError::NoDataDir)
}
