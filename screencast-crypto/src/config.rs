use std::path::Path;

use config::Config;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the FairPlay key unwrap bridge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyUnwrapConfig {
    /// Reject key messages longer than 164 bytes and encrypted keys longer than 72 bytes.
    ///
    /// Off by default: senders are known to pad the envelopes with trailing data,
    /// which is ignored.
    #[serde(default)]
    pub strict_lengths: bool,
}

impl KeyUnwrapConfig {
    /// Creates a new configuration
    #[must_use]
    pub const fn new(strict_lengths: bool) -> Self {
        Self { strict_lengths }
    }

    /// Loads the configuration from a file path
    ///
    /// Values are read from the `screencast_crypto` section and can be overridden with
    /// `SCREENCAST_CRYPTO__*` environment variables.
    ///
    /// # Errors
    ///
    /// * `ConfigError::InvalidPath` - If the path is not valid UTF-8
    /// * `ConfigError::Load` - If the file cannot be read or the section cannot be deserialized
    pub fn from_file_path<P: AsRef<Path>>(config_file_path: P) -> Result<Self, ConfigError> {
        let config_file_path = config_file_path.as_ref();
        let path = config_file_path
            .to_str()
            .ok_or_else(|| ConfigError::InvalidPath(config_file_path.display().to_string()))?;

        let config = Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("SCREENCAST_CRYPTO")
                    .keep_prefix(true)
                    .separator("__"),
            )
            .build()?;
        Ok(config.get::<Self>("screencast_crypto")?)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file path is not valid UTF-8: `{0}`")]
    InvalidPath(String),
    #[error("Failed to load screencast-crypto configuration: `{0}`")]
    Load(#[from] config::ConfigError),
}
