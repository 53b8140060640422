use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    /// A body or geometry could not be created. Fatal at startup; a failed reset keeps the
    /// previous scene.
    #[error("could not create {what}: {reason}")]
    ResourceCreation { what: &'static str, reason: String },

    /// A world or contact setting the solver cannot work with.
    #[error("invalid {setting}: {reason}")]
    InvalidSetting {
        setting: &'static str,
        reason: String,
    },

    #[error("could not read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
