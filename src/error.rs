use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building a model from configuration.
///
/// Physics never returns these: contract violations inside a step panic, and
/// unsatisfiable Hold Constant modes are reported as [`crate::simulation::Fault`]s.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value is out of range or inconsistent with another one.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// The configuration file is not valid TOML for [`crate::init_config::InitConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The model snapshot could not be encoded or decoded.
    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Propagated I/O errors while reading configuration files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
