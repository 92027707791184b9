use thiserror::Error;

/// Main error type for the Warden supervisor
#[derive(Debug, Error)]
pub enum WardenError {
    // Worker lifecycle errors
    #[error("Failed to spawn worker: {0}")]
    SpawnError(String),

    #[error("Failed to stop worker: {0}")]
    StopError(String),

    #[error("Signal error: {0}")]
    SignalError(String),

    // Heartbeat endpoint errors
    #[error("Heartbeat endpoint error: {0}")]
    HeartbeatError(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("Missing required configuration field: {0}")]
    MissingConfigField(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    // IO errors (automatically converted from std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Warden operations
pub type Result<T> = std::result::Result<T, WardenError>;
