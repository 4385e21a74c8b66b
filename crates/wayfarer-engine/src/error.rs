//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and zone setup.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: wayfarer_core::ConfigError,
    },

    /// Zone coordination or journaling failed.
    #[error("zone error: {source}")]
    Core {
        /// The underlying coordination error.
        #[from]
        source: wayfarer_core::CoreError,
    },

    /// A command-line argument could not be understood.
    #[error("invalid argument '{argument}': {message}")]
    Argument {
        /// The offending argument.
        argument: String,
        /// What is wrong with it.
        message: String,
    },

    /// The tracing subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
