//! Browsflix Core - shared building blocks
//!
//! Configuration, tracing setup, the movie record handed around by the search
//! layer, and the usage recorder that tracks which queries lead to which movie.

pub mod config;
pub mod movie;
pub mod recorder;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::BrowsflixConfig;
pub use movie::Movie;
pub use recorder::{
    InMemoryUsageRecorder, JsonFileUsageRecorder, NoopUsageRecorder, RecorderError, SearchRecord,
    UsageRecorder,
};

/// Top-level errors surfaced by Browsflix binaries.
#[derive(Debug, thiserror::Error)]
pub enum BrowsflixError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

impl BrowsflixError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            BrowsflixError::Configuration { reason } => {
                format!("Invalid configuration: {reason}")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BrowsflixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_message() {
        let err = BrowsflixError::Configuration {
            reason: "debounce interval must be positive".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Invalid configuration: debounce interval must be positive"
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: debounce interval must be positive"
        );
    }
}
