//! Error types for the wellness_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for wellness_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP transport error talking to the coaching service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected at the boundary; no state was changed
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Credential mismatch for an existing user
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// An intent that needs an active user was issued without one
    #[error("No active user. Run `wellness login` first.")]
    NotLoggedIn,

    /// Logging and coaching need a completed onboarding
    #[error("Onboarding is not complete. Run `wellness onboard` first.")]
    NotOnboarded,

    /// The coaching service failed or returned an unusable response
    #[error("Coaching service error: {0}")]
    Completion(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
