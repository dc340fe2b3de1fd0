//! Standardized error types following the `error-umasync-<domain>-<number>` format.

use thiserror::Error;

/// Configuration errors that occur during startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when a required environment variable is not set
    #[error("error-umasync-config-1 {0} must be set")]
    EnvVarRequired(String),

    /// Error when version information is not available
    #[error("error-umasync-config-2 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when HTTP client timeout cannot be parsed
    #[error("error-umasync-config-3 Failed to parse HTTP client timeout: {0}")]
    TimeoutParsingFailed(std::num::ParseIntError),

    /// Error when the authorization server URL is not a valid URL
    #[error("error-umasync-config-4 Invalid server URL '{0}': {1}")]
    InvalidServerUrl(String, url::ParseError),
}

/// Entity registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Manifest file could not be read
    #[error("error-umasync-registry-1 Unable to read manifest '{0}': {1}")]
    ManifestUnreadable(String, std::io::Error),

    /// Manifest content is not valid
    #[error("error-umasync-registry-2 Invalid manifest: {0}")]
    ManifestInvalid(#[from] serde_json::Error),
}

/// UMA discovery errors
#[derive(Debug, Error)]
pub enum UmaError {
    /// The well-known document could not be fetched
    #[error("error-umasync-uma-1 Discovery request failed: {0}")]
    DiscoveryFailed(String),

    /// The well-known document is missing a required endpoint
    #[error("error-umasync-uma-2 Discovery document missing {0}")]
    MissingEndpoint(&'static str),
}

/// Access token acquisition errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token endpoint rejected the client credentials
    #[error("error-umasync-token-1 Token request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Token endpoint could not be reached or answered garbage
    #[error("error-umasync-token-2 Token request failed: {0}")]
    Transport(String),

    /// Token endpoint is not known for this client
    #[error("error-umasync-token-3 No token endpoint configured for client {0}")]
    NoTokenEndpoint(String),
}

/// Resource set registration errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A resource with the same name already exists (HTTP 409)
    #[error("error-umasync-resource-1 Resource already exists: {0}")]
    Conflict(String),

    /// The registration endpoint answered with a non-success status
    #[error("error-umasync-resource-2 Resource registration failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// No response was received from the registration endpoint
    #[error("error-umasync-resource-3 Resource registration request failed: {0}")]
    Transport(String),
}

impl ResourceError {
    /// HTTP status code carried by the error, if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ResourceError::Conflict(_) => Some(409),
            ResourceError::Status { status, .. } => Some(*status),
            ResourceError::Transport(_) => None,
        }
    }
}

/// Synchronization errors
#[derive(Debug, Error)]
pub enum SyncError {
    /// Access token could not be obtained
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Resource registration failed with a non-conflict error
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
