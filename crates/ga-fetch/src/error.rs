//! Fetch-time error model
use ga_core::{CredentialError, Suggest, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    Credential(#[from] CredentialError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not authenticated. Please run authenticate first.")]
    NotAuthenticated,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Unexpected provider response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Errors that cannot change on retry.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Credential(_) | Self::Validation(_))
    }
}

impl Suggest for FetchError {
    fn suggestion(&self) -> Option<String> {
        match self {
            Self::Credential(err) => err.suggestion(),
            Self::Validation(err) => err.suggestion(),
            Self::Auth(_) => Some("Check your service account permissions and property ID".to_string()),
            Self::NotAuthenticated => {
                Some("Call authenticate with a service account and property ID".to_string())
            }
            Self::Network(_) | Self::Provider { .. } | Self::Decode(_) => None,
        }
    }
}
