//! Error taxonomy for structural problems detected before any network use.
use thiserror::Error;

/// Errors that know how the caller can fix them.
pub trait Suggest {
    /// A remediation hint for the human reading the failure.
    fn suggestion(&self) -> Option<String>;
}

/// Credential-structure errors.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("CREDENTIAL/READ: cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CREDENTIAL/PARSE: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("CREDENTIAL/SHAPE: credential document must be a JSON object")]
    NotAnObject,

    #[error("Missing required fields in service account: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

impl Suggest for CredentialError {
    fn suggestion(&self) -> Option<String> {
        let hint = match self {
            Self::Read { .. } => "Ensure the service account JSON file exists and is readable",
            Self::Parse(_) | Self::NotAnObject => "Provide the service account key exactly as downloaded (JSON object)",
            Self::MissingFields(_) => "Please check your service account JSON file",
        };
        Some(hint.to_string())
    }
}

/// Input-validation errors, checked in declaration order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Too many dimensions ({count}). Maximum is {max}.")]
    TooManyDimensions { count: usize, max: usize },

    #[error("Too many metrics ({count}). Maximum is {max}.")]
    TooManyMetrics { count: usize, max: usize },

    #[error("Invalid metrics: {}. Valid metrics: {}", .invalid.join(", "), .valid.join(", "))]
    UnknownMetrics { invalid: Vec<String>, valid: Vec<String> },

    #[error("Invalid date format: '{value}'. Accepted forms: 2024-01-01, 30daysAgo, today, yesterday")]
    InvalidDateToken { value: String },
}

impl Suggest for ValidationError {
    fn suggestion(&self) -> Option<String> {
        let hint = match self {
            Self::TooManyDimensions { .. } => "Reduce the number of dimensions in your query".to_string(),
            Self::TooManyMetrics { .. } => "Reduce the number of metrics in your query".to_string(),
            Self::UnknownMetrics { valid, .. } => format!("Use valid metrics: {}", valid.join(", ")),
            Self::InvalidDateToken { .. } => {
                "Use formats like '2024-01-01', '30daysAgo', 'today', or 'yesterday'".to_string()
            }
        };
        Some(hint)
    }
}
