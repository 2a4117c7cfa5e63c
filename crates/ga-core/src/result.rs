//! The tagged success/failure value every public operation returns.
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

use crate::error::Suggest;

/// Failure payload: an actionable message plus an optional remediation hint.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{error}")]
pub struct Failure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), suggestion: None }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Build from any error that can describe its own remedy.
    pub fn from_error<E: Display + Suggest>(err: &E) -> Self {
        Self { error: err.to_string(), suggestion: err.suggestion() }
    }
}

/// Uniform outcome of the core operations.
///
/// Serialized with a `status` tag so the tool surface can forward it as-is:
/// `{"status":"success", ...payload}` or
/// `{"status":"failure","error":"...","suggestion":"..."}`.
#[must_use = "a FetchResult may carry a failure that should be reported"]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResult<T> {
    Success(T),
    Failure(Failure),
}

impl<T> FetchResult<T> {
    pub fn failure(error: impl Into<String>, suggestion: Option<String>) -> Self {
        Self::Failure(Failure { error: error.into(), suggestion })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    pub fn err(&self) -> Option<&Failure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

impl<T, E: Display + Suggest> From<Result<T, E>> for FetchResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(Failure::from_error(&err)),
        }
    }
}

impl<T> From<Failure> for FetchResult<T> {
    fn from(failure: Failure) -> Self {
        Self::Failure(failure)
    }
}
