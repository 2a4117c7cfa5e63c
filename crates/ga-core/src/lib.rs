//! GA Core: data model, validation and response normalization
//!
//! Everything in this crate is pure: no network, no clocks. The fetch and
//! report crates build on these types.

pub mod catalog;
pub mod credentials;
pub mod data_model;
pub mod error;
pub mod records;
pub mod result;
pub mod validation;

pub use credentials::{CredentialDocument, ServiceAccount};
pub use data_model::{Dataset, DimensionFilter, FieldValue, Metadata, NormalizedRecord, QuerySpec, RawRow};
pub use error::{CredentialError, Suggest, ValidationError};
pub use result::{Failure, FetchResult};
pub use validation::validate_query;

/// Upper bound the provider accepts for `limit`.
pub const MAX_ROW_LIMIT: u64 = 100_000;

/// Row limit used when callers do not ask for one.
pub const DEFAULT_ROW_LIMIT: u64 = 10_000;
