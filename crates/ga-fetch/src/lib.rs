//! GA-FETCH: authenticated, retrying report retrieval
//!
//! The [`Fetcher`] is the only component that talks to the network. It
//! re-validates every [`ga_core::QuerySpec`], authenticates lazily, retries
//! failed attempts with exponential backoff and hands the rows to the
//! response normalizer.

pub mod auth;
pub mod client;
pub mod error;
pub mod fetcher;

pub use client::{HttpReportingClient, ReportRequest, ReportResponse, ReportingClient};
pub use error::FetchError;
pub use fetcher::{
    AuthSummary, ConnectionReport, Connector, Fetcher, GoogleConnector, PropertyInfo, RetryPolicy, Sleeper,
    TokioSleeper,
};
