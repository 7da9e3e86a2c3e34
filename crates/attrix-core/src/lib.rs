//! Core contracts for attrix.
//!
//! This crate contains:
//! - The static metric catalog and derived event-metric names
//! - The authenticated report client and outbound query builder
//! - The total row transformer onto the fixed warehouse schema
//! - The batch orchestrator with its per-item fault boundary

pub mod batch;
pub mod catalog;
pub mod client;
pub mod error;
pub mod http;
pub mod transform;

pub use batch::{BatchEntry, BatchProcessor, BatchRequest, BatchResponse, WorkItem};
pub use client::{
    RawReportRow, ReportClient, ReportQuery, REPORT_ENDPOINT, REPORT_TIMEOUT_MS,
};
pub use error::ReportError;
pub use http::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use transform::{transform_row, OutputRow, CURRENCY_CODE, DATA_SOURCE_NAME};
