//! Batch enrichment pipeline.
//!
//! A batch selects a deterministic slice of artists still missing data, runs
//! one job over them sequentially and reports progress so the caller can
//! resume from `nextIndex`. Each job plugs into the same runner through the
//! `EnrichmentJob` trait.

mod aggregator;
mod audit_logger;
mod error;
mod job;
pub mod jobs;
mod models;
mod runner;
mod service;
mod worker;

#[cfg(test)]
mod test_support;

pub use aggregator::ResultAggregator;
pub use audit_logger::EnrichmentAuditLogger;
pub use error::EnrichmentError;
pub use job::{EnrichmentJob, JobContext};
pub use models::*;
pub use runner::BatchRunner;
pub use service::{BatchExecution, EnrichmentService};
pub use worker::process_item;
