#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! MLS data store.
//!
//! Loads the MLS CSV export once per [`store::MlsDataStore`], parses it
//! into typed [`RawRecord`](realty_map_listing_models::RawRecord)s, and
//! hands every caller the same cached [`store::MlsDataset`]. The
//! [`format`] module converts records into the normalized property shape.
//!
//! Where the CSV comes from is abstracted behind [`provider::CsvProvider`]
//! (HTTP download, local file, or an in-memory string for tests).

pub mod config;
pub mod format;
pub mod parsing;
pub mod provider;
pub mod store;

use std::sync::Arc;

pub use config::{CsvLocation, DataSourceConfig};
pub use format::normalize;
pub use store::{LoadState, MlsDataStore, MlsDataset};

/// Errors that can occur while loading the MLS dataset.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed (connection, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Failed to load MLS data: {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV header row could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV has no header row.
    #[error("CSV file contains no header row")]
    MissingHeader,

    /// The background load task panicked or was cancelled.
    #[error("MLS load task failed: {0}")]
    LoadTask(#[from] tokio::task::JoinError),

    /// The fetch did not finish in time.
    #[error("Timed out after {secs}s loading MLS data from {source_name}")]
    Timeout {
        /// Configured timeout in seconds.
        secs: u64,
        /// Provider description.
        source_name: String,
    },
}

/// A load failure shared between every caller that observed it.
pub type SharedStoreError = Arc<StoreError>;
