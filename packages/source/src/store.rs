//! The single-load, cached MLS dataset.
//!
//! [`MlsDataStore::load`] fetches and parses the CSV on first use and
//! memoizes the outcome for the lifetime of the store. The load runs in its
//! own task, so a caller that gives up (a dropped request future) does not
//! abandon it. Callers that arrive while the load is in flight wait on the
//! same `OnceCell` initialization and wake as soon as it finishes. A failed
//! load is cached too: every later caller gets the same error and the CSV
//! is never fetched again.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use realty_map_listing_models::{GeoPoint, RawRecord};
use realty_map_spatial::RadiusIndex;
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::parsing::parse_csv;
use crate::provider::CsvProvider;
use crate::{SharedStoreError, StoreError};

/// The parsed MLS export plus lookup structures built over it.
pub struct MlsDataset {
    records: Vec<RawRecord>,
    by_list_no: BTreeMap<String, usize>,
    radius_index: RadiusIndex,
    skipped_rows: usize,
}

impl MlsDataset {
    /// Builds a dataset from parsed records, indexing listing numbers and
    /// coordinates.
    #[must_use]
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self::with_skipped_rows(records, 0)
    }

    fn with_skipped_rows(records: Vec<RawRecord>, skipped_rows: usize) -> Self {
        let mut by_list_no = BTreeMap::new();
        for (i, record) in records.iter().enumerate() {
            if let Some(list_no) = &record.list_no {
                by_list_no.entry(list_no.clone()).or_insert(i);
            }
        }

        let radius_index = RadiusIndex::new(
            records
                .iter()
                .enumerate()
                .filter_map(|(i, r)| r.coordinates().map(|p| (i, p))),
        );

        Self {
            records,
            by_list_no,
            radius_index,
            skipped_rows,
        }
    }

    /// All records, in file order.
    #[must_use]
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the export had no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped by the parser.
    #[must_use]
    pub const fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Looks up a record by `LIST_NO` (first occurrence wins).
    #[must_use]
    pub fn find(&self, list_no: &str) -> Option<&RawRecord> {
        self.by_list_no
            .get(list_no.trim())
            .map(|&i| &self.records[i])
    }

    /// Records with coordinates within `radius_miles` of `center`, in file
    /// order. Records without coordinates never match.
    pub fn within_radius(
        &self,
        center: GeoPoint,
        radius_miles: f64,
    ) -> impl Iterator<Item = &RawRecord> + '_ {
        self.radius_index
            .within(center, radius_miles)
            .into_iter()
            .map(move |i| &self.records[i])
    }
}

impl std::fmt::Debug for MlsDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MlsDataset")
            .field("records", &self.records.len())
            .field("indexed_points", &self.radius_index.len())
            .field("skipped_rows", &self.skipped_rows)
            .finish()
    }
}

/// Observable state of a [`MlsDataStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LoadState {
    /// Nobody has asked for the data yet.
    NotStarted,
    /// The first load is in flight.
    Loading,
    /// The data is cached.
    Loaded {
        /// Number of records.
        records: usize,
        /// Rows the parser dropped.
        skipped_rows: usize,
    },
    /// The load failed; the error is cached.
    Failed {
        /// Error message.
        message: String,
    },
}

type LoadOutcome = Result<Arc<MlsDataset>, SharedStoreError>;

/// Lazily loaded, process-lifetime cache of the MLS export.
pub struct MlsDataStore {
    shared: Arc<Loader>,
    fetch_timeout: Option<Duration>,
}

/// The part of the store the background load task holds on to.
struct Loader {
    provider: Box<dyn CsvProvider>,
    started: AtomicBool,
    fetch_attempts: AtomicUsize,
    cell: OnceCell<LoadOutcome>,
}

impl MlsDataStore {
    /// Creates a store that will read from `provider` on first use.
    #[must_use]
    pub fn new(provider: impl CsvProvider + 'static) -> Self {
        Self::from_boxed(Box::new(provider))
    }

    /// Creates a store from an already boxed provider.
    #[must_use]
    pub fn from_boxed(provider: Box<dyn CsvProvider>) -> Self {
        Self {
            shared: Arc::new(Loader {
                provider,
                started: AtomicBool::new(false),
                fetch_attempts: AtomicUsize::new(0),
                cell: OnceCell::new(),
            }),
            fetch_timeout: None,
        }
    }

    /// Bounds the fetch with a timeout; a fetch that exceeds it fails the
    /// load with [`StoreError::Timeout`].
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Returns the dataset, loading it on first call.
    ///
    /// Concurrent callers share one fetch. Once loaded, every call returns
    /// the same `Arc`. The fetch runs on a spawned task; dropping the
    /// returned future does not cancel it.
    ///
    /// # Errors
    ///
    /// Returns the (cached) [`StoreError`] if the fetch or header parse
    /// failed. The fetch is not retried.
    pub async fn load(&self) -> Result<Arc<MlsDataset>, SharedStoreError> {
        if let Some(outcome) = self.shared.cell.get() {
            return outcome.clone();
        }

        let shared = self.shared.clone();
        let fetch_timeout = self.fetch_timeout;
        tokio::spawn(async move {
            shared
                .cell
                .get_or_init(|| shared.fetch_and_parse(fetch_timeout))
                .await
                .clone()
        })
        .await
        .map_err(|e| {
            log::error!("MLS load task failed: {e}");
            Arc::new(StoreError::LoadTask(e))
        })?
    }

    /// Current load state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        match self.shared.cell.get() {
            Some(Ok(dataset)) => LoadState::Loaded {
                records: dataset.len(),
                skipped_rows: dataset.skipped_rows(),
            },
            Some(Err(e)) => LoadState::Failed {
                message: e.to_string(),
            },
            None if self.shared.started.load(Ordering::Acquire) => LoadState::Loading,
            None => LoadState::NotStarted,
        }
    }

    /// How many times the CSV has been fetched (at most one per store).
    #[must_use]
    pub fn fetch_attempts(&self) -> usize {
        self.shared.fetch_attempts.load(Ordering::Acquire)
    }

    /// Description of the underlying provider.
    #[must_use]
    pub fn source_description(&self) -> String {
        self.shared.provider.describe()
    }
}

impl Loader {
    async fn fetch_and_parse(&self, fetch_timeout: Option<Duration>) -> LoadOutcome {
        self.started.store(true, Ordering::Release);
        self.fetch_attempts.fetch_add(1, Ordering::AcqRel);

        let source = self.provider.describe();
        let start = Instant::now();
        log::info!("Loading MLS data from {source}");

        let result = match self.fetch_bytes(&source, fetch_timeout).await {
            Ok(bytes) => parse_csv(&bytes),
            Err(e) => Err(e),
        };

        match result {
            Ok(parsed) => {
                log::info!(
                    "Loaded {} MLS records ({} columns) from {source} in {:.2}s",
                    parsed.records.len(),
                    parsed.headers.len(),
                    start.elapsed().as_secs_f64()
                );
                log::debug!("MLS columns: {}", parsed.headers.join(", "));
                Ok(Arc::new(MlsDataset::with_skipped_rows(
                    parsed.records,
                    parsed.skipped_rows,
                )))
            }
            Err(e) => {
                log::error!("Error loading MLS data from {source}: {e}");
                Err(Arc::new(e))
            }
        }
    }

    async fn fetch_bytes(
        &self,
        source: &str,
        fetch_timeout: Option<Duration>,
    ) -> Result<Vec<u8>, StoreError> {
        let Some(timeout) = fetch_timeout else {
            return self.provider.fetch().await;
        };

        tokio::time::timeout(timeout, self.provider.fetch())
            .await
            .map_err(|_| StoreError::Timeout {
                secs: timeout.as_secs(),
                source_name: source.to_owned(),
            })?
    }
}

impl std::fmt::Debug for MlsDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MlsDataStore")
            .field("source", &self.shared.provider.describe())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
