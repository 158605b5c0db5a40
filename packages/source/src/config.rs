//! Where to load the MLS export from, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::provider::{CsvProvider, FileCsvProvider, HttpCsvProvider};
use crate::store::MlsDataStore;

/// Environment variable holding the CSV download URL.
pub const CSV_URL_ENV: &str = "MLS_CSV_URL";

/// Environment variable holding a local CSV path.
pub const CSV_PATH_ENV: &str = "MLS_CSV_PATH";

/// Environment variable holding the fetch timeout in seconds.
pub const FETCH_TIMEOUT_ENV: &str = "MLS_FETCH_TIMEOUT_SECS";

/// Path used when neither a URL nor a path is configured.
pub const DEFAULT_CSV_PATH: &str = "data/sold_data.csv";

/// Default fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Location of the MLS CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvLocation {
    /// Download over HTTP.
    Url(String),
    /// Read from the local filesystem.
    Path(PathBuf),
}

impl Default for CsvLocation {
    fn default() -> Self {
        Self::Path(PathBuf::from(DEFAULT_CSV_PATH))
    }
}

impl std::fmt::Display for CsvLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Data store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceConfig {
    /// Where the CSV lives.
    pub location: CsvLocation,
    /// Upper bound on the fetch.
    pub fetch_timeout: Duration,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            location: CsvLocation::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl DataSourceConfig {
    /// Creates a configuration for `location` with the default timeout.
    #[must_use]
    pub fn new(location: CsvLocation) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    /// Reads `MLS_CSV_URL`, `MLS_CSV_PATH` and `MLS_FETCH_TIMEOUT_SECS`.
    ///
    /// A URL takes precedence over a path. Empty or unparsable values fall
    /// back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let location = if let Some(url) = non_empty(CSV_URL_ENV) {
            CsvLocation::Url(url.trim().to_owned())
        } else if let Some(path) = non_empty(CSV_PATH_ENV) {
            CsvLocation::Path(PathBuf::from(path.trim()))
        } else {
            CsvLocation::default()
        };

        let fetch_timeout = match non_empty(FETCH_TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_or_else(
                |_| {
                    log::warn!("Ignoring invalid {FETCH_TIMEOUT_ENV}={raw}");
                    DEFAULT_FETCH_TIMEOUT
                },
                Duration::from_secs,
            ),
            None => DEFAULT_FETCH_TIMEOUT,
        };

        Self {
            location,
            fetch_timeout,
        }
    }

    /// Builds the provider for the configured location.
    #[must_use]
    pub fn provider(&self) -> Box<dyn CsvProvider> {
        match &self.location {
            CsvLocation::Url(url) => {
                Box::new(HttpCsvProvider::new(url).with_timeout(self.fetch_timeout))
            }
            CsvLocation::Path(path) => Box::new(FileCsvProvider::new(path.clone())),
        }
    }

    /// Builds an unloaded store for this configuration.
    #[must_use]
    pub fn into_store(self) -> MlsDataStore {
        log::debug!("MLS data source: {}", self.location);
        MlsDataStore::from_boxed(self.provider()).with_fetch_timeout(self.fetch_timeout)
    }
}
