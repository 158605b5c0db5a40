//! Where the MLS CSV bytes come from.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::StoreError;

/// A source of raw CSV bytes.
#[async_trait]
pub trait CsvProvider: Send + Sync {
    /// Human-readable description for log messages (URL or path).
    fn describe(&self) -> String;

    /// Fetches the complete CSV document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the document cannot be fetched.
    async fn fetch(&self) -> Result<Vec<u8>, StoreError>;
}

/// Downloads the CSV over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCsvProvider {
    /// URL of the CSV file to download.
    url: String,
    /// Per-request timeout.
    timeout: Option<Duration>,
}

impl HttpCsvProvider {
    /// Creates a provider for the given URL with no client-side timeout.
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            timeout: None,
        }
    }

    /// Bounds the download with a request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn build_client(&self) -> Result<reqwest::Client, StoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl CsvProvider for HttpCsvProvider {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>, StoreError> {
        let client = self.build_client()?;
        let response = client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let bytes = response.bytes().await?;
        log::debug!("Downloaded {} bytes from {}", bytes.len(), self.url);
        Ok(bytes.to_vec())
    }
}

/// Reads the CSV from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileCsvProvider {
    path: PathBuf,
}

impl FileCsvProvider {
    /// Creates a provider for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CsvProvider for FileCsvProvider {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>, StoreError> {
        let bytes = tokio::fs::read(&self.path).await?;
        log::debug!("Read {} bytes from {}", bytes.len(), self.path.display());
        Ok(bytes)
    }
}

/// Serves a CSV document held in memory.
#[derive(Debug, Clone)]
pub struct InlineCsvProvider {
    text: String,
}

impl InlineCsvProvider {
    /// Creates a provider serving `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
        }
    }
}

#[async_trait]
impl CsvProvider for InlineCsvProvider {
    fn describe(&self) -> String {
        format!("<inline csv, {} bytes>", self.text.len())
    }

    async fn fetch(&self) -> Result<Vec<u8>, StoreError> {
        Ok(self.text.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_file() {
        let path = std::env::temp_dir().join("realty_map_source_provider_test.csv");
        std::fs::write(&path, "LIST_NO,TOWN\n1,Boston\n").unwrap();

        let provider = FileCsvProvider::new(&path);
        let bytes = provider.fetch().await.unwrap();
        assert_eq!(bytes, b"LIST_NO,TOWN\n1,Boston\n");
        assert!(provider.describe().ends_with("realty_map_source_provider_test.csv"));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let provider = FileCsvProvider::new("/nonexistent/realty_map/sold_data.csv");
        assert!(matches!(provider.fetch().await, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn unreachable_url_is_an_http_error() {
        let provider = HttpCsvProvider::new("http://127.0.0.1:9/data/sold_data.csv")
            .with_timeout(Duration::from_secs(2));
        assert_eq!(provider.describe(), "http://127.0.0.1:9/data/sold_data.csv");
        assert!(matches!(provider.fetch().await, Err(StoreError::Http(_))));
    }

    #[tokio::test]
    async fn inline_serves_text() {
        let provider = InlineCsvProvider::new("A,B\n1,2\n");
        assert_eq!(provider.fetch().await.unwrap(), b"A,B\n1,2\n");
    }
}
