#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the price prediction service.
//!
//! The service takes a listing's full MLS row as a JSON object (upstream
//! column names) and answers `{"prediction": <number or null>}`.
//! [`PredictionClient::predict`] never fails: any error is logged and
//! reported as "no prediction".

use std::time::Duration;

use realty_map_listing_models::RawRecord;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the prediction endpoint.
pub const PREDICTION_URL_ENV: &str = "PREDICTION_URL";

/// Endpoint used when [`PREDICTION_URL_ENV`] is unset.
pub const DEFAULT_PREDICTION_URL: &str = "http://127.0.0.1:5000/api/predict";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from the prediction service.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("Failed to get prediction: {status} {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    prediction: Option<f64>,
}

/// HTTP client for the prediction endpoint.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    /// Creates a client posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Creates a client for `PREDICTION_URL`, or the local default.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Http`] if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, PredictionError> {
        let endpoint = std::env::var(PREDICTION_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PREDICTION_URL.to_string());
        Self::new(endpoint.trim(), DEFAULT_TIMEOUT)
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Requests a prediction for `record`.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] if the request fails, the service
    /// answers with a non-2xx status, or the body is not valid JSON.
    pub async fn try_predict(&self, record: &RawRecord) -> Result<Option<f64>, PredictionError> {
        log::debug!(
            "POST {} for listing {}",
            self.endpoint,
            record.list_no.as_deref().unwrap_or("<unknown>")
        );

        let response = self.client.post(&self.endpoint).json(record).send().await?;
        let status = response.status();
        let body = response.text().await?;
        log::trace!("Prediction response {status}: {body}");

        if !status.is_success() {
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_prediction(&body)
    }

    /// Requests a prediction for `record`, treating every failure as "no
    /// prediction".
    pub async fn predict(&self, record: &RawRecord) -> Option<f64> {
        match self.try_predict(record).await {
            Ok(prediction) => prediction,
            Err(e) => {
                log::error!("Error getting price prediction: {e}");
                None
            }
        }
    }
}

/// Extracts the `prediction` field from a service response.
///
/// # Errors
///
/// Returns [`PredictionError::Parse`] if `body` is not a JSON object with
/// an optional numeric `prediction`.
pub fn parse_prediction(body: &str) -> Result<Option<f64>, PredictionError> {
    let response: PredictionResponse = serde_json::from_str(body)?;
    Ok(response.prediction.filter(|p| p.is_finite()))
}
