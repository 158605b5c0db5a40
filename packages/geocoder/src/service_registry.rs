//! Compile-time registry of geocoding service configurations.
//!
//! Each geocoding provider is defined in a TOML file under `services/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_services`] and [`enabled_services`]. [`default_geocoder`] builds
//! the highest-priority enabled provider, honouring the
//! `REALTY_MAP_GEOCODER_URL` override.

use serde::Deserialize;

use crate::{GeocodeError, NominatimGeocoder};

/// Environment variable that overrides the configured Nominatim base URL
/// (e.g., to point at a self-hosted instance).
pub const GEOCODER_URL_ENV: &str = "REALTY_MAP_GEOCODER_URL";

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be used.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Selection order; lower values win.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Nominatim / `OpenStreetMap` free-text search.
    Nominatim {
        /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
        base_url: String,
        /// Per-request timeout in seconds.
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
        /// `User-Agent` header; the public instance rejects anonymous clients.
        user_agent: String,
        /// Optional comma-separated ISO country filter.
        #[serde(default)]
        country_codes: Option<String>,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    10
}

impl GeocodingService {
    /// Returns the provider's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Nominatim { base_url, .. } => base_url,
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[("nominatim", include_str!("../services/nominatim.toml"))];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 1;

/// Returns all geocoding service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut services: Vec<GeocodingService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    services
}

/// Builds the highest-priority enabled geocoder.
///
/// If [`GEOCODER_URL_ENV`] is set, it replaces the configured base URL.
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if no service is enabled, or
/// [`GeocodeError::Http`] if the HTTP client cannot be built.
pub fn default_geocoder() -> Result<NominatimGeocoder, GeocodeError> {
    let service = default_service(std::env::var(GEOCODER_URL_ENV).ok().as_deref())?;
    log::debug!("Using geocoding service {} ({})", service.name, service.id);
    NominatimGeocoder::from_service(&service)
}

/// The highest-priority enabled service, with its base URL replaced by
/// `url_override` when that is non-blank.
fn default_service(url_override: Option<&str>) -> Result<GeocodingService, GeocodeError> {
    let mut service = enabled_services()
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::Config {
            message: "no enabled geocoding service".to_string(),
        })?;

    if let Some(url) = url_override.map(str::trim).filter(|u| !u.is_empty()) {
        log::info!("Using geocoder URL from {GEOCODER_URL_ENV}: {url}");
        match &mut service.provider {
            ProviderConfig::Nominatim { base_url, .. } => *base_url = url.to_string(),
        }
    }

    Ok(service)
}
