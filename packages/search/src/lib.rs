#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property search over the cached MLS dataset.
//!
//! [`PropertySearch`] ties together the data store, the geocoder and the
//! distance filter. It answers four kinds of questions:
//!
//! - free-text search, either by direct address/town/ZIP text match or by
//!   geocoding the query and returning everything within a radius,
//! - structured filtering ([`SearchFilter`]),
//! - lookup by MLS number,
//! - location autocomplete ([`suggest`]).
//!
//! Every result goes through [`realty_map_source::normalize`].

pub mod matching;
pub mod suggest;

use std::sync::Arc;

use realty_map_geocoder::Geocoder;
use realty_map_listing_models::{NormalizedProperty, RawRecord, SearchFilter, Suggestion};
use realty_map_source::{MlsDataStore, SharedStoreError, normalize};
use realty_map_spatial::DEFAULT_SEARCH_RADIUS_MILES;

use crate::matching::{DirectQuery, matches_filter};
use crate::suggest::rank_suggestions;

/// Environment variable overriding the geo search radius.
pub const SEARCH_RADIUS_ENV: &str = "REALTY_MAP_SEARCH_RADIUS_MILES";

/// Default maximum number of suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Default minimum query length (in characters) for suggestions.
pub const DEFAULT_MIN_SUGGESTION_QUERY_LEN: usize = 2;

/// Errors surfaced by [`PropertySearch`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The MLS dataset could not be loaded.
    #[error("MLS data unavailable: {0}")]
    Store(#[from] SharedStoreError),
}

/// Options for [`PropertySearch::search`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Match the query against listing text instead of geocoding it.
    pub direct_search: bool,
}

impl SearchOptions {
    /// Direct text search.
    #[must_use]
    pub const fn direct() -> Self {
        Self {
            direct_search: true,
        }
    }
}

/// Tunables for search and autocomplete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Geo search radius in miles.
    pub radius_miles: f64,
    /// Maximum number of suggestions returned.
    pub suggestion_limit: usize,
    /// Queries shorter than this (in characters) get no suggestions.
    pub min_suggestion_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_miles: DEFAULT_SEARCH_RADIUS_MILES,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            min_suggestion_query_len: DEFAULT_MIN_SUGGESTION_QUERY_LEN,
        }
    }
}

impl SearchConfig {
    /// Defaults, with the radius taken from `REALTY_MAP_SEARCH_RADIUS_MILES`
    /// when it holds a finite, non-negative number.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_radius_from(std::env::var(SEARCH_RADIUS_ENV).ok().as_deref())
    }

    fn with_radius_from(mut self, raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return self;
        };
        match raw.parse::<f64>() {
            Ok(radius) if radius.is_finite() && radius >= 0.0 => self.radius_miles = radius,
            _ => log::warn!("Ignoring invalid {SEARCH_RADIUS_ENV}={raw}"),
        }
        self
    }
}

/// Searches the MLS dataset held by a [`MlsDataStore`].
pub struct PropertySearch {
    store: Arc<MlsDataStore>,
    geocoder: Arc<dyn Geocoder>,
    config: SearchConfig,
}

impl PropertySearch {
    /// Creates a search over `store`, geocoding with `geocoder`, using the
    /// default [`SearchConfig`].
    #[must_use]
    pub fn new(store: Arc<MlsDataStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            store,
            geocoder,
            config: SearchConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub const fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<MlsDataStore> {
        &self.store
    }

    /// Free-text search.
    ///
    /// In direct mode the query is matched against each record's text (see
    /// [`DirectQuery`]). Otherwise the query is geocoded and every record
    /// within [`SearchConfig::radius_miles`] of the result is returned; a
    /// query that cannot be geocoded returns an empty list. Results keep
    /// dataset order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Store`] if the dataset could not be loaded.
    pub async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<NormalizedProperty>, SearchError> {
        let dataset = self.store.load().await?;

        if options.direct_search {
            let direct = DirectQuery::new(query);
            log::debug!("Direct search terms: {:?}", direct.terms());
            let results = normalize_all(dataset.records().iter().filter(|r| direct.matches(r)));
            log::debug!("Direct search for {query:?} found {} results", results.len());
            return Ok(results);
        }

        let Some(center) = self.geocoder.resolve(query).await else {
            log::debug!("No location for {query:?}, returning no results");
            return Ok(Vec::new());
        };

        let results = normalize_all(dataset.within_radius(center, self.config.radius_miles));
        log::debug!(
            "Geo search for {query:?} ({:.4}, {:.4}) within {} mi found {} results",
            center.lat,
            center.lng,
            self.config.radius_miles,
            results.len()
        );
        Ok(results)
    }

    /// Returns every record satisfying all constraints in `filter`, in
    /// dataset order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Store`] if the dataset could not be loaded.
    pub async fn search_filtered(
        &self,
        filter: &SearchFilter,
    ) -> Result<Vec<NormalizedProperty>, SearchError> {
        let dataset = self.store.load().await?;

        let results = match &filter.geo {
            Some(geo) => normalize_all(
                dataset
                    .within_radius(geo.center, geo.radius_miles)
                    .filter(|r| matches_filter(r, filter)),
            ),
            None => normalize_all(dataset.records().iter().filter(|r| matches_filter(r, filter))),
        };

        log::debug!("Filtered search found {} results", results.len());
        Ok(results)
    }

    /// Looks a listing up by its MLS number.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Store`] if the dataset could not be loaded.
    pub async fn find_by_id(
        &self,
        property_id: &str,
    ) -> Result<Option<NormalizedProperty>, SearchError> {
        let dataset = self.store.load().await?;
        Ok(dataset.find(property_id).and_then(normalize))
    }

    /// Location autocomplete for `query`.
    ///
    /// Returns an empty list for short queries and for any failure,
    /// including a failed dataset load.
    pub async fn suggest(&self, query: &str) -> Vec<Suggestion> {
        if query.chars().count() < self.config.min_suggestion_query_len {
            return Vec::new();
        }

        match self.store.load().await {
            Ok(dataset) => rank_suggestions(dataset.records(), query, self.config.suggestion_limit),
            Err(e) => {
                log::error!("Error getting location suggestions for {query:?}: {e}");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for PropertySearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertySearch")
            .field("store", &self.store)
            .field("geocoder", &self.geocoder.name())
            .field("config", &self.config)
            .finish()
    }
}

fn normalize_all<'a>(records: impl Iterator<Item = &'a RawRecord>) -> Vec<NormalizedProperty> {
    records.filter_map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use realty_map_geocoder::GeocodeError;
    use realty_map_listing_models::{GeoPoint, GeoRadius, NumericRange, SuggestionType};
    use realty_map_source::provider::{FileCsvProvider, InlineCsvProvider};

    use super::*;

    const ELM_ST: &str = "\
LIST_NO,ADDRESS,TOWN,STATE,ZIP_CODE,LIST_PRICE,NO_BEDROOMS
1,10 Elm St,Boston,MA,02108,400000,3
";

    const LISTINGS: &str = "\
LIST_NO,LIST_PRICE,ADDRESS,TOWN,STATE,ZIP_CODE,NO_BEDROOMS,TOTAL_BATHS,SQUARE_FEET,LATITUDE,LONGITUDE
1,400000,10 Elm St,Boston,MA,02108,3,1.5,1200,42.3570,-71.0630
2,650000,123 Main St,Cambridge,MA,02139,4,2,1800,42.3736,-71.1097
3,300000,123 Elm St,Worcester,MA,01608,2,1,900,42.2626,-71.8023
4,520000,7 Harbor Way,East Boston,MA,02128,3,2,1500,0,0
,,,,,,,,,,
";

    /// Returns a fixed answer and records every query it sees.
    struct FixedGeocoder {
        point: Option<GeoPoint>,
        queries: Mutex<Vec<String>>,
    }

    impl FixedGeocoder {
        fn new(point: Option<GeoPoint>) -> Arc<Self> {
            Arc::new(Self {
                point,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn try_resolve(&self, query: &str) -> Result<Option<GeoPoint>, GeocodeError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.point)
        }
    }

    fn boston() -> GeoPoint {
        GeoPoint::new(42.3601, -71.0589)
    }

    fn search_over(csv: &str, geocoder: Arc<FixedGeocoder>) -> PropertySearch {
        let store = Arc::new(MlsDataStore::new(InlineCsvProvider::new(csv)));
        PropertySearch::new(store, geocoder)
    }

    fn ids(results: &[NormalizedProperty]) -> Vec<&str> {
        results
            .iter()
            .filter_map(|p| p.property_id.as_deref())
            .collect()
    }

    #[tokio::test]
    async fn elm_street_example() {
        let search = search_over(ELM_ST, FixedGeocoder::new(None));

        let results = search
            .search("10 Elm", SearchOptions::direct())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].property_id.as_deref(), Some("1"));
        assert_eq!(results[0].list_price, Some(400_000.0));

        let suggestions = search.suggest("El").await;
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionType::Address);
        assert_eq!(suggestions[0].line.as_deref(), Some("10 Elm St"));
    }

    #[tokio::test]
    async fn direct_search_requires_every_term() {
        let search = search_over(LISTINGS, FixedGeocoder::new(None));

        let results = search
            .search("123 Main", SearchOptions::direct())
            .await
            .unwrap();
        assert_eq!(ids(&results), ["2"]);

        let results = search
            .search("elm", SearchOptions::direct())
            .await
            .unwrap();
        assert_eq!(ids(&results), ["1", "3"]);
    }

    #[tokio::test]
    async fn direct_search_does_not_geocode() {
        let geocoder = FixedGeocoder::new(Some(boston()));
        let search = search_over(LISTINGS, geocoder.clone());

        search
            .search("Boston", SearchOptions::direct())
            .await
            .unwrap();
        assert!(geocoder.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn geo_search_uses_radius_and_skips_ungeocoded_records() {
        let geocoder = FixedGeocoder::new(Some(boston()));
        let search = search_over(LISTINGS, geocoder.clone());

        let results = search
            .search("Boston, MA", SearchOptions::default())
            .await
            .unwrap();
        // Worcester is ~40 mi out; East Boston has 0,0 coordinates.
        assert_eq!(ids(&results), ["1", "2"]);
        assert_eq!(*geocoder.queries.lock().unwrap(), ["Boston, MA"]);
    }

    #[tokio::test]
    async fn geo_search_radius_is_configurable() {
        let search = search_over(LISTINGS, FixedGeocoder::new(Some(boston()))).with_config(
            SearchConfig {
                radius_miles: 50.0,
                ..SearchConfig::default()
            },
        );

        let results = search
            .search("Boston", SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(ids(&results), ["1", "2", "3"]);
    }

    #[tokio::test]
    async fn unresolvable_query_returns_nothing() {
        let search = search_over(LISTINGS, FixedGeocoder::new(None));
        let results = search
            .search("Atlantis", SearchOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_an_error_for_search_but_not_suggest() {
        let store = Arc::new(MlsDataStore::new(FileCsvProvider::new(
            "/nonexistent/realty_map/sold_data.csv",
        )));
        let search = PropertySearch::new(store.clone(), FixedGeocoder::new(None));

        assert!(matches!(
            search.search("Boston", SearchOptions::direct()).await,
            Err(SearchError::Store(_))
        ));
        assert!(search.find_by_id("1").await.is_err());
        assert!(search.suggest("Boston").await.is_empty());
        assert_eq!(store.fetch_attempts(), 1);
    }

    #[tokio::test]
    async fn filtered_search_ands_constraints() {
        let search = search_over(LISTINGS, FixedGeocoder::new(None));

        let filter = SearchFilter {
            beds: Some(NumericRange::at_least(3.0)),
            list_price: Some(NumericRange::at_most(500_000.0)),
            ..SearchFilter::default()
        };
        let results = search.search_filtered(&filter).await.unwrap();
        assert_eq!(ids(&results), ["1"]);

        let filter = SearchFilter {
            state_code: Some("ma".to_string()),
            address: Some("123".to_string()),
            ..SearchFilter::default()
        };
        let results = search.search_filtered(&filter).await.unwrap();
        assert_eq!(ids(&results), ["2", "3"]);
    }

    #[tokio::test]
    async fn empty_filter_returns_every_non_blank_record() {
        let search = search_over(LISTINGS, FixedGeocoder::new(None));
        let results = search
            .search_filtered(&SearchFilter::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(ids(&results), ["1", "2", "3", "4"]);
        assert_eq!(search.store().load().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn filtered_search_with_radius() {
        let search = search_over(LISTINGS, FixedGeocoder::new(None));
        let filter = SearchFilter {
            geo: Some(GeoRadius {
                center: boston(),
                radius_miles: 25.0,
            }),
            baths: Some(NumericRange::at_least(2.0)),
            ..SearchFilter::default()
        };
        let results = search.search_filtered(&filter).await.unwrap();
        assert_eq!(ids(&results), ["2"]);
    }

    #[tokio::test]
    async fn finds_by_id() {
        let search = search_over(LISTINGS, FixedGeocoder::new(None));

        let found = search.find_by_id("3").await.unwrap().unwrap();
        assert_eq!(found.location.address.city.as_deref(), Some("Worcester"));
        assert!(search.find_by_id("42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn short_queries_get_no_suggestions() {
        let search = search_over(LISTINGS, FixedGeocoder::new(None));
        assert!(search.suggest("").await.is_empty());
        assert!(search.suggest("B").await.is_empty());
        assert_eq!(search.store().state(), realty_map_source::LoadState::NotStarted);
        assert!(!search.suggest("Bo").await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_searches_share_one_load() {
        let search = Arc::new(search_over(LISTINGS, FixedGeocoder::new(Some(boston()))));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let search = search.clone();
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        search.search("elm", SearchOptions::direct()).await.map(|r| r.len())
                    } else {
                        Ok(search.suggest("bos").await.len())
                    }
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().unwrap() > 0);
        }
        assert_eq!(search.store().fetch_attempts(), 1);
    }

    #[test]
    fn radius_override() {
        let config = SearchConfig::default().with_radius_from(Some(" 10.5 "));
        assert!((config.radius_miles - 10.5).abs() < f64::EPSILON);

        let config = SearchConfig::default().with_radius_from(Some("-3"));
        assert!((config.radius_miles - DEFAULT_SEARCH_RADIUS_MILES).abs() < f64::EPSILON);

        let config = SearchConfig::default().with_radius_from(None);
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.suggestion_limit, 10);
        assert_eq!(config.min_suggestion_query_len, 2);
    }
}
