#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line MLS property search.
//!
//! Runs the same search, filter and autocomplete logic as the API server
//! against a CSV export and prints the results as JSON. The data source
//! comes from `--csv-url`/`--csv-path`, falling back to `MLS_CSV_URL`,
//! `MLS_CSV_PATH` and finally `data/sold_data.csv`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use realty_map_geocoder::service_registry;
use realty_map_listing_models::{GeoPoint, GeoRadius, NumericRange, SearchFilter};
use realty_map_prediction::PredictionClient;
use realty_map_search::{PropertySearch, SearchConfig, SearchOptions};
use realty_map_source::{CsvLocation, DataSourceConfig};

#[derive(Parser)]
#[command(name = "realty_map", about = "MLS property search")]
struct Cli {
    /// URL of the MLS CSV export (overrides `MLS_CSV_URL`)
    #[arg(long, global = true, conflicts_with = "csv_path")]
    csv_url: Option<String>,
    /// Local path of the MLS CSV export (overrides `MLS_CSV_PATH`)
    #[arg(long, global = true)]
    csv_path: Option<PathBuf>,
    /// Search radius in miles (overrides `REALTY_MAP_SEARCH_RADIUS_MILES`)
    #[arg(long, global = true, value_parser = parse_radius)]
    radius: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search listings by location or by address text
    Search {
        /// Free-text query (e.g., "Cambridge, MA" or "10 Elm")
        query: String,
        /// Match address, town, state and ZIP text instead of geocoding
        #[arg(long)]
        direct: bool,
    },
    /// Location autocomplete suggestions
    Suggest {
        /// Partial address, city or ZIP code
        query: String,
    },
    /// List listings matching structured filters
    Filter(FilterArgs),
    /// Show a single listing by MLS number
    Show {
        /// MLS listing number
        id: String,
        /// Also request a price prediction (`PREDICTION_URL`)
        #[arg(long)]
        predict: bool,
    },
    /// Load the data and report how many records were read
    Status,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// State code (case-insensitive)
    #[arg(long)]
    state: Option<String>,
    /// City (case-insensitive)
    #[arg(long)]
    city: Option<String>,
    /// Exact ZIP code
    #[arg(long)]
    zip: Option<String>,
    /// Address substring (case-insensitive)
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    min_beds: Option<f64>,
    #[arg(long)]
    max_beds: Option<f64>,
    #[arg(long)]
    min_baths: Option<f64>,
    #[arg(long)]
    max_baths: Option<f64>,
    #[arg(long)]
    min_sqft: Option<f64>,
    #[arg(long)]
    max_sqft: Option<f64>,
    /// Center latitude for a radius constraint (requires `--lng`)
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Center longitude for a radius constraint (requires `--lat`)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
}

/// Accepts finite, non-negative mile counts.
fn parse_radius(raw: &str) -> Result<f64, String> {
    let radius: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid radius '{raw}': {e}"))?;
    if radius.is_finite() && radius >= 0.0 {
        Ok(radius)
    } else {
        Err(format!(
            "radius must be a finite, non-negative number of miles, got {raw}"
        ))
    }
}

impl FilterArgs {
    fn into_filter(self, radius_miles: f64) -> SearchFilter {
        let range = |min: Option<f64>, max: Option<f64>| {
            (min.is_some() || max.is_some()).then_some(NumericRange { min, max })
        };

        SearchFilter {
            state_code: self.state,
            city: self.city,
            postal_code: self.zip,
            address: self.address,
            list_price: range(self.min_price, self.max_price),
            beds: range(self.min_beds, self.max_beds),
            baths: range(self.min_baths, self.max_baths),
            sqft: range(self.min_sqft, self.max_sqft),
            geo: self.lat.zip(self.lng).map(|(lat, lng)| GeoRadius {
                center: GeoPoint::new(lat, lng),
                radius_miles,
            }),
        }
    }
}

impl Cli {
    fn data_source(&self) -> DataSourceConfig {
        let mut config = DataSourceConfig::from_env();
        if let Some(url) = &self.csv_url {
            config.location = CsvLocation::Url(url.clone());
        } else if let Some(path) = &self.csv_path {
            config.location = CsvLocation::Path(path.clone());
        }
        config
    }

    fn search_config(&self) -> SearchConfig {
        let mut config = SearchConfig::from_env();
        if let Some(radius) = self.radius {
            config.radius_miles = radius;
        }
        config
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let data_source = cli.data_source();
    log::info!("MLS data source: {}", data_source.location);
    let store = Arc::new(data_source.into_store());
    let geocoder = service_registry::default_geocoder()?;
    let search = PropertySearch::new(store.clone(), Arc::new(geocoder))
        .with_config(cli.search_config());

    match cli.command {
        Commands::Search { query, direct } => {
            let options = SearchOptions {
                direct_search: direct,
            };
            let results = search.search(&query, options).await?;
            log::info!("{} listings found", results.len());
            print_json(&results)?;
        }
        Commands::Suggest { query } => {
            print_json(&search.suggest(&query).await)?;
        }
        Commands::Filter(args) => {
            let filter = args.into_filter(search.config().radius_miles);
            let results = search.search_filtered(&filter).await?;
            log::info!("{} listings found", results.len());
            print_json(&results)?;
        }
        Commands::Show { id, predict } => {
            let Some(property) = search.find_by_id(&id).await? else {
                return Err(format!("Property {id} not found").into());
            };

            if predict {
                let client = PredictionClient::from_env()?;
                let prediction = client.predict(&property.raw_data).await;
                print_json(&serde_json::json!({
                    "property": property,
                    "prediction": prediction,
                }))?;
            } else {
                print_json(&property)?;
            }
        }
        Commands::Status => {
            store.load().await?;
            print_json(&store.state())?;
        }
    }

    Ok(())
}
