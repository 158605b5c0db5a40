//! HTTP handler functions for the realty map API.

use actix_web::{HttpResponse, web};
use realty_map_search::{SearchError, SearchOptions};
use realty_map_server_models::{
    ApiHealth, ApiPrediction, ApiStatus, PropertyQueryParams, SearchQueryParams,
    SuggestionQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/search`
///
/// Free-text search. `direct=true` matches listing text; otherwise the
/// query is geocoded and listings within the configured radius are
/// returned.
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchQueryParams>,
) -> HttpResponse {
    let options = SearchOptions {
        direct_search: params.direct.unwrap_or(false),
    };

    match state.search.search(&params.q, options).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => store_error("search properties", &e),
    }
}

/// `GET /api/properties`
///
/// Structured listing filter.
pub async fn properties(
    state: web::Data<AppState>,
    params: web::Query<PropertyQueryParams>,
) -> HttpResponse {
    let filter = params.to_filter(state.search.config().radius_miles);

    match state.search.search_filtered(&filter).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => store_error("filter properties", &e),
    }
}

/// `GET /api/properties/{id}`
pub async fn property(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match state.search.find_by_id(&id).await {
        Ok(Some(property)) => HttpResponse::Ok().json(property),
        Ok(None) => not_found(&id),
        Err(e) => store_error("look up property", &e),
    }
}

/// `GET /api/properties/{id}/prediction`
///
/// Asks the prediction service about a listing. The prediction is `null`
/// when the service is unreachable or has no answer.
pub async fn prediction(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    let property = match state.search.find_by_id(&id).await {
        Ok(Some(property)) => property,
        Ok(None) => return not_found(&id),
        Err(e) => return store_error("look up property", &e),
    };

    let prediction = state.prediction.predict(&property.raw_data).await;
    HttpResponse::Ok().json(ApiPrediction {
        property_id: id,
        prediction,
    })
}

/// `GET /api/suggestions`
///
/// Location autocomplete. Never fails; errors yield an empty list.
pub async fn suggestions(
    state: web::Data<AppState>,
    params: web::Query<SuggestionQueryParams>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.search.suggest(&params.q).await)
}

/// `GET /api/status`
///
/// Reports where MLS data comes from and whether it has loaded.
pub async fn status(state: web::Data<AppState>) -> HttpResponse {
    let store = state.search.store();
    HttpResponse::Ok().json(ApiStatus {
        source: store.source_description(),
        load: store.state(),
    })
}

fn store_error(action: &str, e: &SearchError) -> HttpResponse {
    log::error!("Failed to {action}: {e}");
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": e.to_string()
    }))
}

fn not_found(id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": format!("Property {id} not found")
    }))
}
