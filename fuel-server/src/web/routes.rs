//! HTTP route handlers.

use std::collections::HashSet;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use tower_http::trace::TraceLayer;

use crate::domain::FuelType;
use crate::favorites::{AddOutcome, RemoveOutcome, annotate_favorites};
use crate::provider::ProviderError;
use crate::{geo, prices};

use super::dto::*;
use super::state::AppState;

/// Header carrying the authenticated user id.
///
/// Authentication itself lives outside this service; the API gateway
/// resolves the token and forwards the user id here.
const USER_HEADER: &str = "x-user-id";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/fuel/prices", get(general_prices))
        .route("/api/fuel/stations/nearby", get(nearby_stations))
        .route(
            "/api/fuel/stations/favorites",
            get(favorite_stations).post(add_favorite),
        )
        .route(
            "/api/fuel/stations/favorites/:station_id",
            delete(remove_favorite),
        )
        .route("/api/fuel/stations/search/:query", get(search_stations))
        .route("/api/fuel/stations/:station_id", get(station_details))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Network-wide average fuel prices.
async fn general_prices(State(state): State<AppState>) -> Result<Json<PricesResponse>, AppError> {
    let snapshot = state.cache.stations().await?;
    Ok(Json(PricesResponse {
        prices: prices::average_prices(&snapshot.stations),
    }))
}

/// Stations within a radius of a location, nearest first.
async fn nearby_stations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<NearbyParams>,
) -> Result<Json<StationListResponse>, AppError> {
    let fuel = params
        .fuel_type
        .as_deref()
        .map(FuelType::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;

    let snapshot = state.cache.stations().await?;
    let ranked = geo::nearby(&snapshot.stations, params.lat, params.lng, params.radius, fuel);

    let favorite_ids = favorites_for(&state, &headers).await;
    let stations = ranked
        .iter()
        .map(|r| StationDto::from_ranked(r, favorite_ids.contains(&r.station.id)))
        .collect();

    Ok(Json(StationListResponse { stations }))
}

/// The user's favorite stations.
async fn favorite_stations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StationListResponse>, AppError> {
    let user = require_user(&headers)?;
    let favorite_ids = state.favorites.list_ids(&user).await;

    if favorite_ids.is_empty() {
        return Ok(Json(StationListResponse { stations: vec![] }));
    }

    let snapshot = state.cache.stations().await?;
    let stations = snapshot
        .stations
        .iter()
        .filter(|s| favorite_ids.contains(&s.id))
        .map(|s| StationDto::from_station(s, true))
        .collect();

    Ok(Json(StationListResponse { stations }))
}

/// Add a station to the user's favorites.
async fn add_favorite(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AddFavoriteRequest>,
) -> Result<Response, AppError> {
    let user = require_user(&headers)?;

    let response = match state.favorites.add(&user, &body.station_id).await {
        AddOutcome::Added => (
            StatusCode::CREATED,
            Json(MessageResponse {
                message: "station added to favorites".to_string(),
            }),
        ),
        AddOutcome::AlreadyExists => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "station already in favorites".to_string(),
            }),
        ),
    };

    Ok(response.into_response())
}

/// Remove a station from the user's favorites.
async fn remove_favorite(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(station_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let user = require_user(&headers)?;

    let message = match state.favorites.remove(&user, &station_id).await {
        RemoveOutcome::Removed => "station removed from favorites",
        RemoveOutcome::NotFound => "station was not in favorites",
    };

    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

/// Details for a single station.
async fn station_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(station_id): Path<String>,
) -> Result<Json<StationDto>, AppError> {
    let snapshot = state.cache.stations().await?;

    let station = snapshot
        .stations
        .iter()
        .find(|s| s.id == station_id)
        .ok_or_else(|| AppError::NotFound {
            message: format!("station {station_id} not found"),
        })?;

    let favorite_ids = favorites_for(&state, &headers).await;
    Ok(Json(StationDto::from_station(
        station,
        favorite_ids.contains(&station.id),
    )))
}

/// Search stations by name, brand, address or city.
async fn search_stations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(query): Path<String>,
) -> Result<Json<StationListResponse>, AppError> {
    let snapshot = state.cache.stations().await?;
    let matches = geo::search(&snapshot.stations, &query);

    let favorite_ids = favorites_for(&state, &headers).await;
    let stations = annotate_favorites(&matches, &favorite_ids)
        .iter()
        .map(StationDto::from_annotated)
        .collect();

    Ok(Json(StationListResponse { stations }))
}

/// The user id forwarded by the gateway, if any.
fn user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn require_user(headers: &HeaderMap) -> Result<String, AppError> {
    user_id(headers).ok_or(AppError::Unauthorized)
}

/// Favorite ids for the requesting user; empty without a user context.
async fn favorites_for(state: &AppState, headers: &HeaderMap) -> HashSet<String> {
    match user_id(headers) {
        Some(user) => state.favorites.list_ids(&user).await,
        None => HashSet::new(),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unauthorized,
    NotFound { message: String },
    Unavailable { message: String },
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        // Whatever leaks out of the cache means no canonical data could be
        // produced; staleness never surfaces as an error.
        AppError::Unavailable {
            message: format!("fuel data temporarily unavailable: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "missing user identity".to_string(),
            ),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        tracing::error!(status = %status, "{message}");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
