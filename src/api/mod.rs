//! JSON API over the planner, the scorer and the itinerary builder

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::{Place, UserPreferences, WeatherSnapshot};
use crate::planner::{PlanRequest, TripPlan, TripPlanner};
use crate::recommendation::{
    ItineraryEntry, ItineraryLayout, ScoredPlace, TrafficMap, build_itinerary_with_layout,
    score_places,
};
use crate::{TripPlannerError, VERSION};

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TripPlanner>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub places: Vec<Place>,
    #[serde(default)]
    pub traffic: TrafficMap,
    pub weather_quality: u8,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub sort_by_travel_time: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub ranked_places: Vec<ScoredPlace>,
    pub weather: WeatherSnapshot,
    #[serde(default)]
    pub preferences: UserPreferences,
    pub num_days: usize,
    #[serde(default)]
    pub layout: ItineraryLayout,
}

/// Planner errors rendered as `{"error": "..."}` with a matching status
pub struct ApiError(TripPlannerError);

impl From<TripPlannerError> for ApiError {
    fn from(error: TripPlannerError) -> Self {
        Self(error)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            TripPlannerError::Validation { .. } => StatusCode::BAD_REQUEST,
            TripPlannerError::NotFound { .. } => StatusCode::NOT_FOUND,
            TripPlannerError::Api { .. } => StatusCode::BAD_GATEWAY,
            TripPlannerError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

pub fn router(planner: Arc<TripPlanner>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plan", post(plan))
        .route("/score", post(score))
        .route("/itinerary", post(itinerary))
        .with_state(AppState { planner })
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}

async fn plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<TripPlan>, ApiError> {
    let plan = state.planner.plan(&request).await?;
    Ok(Json(plan))
}

async fn score(Json(request): Json<ScoreRequest>) -> Json<Vec<ScoredPlace>> {
    Json(score_places(
        &request.places,
        &request.traffic,
        request.weather_quality,
        &request.preferences,
        request.sort_by_travel_time,
    ))
}

async fn itinerary(Json(request): Json<ItineraryRequest>) -> Json<Vec<ItineraryEntry>> {
    Json(build_itinerary_with_layout(
        request.layout,
        &request.ranked_places,
        &request.weather,
        &request.preferences,
        request.num_days,
    ))
}
