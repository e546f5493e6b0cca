// src/routes.rs

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::chart::{Chart, ChartAssembler};
use crate::{ChartError, Location, Moment, ZodiacPlacement};

/// Time assumed when the caller omits one.
pub const DEFAULT_TIME: &str = "12:00";
/// IST offset, matching the original service's default.
pub const DEFAULT_TIMEZONE: f64 = 5.5;

pub struct AppState {
    pub assembler: ChartAssembler,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(liveness))
        .route("/vedic-signs", post(vedic_signs))
}

async fn liveness() -> &'static str {
    "vedic-signs service is running"
}

// ---------------------------
// ## Request / Response Shapes
// ---------------------------

/// All fields optional at the wire so that missing-field errors come back
/// as a 400 with a message, not a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ChartRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    pub timezone: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PlacementBody {
    pub sign: String,
    /// Degrees into the sign, rounded to two decimals at this boundary only.
    pub degree: String,
    pub nakshatra: String,
}

impl From<ZodiacPlacement> for PlacementBody {
    fn from(placement: ZodiacPlacement) -> Self {
        PlacementBody {
            sign: placement.sign.to_string(),
            degree: format!("{:.2}", placement.degree_in_sign),
            nakshatra: placement.nakshatra.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub date: String,
    pub time: String,
    pub timezone: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub sun: PlacementBody,
    pub moon: PlacementBody,
    pub mercury: PlacementBody,
    pub venus: PlacementBody,
    pub mars: PlacementBody,
    pub jupiter: PlacementBody,
    pub saturn: PlacementBody,
    pub rahu: PlacementBody,
    pub ketu: PlacementBody,
    pub ascendant: PlacementBody,
}

impl IntoResponse for ChartError {
    fn into_response(self) -> Response {
        let status = match &self {
            ChartError::Validation(_) => StatusCode::BAD_REQUEST,
            ChartError::Adapter(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("chart assembly failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ---------------------------
// ## Handlers
// ---------------------------

#[derive(Debug)]
struct ValidatedRequest {
    moment: Moment,
    location: Location,
    date: String,
    time: String,
    timezone: f64,
}

fn validate(request: ChartRequest) -> Result<ValidatedRequest, ChartError> {
    let missing =
        |field: &str| ChartError::Validation(format!("missing required field: {}", field));

    let date = request.date.ok_or_else(|| missing("date"))?;
    let latitude = request.latitude.ok_or_else(|| missing("latitude"))?;
    let longitude = request.longitude.ok_or_else(|| missing("longitude"))?;
    let time = request.time.unwrap_or_else(|| DEFAULT_TIME.to_string());
    let timezone = request.timezone.unwrap_or(DEFAULT_TIMEZONE);

    let moment = Moment::parse(&date, &time, timezone)?;
    let location = Location::new(latitude, longitude)?;

    Ok(ValidatedRequest {
        moment,
        location,
        date,
        time,
        timezone,
    })
}

pub async fn vedic_signs(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChartRequest>,
) -> Result<Json<ChartResponse>, ChartError> {
    let valid = validate(request)?;
    let chart = state.assembler.assemble(&valid.moment, &valid.location)?;
    info!(date = %valid.date, time = %valid.time, "chart assembled");
    Ok(Json(shape_response(valid, chart)))
}

fn shape_response(valid: ValidatedRequest, chart: Chart) -> ChartResponse {
    ChartResponse {
        date: valid.date,
        time: valid.time,
        timezone: valid.timezone,
        latitude: valid.location.latitude,
        longitude: valid.location.longitude,
        sun: chart.sun.into(),
        moon: chart.moon.into(),
        mercury: chart.mercury.into(),
        venus: chart.venus.into(),
        mars: chart.mars.into(),
        jupiter: chart.jupiter.into(),
        saturn: chart.saturn.into(),
        rahu: chart.rahu.into(),
        ketu: chart.ketu.into(),
        ascendant: chart.ascendant.into(),
    }
}
