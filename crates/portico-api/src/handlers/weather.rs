//! Sample forecast controller.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

const SUMMARIES: [&str; 10] = [
    "Freezing",
    "Bracing",
    "Chilly",
    "Cool",
    "Mild",
    "Warm",
    "Balmy",
    "Hot",
    "Sweltering",
    "Scorching",
];

const DEFAULT_FORECAST_DAYS: u64 = 5;
const MAX_FORECAST_DAYS: u64 = 14;

/// One day of the sample forecast payload.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct WeatherForecast {
    /// Forecast date.
    pub(crate) date: NaiveDate,
    /// Temperature in degrees Celsius.
    pub(crate) temperature_c: i32,
    /// Temperature in degrees Fahrenheit derived from the Celsius value.
    pub(crate) temperature_f: i32,
    /// One-word description of the day.
    pub(crate) summary: &'static str,
}

impl WeatherForecast {
    fn sample(date: NaiveDate, rng: &mut impl Rng) -> Self {
        let temperature_c = rng.random_range(-20..=55);
        Self {
            date,
            temperature_c,
            temperature_f: fahrenheit_from(temperature_c),
            summary: SUMMARIES[rng.random_range(0..SUMMARIES.len())],
        }
    }
}

/// Query knobs accepted by the forecast listing.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ForecastQuery {
    /// Number of days to forecast; clamped to a two-week horizon.
    #[serde(default)]
    pub(crate) days: Option<u64>,
}

/// List a randomised multi-day forecast starting today.
#[utoipa::path(
    get,
    path = "/api/weather",
    tag = "weather",
    params(
        ("days" = Option<u64>, Query, description = "Number of days to forecast (1-14, default 5)"),
    ),
    responses(
        (status = 200, description = "Forecast for the requested horizon", body = [WeatherForecast]),
        (status = 500, description = "Rendering failed", body = crate::error::ErrorBody),
    )
)]
pub(crate) async fn list_forecasts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<Value>, ApiError> {
    let days = query
        .days
        .unwrap_or(DEFAULT_FORECAST_DAYS)
        .clamp(1, MAX_FORECAST_DAYS);
    let today = Utc::now().date_naive();
    let mut rng = rand::rng();

    let forecasts: Vec<WeatherForecast> = (0..days)
        .map(|offset| {
            let date = today
                .checked_add_days(Days::new(offset))
                .unwrap_or(today);
            WeatherForecast::sample(date, &mut rng)
        })
        .collect();

    let body = state.json.render(&forecasts).map_err(|err| {
        error!(error = %err, "failed to render forecast payload");
        ApiError::internal("failed to render forecast payload")
    })?;
    Ok(Json(body))
}

const fn fahrenheit_from(celsius: i32) -> i32 {
    32 + (celsius * 9) / 5
}
