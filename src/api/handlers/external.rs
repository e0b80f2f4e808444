/*
 * Responsibility
 * - GET /api/external, GET /api/weatherforecast
 * - Reaching the handler means the token passed the route's validator
 */
use axum::Json;

use crate::api::dto::messages::{EXTERNAL_API_MESSAGE, MessageResponse, WEATHER_FORECAST_MESSAGE};
use crate::api::extractors::AuthCtxExtractor;

pub async fn external_api(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MessageResponse> {
    tracing::debug!(subject = ?ctx.subject, "external api call");
    Json(MessageResponse {
        msg: EXTERNAL_API_MESSAGE,
    })
}

pub async fn weather_forecast(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MessageResponse> {
    tracing::debug!(subject = ?ctx.subject, "weather forecast call");
    Json(MessageResponse {
        msg: WEATHER_FORECAST_MESSAGE,
    })
}
