/*
 * Responsibility
 * - URL structure of the API
 * - Which validator (audience) guards which routes
 * - /health stays public
 */
use axum::{Router, routing::get};

use crate::api::handlers::{
    external::{external_api, weather_forecast},
    groups::{list_group_users, list_groups},
    health::health,
};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let external = access::apply(
        Router::new().route("/api/external", get(external_api)),
        state.auth.external.clone(),
    );

    let forecast = access::apply(
        Router::new().route("/api/weatherforecast", get(weather_forecast)),
        state.auth.forecast.clone(),
    );

    let directory = access::apply(
        Router::new()
            .route("/groups", get(list_groups))
            .route("/groups/{group_id}/users", get(list_group_users)),
        state.auth.directory.clone(),
    );

    Router::new()
        .route("/health", get(health))
        .merge(external)
        .merge(forecast)
        .merge(directory)
}
