use serde::Serialize;

pub const EXTERNAL_API_MESSAGE: &str = "Your access token was successfully validated!";
pub const WEATHER_FORECAST_MESSAGE: &str =
    "You got access to 'WeatherForecast' API. Your access token was successfully validated!";

/// `{"msg": "..."}` body returned by the demo endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}
