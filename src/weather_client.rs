//! Forecast lookups against the weatherapi.com `forecast.json` endpoint.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time;

use crate::domain::weather_report::{
    normalize_icon_url, CurrentConditions, ForecastDay, WeatherReport,
};

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
const DEFAULT_FORECAST_DAYS: u8 = 3;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Failed to reach the weather provider.")]
    Transport(#[source] reqwest::Error),
    #[error("The weather provider answered {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("The weather provider sent a payload that is not valid JSON.")]
    Malformed(#[source] serde_json::Error),
    #[error("The weather provider sent an incomplete payload: {0}")]
    Incomplete(String),
}

impl WeatherError {
    /// True for payload problems (as opposed to not getting an answer at all).
    pub fn is_schema_error(&self) -> bool {
        matches!(self, WeatherError::Malformed(_) | WeatherError::Incomplete(_))
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<WeatherReport, WeatherError>;
}

pub struct WeatherClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
    forecast_days: u8,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: ApiLocation,
    current: ApiCurrent,
    forecast: ApiForecast,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    name: String,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temp_c: f64,
    wind_kph: f64,
    humidity: f64,
    condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastDay {
    date: NaiveDate,
    day: ApiDay,
}

#[derive(Debug, Deserialize)]
struct ApiDay {
    avgtemp_c: f64,
    maxwind_kph: f64,
    avghumidity: f64,
    condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl From<ForecastResponse> for WeatherReport {
    fn from(response: ForecastResponse) -> Self {
        WeatherReport {
            location: response.location.name,
            local_time: response.location.localtime,
            current: CurrentConditions {
                temperature_c: response.current.temp_c,
                wind_kph: response.current.wind_kph,
                humidity: response.current.humidity,
                icon_url: normalize_icon_url(&response.current.condition.icon),
                condition: response.current.condition.text,
            },
            forecast: response
                .forecast
                .forecastday
                .into_iter()
                .map(|entry| ForecastDay {
                    date: entry.date,
                    icon_url: normalize_icon_url(&entry.day.condition.icon),
                    condition: entry.day.condition.text,
                    avg_temperature_c: entry.day.avgtemp_c,
                    max_wind_kph: entry.day.maxwind_kph,
                    avg_humidity: entry.day.avghumidity,
                })
                .collect(),
        }
    }
}

impl WeatherClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Option<time::Duration>,
        forecast_days: Option<u8>,
    ) -> Result<WeatherClient, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()?;

        Ok(WeatherClient {
            http_client,
            base_url,
            api_key,
            forecast_days: forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS),
        })
    }

    /// Splits "not JSON" from "JSON without the fields we need".
    fn parse_report(&self, body: &[u8]) -> Result<WeatherReport, WeatherError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(WeatherError::Malformed)?;
        let response: ForecastResponse = serde_json::from_value(value)
            .map_err(|err| WeatherError::Incomplete(err.to_string()))?;

        let days = response.forecast.forecastday.len();
        if days < usize::from(self.forecast_days) {
            return Err(WeatherError::Incomplete(format!(
                "expected {} forecast days, got {}",
                self.forecast_days, days
            )));
        }

        Ok(response.into())
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    #[tracing::instrument(name = "Fetching the weather forecast", skip(self))]
    async fn fetch(&self, location: &str) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/v1/forecast.json", self.base_url);
        let days = self.forecast_days.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("key", self.api_key.expose_secret().as_str()),
                ("q", location),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .map_err(WeatherError::Transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(WeatherError::Transport)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&body)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());

            return Err(WeatherError::Rejected { status, message });
        }

        self.parse_report(&body)
    }
}
