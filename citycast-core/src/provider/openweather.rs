//! OpenWeather 5-day / 3-hour forecast client and its raw payload types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{config::OpenWeatherConfig, error::ProviderError, units::UnitSystem};

use super::ForecastProvider;

/// Raw `/forecast` response, kept as close to the wire as possible.
///
/// Nearly everything is optional here; deciding what is required is the
/// normalizer's job, so a missing `city` block is a normalization failure
/// rather than a malformed response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawForecast {
    pub list: Vec<RawSample>,
    #[serde(default)]
    pub city: Option<RawCity>,
    /// Unit system the request asked for; not part of the body.
    #[serde(skip)]
    pub units: UnitSystem,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawSample {
    /// Unix timestamp (seconds, UTC).
    pub dt: Option<i64>,
    /// Provider-formatted timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub dt_txt: Option<String>,
    pub main: Option<RawMain>,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    pub wind: Option<RawWind>,
    /// Meters.
    pub visibility: Option<f64>,
    pub rain: Option<RawVolume>,
    pub snow: Option<RawVolume>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawCondition {
    pub id: Option<i64>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawWind {
    pub speed: Option<f64>,
    pub deg: Option<f64>,
}

/// Precipitation volume over the sample window, in millimetres.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawVolume {
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawCity {
    pub name: Option<String>,
    pub country: Option<String>,
    pub coord: Option<RawCoord>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawCoord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    units: UnitSystem,
    timeout: Duration,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(
        api_key: String,
        base_url: impl Into<String>,
        units: UnitSystem,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::Network(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            api_key,
            base_url: base_url.into(),
            units,
            timeout,
            http,
        })
    }

    pub fn from_config(api_key: String, config: &OpenWeatherConfig) -> Result<Self, ProviderError> {
        Self::new(api_key, config.base_url.clone(), config.units, config.timeout())
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast", self.base_url.trim_end_matches('/'))
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherClient {
    async fn fetch(&self, query: &str) -> Result<RawForecast, ProviderError> {
        debug!(query, units = %self.units, "requesting OpenWeather forecast");

        let res = self
            .http
            .get(self.forecast_url())
            .query(&[
                ("q", query),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = res.status();
        let body = res.text().await.map_err(|err| self.transport_error(err))?;

        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(format!(
                "{query}: {}",
                truncate_body(&body)
            )));
        }

        if !status.is_success() {
            return Err(ProviderError::Network(format!(
                "OpenWeather forecast request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let raw = parse_forecast(&body, self.units)?;
        debug!(query, samples = raw.list.len(), "OpenWeather forecast received");
        Ok(raw)
    }
}

/// Decode a forecast body. OpenWeather repeats the HTTP status in a `cod`
/// field (string or number), which is honoured even on a 200 response.
pub fn parse_forecast(body: &str, units: UnitSystem) -> Result<RawForecast, ProviderError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| ProviderError::Malformed(format!("invalid JSON: {err}")))?;

    if let Some(code) = value.get("cod").and_then(response_code) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message")
            .to_string();

        match code {
            200 => {}
            404 => return Err(ProviderError::NotFound(message)),
            other => {
                return Err(ProviderError::Network(format!(
                    "OpenWeather reported error code {other}: {message}"
                )));
            }
        }
    }

    let mut raw: RawForecast = serde_json::from_value(value)
        .map_err(|err| ProviderError::Malformed(err.to_string()))?;
    raw.units = units;

    Ok(raw)
}

fn response_code(value: &Value) -> Option<u16> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        _ => None,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;

    #[test]
    fn parses_minimal_forecast() {
        let body = r#"{
            "cod": "200",
            "message": 0,
            "list": [
                {
                    "dt": 1700000000,
                    "dt_txt": "2023-11-14 22:13:20",
                    "main": { "temp": 280.0, "humidity": 70 },
                    "weather": [{ "id": 800, "description": "clear sky", "icon": "01n" }],
                    "wind": { "speed": 3.5, "deg": 180 },
                    "rain": { "3h": 0.4 }
                }
            ],
            "city": { "name": "Oslo", "country": "NO", "coord": { "lat": 59.91, "lon": 10.75 } }
        }"#;

        let raw = parse_forecast(body, UnitSystem::Standard).expect("must parse");

        assert_eq!(raw.list.len(), 1);
        let sample = &raw.list[0];
        assert_eq!(sample.dt, Some(1_700_000_000));
        assert_eq!(sample.main.as_ref().and_then(|m| m.temp), Some(280.0));
        assert_eq!(sample.rain.as_ref().and_then(|r| r.three_hours), Some(0.4));
        assert_eq!(raw.city.as_ref().and_then(|c| c.name.as_deref()), Some("Oslo"));
        assert_eq!(raw.units, UnitSystem::Standard);
    }

    #[test]
    fn records_requested_units() {
        let raw = parse_forecast(r#"{"list": []}"#, UnitSystem::Imperial).expect("must parse");
        assert_eq!(raw.units, UnitSystem::Imperial);
    }

    #[test]
    fn missing_city_is_not_a_parse_error() {
        let raw = parse_forecast(r#"{"list": []}"#, UnitSystem::Standard).expect("must parse");
        assert!(raw.city.is_none());
    }

    #[test]
    fn cod_404_maps_to_not_found() {
        let err = parse_forecast(r#"{"cod":"404","message":"city not found"}"#, UnitSystem::Standard)
            .unwrap_err();

        assert_eq!(err.kind(), ProviderErrorKind::NotFound);
        assert!(err.to_string().contains("city not found"));
    }

    #[test]
    fn numeric_cod_error_maps_to_network() {
        let err = parse_forecast(r#"{"cod":401,"message":"Invalid API key"}"#, UnitSystem::Standard)
            .unwrap_err();

        assert_eq!(err.kind(), ProviderErrorKind::Network);
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_forecast("<html>oops</html>", UnitSystem::Standard).unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Malformed);
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = parse_forecast(r#"{"list": {"not": "an array"}}"#, UnitSystem::Standard)
            .unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Malformed);

        let err = parse_forecast(r#"{"cod": "200"}"#, UnitSystem::Standard).unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Malformed);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }

    #[test]
    fn forecast_url_tolerates_trailing_slash() {
        let client = OpenWeatherClient::new(
            "KEY".into(),
            "http://localhost:1234/data/2.5/",
            UnitSystem::Standard,
            Duration::from_secs(1),
        )
        .expect("client");

        assert_eq!(client.forecast_url(), "http://localhost:1234/data/2.5/forecast");
    }
}
