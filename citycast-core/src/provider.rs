use crate::{Config, error::ProviderError, provider::openweather::OpenWeatherClient};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::RawForecast;

/// A source of raw forecast payloads.
///
/// Implementations perform exactly one outbound request per call and never
/// retry; retry policy belongs to the caller.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch(&self, query: &str) -> Result<RawForecast, ProviderError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `citycast configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let client = OpenWeatherClient::from_config(api_key.to_owned(), &config.openweather)?;
    Ok(Box::new(client))
}
