//! Search orchestration: live provider first, mock fallback second.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    Config,
    error::{LiveError, WeatherError},
    mock::MockGenerator,
    model::WeatherSnapshot,
    normalize::normalize,
    provider::{ForecastProvider, provider_from_config},
};

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Live,
    Fallback,
}

/// Entry point used by the presentation layer.
///
/// Holds no per-search state, so concurrent searches are independent and a
/// single service can be shared behind an `Arc`.
#[derive(Debug)]
pub struct WeatherService {
    provider: Option<Arc<dyn ForecastProvider>>,
    fallback: MockGenerator,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn ForecastProvider>, fallback: MockGenerator) -> Self {
        Self {
            provider: Some(provider),
            fallback,
        }
    }

    /// Service that never touches the network.
    pub fn offline(fallback: MockGenerator) -> Self {
        Self {
            provider: None,
            fallback,
        }
    }

    /// Build the service from config. Without an API key every search is
    /// answered by the fallback generator.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fallback = MockGenerator::new(config.fallback.delay());

        if !config.is_provider_configured() {
            info!("no OpenWeather API key configured; serving fallback data only");
            return Ok(Self::offline(fallback));
        }

        let provider: Arc<dyn ForecastProvider> = provider_from_config(config)?.into();
        Ok(Self::new(provider, fallback))
    }

    pub fn is_offline(&self) -> bool {
        self.provider.is_none()
    }

    /// Fetch and normalize in one step, surfacing whichever stage failed.
    pub async fn fetch_live(&self, query: &str) -> Result<WeatherSnapshot, LiveError> {
        let provider = self.provider.as_ref().ok_or(LiveError::NotConfigured)?;
        let raw = provider.fetch(query).await?;
        Ok(normalize(&raw)?)
    }

    /// Weather for `query`, falling back to generated data on any live
    /// failure. Errors only when the query is blank or the fallback breaks
    /// its own contract.
    pub async fn get_weather(&self, query: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.get_weather_with_source(query)
            .await
            .map(|(snapshot, _)| snapshot)
    }

    pub async fn get_weather_with_source(
        &self,
        query: &str,
    ) -> Result<(WeatherSnapshot, Source), WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }

        match self.fetch_live(query).await {
            Ok(snapshot) => return Ok((snapshot, Source::Live)),
            Err(LiveError::NotConfigured) => {}
            Err(err) => log_live_failure(query, &err),
        }

        let snapshot = self.fallback.generate(query).await;
        if !snapshot.is_well_formed() {
            warn!(query, "fallback generator produced an invalid snapshot");
            return Err(WeatherError::Unavailable);
        }

        Ok((snapshot, Source::Fallback))
    }
}

fn log_live_failure(query: &str, err: &LiveError) {
    match err {
        LiveError::Provider(e) => {
            warn!(query, kind = ?e.kind(), error = %e, "provider request failed; using fallback data")
        }
        LiveError::Normalization(e) => {
            warn!(query, kind = ?e.kind(), error = %e, "provider payload unusable; using fallback data")
        }
        LiveError::NotConfigured => {}
    }
}
