//! Core library for the `citycast` weather app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather forecast client and its raw payload
//! - Normalization of that payload into a stable [`WeatherSnapshot`]
//! - A mock fallback generator and the service that chains the two
//!
//! It is used by `citycast-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod mock;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod service;
pub mod units;

pub use config::{Config, FallbackConfig, OpenWeatherConfig};
pub use error::{
    LiveError, NormalizationError, NormalizationErrorKind, ProviderError, ProviderErrorKind,
    WeatherError,
};
pub use mock::MockGenerator;
pub use model::{Condition, CurrentConditions, ForecastDay, HourForecast, Location, WeatherSnapshot};
pub use normalize::normalize;
pub use provider::{ForecastProvider, RawForecast, openweather::OpenWeatherClient};
pub use service::{Source, WeatherService};
pub use units::UnitSystem;
