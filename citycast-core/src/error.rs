use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    Network,
    Timeout,
    NotFound,
    Malformed,
}

/// Failure of the single outbound provider request.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider request timed out after {0:?}")]
    Timeout(Duration),

    #[error("location not found: {0}")]
    NotFound(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            ProviderError::Network(_) => ProviderErrorKind::Network,
            ProviderError::Timeout(_) => ProviderErrorKind::Timeout,
            ProviderError::NotFound(_) => ProviderErrorKind::NotFound,
            ProviderError::Malformed(_) => ProviderErrorKind::Malformed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizationErrorKind {
    MissingField,
    OutOfRange,
}

/// The raw payload lacks something a snapshot cannot be built without, or
/// its values do not survive conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("missing required field `{0}` in provider payload")]
    MissingField(&'static str),

    #[error("provider payload has values outside the representable range")]
    OutOfRange,
}

impl NormalizationError {
    pub fn kind(&self) -> NormalizationErrorKind {
        match self {
            NormalizationError::MissingField(_) => NormalizationErrorKind::MissingField,
            NormalizationError::OutOfRange => NormalizationErrorKind::OutOfRange,
        }
    }
}

/// Why the live stage (fetch + normalize) did not produce a snapshot.
#[derive(Debug, Error)]
pub enum LiveError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error("no provider credential configured")]
    NotConfigured,
}

/// The only error a caller of `WeatherService::get_weather` can observe.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("unable to fetch weather data")]
    Unavailable,

    #[error("location query must not be empty")]
    EmptyQuery,
}
