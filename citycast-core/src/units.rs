//! Unit conversion helpers.
//!
//! Every paired value (°C/°F, km/h/mph, mm/in) is derived from a single
//! canonical number so the two halves never disagree.

use serde::{Deserialize, Serialize};

const KELVIN_OFFSET: f64 = 273.15;
const MPS_TO_KPH: f64 = 3.6;
const MPS_TO_MPH: f64 = 2.23694;
const KM_PER_MILE: f64 = 1.609344;
const MM_PER_INCH: f64 = 25.4;

/// Measurement system the provider reports values in.
///
/// Mirrors OpenWeather's `units` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Kelvin and meters/second.
    #[default]
    Standard,
    /// Celsius and meters/second.
    Metric,
    /// Fahrenheit and miles/hour.
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Standard => "standard",
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Convert a provider temperature to Celsius.
    pub fn temperature_to_celsius(&self, value: f64) -> f64 {
        match self {
            UnitSystem::Standard => kelvin_to_c(value),
            UnitSystem::Metric => value,
            UnitSystem::Imperial => (value - 32.0) * 5.0 / 9.0,
        }
    }

    pub fn temperature(&self, value: f64) -> Temperature {
        Temperature::from_celsius(self.temperature_to_celsius(value))
    }

    pub fn wind_speed(&self, value: f64) -> WindSpeed {
        match self {
            UnitSystem::Standard | UnitSystem::Metric => WindSpeed::from_mps(value),
            UnitSystem::Imperial => WindSpeed::from_mph(value),
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub c: f64,
    pub f: f64,
}

impl Temperature {
    pub fn from_celsius(c: f64) -> Self {
        Self { c, f: c_to_f(c) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSpeed {
    pub kph: f64,
    pub mph: f64,
}

impl WindSpeed {
    pub fn from_mps(mps: f64) -> Self {
        Self {
            kph: mps * MPS_TO_KPH,
            mph: mps * MPS_TO_MPH,
        }
    }

    pub fn from_mph(mph: f64) -> Self {
        Self {
            kph: mph * KM_PER_MILE,
            mph,
        }
    }

    pub fn from_kph(kph: f64) -> Self {
        Self {
            kph,
            mph: kph / KM_PER_MILE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Precipitation {
    pub mm: f64,
    pub inches: f64,
}

impl Precipitation {
    pub fn from_mm(mm: f64) -> Self {
        Self {
            mm,
            inches: mm / MM_PER_INCH,
        }
    }
}

pub fn kelvin_to_c(k: f64) -> f64 {
    k - KELVIN_OFFSET
}

pub fn c_to_f(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// 16-point compass label for a meteorological wind bearing in degrees.
pub fn compass_direction(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % POINTS.len();
    POINTS[index]
}
