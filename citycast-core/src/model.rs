use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One fully-populated weather result for one location.
///
/// Built fresh per search and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
    pub forecast_days: Vec<ForecastDay>,
}

/// Identity of the queried place. `name` is the key used to de-duplicate
/// displayed cities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub local_time_iso: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Protocol-relative icon URL.
    pub icon_url: String,
    pub code: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    pub humidity_pct: f64,
    pub wind_kph: f64,
    pub wind_mph: f64,
    pub wind_direction: String,
    pub pressure_mb: f64,
    pub feels_like_c: f64,
    pub feels_like_f: f64,
    pub uv_index: f64,
    pub visibility_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    pub max_temp_f: f64,
    pub min_temp_c: f64,
    pub min_temp_f: f64,
    pub avg_temp_c: f64,
    pub avg_temp_f: f64,
    pub max_wind_kph: f64,
    pub max_wind_mph: f64,
    /// Mean of per-sample humidity, unrounded.
    pub avg_humidity_pct: f64,
    pub total_precip_mm: f64,
    pub total_precip_in: f64,
    /// Representative condition for the whole day.
    pub condition: Condition,
    #[serde(default)]
    pub hours: Vec<HourForecast>,
}

/// Hourly breakdown entry. The OpenWeather mapping and the fallback both
/// leave `ForecastDay::hours` empty; the type keeps the field's shape stable
/// for front ends that read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourForecast {
    pub time_iso: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
}

/// Upper bound on `forecast_days` in any snapshot.
pub const MAX_FORECAST_DAYS: usize = 3;

const TEMPERATURE_TOLERANCE: f64 = 1e-6;

impl WeatherSnapshot {
    /// Check the structural guarantees every snapshot handed to a caller must
    /// satisfy: 1..=3 days, strictly increasing dates, finite numbers and
    /// consistent °C/°F pairs.
    pub fn is_well_formed(&self) -> bool {
        let days = &self.forecast_days;

        if days.is_empty() || days.len() > MAX_FORECAST_DAYS {
            return false;
        }

        if !days.windows(2).all(|pair| pair[0].date < pair[1].date) {
            return false;
        }

        let c = &self.current;
        let mut pairs = vec![(c.temp_c, c.temp_f), (c.feels_like_c, c.feels_like_f)];
        for day in days {
            pairs.push((day.max_temp_c, day.max_temp_f));
            pairs.push((day.min_temp_c, day.min_temp_f));
            pairs.push((day.avg_temp_c, day.avg_temp_f));
        }

        let temps_ok = pairs.iter().all(|&(c, f)| {
            c.is_finite() && f.is_finite() && (c * 9.0 / 5.0 + 32.0 - f).abs() < TEMPERATURE_TOLERANCE
        });

        let others_ok = [
            c.humidity_pct,
            c.wind_kph,
            c.wind_mph,
            c.pressure_mb,
            c.uv_index,
            c.visibility_km,
        ]
        .iter()
        .chain(days.iter().flat_map(|d| {
            [
                &d.max_wind_kph,
                &d.max_wind_mph,
                &d.avg_humidity_pct,
                &d.total_precip_mm,
                &d.total_precip_in,
            ]
        }))
        .all(|v| v.is_finite());

        temps_ok && others_ok && !self.location.name.is_empty()
    }
}
