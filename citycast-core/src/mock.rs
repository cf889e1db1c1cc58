//! Fallback snapshot generator.
//!
//! Values are random but always inside the ranges below, and the shape is
//! fixed: three consecutive days starting today, every field populated, and
//! `location.name` equal to the query.
//!
//! | field                  | range            |
//! |------------------------|------------------|
//! | current temperature    | 10..=39 °C       |
//! | feels-like             | temp ± 3 °C      |
//! | humidity               | 40..=79 %        |
//! | wind                   | 5..=24 km/h      |
//! | pressure               | 1000..=1049 mb   |
//! | UV index               | 1..=10           |
//! | visibility             | 5..=14 km        |
//! | day minimum            | 5..=19 °C        |
//! | day maximum            | min + 5..=20 °C  |
//! | day precipitation      | 0..=9 mm         |

use std::{ops::RangeInclusive, sync::Mutex, time::Duration};

use chrono::{DateTime, Days, SecondsFormat, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    model::{Condition, CurrentConditions, ForecastDay, Location, MAX_FORECAST_DAYS, WeatherSnapshot},
    units::{Precipitation, Temperature, WindSpeed},
};

const MOCK_REGION: &str = "Demo Region";
const MOCK_COUNTRY: &str = "Demo Country";
const MOCK_LATITUDE: f64 = 40.7128;
const MOCK_LONGITUDE: f64 = -74.0060;
const WIND_DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

fn weatherapi_icon(code: u16) -> String {
    format!("//cdn.weatherapi.com/weather/64x64/day/{code}.png")
}

fn current_condition() -> Condition {
    Condition {
        text: "Partly cloudy".to_string(),
        icon_url: weatherapi_icon(116),
        code: 1003,
    }
}

/// Conditions for day 0, 1 and 2 respectively.
fn day_condition(index: usize) -> Condition {
    let (text, icon, code) = match index {
        0 => ("Sunny", 113, 1000),
        1 => ("Cloudy", 119, 1006),
        _ => ("Light rain", 296, 1063),
    };

    Condition {
        text: text.to_string(),
        icon_url: weatherapi_icon(icon),
        code,
    }
}

/// Produces plausible fake snapshots after a short artificial delay.
#[derive(Debug)]
pub struct MockGenerator {
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl MockGenerator {
    pub fn new(delay: Duration) -> Self {
        Self::with_rng(delay, StdRng::from_entropy())
    }

    /// Generator with a fixed seed, for reproducible test runs.
    pub fn with_seed(delay: Duration, seed: u64) -> Self {
        Self::with_rng(delay, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(delay: Duration, rng: StdRng) -> Self {
        Self {
            delay,
            rng: Mutex::new(rng),
        }
    }

    /// Wait out the simulated latency, then build a snapshot for `query`.
    pub async fn generate(&self, query: &str) -> WeatherSnapshot {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        generate_with(query, &mut *rng, Utc::now())
    }
}

fn draw<R: Rng>(rng: &mut R, range: RangeInclusive<i32>) -> f64 {
    f64::from(rng.gen_range(range))
}

/// Build a fake snapshot from the given random source and clock.
pub fn generate_with<R: Rng>(query: &str, rng: &mut R, now: DateTime<Utc>) -> WeatherSnapshot {
    let temp = Temperature::from_celsius(draw(rng, 10..=39));
    let feels_like = Temperature::from_celsius(temp.c + draw(rng, -3..=3));
    let wind = WindSpeed::from_kph(draw(rng, 5..=24));

    let current = CurrentConditions {
        temp_c: temp.c,
        temp_f: temp.f,
        condition: current_condition(),
        humidity_pct: draw(rng, 40..=79),
        wind_kph: wind.kph,
        wind_mph: wind.mph,
        wind_direction: WIND_DIRECTIONS[rng.gen_range(0..WIND_DIRECTIONS.len())].to_string(),
        pressure_mb: draw(rng, 1000..=1049),
        feels_like_c: feels_like.c,
        feels_like_f: feels_like.f,
        uv_index: draw(rng, 1..=10),
        visibility_km: draw(rng, 5..=14),
    };

    let today = now.date_naive();
    let forecast_days = (0..MAX_FORECAST_DAYS)
        .filter_map(|index| {
            let date = today.checked_add_days(Days::new(index as u64))?;
            Some(mock_day(date, index, rng))
        })
        .collect();

    WeatherSnapshot {
        location: Location {
            name: query.to_string(),
            region: MOCK_REGION.to_string(),
            country: MOCK_COUNTRY.to_string(),
            latitude: MOCK_LATITUDE,
            longitude: MOCK_LONGITUDE,
            local_time_iso: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        current,
        forecast_days,
    }
}

fn mock_day<R: Rng>(date: chrono::NaiveDate, index: usize, rng: &mut R) -> ForecastDay {
    let min_c = draw(rng, 5..=19);
    let max_c = min_c + draw(rng, 5..=20);
    let avg_c = (min_c + max_c) / 2.0;

    let min = Temperature::from_celsius(min_c);
    let max = Temperature::from_celsius(max_c);
    let avg = Temperature::from_celsius(avg_c);
    let wind = WindSpeed::from_kph(draw(rng, 10..=34));
    let precip = Precipitation::from_mm(draw(rng, 0..=9));

    ForecastDay {
        date,
        max_temp_c: max.c,
        max_temp_f: max.f,
        min_temp_c: min.c,
        min_temp_f: min.f,
        avg_temp_c: avg.c,
        avg_temp_f: avg.f,
        max_wind_kph: wind.kph,
        max_wind_mph: wind.mph,
        avg_humidity_pct: draw(rng, 40..=79),
        total_precip_mm: precip.mm,
        total_precip_in: precip.inches,
        condition: day_condition(index),
        hours: Vec::new(),
    }
}
