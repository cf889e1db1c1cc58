//! Conversion of a raw OpenWeather forecast into a [`WeatherSnapshot`].
//!
//! The current reading comes from the earliest sample. All samples are then
//! bucketed by the calendar date of their provider timestamp, the first
//! [`MAX_FORECAST_DAYS`] buckets are kept, and each bucket is reduced to a
//! [`ForecastDay`]. Either the whole snapshot is built or a
//! [`NormalizationError`] names the first required field that was missing.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::{
    error::NormalizationError,
    model::{
        Condition, CurrentConditions, ForecastDay, Location, MAX_FORECAST_DAYS, WeatherSnapshot,
    },
    provider::openweather::{RawCity, RawCondition, RawForecast, RawSample},
    units::{Precipitation, UnitSystem, compass_direction},
};

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Protocol-relative URL of an OpenWeather condition icon.
pub fn icon_url(icon: &str) -> String {
    format!("//openweathermap.org/img/wn/{icon}@2x.png")
}

/// One sample with its required fields resolved, still in provider units.
#[derive(Debug)]
struct Reading<'a> {
    time: NaiveDateTime,
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    feels_like: f64,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    wind_deg: Option<f64>,
    pressure: Option<f64>,
    visibility_m: Option<f64>,
    precip_mm: Option<f64>,
    condition: &'a RawCondition,
}

impl<'a> Reading<'a> {
    fn from_sample(sample: &'a RawSample) -> Result<Self, NormalizationError> {
        let time = sample_time(sample)?;

        let main = sample
            .main
            .as_ref()
            .ok_or(NormalizationError::MissingField("list[].main"))?;
        let temp = main
            .temp
            .ok_or(NormalizationError::MissingField("list[].main.temp"))?;

        let condition = sample
            .weather
            .first()
            .filter(|c| c.description.is_some())
            .ok_or(NormalizationError::MissingField("list[].weather"))?;

        let precip_mm = match (
            sample.rain.as_ref().and_then(|v| v.three_hours),
            sample.snow.as_ref().and_then(|v| v.three_hours),
        ) {
            (None, None) => None,
            (rain, snow) => Some(rain.unwrap_or(0.0) + snow.unwrap_or(0.0)),
        };

        Ok(Self {
            time,
            temp,
            temp_min: main.temp_min.unwrap_or(temp),
            temp_max: main.temp_max.unwrap_or(temp),
            feels_like: main.feels_like.unwrap_or(temp),
            humidity: main.humidity,
            wind_speed: sample.wind.as_ref().and_then(|w| w.speed),
            wind_deg: sample.wind.as_ref().and_then(|w| w.deg),
            pressure: main.pressure,
            visibility_m: sample.visibility,
            precip_mm,
            condition,
        })
    }
}

/// Provider-local timestamp of a sample: `dt_txt` when present, else `dt`
/// read as UTC.
fn sample_time(sample: &RawSample) -> Result<NaiveDateTime, NormalizationError> {
    let parsed = sample
        .dt_txt
        .as_deref()
        .and_then(|text| NaiveDateTime::parse_from_str(text, DT_TXT_FORMAT).ok());

    if let Some(time) = parsed {
        return Ok(time);
    }

    sample
        .dt
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.naive_utc())
        .ok_or(NormalizationError::MissingField("list[].dt"))
}

fn condition(raw: &RawCondition) -> Condition {
    Condition {
        text: raw.description.clone().unwrap_or_default(),
        icon_url: raw.icon.as_deref().map(icon_url).unwrap_or_default(),
        code: raw.id.unwrap_or(0),
    }
}

fn location(city: &RawCity, current_time: NaiveDateTime) -> Result<Location, NormalizationError> {
    let name = city
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or(NormalizationError::MissingField("city.name"))?;

    let coord = city
        .coord
        .as_ref()
        .ok_or(NormalizationError::MissingField("city.coord"))?;
    let latitude = coord
        .lat
        .ok_or(NormalizationError::MissingField("city.coord.lat"))?;
    let longitude = coord
        .lon
        .ok_or(NormalizationError::MissingField("city.coord.lon"))?;

    let country = city.country.clone().unwrap_or_default();

    Ok(Location {
        name: name.to_string(),
        region: country.clone(),
        country,
        latitude,
        longitude,
        local_time_iso: current_time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
    })
}

fn current_conditions(reading: &Reading<'_>, units: UnitSystem) -> CurrentConditions {
    let temp = units.temperature(reading.temp);
    let feels_like = units.temperature(reading.feels_like);
    let wind = units.wind_speed(reading.wind_speed.unwrap_or(0.0));

    CurrentConditions {
        temp_c: temp.c,
        temp_f: temp.f,
        condition: condition(reading.condition),
        humidity_pct: reading.humidity.unwrap_or(0.0),
        wind_kph: wind.kph,
        wind_mph: wind.mph,
        wind_direction: reading
            .wind_deg
            .map(|deg| compass_direction(deg).to_string())
            .unwrap_or_default(),
        pressure_mb: reading.pressure.unwrap_or(0.0),
        feels_like_c: feels_like.c,
        feels_like_f: feels_like.f,
        uv_index: 0.0,
        visibility_km: reading.visibility_m.unwrap_or(0.0) / 1000.0,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Reduce one non-empty bucket to a forecast day.
fn aggregate_day(date: NaiveDate, bucket: &[&Reading<'_>], units: UnitSystem) -> ForecastDay {
    let max_temp = bucket
        .iter()
        .map(|r| r.temp_max)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_temp = bucket
        .iter()
        .map(|r| r.temp_min)
        .fold(f64::INFINITY, f64::min);
    let avg_temp = mean(bucket.iter().map(|r| r.temp)).unwrap_or(max_temp);

    let max_wind = bucket
        .iter()
        .filter_map(|r| r.wind_speed)
        .reduce(f64::max)
        .unwrap_or(0.0);

    let avg_humidity = mean(bucket.iter().filter_map(|r| r.humidity)).unwrap_or(0.0);
    let precip = Precipitation::from_mm(bucket.iter().filter_map(|r| r.precip_mm).sum());

    // Conditions are categorical; the middle sample stands in for the day.
    let representative = bucket[bucket.len() / 2];

    let max = units.temperature(max_temp);
    let min = units.temperature(min_temp);
    let avg = units.temperature(avg_temp);
    let wind = units.wind_speed(max_wind);

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
        avg_humidity_pct: avg_humidity,
        total_precip_mm: precip.mm,
        total_precip_in: precip.inches,
        condition: condition(representative.condition),
        hours: Vec::new(),
    }
}

/// Build a snapshot from a raw forecast payload.
pub fn normalize(raw: &RawForecast) -> Result<WeatherSnapshot, NormalizationError> {
    let city = raw
        .city
        .as_ref()
        .ok_or(NormalizationError::MissingField("city"))?;

    let readings = raw
        .list
        .iter()
        .map(Reading::from_sample)
        .collect::<Result<Vec<_>, _>>()?;

    let current = readings
        .iter()
        .min_by_key(|r| r.time)
        .ok_or(NormalizationError::MissingField("list"))?;

    let location = location(city, current.time)?;

    let mut buckets: BTreeMap<NaiveDate, Vec<&Reading<'_>>> = BTreeMap::new();
    for reading in &readings {
        buckets.entry(reading.time.date()).or_default().push(reading);
    }

    let forecast_days: Vec<ForecastDay> = buckets
        .iter()
        .take(MAX_FORECAST_DAYS)
        .map(|(date, bucket)| aggregate_day(*date, bucket, raw.units))
        .collect();

    debug!(
        location = %location.name,
        samples = readings.len(),
        distinct_days = buckets.len(),
        kept_days = forecast_days.len(),
        "normalized provider forecast"
    );

    let snapshot = WeatherSnapshot {
        current: current_conditions(current, raw.units),
        location,
        forecast_days,
    };

    // Huge but parseable numbers overflow to infinity once converted.
    if !snapshot.is_well_formed() {
        return Err(NormalizationError::OutOfRange);
    }

    Ok(snapshot)
}
