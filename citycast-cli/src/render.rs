use citycast_core::WeatherSnapshot;

use crate::cli::DisplayUnit;

fn temp(c: f64, f: f64, unit: DisplayUnit) -> String {
    match unit {
        DisplayUnit::C => format!("{c:.0}°C"),
        DisplayUnit::F => format!("{f:.0}°F"),
    }
}

/// Plain-text card for one snapshot. Rounding happens here and only here.
pub fn card(snapshot: &WeatherSnapshot, unit: DisplayUnit) -> String {
    let loc = &snapshot.location;
    let cur = &snapshot.current;
    let mut lines = Vec::with_capacity(3 + snapshot.forecast_days.len());

    let place = if loc.country.is_empty() {
        loc.name.clone()
    } else {
        format!("{}, {}", loc.name, loc.country)
    };
    lines.push(format!("{place}  ({:.2}, {:.2})", loc.latitude, loc.longitude));
    lines.push(format!(
        "  {}  {}  feels like {}",
        temp(cur.temp_c, cur.temp_f, unit),
        cur.condition.text,
        temp(cur.feels_like_c, cur.feels_like_f, unit),
    ));

    let wind = match unit {
        DisplayUnit::C => format!("{:.0} km/h", cur.wind_kph),
        DisplayUnit::F => format!("{:.0} mph", cur.wind_mph),
    };
    let wind = if cur.wind_direction.is_empty() {
        wind
    } else {
        format!("{wind} {}", cur.wind_direction)
    };
    lines.push(format!(
        "  humidity {:.0}%  wind {wind}  pressure {:.0} mb  visibility {:.0} km",
        cur.humidity_pct, cur.pressure_mb, cur.visibility_km,
    ));

    for day in &snapshot.forecast_days {
        let precip = match unit {
            DisplayUnit::C => format!("{:.1} mm", day.total_precip_mm),
            DisplayUnit::F => format!("{:.2} in", day.total_precip_in),
        };
        lines.push(format!(
            "  {}  {:>5} / {:<5}  {:<20} {precip}",
            day.date.format("%a %d %b"),
            temp(day.max_temp_c, day.max_temp_f, unit),
            temp(day.min_temp_c, day.min_temp_f, unit),
            day.condition.text,
        ));
    }

    lines.push(String::new());
    lines.join("\n")
}
