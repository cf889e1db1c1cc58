//! Integration tests for the OpenWeather client and the full search path,
//! run against a wiremock server.

use std::{sync::Arc, time::Duration};

use citycast_core::{
    ForecastProvider, MockGenerator, OpenWeatherClient, ProviderErrorKind, Source, UnitSystem,
    WeatherService,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_body() -> serde_json::Value {
    let sample = |dt_txt: &str, temp: f64| {
        serde_json::json!({
            "dt_txt": dt_txt,
            "main": { "temp": temp, "feels_like": temp, "temp_min": temp, "temp_max": temp, "pressure": 1008, "humidity": 71 },
            "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
            "wind": { "speed": 4.1, "deg": 250 },
            "visibility": 10000
        })
    };

    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": 5,
        "list": [
            sample("2024-05-10 12:00:00", 295.15),
            sample("2024-05-10 15:00:00", 297.15),
            sample("2024-05-11 12:00:00", 293.15),
            sample("2024-05-12 12:00:00", 291.15),
            sample("2024-05-13 12:00:00", 290.15)
        ],
        "city": {
            "id": 2643743,
            "name": "London",
            "coord": { "lat": 51.5085, "lon": -0.1257 },
            "country": "GB"
        }
    })
}

fn client(server: &MockServer, timeout: Duration) -> OpenWeatherClient {
    OpenWeatherClient::new(
        "TEST_KEY".to_string(),
        format!("{}/data/2.5", server.uri()),
        UnitSystem::Standard,
        timeout,
    )
    .unwrap()
}

fn service(server: &MockServer) -> WeatherService {
    WeatherService::new(
        Arc::new(client(server, Duration::from_secs(5))),
        MockGenerator::with_seed(Duration::ZERO, 5),
    )
}

#[tokio::test]
async fn test_fetch_sends_query_credentials_and_units() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "standard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let raw = client(&mock_server, Duration::from_secs(5))
        .fetch("London")
        .await
        .unwrap();

    assert_eq!(raw.list.len(), 5);
    assert_eq!(raw.units, UnitSystem::Standard);
}

#[tokio::test]
async fn test_get_weather_normalizes_live_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock_server)
        .await;

    let (snapshot, source) = service(&mock_server)
        .get_weather_with_source("London")
        .await
        .unwrap();

    assert_eq!(source, Source::Live);
    assert_eq!(snapshot.location.name, "London");
    assert_eq!(snapshot.location.country, "GB");
    assert!((snapshot.current.temp_c - 22.0).abs() < 1e-6);
    assert!((snapshot.current.temp_f - 71.6).abs() < 1e-6);
    assert_eq!(snapshot.current.wind_direction, "WSW");

    let dates: Vec<String> = snapshot
        .forecast_days
        .iter()
        .map(|d| d.date.to_string())
        .collect();
    assert_eq!(dates, ["2024-05-10", "2024-05-11", "2024-05-12"]);

    let first = &snapshot.forecast_days[0];
    assert!((first.max_temp_c - 24.0).abs() < 1e-6);
    assert!((first.min_temp_c - 22.0).abs() < 1e-6);
    assert_eq!(first.condition.icon_url, "//openweathermap.org/img/wn/04d@2x.png");
}

#[tokio::test]
async fn test_not_found_status_maps_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server, Duration::from_secs(5))
        .fetch("Nowhereville")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ProviderErrorKind::NotFound);
    assert!(err.to_string().contains("city not found"));
}

#[tokio::test]
async fn test_server_error_maps_to_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server, Duration::from_secs(5))
        .fetch("London")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ProviderErrorKind::Network);
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_unexpected_body_maps_to_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server, Duration::from_secs(5))
        .fetch("London")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ProviderErrorKind::Malformed);
}

#[tokio::test]
async fn test_slow_response_maps_to_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let err = client(&mock_server, Duration::from_millis(200))
        .fetch("London")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ProviderErrorKind::Timeout);
}

#[tokio::test]
async fn test_missing_city_block_falls_back_to_mock() {
    let mock_server = MockServer::start().await;

    let mut body = forecast_body();
    body.as_object_mut().unwrap().remove("city");

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (snapshot, source) = service(&mock_server)
        .get_weather_with_source("London")
        .await
        .unwrap();

    assert_eq!(source, Source::Fallback);
    assert_eq!(snapshot.location.name, "London");
    assert_eq!(snapshot.forecast_days.len(), 3);
}

#[tokio::test]
async fn test_provider_outage_falls_back_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let snapshot = service(&mock_server).get_weather("Paris").await.unwrap();

    assert_eq!(snapshot.location.name, "Paris");
    assert!(snapshot.is_well_formed());
}
