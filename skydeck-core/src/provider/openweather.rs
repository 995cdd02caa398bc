use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::{
    error::FetchError,
    model::{CurrentConditions, FetchRequest, HOURLY_LIMIT, HourlyEntry, WeatherSnapshot},
};

use super::WeatherProvider;

const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const ONECALL_URL: &str = "https://api.openweathermap.org/data/2.5/onecall";

/// Per-request timeout; a hung call fails through the normal error path.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenWeather provider: a free-text lookup for coordinates and timezone,
/// then a one-call lookup by coordinates, merged into one snapshot.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { api_key, http })
    }

    async fn locate(&self, location: &str) -> Result<OwLocateResponse, FetchError> {
        self.get_json(
            WEATHER_URL,
            &[("q", location.to_string()), ("appid", self.api_key.clone())],
        )
        .await
    }

    async fn one_call(&self, lat: f64, lon: f64) -> Result<OwOneCallResponse, FetchError> {
        self.get_json(
            ONECALL_URL,
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("exclude", "minutely,alerts".to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Provider(provider_message(status, &body)));
        }

        serde_json::from_str(&body)
            .map_err(|err| FetchError::Malformed(format!("unexpected payload from {url}: {err}")))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, request: &FetchRequest) -> Result<WeatherSnapshot, FetchError> {
        let locate = self.locate(&request.location).await?;

        // Coordinates are the one hard requirement: without them the
        // detailed lookup cannot be issued.
        let (lat, lon) = locate
            .coord
            .as_ref()
            .and_then(|c| c.lat.zip(c.lon))
            .ok_or_else(|| {
                FetchError::Malformed(format!("no coordinates returned for '{}'", request.location))
            })?;

        let details = self.one_call(lat, lon).await?;

        Ok(normalize(&request.location, &locate, details))
    }
}

/// Merge both responses into one snapshot. Total: every optional field
/// degrades to `None`, hourly entries are sorted and truncated.
fn normalize(
    query: &str,
    locate: &OwLocateResponse,
    details: OwOneCallResponse,
) -> WeatherSnapshot {
    let location_name = location_name(locate).unwrap_or_else(|| query.to_string());
    let (lat, lon) = locate
        .coord
        .as_ref()
        .map_or((None, None), |c| (c.lat, c.lon));

    let current = details.current.unwrap_or_default();
    let weather = current.weather.first();

    let mut hourly: Vec<HourlyEntry> = details
        .hourly
        .into_iter()
        .filter_map(|h| {
            // Entries without a timestamp cannot be ordered or labelled.
            let timestamp = h.dt?;
            Some(HourlyEntry {
                timestamp,
                temp_c: h.temp,
                condition: condition_keyword(h.weather.first()),
            })
        })
        .collect();
    hourly.sort_by_key(|h| h.timestamp);
    hourly.truncate(HOURLY_LIMIT);

    WeatherSnapshot {
        location_name,
        lat,
        lon,
        utc_offset_secs: locate.timezone.unwrap_or(0),
        current: CurrentConditions {
            temp_c: current.temp,
            feels_like_c: current.feels_like,
            humidity_pct: current.humidity,
            wind_speed_mps: current.wind_speed,
            pressure_hpa: current.pressure,
            visibility_m: current.visibility,
            sunrise: current.sunrise,
            sunset: current.sunset,
            condition: condition_keyword(weather),
            description: weather.and_then(|w| w.description.clone()),
        },
        hourly,
    }
}

/// "City, CC" from whatever name parts the locate response carried.
fn location_name(locate: &OwLocateResponse) -> Option<String> {
    let name = locate.name.as_deref().filter(|s| !s.is_empty());
    let country = locate
        .sys
        .as_ref()
        .and_then(|s| s.country.as_deref())
        .filter(|s| !s.is_empty());

    match (name, country) {
        (Some(name), Some(country)) => Some(format!("{name}, {country}")),
        (Some(name), None) => Some(name.to_string()),
        (None, Some(country)) => Some(country.to_string()),
        (None, None) => None,
    }
}

fn condition_keyword(weather: Option<&OwWeather>) -> String {
    weather
        .and_then(|w| w.main.as_deref())
        .filter(|s| !s.is_empty())
        .map_or_else(|| "clear".to_string(), str::to_lowercase)
}

/// Prefer the provider's own `message` field; fall back to status plus a
/// truncated body.
fn provider_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct OwErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("request failed with status {status}: {}", truncate_body(body)))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwLocateResponse {
    coord: Option<OwCoord>,
    name: Option<String>,
    sys: Option<OwSys>,
    timezone: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwCurrent {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<u8>,
    wind_speed: Option<f64>,
    pressure: Option<u32>,
    visibility: Option<u32>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwHourly {
    dt: Option<i64>,
    temp: Option<f64>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwOneCallResponse {
    current: Option<OwCurrent>,
    #[serde(default)]
    hourly: Vec<OwHourly>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate_paris() -> OwLocateResponse {
        serde_json::from_str(
            r#"{
                "coord": {"lat": 48.85, "lon": 2.35},
                "name": "Paris",
                "sys": {"country": "FR"},
                "timezone": 3600
            }"#,
        )
        .expect("locate JSON")
    }

    #[test]
    fn normalize_merges_both_responses() {
        let details: OwOneCallResponse = serde_json::from_str(
            r#"{
                "current": {
                    "temp": 18.4,
                    "feels_like": 17.9,
                    "humidity": 64,
                    "wind_speed": 3.6,
                    "pressure": 1012,
                    "visibility": 10000,
                    "sunrise": 1700000000,
                    "sunset": 1700035000,
                    "weather": [{"main": "Rain", "description": "light rain"}]
                },
                "hourly": [
                    {"dt": 1700010000, "temp": 18.0, "weather": [{"main": "Rain"}]},
                    {"dt": 1700006400, "temp": 17.5, "weather": [{"main": "Clouds"}]}
                ]
            }"#,
        )
        .expect("one-call JSON");

        let snapshot = normalize("Paris,FR", &locate_paris(), details);

        assert_eq!(snapshot.location_name, "Paris, FR");
        assert_eq!(snapshot.lat, Some(48.85));
        assert_eq!(snapshot.utc_offset_secs, 3600);
        assert_eq!(snapshot.current.temp_c, Some(18.4));
        assert_eq!(snapshot.current.condition, "rain");
        assert_eq!(snapshot.current.description.as_deref(), Some("light rain"));

        // Chronological, regardless of provider order.
        assert_eq!(snapshot.hourly[0].timestamp, 1_700_006_400);
        assert_eq!(snapshot.hourly[0].condition, "clouds");
        assert_eq!(snapshot.hourly[1].condition, "rain");
    }

    #[test]
    fn normalize_tolerates_sparse_payload() {
        let locate: OwLocateResponse =
            serde_json::from_str(r#"{"coord": {"lat": 1.0, "lon": 2.0}}"#).expect("locate JSON");
        let details: OwOneCallResponse = serde_json::from_str("{}").expect("one-call JSON");

        let snapshot = normalize("Nowhere", &locate, details);

        assert_eq!(snapshot.location_name, "Nowhere");
        assert_eq!(snapshot.utc_offset_secs, 0);
        assert_eq!(snapshot.current.temp_c, None);
        assert_eq!(snapshot.current.condition, "clear");
        assert!(snapshot.hourly.is_empty());
    }

    #[test]
    fn normalize_truncates_hourly_to_limit() {
        let hourly: Vec<String> = (0..20)
            .map(|i| format!(r#"{{"dt": {}, "temp": 10.0}}"#, 1_700_000_000 + i * 3600))
            .collect();
        let details: OwOneCallResponse =
            serde_json::from_str(&format!(r#"{{"hourly": [{}]}}"#, hourly.join(",")))
                .expect("one-call JSON");

        let snapshot = normalize("Paris,FR", &locate_paris(), details);

        assert_eq!(snapshot.hourly.len(), HOURLY_LIMIT);
        assert!(snapshot.hourly.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn hourly_entries_without_timestamp_are_dropped() {
        let details: OwOneCallResponse = serde_json::from_str(
            r#"{"hourly": [{"temp": 9.0}, {"dt": 1700000000, "temp": 10.0}]}"#,
        )
        .expect("one-call JSON");

        let snapshot = normalize("Paris,FR", &locate_paris(), details);
        assert_eq!(snapshot.hourly.len(), 1);
    }

    #[test]
    fn provider_message_prefers_body_message() {
        let msg = provider_message(StatusCode::NOT_FOUND, r#"{"cod":"404","message":"city not found"}"#);
        assert_eq!(msg, "city not found");
    }

    #[test]
    fn provider_message_falls_back_to_truncated_body() {
        let msg = provider_message(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert!(msg.contains("502"));
        assert!(msg.contains("upstream exploded"));

        let long = "x".repeat(500);
        let msg = provider_message(StatusCode::BAD_GATEWAY, &long);
        assert!(msg.ends_with("..."));
    }
}
