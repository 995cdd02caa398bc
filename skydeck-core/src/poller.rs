//! UI-thread poller/dispatcher.
//!
//! A cooperative step meant to be scheduled every [`POLL_INTERVAL`] on the
//! thread that owns the display: one non-blocking receive per invocation,
//! at most one message applied per invocation so every UI update is atomic.
//! The poller never blocks and never terminates on its own; the host keeps
//! rescheduling it for the life of the process.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};

use crate::channel::ResultReceiver;
use crate::favorites::{FAVORITES_LIMIT, FavoritesStore};
use crate::model::{WeatherSnapshot, daylight_fraction};
use crate::render::SceneSink;

use std::time::Duration;

/// How often the host should invoke [`UiPoller::poll_once`].
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Placeholder for any value the provider didn't supply.
pub const PLACEHOLDER: &str = "—";

/// Icon category for an hourly forecast card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastIcon {
    Sun,
    Rain,
    Clouds,
    Snow,
    Fog,
}

impl ForecastIcon {
    /// Substring match on the hourly condition keyword.
    pub fn for_condition(condition: &str) -> Self {
        let cond = condition.to_lowercase();
        if cond.contains("rain") {
            Self::Rain
        } else if cond.contains("cloud") {
            Self::Clouds
        } else if cond.contains("snow") {
            Self::Snow
        } else if cond.contains("fog") || cond.contains("mist") {
            Self::Fog
        } else {
            Self::Sun
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Sun => "☀️",
            Self::Rain => "🌧️",
            Self::Clouds => "☁️",
            Self::Snow => "❄️",
            Self::Fog => "🌫️",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyCard {
    /// Location-local "HH:MM".
    pub time: String,
    pub icon: ForecastIcon,
    pub temperature: String,
}

/// Everything the dashboard shows, pre-formatted. Missing source values
/// arrive here as placeholders, never as errors.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub location: String,
    pub temperature: String,
    pub feels_like: String,
    pub description: String,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
    pub visibility: String,
    pub sunrise: String,
    pub sunset: String,
    /// Fraction of the daylight window elapsed, when sunrise/sunset are known.
    pub daylight: Option<f64>,
    pub hourly: Vec<HourlyCard>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            location: PLACEHOLDER.to_string(),
            temperature: "--°C".to_string(),
            feels_like: "Feels like --°C".to_string(),
            description: PLACEHOLDER.to_string(),
            humidity: PLACEHOLDER.to_string(),
            wind: PLACEHOLDER.to_string(),
            pressure: PLACEHOLDER.to_string(),
            visibility: PLACEHOLDER.to_string(),
            sunrise: "--:--".to_string(),
            sunset: "--:--".to_string(),
            daylight: None,
            hourly: Vec::new(),
        }
    }
}

/// Application state owned by the poller: display fields, status line,
/// favorites and the search text. Mutated only on the owner thread.
#[derive(Debug)]
pub struct AppState {
    pub display: DisplayState,
    pub status: String,
    pub search: String,
    pub favorites: Vec<String>,
    pub snapshot: Option<WeatherSnapshot>,
    store: Box<dyn FavoritesStore>,
}

impl AppState {
    pub fn new(store: Box<dyn FavoritesStore>, search: String) -> Self {
        let favorites = store.load();
        Self {
            display: DisplayState::default(),
            status: "Ready".to_string(),
            search,
            favorites,
            snapshot: None,
            store,
        }
    }

    /// Save the current search text as a favorite: most-recent-first,
    /// deduplicated, capped at [`FAVORITES_LIMIT`].
    pub fn save_current_favorite(&mut self) {
        let location = self.search.trim().to_string();
        if location.is_empty() {
            self.status = "No location to save.".to_string();
            return;
        }
        if self.favorites.contains(&location) {
            self.status = format!("Already in favorites: {location}");
            return;
        }

        self.favorites.insert(0, location.clone());
        self.favorites.truncate(FAVORITES_LIMIT);
        self.store.save(&self.favorites);
        self.status = format!("Saved favorite: {location}");
    }
}

/// What one poll invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Channel was empty; reschedule and return.
    Idle,
    /// A snapshot was applied to the display.
    Applied,
    /// A message was consumed but only the status line changed.
    Failed,
}

pub struct UiPoller {
    results: ResultReceiver,
    pub app: AppState,
    scene: Box<dyn SceneSink>,
}

impl UiPoller {
    pub fn new(results: ResultReceiver, app: AppState, scene: Box<dyn SceneSink>) -> Self {
        Self { results, app, scene }
    }

    /// One cooperative step: apply at most one pending result. A second
    /// queued message waits for the next invocation.
    pub fn poll_once(&mut self) -> PollOutcome {
        let Some(result) = self.results.try_recv() else {
            return PollOutcome::Idle;
        };

        match result {
            Err(message) => {
                // Display fields keep their last-known values.
                self.app.status = message;
                PollOutcome::Failed
            }
            Ok(snapshot) => match build_display(&snapshot, Utc::now().timestamp()) {
                Ok(display) => {
                    self.scene.set_condition(&snapshot.current.condition);
                    self.app.display = display;
                    self.app.status = format!("Showing: {}", snapshot.location_name);
                    self.app.snapshot = Some(snapshot);
                    PollOutcome::Applied
                }
                Err(err) => {
                    // One bad payload must not stop future polling.
                    self.app.status = format!("UI update error: {err:#}");
                    PollOutcome::Failed
                }
            },
        }
    }
}

/// Derive every display field from a snapshot. Pure so the formatting rules
/// are testable with a pinned clock.
pub fn build_display(snapshot: &WeatherSnapshot, now: i64) -> Result<DisplayState> {
    let cur = &snapshot.current;

    let offset = i32::try_from(snapshot.utc_offset_secs)
        .ok()
        .and_then(FixedOffset::east_opt)
        .context("UTC offset out of range")?;

    let (sunrise, sunset, daylight) = match (cur.sunrise, cur.sunset) {
        (Some(rise), Some(set)) => (
            local_time(rise, offset)?,
            local_time(set, offset)?,
            Some(daylight_fraction(now, rise, set)),
        ),
        _ => ("--:--".to_string(), "--:--".to_string(), None),
    };

    let hourly = snapshot
        .hourly
        .iter()
        .map(|entry| {
            Ok(HourlyCard {
                time: local_time(entry.timestamp, offset)?,
                icon: ForecastIcon::for_condition(&entry.condition),
                temperature: entry
                    .temp_c
                    .map_or_else(|| "--°C".to_string(), |t| format!("{t:.0}°C")),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DisplayState {
        location: snapshot.location_name.clone(),
        temperature: cur.temp_c.map_or_else(|| "--°C".to_string(), |t| format!("{t:.1}°C")),
        feels_like: cur
            .feels_like_c
            .map_or_else(|| "Feels like --°C".to_string(), |t| format!("Feels like {t:.1}°C")),
        description: cur
            .description
            .as_deref()
            .map(title_case)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        humidity: cur
            .humidity_pct
            .map_or_else(|| PLACEHOLDER.to_string(), |h| format!("{h}%")),
        wind: cur
            .wind_speed_mps
            .map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{:.0} km/h", v * 3.6)),
        pressure: cur
            .pressure_hpa
            .map_or_else(|| PLACEHOLDER.to_string(), |p| format!("{p} hPa")),
        visibility: cur
            .visibility_m
            .map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{:.1} km", f64::from(v) / 1000.0)),
        sunrise,
        sunset,
        daylight,
        hourly,
    })
}

/// "HH:MM" in the location's UTC-offset-local time.
fn local_time(timestamp: i64, offset: FixedOffset) -> Result<String> {
    let utc: DateTime<Utc> =
        DateTime::from_timestamp(timestamp, 0).context("timestamp out of range")?;
    Ok(utc.with_timezone(&offset).format("%H:%M").to_string())
}

/// First letter of each word uppercased, like the provider descriptions
/// are displayed ("light rain" → "Light Rain").
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
