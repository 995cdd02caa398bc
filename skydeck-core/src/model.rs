use serde::{Deserialize, Serialize};

/// Maximum number of hourly forecast entries kept in a snapshot.
pub const HOURLY_LIMIT: usize = 12;

/// One search/refresh action. Consumed by the fetch worker.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Free-form place name, optionally "City,CountryCode".
    pub location: String,
}

impl FetchRequest {
    pub fn new(location: impl Into<String>) -> Self {
        Self { location: location.into() }
    }
}

/// What actually travels through the result channel: a snapshot, or a
/// display string describing why there isn't one.
pub type FetchResult = Result<WeatherSnapshot, String>;

/// One complete normalized weather read for a location.
///
/// Hourly entries are chronologically ordered and truncated to at most
/// [`HOURLY_LIMIT`] during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Offset of the location's local time from UTC, in seconds.
    pub utc_offset_secs: i64,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyEntry>,
}

/// Current conditions. Every numeric field may be absent; absence renders
/// as a placeholder downstream and never fails a fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub humidity_pct: Option<u8>,
    pub wind_speed_mps: Option<f64>,
    pub pressure_hpa: Option<u32>,
    pub visibility_m: Option<u32>,
    /// Sunrise/sunset as epoch seconds (UTC).
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    /// Lowercased condition keyword, e.g. "rain", "clouds". Defaults to
    /// "clear" when the provider omits it.
    pub condition: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    /// Epoch seconds (UTC).
    pub timestamp: i64,
    pub temp_c: Option<f64>,
    /// Lowercased condition keyword for icon selection.
    pub condition: String,
}

/// Fraction of the daylight window already elapsed at `now`, clamped to
/// [0, 1]. A degenerate window (sunset not after sunrise) yields 0.
pub fn daylight_fraction(now: i64, sunrise: i64, sunset: i64) -> f64 {
    let total = sunset - sunrise;
    if total <= 0 {
        return 0.0;
    }
    let elapsed = (now - sunrise).clamp(0, total);
    elapsed as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daylight_midway() {
        let fraction = daylight_fraction(1_700_017_500, 1_700_000_000, 1_700_035_000);
        assert!((fraction - 0.5).abs() < 1e-9);
    }

    #[test]
    fn daylight_clamps_to_unit_interval() {
        assert_eq!(daylight_fraction(1_699_999_000, 1_700_000_000, 1_700_035_000), 0.0);
        assert_eq!(daylight_fraction(1_700_099_000, 1_700_000_000, 1_700_035_000), 1.0);
    }

    #[test]
    fn daylight_degenerate_window_is_zero() {
        assert_eq!(daylight_fraction(1_700_000_000, 1_700_000_000, 1_700_000_000), 0.0);
        assert_eq!(daylight_fraction(1_700_000_000, 1_700_035_000, 1_700_000_000), 0.0);
    }
}
