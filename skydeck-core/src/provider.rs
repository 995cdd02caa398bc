use crate::{
    Config, FetchError,
    model::{FetchRequest, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// A weather data source: resolves a free-text location into one normalized
/// snapshot. Implementations perform network I/O and must not touch any UI
/// state; they run to completion on whatever thread drives them.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, request: &FetchRequest) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the provider from config. Fails with
/// [`FetchError::Configuration`] when no API key is available, so a missing
/// credential travels the same error path as any other fetch failure.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>, FetchError> {
    let api_key = config.api_key().ok_or(FetchError::Configuration)?;
    Ok(Arc::new(OpenWeatherProvider::new(api_key)?))
}
