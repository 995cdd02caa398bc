//! Core library for the `skydeck` weather dashboard.
//!
//! This crate implements the fetch-and-render pipeline:
//! - Background fetch workers driving the weather provider off the UI thread
//! - The result channel carrying outcomes back to the UI-thread poller
//! - The poller/dispatcher that applies results to display state
//! - The animated condition renderer and its canvas abstraction
//! - Configuration, credentials and favorites persistence
//!
//! It is used by `skydeck-cli`, but can also be embedded by any host that
//! supplies its own [`render::Canvas`] and drives [`poller::UiPoller`].

pub mod channel;
pub mod config;
pub mod error;
pub mod favorites;
pub mod model;
pub mod poller;
pub mod provider;
pub mod render;
pub mod worker;

pub use channel::{ResultReceiver, ResultSender, result_channel};
pub use config::Config;
pub use error::FetchError;
pub use favorites::{FavoritesStore, JsonFavoritesStore};
pub use model::{FetchRequest, FetchResult, WeatherSnapshot};
pub use poller::{AppState, DisplayState, PollOutcome, UiPoller};
pub use provider::{WeatherProvider, provider_from_config};
pub use render::{Canvas, ConditionRenderer, Scene, SceneSink, scene_for};
pub use worker::spawn_fetch;
