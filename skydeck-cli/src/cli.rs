use anyhow::{Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::debug;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use skydeck_core::poller::POLL_INTERVAL;
use skydeck_core::render::draw_frame;
use skydeck_core::{
    AppState, Config, ConditionRenderer, FavoritesStore, FetchRequest, JsonFavoritesStore,
    PollOutcome, SceneSink, UiPoller, provider_from_config, result_channel, spawn_fetch,
};

use crate::canvas::TextCanvas;

const FRAME_COLS: usize = 64;
const FRAME_ROWS: usize = 18;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skydeck", version, about = "Animated terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default location.
    Configure,

    /// Fetch and print the dashboard for a location once.
    Show {
        /// Location name, e.g. "Paris,FR". Defaults to the configured one.
        location: Option<String>,

        /// Also save the location to favorites.
        #[arg(long)]
        save: bool,
    },

    /// Keep the dashboard on screen, animating and refreshing.
    Watch {
        /// Location name, e.g. "Paris,FR". Defaults to the configured one.
        location: Option<String>,

        /// Seconds between refresh fetches.
        #[arg(long, default_value_t = 600)]
        refresh: u64,
    },

    /// List saved favorite locations.
    Favorites,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, save } => show(location, save),
            Command::Watch { location, refresh } => watch(location, refresh),
            Command::Favorites => list_favorites(),
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:").prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let location = inquire::Text::new("Default location:")
        .with_initial_value(&config.default_location)
        .prompt()?;
    if !location.trim().is_empty() {
        config.default_location = location.trim().to_string();
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Last condition the poller routed, for one-shot frame rendering.
#[derive(Clone, Default)]
struct ConditionCell(Arc<Mutex<String>>);

impl ConditionCell {
    fn current(&self) -> String {
        self.0
            .lock()
            .map(|cond| if cond.is_empty() { "clear".to_string() } else { cond.clone() })
            .unwrap_or_else(|_| "clear".to_string())
    }
}

impl SceneSink for ConditionCell {
    fn set_condition(&mut self, condition: &str) {
        if let Ok(mut current) = self.0.lock() {
            *current = condition.to_string();
        }
    }
}

fn show(location: Option<String>, save: bool) -> Result<()> {
    let config = Config::load()?;
    let provider = match provider_from_config(&config) {
        Ok(provider) => provider,
        Err(err) => bail!("{}", err.display_message()),
    };

    let location = location.unwrap_or_else(|| config.default_location.clone());
    let store = JsonFavoritesStore::at_default_path()?;
    let app = AppState::new(Box::new(store), location.clone());

    let (tx, rx) = result_channel();
    let cell = ConditionCell::default();
    let mut poller = UiPoller::new(rx, app, Box::new(cell.clone()));
    poller.app.status = format!("Searching: {location} ...");

    spawn_fetch(provider, FetchRequest::new(location), tx);
    loop {
        match poller.poll_once() {
            PollOutcome::Idle => thread::sleep(POLL_INTERVAL),
            _ => break,
        }
    }

    if save {
        poller.app.save_current_favorite();
    }

    print_dashboard(&poller.app, &scene_frame(&cell.current()));
    Ok(())
}

fn watch(location: Option<String>, refresh_secs: u64) -> Result<()> {
    let config = Config::load()?;
    let provider = match provider_from_config(&config) {
        Ok(provider) => provider,
        Err(err) => bail!("{}", err.display_message()),
    };

    let location = location.unwrap_or_else(|| config.default_location.clone());
    let store = JsonFavoritesStore::at_default_path()?;
    let app = AppState::new(Box::new(store), location.clone());

    let (tx, rx) = result_channel();
    let canvas = TextCanvas::new(FRAME_COLS, FRAME_ROWS);
    let renderer = ConditionRenderer::start(Box::new(canvas.clone()));
    let mut poller = UiPoller::new(rx, app, Box::new(renderer.handle()));
    poller.app.status = format!("Searching: {location} ...");

    let refresh = Duration::from_secs(refresh_secs.max(10));
    spawn_fetch(Arc::clone(&provider), FetchRequest::new(location.clone()), tx.clone());
    let mut last_fetch = Instant::now();
    let mut last_redraw: Option<Instant> = None;

    loop {
        poller.poll_once();

        if last_fetch.elapsed() >= refresh {
            debug!("refreshing '{location}'");
            last_fetch = Instant::now();
            spawn_fetch(Arc::clone(&provider), FetchRequest::new(location.clone()), tx.clone());
        }

        if last_redraw.is_none_or(|t| t.elapsed() >= Duration::from_millis(500)) {
            last_redraw = Some(Instant::now());
            print!("\x1b[2J\x1b[1;1H");
            println!("skydeck — {}", Local::now().format("%H:%M:%S"));
            print_dashboard(&poller.app, &canvas.frame());
            let _ = io::stdout().flush();
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn list_favorites() -> Result<()> {
    let store = JsonFavoritesStore::at_default_path()?;
    let favorites = store.load();
    if favorites.is_empty() {
        println!("(none)");
    } else {
        for favorite in &favorites {
            println!("{favorite}");
        }
    }
    Ok(())
}

fn scene_frame(condition: &str) -> String {
    let canvas = TextCanvas::new(FRAME_COLS, FRAME_ROWS);
    let mut surface = canvas.clone();
    // A few ticks in, so precipitation scenes show mid-fall motion.
    if let Err(err) = draw_frame(&mut surface, condition, 12) {
        debug!("scene frame failed: {err}");
    }
    canvas.frame()
}

fn print_dashboard(app: &AppState, frame: &str) {
    println!("{frame}");
    println!();

    let d = &app.display;
    println!("{}", d.location);
    println!("{}  {}", d.temperature, d.feels_like);
    println!("{}", d.description);
    println!(
        "Humidity: {}  Wind: {}  Pressure: {}  Visibility: {}",
        d.humidity, d.wind, d.pressure, d.visibility
    );

    print!("Sunrise: {}  Sunset: {}", d.sunrise, d.sunset);
    if let Some(daylight) = d.daylight {
        print!("  ({:.0}% daylight)", daylight * 100.0);
    }
    println!();

    if !d.hourly.is_empty() {
        println!("Hourly:");
        for card in &d.hourly {
            println!("  {}  {}  {}", card.time, card.icon.glyph(), card.temperature);
        }
    }

    println!("Status: {}", app.status);
}
