use thiserror::Error;

/// Failure taxonomy for a fetch attempt.
///
/// Every variant is caught at the worker boundary and flattened into a plain
/// display string before it crosses to the UI thread; see
/// [`FetchError::display_message`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// No API credential available from the environment or the config file.
    #[error(
        "OpenWeather API key not set.\n\
         Hint: set OPENWEATHER_API_KEY or run `skydeck configure` first."
    )]
    Configuration,

    /// Connection, TLS or timeout failure from the HTTP client.
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status; carries the message extracted from the
    /// provider's error body when present, else the truncated raw body.
    #[error("{0}")]
    Provider(String),

    /// Required field missing or payload that does not parse.
    #[error("{0}")]
    Malformed(String),
}

impl FetchError {
    /// The human-readable string that is allowed across the thread boundary.
    pub fn display_message(&self) -> String {
        match self {
            FetchError::Provider(msg) => format!("API error: {msg}"),
            other => format!("Fetch error: {other}"),
        }
    }
}
