//! Background fetch worker: one short-lived thread per request.
//!
//! The worker drives the async provider to completion on its own
//! current-thread runtime, so the calling thread never blocks and the
//! provider layer stays async. Whatever happens — network failure, provider
//! error, malformed payload, even a runtime that refuses to build — exactly
//! one message lands on the result channel and nothing else escapes the
//! thread.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread;

use log::{debug, warn};

use crate::channel::ResultSender;
use crate::model::{FetchRequest, FetchResult};
use crate::provider::WeatherProvider;

/// Spawn a fetch for `request`. The thread is created fresh per request and
/// not reused; the returned handle is only needed by callers that want to
/// join (tests do, the UI doesn't).
pub fn spawn_fetch(
    provider: Arc<dyn WeatherProvider>,
    request: FetchRequest,
    results: ResultSender,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        debug!("fetching weather for '{}'", request.location);
        // Even a panicking provider yields a message; the push happens
        // exactly once per invocation no matter how the fetch went.
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            run_to_completion(provider.as_ref(), &request)
        }))
        .unwrap_or_else(|_| Err("Fetch error: fetch aborted unexpectedly".to_string()));
        if !results.send(outcome) {
            warn!("result channel closed, dropping fetch result for '{}'", request.location);
        }
    })
}

fn run_to_completion(provider: &dyn WeatherProvider, request: &FetchRequest) -> FetchResult {
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => return Err(format!("Fetch error: {err}")),
    };

    rt.block_on(provider.fetch(request)).map_err(|err| err.display_message())
}
