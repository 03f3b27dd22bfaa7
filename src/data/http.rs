//! Blocking HTTP client construction and retry policy.

use std::thread;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;

use crate::error::{AppError, EXIT_UPSTREAM};

const USER_AGENT: &str = concat!("credit-anxiety/", env!("CARGO_PKG_VERSION"));
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Build the shared client: bounded per-request timeout, cookie jar enabled.
pub fn build_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .build()
        .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))
}

/// GET `url` with `query` and return the body, mapping every failure to an
/// upstream error.
pub fn get_text(client: &Client, url: &str, query: &[(&str, &str)]) -> Result<String, AppError> {
    let resp = client.get(url).query(query).send().map_err(|e| {
        if e.is_timeout() {
            AppError::upstream(format!("Request to {url} timed out: {e}"))
        } else {
            AppError::upstream(format!("Request to {url} failed: {e}"))
        }
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AppError::upstream(format!(
            "Request to {url} failed with status {status}."
        )));
    }

    let body = resp
        .text()
        .map_err(|e| AppError::upstream(format!("Failed to read response from {url}: {e}")))?;
    debug!("GET {url}: {} bytes", body.len());
    Ok(body)
}

/// Run `op`, retrying upstream failures up to `retries` extra times with
/// exponential backoff. Parse and config errors are returned immediately.
pub fn with_retries<T>(
    retries: u32,
    what: &str,
    mut op: impl FnMut() -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut attempt = 0u32;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(err) if err.exit_code() == EXIT_UPSTREAM && attempt < retries => {
                let delay = backoff_delay(attempt);
                warn!(
                    "{what}: attempt {} failed ({err}); retrying in {} ms",
                    attempt + 1,
                    delay.as_millis()
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_BASE * 2u32.saturating_pow(attempt.min(6))
}
