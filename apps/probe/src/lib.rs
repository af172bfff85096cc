//! Health probe used as the container `HEALTHCHECK` command.
//!
//! One `GET` against the server's health endpoint. Any 2xx within the timeout
//! counts as healthy; everything else is an error and a non-zero exit.

use std::borrow::Cow;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://127.0.0.1:8000/health";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[trai_derive::trai_error]
pub enum ProbeError {
    #[error("Health request failed{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Health request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Unhealthy: HTTP {status}")]
    Unhealthy { status: u16 },
}

/// Returns the status code of a healthy answer.
///
/// # Errors
/// [`ProbeError::Timeout`] past `timeout`, [`ProbeError::Unhealthy`] for a non-2xx
/// status and [`ProbeError::Http`] for any other transport failure.
pub async fn check(url: &str, timeout: Duration) -> Result<u16, ProbeError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Building HTTP client")?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ProbeError::Timeout { seconds: timeout.as_secs() }
        } else {
            ProbeError::Http { source: e, context: Some(url.to_owned().into()) }
        }
    })?;

    let status = response.status();
    if status.is_success() { Ok(status.as_u16()) } else { Err(ProbeError::Unhealthy { status: status.as_u16() }) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_container_contract() {
        assert_eq!(DEFAULT_URL, "http://127.0.0.1:8000/health");
        assert_eq!(DEFAULT_TIMEOUT.as_secs(), 10);
    }

    #[test]
    fn unhealthy_message_names_the_status() {
        assert_eq!(ProbeError::Unhealthy { status: 503 }.to_string(), "Unhealthy: HTTP 503");
    }
}
