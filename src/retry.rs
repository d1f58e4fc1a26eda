// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Bounded retry with exponential backoff for remote calls.
///
/// Only the boundary calls of a census run go through this helper: the
/// GraphQL metadata query and each individual contributor page request.
use std::{fmt::Display, future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig
{
    /// Total number of attempts, the first one included (default: 3).
    pub max_attempts:     u32,
    /// Delay before the second attempt in milliseconds (default: 1000).
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after every failed attempt (default:
    /// 2.0).
    pub backoff_factor:   f64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 3, initial_delay_ms: 1000, backoff_factor: 2.0,
        }
    }
}

impl RetryConfig
{
    /// Configuration that performs exactly one attempt.
    pub fn disabled() -> Self
    {
        Self {
            max_attempts: 1, ..Self::default()
        }
    }

    /// Delay slept after the failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32,) -> Duration
    {
        let exponent = attempt.saturating_sub(1,) as i32;
        let millis = self.initial_delay_ms as f64 * self.backoff_factor.powi(exponent,);
        Duration::from_millis(millis.min(u64::MAX as f64,) as u64,)
    }
}

/// Executes an async operation with exponential backoff retry logic.
///
/// # Arguments
///
/// * `config` - Retry configuration (max attempts, delays)
/// * `operation_name` - Name of the operation for logging
/// * `f` - Async function to retry
///
/// # Errors
///
/// Returns the last error encountered if all attempts fail.
///
/// # Example
///
/// ```no_run
/// use repo_census::{Error, retry::{RetryConfig, retry_with_backoff}};
///
/// # async fn example() -> Result<(), Error> {
/// let config = RetryConfig::default();
/// let result = retry_with_backoff(&config, "fetch data", || async {
///     Ok::<_, Error,>(42,)
/// },)
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T, E,>(
    config: &RetryConfig,
    operation_name: &str,
    f: F,
) -> Result<T, E,>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E,>,>,
    E: Display,
{
    retry_with_backoff_if(config, operation_name, |_| true, f,).await
}

/// Like [`retry_with_backoff`], but only failures accepted by `should_retry`
/// trigger another attempt; any other error is returned immediately.
///
/// # Errors
///
/// Returns the first error rejected by `should_retry`, or the last error once
/// every attempt failed.
pub async fn retry_with_backoff_if<F, Fut, T, E, P,>(
    config: &RetryConfig,
    operation_name: &str,
    should_retry: P,
    mut f: F,
) -> Result<T, E,>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E,>,>,
    E: Display,
    P: Fn(&E,) -> bool,
{
    let max_attempts = config.max_attempts.max(1,);
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(result,) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result,);
            }
            Err(error,) => {
                if !should_retry(&error,) {
                    debug!("{} failed permanently on attempt {}: {}", operation_name, attempt, error);
                    return Err(error,);
                }
                if attempt >= max_attempts {
                    if max_attempts > 1 {
                        warn!("{} failed after {} attempts: {}", operation_name, max_attempts, error);
                    }
                    return Err(error,);
                }

                let delay = config.delay_after(attempt,);
                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {}ms...",
                    operation_name,
                    attempt,
                    max_attempts,
                    error,
                    delay.as_millis()
                );

                sleep(delay,).await;
                attempt += 1;
            }
        }
    }
}
