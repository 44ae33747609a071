//! Exponential backoff with jitter, driving [`crate::transport::RetryTransport`].

use std::time::Duration;
use wren_core::{Aborted, CancelToken};

/// Backoff configuration for the retry transport.
///
/// Defaults match the streaming transport's contract: three retries, one
/// second base delay, doubling each attempt, capped at 100 seconds, with
/// ±20% jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Delay ceiling; backoff never exceeds this regardless of attempt count.
    pub max_delay: Duration,
    /// Multiplier applied to the delay on each successive attempt.
    pub multiplier: f64,
    /// Jitter fraction in `[0, 1]`; the applied delay is
    /// `delay ± jitter * delay`.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(100),
            multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl RetryConfig {
    /// No retries: the first failure is final.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// The exponential delay for `attempt` (0-indexed), before jitter and
    /// before the cap is applied.
    #[must_use]
    pub fn raw_delay_for_attempt(&self, attempt: u32) -> Duration {
        let scaled = self.base_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }

    /// The delay for `attempt`, jittered by a caller-supplied random factor
    /// in `[-1, 1]` so tests can make the jitter deterministic instead of
    /// reaching into an RNG.
    #[must_use]
    pub fn delay_for_attempt_with_jitter(&self, attempt: u32, random_factor: f64) -> Duration {
        let base = self.raw_delay_for_attempt(attempt).as_secs_f64();
        let jittered = base + base * self.jitter_factor * random_factor.clamp(-1.0, 1.0);
        Duration::from_secs_f64(jittered.max(0.0).min(self.max_delay.as_secs_f64()))
    }

    /// Parse a `Retry-After` header value (seconds, or an HTTP date) into a
    /// delay, capped at `max_delay`.
    #[must_use]
    pub fn retry_after_delay(&self, header_value: &str) -> Option<Duration> {
        let secs = parse_retry_after_secs(header_value)?;
        Some(Duration::from_secs(secs).min(self.max_delay))
    }
}

/// Parse a `Retry-After` header value into whole seconds, accepting either
/// form the spec allows: an integer delay, or an HTTP-date (RFC 2822)
/// deadline to count down to. Shared by [`RetryConfig::retry_after_delay`]
/// and the error-classification transport layer so both branches stay in
/// one place.
#[must_use]
pub fn parse_retry_after_secs(header_value: &str) -> Option<u64> {
    if let Ok(secs) = header_value.trim().parse::<u64>() {
        return Some(secs);
    }
    let target = chrono::DateTime::parse_from_rfc2822(header_value.trim()).ok()?;
    let now = chrono::Utc::now();
    let delta = target.with_timezone(&chrono::Utc) - now;
    Some(delta.num_seconds().max(0) as u64)
}

/// The outcome of a retried operation.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// The operation eventually succeeded.
    Success(T),
    /// Retries were exhausted; carries the last error and attempt count.
    Exhausted { error: E, attempts: u32 },
    /// The caller's cancel token fired before the operation could succeed.
    Aborted,
}

impl<T, E> RetryOutcome<T, E> {
    /// Collapse to a `Result`, mapping exhaustion/abort into `E`/[`Aborted`].
    pub fn into_result(self) -> Result<T, RetryError<E>> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Exhausted { error, .. } => Err(RetryError::Exhausted(error)),
            Self::Aborted => Err(RetryError::Aborted(Aborted)),
        }
    }
}

/// Error wrapper distinguishing "retries exhausted" from "cancelled".
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E: std::fmt::Display + std::fmt::Debug> {
    /// Retries ran out; the inner error is the last one observed.
    #[error("retries exhausted: {0}")]
    Exhausted(E),
    /// Cancelled before completion.
    #[error(transparent)]
    Aborted(#[from] Aborted),
}

/// Retry `operation` under `config`, honoring `cancel` at every sleep and
/// classifying errors with `should_retry`.
///
/// `random_factor` supplies the jitter input for each attempt (index =
/// attempt number); production callers pass a small closure over `rand`,
/// tests pass a fixed sequence so delays are exact.
pub async fn retry<T, E, Op, Fut, ShouldRetry>(
    config: RetryConfig,
    cancel: &CancelToken,
    mut random_factor: impl FnMut(u32) -> f64,
    should_retry: ShouldRetry,
    mut operation: Op,
) -> RetryOutcome<T, E>
where
    Op: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    ShouldRetry: Fn(&E) -> bool,
{
    let mut attempt = 0;
    loop {
        if cancel.is_cancelled() {
            return RetryOutcome::Aborted;
        }
        match operation().await {
            Ok(value) => return RetryOutcome::Success(value),
            Err(error) => {
                if attempt >= config.max_retries || !should_retry(&error) {
                    return RetryOutcome::Exhausted {
                        error,
                        attempts: attempt + 1,
                    };
                }
                let delay = config.delay_for_attempt_with_jitter(attempt, random_factor(attempt));
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return RetryOutcome::Aborted,
                    () = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn raw_delay_doubles_and_caps() {
        let config = RetryConfig::default();
        assert_eq!(config.raw_delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.raw_delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.raw_delay_for_attempt(2), Duration::from_secs(4));
        let far = config.raw_delay_for_attempt(20);
        assert_eq!(far, config.max_delay);
    }

    #[test]
    fn jitter_is_deterministic_given_a_fixed_factor() {
        let config = RetryConfig::default();
        let plus = config.delay_for_attempt_with_jitter(0, 1.0);
        let minus = config.delay_for_attempt_with_jitter(0, -1.0);
        assert_eq!(plus, Duration::from_secs_f64(1.2));
        assert_eq!(minus, Duration::from_secs_f64(0.8));
    }

    #[test]
    fn retry_after_header_parses_seconds() {
        let config = RetryConfig::default();
        assert_eq!(config.retry_after_delay("5"), Some(Duration::from_secs(5)));
    }

    #[test]
    fn retry_after_header_parses_http_dates() {
        let future = chrono::Utc::now() + chrono::Duration::seconds(30);
        let header_value = future.to_rfc2822();
        let secs = parse_retry_after_secs(&header_value).expect("should parse an HTTP date");
        // allow a couple seconds of slack for the wall-clock delta computed above
        assert!((28..=30).contains(&secs), "expected ~30s, got {secs}");
    }

    #[test]
    fn retry_after_header_rejects_garbage() {
        assert_eq!(parse_retry_after_secs("not a date or number"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let config = RetryConfig {
            max_retries: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
            jitter_factor: 0.0,
        };
        let cancel = CancelToken::new();
        let attempts = AtomicU32::new(0);

        let outcome = retry(
            config,
            &cancel,
            |_| 0.0,
            |_: &&str| true,
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("not yet")
                    } else {
                        Ok("done")
                    }
                }
            },
        )
        .await;

        assert!(matches!(outcome, RetryOutcome::Success("done")));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_retries() {
        let config = RetryConfig {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            multiplier: 1.0,
            jitter_factor: 0.0,
        };
        let cancel = CancelToken::new();

        let outcome: RetryOutcome<(), &str> = retry(
            config,
            &cancel,
            |_| 0.0,
            |_| true,
            || async { Err("always fails") },
        )
        .await;

        match outcome {
            RetryOutcome::Exhausted { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_aborts_before_first_attempt() {
        let config = RetryConfig::default();
        let cancel = CancelToken::new();
        cancel.cancel();

        let outcome: RetryOutcome<(), &str> =
            retry(config, &cancel, |_| 0.0, |_| true, || async { Ok(()) }).await;

        assert!(matches!(outcome, RetryOutcome::Aborted));
    }
}
