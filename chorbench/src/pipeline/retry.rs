//! Bounded retry for stochastic generation.
//!
//! The fuzz generator may refuse a mutation that does not fit the network it
//! was given. Such refusals are recoverable and retried up to
//! [`RetryConfig::max_attempts`] times; every other failure propagates at
//! once.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::analyses::Analyses;
use crate::core::FuzzParameters;
use crate::errors::{AnalysisError, BenchError};
use crate::events::{EventSink, PipelineEvent};
use crate::observability::SpanTimer;

/// Backoff strategy for retry delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackoffStrategy {
    /// delay = base * 2^attempt
    Exponential,
    /// delay = base * (attempt + 1)
    Linear,
    /// delay = base
    #[default]
    Constant,
}

/// Jitter applied on top of the backoff delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JitterStrategy {
    /// No jitter
    #[default]
    None,
    /// Random from 0 to delay
    Full,
    /// Half fixed, half random
    Equal,
}

/// Configuration for bounded generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts, the first one included.
    pub max_attempts: usize,
    /// Base delay between attempts in milliseconds. Zero retries immediately.
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds.
    pub max_delay_ms: u64,
    /// Backoff strategy.
    pub backoff_strategy: BackoffStrategy,
    /// Jitter strategy.
    pub jitter_strategy: JitterStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1000,
            base_delay_ms: 0,
            max_delay_ms: 1000,
            backoff_strategy: BackoffStrategy::Constant,
            jitter_strategy: JitterStrategy::None,
        }
    }
}

impl RetryConfig {
    /// Creates a new retry config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay_ms(mut self, delay: u64) -> Self {
        self.base_delay_ms = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay_ms(mut self, delay: u64) -> Self {
        self.max_delay_ms = delay;
        self
    }

    /// Sets the backoff strategy.
    #[must_use]
    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff_strategy = strategy;
        self
    }

    /// Sets the jitter strategy.
    #[must_use]
    pub fn with_jitter(mut self, strategy: JitterStrategy) -> Self {
        self.jitter_strategy = strategy;
        self
    }

    /// Delay to wait after the failed attempt number `attempt` (0-indexed).
    #[must_use]
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let base = self.base_delay_ms;
        let max = self.max_delay_ms;

        let delay = match self.backoff_strategy {
            BackoffStrategy::Exponential => {
                let exponent = u32::try_from(attempt).unwrap_or(u32::MAX);
                base.saturating_mul(2u64.saturating_pow(exponent)).min(max)
            }
            BackoffStrategy::Linear => {
                let factor = u64::try_from(attempt + 1).unwrap_or(u64::MAX);
                base.saturating_mul(factor).min(max)
            }
            BackoffStrategy::Constant => base.min(max),
        };

        let jittered = match self.jitter_strategy {
            JitterStrategy::None => delay,
            JitterStrategy::Full => {
                if delay == 0 {
                    0
                } else {
                    rand::thread_rng().gen_range(0..=delay)
                }
            }
            JitterStrategy::Equal => {
                let half = delay / 2;
                if half == 0 {
                    delay
                } else {
                    half + rand::thread_rng().gen_range(0..=half)
                }
            }
        };

        Duration::from_millis(jittered)
    }
}

/// Runs `operation` until it succeeds, fails unrecoverably, or has failed
/// recoverably `config.max_attempts` times.
///
/// `on_retry` is told the attempt number and the error before each retry.
/// Returns the value and the number of attempts used.
pub fn generate_with_retry<T, F, R>(
    config: &RetryConfig,
    case: &str,
    mut operation: F,
    mut on_retry: R,
) -> Result<(T, usize), BenchError>
where
    F: FnMut() -> Result<T, AnalysisError>,
    R: FnMut(usize, &AnalysisError),
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation() {
            Ok(value) => return Ok((value, attempt)),
            Err(e) if e.is_recoverable() => {
                if attempt >= config.max_attempts {
                    return Err(BenchError::GenerationExhausted {
                        case: case.to_string(),
                        attempts: attempt,
                    });
                }
                on_retry(attempt, &e);
                let delay = config.delay_for(attempt - 1);
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// A mutated network.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzResult {
    /// The mutated network.
    pub network: String,
    /// Wall-clock time of the successful generation, retries included.
    pub elapsed_ms: f64,
    /// Number of generator calls made.
    pub attempts: usize,
}

/// Fuzzes `network` until the generator accepts the parameters.
pub fn fuzz_until_valid(
    analyses: &dyn Analyses,
    config: &RetryConfig,
    events: &dyn EventSink,
    case: &str,
    network: &str,
    params: FuzzParameters,
) -> Result<FuzzResult, BenchError> {
    let timer = SpanTimer::start("fuzz");
    let (network, attempts) = generate_with_retry(
        config,
        case,
        || analyses.fuzz(network, params.deletions, params.swaps),
        |attempt, error| {
            events.emit(&PipelineEvent::GenerationRetry {
                case: case.to_string(),
                attempt,
                reason: error.to_string(),
            });
        },
    )?;

    Ok(FuzzResult {
        network,
        elapsed_ms: timer.elapsed_ms(),
        attempts,
    })
}
