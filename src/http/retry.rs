//! Retry utilities for admin API requests.
//!
//! Only throttled calls (HTTP 429) are replayed. Every other failure is returned on the spot, and
//! the elapsed-time ceiling of the [`BackoffPolicy`] bounds the whole sequence.

// std
use std::{cell::RefCell, future::Future};
// crates.io
use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use tokio::time;
// self
use crate::{_prelude::*, metrics};

thread_local! {
	static SMALL_RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_rng(&mut rand::rng()));
}

/// Delay before the first retry, prior to randomization.
pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
/// Growth factor applied to the interval after each retry.
pub const DEFAULT_MULTIPLIER: f64 = 1.5;
/// Default upper bound for a single backoff interval.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(3);
/// Default ceiling for the whole retry sequence.
pub const DEFAULT_MAX_ELAPSED_TIME: Duration = Duration::from_secs(30);
/// Default jitter factor.
pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;

/// Exponential backoff configuration shared by every remote call of a provider instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackoffPolicy {
	/// Interval used for the first retry.
	#[serde(with = "humantime_serde", default = "default_initial_interval")]
	pub initial_interval: Duration,
	/// Factor the interval grows by after every retry.
	#[serde(default = "default_multiplier")]
	pub multiplier: f64,
	/// Upper bound applied to interval growth.
	#[serde(with = "humantime_serde", default = "default_max_interval")]
	pub max_interval: Duration,
	/// Hard ceiling on the time spent in the retry sequence.
	#[serde(with = "humantime_serde", default = "default_max_elapsed_time")]
	pub max_elapsed_time: Duration,
	/// Jitter factor; each delay is drawn from `interval * (1 ± factor)`.
	#[serde(default = "default_randomization_factor")]
	pub randomization_factor: f64,
}
impl BackoffPolicy {
	/// Build a policy from the three knobs exposed in the provider block.
	pub fn new(
		max_elapsed_time: Duration,
		max_interval: Duration,
		randomization_factor: f64,
	) -> Self {
		Self { max_elapsed_time, max_interval, randomization_factor, ..Default::default() }
	}

	/// Validate invariants for retry configuration.
	pub fn validate(&self) -> Result<()> {
		if self.initial_interval.is_zero() {
			return Err(Error::validation("retry.initial_interval", "Must be greater than zero."));
		}
		if !self.multiplier.is_finite() || self.multiplier < 1.0 {
			return Err(Error::validation("retry.multiplier", "Must be at least 1.0."));
		}
		if self.max_interval.is_zero() {
			return Err(Error::validation("retry.max_interval", "Must be greater than zero."));
		}
		if self.max_elapsed_time.is_zero() {
			return Err(Error::validation(
				"retry.max_elapsed_time",
				"Must be greater than zero.",
			));
		}
		if !(0.0..=1.0).contains(&self.randomization_factor) {
			return Err(Error::validation(
				"retry.randomization_factor",
				"Must be between 0.0 and 1.0.",
			));
		}

		Ok(())
	}

	/// Un-randomized interval for the given zero-based retry number.
	pub fn interval(&self, attempt: u32) -> Duration {
		let exponent = attempt.min(64) as i32;
		let grown = self.initial_interval.as_secs_f64() * self.multiplier.powi(exponent);
		let capped = grown.min(self.max_interval.as_secs_f64());

		Duration::try_from_secs_f64(capped).map_or(self.max_interval, |d| d.min(self.max_interval))
	}

	/// Apply jitter to an interval according to the randomization factor.
	pub fn randomize(&self, interval: Duration) -> Duration {
		if self.randomization_factor == 0.0 {
			return interval;
		}

		let delta = Duration::try_from_secs_f64(interval.as_secs_f64() * self.randomization_factor)
			.unwrap_or(interval);

		random_within(interval.saturating_sub(delta), interval.saturating_add(delta))
	}
}
impl Default for BackoffPolicy {
	fn default() -> Self {
		Self {
			initial_interval: DEFAULT_INITIAL_INTERVAL,
			multiplier: DEFAULT_MULTIPLIER,
			max_interval: DEFAULT_MAX_INTERVAL,
			max_elapsed_time: DEFAULT_MAX_ELAPSED_TIME,
			randomization_factor: DEFAULT_RANDOMIZATION_FACTOR,
		}
	}
}

/// Controls backoff progression and the elapsed-time budget of one retry sequence.
#[derive(Debug)]
pub struct RetryExecutor<'a> {
	policy: &'a BackoffPolicy,
	started: Instant,
	retries_used: u32,
}
impl<'a> RetryExecutor<'a> {
	/// Start a new retry sequence under the supplied policy.
	pub fn new(policy: &'a BackoffPolicy) -> Self {
		Self { policy, started: Instant::now(), retries_used: 0 }
	}

	/// Time spent since the sequence started.
	pub fn elapsed(&self) -> Duration {
		self.started.elapsed()
	}

	/// Number of retries that have already been consumed.
	pub fn attempts_used(&self) -> u32 {
		self.retries_used
	}

	/// Advance retry state and compute the next delay, or `None` once the ceiling would be crossed.
	pub fn next_backoff(&mut self) -> Option<Duration> {
		let elapsed = self.elapsed();
		let delay = self.policy.randomize(self.policy.interval(self.retries_used));

		if elapsed.saturating_add(delay) > self.policy.max_elapsed_time {
			tracing::debug!(
				attempt = self.retries_used,
				?elapsed,
				ceiling = ?self.policy.max_elapsed_time,
				"retry budget exhausted"
			);

			return None;
		}

		self.retries_used = self.retries_used.saturating_add(1);

		tracing::debug!(attempt = self.retries_used, ?delay, ?elapsed, "retry backoff computed");

		Some(delay)
	}
}

/// Run `operation`, replaying it while the admin API answers HTTP 429.
///
/// With no policy the operation runs exactly once. Non-throttling errors are never retried, and
/// once the elapsed-time ceiling is reached the last observed error is returned.
pub async fn retry_throttled<T, F, Fut>(
	operation_name: &'static str,
	policy: Option<&BackoffPolicy>,
	mut operation: F,
) -> Result<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let Some(policy) = policy else {
		return operation().await;
	};
	let mut executor = RetryExecutor::new(policy);

	loop {
		match operation().await {
			Err(err) if err.is_throttled() => {
				metrics::record_throttled(operation_name);

				match executor.next_backoff() {
					Some(delay) => time::sleep(delay).await,
					None => return Err(err),
				}
			},
			result => return result,
		}
	}
}

fn random_within(min: Duration, max: Duration) -> Duration {
	if max <= min {
		return max;
	}

	SMALL_RNG.with(|cell| {
		let mut rng = cell.borrow_mut();
		let nanos = max.as_nanos() - min.as_nanos();
		let jitter = rng.random_range(0..=nanos.min(u64::MAX as u128));

		min.saturating_add(Duration::from_nanos(jitter as u64))
	})
}

fn default_initial_interval() -> Duration {
	DEFAULT_INITIAL_INTERVAL
}

fn default_multiplier() -> f64 {
	DEFAULT_MULTIPLIER
}

fn default_max_interval() -> Duration {
	DEFAULT_MAX_INTERVAL
}

fn default_max_elapsed_time() -> Duration {
	DEFAULT_MAX_ELAPSED_TIME
}

fn default_randomization_factor() -> f64 {
	DEFAULT_RANDOMIZATION_FACTOR
}
