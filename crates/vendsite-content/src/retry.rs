//! Retry policy for CMS queries

use std::time::Duration;
use vendsite_conf::ContentfulSettings;
use vendsite_contentful::ContentfulError;

/// Delay between attempts
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vendsite_content::Backoff;
///
/// let backoff = Backoff::Exponential {
///     initial_delay: Duration::from_millis(250),
///     max_delay: Duration::from_secs(2),
/// };
/// assert_eq!(backoff.delay(0), Duration::from_millis(250));
/// assert_eq!(backoff.delay(1), Duration::from_millis(500));
/// assert_eq!(backoff.delay(10), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
	/// Retry without waiting
	Immediate,

	/// Same delay before every retry
	Fixed {
		/// Delay between attempts
		delay: Duration,
	},

	/// Doubling delay, capped
	Exponential {
		/// Delay before the first retry
		initial_delay: Duration,
		/// Upper bound on any delay
		max_delay: Duration,
	},
}

impl Backoff {
	/// Delay before retry number `retry` (0-based)
	pub fn delay(&self, retry: u32) -> Duration {
		match self {
			Backoff::Immediate => Duration::ZERO,
			Backoff::Fixed { delay } => *delay,
			Backoff::Exponential {
				initial_delay,
				max_delay,
			} => {
				let exp_delay = initial_delay.mul_f64(2_f64.powi(retry.min(30) as i32));
				exp_delay.min(*max_delay)
			}
		}
	}
}

impl Default for Backoff {
	fn default() -> Self {
		Backoff::Exponential {
			initial_delay: Duration::from_millis(250),
			max_delay: Duration::from_secs(2),
		}
	}
}

/// How a failed query is retried
///
/// Any failure other than missing configuration earns one more attempt,
/// preceded by a single client refresh when `refresh_client` is set.
/// Further attempts are made only for transient failures (see
/// [`ContentfulError::is_retryable`]) and reuse the refreshed client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
	/// Attempts in total, first try included; at least 1
	pub max_attempts: u32,
	pub backoff: Backoff,
	pub refresh_client: bool,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: vendsite_conf::settings::DEFAULT_MAX_ATTEMPTS,
			backoff: Backoff::default(),
			refresh_client: true,
		}
	}
}

impl RetryPolicy {
	pub fn new(max_attempts: u32) -> Self {
		Self {
			max_attempts: max_attempts.max(1),
			..Self::default()
		}
	}

	pub fn from_settings(settings: &ContentfulSettings) -> Self {
		Self::new(settings.max_attempts)
	}

	/// Single attempt, no refresh
	pub fn none() -> Self {
		Self {
			max_attempts: 1,
			backoff: Backoff::Immediate,
			refresh_client: false,
		}
	}

	pub fn with_backoff(mut self, backoff: Backoff) -> Self {
		self.backoff = backoff;
		self
	}

	pub fn with_refresh(mut self, refresh_client: bool) -> Self {
		self.refresh_client = refresh_client;
		self
	}

	/// Whether attempt number `attempt` (1-based) may be followed by another
	pub fn should_retry(&self, attempt: u32, error: &ContentfulError) -> bool {
		if error.is_configuration() || attempt >= self.max_attempts {
			return false;
		}
		attempt == 1 || error.is_retryable()
	}

	/// Whether to refresh the client after attempt `attempt` failed
	pub fn should_refresh(&self, attempt: u32) -> bool {
		self.refresh_client && attempt == 1
	}

	/// Delay after attempt `attempt` (1-based) failed
	pub fn delay_after(&self, attempt: u32) -> Duration {
		self.backoff.delay(attempt.saturating_sub(1))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(1, ContentfulError::Network("refused".into()), true)]
	#[case(2, ContentfulError::Timeout("10s".into()), true)]
	#[case(3, ContentfulError::Network("refused".into()), false)]
	#[case(1, ContentfulError::Decode("eof".into()), true)]
	#[case(2, ContentfulError::Decode("eof".into()), false)]
	#[case(1, ContentfulError::Api { status: 401, id: "AccessTokenInvalid".into(), message: "bad token".into() }, true)]
	#[case(2, ContentfulError::Api { status: 401, id: "AccessTokenInvalid".into(), message: "bad token".into() }, false)]
	#[case(2, ContentfulError::Api { status: 503, id: "ServiceUnavailable".into(), message: "down".into() }, true)]
	#[case(1, ContentfulError::NotConfigured { missing: vec![] }, false)]
	fn test_should_retry(#[case] attempt: u32, #[case] error: ContentfulError, #[case] expected: bool) {
		let policy = RetryPolicy::new(3);

		assert_eq!(policy.should_retry(attempt, &error), expected);
	}

	#[rstest]
	fn test_refresh_only_after_first_failure() {
		let policy = RetryPolicy::default();

		assert!(policy.should_refresh(1));
		assert!(!policy.should_refresh(2));
		assert!(!RetryPolicy::none().should_refresh(1));
	}

	#[rstest]
	fn test_delays_grow_and_cap() {
		let policy = RetryPolicy::default();

		assert_eq!(policy.delay_after(1), Duration::from_millis(250));
		assert_eq!(policy.delay_after(2), Duration::from_millis(500));
		assert_eq!(policy.delay_after(5), Duration::from_secs(2));
	}

	#[rstest]
	fn test_single_attempt_policy_never_retries() {
		let policy = RetryPolicy::none();

		assert!(!policy.should_retry(1, &ContentfulError::Network("refused".into())));
		assert!(!policy.should_retry(1, &ContentfulError::Decode("eof".into())));
	}

	#[rstest]
	fn test_max_attempts_floor() {
		assert_eq!(RetryPolicy::new(0).max_attempts, 1);
	}
}
