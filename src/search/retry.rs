use std::time::Duration;

use docket_query::{SearchRequest, SearchResponse};

use super::{SearchBackend, SearchError};

/// Bounded exponential backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_retries: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_retries: 3,
			base_delay: Duration::from_millis(250),
			max_delay: Duration::from_secs(4),
		}
	}
}

impl RetryPolicy {
	/// Never retry.
	#[must_use]
	pub fn none() -> Self {
		Self {
			max_retries: 0,
			..Self::default()
		}
	}

	/// Delay before retry number `attempt` (zero-based).
	#[must_use]
	pub fn delay_for(&self, attempt: u32) -> Duration {
		let factor = 1u32 << attempt.min(16);
		self.base_delay.saturating_mul(factor).min(self.max_delay)
	}
}

/// Run `request` against `backend`, retrying transient failures.
pub async fn search_with_retry<B: SearchBackend + ?Sized>(
	backend: &B,
	request: &SearchRequest,
	policy: RetryPolicy,
) -> Result<SearchResponse, SearchError> {
	let mut attempt = 0;
	loop {
		match backend.search(request).await {
			Ok(response) => return Ok(response),
			Err(err) if err.is_transient() && attempt < policy.max_retries => {
				let delay = policy.delay_for(attempt);
				attempt += 1;
				tracing::warn!(
					attempt,
					max_retries = policy.max_retries,
					delay_ms = delay.as_millis() as u64,
					error = %err,
					"retrying search"
				);
				tokio::time::sleep(delay).await;
			}
			Err(err) => {
				if err.is_transient() {
					tracing::error!(attempts = attempt + 1, error = %err, "search retries exhausted");
				}
				return Err(err);
			}
		}
	}
}
