//! Contentful client errors

use thiserror::Error;

/// Errors raised while talking to the Content Delivery API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentfulError {
	/// Space id or delivery token missing (or still a placeholder)
	#[error("Contentful is not configured: missing {}", .missing.join(", "))]
	NotConfigured {
		/// Names of the missing settings
		missing: Vec<String>,
	},

	/// Query rejected before it was sent
	#[error("Invalid query: {0}")]
	InvalidQuery(String),

	/// Transport-level failure (DNS, connection refused, TLS, ...)
	#[error("Network error: {0}")]
	Network(String),

	/// Request exceeded the configured timeout
	#[error("Request timed out: {0}")]
	Timeout(String),

	/// Non-success response from the API
	#[error("Contentful API error {status} ({id}): {message}")]
	Api {
		/// HTTP status code
		status: u16,
		/// Contentful error id, e.g. `AccessTokenInvalid`, `NotFound`
		id: String,
		/// Human-readable message from the response body
		message: String,
	},

	/// Response body did not match the expected shape
	#[error("Failed to decode response: {0}")]
	Decode(String),
}

impl ContentfulError {
	/// Whether retrying the same request may succeed
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Network(_) | Self::Timeout(_) => true,
			Self::Api { status, .. } => *status == 429 || *status >= 500,
			Self::NotConfigured { .. } | Self::InvalidQuery(_) | Self::Decode(_) => false,
		}
	}

	/// Whether the error is a missing-configuration error
	pub fn is_configuration(&self) -> bool {
		matches!(self, Self::NotConfigured { .. })
	}

	/// Whether the API reported the resource as missing
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::Api { status: 404, .. })
	}

	pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
		if error.is_timeout() {
			Self::Timeout(error.to_string())
		} else if error.is_decode() {
			Self::Decode(error.to_string())
		} else {
			Self::Network(error.to_string())
		}
	}
}

/// Result type for Contentful operations
pub type ContentfulResult<T> = Result<T, ContentfulError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn api(status: u16) -> ContentfulError {
		ContentfulError::Api {
			status,
			id: "X".to_string(),
			message: "m".to_string(),
		}
	}

	#[rstest]
	#[case(ContentfulError::Network("refused".into()), true)]
	#[case(ContentfulError::Timeout("10s".into()), true)]
	#[case(api(429), true)]
	#[case(api(503), true)]
	#[case(api(401), false)]
	#[case(api(404), false)]
	#[case(ContentfulError::Decode("eof".into()), false)]
	#[case(ContentfulError::NotConfigured { missing: vec![] }, false)]
	fn test_is_retryable(#[case] error: ContentfulError, #[case] expected: bool) {
		assert_eq!(error.is_retryable(), expected);
	}

	#[rstest]
	fn test_not_configured_message_lists_missing_settings() {
		let error = ContentfulError::NotConfigured {
			missing: vec![
				"CONTENTFUL_SPACE_ID".to_string(),
				"CONTENTFUL_DELIVERY_TOKEN".to_string(),
			],
		};

		assert_eq!(
			error.to_string(),
			"Contentful is not configured: missing CONTENTFUL_SPACE_ID, CONTENTFUL_DELIVERY_TOKEN"
		);
	}
}
