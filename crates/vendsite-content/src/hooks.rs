//! Hook results and the per-hook state machine
//!
//! Every data hook resolves to a [`QueryOutcome`]: the data plus where it
//! came from. [`Query`] tracks one hook's lifecycle:
//!
//! ```text
//! Idle ──run──▶ Loading ──▶ Success(outcome)   outcome.source = Cms | Fallback
//!                      └──▶ Error(ContentError)
//! Success / Error ──retry──▶ Loading
//! ```

use crate::error::{ContentError, ContentResult};
use serde::Serialize;
use std::fmt;
use std::future::Future;

/// Why fallback data was served
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
	/// CMS credentials are missing
	Unconfigured,
	/// CMS query failed after retries
	Error(String),
	/// CMS returned nothing and the empty-result policy asks for fallback
	Empty,
}

impl fmt::Display for FallbackReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Unconfigured => write!(f, "CMS not configured"),
			Self::Error(message) => write!(f, "CMS unavailable: {}", message),
			Self::Empty => write!(f, "CMS returned no content"),
		}
	}
}

/// Where a hook's data came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DataSource {
	Cms,
	Fallback(FallbackReason),
}

/// Data returned by a hook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome<T> {
	pub data: T,
	pub source: DataSource,
}

impl<T> QueryOutcome<T> {
	pub fn cms(data: T) -> Self {
		Self {
			data,
			source: DataSource::Cms,
		}
	}

	pub fn fallback(data: T, reason: FallbackReason) -> Self {
		Self {
			data,
			source: DataSource::Fallback(reason),
		}
	}

	pub fn is_fallback(&self) -> bool {
		matches!(self.source, DataSource::Fallback(_))
	}

	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryOutcome<U> {
		QueryOutcome {
			data: f(self.data),
			source: self.source,
		}
	}
}

/// Lifecycle of one hook
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
	Idle,
	Loading,
	Success(QueryOutcome<T>),
	Error(ContentError),
}

impl<T> QueryState<T> {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Loading => "loading",
			Self::Success(_) => "succeeded",
			Self::Error(_) => "failed",
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Success(_) | Self::Error(_))
	}
}

/// One hook's request lifecycle
///
/// # Examples
///
/// ```
/// use vendsite_content::{Query, QueryOutcome, QueryState};
///
/// # tokio_test::block_on(async {
/// let mut query = Query::new("testimonials");
/// query.run(|| async { Ok(QueryOutcome::cms(vec!["Great service"])) }).await.unwrap();
///
/// assert!(matches!(query.state(), QueryState::Success(_)));
/// assert!(query.run(|| async { Ok(QueryOutcome::cms(vec![])) }).await.is_err());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Query<T> {
	label: &'static str,
	state: QueryState<T>,
}

impl<T> Query<T> {
	pub fn new(label: &'static str) -> Self {
		Self {
			label,
			state: QueryState::Idle,
		}
	}

	pub fn label(&self) -> &'static str {
		self.label
	}

	pub fn state(&self) -> &QueryState<T> {
		&self.state
	}

	pub fn is_loading(&self) -> bool {
		matches!(self.state, QueryState::Loading)
	}

	pub fn data(&self) -> Option<&T> {
		match &self.state {
			QueryState::Success(outcome) => Some(&outcome.data),
			_ => None,
		}
	}

	pub fn error(&self) -> Option<&ContentError> {
		match &self.state {
			QueryState::Error(error) => Some(error),
			_ => None,
		}
	}

	/// `Idle -> Loading`
	pub fn begin(&mut self) -> ContentResult<()> {
		if !matches!(self.state, QueryState::Idle) {
			return Err(ContentError::InvalidTransition {
				from: self.state.name(),
				action: "start",
			});
		}
		self.state = QueryState::Loading;
		Ok(())
	}

	/// `Loading -> Success | Error`
	pub fn finish(&mut self, result: ContentResult<QueryOutcome<T>>) -> ContentResult<()> {
		if !self.is_loading() {
			return Err(ContentError::InvalidTransition {
				from: self.state.name(),
				action: "finish",
			});
		}
		self.state = match result {
			Ok(outcome) => {
				if let DataSource::Fallback(reason) = &outcome.source {
					tracing::debug!(query = self.label, %reason, "query served fallback data");
				}
				QueryState::Success(outcome)
			}
			Err(error) => {
				tracing::debug!(query = self.label, error = %error, "query failed");
				QueryState::Error(error)
			}
		};
		Ok(())
	}

	/// Run the hook from `Idle`
	pub async fn run<F, Fut>(&mut self, fetch: F) -> ContentResult<&QueryState<T>>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = ContentResult<QueryOutcome<T>>>,
	{
		self.begin()?;
		let result = fetch().await;
		self.finish(result)?;
		Ok(&self.state)
	}

	/// Run the hook again after it succeeded or failed
	pub async fn retry<F, Fut>(&mut self, fetch: F) -> ContentResult<&QueryState<T>>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = ContentResult<QueryOutcome<T>>>,
	{
		if !self.state.is_terminal() {
			return Err(ContentError::InvalidTransition {
				from: self.state.name(),
				action: "retry",
			});
		}
		self.state = QueryState::Idle;
		self.run(fetch).await
	}
}
