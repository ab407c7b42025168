//! Lazily initialized, shareable client handle

use crate::client::DeliveryClient;
use crate::error::{ContentfulError, ContentfulResult};
use crate::monitor::HealthCheck;
use crate::state::ConnectionState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use vendsite_conf::ContentfulSettings;

/// Outcome of a connection test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
	pub success: bool,
	/// Never empty
	pub message: String,
	pub checked_at: DateTime<Utc>,
	pub latency_ms: Option<u64>,
}

impl ConnectionReport {
	fn ok(message: String, latency_ms: u64) -> Self {
		Self {
			success: true,
			message,
			checked_at: Utc::now(),
			latency_ms: Some(latency_ms),
		}
	}

	fn failed(message: String) -> Self {
		Self {
			success: false,
			message,
			checked_at: Utc::now(),
			latency_ms: None,
		}
	}
}

struct HandleInner {
	settings: RwLock<ContentfulSettings>,
	client: RwLock<Option<Arc<DeliveryClient>>>,
	state: ConnectionState,
}

/// Cached [`DeliveryClient`] shared across the application
///
/// Clones share the same cache. Refreshing swaps the cached `Arc`; requests
/// already in flight keep the client they started with, and the last
/// refresh wins.
///
/// # Examples
///
/// ```
/// use vendsite_conf::ContentfulSettings;
/// use vendsite_contentful::ClientHandle;
///
/// let handle = ClientHandle::new(ContentfulSettings::builder().space_id("s").build());
/// assert!(!handle.is_configured());
/// assert!(handle.get_client().is_err());
/// ```
#[derive(Clone)]
pub struct ClientHandle {
	inner: Arc<HandleInner>,
}

impl ClientHandle {
	/// Handle with its own connection state
	pub fn new(settings: ContentfulSettings) -> Self {
		Self::with_state(settings, ConnectionState::new())
	}

	/// Handle reporting into an existing connection state
	pub fn with_state(settings: ContentfulSettings, state: ConnectionState) -> Self {
		if !settings.is_configured() {
			state.mark_unconfigured(not_configured(&settings).to_string());
		}
		Self {
			inner: Arc::new(HandleInner {
				settings: RwLock::new(settings),
				client: RwLock::new(None),
				state,
			}),
		}
	}

	pub fn settings(&self) -> ContentfulSettings {
		self.inner.settings.read().clone()
	}

	pub fn state(&self) -> &ConnectionState {
		&self.inner.state
	}

	pub fn is_configured(&self) -> bool {
		self.inner.settings.read().is_configured()
	}

	/// Cached client, built on first use
	pub fn get_client(&self) -> ContentfulResult<Arc<DeliveryClient>> {
		if let Some(client) = self.inner.client.read().as_ref() {
			return Ok(Arc::clone(client));
		}

		let mut slot = self.inner.client.write();
		if let Some(client) = slot.as_ref() {
			return Ok(Arc::clone(client));
		}

		let client = Arc::new(self.build()?);
		tracing::debug!(
			space = client.space_id(),
			environment = client.environment(),
			"contentful client initialized"
		);
		*slot = Some(Arc::clone(&client));
		Ok(client)
	}

	/// Drop the cached client and build a fresh one
	pub fn refresh_client(&self) -> ContentfulResult<Arc<DeliveryClient>> {
		let client = Arc::new(self.build()?);
		*self.inner.client.write() = Some(Arc::clone(&client));
		self.inner.state.record_refresh();
		tracing::info!(
			refreshes = self.inner.state.refresh_count(),
			"contentful client refreshed"
		);
		Ok(client)
	}

	/// Replace the settings; the next `get_client` builds from them
	///
	/// Health starts over as `Unknown` when the new settings are complete.
	pub fn reconfigure(&self, settings: ContentfulSettings) {
		*self.inner.settings.write() = settings;
		*self.inner.client.write() = None;
		if self.is_configured() {
			self.inner.state.reset();
			tracing::info!("contentful settings replaced");
		} else {
			let settings = self.settings();
			self.inner
				.state
				.mark_unconfigured(not_configured(&settings).to_string());
		}
	}

	fn build(&self) -> ContentfulResult<DeliveryClient> {
		let settings = self.inner.settings.read();
		match DeliveryClient::new(&settings) {
			Ok(client) => Ok(client),
			Err(e) => {
				if e.is_configuration() {
					self.inner.state.mark_unconfigured(e.to_string());
				}
				Err(e)
			}
		}
	}

	/// Issue a trivial read and report the outcome; never fails
	pub async fn test_connection(&self) -> ConnectionReport {
		let client = match self.get_client() {
			Ok(client) => client,
			Err(e) => return ConnectionReport::failed(e.to_string()),
		};

		let started = Instant::now();
		match client.ping().await {
			Ok(total) => {
				self.inner.state.record_success();
				ConnectionReport::ok(
					format!(
						"Connected to space {} ({}); {} entries available",
						client.space_id(),
						client.environment(),
						total
					),
					started.elapsed().as_millis() as u64,
				)
			}
			Err(e) => {
				let message = e.to_string();
				self.inner.state.record_failure(message.clone());
				ConnectionReport::failed(message)
			}
		}
	}
}

fn not_configured(settings: &ContentfulSettings) -> ContentfulError {
	ContentfulError::NotConfigured {
		missing: settings.missing_credentials(),
	}
}

#[async_trait]
impl HealthCheck for ClientHandle {
	fn is_configured(&self) -> bool {
		ClientHandle::is_configured(self)
	}

	async fn test_connection(&self) -> ConnectionReport {
		ClientHandle::test_connection(self).await
	}

	async fn refresh(&self) -> bool {
		match self.refresh_client() {
			Ok(_) => true,
			Err(e) => {
				tracing::warn!(error = %e, "contentful client refresh failed");
				false
			}
		}
	}
}
