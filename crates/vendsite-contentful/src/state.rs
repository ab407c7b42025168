//! Connection state shared by the client handle, monitor and data hooks
//!
//! Last-known health of the CMS connection. Best-effort: it records what the
//! most recent check or query observed and is not authoritative.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Where users are sent to fix missing credentials
pub const SETTINGS_HELP_PATH: &str = "/admin/settings#contentful";

/// Last observed health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
	/// Nothing observed yet
	Unknown,
	/// Last request or probe succeeded
	Healthy,
	/// Last request or probe failed
	Unhealthy,
	/// Credentials are missing
	Unconfigured,
}

/// Point-in-time copy of the connection state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSnapshot {
	pub health: Health,
	pub last_checked: Option<DateTime<Utc>>,
	pub last_error: Option<String>,
	pub refresh_count: u64,
}

/// Kind of banner the site shows for the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
	Configuration,
	Connectivity,
}

/// Banner describing a connection problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionWarning {
	pub kind: WarningKind,
	pub message: String,
	/// Link to the page where the problem can be fixed
	pub help_url: Option<String>,
	/// Blocking warnings stay until the problem is fixed
	pub blocking: bool,
}

#[derive(Debug)]
struct StateInner {
	health: Health,
	last_checked: Option<DateTime<Utc>>,
	last_error: Option<String>,
	refresh_count: u64,
}

/// Shared, clonable connection state
///
/// # Examples
///
/// ```
/// use vendsite_contentful::{ConnectionState, Health};
///
/// let state = ConnectionState::new();
/// assert_eq!(state.snapshot().health, Health::Unknown);
///
/// state.record_failure("connection refused");
/// assert!(!state.is_initialized());
/// assert!(state.warning().is_some());
///
/// state.record_success();
/// assert!(state.is_initialized());
/// assert!(state.warning().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionState {
	inner: Arc<RwLock<StateInner>>,
}

impl ConnectionState {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(RwLock::new(StateInner {
				health: Health::Unknown,
				last_checked: None,
				last_error: None,
				refresh_count: 0,
			})),
		}
	}

	pub fn record_success(&self) {
		let mut inner = self.inner.write();
		inner.health = Health::Healthy;
		inner.last_checked = Some(Utc::now());
		inner.last_error = None;
	}

	pub fn record_failure(&self, message: impl Into<String>) {
		let mut inner = self.inner.write();
		inner.health = Health::Unhealthy;
		inner.last_checked = Some(Utc::now());
		inner.last_error = Some(message.into());
	}

	pub fn mark_unconfigured(&self, message: impl Into<String>) {
		let mut inner = self.inner.write();
		inner.health = Health::Unconfigured;
		inner.last_checked = Some(Utc::now());
		inner.last_error = Some(message.into());
	}

	/// Forget earlier observations; the refresh count is kept
	pub fn reset(&self) {
		let mut inner = self.inner.write();
		inner.health = Health::Unknown;
		inner.last_checked = None;
		inner.last_error = None;
	}

	pub fn record_refresh(&self) {
		self.inner.write().refresh_count += 1;
	}

	/// Whether the last observation was a healthy connection
	pub fn is_initialized(&self) -> bool {
		self.inner.read().health == Health::Healthy
	}

	pub fn health(&self) -> Health {
		self.inner.read().health
	}

	pub fn refresh_count(&self) -> u64 {
		self.inner.read().refresh_count
	}

	pub fn snapshot(&self) -> ConnectionSnapshot {
		let inner = self.inner.read();
		ConnectionSnapshot {
			health: inner.health,
			last_checked: inner.last_checked,
			last_error: inner.last_error.clone(),
			refresh_count: inner.refresh_count,
		}
	}

	/// Banner to show for the current state, if any
	pub fn warning(&self) -> Option<ConnectionWarning> {
		let inner = self.inner.read();
		match inner.health {
			Health::Unconfigured => Some(ConnectionWarning {
				kind: WarningKind::Configuration,
				message: inner
					.last_error
					.clone()
					.unwrap_or_else(|| "Contentful credentials are not configured".to_string()),
				help_url: Some(SETTINGS_HELP_PATH.to_string()),
				blocking: true,
			}),
			Health::Unhealthy => Some(ConnectionWarning {
				kind: WarningKind::Connectivity,
				message: format!(
					"Showing cached or sample content: {}",
					inner.last_error.as_deref().unwrap_or("CMS unreachable")
				),
				help_url: None,
				blocking: false,
			}),
			Health::Unknown | Health::Healthy => None,
		}
	}
}

impl Default for ConnectionState {
	fn default() -> Self {
		Self::new()
	}
}
