//! Connection health monitor
//!
//! Keeps the client usable across a session: re-tests the connection after
//! navigation (throttled) and on a fixed heartbeat, and refreshes the client
//! when a test fails. Failures are logged and retried on the next tick;
//! nothing here surfaces an error to the caller.

use crate::handle::ConnectionReport;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Minimum time between navigation-triggered checks
pub const DEFAULT_ROUTE_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Heartbeat period
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(120);

/// What the monitor needs from a client
#[async_trait]
pub trait HealthCheck: Send + Sync {
	/// Whether there is anything to check at all
	fn is_configured(&self) -> bool;

	/// Probe the CMS; must not fail
	async fn test_connection(&self) -> ConnectionReport;

	/// Rebuild the client; returns whether a new client is in place
	async fn refresh(&self) -> bool;
}

/// Monitor timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
	pub route_check_interval: Duration,
	pub heartbeat_interval: Duration,
}

impl Default for MonitorConfig {
	fn default() -> Self {
		Self {
			route_check_interval: DEFAULT_ROUTE_CHECK_INTERVAL,
			heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
		}
	}
}

struct MonitorInner {
	probe: Arc<dyn HealthCheck>,
	config: MonitorConfig,
	last_check: Mutex<Option<Instant>>,
	checks: AtomicU64,
	refreshes: AtomicU64,
}

/// Connection monitor
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use vendsite_conf::ContentfulSettings;
/// use vendsite_contentful::{ClientHandle, ConnectionMonitor};
///
/// # async fn example() {
/// let handle = ClientHandle::new(ContentfulSettings::from_env().unwrap());
/// let monitor = ConnectionMonitor::new(Arc::new(handle));
///
/// let _heartbeat = monitor.spawn_heartbeat();
/// monitor.on_route_change("/business-goals/expand-footprint").await;
/// # }
/// ```
#[derive(Clone)]
pub struct ConnectionMonitor {
	inner: Arc<MonitorInner>,
}

impl ConnectionMonitor {
	pub fn new(probe: Arc<dyn HealthCheck>) -> Self {
		Self::with_config(probe, MonitorConfig::default())
	}

	pub fn with_config(probe: Arc<dyn HealthCheck>, config: MonitorConfig) -> Self {
		Self {
			inner: Arc::new(MonitorInner {
				probe,
				config,
				last_check: Mutex::new(None),
				checks: AtomicU64::new(0),
				refreshes: AtomicU64::new(0),
			}),
		}
	}

	pub fn config(&self) -> MonitorConfig {
		self.inner.config
	}

	/// Number of probes issued so far
	pub fn check_count(&self) -> u64 {
		self.inner.checks.load(Ordering::Relaxed)
	}

	/// Number of refreshes triggered by failed probes
	pub fn refresh_count(&self) -> u64 {
		self.inner.refreshes.load(Ordering::Relaxed)
	}

	/// Probe now; refresh the client if the probe fails
	pub async fn check_now(&self) -> ConnectionReport {
		*self.inner.last_check.lock() = Some(Instant::now());
		self.inner.checks.fetch_add(1, Ordering::Relaxed);

		let report = self.inner.probe.test_connection().await;
		if report.success {
			tracing::debug!(message = %report.message, "contentful connection healthy");
		} else {
			tracing::warn!(message = %report.message, "contentful connection check failed; refreshing client");
			self.inner.refreshes.fetch_add(1, Ordering::Relaxed);
			if !self.inner.probe.refresh().await {
				tracing::warn!("contentful client refresh failed; will retry on next check");
			}
		}
		report
	}

	/// Navigation hook: checks only if the throttle interval has elapsed
	///
	/// Returns whether a check ran.
	pub async fn on_route_change(&self, route: &str) -> bool {
		if !self.inner.probe.is_configured() {
			return false;
		}

		{
			let mut last = self.inner.last_check.lock();
			let due = last.is_none_or(|at| at.elapsed() > self.inner.config.route_check_interval);
			if !due {
				tracing::trace!(route, "skipping connection check; checked recently");
				return false;
			}
			// Claim the slot so concurrent navigations don't stack probes
			*last = Some(Instant::now());
		}

		tracing::debug!(route, "checking contentful connection after navigation");
		self.check_now().await;
		true
	}

	/// Start the heartbeat task
	///
	/// The first beat fires one interval from now. The task stops when the
	/// returned guard is stopped or dropped.
	pub fn spawn_heartbeat(&self) -> MonitorGuard {
		let monitor = self.clone();
		let period = self.inner.config.heartbeat_interval;

		let task = tokio::spawn(async move {
			let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				if !monitor.inner.probe.is_configured() {
					continue;
				}
				monitor.check_now().await;
			}
		});

		MonitorGuard { task: Some(task) }
	}
}

/// Owns the heartbeat task
pub struct MonitorGuard {
	task: Option<JoinHandle<()>>,
}

impl MonitorGuard {
	/// Stop the heartbeat
	pub fn stop(mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}

	pub fn is_running(&self) -> bool {
		self.task.as_ref().is_some_and(|t| !t.is_finished())
	}
}

impl Drop for MonitorGuard {
	fn drop(&mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}
}
