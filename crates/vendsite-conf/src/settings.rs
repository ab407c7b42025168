//! Contentful delivery settings
//!
//! Everything the content layer needs to reach a Contentful space, plus the
//! knobs for caching, retries and fallback behavior.

use crate::env::{Env, EnvError};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Environment variable prefix for all Contentful settings
pub const ENV_PREFIX: &str = "CONTENTFUL_";

/// Default Contentful environment
pub const DEFAULT_ENVIRONMENT: &str = "master";

/// Default Content Delivery API host
pub const DEFAULT_HOST: &str = "cdn.contentful.com";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default query cache TTL in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default number of attempts per query (first try included)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Values shipped in `.env.example` files that must not count as credentials
const PLACEHOLDERS: &[&str] = &[
	"your_space_id",
	"your-space-id",
	"your_access_token",
	"your-access-token",
	"your_delivery_token",
	"your-delivery-token",
	"changeme",
	"undefined",
	"null",
];

fn is_placeholder(value: &str) -> bool {
	let lowered = value.trim().to_ascii_lowercase();
	lowered.is_empty() || PLACEHOLDERS.contains(&lowered.as_str())
}

/// Settings for the Contentful Content Delivery API
pub struct ContentfulSettings {
	/// Space identifier
	pub space_id: Option<String>,

	delivery_token: Option<SecretString>,

	/// Environment identifier (default: "master")
	pub environment: String,

	/// Base URL of the delivery API, scheme included
	pub base_url: String,

	/// Per-request timeout
	pub timeout: Duration,

	/// How long query results stay cached
	pub cache_ttl: Duration,

	/// Attempts per query, first try included
	pub max_attempts: u32,

	/// Substitute fallback data when a query returns zero entries
	pub fallback_on_empty: bool,

	/// Substitute fallback data when a query fails after retries
	pub fallback_on_error: bool,
}

impl ContentfulSettings {
	/// Start building settings by hand
	///
	/// # Examples
	///
	/// ```
	/// use vendsite_conf::ContentfulSettings;
	///
	/// let settings = ContentfulSettings::builder()
	///     .space_id("abc123")
	///     .delivery_token("token")
	///     .build();
	///
	/// assert!(settings.is_configured());
	/// assert_eq!(settings.environment, "master");
	/// ```
	pub fn builder() -> ContentfulSettingsBuilder {
		ContentfulSettingsBuilder::default()
	}

	/// Read settings from the process environment (`CONTENTFUL_*`)
	pub fn from_env() -> Result<Self, EnvError> {
		Self::from_env_with(&Env::new().with_prefix(ENV_PREFIX))
	}

	/// Load a `.env` file (if any) and then read the process environment
	pub fn load() -> Result<Self, EnvError> {
		crate::env::load_dotenv(None);
		Self::from_env()
	}

	/// Read settings through an explicit [`Env`]
	///
	/// Missing credentials are not an error here; they make
	/// [`is_configured`](Self::is_configured) return `false`.
	pub fn from_env_with(env: &Env) -> Result<Self, EnvError> {
		let host = env.str_with_default("HOST", DEFAULT_HOST)?;
		let base_url = if host.starts_with("http://") || host.starts_with("https://") {
			host
		} else {
			format!("https://{}", host)
		};

		let settings = Self {
			space_id: env.opt_str("SPACE_ID")?,
			delivery_token: env.opt_str("DELIVERY_TOKEN")?.map(SecretString::from),
			environment: env.str_with_default("ENVIRONMENT", DEFAULT_ENVIRONMENT)?,
			base_url: base_url.trim_end_matches('/').to_string(),
			timeout: Duration::from_secs(env.u64_with_default("TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
			cache_ttl: Duration::from_secs(
				env.u64_with_default("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
			),
			max_attempts: env
				.u64_with_default("MAX_ATTEMPTS", u64::from(DEFAULT_MAX_ATTEMPTS))?
				.clamp(1, 10) as u32,
			fallback_on_empty: env.bool_with_default("FALLBACK_ON_EMPTY", false)?,
			fallback_on_error: env.bool_with_default("FALLBACK_ON_ERROR", true)?,
		};

		if !settings.is_configured() {
			tracing::warn!(
				missing = ?settings.missing_credentials(),
				"Contentful credentials are not configured; fallback content will be served"
			);
		}

		Ok(settings)
	}

	/// Whether both the space id and delivery token hold real values
	pub fn is_configured(&self) -> bool {
		self.missing_credentials().is_empty()
	}

	/// Names of the credential variables that are missing or placeholders
	pub fn missing_credentials(&self) -> Vec<String> {
		let mut missing = Vec::new();
		if self.space_id.as_deref().is_none_or(is_placeholder) {
			missing.push(format!("{}SPACE_ID", ENV_PREFIX));
		}
		if self
			.delivery_token
			.as_ref()
			.is_none_or(|t| is_placeholder(t.expose_secret()))
		{
			missing.push(format!("{}DELIVERY_TOKEN", ENV_PREFIX));
		}
		missing
	}

	/// The delivery token, if set
	pub fn delivery_token(&self) -> Option<&SecretString> {
		self.delivery_token.as_ref()
	}

	/// Non-secret view of the settings, for diagnostics output
	pub fn summary(&self) -> SettingsSummary {
		SettingsSummary {
			space_id: self.space_id.clone(),
			environment: self.environment.clone(),
			base_url: self.base_url.clone(),
			token_present: self.delivery_token.is_some(),
			configured: self.is_configured(),
			cache_ttl_secs: self.cache_ttl.as_secs(),
			max_attempts: self.max_attempts,
			fallback_on_empty: self.fallback_on_empty,
			fallback_on_error: self.fallback_on_error,
		}
	}
}

impl Clone for ContentfulSettings {
	fn clone(&self) -> Self {
		Self {
			space_id: self.space_id.clone(),
			delivery_token: self
				.delivery_token
				.as_ref()
				.map(|t| SecretString::from(t.expose_secret().to_string())),
			environment: self.environment.clone(),
			base_url: self.base_url.clone(),
			timeout: self.timeout,
			cache_ttl: self.cache_ttl,
			max_attempts: self.max_attempts,
			fallback_on_empty: self.fallback_on_empty,
			fallback_on_error: self.fallback_on_error,
		}
	}
}

impl fmt::Debug for ContentfulSettings {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContentfulSettings")
			.field("space_id", &self.space_id)
			.field("delivery_token", &self.delivery_token.as_ref().map(|_| "[REDACTED]"))
			.field("environment", &self.environment)
			.field("base_url", &self.base_url)
			.field("timeout", &self.timeout)
			.field("cache_ttl", &self.cache_ttl)
			.field("max_attempts", &self.max_attempts)
			.field("fallback_on_empty", &self.fallback_on_empty)
			.field("fallback_on_error", &self.fallback_on_error)
			.finish()
	}
}

impl Default for ContentfulSettings {
	fn default() -> Self {
		ContentfulSettingsBuilder::default().build()
	}
}

/// Redacted settings snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsSummary {
	pub space_id: Option<String>,
	pub environment: String,
	pub base_url: String,
	pub token_present: bool,
	pub configured: bool,
	pub cache_ttl_secs: u64,
	pub max_attempts: u32,
	pub fallback_on_empty: bool,
	pub fallback_on_error: bool,
}

/// Builder for [`ContentfulSettings`]
#[derive(Debug, Clone, Default)]
pub struct ContentfulSettingsBuilder {
	space_id: Option<String>,
	delivery_token: Option<String>,
	environment: Option<String>,
	base_url: Option<String>,
	timeout: Option<Duration>,
	cache_ttl: Option<Duration>,
	max_attempts: Option<u32>,
	fallback_on_empty: bool,
	fallback_on_error: Option<bool>,
}

impl ContentfulSettingsBuilder {
	pub fn space_id(mut self, space_id: impl Into<String>) -> Self {
		self.space_id = Some(space_id.into());
		self
	}

	pub fn delivery_token(mut self, token: impl Into<String>) -> Self {
		self.delivery_token = Some(token.into());
		self
	}

	pub fn environment(mut self, environment: impl Into<String>) -> Self {
		self.environment = Some(environment.into());
		self
	}

	/// Override the API base URL (scheme included), e.g. a mock server
	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());
		self
	}

	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn cache_ttl(mut self, ttl: Duration) -> Self {
		self.cache_ttl = Some(ttl);
		self
	}

	pub fn max_attempts(mut self, attempts: u32) -> Self {
		self.max_attempts = Some(attempts.max(1));
		self
	}

	pub fn fallback_on_empty(mut self, enabled: bool) -> Self {
		self.fallback_on_empty = enabled;
		self
	}

	pub fn fallback_on_error(mut self, enabled: bool) -> Self {
		self.fallback_on_error = Some(enabled);
		self
	}

	pub fn build(self) -> ContentfulSettings {
		ContentfulSettings {
			space_id: self.space_id,
			delivery_token: self.delivery_token.map(SecretString::from),
			environment: self
				.environment
				.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			base_url: self
				.base_url
				.unwrap_or_else(|| format!("https://{}", DEFAULT_HOST))
				.trim_end_matches('/')
				.to_string(),
			timeout: self
				.timeout
				.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
			cache_ttl: self
				.cache_ttl
				.unwrap_or(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
			max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
			fallback_on_empty: self.fallback_on_empty,
			fallback_on_error: self.fallback_on_error.unwrap_or(true),
		}
	}
}
