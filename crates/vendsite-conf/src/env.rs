//! Environment variable handling
//!
//! Reads typed values from the process environment or from an explicit
//! key/value map, with optional key prefixing.

use indexmap::IndexMap;
use std::env;
use std::path::Path;

/// Where [`Env`] looks values up
#[derive(Debug, Clone)]
enum EnvSource {
	/// The process environment
	Process,
	/// A fixed map, used by tests and embedders that already hold their configuration
	Map(IndexMap<String, String>),
}

/// Environment variable reader with prefix support
#[derive(Debug, Clone)]
pub struct Env {
	/// Optional prefix for environment variables (e.g., "CONTENTFUL_")
	pub prefix: Option<String>,

	source: EnvSource,
}

impl Env {
	/// Create an Env reading from the process environment
	pub fn new() -> Self {
		Self {
			prefix: None,
			source: EnvSource::Process,
		}
	}

	/// Create an Env reading from a fixed set of variables
	///
	/// # Examples
	///
	/// ```
	/// use vendsite_conf::env::Env;
	///
	/// let env = Env::from_pairs([("CONTENTFUL_SPACE_ID", "abc123")]).with_prefix("CONTENTFUL_");
	/// assert_eq!(env.str("SPACE_ID").unwrap(), "abc123");
	/// ```
	pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			prefix: None,
			source: EnvSource::Map(
				pairs
					.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	/// Set a prefix for all environment variable lookups
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	/// Get the full key name with prefix
	pub fn key_name(&self, key: &str) -> String {
		match &self.prefix {
			Some(prefix) => format!("{}{}", prefix, key),
			None => key.to_string(),
		}
	}

	fn lookup(&self, full_key: &str) -> Option<String> {
		match &self.source {
			EnvSource::Process => env::var(full_key).ok(),
			EnvSource::Map(map) => map.get(full_key).cloned(),
		}
	}

	/// Read an optional string value; blank values count as absent
	pub fn opt_str(&self, key: &str) -> Result<Option<String>, EnvError> {
		let full_key = self.key_name(key);
		validate_env_var_name(&full_key)?;

		Ok(self
			.lookup(&full_key)
			.map(|v| v.trim().to_string())
			.filter(|v| !v.is_empty()))
	}

	/// Read a string value from environment
	pub fn str(&self, key: &str) -> Result<String, EnvError> {
		self.opt_str(key)?
			.ok_or_else(|| EnvError::MissingVariable(self.key_name(key)))
	}

	/// Read a string value with a default
	pub fn str_with_default(&self, key: &str, default: &str) -> Result<String, EnvError> {
		Ok(self.opt_str(key)?.unwrap_or_else(|| default.to_string()))
	}

	/// Read a boolean value with a default
	pub fn bool_with_default(&self, key: &str, default: bool) -> Result<bool, EnvError> {
		let full_key = self.key_name(key);
		match self.opt_str(key)? {
			Some(val) => parse_bool(&val).map_err(|e| EnvError::ParseError {
				key: full_key,
				value_len: val.len(),
				error: e,
			}),
			None => Ok(default),
		}
	}

	/// Read an unsigned integer value with a default
	pub fn u64_with_default(&self, key: &str, default: u64) -> Result<u64, EnvError> {
		let full_key = self.key_name(key);
		match self.opt_str(key)? {
			Some(val) => val.parse::<u64>().map_err(|e| EnvError::ParseError {
				key: full_key,
				value_len: val.len(),
				error: e.to_string(),
			}),
			None => Ok(default),
		}
	}
}

impl Default for Env {
	fn default() -> Self {
		Self::new()
	}
}

/// Parse a boolean the way `.env` files usually spell them
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		_ => Err("expected true/false/yes/no/on/off/1/0".to_string()),
	}
}

/// Load a `.env` file into the process environment
///
/// Missing files are not an error; returns whether a file was loaded.
pub fn load_dotenv(path: Option<&Path>) -> bool {
	let result = match path {
		Some(path) => dotenv::from_path(path).map(|_| path.to_path_buf()),
		None => dotenv::dotenv(),
	};

	match result {
		Ok(loaded) => {
			tracing::debug!(path = %loaded.display(), "loaded .env file");
			true
		}
		Err(e) => {
			tracing::debug!(error = %e, "no .env file loaded");
			false
		}
	}
}

/// Validates an environment variable name.
///
/// Rejects names that are empty, contain control characters, or contain
/// the `=` character (which is used as the key-value separator).
pub fn validate_env_var_name(name: &str) -> Result<(), EnvError> {
	if name.is_empty() {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not be empty".to_string(),
		});
	}

	if let Some(pos) = name.find(|c: char| c.is_control()) {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: format!(
				"environment variable name contains control character at position {}",
				pos
			),
		});
	}

	if name.contains('=') {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not contain '='".to_string(),
		});
	}

	Ok(())
}

/// Environment variable errors
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
	#[error("Missing environment variable: {0}")]
	MissingVariable(String),

	#[error("Failed to parse environment variable '{key}' (value length: {value_len}): {error}")]
	ParseError {
		key: String,
		/// Length of the original value, never the value itself (tokens live here)
		value_len: usize,
		error: String,
	},

	#[error("Invalid environment variable name '{name}': {reason}")]
	InvalidVariableName { name: String, reason: String },
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;

	#[rstest]
	#[serial]
	fn test_env_reads_process_environment() {
		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			env::set_var("VENDSITE_TEST_STR", "hello");
		}
		let env = Env::new().with_prefix("VENDSITE_");
		assert_eq!(env.str("TEST_STR").unwrap(), "hello");
		// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			env::remove_var("VENDSITE_TEST_STR");
		}
	}

	#[rstest]
	fn test_blank_value_counts_as_missing() {
		// Arrange
		let env = Env::from_pairs([("SPACE", "   ")]);

		// Act
		let value = env.opt_str("SPACE").unwrap();

		// Assert
		assert_eq!(value, None);
		assert!(matches!(
			env.str("SPACE").unwrap_err(),
			EnvError::MissingVariable(name) if name == "SPACE"
		));
	}

	#[rstest]
	fn test_str_with_default() {
		let env = Env::from_pairs(Vec::<(String, String)>::new());
		assert_eq!(
			env.str_with_default("ENVIRONMENT", "master").unwrap(),
			"master"
		);
	}

	#[rstest]
	#[case("true", true)]
	#[case("1", true)]
	#[case("YES", true)]
	#[case("off", false)]
	#[case("0", false)]
	fn test_bool_values(#[case] raw: &str, #[case] expected: bool) {
		let env = Env::from_pairs([("FLAG", raw)]);
		assert_eq!(env.bool_with_default("FLAG", !expected).unwrap(), expected);
	}

	#[rstest]
	fn test_bool_parse_error_does_not_leak_value() {
		// Arrange
		let env = Env::from_pairs([("FLAG", "maybe-secret")]);

		// Act
		let err = env.bool_with_default("FLAG", false).unwrap_err();
		let message = err.to_string();

		// Assert
		assert!(message.contains("value length: 12"));
		assert!(!message.contains("maybe-secret"));
	}

	#[rstest]
	#[case("hunter2")]
	#[case("  Sk-Live-Token ")]
	fn test_parse_bool_error_names_accepted_words_only(#[case] raw: &str) {
		let message = parse_bool(raw).unwrap_err();

		assert_eq!(message, "expected true/false/yes/no/on/off/1/0");
		assert!(!message.contains(raw.trim()));
		assert!(!message.to_lowercase().contains(&raw.trim().to_lowercase()));
	}

	#[rstest]
	fn test_u64_with_default() {
		let env = Env::from_pairs([("TIMEOUT_SECS", "15")]).with_prefix("");
		assert_eq!(env.u64_with_default("TIMEOUT_SECS", 10).unwrap(), 15);
		assert_eq!(env.u64_with_default("MISSING", 10).unwrap(), 10);
	}

	#[rstest]
	fn test_env_rejects_empty_key_name() {
		// Arrange
		let env = Env::new();

		// Act
		let result = env.str("");

		// Assert
		assert!(matches!(
			result.unwrap_err(),
			EnvError::InvalidVariableName { .. }
		));
	}

	#[rstest]
	fn test_validate_env_var_name_rejects_equals_sign() {
		let err = validate_env_var_name("MY=VAR").unwrap_err();
		match err {
			EnvError::InvalidVariableName { reason, .. } => assert!(reason.contains("'='")),
			_ => panic!("Expected InvalidVariableName error"),
		}
	}

	#[rstest]
	fn test_load_dotenv_missing_file_is_not_an_error() {
		let dir = tempfile::TempDir::new().unwrap();
		assert!(!load_dotenv(Some(&dir.path().join("absent.env"))));
	}

	proptest::proptest! {
		#[test]
		fn prop_parse_bool_ignores_case_and_padding(
			word in proptest::sample::select(vec!["true", "false", "yes", "no", "on", "off"]),
			upper in proptest::bool::ANY,
			pad in "[ \t]{0,3}",
		) {
			let spelled = if upper { word.to_ascii_uppercase() } else { word.to_string() };
			let padded = format!("{}{}{}", pad, spelled, pad);

			proptest::prop_assert_eq!(parse_bool(&padded), parse_bool(word));
		}

		#[test]
		fn prop_names_without_separator_or_controls_are_valid(name in "[A-Za-z_][A-Za-z0-9_]{0,30}") {
			proptest::prop_assert!(validate_env_var_name(&name).is_ok());
		}
	}
}
