//! Entry query builder
//!
//! Mirrors the parameters of the Content Delivery API `entries` endpoint:
//! `content_type`, `fields.<name>` filters, `order`, `limit`/`skip`,
//! `include` and `locale`.

use crate::error::{ContentfulError, ContentfulResult};

/// Maximum link-resolution depth accepted by the API
pub const MAX_INCLUDE_DEPTH: u8 = 10;

/// Maximum page size accepted by the API
pub const MAX_LIMIT: u32 = 1000;

/// A query against the `entries` endpoint
///
/// # Examples
///
/// ```
/// use vendsite_contentful::EntryQuery;
///
/// let query = EntryQuery::new()
///     .content_type("businessGoal")
///     .field_eq("slug", "expand-footprint")
///     .include(2)
///     .limit(1);
///
/// let params = query.params();
/// assert!(params.contains(&("content_type".to_string(), "businessGoal".to_string())));
/// assert!(params.contains(&("fields.slug".to_string(), "expand-footprint".to_string())));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EntryQuery {
	content_type: Option<String>,
	filters: Vec<(String, String)>,
	order: Vec<String>,
	limit: Option<u32>,
	skip: Option<u32>,
	include: Option<u8>,
	locale: Option<String>,
}

impl EntryQuery {
	pub fn new() -> Self {
		Self::default()
	}

	/// Restrict to one content type (required for `fields.*` filters)
	pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = Some(content_type.into());
		self
	}

	/// `fields.<name>=<value>`
	pub fn field_eq(mut self, field: &str, value: impl Into<String>) -> Self {
		self.filters
			.push((format!("fields.{}", field), value.into()));
		self
	}

	/// `fields.<name>[in]=a,b,c`
	pub fn field_in<I, S>(mut self, field: &str, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let joined = values
			.into_iter()
			.map(Into::into)
			.collect::<Vec<String>>()
			.join(",");
		self.filters
			.push((format!("fields.{}[in]", field), joined));
		self
	}

	/// `sys.<name>=<value>`
	pub fn sys_eq(mut self, field: &str, value: impl Into<String>) -> Self {
		self.filters.push((format!("sys.{}", field), value.into()));
		self
	}

	/// Ascending order on a field path such as `fields.displayOrder` or `sys.createdAt`
	pub fn order(mut self, path: impl Into<String>) -> Self {
		self.order.push(path.into());
		self
	}

	/// Descending order on a field path
	pub fn order_desc(mut self, path: impl Into<String>) -> Self {
		self.order.push(format!("-{}", path.into()));
		self
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit.min(MAX_LIMIT));
		self
	}

	pub fn skip(mut self, skip: u32) -> Self {
		self.skip = Some(skip);
		self
	}

	/// Link-resolution depth, clamped to [`MAX_INCLUDE_DEPTH`]
	pub fn include(mut self, depth: u8) -> Self {
		self.include = Some(depth.min(MAX_INCLUDE_DEPTH));
		self
	}

	pub fn locale(mut self, locale: impl Into<String>) -> Self {
		self.locale = Some(locale.into());
		self
	}

	pub fn content_type_id(&self) -> Option<&str> {
		self.content_type.as_deref()
	}

	/// Reject queries the API would refuse
	pub fn validate(&self) -> ContentfulResult<()> {
		let uses_fields = self.filters.iter().any(|(k, _)| k.starts_with("fields."))
			|| self
				.order
				.iter()
				.any(|o| o.trim_start_matches('-').starts_with("fields."));

		if uses_fields && self.content_type.is_none() {
			return Err(ContentfulError::InvalidQuery(
				"filtering or ordering on fields.* requires a content_type".to_string(),
			));
		}

		if let Some((key, _)) = self.filters.iter().find(|(_, v)| v.is_empty()) {
			return Err(ContentfulError::InvalidQuery(format!(
				"filter '{}' has an empty value",
				key
			)));
		}

		Ok(())
	}

	/// Query-string parameters in a stable order
	pub fn params(&self) -> Vec<(String, String)> {
		let mut params = Vec::new();
		if let Some(ct) = &self.content_type {
			params.push(("content_type".to_string(), ct.clone()));
		}
		params.extend(self.filters.iter().cloned());
		if !self.order.is_empty() {
			params.push(("order".to_string(), self.order.join(",")));
		}
		if let Some(limit) = self.limit {
			params.push(("limit".to_string(), limit.to_string()));
		}
		if let Some(skip) = self.skip {
			params.push(("skip".to_string(), skip.to_string()));
		}
		if let Some(include) = self.include {
			params.push(("include".to_string(), include.to_string()));
		}
		if let Some(locale) = &self.locale {
			params.push(("locale".to_string(), locale.clone()));
		}
		params
	}

	/// Key identifying this query in a result cache
	///
	/// Filter order does not matter; two queries with the same parameters
	/// share a key.
	pub fn cache_key(&self) -> String {
		let mut params = self.params();
		params.sort();
		params
			.iter()
			.map(|(k, v)| format!("{}={}", k, v))
			.collect::<Vec<_>>()
			.join("&")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_params_render_every_clause() {
		// Arrange
		let query = EntryQuery::new()
			.content_type("machine")
			.field_eq("featured", "true")
			.field_in("type", ["vending", "smart-fridge"])
			.order_desc("sys.createdAt")
			.order("fields.title")
			.limit(20)
			.skip(40)
			.include(2)
			.locale("en-US");

		// Act
		let params = query.params();

		// Assert
		assert_eq!(
			params,
			vec![
				("content_type".to_string(), "machine".to_string()),
				("fields.featured".to_string(), "true".to_string()),
				(
					"fields.type[in]".to_string(),
					"vending,smart-fridge".to_string()
				),
				(
					"order".to_string(),
					"-sys.createdAt,fields.title".to_string()
				),
				("limit".to_string(), "20".to_string()),
				("skip".to_string(), "40".to_string()),
				("include".to_string(), "2".to_string()),
				("locale".to_string(), "en-US".to_string()),
			]
		);
	}

	#[rstest]
	fn test_include_and_limit_are_clamped() {
		let params = EntryQuery::new().include(50).limit(5000).params();

		assert!(params.contains(&("include".to_string(), "10".to_string())));
		assert!(params.contains(&("limit".to_string(), "1000".to_string())));
	}

	#[rstest]
	fn test_field_filter_requires_content_type() {
		let result = EntryQuery::new().field_eq("slug", "x").validate();

		assert!(matches!(result, Err(ContentfulError::InvalidQuery(_))));
	}

	#[rstest]
	fn test_field_order_requires_content_type() {
		let result = EntryQuery::new().order_desc("fields.publishDate").validate();

		assert!(matches!(result, Err(ContentfulError::InvalidQuery(_))));
	}

	#[rstest]
	fn test_empty_filter_value_is_rejected() {
		let result = EntryQuery::new()
			.content_type("businessGoal")
			.field_eq("slug", "")
			.validate();

		assert!(matches!(result, Err(ContentfulError::InvalidQuery(msg)) if msg.contains("fields.slug")));
	}

	#[rstest]
	fn test_cache_key_ignores_filter_order() {
		let a = EntryQuery::new()
			.content_type("machine")
			.field_eq("featured", "true")
			.field_eq("type", "vending");
		let b = EntryQuery::new()
			.content_type("machine")
			.field_eq("type", "vending")
			.field_eq("featured", "true");

		assert_eq!(a.cache_key(), b.cache_key());
		assert_ne!(a.cache_key(), a.clone().limit(1).cache_key());
	}
}
