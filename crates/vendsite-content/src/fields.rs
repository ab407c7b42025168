//! Typed access to entry fields
//!
//! [`FieldsView`] is the validation step between raw CMS JSON and the
//! view-models. Accessors are strict about the shape of a field (a number
//! where text is expected is an [`TransformError::InvalidField`]) and
//! lenient about absence (missing and `null` read as "not set").

use crate::error::TransformError;
use crate::models::Spec;
use crate::richtext::RichText;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value as JsonValue};
use vendsite_contentful::Entry;

/// Validated view over an entry's `fields`
#[derive(Debug, Clone, Copy)]
pub struct FieldsView<'a> {
	entry: &'a Entry,
	map: &'a Map<String, JsonValue>,
}

impl<'a> FieldsView<'a> {
	/// Fails with [`TransformError::MissingFields`] when `fields` is absent
	/// or not an object
	pub fn from_entry(entry: &'a Entry) -> Result<Self, TransformError> {
		let map = entry
			.fields_map()
			.ok_or_else(|| TransformError::MissingFields {
				id: entry.id().to_string(),
			})?;
		Ok(Self { entry, map })
	}

	/// Entry id, for error messages and view-model ids
	pub fn id(&self) -> &'a str {
		self.entry.id()
	}

	/// The entry the fields belong to
	pub fn entry(&self) -> &'a Entry {
		self.entry
	}

	/// Raw value; `null` reads as absent
	pub fn json(&self, name: &str) -> Option<&'a JsonValue> {
		self.map.get(name).filter(|v| !v.is_null())
	}

	fn invalid(&self, field: &str, expected: &'static str) -> TransformError {
		TransformError::InvalidField {
			id: self.id().to_string(),
			field: field.to_string(),
			expected,
		}
	}

	/// Text field; blank strings read as absent
	pub fn text(&self, name: &str) -> Result<Option<String>, TransformError> {
		match self.json(name) {
			None => Ok(None),
			Some(JsonValue::String(s)) => {
				let trimmed = s.trim();
				Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
			}
			Some(_) => Err(self.invalid(name, "text")),
		}
	}

	pub fn text_or_default(&self, name: &str) -> Result<String, TransformError> {
		Ok(self.text(name)?.unwrap_or_default())
	}

	/// First of several field names that holds text
	pub fn first_text(&self, names: &[&str]) -> Result<Option<String>, TransformError> {
		for name in names {
			if let Some(text) = self.text(name)? {
				return Ok(Some(text));
			}
		}
		Ok(None)
	}

	/// Text or rich text, flattened to plain text
	pub fn prose(&self, name: &str) -> Result<Option<String>, TransformError> {
		match self.json(name) {
			Some(value @ JsonValue::Object(_)) => RichText::parse(value)
				.map(|doc| Some(doc.to_plain_text()).filter(|text| !text.is_empty()))
				.ok_or_else(|| self.invalid(name, "text or rich text")),
			_ => self.text(name),
		}
	}

	/// Rich-text document; a plain string is read as paragraphs
	pub fn rich_text(&self, name: &str) -> Result<Option<RichText>, TransformError> {
		match self.json(name) {
			None => Ok(None),
			Some(JsonValue::String(s)) => Ok(Some(RichText::from_plain_text(s))),
			Some(value) => RichText::parse(value)
				.map(Some)
				.ok_or_else(|| self.invalid(name, "rich text")),
		}
	}

	/// Integer field; numeric strings are accepted
	pub fn i64_or(&self, name: &str, default: i64) -> Result<i64, TransformError> {
		match self.json(name) {
			None => Ok(default),
			Some(JsonValue::Number(n)) => n
				.as_i64()
				.or_else(|| n.as_f64().map(|f| f.round() as i64))
				.ok_or_else(|| self.invalid(name, "an integer")),
			Some(JsonValue::String(s)) => s
				.trim()
				.parse::<i64>()
				.map_err(|_| self.invalid(name, "an integer")),
			Some(_) => Err(self.invalid(name, "an integer")),
		}
	}

	/// Boolean field; `"true"`/`"false"` strings are accepted
	pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, TransformError> {
		match self.json(name) {
			None => Ok(default),
			Some(JsonValue::Bool(b)) => Ok(*b),
			Some(JsonValue::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
				"true" | "yes" | "1" => Ok(true),
				"false" | "no" | "0" => Ok(false),
				_ => Err(self.invalid(name, "a boolean")),
			},
			Some(_) => Err(self.invalid(name, "a boolean")),
		}
	}

	/// List of strings; non-string items and blanks are skipped, a single
	/// string is a one-item list
	pub fn string_list(&self, name: &str) -> Result<Vec<String>, TransformError> {
		match self.json(name) {
			None => Ok(Vec::new()),
			Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(Vec::new()),
			Some(JsonValue::String(s)) => Ok(vec![s.trim().to_string()]),
			Some(JsonValue::Array(items)) => Ok(items
				.iter()
				.filter_map(JsonValue::as_str)
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(str::to_string)
				.collect()),
			Some(_) => Err(self.invalid(name, "a list of text")),
		}
	}

	/// Array of links or embedded records
	pub fn links(&self, name: &str) -> Result<&'a [JsonValue], TransformError> {
		match self.json(name) {
			None => Ok(&[][..]),
			Some(JsonValue::Array(items)) => Ok(items.as_slice()),
			Some(_) => Err(self.invalid(name, "a list of links")),
		}
	}

	/// Single link or embedded record
	pub fn link(&self, name: &str) -> Result<Option<&'a JsonValue>, TransformError> {
		match self.json(name) {
			None => Ok(None),
			Some(value @ JsonValue::Object(_)) => Ok(Some(value)),
			Some(_) => Err(self.invalid(name, "a link")),
		}
	}

	/// Date or date-time; date-only values are read as midnight UTC
	pub fn date(&self, name: &str) -> Result<Option<DateTime<Utc>>, TransformError> {
		let Some(text) = self.text(name)? else {
			return Ok(None);
		};
		if let Ok(parsed) = DateTime::parse_from_rfc3339(&text) {
			return Ok(Some(parsed.with_timezone(&Utc)));
		}
		// The web app writes dates without seconds or offset
		if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M") {
			return Ok(Some(naive.and_utc()));
		}
		NaiveDate::parse_from_str(&text, "%Y-%m-%d")
			.ok()
			.and_then(|d| d.and_hms_opt(0, 0, 0))
			.map(|dt| Some(dt.and_utc()))
			.ok_or_else(|| self.invalid(name, "a date"))
	}

	/// Specifications from either an object (`{"Capacity": "400"}`) or a
	/// list of `{"label", "value"}` pairs
	pub fn specs(&self, name: &str) -> Result<Vec<Spec>, TransformError> {
		match self.json(name) {
			None => Ok(Vec::new()),
			Some(JsonValue::Object(map)) => Ok(map
				.iter()
				.filter_map(|(label, value)| spec(label, value))
				.collect()),
			Some(JsonValue::Array(items)) => Ok(items
				.iter()
				.filter_map(|item| {
					let label = item.get("label").or_else(|| item.get("name"))?.as_str()?;
					spec(label, item.get("value")?)
				})
				.collect()),
			Some(_) => Err(self.invalid(name, "specifications")),
		}
	}
}

fn spec(label: &str, value: &JsonValue) -> Option<Spec> {
	let value = match value {
		JsonValue::String(s) => s.trim().to_string(),
		JsonValue::Number(n) => n.to_string(),
		JsonValue::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
		_ => return None,
	};
	let label = label.trim();
	(!label.is_empty() && !value.is_empty()).then(|| Spec {
		label: label.to_string(),
		value,
	})
}
