//! Raw Content Delivery API records
//!
//! Every field the API may omit is an `Option` or defaulted, and a field
//! of the wrong shape decodes as absent. Entry fields stay untyped JSON
//! until a transformer validates them, and records in `items` or
//! `includes` that do not decode at all are skipped. A malformed entry or
//! asset therefore never fails the decoding of the collection it arrived in.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Decode an optional field, treating a value of the wrong shape as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let value = JsonValue::deserialize(deserializer)?;
	Ok(serde_json::from_value(value).ok())
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned + Default,
{
	Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Decode a record list, skipping records that do not decode
fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let JsonValue::Array(values) = JsonValue::deserialize(deserializer)? else {
		return Ok(Vec::new());
	};
	Ok(values
		.into_iter()
		.filter_map(|value| match serde_json::from_value(value) {
			Ok(record) => Some(record),
			Err(error) => {
				tracing::warn!(error = %error, "skipping malformed record");
				None
			}
		})
		.collect())
}

/// `sys` block shared by entries, assets and links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sys {
	/// Record id
	#[serde(default, deserialize_with = "lenient_or_default")]
	pub id: String,

	/// `Entry`, `Asset`, `Link`, `Array`, `Error`, ...
	#[serde(rename = "type", default, deserialize_with = "lenient_or_default")]
	pub kind: String,

	/// Only set on links
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub link_type: Option<String>,

	/// Link to the entry's content type
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub content_type: Option<Box<Link>>,

	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub created_at: Option<DateTime<Utc>>,

	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<DateTime<Utc>>,

	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub locale: Option<String>,

	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub revision: Option<u64>,
}

/// `{ "sys": { "type": "Link", "linkType": "...", "id": "..." } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
	#[serde(default, deserialize_with = "lenient_or_default")]
	pub sys: Sys,
}

impl Link {
	/// Build an entry link
	pub fn entry(id: impl Into<String>) -> Self {
		Self::new("Entry", id)
	}

	/// Build an asset link
	pub fn asset(id: impl Into<String>) -> Self {
		Self::new("Asset", id)
	}

	fn new(link_type: &str, id: impl Into<String>) -> Self {
		Self {
			sys: Sys {
				id: id.into(),
				kind: "Link".to_string(),
				link_type: Some(link_type.to_string()),
				..Sys::default()
			},
		}
	}

	/// Parse a link out of an arbitrary field value
	pub fn from_value(value: &JsonValue) -> Option<Self> {
		let sys = value.get("sys")?;
		let id = sys.get("id")?.as_str()?;
		let link_type = sys
			.get("linkType")
			.and_then(JsonValue::as_str)
			.or_else(|| sys.get("type").and_then(JsonValue::as_str))?;
		Some(Self::new(link_type, id))
	}

	pub fn id(&self) -> &str {
		&self.sys.id
	}

	pub fn link_type(&self) -> Option<&str> {
		self.sys.link_type.as_deref()
	}
}

/// A CMS entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
	#[serde(default, deserialize_with = "lenient_or_default")]
	pub sys: Sys,

	/// Untyped field map; `None` when the payload had no `fields`
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fields: Option<JsonValue>,
}

impl Entry {
	pub fn id(&self) -> &str {
		&self.sys.id
	}

	/// Content type id, e.g. `businessGoal`
	pub fn content_type(&self) -> Option<&str> {
		self.sys.content_type.as_ref().map(|link| link.id())
	}

	/// Field map, if `fields` is present and is an object
	pub fn fields_map(&self) -> Option<&Map<String, JsonValue>> {
		self.fields.as_ref().and_then(JsonValue::as_object)
	}

	pub fn created_at(&self) -> Option<DateTime<Utc>> {
		self.sys.created_at
	}

	pub fn updated_at(&self) -> Option<DateTime<Utc>> {
		self.sys.updated_at
	}
}

/// A media record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
	#[serde(default, deserialize_with = "lenient_or_default")]
	pub sys: Sys,

	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub fields: Option<AssetFields>,
}

impl Asset {
	pub fn id(&self) -> &str {
		&self.sys.id
	}

	/// File URL as delivered (often protocol-relative)
	pub fn raw_url(&self) -> Option<&str> {
		self.fields
			.as_ref()?
			.file
			.as_ref()?
			.url
			.as_deref()
			.filter(|u| !u.is_empty())
	}

	pub fn title(&self) -> Option<&str> {
		self.fields.as_ref()?.title.as_deref()
	}

	pub fn description(&self) -> Option<&str> {
		self.fields.as_ref()?.description.as_deref()
	}

	/// Pixel dimensions, when the asset is an image
	pub fn dimensions(&self) -> Option<(Option<u32>, Option<u32>)> {
		let image = self
			.fields
			.as_ref()?
			.file
			.as_ref()?
			.details
			.as_ref()?
			.image
			.as_ref()?;
		Some((image.width, image.height))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFields {
	#[serde(default, deserialize_with = "lenient")]
	pub title: Option<String>,
	#[serde(default, deserialize_with = "lenient")]
	pub description: Option<String>,
	#[serde(default, deserialize_with = "lenient")]
	pub file: Option<AssetFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFile {
	#[serde(default, deserialize_with = "lenient")]
	pub url: Option<String>,
	#[serde(default, deserialize_with = "lenient")]
	pub file_name: Option<String>,
	#[serde(default, deserialize_with = "lenient")]
	pub content_type: Option<String>,
	#[serde(default, deserialize_with = "lenient")]
	pub details: Option<FileDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDetails {
	#[serde(default, deserialize_with = "lenient")]
	pub size: Option<u64>,
	#[serde(default, deserialize_with = "lenient")]
	pub image: Option<ImageDetails>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetails {
	#[serde(default, deserialize_with = "lenient")]
	pub width: Option<u32>,
	#[serde(default, deserialize_with = "lenient")]
	pub height: Option<u32>,
}

/// Linked records delivered alongside a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Includes {
	#[serde(rename = "Entry", default, deserialize_with = "lenient_records")]
	pub entries: Vec<Entry>,
	#[serde(rename = "Asset", default, deserialize_with = "lenient_records")]
	pub assets: Vec<Asset>,
}

/// Response of the `entries` endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryCollection {
	#[serde(default, deserialize_with = "lenient_or_default")]
	pub total: u64,
	#[serde(default, deserialize_with = "lenient_or_default")]
	pub skip: u64,
	#[serde(default, deserialize_with = "lenient_or_default")]
	pub limit: u64,
	#[serde(default, deserialize_with = "lenient_records")]
	pub items: Vec<Entry>,
	#[serde(default, deserialize_with = "lenient_or_default")]
	pub includes: Includes,
}

impl EntryCollection {
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

/// Error body returned with non-success responses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
	#[serde(default, deserialize_with = "lenient_or_default")]
	pub sys: Sys,
	#[serde(default)]
	pub message: Option<String>,
	#[serde(default)]
	pub request_id: Option<String>,
}
