//! Entry transformers
//!
//! Each view-model implements [`Transform`]: check the content type,
//! validate the fields, resolve assets and nested entries, and build the
//! flat record. A transformer either returns a complete view-model or a
//! [`TransformError`]; it never returns a half-filled record.

use crate::error::TransformError;
use crate::fields::FieldsView;
use crate::models::{
	BlogPost, BusinessGoal, Feature, ImageAsset, Machine, ProductType, Technology,
	TechnologySection, Testimonial, content_types,
};
use crate::richtext::excerpt;
use crate::slugs::normalize;
use serde_json::Value as JsonValue;
use vendsite_contentful::{Asset, Entry, LinkResolver};

/// Excerpt length used when an entry has no explicit summary
pub const EXCERPT_CHARS: usize = 160;

/// Build a view-model from a CMS entry
pub trait Transform: Sized {
	/// Content type id this transformer accepts
	const CONTENT_TYPE: &'static str;

	/// Build the view-model from validated fields
	fn from_fields(fields: &FieldsView<'_>, links: &LinkResolver) -> Result<Self, TransformError>;

	/// Entries without a declared content type are accepted
	fn accepts(entry: &Entry) -> bool {
		entry
			.content_type()
			.is_none_or(|content_type| content_type == Self::CONTENT_TYPE)
	}

	fn transform(entry: &Entry, links: &LinkResolver) -> Result<Self, TransformError> {
		if !Self::accepts(entry) {
			return Err(TransformError::WrongContentType {
				id: entry.id().to_string(),
				expected: Self::CONTENT_TYPE,
				found: entry.content_type().map(str::to_string),
			});
		}
		let fields = FieldsView::from_entry(entry)?;
		Self::from_fields(&fields, links)
	}

	/// Like [`transform`](Self::transform), logging the failure
	///
	/// `None` means "this entry could not be transformed", never "empty".
	fn try_transform(entry: &Entry, links: &LinkResolver) -> Option<Self> {
		match Self::transform(entry, links) {
			Ok(model) => Some(model),
			Err(e) => {
				tracing::warn!(
					content_type = Self::CONTENT_TYPE,
					entry = entry.id(),
					error = %e,
					"skipping entry that failed to transform"
				);
				None
			}
		}
	}

	/// Transform every entry, skipping the ones that fail
	fn transform_all(entries: &[Entry], links: &LinkResolver) -> Vec<Self> {
		entries
			.iter()
			.filter_map(|entry| Self::try_transform(entry, links))
			.collect()
	}
}

/// Turn a delivered asset URL into an absolute https URL
///
/// Contentful serves protocol-relative URLs (`//images.ctfassets.net/...`).
/// Relative paths and other schemes have no usable absolute form and yield
/// `None`.
///
/// # Examples
///
/// ```
/// use vendsite_content::transform::qualify_url;
///
/// assert_eq!(
///     qualify_url("//images.ctfassets.net/a.png").as_deref(),
///     Some("https://images.ctfassets.net/a.png")
/// );
/// assert_eq!(qualify_url("/local.png"), None);
/// ```
pub fn qualify_url(url: &str) -> Option<String> {
	let url = url.trim();
	if let Some(rest) = url.strip_prefix("//") {
		Some(format!("https://{}", rest))
	} else if let Some(rest) = url.strip_prefix("http://") {
		Some(format!("https://{}", rest))
	} else if url.starts_with("https://") {
		Some(url.to_string())
	} else {
		None
	}
}

/// Image view of an asset; `None` when the asset has no usable file
pub fn image_from_asset(asset: &Asset, fallback_alt: &str) -> Option<ImageAsset> {
	let url = qualify_url(asset.raw_url()?)?;
	let alt = [asset.description(), asset.title()]
		.into_iter()
		.flatten()
		.map(str::trim)
		.find(|text| !text.is_empty())
		.unwrap_or(fallback_alt)
		.to_string();
	let (width, height) = asset.dimensions().unwrap_or((None, None));
	Some(ImageAsset {
		id: Some(asset.id().to_string()).filter(|id| !id.is_empty()),
		url,
		alt,
		width,
		height,
	})
}

/// Resolve an image field; missing or unresolvable links yield `None`
pub fn resolve_image(
	value: Option<&JsonValue>,
	links: &LinkResolver,
	fallback_alt: &str,
) -> Option<ImageAsset> {
	let asset = links.resolve_asset(value?)?;
	image_from_asset(&asset, fallback_alt)
}

fn resolve_images(values: &[JsonValue], links: &LinkResolver, fallback_alt: &str) -> Vec<ImageAsset> {
	values
		.iter()
		.filter_map(|value| resolve_image(Some(value), links, fallback_alt))
		.collect()
}

/// Resolve and transform linked entries, dropping the ones that fail
fn nested<T: Transform>(values: &[JsonValue], links: &LinkResolver) -> Vec<T> {
	values
		.iter()
		.filter_map(|value| links.resolve_entry(value))
		.filter_map(|entry| T::try_transform(&entry, links))
		.collect()
}

fn slug_or_title(fields: &FieldsView<'_>, title: &str) -> Result<String, TransformError> {
	Ok(fields
		.text("slug")?
		.unwrap_or_else(|| normalize(title)))
}

fn display_order(fields: &FieldsView<'_>) -> Result<i64, TransformError> {
	match fields.json("displayOrder") {
		Some(_) => fields.i64_or("displayOrder", 0),
		None => fields.i64_or("order", 0),
	}
}

/// Features may be linked `feature` entries or plain strings
fn features(fields: &FieldsView<'_>, links: &LinkResolver) -> Result<Vec<Feature>, TransformError> {
	Ok(fields
		.links("features")?
		.iter()
		.filter_map(|value| match value {
			JsonValue::String(title) if !title.trim().is_empty() => Some(Feature {
				id: None,
				title: title.trim().to_string(),
				description: String::new(),
				icon: None,
			}),
			JsonValue::Object(_) => links
				.resolve_entry(value)
				.and_then(|entry| Feature::try_transform(&entry, links)),
			_ => None,
		})
		.collect())
}

/// Name of a linked record (author, machine) or the plain string itself
fn linked_text(value: &JsonValue, links: &LinkResolver, field: &str) -> Option<String> {
	match value {
		JsonValue::String(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
		JsonValue::Object(_) => {
			let entry = links.resolve_entry(value)?;
			entry
				.fields_map()
				.and_then(|fields| fields.get(field))
				.and_then(JsonValue::as_str)
				.map(|text| text.trim().to_string())
				.filter(|text| !text.is_empty())
				.or_else(|| Some(entry.id().to_string()))
		}
		_ => None,
	}
}

impl Transform for Feature {
	const CONTENT_TYPE: &'static str = content_types::FEATURE;

	fn from_fields(fields: &FieldsView<'_>, _links: &LinkResolver) -> Result<Self, TransformError> {
		Ok(Self {
			id: Some(fields.id().to_string()),
			title: fields.text_or_default("title")?,
			description: fields.prose("description")?.unwrap_or_default(),
			icon: fields.text("icon")?,
		})
	}
}

impl Transform for BusinessGoal {
	const CONTENT_TYPE: &'static str = content_types::BUSINESS_GOAL;

	fn from_fields(fields: &FieldsView<'_>, links: &LinkResolver) -> Result<Self, TransformError> {
		let title = fields.text_or_default("title")?;
		let description = fields.prose("description")?.unwrap_or_default();
		let short_description = fields
			.first_text(&["shortDescription", "summary"])?
			.unwrap_or_else(|| excerpt(&description, EXCERPT_CHARS));
		let recommended_machines = fields
			.links("recommendedMachines")?
			.iter()
			.filter_map(|value| linked_text(value, links, "slug"))
			.collect();

		Ok(Self {
			id: fields.id().to_string(),
			slug: slug_or_title(fields, &title)?,
			short_description,
			description,
			icon: fields.text("icon")?,
			image: resolve_image(fields.link("image")?, links, &title),
			benefits: fields.string_list("benefits")?,
			features: features(fields, links)?,
			recommended_machines,
			display_order: display_order(fields)?,
			visible: fields.bool_or("visible", true)?,
			title,
		})
	}
}

impl Transform for Machine {
	const CONTENT_TYPE: &'static str = content_types::MACHINE;

	fn from_fields(fields: &FieldsView<'_>, links: &LinkResolver) -> Result<Self, TransformError> {
		let title = fields.text_or_default("title")?;
		let mut images = resolve_images(fields.links("images")?, links, &title);
		if images.is_empty() {
			images.extend(resolve_image(fields.link("image")?, links, &title));
		}

		Ok(Self {
			id: fields.id().to_string(),
			slug: slug_or_title(fields, &title)?,
			kind: fields
				.first_text(&["type", "machineType", "category"])?
				.map(|kind| normalize(&kind))
				.unwrap_or_default(),
			temperature: fields.text("temperature")?,
			description: fields.prose("description")?.unwrap_or_default(),
			images,
			specs: fields.specs("specs")?,
			features: fields.string_list("features")?,
			display_order: display_order(fields)?,
			featured: fields.bool_or("featured", false)?,
			visible: fields.bool_or("visible", true)?,
			title,
		})
	}
}

impl Transform for ProductType {
	const CONTENT_TYPE: &'static str = content_types::PRODUCT_TYPE;

	fn from_fields(fields: &FieldsView<'_>, links: &LinkResolver) -> Result<Self, TransformError> {
		let title = fields.text_or_default("title")?;

		Ok(Self {
			id: fields.id().to_string(),
			slug: slug_or_title(fields, &title)?,
			description: fields.prose("description")?.unwrap_or_default(),
			image: resolve_image(fields.link("image")?, links, &title),
			benefits: fields.string_list("benefits")?,
			features: features(fields, links)?,
			recommended_machine_type: fields
				.text("recommendedMachineType")?
				.map(|kind| normalize(&kind)),
			display_order: display_order(fields)?,
			visible: fields.bool_or("visible", true)?,
			title,
		})
	}
}

impl Transform for BlogPost {
	const CONTENT_TYPE: &'static str = content_types::BLOG_POST;

	fn from_fields(fields: &FieldsView<'_>, links: &LinkResolver) -> Result<Self, TransformError> {
		let title = fields.text_or_default("title")?;
		let body = match fields.rich_text("content")? {
			Some(body) => body,
			None => fields.rich_text("body")?.unwrap_or_default(),
		};
		let body_text = body.to_plain_text();
		let excerpt = fields
			.text("excerpt")?
			.unwrap_or_else(|| excerpt(&body_text, EXCERPT_CHARS));
		let published_at = match fields.date("publishDate")? {
			Some(date) => Some(date),
			None => fields.entry().created_at(),
		};

		Ok(Self {
			id: fields.id().to_string(),
			slug: slug_or_title(fields, &title)?,
			excerpt,
			body_html: body.to_html(links),
			reading_minutes: body.reading_minutes(),
			body_text,
			featured_image: resolve_image(fields.link("featuredImage")?, links, &title),
			published_at,
			author: fields
				.json("author")
				.and_then(|author| linked_text(author, links, "name")),
			tags: fields.string_list("tags")?,
			title,
		})
	}
}

impl Transform for Testimonial {
	const CONTENT_TYPE: &'static str = content_types::TESTIMONIAL;

	fn from_fields(fields: &FieldsView<'_>, links: &LinkResolver) -> Result<Self, TransformError> {
		let name = fields
			.first_text(&["name", "author"])?
			.unwrap_or_default();
		let quote = match fields.prose("quote")? {
			Some(quote) => quote,
			None => fields.prose("content")?.unwrap_or_default(),
		};
		let image = match fields.link("image")? {
			Some(image) => resolve_image(Some(image), links, &name),
			None => resolve_image(fields.link("photo")?, links, &name),
		};

		Ok(Self {
			id: fields.id().to_string(),
			title: fields.first_text(&["title", "position", "role"])?,
			company: fields.text("company")?,
			quote,
			rating: fields.i64_or("rating", 5)?.clamp(1, 5) as u8,
			image,
			featured: fields.bool_or("featured", false)?,
			visible: fields.bool_or("visible", true)?,
			name,
		})
	}
}

impl Transform for TechnologySection {
	const CONTENT_TYPE: &'static str = content_types::TECHNOLOGY_SECTION;

	fn from_fields(fields: &FieldsView<'_>, links: &LinkResolver) -> Result<Self, TransformError> {
		let title = fields.text_or_default("title")?;
		let bullets = match fields.json("bullets") {
			Some(_) => fields.string_list("bullets")?,
			None => fields.string_list("points")?,
		};

		Ok(Self {
			description: fields.prose("description")?.unwrap_or_default(),
			image: resolve_image(fields.link("image")?, links, &title),
			bullets,
			title,
		})
	}
}

impl Transform for Technology {
	const CONTENT_TYPE: &'static str = content_types::TECHNOLOGY;

	fn from_fields(fields: &FieldsView<'_>, links: &LinkResolver) -> Result<Self, TransformError> {
		let title = fields.text_or_default("title")?;

		Ok(Self {
			id: fields.id().to_string(),
			slug: slug_or_title(fields, &title)?,
			description: fields.prose("description")?.unwrap_or_default(),
			image: resolve_image(fields.link("image")?, links, &title),
			sections: nested(fields.links("sections")?, links),
			display_order: display_order(fields)?,
			visible: fields.bool_or("visible", true)?,
			title,
		})
	}
}
