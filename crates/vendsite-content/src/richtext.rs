//! Rich-text documents
//!
//! Contentful stores long-form content as a JSON node tree
//! (`{"nodeType": "document", "content": [...]}`). This module parses that
//! tree into [`Node`]s and renders it to HTML or to plain text.

use serde::Serialize;
use serde_json::Value as JsonValue;
use vendsite_contentful::LinkResolver;

/// Reading speed used for reading-time estimates
pub const WORDS_PER_MINUTE: usize = 200;

/// Inline text decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
	Bold,
	Italic,
	Underline,
	Code,
}

impl Mark {
	fn from_type(kind: &str) -> Option<Self> {
		match kind {
			"bold" => Some(Self::Bold),
			"italic" => Some(Self::Italic),
			"underline" => Some(Self::Underline),
			"code" => Some(Self::Code),
			_ => None,
		}
	}

	fn tag(self) -> &'static str {
		match self {
			Self::Bold => "strong",
			Self::Italic => "em",
			Self::Underline => "u",
			Self::Code => "code",
		}
	}
}

/// A rich-text node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
	Paragraph { children: Vec<Node> },
	Heading { level: u8, children: Vec<Node> },
	Text { value: String, marks: Vec<Mark> },
	List { ordered: bool, items: Vec<Node> },
	ListItem { children: Vec<Node> },
	Quote { children: Vec<Node> },
	Rule,
	Hyperlink { uri: String, children: Vec<Node> },
	EmbeddedAsset { id: String },
	EmbeddedEntry { id: String },
	/// Node types this renderer does not know; children are kept
	Other { children: Vec<Node> },
}

impl Node {
	fn parse(value: &JsonValue) -> Option<Self> {
		let kind = value.get("nodeType")?.as_str()?;
		let children = || parse_children(value);
		let target_id = || {
			value
				.pointer("/data/target/sys/id")
				.and_then(JsonValue::as_str)
				.map(str::to_string)
		};

		let node = match kind {
			"text" => Self::Text {
				value: value
					.get("value")
					.and_then(JsonValue::as_str)
					.unwrap_or_default()
					.to_string(),
				marks: value
					.get("marks")
					.and_then(JsonValue::as_array)
					.map(|marks| {
						marks
							.iter()
							.filter_map(|m| m.get("type").and_then(JsonValue::as_str))
							.filter_map(Mark::from_type)
							.collect()
					})
					.unwrap_or_default(),
			},
			"paragraph" => Self::Paragraph {
				children: children(),
			},
			"unordered-list" | "ordered-list" => Self::List {
				ordered: kind == "ordered-list",
				items: children(),
			},
			"list-item" => Self::ListItem {
				children: children(),
			},
			"blockquote" => Self::Quote {
				children: children(),
			},
			"hr" => Self::Rule,
			"hyperlink" => Self::Hyperlink {
				uri: value
					.pointer("/data/uri")
					.and_then(JsonValue::as_str)
					.unwrap_or("#")
					.to_string(),
				children: children(),
			},
			"embedded-asset-block" => Self::EmbeddedAsset { id: target_id()? },
			"embedded-entry-block" | "embedded-entry-inline" | "entry-hyperlink" => {
				Self::EmbeddedEntry { id: target_id()? }
			}
			heading if heading.starts_with("heading-") => Self::Heading {
				level: heading
					.trim_start_matches("heading-")
					.parse::<u8>()
					.unwrap_or(2)
					.clamp(1, 6),
				children: children(),
			},
			_ => Self::Other {
				children: children(),
			},
		};
		Some(node)
	}

	fn render_html(&self, links: &LinkResolver, out: &mut String) {
		match self {
			Self::Text { value, marks } => {
				for mark in marks {
					out.push_str(&format!("<{}>", mark.tag()));
				}
				out.push_str(&escape_html(value));
				for mark in marks.iter().rev() {
					out.push_str(&format!("</{}>", mark.tag()));
				}
			}
			Self::Paragraph { children } => wrap(out, "p", children, links),
			Self::Heading { level, children } => wrap(out, &format!("h{}", level), children, links),
			Self::List { ordered, items } => wrap(out, if *ordered { "ol" } else { "ul" }, items, links),
			Self::ListItem { children } => wrap(out, "li", children, links),
			Self::Quote { children } => wrap(out, "blockquote", children, links),
			Self::Rule => out.push_str("<hr>"),
			Self::Hyperlink { uri, children } => {
				out.push_str(&format!("<a href=\"{}\">", escape_html(uri)));
				for child in children {
					child.render_html(links, out);
				}
				out.push_str("</a>");
			}
			Self::EmbeddedAsset { id } => {
				let image = links
					.asset(id)
					.and_then(|asset| crate::transform::image_from_asset(asset, ""));
				if let Some(image) = image {
					out.push_str(&format!(
						"<img src=\"{}\" alt=\"{}\">",
						escape_html(&image.url),
						escape_html(&image.alt)
					));
				}
			}
			Self::EmbeddedEntry { .. } => {}
			Self::Other { children } => {
				for child in children {
					child.render_html(links, out);
				}
			}
		}
	}

	fn collect_text(&self, blocks: &mut Vec<String>, current: &mut String) {
		match self {
			Self::Text { value, .. } => current.push_str(value),
			Self::Hyperlink { children, .. } | Self::Other { children } => {
				for child in children {
					child.collect_text(blocks, current);
				}
			}
			Self::Paragraph { children }
			| Self::Heading { children, .. }
			| Self::ListItem { children }
			| Self::Quote { children } => {
				flush(blocks, current);
				for child in children {
					child.collect_text(blocks, current);
				}
				flush(blocks, current);
			}
			Self::List { items, .. } => {
				for item in items {
					item.collect_text(blocks, current);
				}
			}
			Self::Rule | Self::EmbeddedAsset { .. } | Self::EmbeddedEntry { .. } => {
				flush(blocks, current)
			}
		}
	}
}

fn parse_children(value: &JsonValue) -> Vec<Node> {
	value
		.get("content")
		.and_then(JsonValue::as_array)
		.map(|nodes| nodes.iter().filter_map(Node::parse).collect())
		.unwrap_or_default()
}

fn wrap(out: &mut String, tag: &str, children: &[Node], links: &LinkResolver) {
	out.push_str(&format!("<{}>", tag));
	for child in children {
		child.render_html(links, out);
	}
	out.push_str(&format!("</{}>", tag));
}

fn flush(blocks: &mut Vec<String>, current: &mut String) {
	let trimmed = current.trim();
	if !trimmed.is_empty() {
		blocks.push(trimmed.to_string());
	}
	current.clear();
}

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

/// A parsed rich-text document
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use vendsite_content::richtext::RichText;
/// use vendsite_contentful::LinkResolver;
///
/// let doc = RichText::parse(&json!({
///     "nodeType": "document",
///     "content": [{
///         "nodeType": "paragraph",
///         "content": [{"nodeType": "text", "value": "Hello", "marks": [{"type": "bold"}]}]
///     }]
/// }))
/// .unwrap();
///
/// assert_eq!(doc.to_html(&LinkResolver::empty()), "<p><strong>Hello</strong></p>");
/// assert_eq!(doc.to_plain_text(), "Hello");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RichText {
	nodes: Vec<Node>,
}

impl RichText {
	/// Parse a document node; `None` if the value is not a rich-text document
	pub fn parse(value: &JsonValue) -> Option<Self> {
		if value.get("nodeType")?.as_str()? != "document" {
			return None;
		}
		Some(Self {
			nodes: parse_children(value),
		})
	}

	/// Treat plain text as a document of paragraphs split on blank lines
	pub fn from_plain_text(text: &str) -> Self {
		let nodes = text
			.split("\n\n")
			.map(str::trim)
			.filter(|p| !p.is_empty())
			.map(|p| Node::Paragraph {
				children: vec![Node::Text {
					value: p.to_string(),
					marks: Vec::new(),
				}],
			})
			.collect();
		Self { nodes }
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn is_empty(&self) -> bool {
		self.to_plain_text().is_empty()
	}

	/// Render to HTML; embedded assets are resolved through `links`
	pub fn to_html(&self, links: &LinkResolver) -> String {
		let mut out = String::new();
		for node in &self.nodes {
			node.render_html(links, &mut out);
		}
		out
	}

	/// Text content with blocks separated by blank lines
	pub fn to_plain_text(&self) -> String {
		let mut blocks = Vec::new();
		let mut current = String::new();
		for node in &self.nodes {
			node.collect_text(&mut blocks, &mut current);
		}
		flush(&mut blocks, &mut current);
		blocks.join("\n\n")
	}

	pub fn word_count(&self) -> usize {
		self.to_plain_text().split_whitespace().count()
	}

	/// Estimated reading time in whole minutes (at least 1 for non-empty text)
	pub fn reading_minutes(&self) -> u32 {
		let words = self.word_count();
		if words == 0 {
			return 0;
		}
		words.div_ceil(WORDS_PER_MINUTE) as u32
	}
}

/// First `max_chars` characters of `text`, cut at a word boundary
///
/// A first word longer than `max_chars` is cut mid-word.
pub fn excerpt(text: &str, max_chars: usize) -> String {
	let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
	if flat.chars().count() <= max_chars {
		return flat;
	}
	let mut cut = String::new();
	let mut len = 0;
	for word in flat.split(' ') {
		let word_len = word.chars().count();
		if len + word_len + 1 > max_chars {
			if cut.is_empty() {
				cut.extend(word.chars().take(max_chars));
			}
			break;
		}
		if !cut.is_empty() {
			cut.push(' ');
			len += 1;
		}
		cut.push_str(word);
		len += word_len;
	}
	format!("{}...", cut.trim_end_matches(['.', ',', ';', ':']))
}
