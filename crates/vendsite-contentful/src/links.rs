//! Link resolution against a collection's `includes`

use crate::entry::{Asset, Entry, EntryCollection, Link};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Index of the entries and assets delivered with a collection
///
/// Field values may hold either a link (`{"sys": {"type": "Link", ...}}`)
/// or an already-resolved record; both forms resolve. Unresolvable links
/// yield `None`, never a dangling reference.
#[derive(Debug, Clone, Default)]
pub struct LinkResolver {
	entries: HashMap<String, Entry>,
	assets: HashMap<String, Asset>,
}

impl LinkResolver {
	/// Resolver with nothing to resolve against
	pub fn empty() -> Self {
		Self::default()
	}

	/// Index items and includes of a collection
	pub fn new(collection: &EntryCollection) -> Self {
		let mut resolver = Self::default();
		for entry in collection
			.items
			.iter()
			.chain(collection.includes.entries.iter())
		{
			resolver
				.entries
				.entry(entry.id().to_string())
				.or_insert_with(|| entry.clone());
		}
		for asset in &collection.includes.assets {
			resolver
				.assets
				.insert(asset.id().to_string(), asset.clone());
		}
		resolver
	}

	/// Add an asset (used when assets are fetched separately)
	pub fn with_asset(mut self, asset: Asset) -> Self {
		self.assets.insert(asset.id().to_string(), asset);
		self
	}

	/// Add an entry
	pub fn with_entry(mut self, entry: Entry) -> Self {
		self.entries.insert(entry.id().to_string(), entry);
		self
	}

	pub fn entry(&self, id: &str) -> Option<&Entry> {
		self.entries.get(id)
	}

	pub fn asset(&self, id: &str) -> Option<&Asset> {
		self.assets.get(id)
	}

	/// Resolve a field value that should point at an entry
	pub fn resolve_entry(&self, value: &JsonValue) -> Option<Entry> {
		if value.get("fields").is_some() {
			if let Ok(entry) = serde_json::from_value::<Entry>(value.clone()) {
				if entry.sys.kind != "Asset" {
					return Some(entry);
				}
			}
		}
		let link = Link::from_value(value)?;
		if link.link_type() != Some("Entry") {
			return None;
		}
		let resolved = self.entries.get(link.id()).cloned();
		if resolved.is_none() {
			tracing::debug!(id = link.id(), "unresolved entry link");
		}
		resolved
	}

	/// Resolve a field value that should point at an asset
	pub fn resolve_asset(&self, value: &JsonValue) -> Option<Asset> {
		if value.get("fields").is_some() {
			if let Ok(asset) = serde_json::from_value::<Asset>(value.clone()) {
				if asset.sys.kind == "Asset" || asset.raw_url().is_some() {
					return Some(asset);
				}
			}
		}
		let link = Link::from_value(value)?;
		if link.link_type() != Some("Asset") {
			return None;
		}
		let resolved = self.assets.get(link.id()).cloned();
		if resolved.is_none() {
			tracing::debug!(id = link.id(), "unresolved asset link");
		}
		resolved
	}

	/// Resolve every entry link in an array value, skipping unresolvable ones
	pub fn resolve_entries(&self, value: &JsonValue) -> Vec<Entry> {
		value
			.as_array()
			.map(|items| items.iter().filter_map(|v| self.resolve_entry(v)).collect())
			.unwrap_or_default()
	}

	/// Resolve every asset link in an array value, skipping unresolvable ones
	pub fn resolve_assets(&self, value: &JsonValue) -> Vec<Asset> {
		value
			.as_array()
			.map(|items| items.iter().filter_map(|v| self.resolve_asset(v)).collect())
			.unwrap_or_default()
	}
}
