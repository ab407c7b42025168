//! Slug resolution
//!
//! URLs in the wild carry historical spellings of slugs. [`SlugAliases`]
//! is the declarative table that maps them onto the slugs stored in the
//! CMS, and [`SlugResolver`] turns a requested slug into an ordered list of
//! candidates to try.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Upper bound on alias hops while resolving
const MAX_HOPS: usize = 16;

/// Canonical slug of the footprint-expansion business goal
pub const EXPAND_FOOTPRINT: &str = "expand-footprint";

/// Lowercase, hyphen-separated, `[a-z0-9-]` only
///
/// # Examples
///
/// ```
/// use vendsite_content::slugs::normalize;
///
/// assert_eq!(normalize("  Expand_Your Footprint!! "), "expand-your-footprint");
/// assert_eq!(normalize("--a--b--"), "a-b");
/// ```
pub fn normalize(slug: &str) -> String {
	let mut out = String::with_capacity(slug.len());
	let mut pending_hyphen = false;
	for c in slug.trim().chars() {
		let c = c.to_ascii_lowercase();
		if c.is_ascii_lowercase() || c.is_ascii_digit() {
			if pending_hyphen && !out.is_empty() {
				out.push('-');
			}
			pending_hyphen = false;
			out.push(c);
		} else if c == '-' || c == '_' || c.is_whitespace() {
			pending_hyphen = true;
		}
	}
	out
}

/// Maps slugs containing every one of `terms` to `canonical`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRule {
	terms: Vec<String>,
	canonical: String,
}

impl AliasRule {
	fn matches(&self, slug: &str) -> bool {
		self.terms.iter().all(|term| slug.contains(term.as_str()))
	}
}

/// Declarative slug alias table
///
/// # Examples
///
/// ```
/// use vendsite_content::SlugAliases;
///
/// let aliases = SlugAliases::new()
///     .with_alias("old-name", "new-name")
///     .with_rule(&["legacy", "fridge"], "smart-fridge");
///
/// assert_eq!(aliases.resolve("Old_Name"), "new-name");
/// assert_eq!(aliases.resolve("our-legacy-fridge-line"), "smart-fridge");
/// assert_eq!(aliases.resolve("unrelated"), "unrelated");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SlugAliases {
	aliases: HashMap<String, String>,
	rules: Vec<AliasRule>,
}

static BUILTIN: Lazy<Arc<SlugAliases>> = Lazy::new(|| {
	Arc::new(
		SlugAliases::new()
			.with_alias("expand-footprint-scalability", EXPAND_FOOTPRINT)
			.with_alias("expand-your-footprint", EXPAND_FOOTPRINT)
			.with_alias("footprint-expansion", EXPAND_FOOTPRINT)
			.with_alias("expandfootprint", EXPAND_FOOTPRINT)
			.with_alias("expand_footprint", EXPAND_FOOTPRINT)
			.with_alias("scale-footprint", EXPAND_FOOTPRINT)
			.with_rule(&["expand", "footprint"], EXPAND_FOOTPRINT),
	)
});

impl SlugAliases {
	/// Empty table
	pub fn new() -> Self {
		Self::default()
	}

	/// The site's alias table
	pub fn builtin() -> Arc<Self> {
		Arc::clone(&BUILTIN)
	}

	/// Map `variant` to `canonical`
	///
	/// Both sides are normalized. An alias that would make resolution loop
	/// back onto `variant` is ignored.
	pub fn with_alias(mut self, variant: &str, canonical: &str) -> Self {
		let variant = normalize(variant);
		let canonical = normalize(canonical);
		if variant.is_empty() || canonical.is_empty() || variant == canonical {
			return self;
		}
		let previous = self.aliases.insert(variant.clone(), canonical.clone());
		if !self.settles(&variant) {
			tracing::warn!(%variant, %canonical, "ignoring slug alias that would form a cycle");
			match previous {
				Some(previous) => self.aliases.insert(variant, previous),
				None => self.aliases.remove(&variant),
			};
		}
		self
	}

	/// Map every slug containing all of `terms` to `canonical`
	///
	/// A rule whose canonical slug would resolve back into a loop is ignored.
	pub fn with_rule(mut self, terms: &[&str], canonical: &str) -> Self {
		let terms: Vec<String> = terms
			.iter()
			.map(|t| normalize(t))
			.filter(|t| !t.is_empty())
			.collect();
		let canonical = normalize(canonical);
		if terms.is_empty() || canonical.is_empty() {
			return self;
		}
		self.rules.push(AliasRule {
			terms,
			canonical: canonical.clone(),
		});
		if !self.settles(&canonical) {
			tracing::warn!(%canonical, "ignoring slug rule that would form a cycle");
			self.rules.pop();
		}
		self
	}

	pub fn len(&self) -> usize {
		self.aliases.len()
	}

	pub fn is_empty(&self) -> bool {
		self.aliases.is_empty() && self.rules.is_empty()
	}

	/// Canonical value a rule forces for this (normalized) slug
	pub fn forced(&self, slug: &str) -> Option<&str> {
		self.rules
			.iter()
			.find(|rule| rule.matches(slug))
			.map(|rule| rule.canonical.as_str())
	}

	fn step(&self, slug: &str) -> Option<&str> {
		self.aliases
			.get(slug)
			.map(String::as_str)
			.or_else(|| self.forced(slug))
	}

	/// Whether resolution from `slug` reaches a slug that maps to itself
	fn settles(&self, slug: &str) -> bool {
		let mut current = slug;
		for _ in 0..MAX_HOPS {
			match self.step(current) {
				Some(next) if next != current => current = next,
				_ => return true,
			}
		}
		false
	}

	fn resolve_normalized(&self, slug: &str) -> String {
		let mut current = slug.to_string();
		for _ in 0..MAX_HOPS {
			match self.step(&current) {
				Some(next) if next != current => current = next.to_string(),
				_ => return current,
			}
		}
		current
	}

	/// Canonical form of `slug`
	pub fn resolve(&self, slug: &str) -> String {
		self.resolve_normalized(&normalize(slug))
	}
}

/// Outcome of a slug lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
	Found {
		value: T,
		/// Candidate that matched
		matched_slug: String,
	},
	NotFound {
		/// Candidates tried, in order
		tried: Vec<String>,
	},
}

impl<T> Resolution<T> {
	pub fn found(self) -> Option<T> {
		match self {
			Self::Found { value, .. } => Some(value),
			Self::NotFound { .. } => None,
		}
	}
}

/// Resolves requested slugs against an alias table
#[derive(Debug, Clone)]
pub struct SlugResolver {
	aliases: Arc<SlugAliases>,
}

impl Default for SlugResolver {
	fn default() -> Self {
		Self::new(SlugAliases::builtin())
	}
}

impl SlugResolver {
	pub fn new(aliases: Arc<SlugAliases>) -> Self {
		Self { aliases }
	}

	pub fn aliases(&self) -> &SlugAliases {
		&self.aliases
	}

	/// Canonical slug; idempotent
	pub fn resolve(&self, slug: &str) -> String {
		self.aliases.resolve(slug)
	}

	/// Ordered, de-duplicated lookup plan
	///
	/// The resolved slug first, then the slug exactly as requested, then the
	/// value a pattern rule forces, if any.
	///
	/// # Examples
	///
	/// ```
	/// use vendsite_content::SlugResolver;
	///
	/// let resolver = SlugResolver::default();
	/// assert_eq!(
	///     resolver.candidates("expand-footprint-scalability"),
	///     vec!["expand-footprint", "expand-footprint-scalability"]
	/// );
	/// assert_eq!(resolver.candidates("combo-unit"), vec!["combo-unit"]);
	/// ```
	pub fn candidates(&self, slug: &str) -> Vec<String> {
		let normalized = normalize(slug);
		let plan = [
			Some(self.aliases.resolve_normalized(&normalized)),
			Some(slug.trim().to_string()),
			self.aliases.forced(&normalized).map(str::to_string),
		];

		let mut candidates: Vec<String> = Vec::with_capacity(plan.len());
		for candidate in plan.into_iter().flatten() {
			if !candidate.is_empty() && !candidates.contains(&candidate) {
				candidates.push(candidate);
			}
		}
		candidates
	}

	/// Try each candidate with `fetch` until one yields a value
	///
	/// Errors abort the lookup.
	pub async fn lookup<T, E, F, Fut>(&self, slug: &str, mut fetch: F) -> Result<Resolution<T>, E>
	where
		F: FnMut(String) -> Fut,
		Fut: Future<Output = Result<Option<T>, E>>,
	{
		let candidates = self.candidates(slug);
		for (attempt, candidate) in candidates.iter().enumerate() {
			tracing::debug!(slug, candidate = %candidate, attempt = attempt + 1, "slug lookup");
			if let Some(value) = fetch(candidate.clone()).await? {
				if candidate.as_str() != slug {
					tracing::debug!(slug, matched = %candidate, "slug resolved via alias");
				}
				return Ok(Resolution::Found {
					value,
					matched_slug: candidate.clone(),
				});
			}
		}
		Ok(Resolution::NotFound { tried: candidates })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use std::convert::Infallible;

	#[rstest]
	#[case("expand-footprint-scalability")]
	#[case("expand-your-footprint")]
	#[case("footprint-expansion")]
	#[case("expandfootprint")]
	#[case("expand_footprint")]
	#[case("scale-footprint")]
	#[case("Expand-Footprint")]
	#[case("how-to-expand-your-vending-footprint")]
	fn test_footprint_family_resolves_to_canonical(#[case] slug: &str) {
		let resolver = SlugResolver::default();

		assert_eq!(resolver.resolve(slug), EXPAND_FOOTPRINT);
	}

	#[rstest]
	fn test_unrelated_slugs_are_only_normalized() {
		let resolver = SlugResolver::default();

		assert_eq!(resolver.resolve("Smart Fridge"), "smart-fridge");
		assert_eq!(resolver.resolve("footprint-only"), "footprint-only");
	}

	#[rstest]
	fn test_candidates_keep_original_and_forced_value() {
		// Arrange
		let aliases = SlugAliases::new()
			.with_alias("expand-footprint-scalability", "scalable-growth")
			.with_rule(&["expand", "footprint"], EXPAND_FOOTPRINT);
		let resolver = SlugResolver::new(Arc::new(aliases));

		// Act
		let candidates = resolver.candidates("Expand-Footprint-Scalability");

		// Assert
		assert_eq!(
			candidates,
			vec![
				"scalable-growth".to_string(),
				"Expand-Footprint-Scalability".to_string(),
				EXPAND_FOOTPRINT.to_string(),
			]
		);
	}

	#[rstest]
	fn test_cyclic_alias_is_ignored() {
		let aliases = SlugAliases::new()
			.with_alias("a", "b")
			.with_alias("b", "a");

		assert_eq!(aliases.len(), 1);
		assert_eq!(aliases.resolve("a"), "b");
		assert_eq!(aliases.resolve("b"), "b");
	}

	#[rstest]
	fn test_rule_that_would_loop_through_an_alias_is_ignored() {
		// Arrange
		let aliases = SlugAliases::new()
			.with_alias("growth", "expand-footprint-plus")
			.with_rule(&["expand", "footprint"], "growth");

		// Act
		let resolved = aliases.resolve("growth");

		// Assert
		assert_eq!(resolved, "expand-footprint-plus");
		assert_eq!(aliases.resolve(&resolved), resolved);
		assert_eq!(aliases.forced("expand-footprint-plus"), None);
	}

	#[rstest]
	fn test_alias_that_would_loop_through_a_rule_is_ignored() {
		// Arrange
		let aliases = SlugAliases::new()
			.with_rule(&["expand", "footprint"], EXPAND_FOOTPRINT)
			.with_alias(EXPAND_FOOTPRINT, "growth")
			.with_alias("growth", "expand-footprint-plus");

		// Act
		let resolved = aliases.resolve("expand-footprint-plus");

		// Assert
		assert_eq!(aliases.len(), 1);
		assert_eq!(resolved, "growth");
		assert_eq!(aliases.resolve(&resolved), resolved);
	}

	#[rstest]
	fn test_builtin_style_rule_after_alias_stays_idempotent() {
		let aliases = SlugAliases::new()
			.with_alias("growth", "expand-footprint-plus")
			.with_rule(&["expand", "footprint"], EXPAND_FOOTPRINT);

		let resolved = aliases.resolve("growth");

		assert_eq!(resolved, EXPAND_FOOTPRINT);
		assert_eq!(aliases.resolve(&resolved), resolved);
	}

	#[tokio::test]
	async fn test_lookup_falls_through_candidates() {
		// Arrange
		let aliases = SlugAliases::new().with_alias("old-combo", "combo-unit");
		let resolver = SlugResolver::new(Arc::new(aliases));
		let mut seen = Vec::new();

		// Act
		let resolution = resolver
			.lookup("old-combo", |candidate| {
				seen.push(candidate.clone());
				async move {
					Ok::<_, Infallible>((candidate == "old-combo").then_some(42))
				}
			})
			.await
			.unwrap();

		// Assert
		assert_eq!(seen, vec!["combo-unit", "old-combo"]);
		assert_eq!(
			resolution,
			Resolution::Found {
				value: 42,
				matched_slug: "old-combo".to_string()
			}
		);
	}

	#[tokio::test]
	async fn test_lookup_reports_every_candidate_tried() {
		let resolver = SlugResolver::default();

		let resolution = resolver
			.lookup("expand-footprint-scalability", |_| async {
				Ok::<Option<()>, Infallible>(None)
			})
			.await
			.unwrap();

		assert_eq!(
			resolution,
			Resolution::NotFound {
				tried: vec![
					"expand-footprint".to_string(),
					"expand-footprint-scalability".to_string()
				]
			}
		);
	}

	proptest! {
		#[test]
		fn prop_resolve_is_idempotent(slug in "\\PC{0,40}") {
			let resolver = SlugResolver::default();
			let once = resolver.resolve(&slug);
			prop_assert_eq!(resolver.resolve(&once), once);
		}

		#[test]
		fn prop_normalize_output_is_url_safe(slug in "\\PC{0,40}") {
			let normalized = normalize(&slug);
			prop_assert!(normalized.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
			prop_assert!(!normalized.starts_with('-') && !normalized.ends_with('-'));
			prop_assert!(!normalized.contains("--"));
			prop_assert_eq!(normalize(&normalized), normalized.clone());
		}

		#[test]
		fn prop_candidates_are_unique_and_start_with_resolved(slug in "[a-zA-Z _-]{1,30}") {
			let resolver = SlugResolver::default();
			let candidates = resolver.candidates(&slug);
			let unique: std::collections::HashSet<&String> = candidates.iter().collect();
			prop_assert_eq!(unique.len(), candidates.len());
			if let Some(first) = candidates.first() {
				let resolved = resolver.resolve(&slug);
				prop_assert!(resolved.is_empty() || first == &resolved);
			}
		}
	}
}
