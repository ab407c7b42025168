//! Data hooks
//!
//! [`ContentRepository`] is what pages call. Each operation queries the
//! CMS through a shared, deduplicating cache, transforms the entries into
//! view-models, and degrades to fallback content when the CMS is
//! unconfigured, failing, or (by policy) empty.

use crate::error::{ContentError, ContentResult};
use crate::fallback::{Fallback, find_by_slug};
use crate::hooks::{FallbackReason, QueryOutcome};
use crate::models::{
	BlogPost, BusinessGoal, Listed, Machine, ProductType, Slugged, Technology, Testimonial,
};
use crate::retry::RetryPolicy;
use crate::slugs::{Resolution, SlugResolver, normalize};
use crate::transform::Transform;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use vendsite_contentful::{
	ClientHandle, ConnectionState, ContentfulError, ContentfulResult, EntryCollection, EntryQuery,
	LinkResolver,
};

/// Link depth requested with every query
const INCLUDE_DEPTH: u8 = 2;

/// Page size for list queries
const LIST_LIMIT: u32 = 200;

/// What a query that matches nothing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyResultPolicy {
	/// An empty list (or not-found for slug lookups)
	Empty,
	/// Fallback records, marked with [`FallbackReason::Empty`]
	Fallback,
}

impl EmptyResultPolicy {
	pub fn from_flag(fallback_on_empty: bool) -> Self {
		if fallback_on_empty {
			Self::Fallback
		} else {
			Self::Empty
		}
	}
}

/// Query cache configuration
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vendsite_content::CacheConfig;
///
/// let config = CacheConfig::default();
/// assert_eq!(config.ttl, Duration::from_secs(300));
/// assert_eq!(config.max_capacity, 1000);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
	/// How long a query result is reused
	pub ttl: Duration,
	/// Maximum number of cached queries
	pub max_capacity: u64,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			ttl: Duration::from_secs(300),
			max_capacity: 1000,
		}
	}
}

impl CacheConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;
		self
	}

	pub fn with_max_capacity(mut self, capacity: u64) -> Self {
		self.max_capacity = capacity;
		self
	}

	fn build(&self) -> Cache<String, Arc<EntryCollection>> {
		Cache::builder()
			.max_capacity(self.max_capacity)
			.time_to_live(self.ttl)
			.build()
	}
}

/// The site's data hooks
///
/// Clones share the client handle and the query cache.
#[derive(Clone)]
pub struct ContentRepository {
	handle: ClientHandle,
	cache: Cache<String, Arc<EntryCollection>>,
	resolver: SlugResolver,
	retry: RetryPolicy,
	empty_policy: EmptyResultPolicy,
	fallback_on_error: bool,
}

impl ContentRepository {
	/// Repository configured from the handle's settings
	pub fn new(handle: ClientHandle) -> Self {
		let settings = handle.settings();
		Self {
			cache: CacheConfig::default().with_ttl(settings.cache_ttl).build(),
			resolver: SlugResolver::default(),
			retry: RetryPolicy::from_settings(&settings),
			empty_policy: EmptyResultPolicy::from_flag(settings.fallback_on_empty),
			fallback_on_error: settings.fallback_on_error,
			handle,
		}
	}

	pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
		self.cache = config.build();
		self
	}

	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn with_empty_policy(mut self, policy: EmptyResultPolicy) -> Self {
		self.empty_policy = policy;
		self
	}

	pub fn with_fallback_on_error(mut self, enabled: bool) -> Self {
		self.fallback_on_error = enabled;
		self
	}

	pub fn with_slug_resolver(mut self, resolver: SlugResolver) -> Self {
		self.resolver = resolver;
		self
	}

	pub fn handle(&self) -> &ClientHandle {
		&self.handle
	}

	pub fn state(&self) -> &ConnectionState {
		self.handle.state()
	}

	pub fn resolver(&self) -> &SlugResolver {
		&self.resolver
	}

	/// Drop every cached query result
	pub fn invalidate_all(&self) {
		self.cache.invalidate_all();
	}

	pub async fn business_goals(&self) -> ContentResult<QueryOutcome<Vec<BusinessGoal>>> {
		self.list(|_: &BusinessGoal| true).await
	}

	pub async fn business_goal(&self, slug: &str) -> ContentResult<QueryOutcome<BusinessGoal>> {
		self.by_slug(slug).await
	}

	pub async fn machines(&self) -> ContentResult<QueryOutcome<Vec<Machine>>> {
		self.list(|_: &Machine| true).await
	}

	pub async fn machine(&self, slug: &str) -> ContentResult<QueryOutcome<Machine>> {
		self.by_slug(slug).await
	}

	/// Machines flagged as featured
	pub async fn featured_machines(&self) -> ContentResult<QueryOutcome<Vec<Machine>>> {
		self.list(|machine: &Machine| machine.featured).await
	}

	/// Machines of one kind, e.g. `smart-fridge`; the kind is normalized
	/// like a slug before comparing
	pub async fn machines_by_type(&self, kind: &str) -> ContentResult<QueryOutcome<Vec<Machine>>> {
		let kind = normalize(kind);
		self.list(move |machine: &Machine| machine.kind == kind).await
	}

	pub async fn product_types(&self) -> ContentResult<QueryOutcome<Vec<ProductType>>> {
		self.list(|_: &ProductType| true).await
	}

	pub async fn product_type(&self, slug: &str) -> ContentResult<QueryOutcome<ProductType>> {
		self.by_slug(slug).await
	}

	/// Newest first
	pub async fn blog_posts(&self) -> ContentResult<QueryOutcome<Vec<BlogPost>>> {
		self.list(|_: &BlogPost| true).await
	}

	pub async fn blog_post(&self, slug: &str) -> ContentResult<QueryOutcome<BlogPost>> {
		self.by_slug(slug).await
	}

	/// Featured quotes first
	pub async fn testimonials(&self) -> ContentResult<QueryOutcome<Vec<Testimonial>>> {
		self.list(|_: &Testimonial| true).await
	}

	pub async fn technologies(&self) -> ContentResult<QueryOutcome<Vec<Technology>>> {
		self.list(|_: &Technology| true).await
	}

	pub async fn technology(&self, slug: &str) -> ContentResult<QueryOutcome<Technology>> {
		self.by_slug(slug).await
	}

	async fn list<T, F>(&self, keep: F) -> ContentResult<QueryOutcome<Vec<T>>>
	where
		T: Transform + Fallback + Listed,
		F: Fn(&T) -> bool,
	{
		let fallback = |reason: FallbackReason| {
			let records = T::fallback_all().into_iter().filter(|r| keep(r)).collect();
			QueryOutcome::fallback(T::arrange(records), reason)
		};

		if !self.handle.is_configured() {
			tracing::debug!(
				content_type = T::CONTENT_TYPE,
				"contentful not configured; serving fallback list"
			);
			return Ok(fallback(FallbackReason::Unconfigured));
		}

		let query = EntryQuery::new()
			.content_type(T::CONTENT_TYPE)
			.order("sys.createdAt")
			.include(INCLUDE_DEPTH)
			.limit(LIST_LIMIT);
		let collection = match self.fetch(&query).await {
			Ok(collection) => collection,
			Err(error) => return self.degrade::<T, _>(error, |reason| Some(fallback(reason))),
		};

		let links = LinkResolver::new(&collection);
		let items = T::transform_all(&collection.items, &links)
			.into_iter()
			.filter(|item| keep(item))
			.collect();
		let items = T::arrange(items);

		if items.is_empty() && self.empty_policy == EmptyResultPolicy::Fallback {
			tracing::debug!(
				content_type = T::CONTENT_TYPE,
				"query returned no entries; serving fallback list"
			);
			return Ok(fallback(FallbackReason::Empty));
		}
		Ok(QueryOutcome::cms(items))
	}

	async fn by_slug<T>(&self, slug: &str) -> ContentResult<QueryOutcome<T>>
	where
		T: Transform + Fallback + Slugged,
	{
		let candidates = self.resolver.candidates(slug);
		let not_found = |tried: Vec<String>| ContentError::NotFound {
			content_type: T::CONTENT_TYPE,
			slug: slug.to_string(),
			tried,
		};
		if candidates.is_empty() {
			return Err(not_found(candidates));
		}

		if !self.handle.is_configured() {
			tracing::debug!(
				content_type = T::CONTENT_TYPE,
				slug,
				"contentful not configured; looking up fallback record"
			);
			return find_by_slug::<T>(&candidates)
				.map(|record| QueryOutcome::fallback(record, FallbackReason::Unconfigured))
				.ok_or_else(|| not_found(candidates.clone()));
		}

		let resolution = self
			.resolver
			.lookup(slug, |candidate| self.fetch_one::<T>(candidate))
			.await;

		match resolution {
			Ok(Resolution::Found { value, .. }) => Ok(QueryOutcome::cms(value)),
			Ok(Resolution::NotFound { tried }) => {
				if self.empty_policy == EmptyResultPolicy::Fallback {
					if let Some(record) = find_by_slug::<T>(&tried) {
						return Ok(QueryOutcome::fallback(record, FallbackReason::Empty));
					}
				}
				tracing::debug!(content_type = T::CONTENT_TYPE, slug, tried = ?tried, "no entry for slug");
				Err(not_found(tried))
			}
			Err(error) => self.degrade::<T, _>(error, |reason| {
				find_by_slug::<T>(&candidates).map(|record| QueryOutcome::fallback(record, reason))
			}),
		}
	}

	async fn fetch_one<T: Transform>(&self, slug: String) -> ContentfulResult<Option<T>> {
		let query = EntryQuery::new()
			.content_type(T::CONTENT_TYPE)
			.field_eq("slug", slug)
			.include(INCLUDE_DEPTH)
			.limit(1);
		let collection = self.fetch(&query).await?;
		let links = LinkResolver::new(&collection);
		Ok(collection
			.items
			.iter()
			.find_map(|entry| T::try_transform(entry, &links)))
	}

	/// Turn a failed query into fallback data or a surfaced error
	fn degrade<T, R>(
		&self,
		error: ContentfulError,
		fallback: impl FnOnce(FallbackReason) -> Option<QueryOutcome<R>>,
	) -> ContentResult<QueryOutcome<R>>
	where
		T: Transform,
	{
		let reason = if error.is_configuration() {
			FallbackReason::Unconfigured
		} else {
			FallbackReason::Error(error.to_string())
		};

		if self.fallback_on_error || error.is_configuration() {
			if let Some(outcome) = fallback(reason) {
				tracing::warn!(
					content_type = T::CONTENT_TYPE,
					error = %error,
					"contentful query failed; serving fallback data"
				);
				return Ok(outcome);
			}
		}

		tracing::error!(content_type = T::CONTENT_TYPE, error = %error, "contentful query failed");
		Err(ContentError::from(error))
	}

	/// Cached, deduplicated query
	async fn fetch(&self, query: &EntryQuery) -> ContentfulResult<Arc<EntryCollection>> {
		let key = query.cache_key();
		if self.cache.contains_key(&key) {
			tracing::debug!(query = %key, "query cache hit");
		}
		self.cache
			.try_get_with(key, self.fetch_with_retry(query))
			.await
			.map_err(|error| (*error).clone())
	}

	async fn fetch_with_retry(&self, query: &EntryQuery) -> ContentfulResult<Arc<EntryCollection>> {
		let content_type = query.content_type_id().unwrap_or("-");
		let mut attempt = 1;
		loop {
			tracing::debug!(content_type, attempt, params = ?query.params(), "contentful query");
			let result = match self.handle.get_client() {
				Ok(client) => client.get_entries(query).await,
				Err(error) => Err(error),
			};

			let error = match result {
				Ok(collection) => {
					self.handle.state().record_success();
					return Ok(Arc::new(collection));
				}
				Err(error) => error,
			};

			if !self.retry.should_retry(attempt, &error) {
				if !error.is_configuration() {
					self.handle.state().record_failure(error.to_string());
				}
				return Err(error);
			}

			tracing::warn!(content_type, attempt, error = %error, "contentful query failed; retrying");
			if self.retry.should_refresh(attempt) {
				if let Err(refresh_error) = self.handle.refresh_client() {
					tracing::warn!(error = %refresh_error, "contentful client refresh failed");
				}
			}
			tokio::time::sleep(self.retry.delay_after(attempt)).await;
			attempt += 1;
		}
	}
}
