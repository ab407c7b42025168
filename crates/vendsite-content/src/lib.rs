//! # vendsite-content
//!
//! The content layer the site's pages read from: typed view-models built
//! from Contentful entries, slug resolution, fallback content and the data
//! hooks that tie them together.
//!
//! ## Architecture
//!
//! ```text
//! vendsite-content
//! ├── fields     - typed, validating view over an entry's fields
//! ├── richtext   - rich-text documents to HTML and plain text
//! ├── models     - view-models (BusinessGoal, Machine, ...)
//! ├── transform  - Entry -> view-model transformers
//! ├── slugs      - normalization, aliases, lookup plan
//! ├── fallback   - static substitute content
//! ├── retry      - retry policy and backoff
//! ├── hooks      - QueryOutcome and the per-hook state machine
//! └── repository - ContentRepository: the data hooks
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vendsite_conf::ContentfulSettings;
//! use vendsite_content::prelude::*;
//! use vendsite_contentful::ClientHandle;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = ClientHandle::new(ContentfulSettings::load()?);
//! let repository = ContentRepository::new(handle);
//!
//! let goal = repository.business_goal("expand-footprint-scalability").await?;
//! assert_eq!(goal.data.slug, "expand-footprint");
//! if goal.is_fallback() {
//!     println!("showing sample content");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(rustdoc::broken_intra_doc_links)]

pub mod fallback;
pub mod fields;
pub mod hooks;
pub mod models;
pub mod repository;
pub mod retry;
pub mod richtext;
pub mod slugs;
pub mod transform;

pub use error::{ContentError, ContentResult, TransformError};
pub use fallback::Fallback;
pub use hooks::{DataSource, FallbackReason, Query, QueryOutcome, QueryState};
pub use models::{
	BlogPost, BusinessGoal, Feature, ImageAsset, Machine, ProductType, Spec, Technology,
	TechnologySection, Testimonial,
};
pub use repository::{CacheConfig, ContentRepository, EmptyResultPolicy};
pub use retry::{Backoff, RetryPolicy};
pub use slugs::{Resolution, SlugAliases, SlugResolver};
pub use transform::Transform;

pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::error::{ContentError, ContentResult};
	pub use crate::fallback::Fallback;
	pub use crate::hooks::{DataSource, FallbackReason, Query, QueryOutcome, QueryState};
	pub use crate::models::{
		BlogPost, BusinessGoal, Feature, ImageAsset, Machine, ProductType, Technology,
		Testimonial,
	};
	pub use crate::repository::{ContentRepository, EmptyResultPolicy};
	pub use crate::retry::{Backoff, RetryPolicy};
	pub use crate::slugs::SlugResolver;
	pub use crate::transform::Transform;
}

/// Content layer error types
pub mod error {
	use thiserror::Error;
	use vendsite_contentful::ContentfulError;

	/// Why an entry could not become a view-model
	#[derive(Error, Debug, Clone, PartialEq, Eq)]
	pub enum TransformError {
		/// Entry has no `fields` object
		#[error("Entry {id} has no fields")]
		MissingFields {
			/// Entry id
			id: String,
		},

		/// Entry belongs to another content type
		#[error("Entry {id} is a {}, expected {expected}", .found.as_deref().unwrap_or("record of unknown type"))]
		WrongContentType {
			/// Entry id
			id: String,
			/// Content type the transformer handles
			expected: &'static str,
			/// Content type the entry declares
			found: Option<String>,
		},

		/// A field holds a value of the wrong shape
		#[error("Entry {id}: field '{field}' should be {expected}")]
		InvalidField {
			/// Entry id
			id: String,
			/// Field name
			field: String,
			/// Expected shape, e.g. "text" or "a list"
			expected: &'static str,
		},
	}

	/// Errors surfaced by the data hooks
	#[derive(Error, Debug, Clone, PartialEq, Eq)]
	pub enum ContentError {
		/// CMS credentials are missing and no fallback applies
		#[error("Content is not configured: {0}")]
		Configuration(String),

		/// CMS could not be reached after retries and no fallback applies
		#[error("Content unavailable: {0}")]
		Unavailable(String),

		/// No entry matched any slug candidate
		#[error("No {content_type} found for '{slug}' (tried: {})", .tried.join(", "))]
		NotFound {
			/// Content type searched
			content_type: &'static str,
			/// Slug as requested
			slug: String,
			/// Candidates tried, in order
			tried: Vec<String>,
		},

		/// Hook state machine rejected a transition
		#[error("Cannot {action} a query that is {from}")]
		InvalidTransition {
			/// State the query was in
			from: &'static str,
			/// Attempted action
			action: &'static str,
		},
	}

	impl ContentError {
		/// Whether this is a not-found error (HTTP 404 / exit code 2)
		pub fn is_not_found(&self) -> bool {
			matches!(self, Self::NotFound { .. })
		}
	}

	impl From<ContentfulError> for ContentError {
		fn from(error: ContentfulError) -> Self {
			match error {
				ContentfulError::NotConfigured { .. } => Self::Configuration(error.to_string()),
				other => Self::Unavailable(other.to_string()),
			}
		}
	}

	/// Result type for content operations
	pub type ContentResult<T> = Result<T, ContentError>;
}
