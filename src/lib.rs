//! # vendsite
//!
//! Content layer for the vending-solutions marketing site: a Contentful
//! Delivery API client, slug resolution, typed view-models and fallback
//! content that keeps every page renderable when the CMS is unconfigured,
//! failing, or empty.
//!
//! ## Feature Flags
//!
//! - `minimal` - Settings and environment loading only
//! - `standard` - Client, monitor and view-model layer
//! - `full` (default) - Everything
//!
//! Fine-grained flags: `conf`, `contentful`, `content`.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use vendsite::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = ClientHandle::new(ContentfulSettings::load()?);
//! let repository = ContentRepository::new(handle);
//!
//! let goal = repository.business_goal("expand-footprint-scalability").await?;
//! println!("{} (fallback: {})", goal.data.title, goal.is_fallback());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "conf")]
pub mod conf;
#[cfg(feature = "content")]
pub mod content;
#[cfg(feature = "contentful")]
pub mod contentful;

#[cfg(feature = "conf")]
pub use vendsite_conf::{ContentfulSettings, Env, EnvError};

#[cfg(feature = "contentful")]
pub use vendsite_contentful::{
	ClientHandle, ConnectionMonitor, ConnectionState, ContentfulError, DeliveryClient, EntryQuery,
	Health,
};

#[cfg(feature = "content")]
pub use vendsite_content::{
	ContentError, ContentRepository, DataSource, FallbackReason, Query, QueryOutcome,
	SlugResolver,
};

/// Re-export commonly used types
pub mod prelude {
	#[cfg(feature = "conf")]
	pub use crate::{ContentfulSettings, EnvError};

	#[cfg(feature = "contentful")]
	pub use crate::{ClientHandle, ConnectionMonitor, ContentfulError, EntryQuery, Health};

	#[cfg(feature = "content")]
	pub use vendsite_content::prelude::*;
}
