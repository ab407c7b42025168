//! View-models, slug resolution, fallback content and data hooks.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "content")]
//! use vendsite::content::{ContentRepository, SlugResolver};
//! ```

#[cfg(feature = "content")]
pub use vendsite_content::*;
