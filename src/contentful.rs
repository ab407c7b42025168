//! Delivery API client, shared handle and connection monitor.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "contentful")]
//! use vendsite::contentful::{ClientHandle, ConnectionMonitor, EntryQuery};
//! ```

#[cfg(feature = "contentful")]
pub use vendsite_contentful::*;
