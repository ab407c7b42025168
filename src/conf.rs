//! Settings and environment loading.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "conf")]
//! use vendsite::conf::{ContentfulSettings, Env};
//! ```

#[cfg(feature = "conf")]
pub use vendsite_conf::*;
