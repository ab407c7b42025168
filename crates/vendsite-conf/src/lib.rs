//! # vendsite-conf
//!
//! Configuration for the vendsite content layer.
//!
//! Settings come from `CONTENTFUL_*` environment variables (optionally
//! loaded from a `.env` file) or from [`ContentfulSettingsBuilder`].
//! [`ContentfulSettings::is_configured`] is the gate every data hook checks
//! before touching the network.
//!
//! | Variable                       | Default              |
//! |--------------------------------|----------------------|
//! | `CONTENTFUL_SPACE_ID`          | (required)           |
//! | `CONTENTFUL_DELIVERY_TOKEN`    | (required)           |
//! | `CONTENTFUL_ENVIRONMENT`       | `master`             |
//! | `CONTENTFUL_HOST`              | `cdn.contentful.com` |
//! | `CONTENTFUL_TIMEOUT_SECS`      | `10`                 |
//! | `CONTENTFUL_CACHE_TTL_SECS`    | `300`                |
//! | `CONTENTFUL_MAX_ATTEMPTS`      | `3`                  |
//! | `CONTENTFUL_FALLBACK_ON_EMPTY` | `false`              |
//! | `CONTENTFUL_FALLBACK_ON_ERROR` | `true`               |

pub mod env;
pub mod settings;

pub use env::{Env, EnvError};
pub use settings::{
	ContentfulSettings, ContentfulSettingsBuilder, DEFAULT_ENVIRONMENT, DEFAULT_HOST, ENV_PREFIX,
	SettingsSummary,
};
