//! # vendsite-contentful
//!
//! Contentful Content Delivery API access for the vendsite content layer.
//!
//! ## Architecture
//!
//! ```text
//! vendsite-contentful
//! ├── client   - DeliveryClient: entries/assets over reqwest
//! ├── handle   - ClientHandle: lazily built, refreshable shared client
//! ├── query    - EntryQuery builder
//! ├── entry    - raw Entry / Asset / Link records
//! ├── links    - LinkResolver over a collection's includes
//! ├── state    - ConnectionState and the warning banner it implies
//! └── monitor  - ConnectionMonitor: route-change checks and heartbeat
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vendsite_conf::ContentfulSettings;
//! use vendsite_contentful::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = ClientHandle::new(ContentfulSettings::from_env()?);
//!
//! let report = handle.test_connection().await;
//! println!("{}", report.message);
//!
//! let monitor = ConnectionMonitor::new(Arc::new(handle.clone()));
//! let _heartbeat = monitor.spawn_heartbeat();
//!
//! let client = handle.get_client()?;
//! let machines = client
//!     .get_entries(&EntryQuery::new().content_type("machine").include(2))
//!     .await?;
//! println!("{} machines", machines.total);
//! # Ok(())
//! # }
//! ```

#![warn(rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod entry;
pub mod error;
pub mod handle;
pub mod links;
pub mod monitor;
pub mod query;
pub mod state;

pub use client::DeliveryClient;
pub use entry::{Asset, AssetFields, AssetFile, Entry, EntryCollection, Includes, Link, Sys};
pub use error::{ContentfulError, ContentfulResult};
pub use handle::{ClientHandle, ConnectionReport};
pub use links::LinkResolver;
pub use monitor::{ConnectionMonitor, HealthCheck, MonitorConfig, MonitorGuard};
pub use query::EntryQuery;
pub use state::{
	ConnectionSnapshot, ConnectionState, ConnectionWarning, Health, SETTINGS_HELP_PATH, WarningKind,
};

pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::client::DeliveryClient;
	pub use crate::entry::{Asset, Entry, EntryCollection};
	pub use crate::error::{ContentfulError, ContentfulResult};
	pub use crate::handle::{ClientHandle, ConnectionReport};
	pub use crate::links::LinkResolver;
	pub use crate::monitor::{ConnectionMonitor, MonitorConfig};
	pub use crate::query::EntryQuery;
	pub use crate::state::{ConnectionState, Health};
}
