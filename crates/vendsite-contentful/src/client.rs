//! Content Delivery API client
//!
//! Thin wrapper over `reqwest` for one space and environment.

use crate::entry::{Asset, Entry, EntryCollection, ErrorBody};
use crate::error::{ContentfulError, ContentfulResult};
use crate::query::EntryQuery;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use vendsite_conf::ContentfulSettings;

/// Client for one Contentful space/environment
///
/// # Examples
///
/// ```no_run
/// use vendsite_conf::ContentfulSettings;
/// use vendsite_contentful::{DeliveryClient, EntryQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = ContentfulSettings::builder()
///     .space_id("space")
///     .delivery_token("token")
///     .build();
/// let client = DeliveryClient::new(&settings)?;
///
/// let goals = client
///     .get_entries(&EntryQuery::new().content_type("businessGoal").include(2))
///     .await?;
/// println!("{} goals", goals.total);
/// # Ok(())
/// # }
/// ```
pub struct DeliveryClient {
	http: Client,
	base_url: String,
	space_id: String,
	environment: String,
	token: SecretString,
}

impl std::fmt::Debug for DeliveryClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DeliveryClient")
			.field("base_url", &self.base_url)
			.field("space_id", &self.space_id)
			.field("environment", &self.environment)
			.finish_non_exhaustive()
	}
}

impl DeliveryClient {
	/// Build a client from settings
	///
	/// Fails with [`ContentfulError::NotConfigured`] when credentials are missing.
	pub fn new(settings: &ContentfulSettings) -> ContentfulResult<Self> {
		if !settings.is_configured() {
			return Err(ContentfulError::NotConfigured {
				missing: settings.missing_credentials(),
			});
		}

		let http = Client::builder()
			.timeout(settings.timeout)
			.user_agent(concat!("vendsite/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| ContentfulError::Network(format!("Failed to create client: {}", e)))?;

		Self::with_client(settings, http)
	}

	/// Build a client around an existing `reqwest::Client`
	pub fn with_client(settings: &ContentfulSettings, http: Client) -> ContentfulResult<Self> {
		let (Some(space_id), Some(token)) = (settings.space_id.clone(), settings.delivery_token())
		else {
			return Err(ContentfulError::NotConfigured {
				missing: settings.missing_credentials(),
			});
		};

		Ok(Self {
			http,
			base_url: settings.base_url.trim_end_matches('/').to_string(),
			space_id,
			environment: settings.environment.clone(),
			token: SecretString::from(token.expose_secret().to_string()),
		})
	}

	pub fn space_id(&self) -> &str {
		&self.space_id
	}

	pub fn environment(&self) -> &str {
		&self.environment
	}

	fn endpoint(&self, path: &str) -> String {
		format!(
			"{}/spaces/{}/environments/{}/{}",
			self.base_url, self.space_id, self.environment, path
		)
	}

	async fn request<T: DeserializeOwned>(
		&self,
		path: &str,
		params: &[(String, String)],
	) -> ContentfulResult<T> {
		let url = self.endpoint(path);
		tracing::debug!(url = %url, params = ?params, "contentful request");

		let response = self
			.http
			.get(&url)
			.bearer_auth(self.token.expose_secret())
			.query(params)
			.send()
			.await
			.map_err(ContentfulError::from_reqwest)?;

		let status = response.status();
		if !status.is_success() {
			let text = response.text().await.unwrap_or_default();
			let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
			let id = if body.sys.id.is_empty() {
				status
					.canonical_reason()
					.unwrap_or("Unknown")
					.replace(' ', "")
			} else {
				body.sys.id
			};
			let message = body
				.message
				.filter(|m| !m.is_empty())
				.unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

			tracing::debug!(
				status = status.as_u16(),
				error_id = %id,
				request_id = body.request_id.as_deref().unwrap_or("-"),
				"contentful error response"
			);

			return Err(ContentfulError::Api {
				status: status.as_u16(),
				id,
				message,
			});
		}

		response
			.json::<T>()
			.await
			.map_err(|e| ContentfulError::Decode(e.to_string()))
	}

	/// `GET /entries` with the query's parameters
	pub async fn get_entries(&self, query: &EntryQuery) -> ContentfulResult<EntryCollection> {
		query.validate()?;
		self.request("entries", &query.params()).await
	}

	/// `GET /entries/{id}`
	pub async fn get_entry(&self, id: &str) -> ContentfulResult<Entry> {
		self.request(&format!("entries/{}", encode_segment(id)), &[])
			.await
	}

	/// `GET /assets/{id}`
	pub async fn get_asset(&self, id: &str) -> ContentfulResult<Asset> {
		self.request(&format!("assets/{}", encode_segment(id)), &[])
			.await
	}

	/// Cheapest possible read; returns the total number of entries
	pub async fn ping(&self) -> ContentfulResult<u64> {
		let collection = self.get_entries(&EntryQuery::new().limit(1)).await?;
		Ok(collection.total)
	}
}

fn encode_segment(segment: &str) -> String {
	url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}
