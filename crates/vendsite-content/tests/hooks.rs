//! Data hooks against a mocked delivery API

use mockito::Matcher;
use rstest::rstest;
use serde_json::json;
use std::time::Duration;
use vendsite_conf::ContentfulSettings;
use vendsite_content::prelude::*;
use vendsite_contentful::{ClientHandle, Health};

const ENTRIES_PATH: &str = "/spaces/space1/environments/master/entries";

fn settings(base_url: &str) -> ContentfulSettings {
	ContentfulSettings::builder()
		.space_id("space1")
		.delivery_token("token")
		.base_url(base_url)
		.timeout(Duration::from_secs(2))
		.build()
}

fn repository(base_url: &str) -> ContentRepository {
	ContentRepository::new(ClientHandle::new(settings(base_url)))
		.with_retry_policy(RetryPolicy::none())
}

fn entry(id: &str, content_type: &str, fields: serde_json::Value) -> serde_json::Value {
	json!({
		"sys": {
			"id": id,
			"type": "Entry",
			"createdAt": "2024-03-01T10:00:00Z",
			"contentType": {"sys": {"type": "Link", "linkType": "ContentType", "id": content_type}}
		},
		"fields": fields
	})
}

fn collection(items: Vec<serde_json::Value>) -> String {
	json!({
		"sys": {"type": "Array"},
		"total": items.len(),
		"skip": 0,
		"limit": 100,
		"items": items
	})
	.to_string()
}

fn business_goal(slug: &str, title: &str, order: i64) -> serde_json::Value {
	entry(
		&format!("goal-{}", slug),
		"businessGoal",
		json!({
			"title": title,
			"slug": slug,
			"shortDescription": format!("{} summary", title),
			"displayOrder": order
		}),
	)
}

fn machine(slug: &str, title: &str) -> serde_json::Value {
	entry(
		&format!("machine-{}", slug),
		"machine",
		json!({"title": title, "slug": slug, "type": "Combo"}),
	)
}

#[tokio::test]
async fn test_alias_slug_resolves_to_canonical_entry() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::AllOf(vec![
			Matcher::UrlEncoded("content_type".into(), "businessGoal".into()),
			Matcher::UrlEncoded("fields.slug".into(), "expand-footprint".into()),
		]))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(collection(vec![business_goal(
			"expand-footprint",
			"Expand Your Footprint",
			1,
		)]))
		.expect(1)
		.create_async()
		.await;
	let repository = repository(&server.url());

	// Act
	let goal = repository
		.business_goal("expand-footprint-scalability")
		.await
		.unwrap();

	// Assert
	mock.assert_async().await;
	assert_eq!(goal.source, DataSource::Cms);
	assert_eq!(goal.data.slug, "expand-footprint");
	assert_eq!(goal.data.title, "Expand Your Footprint");
	assert_eq!(repository.state().health(), Health::Healthy);
}

#[tokio::test]
async fn test_slug_lookup_falls_through_to_requested_slug() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let _canonical = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::UrlEncoded(
			"fields.slug".into(),
			"expand-footprint".into(),
		))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(collection(vec![]))
		.create_async()
		.await;
	let _requested = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::UrlEncoded(
			"fields.slug".into(),
			"footprint-expansion".into(),
		))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(collection(vec![business_goal(
			"footprint-expansion",
			"Footprint Expansion",
			1,
		)]))
		.create_async()
		.await;
	let repository = repository(&server.url());

	// Act
	let goal = repository
		.business_goal("footprint-expansion")
		.await
		.unwrap();

	// Assert
	assert_eq!(goal.data.slug, "footprint-expansion");
	assert!(!goal.is_fallback());
}

#[tokio::test]
async fn test_unknown_slug_is_not_found_with_tried_candidates() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let _mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::Any)
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(collection(vec![]))
		.create_async()
		.await;
	let repository = repository(&server.url());

	// Act
	let error = repository.machine("Hover-Kiosk").await.unwrap_err();

	// Assert
	match error {
		ContentError::NotFound {
			content_type,
			slug,
			tried,
		} => {
			assert_eq!(content_type, "machine");
			assert_eq!(slug, "Hover-Kiosk");
			assert_eq!(tried, vec!["hover-kiosk", "Hover-Kiosk"]);
		}
		other => panic!("unexpected error {:?}", other),
	}
}

#[tokio::test]
async fn test_unconfigured_hooks_never_touch_the_network() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("GET", Matcher::Any)
		.expect(0)
		.create_async()
		.await;
	let unconfigured = ContentfulSettings::builder().base_url(server.url()).build();
	let repository = ContentRepository::new(ClientHandle::new(unconfigured));

	// Act
	let goals = repository.business_goals().await.unwrap();
	let machines = repository.machines().await.unwrap();
	let products = repository.product_types().await.unwrap();
	let posts = repository.blog_posts().await.unwrap();
	let testimonials = repository.testimonials().await.unwrap();
	let technologies = repository.technologies().await.unwrap();
	let post = repository.blog_post("going-cashless").await.unwrap();

	// Assert
	mock.assert_async().await;
	let unconfigured = DataSource::Fallback(FallbackReason::Unconfigured);
	assert_eq!(goals.source, unconfigured);
	assert_eq!(machines.source, unconfigured);
	assert_eq!(products.source, unconfigured);
	assert_eq!(posts.source, unconfigured);
	assert_eq!(testimonials.source, unconfigured);
	assert_eq!(technologies.source, unconfigured);
	assert_eq!(post.source, unconfigured);
	assert!(!goals.data.is_empty());
	assert!(testimonials.data[0].featured);
}

#[tokio::test]
async fn test_concurrent_hooks_share_one_request() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::UrlEncoded(
			"content_type".into(),
			"businessGoal".into(),
		))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(collection(vec![
			business_goal("reduce-costs", "Reduce Costs", 2),
			business_goal("expand-footprint", "Expand Your Footprint", 1),
		]))
		.expect(1)
		.create_async()
		.await;
	let repository = repository(&server.url());

	// Act
	let results = futures::future::join_all((0..4).map(|_| {
		let repository = repository.clone();
		async move { repository.business_goals().await }
	}))
	.await;
	repository.handle().refresh_client().unwrap();
	let after_refresh = repository.business_goals().await.unwrap();

	// Assert
	mock.assert_async().await;
	for result in results {
		let goals = result.unwrap();
		let slugs: Vec<_> = goals.data.iter().map(|g| g.slug.as_str()).collect();
		assert_eq!(slugs, vec!["expand-footprint", "reduce-costs"]);
	}
	assert_eq!(after_refresh.source, DataSource::Cms);
}

#[tokio::test]
async fn test_server_error_serves_fallback_after_retries() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::Any)
		.with_status(503)
		.with_body("upstream unavailable")
		.expect(3)
		.create_async()
		.await;
	let handle = ClientHandle::new(settings(&server.url()));
	let repository = ContentRepository::new(handle).with_retry_policy(
		RetryPolicy::new(3).with_backoff(Backoff::Immediate),
	);

	// Act
	let machines = repository.machines().await.unwrap();

	// Assert
	mock.assert_async().await;
	assert!(matches!(
		machines.source,
		DataSource::Fallback(FallbackReason::Error(_))
	));
	assert!(!machines.data.is_empty());
	assert_eq!(repository.state().health(), Health::Unhealthy);
	assert_eq!(repository.state().refresh_count(), 1);
}

#[tokio::test]
async fn test_rejected_request_is_retried_once_with_refreshed_client() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let rejected = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::Any)
		.with_status(401)
		.with_header("content-type", "application/json")
		.with_body(
			json!({
				"sys": {"type": "Error", "id": "AccessTokenInvalid"},
				"message": "The access token you sent could not be found or is invalid."
			})
			.to_string(),
		)
		.expect(1)
		.create_async()
		.await;
	let accepted = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::Any)
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(collection(vec![
			machine("combo-unit", "Combo Unit"),
			machine("snack-tower", "Snack Tower"),
		]))
		.expect(1)
		.create_async()
		.await;
	let repository = ContentRepository::new(ClientHandle::new(settings(&server.url())))
		.with_retry_policy(RetryPolicy::new(3).with_backoff(Backoff::Immediate));

	// Act
	let machines = repository.machines().await.unwrap();

	// Assert
	rejected.assert_async().await;
	accepted.assert_async().await;
	assert_eq!(machines.source, DataSource::Cms);
	assert_eq!(machines.data.len(), 2);
	assert_eq!(repository.state().refresh_count(), 1);
	assert_eq!(repository.state().health(), Health::Healthy);
}

#[tokio::test]
async fn test_undecodable_body_gets_one_retry_before_fallback() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::Any)
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body("{\"items\": [")
		.expect(2)
		.create_async()
		.await;
	let repository = ContentRepository::new(ClientHandle::new(settings(&server.url())))
		.with_retry_policy(RetryPolicy::new(3).with_backoff(Backoff::Immediate));

	// Act
	let goals = repository.business_goals().await.unwrap();

	// Assert
	mock.assert_async().await;
	assert!(matches!(
		goals.source,
		DataSource::Fallback(FallbackReason::Error(_))
	));
	assert!(!goals.data.is_empty());
	assert_eq!(repository.state().refresh_count(), 1);
	assert_eq!(repository.state().health(), Health::Unhealthy);
}

#[tokio::test]
async fn test_odd_included_asset_keeps_cms_list() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let body = json!({
		"sys": {"type": "Array"},
		"total": 2,
		"items": [
			machine("combo-unit", "Combo Unit"),
			machine("snack-tower", "Snack Tower")
		],
		"includes": {
			"Asset": [{
				"sys": {"id": "img1", "type": "Asset", "createdAt": "last tuesday"},
				"fields": {
					"title": 42,
					"file": {
						"url": "//images.ctfassets.net/space1/img1/combo.jpg",
						"details": {"image": {"width": 1024.5, "height": 768}}
					}
				}
			}]
		}
	});
	let _mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::Any)
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(body.to_string())
		.create_async()
		.await;
	let repository = repository(&server.url());

	// Act
	let machines = repository.machines().await.unwrap();

	// Assert
	assert_eq!(machines.source, DataSource::Cms);
	let slugs: Vec<_> = machines.data.iter().map(|m| m.slug.as_str()).collect();
	assert_eq!(slugs, vec!["combo-unit", "snack-tower"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_refresh_during_in_flight_fetches_keeps_shared_result() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let body = collection(vec![
		business_goal("reduce-costs", "Reduce Costs", 2),
		business_goal("expand-footprint", "Expand Your Footprint", 1),
	]);
	let mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::UrlEncoded(
			"content_type".into(),
			"businessGoal".into(),
		))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body_from_request(move |_| {
			std::thread::sleep(Duration::from_millis(300));
			body.clone().into_bytes()
		})
		.expect(1)
		.create_async()
		.await;
	let repository = repository(&server.url());

	// Act
	let pending: Vec<_> = (0..2)
		.map(|_| {
			let repository = repository.clone();
			tokio::spawn(async move { repository.business_goals().await })
		})
		.collect();
	tokio::time::sleep(Duration::from_millis(100)).await;
	repository.handle().refresh_client().unwrap();
	let mut results = Vec::new();
	for task in pending {
		results.push(task.await.unwrap().unwrap());
	}

	// Assert
	mock.assert_async().await;
	assert_eq!(repository.state().refresh_count(), 1);
	assert_eq!(results[0], results[1]);
	for goals in &results {
		assert_eq!(goals.source, DataSource::Cms);
		let slugs: Vec<_> = goals.data.iter().map(|g| g.slug.as_str()).collect();
		assert_eq!(slugs, vec!["expand-footprint", "reduce-costs"]);
	}
	assert_eq!(repository.state().health(), Health::Healthy);
}

#[tokio::test]
async fn test_server_error_surfaces_when_fallback_disabled() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let _mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::Any)
		.with_status(500)
		.create_async()
		.await;
	let repository = repository(&server.url()).with_fallback_on_error(false);

	// Act
	let error = repository.technologies().await.unwrap_err();

	// Assert
	assert!(matches!(error, ContentError::Unavailable(_)));
}

#[rstest]
#[case(EmptyResultPolicy::Empty, false)]
#[case(EmptyResultPolicy::Fallback, true)]
#[tokio::test]
async fn test_empty_result_policy(#[case] policy: EmptyResultPolicy, #[case] expect_fallback: bool) {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let _mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::Any)
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(collection(vec![]))
		.create_async()
		.await;
	let repository = repository(&server.url()).with_empty_policy(policy);

	// Act
	let products = repository.product_types().await.unwrap();
	let goal = repository.business_goal("reduce-costs").await;

	// Assert
	assert_eq!(products.is_fallback(), expect_fallback);
	assert_eq!(products.data.is_empty(), !expect_fallback);
	if expect_fallback {
		assert_eq!(
			goal.unwrap().source,
			DataSource::Fallback(FallbackReason::Empty)
		);
	} else {
		assert!(goal.unwrap_err().is_not_found());
	}
}

#[tokio::test]
async fn test_hidden_and_malformed_entries_are_skipped() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let _mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::Any)
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(collection(vec![
			entry(
				"m1",
				"machine",
				json!({"title": "Combo Unit", "slug": "combo-unit", "type": "Combo", "featured": true}),
			),
			entry(
				"m2",
				"machine",
				json!({"title": "Retired", "slug": "retired", "visible": false}),
			),
			entry("m3", "machine", json!({"title": 42})),
		]))
		.create_async()
		.await;
	let repository = repository(&server.url());

	// Act
	let machines = repository.machines().await.unwrap();
	let combos = repository.machines_by_type("combo").await.unwrap();
	let featured = repository.featured_machines().await.unwrap();

	// Assert
	let slugs: Vec<_> = machines.data.iter().map(|m| m.slug.as_str()).collect();
	assert_eq!(slugs, vec!["combo-unit"]);
	assert_eq!(combos.data.len(), 1);
	assert_eq!(featured.data.len(), 1);
	assert_eq!(featured.source, DataSource::Cms);
}

#[tokio::test]
async fn test_query_state_tracks_repository_hook() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let _mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::Any)
		.with_status(500)
		.create_async()
		.await;
	let repository = repository(&server.url()).with_fallback_on_error(false);
	let mut query = Query::new("technologies");

	// Act
	query.run(|| repository.technologies()).await.unwrap();
	let failed = query.error().cloned();
	let unconfigured = ContentRepository::new(ClientHandle::new(ContentfulSettings::default()));
	query.retry(|| unconfigured.technologies()).await.unwrap();

	// Assert
	assert!(matches!(failed, Some(ContentError::Unavailable(_))));
	assert!(query.data().is_some_and(|techs| !techs.is_empty()));
	assert_eq!(query.state().name(), "succeeded");
}
