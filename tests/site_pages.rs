//! Page data assembled through the facade crate

use mockito::Matcher;
use serde_json::json;
use vendsite::prelude::*;

const ENTRIES_PATH: &str = "/spaces/site/environments/master/entries";

fn repository(base_url: &str) -> ContentRepository {
	let settings = ContentfulSettings::builder()
		.space_id("site")
		.delivery_token("token")
		.base_url(base_url)
		.build();
	ContentRepository::new(ClientHandle::new(settings)).with_retry_policy(RetryPolicy::none())
}

#[tokio::test]
async fn test_blog_post_page_renders_linked_records() {
	// Arrange
	let mut server = mockito::Server::new_async().await;
	let body = json!({
		"total": 1,
		"items": [{
			"sys": {
				"id": "post1",
				"type": "Entry",
				"createdAt": "2024-05-02T08:00:00Z",
				"contentType": {"sys": {"type": "Link", "linkType": "ContentType", "id": "blogPost"}}
			},
			"fields": {
				"title": "Going Cashless",
				"slug": "going-cashless",
				"author": {"sys": {"type": "Link", "linkType": "Entry", "id": "author1"}},
				"featuredImage": {"sys": {"type": "Link", "linkType": "Asset", "id": "img1"}},
				"content": {
					"nodeType": "document",
					"content": [
						{"nodeType": "paragraph", "content": [
							{"nodeType": "text", "value": "Card readers ", "marks": []},
							{"nodeType": "text", "value": "double", "marks": [{"type": "bold"}]},
							{"nodeType": "text", "value": " sales.", "marks": []}
						]},
						{"nodeType": "embedded-asset-block", "data": {"target": {"sys": {"type": "Link", "linkType": "Asset", "id": "img1"}}}, "content": []}
					]
				}
			}
		}],
		"includes": {
			"Entry": [{
				"sys": {"id": "author1", "type": "Entry"},
				"fields": {"name": "Dana Whitfield"}
			}],
			"Asset": [{
				"sys": {"id": "img1", "type": "Asset"},
				"fields": {
					"title": "Card reader",
					"file": {"url": "//images.ctfassets.net/site/img1/reader.jpg", "contentType": "image/jpeg"}
				}
			}]
		}
	});
	let mock = server
		.mock("GET", ENTRIES_PATH)
		.match_query(Matcher::AllOf(vec![
			Matcher::UrlEncoded("content_type".into(), "blogPost".into()),
			Matcher::UrlEncoded("fields.slug".into(), "going-cashless".into()),
			Matcher::UrlEncoded("include".into(), "2".into()),
		]))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(body.to_string())
		.create_async()
		.await;
	let repository = repository(&server.url());

	// Act
	let post = repository.blog_post("Going-Cashless").await.unwrap();

	// Assert
	mock.assert_async().await;
	assert_eq!(post.source, DataSource::Cms);
	let post = post.data;
	assert_eq!(post.author.as_deref(), Some("Dana Whitfield"));
	assert_eq!(
		post.featured_image.as_ref().map(|image| image.url.as_str()),
		Some("https://images.ctfassets.net/site/img1/reader.jpg")
	);
	assert!(post.body_html.contains("<p>Card readers <strong>double</strong> sales.</p>"));
	assert!(post.body_html.contains("<img src=\"https://images.ctfassets.net/site/img1/reader.jpg\" alt=\"Card reader\">"));
	assert_eq!(post.excerpt, "Card readers double sales.");
	assert_eq!(post.reading_minutes, 1);
	assert!(post.published_at.is_some());
}

#[tokio::test]
async fn test_site_renders_without_credentials() {
	// Arrange
	let repository = ContentRepository::new(ClientHandle::new(ContentfulSettings::default()));

	// Act
	let goals = repository.business_goals().await.unwrap();
	let goal = repository
		.business_goal("expand-your-footprint")
		.await
		.unwrap();
	let fridges = repository.machines_by_type("smart-fridge").await.unwrap();

	// Assert
	assert!(goals.is_fallback());
	assert_eq!(goal.data.slug, "expand-footprint");
	assert!(!fridges.data.is_empty());
	assert!(fridges.data.iter().all(|machine| machine.kind == "smart-fridge"));
}
