use std::sync::Arc;

use axum::{
	body::Body,
	http::{Request, StatusCode},
};
use tower::ServiceExt;

use wander_config::Search;
use wander_mcp::{McpAuthState, server};
use wander_service::WanderService;
use wander_storage::JsonStore;
use wander_testkit::{TestDir, heritage_destinations, heritage_tags};

fn router(dir: &TestDir, auth_state: McpAuthState) -> axum::Router {
	let service = WanderService::new(Search::default()).expect("service");

	service.reload(heritage_tags(), heritage_destinations()).expect("reload");

	server::build_router(
		auth_state,
		Arc::new(service),
		JsonStore::new(dir.join("tags.json"), dir.join("destinations.json")),
	)
}

fn static_token() -> McpAuthState {
	McpAuthState::StaticToken { bearer_token: "token-a".to_string() }
}

#[tokio::test]
async fn static_token_rejects_missing_bearer() {
	let dir = TestDir::new("wander_mcp_auth_missing").expect("temp dir");
	let response = router(&dir, static_token())
		.oneshot(Request::builder().uri("/mcp").body(Body::empty()).expect("request"))
		.await
		.expect("response");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn static_token_rejects_wrong_bearer() {
	let dir = TestDir::new("wander_mcp_auth_wrong").expect("temp dir");
	let response = router(&dir, static_token())
		.oneshot(
			Request::builder()
				.uri("/mcp")
				.header("Authorization", "Bearer token-b")
				.body(Body::empty())
				.expect("request"),
		)
		.await
		.expect("response");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn matching_bearer_reaches_the_mcp_transport() {
	let dir = TestDir::new("wander_mcp_auth_ok").expect("temp dir");
	let response = router(&dir, static_token())
		.oneshot(
			Request::builder()
				.uri("/mcp")
				.header("Authorization", "Bearer token-a")
				.body(Body::empty())
				.expect("request"),
		)
		.await
		.expect("response");

	assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}
