use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header},
	response::Response,
};
use tower::util::ServiceExt;
use uuid::Uuid;

use mention_api::{routes, state::AppState};
use mention_testkit::{
	fixtures::{in_party, member, message, test_config},
	memory::{Calls, MemoryStores},
};

const PARTY: Uuid = Uuid::from_u128(0x0100);
const REQUESTER: Uuid = Uuid::from_u128(0x0900);
const HEADER: &str = "X-Mention-Member-Id";

/// A small directory: `Anna`, `annie`, an unverified `anneka`, and a party member `annbelle` who
/// opted out of search and recently chatted in the party.
fn fixture(fail: bool) -> (Router, Arc<Calls>) {
	let mut anneka = member(3, "anneka", 30);
	let mut annbelle = in_party(member(4, "annbelle", 1), PARTY);

	anneka.verified_username = false;
	annbelle.searchable_username = Some(false);

	let activity = vec![message(77, PARTY, &annbelle, 5)];
	let members = vec![
		member(1, "Anna", 10),
		member(2, "annie", 20),
		anneka,
		annbelle,
		in_party(member(0x0900, "host", 0), PARTY),
	];
	let mut stores = MemoryStores::new(members, activity);

	stores.fail_prefix = fail;

	let (stores, calls) = stores.into_stores();
	let mut config = test_config();

	config.http.cache_max_age_secs = 120;
	config.http.requester_header = HEADER.to_string();

	(routes::router(AppState::with_stores(config, stores)), calls)
}

async fn get(app: Router, uri: &str, member_id: Option<&str>) -> Response {
	let mut builder = Request::builder().uri(uri);

	if let Some(member_id) = member_id {
		builder = builder.header(HEADER, member_id);
	}

	app.oneshot(builder.body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Failed to call router.")
}

async fn json(response: Response) -> serde_json::Value {
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&body).expect("Failed to parse response.")
}

fn usernames(json: &serde_json::Value) -> Vec<String> {
	json.as_array()
		.expect("Response must be a JSON array.")
		.iter()
		.map(|item| item["username"].as_str().expect("username must be a string.").to_string())
		.collect()
}

#[tokio::test]
async fn health_ok() {
	let (app, _) = fixture(false);
	let response = get(app, "/health", None).await;

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unscoped_find_returns_recently_logged_in_members() {
	let (app, _) = fixture(false);
	let response = get(app, "/v1/members/find/@ann", None).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get(header::CACHE_CONTROL).and_then(|value| value.to_str().ok()),
		Some("private, max-age=120")
	);

	let json = json(response).await;

	assert_eq!(usernames(&json), vec!["annie", "Anna"]);
	assert_eq!(json[0]["id"], Uuid::from_u128(2).to_string());
	assert_eq!(json[0]["display_name"], "annie display");
	assert!(json[0]["contributor_level"].is_null());
}

#[tokio::test]
async fn party_scope_puts_private_chatters_first() {
	let (app, _) = fixture(false);
	let uri = format!("/v1/members/find/ann?context=party&id={PARTY}");
	let response = get(app, &uri, Some(&REQUESTER.to_string())).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(usernames(&json(response).await), vec!["annbelle"]);
}

#[tokio::test]
async fn party_scope_without_membership_is_silently_empty() {
	let (app, calls) = fixture(false);
	let uri = format!("/v1/members/find/ann?context=party&id={PARTY}");
	let response = get(app, &uri, None).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json(response).await, serde_json::json!([]));
	assert_eq!(calls.total(), 0);
}

#[tokio::test]
async fn lone_at_sign_touches_no_store() {
	let (app, calls) = fixture(false);
	let response = get(app, "/v1/members/find/@", Some(&REQUESTER.to_string())).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json(response).await, serde_json::json!([]));
	assert_eq!(calls.total(), 0);
}

#[tokio::test]
async fn unknown_context_and_unknown_requester_are_silently_empty() {
	let (app, calls) = fixture(false);
	let response = get(app.clone(), "/v1/members/find/ann?context=market", None).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json(response).await, serde_json::json!([]));

	let stranger = Uuid::from_u128(0xdead).to_string();
	let response = get(app, "/v1/members/find/ann", Some(&stranger)).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json(response).await, serde_json::json!([]));
	assert_eq!(Calls::get(&calls.requester), 1);
	assert_eq!(calls.total(), 1);
}

#[tokio::test]
async fn blank_username_is_rejected() {
	let (app, _) = fixture(false);
	let response = get(app, "/v1/members/find/%20%20", None).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = json(response).await;

	assert_eq!(json["error_code"], "INVALID_REQUEST");
	assert_eq!(json["fields"][0], "$.username");
}

#[tokio::test]
async fn malformed_requester_header_is_rejected() {
	let (app, _) = fixture(false);
	let response = get(app, "/v1/members/find/ann", Some("not-a-uuid")).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json(response).await["fields"][0], HEADER);
}

#[tokio::test]
async fn storage_failure_maps_to_internal_error() {
	let (app, _) = fixture(true);
	let response = get(app, "/v1/members/find/ann", None).await;

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(json(response).await["error_code"], "STORAGE_ERROR");
}
