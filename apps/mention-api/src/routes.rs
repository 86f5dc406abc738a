use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::{HeaderMap, HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
	routing::get,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use mention_domain::{
	scope::{Requester, ScopeContext},
	username,
};
use mention_service::{AutocompleteItem, AutocompleteRequest, Error as ServiceError};

#[derive(Debug, Default, Deserialize)]
pub struct FindQuery {
	pub context: Option<String>,
	pub id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage failure while serving request.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"STORAGE_ERROR",
					"Storage is unavailable.",
					None,
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/members/find/{username}", get(find_members))
		.with_state(state)
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn find_members(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(username): Path<String>,
	Query(query): Query<FindQuery>,
) -> Result<Response, ApiError> {
	if username.trim().is_empty() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			"username must be non-empty.",
			Some(vec!["$.username".to_string()]),
		));
	}

	let max_age = state.service.cfg.http.cache_max_age_secs;

	if username::normalize_prefix(&username).is_none() {
		return Ok(members_response(Vec::new(), max_age));
	}

	let context = match query.context.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
		None => None,
		Some(raw) => match ScopeContext::parse(raw) {
			Some(context) => Some(context),
			None => {
				tracing::debug!("Unknown autocomplete context.");

				return Ok(members_response(Vec::new(), max_age));
			},
		},
	};
	let Some(requester) = resolve_requester(&state, &headers).await? else {
		tracing::debug!("Unknown autocomplete requester.");

		return Ok(members_response(Vec::new(), max_age));
	};
	let group_id = query.id.as_deref().and_then(|raw| Uuid::parse_str(raw.trim()).ok());
	let request = AutocompleteRequest {
		username,
		context,
		group_id,
		requester_party_id: requester.party_id,
		requester_guild_ids: requester.guild_ids,
	};
	let response = state.service.resolve_autocomplete(request).await?;

	Ok(members_response(response.items, max_age))
}

/// Reads the authenticated member from the configured header.
///
/// A missing header is an anonymous requester without memberships. A member id that is not in the
/// directory yields `None`.
async fn resolve_requester(
	state: &AppState,
	headers: &HeaderMap,
) -> Result<Option<Requester>, ApiError> {
	let header_name = state.service.cfg.http.requester_header.as_str();
	let Some(value) = headers.get(header_name) else {
		return Ok(Some(Requester::default()));
	};
	let member_id = value
		.to_str()
		.ok()
		.and_then(|raw| Uuid::parse_str(raw.trim()).ok())
		.ok_or_else(|| {
			json_error(
				StatusCode::BAD_REQUEST,
				"INVALID_REQUEST",
				format!("{header_name} must be a member id."),
				Some(vec![header_name.to_string()]),
			)
		})?;

	Ok(state.service.load_requester(member_id).await?)
}

fn members_response(items: Vec<AutocompleteItem>, max_age: u64) -> Response {
	let mut response = Json(items).into_response();

	if let Ok(value) = HeaderValue::from_str(&format!("private, max-age={max_age}")) {
		response.headers_mut().insert(header::CACHE_CONTROL, value);
	}

	response
}
