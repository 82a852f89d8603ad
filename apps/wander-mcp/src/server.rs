use std::{net::SocketAddr, sync::Arc};

use axum::{
	Router,
	body::Body,
	extract::State,
	http::{HeaderMap, Request, StatusCode},
	middleware::{self, Next},
	response::IntoResponse,
};
use color_eyre::Result;
use parking_lot::Mutex;
use rmcp::{
	ErrorData, ServerHandler,
	handler::server::router::tool::ToolRouter,
	model::{CallToolResult, JsonObject, ServerCapabilities, ServerInfo},
	transport::streamable_http_server::{
		StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
	},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::McpAuthState;
use wander_domain::Destination;
use wander_service::{CategoryRequest, SearchRequest, TagSearchRequest, WanderService};
use wander_storage::JsonStore;

pub const TOOL_SEARCH_TAGS: &str = "search_tags";
pub const TOOL_MATCH_DESTINATIONS: &str = "match_destinations";
pub const TOOL_TAGS_BY_CATEGORY: &str = "tags_by_category";
pub const TOOL_CATALOG_STATS: &str = "catalog_stats";
pub const TOOL_RELOAD_CATALOG: &str = "reload_catalog";
pub const TOOL_UPSERT_DESTINATION: &str = "upsert_destination";
pub const TOOL_EXPORT_TAGS: &str = "export_tags";

const HEADER_AUTHORIZATION: &str = "Authorization";

#[derive(Debug, Deserialize)]
struct UpsertParams {
	destination: Destination,
}

#[derive(Debug, Serialize)]
struct ExportReport {
	tag_count: usize,
	path: String,
}

#[derive(Clone)]
pub struct WanderMcp {
	service: Arc<WanderService>,
	store: Arc<JsonStore>,
	/// Serializes every tool that reads or writes the record files against the snapshot.
	persist: Arc<Mutex<()>>,
	tool_router: ToolRouter<Self>,
}
impl WanderMcp {
	pub fn new(service: Arc<WanderService>, store: JsonStore) -> Self {
		Self {
			service,
			store: Arc::new(store),
			persist: Arc::new(Mutex::new(())),
			tool_router: Self::tool_router(),
		}
	}
}

#[rmcp::tool_router]
impl WanderMcp {
	#[rmcp::tool(
		name = "search_tags",
		description = "Find canonical travel tags whose synonyms start with a prefix, optionally in one language.",
		input_schema = search_tags_schema()
	)]
	async fn search_tags(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let req: TagSearchRequest = parse_params(params)?;

		match self.service.search_tags(req) {
			Ok(response) => structured(&response),
			Err(err) => service_error(err),
		}
	}

	#[rmcp::tool(
		name = "match_destinations",
		description = "Resolve multilingual descriptor phrases to tags and rank destinations by weighted tag match.",
		input_schema = match_destinations_schema()
	)]
	async fn match_destinations(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let req: SearchRequest = parse_params(params)?;

		match self.service.search(req) {
			Ok(response) => structured(&response),
			Err(err) => service_error(err),
		}
	}

	#[rmcp::tool(
		name = "tags_by_category",
		description = "List every tag in a category such as scenery, culture, activity or budget.",
		input_schema = tags_by_category_schema()
	)]
	async fn tags_by_category(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let req: CategoryRequest = parse_params(params)?;

		match self.service.tags_by_category(req) {
			Ok(response) => structured(&response),
			Err(err) => service_error(err),
		}
	}

	#[rmcp::tool(
		name = "catalog_stats",
		description = "Report tag and destination counts, indexed languages, categories and the snapshot version.",
		input_schema = empty_schema()
	)]
	async fn catalog_stats(&self, _params: JsonObject) -> Result<CallToolResult, ErrorData> {
		structured(&self.service.stats())
	}

	#[rmcp::tool(
		name = "reload_catalog",
		description = "Re-read the configured tag and destination files and publish them if they validate.",
		input_schema = empty_schema()
	)]
	async fn reload_catalog(&self, _params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let _persist = self.persist.lock();
		let records = match self.store.load() {
			Ok(records) => records,
			Err(err) => {
				tracing::warn!(error = %err, "Reload failed to read records.");

				return Ok(tool_error("storage", &err.to_string(), Value::Null));
			},
		};

		match self.service.reload(records.tags, records.destinations) {
			Ok(report) => structured(&report),
			Err(err) => service_error(err),
		}
	}

	#[rmcp::tool(
		name = "upsert_destination",
		description = "Insert or replace one destination and persist the destination file.",
		input_schema = upsert_destination_schema()
	)]
	async fn upsert_destination(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let UpsertParams { destination } = parse_params(params)?;
		let _persist = self.persist.lock();
		let report = match self.service.upsert_destination(destination) {
			Ok(report) => report,
			Err(err) => return service_error(err),
		};

		if let Err(err) = self.store.save_destinations(self.service.destination_records()) {
			tracing::error!(error = %err, "Destination file was not updated.");

			return Ok(tool_error(
				"storage",
				&format!("Snapshot {} is active but was not persisted: {err}", report.version),
				Value::Null,
			));
		}

		structured(&report)
	}

	#[rmcp::tool(
		name = "export_tags",
		description = "Write the active tag catalog to the configured tags file.",
		input_schema = empty_schema()
	)]
	async fn export_tags(&self, _params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let _persist = self.persist.lock();
		let tags = self.service.tag_records();
		let tag_count = tags.len();

		if let Err(err) = self.store.save_tags(tags) {
			tracing::error!(error = %err, "Tag export failed.");

			return Ok(tool_error("storage", &err.to_string(), Value::Null));
		}

		structured(&ExportReport { tag_count, path: self.store.tags_path().display().to_string() })
	}
}

#[rmcp::tool_handler]
impl ServerHandler for WanderMcp {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			instructions: Some(
				"Wander resolves multilingual travel descriptors to tags and ranks destinations."
					.to_string(),
			),
			capabilities: ServerCapabilities::builder().enable_tools().build(),
			..Default::default()
		}
	}
}

pub async fn serve_mcp(
	bind_addr: &str,
	auth_state: McpAuthState,
	service: Arc<WanderService>,
	store: JsonStore,
) -> Result<()> {
	let bind_addr: SocketAddr = bind_addr.parse()?;
	let router = build_router(auth_state, service, store);
	let listener = TcpListener::bind(bind_addr).await?;

	tracing::info!(%bind_addr, tools = ?tool_names(), "MCP server listening.");

	axum::serve(listener, router).await?;

	Ok(())
}

pub fn build_router(
	auth_state: McpAuthState,
	service: Arc<WanderService>,
	store: JsonStore,
) -> Router {
	let mcp = WanderMcp::new(service, store);
	let session_manager: Arc<LocalSessionManager> = Default::default();
	let service = StreamableHttpService::new(
		move || Ok(mcp.clone()),
		session_manager,
		StreamableHttpServerConfig::default(),
	);

	Router::new()
		.fallback_service(service)
		.layer(middleware::from_fn_with_state(auth_state, mcp_auth_middleware))
}

pub fn tool_names() -> Vec<String> {
	WanderMcp::tool_router().list_all().into_iter().map(|tool| tool.name.to_string()).collect()
}

fn parse_params<T>(params: JsonObject) -> Result<T, ErrorData>
where
	T: DeserializeOwned,
{
	serde_json::from_value(Value::Object(params))
		.map_err(|err| ErrorData::invalid_params(format!("Invalid arguments: {err}"), None))
}

fn structured<T>(value: &T) -> Result<CallToolResult, ErrorData>
where
	T: Serialize,
{
	let value = serde_json::to_value(value).map_err(|err| {
		ErrorData::internal_error(format!("Failed to encode tool result: {err}"), None)
	})?;

	Ok(CallToolResult::structured(value))
}

fn tool_error(kind: &str, message: &str, detail: Value) -> CallToolResult {
	CallToolResult::structured_error(serde_json::json!({
		"error": kind,
		"message": message,
		"detail": detail,
	}))
}

fn service_error(err: wander_service::Error) -> Result<CallToolResult, ErrorData> {
	match err {
		wander_service::Error::InvalidRequest { message } =>
			Err(ErrorData::invalid_params(message, None)),
		wander_service::Error::Validation(inner) => {
			let message = inner.to_string();
			let wander_index::Error::Validation { kind, id, message: reason } = inner;

			Ok(tool_error(
				"validation",
				&message,
				serde_json::json!({ "kind": kind, "id": id, "reason": reason }),
			))
		},
		other => Err(ErrorData::internal_error(other.to_string(), None)),
	}
}

fn is_authorized(headers: &HeaderMap, auth_state: &McpAuthState) -> bool {
	match auth_state {
		McpAuthState::Off => true,
		McpAuthState::StaticToken { bearer_token } =>
			read_bearer_token(headers).is_some_and(|token| token == bearer_token),
	}
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(HEADER_AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

async fn mcp_auth_middleware(
	State(auth_state): State<McpAuthState>,
	req: Request<Body>,
	next: Next,
) -> axum::response::Response {
	if !is_authorized(req.headers(), &auth_state) {
		return (
			StatusCode::UNAUTHORIZED,
			"Authentication required for security.auth_mode=static_token with a Bearer token.",
		)
			.into_response();
	}

	next.run(req).await
}

fn search_tags_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["prefix"],
		"properties": {
			"prefix": { "type": "string" },
			"language": { "type": ["string", "null"] },
			"limit": { "type": ["integer", "null"], "minimum": 0 }
		}
	}))
}

fn match_destinations_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["phrases"],
		"properties": {
			"phrases": {
				"type": "array",
				"items": {
					"type": "object",
					"additionalProperties": false,
					"required": ["text"],
					"properties": {
						"text": { "type": "string" },
						"language": { "type": ["string", "null"] }
					}
				}
			},
			"top_k": { "type": ["integer", "null"], "minimum": 0 },
			"min_score": { "type": ["number", "null"] },
			"explain": { "type": "boolean" },
			"language": { "type": ["string", "null"] }
		}
	}))
}

fn tags_by_category_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["category"],
		"properties": {
			"category": { "type": "string" },
			"language": { "type": ["string", "null"] }
		}
	}))
}

fn upsert_destination_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["destination"],
		"properties": {
			"destination": {
				"type": "object",
				"additionalProperties": false,
				"required": ["id"],
				"properties": {
					"id": { "type": "string" },
					"display_name": { "type": "object", "additionalProperties": { "type": "string" } },
					"tags": { "type": "object", "additionalProperties": { "type": "number" } },
					"coordinates": {
						"type": ["object", "null"],
						"required": ["lat", "lng"],
						"properties": {
							"lat": { "type": "number" },
							"lng": { "type": "number" }
						}
					},
					"country_code": { "type": ["string", "null"] },
					"administrative_level": { "type": ["string", "null"] },
					"metadata": { "type": "object", "additionalProperties": true }
				}
			}
		}
	}))
}

fn empty_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"properties": {}
	}))
}

#[cfg(test)]
mod tests {
	use std::{sync::Arc, time::Duration};

	use axum::http::HeaderMap;
	use rmcp::model::JsonObject;
	use serde_json::{Value, json};

	use super::{
		TOOL_CATALOG_STATS, TOOL_MATCH_DESTINATIONS, TOOL_RELOAD_CATALOG, TOOL_SEARCH_TAGS,
		TOOL_EXPORT_TAGS, TOOL_TAGS_BY_CATEGORY, TOOL_UPSERT_DESTINATION, WanderMcp,
	};
	use crate::McpAuthState;
	use wander_config::Search;
	use wander_service::WanderService;
	use wander_storage::JsonStore;
	use wander_testkit::{TestDir, destination, heritage_destinations, heritage_tags};

	fn params(value: Value) -> JsonObject {
		match value {
			Value::Object(map) => map,
			other => panic!("expected an object, got {other}"),
		}
	}

	fn mcp(dir: &TestDir) -> WanderMcp {
		let service = WanderService::new(Search::default()).expect("service");

		service.reload(heritage_tags(), heritage_destinations()).expect("reload");

		let store = JsonStore::new(dir.join("tags.json"), dir.join("destinations.json"));

		WanderMcp::new(Arc::new(service), store)
	}

	#[test]
	fn registers_all_tools() {
		let tools = super::tool_names();
		let expected = [
			TOOL_SEARCH_TAGS,
			TOOL_MATCH_DESTINATIONS,
			TOOL_TAGS_BY_CATEGORY,
			TOOL_CATALOG_STATS,
			TOOL_RELOAD_CATALOG,
			TOOL_UPSERT_DESTINATION,
			TOOL_EXPORT_TAGS,
		];

		for name in expected {
			assert!(tools.iter().any(|tool| tool == name), "Missing tool registration: {name}.");
		}

		assert_eq!(tools.len(), expected.len(), "Unexpected tool count for MCP registration.");
	}

	#[tokio::test]
	async fn match_destinations_returns_ranked_results() {
		let dir = TestDir::new("wander_mcp_match").expect("temp dir");
		let mcp = mcp(&dir);
		let result = mcp
			.match_destinations(params(json!({
				"phrases": [{ "text": "heritage", "language": "en" }],
				"top_k": 2
			})))
			.await
			.expect("tool call");
		let content = result.structured_content.expect("structured content");

		assert_eq!(content["results"][0]["destination_id"], "D1");
		assert_eq!(content["results"][1]["destination_id"], "D2");
		assert_eq!(content["unresolved_phrases"], json!([]));
	}

	#[tokio::test]
	async fn malformed_arguments_are_invalid_params() {
		let dir = TestDir::new("wander_mcp_invalid").expect("temp dir");
		let mcp = mcp(&dir);

		assert!(mcp.match_destinations(params(json!({ "phrases": "heritage" }))).await.is_err());
	}

	#[tokio::test]
	async fn upsert_persists_the_destination_file() {
		let dir = TestDir::new("wander_mcp_upsert").expect("temp dir");
		let mcp = mcp(&dir);
		let result = mcp
			.upsert_destination(params(json!({
				"destination": { "id": "D3", "tags": { "historic": 0.6 } }
			})))
			.await
			.expect("tool call");

		assert_ne!(result.is_error, Some(true));

		let saved = JsonStore::new(dir.join("tags.json"), dir.join("destinations.json"))
			.load_destinations()
			.expect("saved destinations");

		assert_eq!(saved.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), ["D1", "D2", "D3"]);
	}

	#[tokio::test]
	async fn export_writes_the_active_catalog() {
		let dir = TestDir::new("wander_mcp_export").expect("temp dir");
		let mcp = mcp(&dir);
		let result = mcp.export_tags(JsonObject::new()).await.expect("tool call");

		assert_ne!(result.is_error, Some(true));
		assert_eq!(result.structured_content.expect("structured content")["tag_count"], 1);

		let saved = JsonStore::new(dir.join("tags.json"), dir.join("destinations.json"))
			.load_tags()
			.expect("saved tags");

		assert_eq!(saved, heritage_tags());
	}

	#[tokio::test]
	async fn reload_after_upsert_serves_the_persisted_destination() {
		let dir = TestDir::new("wander_mcp_reload_upsert").expect("temp dir");
		let mcp = mcp(&dir);

		mcp.export_tags(JsonObject::new()).await.expect("export");
		mcp.upsert_destination(params(json!({
			"destination": { "id": "D3", "tags": { "historic": 0.6 } }
		})))
		.await
		.expect("upsert");

		let result = mcp.reload_catalog(JsonObject::new()).await.expect("reload");

		assert_ne!(result.is_error, Some(true));

		let live = mcp.service.destination_records();

		assert_eq!(live.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), ["D1", "D2", "D3"]);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn reload_waits_for_a_pending_upsert() {
		let dir = TestDir::new("wander_mcp_reload_wait").expect("temp dir");
		let mcp = mcp(&dir);

		mcp.export_tags(JsonObject::new()).await.expect("export");

		let persist = mcp.persist.lock();
		let reloader = mcp.clone();
		let mut reload =
			tokio::spawn(async move { reloader.reload_catalog(JsonObject::new()).await });

		assert!(
			tokio::time::timeout(Duration::from_millis(100), &mut reload).await.is_err(),
			"reload ran while the record files were locked"
		);

		// Stands in for an upsert that published and saved while the reload was waiting.
		mcp.store
			.save_destinations(vec![destination("D1", &[("historic", 0.9)])])
			.expect("save destinations");
		drop(persist);

		let result = reload.await.expect("join").expect("reload");

		assert_ne!(result.is_error, Some(true));
		assert_eq!(mcp.service.destination_records().len(), 1);
	}

	#[tokio::test]
	async fn rejected_upsert_reports_validation_detail() {
		let dir = TestDir::new("wander_mcp_reject").expect("temp dir");
		let mcp = mcp(&dir);
		let result = mcp
			.upsert_destination(params(json!({
				"destination": { "id": "D3", "tags": { "beach": 0.6 } }
			})))
			.await
			.expect("tool call");

		assert_eq!(result.is_error, Some(true));

		let content = result.structured_content.expect("structured content");

		assert_eq!(content["error"], "validation");
		assert_eq!(content["detail"]["kind"], "destination");
		assert_eq!(content["detail"]["id"], "D3");
		assert!(!dir.join("destinations.json").exists());
	}

	#[tokio::test]
	async fn reload_reports_missing_files() {
		let dir = TestDir::new("wander_mcp_reload").expect("temp dir");
		let mcp = mcp(&dir);
		let result = mcp.reload_catalog(JsonObject::new()).await.expect("tool call");

		assert_eq!(result.is_error, Some(true));
		assert_eq!(result.structured_content.expect("structured content")["error"], "storage");
	}

	#[test]
	fn off_mode_allows_requests_without_auth_header() {
		let headers = HeaderMap::new();

		assert!(super::is_authorized(&headers, &McpAuthState::Off));
	}

	#[test]
	fn static_token_mode_requires_authorization_bearer_header() {
		let mut headers = HeaderMap::new();

		headers
			.insert(super::HEADER_AUTHORIZATION, "Bearer token-a".parse().expect("valid header"));

		assert!(super::is_authorized(
			&headers,
			&McpAuthState::StaticToken { bearer_token: "token-a".to_string() }
		));
	}

	#[test]
	fn static_token_mode_rejects_non_bearer_schemes() {
		let mut headers = HeaderMap::new();

		headers
			.insert(super::HEADER_AUTHORIZATION, "bearer token-a".parse().expect("valid header"));

		assert!(!super::is_authorized(
			&headers,
			&McpAuthState::StaticToken { bearer_token: "token-a".to_string() }
		));
	}
}
