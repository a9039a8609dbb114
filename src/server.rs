//! MCP server implementation.
//!
//! This module provides the JSON-RPC handler exposing the `search` tool,
//! the regions resource and the prompt templates, and runs it over STDIO
//! or SSE transports.

use crate::prompts;
use crate::regions::{REGIONS_URI, regions_resource};
use crate::tools::search::{SearchClient, SearchClientConfig};
use crate::types::{
    DuckDuckGoError, DuckDuckGoResult, SearchQuery, SearchResponse, SearchToolArgs,
    search_args_schema,
};
use crate::{SERVER_INSTRUCTIONS, SERVER_NAME, VERSION};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument};

/// MCP Protocol version
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Name of the search tool
pub const SEARCH_TOOL: &str = "search";

/// JSON-RPC parse error
pub const PARSE_ERROR: i32 = -32700;

/// JSON-RPC method not found
pub const METHOD_NOT_FOUND: i32 = -32601;

/// JSON-RPC invalid params
pub const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC internal error
pub const INTERNAL_ERROR: i32 = -32603;

/// MCP resource not found
pub const RESOURCE_NOT_FOUND: i32 = -32002;

/// Path that receives JSON-RPC requests on the HTTP transport
pub const RPC_PATH: &str = "/rpc";

/// Transport type for the MCP server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportType {
    /// Standard input/output transport
    #[default]
    Stdio,
    /// Server-Sent Events over HTTP
    Sse {
        /// Address to listen on
        addr: SocketAddr,
    },
}

/// Configuration for the MCP server
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Search client configuration
    pub client: SearchClientConfig,
}

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID; absent for notifications, while an explicit `null` is kept
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Option<Value>,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    /// Notifications carry no id and must not be answered
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Success result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }
}

/// MCP Tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTool {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: Option<String>,
    /// JSON Schema for input
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// MCP Resource definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResource {
    /// Resource URI
    pub uri: String,
    /// Resource name
    pub name: String,
    /// Resource description
    pub description: Option<String>,
    /// MIME type of the contents
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Request handler shared by all transports
#[derive(Clone)]
pub struct DuckDuckGoHandler {
    /// Search client
    search_client: Arc<SearchClient>,

    /// Initialization state
    initialized: Arc<RwLock<bool>>,
}

impl DuckDuckGoHandler {
    /// Create a new handler
    pub fn new(config: ServerConfig) -> DuckDuckGoResult<Self> {
        Ok(Self::with_client(SearchClient::with_config(config.client)?))
    }

    /// Create a handler around an existing client
    pub fn with_client(client: SearchClient) -> Self {
        Self {
            search_client: Arc::new(client),
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Whether `initialize` has been received
    pub async fn is_initialized(&self) -> bool {
        *self.initialized.read().await
    }

    /// Get server information for initialization
    pub fn get_server_info(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false },
                "prompts": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": VERSION
            },
            "instructions": SERVER_INSTRUCTIONS
        })
    }

    /// List available tools
    pub fn list_tools(&self) -> Vec<McpTool> {
        vec![McpTool {
            name: SEARCH_TOOL.to_string(),
            description: Some(
                "Search the web using DuckDuckGo. Returns structured results with title, URL and body snippet."
                    .to_string(),
            ),
            input_schema: search_args_schema(),
        }]
    }

    /// List available resources
    pub fn list_resources(&self) -> Vec<McpResource> {
        vec![McpResource {
            uri: REGIONS_URI.to_string(),
            name: "regions".to_string(),
            description: Some(
                "List supported region codes and human-readable names.".to_string(),
            ),
            mime_type: "application/json".to_string(),
        }]
    }

    /// Execute the search tool
    #[instrument(skip(self))]
    pub async fn execute_search(&self, query: SearchQuery) -> DuckDuckGoResult<SearchResponse> {
        self.search_client.search(&query).await
    }

    /// Read a resource by URI
    pub fn read_resource(&self, uri: &str) -> DuckDuckGoResult<Value> {
        match uri {
            REGIONS_URI => {
                let text = serde_json::to_string_pretty(&regions_resource())?;
                Ok(json!({
                    "contents": [{
                        "uri": REGIONS_URI,
                        "mimeType": "application/json",
                        "text": text
                    }]
                }))
            },
            _ => Err(DuckDuckGoError::NotFound(format!("resource '{}'", uri))),
        }
    }

    /// Render a prompt by name
    pub fn get_prompt(&self, name: &str, arguments: &Map<String, Value>) -> DuckDuckGoResult<Value> {
        let definition = prompts::find_prompt(name)
            .ok_or_else(|| DuckDuckGoError::NotFound(format!("prompt '{}'", name)))?;
        let text = prompts::render_prompt(name, arguments)?;

        Ok(json!({
            "description": definition.description,
            "messages": [{
                "role": "user",
                "content": { "type": "text", "text": text }
            }]
        }))
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %request.method, "Handling request");

        match request.method.as_str() {
            "initialize" => {
                let mut initialized = self.initialized.write().await;
                *initialized = true;
                JsonRpcResponse::success(request.id, self.get_server_info())
            },

            // Some clients send the bare name, others the notifications/ prefix
            "initialized" | "notifications/initialized" | "notifications/cancelled" => {
                JsonRpcResponse::success(request.id, json!({}))
            },

            "ping" => JsonRpcResponse::success(request.id, json!({})),

            "tools/list" => {
                let tools = self.list_tools();
                JsonRpcResponse::success(request.id, json!({ "tools": tools }))
            },

            "tools/call" => {
                let Some(params) = request.params else {
                    return JsonRpcResponse::error(
                        request.id,
                        INVALID_PARAMS,
                        "Missing parameters".to_string(),
                    );
                };

                let tool_name = params
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

                self.call_tool(request.id, tool_name, arguments).await
            },

            "resources/list" => {
                let resources = self.list_resources();
                JsonRpcResponse::success(request.id, json!({ "resources": resources }))
            },

            "resources/read" => {
                let uri = request
                    .params
                    .as_ref()
                    .and_then(|p| p.get("uri"))
                    .and_then(|v| v.as_str());

                let Some(uri) = uri else {
                    return JsonRpcResponse::error(
                        request.id,
                        INVALID_PARAMS,
                        "Missing resource uri".to_string(),
                    );
                };

                match self.read_resource(uri) {
                    Ok(result) => JsonRpcResponse::success(request.id, result),
                    Err(e @ DuckDuckGoError::NotFound(_)) => {
                        JsonRpcResponse::error(request.id, RESOURCE_NOT_FOUND, e.to_string())
                    },
                    Err(e) => JsonRpcResponse::error(request.id, INTERNAL_ERROR, e.to_string()),
                }
            },

            "prompts/list" => {
                let prompts = prompts::list_prompts();
                JsonRpcResponse::success(request.id, json!({ "prompts": prompts }))
            },

            "prompts/get" => {
                let params = request.params.unwrap_or(json!({}));
                let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
                    return JsonRpcResponse::error(
                        request.id,
                        INVALID_PARAMS,
                        "Missing prompt name".to_string(),
                    );
                };
                let arguments = params
                    .get("arguments")
                    .and_then(|v| v.as_object())
                    .cloned()
                    .unwrap_or_default();

                match self.get_prompt(name, &arguments) {
                    Ok(result) => JsonRpcResponse::success(request.id, result),
                    Err(e) => JsonRpcResponse::error(request.id, INVALID_PARAMS, e.to_string()),
                }
            },

            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    /// Call a specific tool
    async fn call_tool(&self, id: Option<Value>, name: &str, arguments: Value) -> JsonRpcResponse {
        info!(tool = %name, "Executing tool");

        match name {
            SEARCH_TOOL => {
                let args: SearchToolArgs = match serde_json::from_value(arguments) {
                    Ok(a) => a,
                    Err(e) => {
                        return JsonRpcResponse::error(
                            id,
                            INVALID_PARAMS,
                            format!("Invalid search arguments: {}", e),
                        );
                    },
                };

                // Parameter errors are rejected before any request goes out
                let query = match SearchQuery::try_from(args) {
                    Ok(q) => q,
                    Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
                };

                let result = self.execute_search(query).await.and_then(|response| {
                    let text = serde_json::to_string_pretty(&response)?;
                    Ok((text, response))
                });

                match result {
                    Ok((text, response)) => JsonRpcResponse::success(
                        id,
                        json!({
                            "content": [{ "type": "text", "text": text }],
                            "structuredContent": response,
                            "isError": false
                        }),
                    ),
                    Err(e) => {
                        error!(error = %e, "Search failed");
                        tool_error(id, &e)
                    },
                }
            },

            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Unknown tool: {}", name)),
        }
    }
}

/// Tool result reporting a failed call
fn tool_error(id: Option<Value>, err: &DuckDuckGoError) -> JsonRpcResponse {
    JsonRpcResponse::success(
        id,
        json!({
            "content": [{ "type": "text", "text": err.to_string() }],
            "isError": true
        }),
    )
}

/// Main MCP server
pub struct DuckDuckGoServer {
    handler: DuckDuckGoHandler,
}

impl DuckDuckGoServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> DuckDuckGoResult<Self> {
        Ok(Self {
            handler: DuckDuckGoHandler::new(config)?,
        })
    }

    /// Create a new server with default configuration
    pub fn with_defaults() -> DuckDuckGoResult<Self> {
        Self::new(ServerConfig::default())
    }

    /// Access the request handler
    pub fn handler(&self) -> &DuckDuckGoHandler {
        &self.handler
    }

    /// Run the server with the specified transport
    #[instrument(skip(self))]
    pub async fn run(self, transport: TransportType) -> DuckDuckGoResult<()> {
        info!(
            server = SERVER_NAME,
            version = VERSION,
            "Starting DuckDuckGo MCP server"
        );

        match transport {
            TransportType::Stdio => self.run_stdio().await,
            TransportType::Sse { addr } => self.run_sse(addr).await,
        }
    }

    /// Run the server with STDIO transport
    async fn run_stdio(self) -> DuckDuckGoResult<()> {
        info!("Starting STDIO transport");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();

        // Process JSON-RPC messages line by line
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            debug!(request = %line, "Received request");

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(e) => {
                    let error_response =
                        JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                    write_message(&mut stdout, &error_response).await?;
                    continue;
                },
            };

            let is_notification = request.is_notification();
            let response = self.handler.handle_request(request).await;

            if is_notification {
                debug!("Notification handled, no response sent");
                continue;
            }

            write_message(&mut stdout, &response).await?;
        }

        info!("STDIO server stopped");
        Ok(())
    }

    /// Run the server with SSE transport
    async fn run_sse(self, addr: SocketAddr) -> DuckDuckGoResult<()> {
        info!(addr = %addr, "Starting SSE transport");

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            DuckDuckGoError::ServerError(format!("Failed to bind to {}: {}", addr, e))
        })?;

        self.serve_http(listener).await
    }

    /// Serve the HTTP transport on an already bound listener
    ///
    /// `GET /sse` opens an event stream whose first `endpoint` event names
    /// the path to POST JSON-RPC requests to; responses come back in the
    /// POST body.
    pub async fn serve_http(self, listener: TcpListener) -> DuckDuckGoResult<()> {
        let app = http_router(self.handler);

        if let Ok(addr) = listener.local_addr() {
            info!("SSE server listening on http://{}", addr);
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| DuckDuckGoError::ServerError(format!("Server error: {}", e)))?;

        Ok(())
    }
}

fn http_router(handler: DuckDuckGoHandler) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sse", get(sse_handler))
        .route(RPC_PATH, post(rpc_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(handler))
}

async fn health() -> &'static str {
    "OK"
}

// Announce the request endpoint, then hold the stream open
async fn sse_handler() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let endpoint = stream::once(async { Ok(Event::default().event("endpoint").data(RPC_PATH)) });
    Sse::new(endpoint.chain(stream::pending())).keep_alive(KeepAlive::default())
}

async fn rpc_handler(
    State(handler): State<Arc<DuckDuckGoHandler>>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let is_notification = request.is_notification();
    let response = handler.handle_request(request).await;
    if is_notification {
        StatusCode::ACCEPTED.into_response()
    } else {
        Json(response).into_response()
    }
}

async fn write_message(
    stdout: &mut tokio::io::Stdout,
    response: &JsonRpcResponse,
) -> DuckDuckGoResult<()> {
    let response_str = serde_json::to_string(response)?;
    debug!(response = %response_str, "Sending response");
    stdout.write_all(response_str.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
