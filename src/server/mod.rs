//! MCP server over stdio: newline-delimited JSON-RPC 2.0.
//!
//! stdout carries protocol frames only; all logging goes to stderr.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::{dispatch::Dispatcher, error::ToolError};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC request or notification.
#[derive(Debug, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    /// `None` only when the member is absent (a notification); `"id": null`
    /// is a request and is answered.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

#[derive(Debug, Serialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpResponse {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
                data,
            }),
        }
    }
}

/// JSON-RPC code for each tool failure kind.
pub fn error_code(err: &ToolError) -> i32 {
    match err {
        ToolError::NotFound(_) => METHOD_NOT_FOUND,
        ToolError::Validation { .. } => INVALID_PARAMS,
        ToolError::Internal { .. } => INTERNAL_ERROR,
    }
}

/// Serve until stdin closes.
pub async fn run_stdio(dispatcher: Dispatcher) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(&dispatcher, stdin, stdout).await
}

/// Read one request per line from `reader` and write responses to `writer`,
/// strictly in arrival order.
pub async fn serve<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!(tools = dispatcher.catalog().len(), "MCP server starting");
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.context("reading request")? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handle_line(dispatcher, &line).await {
            let mut frame = serde_json::to_vec(&response).context("encoding response")?;
            frame.push(b'\n');
            writer.write_all(&frame).await.context("writing response")?;
            writer.flush().await.context("flushing response")?;
        }
    }
    info!("stdin closed, MCP server shutting down");
    Ok(())
}

/// Handle one raw line. `None` means nothing is sent back (notifications).
pub async fn handle_line(dispatcher: &Dispatcher, line: &str) -> Option<McpResponse> {
    let value = match serde_json::from_str::<Value>(line) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "unparseable request");
            return Some(McpResponse::error(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {}", e),
                None,
            ));
        }
    };
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    match serde_json::from_value::<McpRequest>(value) {
        Ok(request) if request.jsonrpc == "2.0" => handle_request(dispatcher, request).await,
        Ok(request) => {
            warn!(jsonrpc = %request.jsonrpc, "unsupported protocol version");
            request.id.map(|id| {
                McpResponse::error(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid Request: unsupported jsonrpc version {:?}", request.jsonrpc),
                    None,
                )
            })
        }
        Err(e) => {
            warn!(error = %e, "invalid request");
            Some(McpResponse::error(
                id,
                INVALID_REQUEST,
                format!("Invalid Request: {}", e),
                None,
            ))
        }
    }
}

pub async fn handle_request(dispatcher: &Dispatcher, request: McpRequest) -> Option<McpResponse> {
    debug!(method = %request.method, "request received");
    let Some(id) = request.id else {
        debug!(method = %request.method, "notification");
        return None;
    };

    let response = match request.method.as_str() {
        "initialize" => McpResponse::result(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {
                    "tools": {}
                }
            }),
        ),
        "ping" => McpResponse::result(id, json!({})),
        "tools/list" => McpResponse::result(id, json!({ "tools": dispatcher.tools() })),
        "tools/call" => {
            let params = request.params.unwrap_or(Value::Null);
            let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
            let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
            match dispatcher.invoke(name, &arguments).await {
                Ok(text) => McpResponse::result(
                    id,
                    json!({
                        "content": [{ "type": "text", "text": text }]
                    }),
                ),
                Err(e) => McpResponse::error(
                    id,
                    error_code(&e),
                    e.to_string(),
                    Some(json!({ "kind": e.kind() })),
                ),
            }
        }
        other => {
            warn!(method = other, "unknown method");
            McpResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
                None,
            )
        }
    };
    Some(response)
}
