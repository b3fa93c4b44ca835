//! Protocol message types shared by every domain agent.
//!
//! These types are the structured values handed between the dispatcher,
//! the domain agents and the outbound channel. Wire encoding is plain
//! `serde_json`; nothing here performs I/O.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Client-assigned request identifier, echoed on the matching response.
pub type RequestId = i64;

/// Identifier of an execution context announced to the client.
pub type ExecutionContextId = i64;

/// The single well-known execution context, constant for the process lifetime.
pub const DEFAULT_EXECUTION_CONTEXT_ID: ExecutionContextId = 1;

/// Display name used for the well-known execution context when none is configured.
pub const DEFAULT_EXECUTION_CONTEXT_NAME: &str = "main";

/// Protocol error codes (JSON-RPC numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError,
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::ServerError => -32000,
        }
    }
}

impl TryFrom<i64> for ErrorCode {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -32700 => Ok(ErrorCode::ParseError),
            -32600 => Ok(ErrorCode::InvalidRequest),
            -32601 => Ok(ErrorCode::MethodNotFound),
            -32602 => Ok(ErrorCode::InvalidParams),
            -32603 => Ok(ErrorCode::InternalError),
            -32000 => Ok(ErrorCode::ServerError),
            other => Err(format!("unknown protocol error code {other}")),
        }
    }
}

/// Error payload carried by an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// An inbound command from the debugger client.
///
/// `method` on the wire is domain-qualified (`Runtime.enable`); it is split
/// into `domain` and `command` when the request is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub domain: String,
    pub command: String,
    pub params: Value,
}

/// Wire shape of a request before the method is split.
#[derive(Debug, Deserialize)]
struct RawRequest {
    id: RequestId,
    method: String,
    #[serde(default)]
    params: Value,
}

impl Request {
    pub fn new(id: RequestId, method: &str, params: Value) -> Result<Self, ErrorDetails> {
        let (domain, command) = method
            .split_once('.')
            .filter(|(domain, command)| !domain.is_empty() && !command.is_empty())
            .ok_or_else(|| {
                ErrorDetails::new(
                    ErrorCode::InvalidRequest,
                    format!("Method is not domain-qualified: {method}"),
                )
            })?;

        Ok(Self {
            id,
            domain: domain.to_string(),
            command: command.to_string(),
            params,
        })
    }

    /// Parse a request from its JSON text.
    ///
    /// Text that is not JSON is a `ParseError`; JSON that is not a request
    /// is an `InvalidRequest`. On failure the error carries the request id
    /// when one could still be recovered, so the caller can answer it.
    pub fn from_json(text: &str) -> Result<Self, (Option<RequestId>, ErrorDetails)> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            (
                None,
                ErrorDetails::new(ErrorCode::ParseError, format!("Invalid JSON: {e}")),
            )
        })?;
        let id = value.get("id").and_then(Value::as_i64);

        let raw: RawRequest = serde_json::from_value(value).map_err(|e| {
            (
                id,
                ErrorDetails::new(ErrorCode::InvalidRequest, format!("Malformed request: {e}")),
            )
        })?;

        Request::new(raw.id, &raw.method, raw.params).map_err(|e| (Some(raw.id), e))
    }

    /// The domain-qualified method name as sent by the client.
    pub fn method(&self) -> String {
        format!("{}.{}", self.domain, self.command)
    }
}

/// Outcome half of a response: exactly one of result or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseBody {
    Result(Value),
    Error(ErrorDetails),
}

/// Reply to a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: RequestId,
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        matches!(self.body, ResponseBody::Result(_))
    }

    pub fn error(&self) -> Option<&ErrorDetails> {
        match &self.body {
            ResponseBody::Error(details) => Some(details),
            ResponseBody::Result(_) => None,
        }
    }
}

/// Server-initiated event; carries no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Description of an execution context as announced to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContextDescription {
    pub id: ExecutionContextId,
    pub name: String,
}

/// `Runtime.executionContextCreated` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContextCreatedNotification {
    pub context: ExecutionContextDescription,
}

impl ExecutionContextCreatedNotification {
    pub const METHOD: &'static str = "Runtime.executionContextCreated";
}

impl From<ExecutionContextCreatedNotification> for Notification {
    fn from(note: ExecutionContextCreatedNotification) -> Self {
        Notification {
            method: ExecutionContextCreatedNotification::METHOD.to_string(),
            params: serde_json::json!({
                "context": {
                    "id": note.context.id,
                    "name": note.context.name,
                }
            }),
        }
    }
}

/// Anything the outbound channel can deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Response(Response),
    Notification(Notification),
}

impl From<Response> for OutboundMessage {
    fn from(response: Response) -> Self {
        OutboundMessage::Response(response)
    }
}

impl From<Notification> for OutboundMessage {
    fn from(notification: Notification) -> Self {
        OutboundMessage::Notification(notification)
    }
}

/// Session-level errors (transport, configuration, encoding).
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApiError {
    /// Invalid input parameter
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
    /// IO error on the transport or a config file
    #[error("IO error: {message}")]
    IoError { message: String },
    /// Message could not be encoded or decoded
    #[error("Protocol error: {message}")]
    ProtocolError { message: String },
    /// Outbound transport is no longer attached
    #[error("Transport closed")]
    TransportClosed,
}
