//! DomainAgent - base contract shared by every protocol domain.
//!
//! Holds the outbound channel and formats responses and notifications the
//! same way for every domain. Concrete agents compose a `DomainAgent` and
//! implement `DomainHandler` so the dispatcher can route requests to them.

use serde_json::Value;

use crate::api::types::{
    ErrorCode, ErrorDetails, Notification, OutboundMessage, Request, RequestId, Response,
    ResponseBody,
};
use crate::protocols::outbound::OutboundChannel;

/// Build a successful response with an empty result object.
pub fn make_ok_response(id: RequestId) -> Response {
    make_result_response(id, Value::Object(Default::default()))
}

/// Build a successful response carrying `result`.
pub fn make_result_response(id: RequestId, result: Value) -> Response {
    Response {
        id,
        body: ResponseBody::Result(result),
    }
}

/// Build an error response.
pub fn make_error_response(id: RequestId, code: ErrorCode, message: impl Into<String>) -> Response {
    Response {
        id,
        body: ResponseBody::Error(ErrorDetails::new(code, message)),
    }
}

/// Base state every domain agent carries.
#[derive(Debug, Clone)]
pub struct DomainAgent {
    outbound: OutboundChannel,
}

impl DomainAgent {
    pub fn new(outbound: OutboundChannel) -> Self {
        Self { outbound }
    }

    /// Send the single response for a request.
    pub fn send_response_to_client(&self, response: Response) {
        log::trace!("Sending response: id={}, ok={}", response.id, response.is_ok());
        self.outbound.send(OutboundMessage::Response(response));
    }

    /// Send a notification immediately.
    pub fn send_notification_to_client(&self, notification: impl Into<Notification>) {
        let notification = notification.into();
        log::trace!("Sending notification: method={}", notification.method);
        self.outbound.send(OutboundMessage::Notification(notification));
    }

    /// Handle for engine threads that report events outside command processing.
    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.outbound.clone())
    }
}

/// Cloneable notification handle usable from any thread.
#[derive(Debug, Clone)]
pub struct Notifier {
    outbound: OutboundChannel,
}

impl Notifier {
    pub fn new(outbound: OutboundChannel) -> Self {
        Self { outbound }
    }

    pub fn send_notification_to_client(&self, notification: impl Into<Notification>) {
        self.outbound.send(OutboundMessage::Notification(notification.into()));
    }
}

/// A domain agent the dispatcher can route requests to.
///
/// Implementations must send exactly one response for every request they
/// receive, including rejected ones.
pub trait DomainHandler: Send {
    /// Domain name as used in method prefixes (e.g. `Runtime`).
    fn domain(&self) -> &'static str;

    /// Process one request to completion.
    fn handle_request(&mut self, request: &Request);
}
