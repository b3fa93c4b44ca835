//! RuntimeDomainAgent - the `Runtime` domain.
//!
//! Handles the enable/disable lifecycle and announces the well-known
//! execution context when the client enables the domain. `disable` is
//! rejected by the lifecycle itself; every other command goes through
//! `check_runtime_enabled` first.

use crate::api::types::{
    ErrorCode, ErrorDetails, ExecutionContextCreatedNotification, ExecutionContextDescription,
    Request,
};
use crate::protocols::domain_agent::{
    make_error_response, make_ok_response, DomainAgent, DomainHandler, Notifier,
};
use crate::protocols::lifecycle::DomainLifecycle;
use crate::protocols::outbound::OutboundChannel;

pub const RUNTIME_DOMAIN: &str = "Runtime";

/// Commands understood by the Runtime domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeCommand {
    Enable,
    Disable,
    DiscardConsoleEntries,
    RunIfWaitingForDebugger,
}

impl RuntimeCommand {
    pub fn parse(command: &str) -> Option<Self> {
        match command {
            "enable" => Some(Self::Enable),
            "disable" => Some(Self::Disable),
            "discardConsoleEntries" => Some(Self::DiscardConsoleEntries),
            "runIfWaitingForDebugger" => Some(Self::RunIfWaitingForDebugger),
            _ => None,
        }
    }
}

pub struct RuntimeDomainAgent {
    base: DomainAgent,
    lifecycle: DomainLifecycle,
    context: ExecutionContextDescription,
}

impl RuntimeDomainAgent {
    pub fn new(outbound: OutboundChannel, context: ExecutionContextDescription) -> Self {
        Self {
            base: DomainAgent::new(outbound),
            lifecycle: DomainLifecycle::new(RUNTIME_DOMAIN),
            context,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.lifecycle.is_enabled()
    }

    pub fn notifier(&self) -> Notifier {
        self.base.notifier()
    }

    /// `Runtime.enable`: respond, then announce the execution context.
    pub fn enable(&mut self, req: &Request) {
        if let Err(e) = self.lifecycle.enable() {
            // Can't enable twice without disabling
            self.reject(req, e);
            return;
        }

        self.base.send_response_to_client(make_ok_response(req.id));

        log::info!(
            "Runtime enabled, announcing execution context: id={}, name={}",
            self.context.id,
            self.context.name
        );
        self.base
            .send_notification_to_client(ExecutionContextCreatedNotification {
                context: self.context.clone(),
            });
    }

    /// `Runtime.disable`. Rejected by the lifecycle's enablement guard when
    /// the domain is already disabled.
    pub fn disable(&mut self, req: &Request) {
        if let Err(e) = self.lifecycle.disable() {
            self.reject(req, e);
            return;
        }
        log::info!("Runtime disabled");
        self.base.send_response_to_client(make_ok_response(req.id));
    }

    /// Enablement guard. Sends the error response and returns `false` when
    /// the domain is disabled; the caller must then stop processing `req`.
    pub fn check_runtime_enabled(&self, req: &Request) -> bool {
        match self.lifecycle.check_enabled() {
            Ok(()) => true,
            Err(e) => {
                self.reject(req, e);
                false
            }
        }
    }

    fn reject(&self, req: &Request, e: ErrorDetails) {
        log::debug!("Rejecting {}: id={}, {}", req.method(), req.id, e.message);
        self.base
            .send_response_to_client(make_error_response(req.id, e.code, e.message));
    }

    fn discard_console_entries(&self, req: &Request) {
        if !self.check_runtime_enabled(req) {
            return;
        }
        self.base.send_response_to_client(make_ok_response(req.id));
    }

    fn run_if_waiting_for_debugger(&self, req: &Request) {
        if !self.check_runtime_enabled(req) {
            return;
        }
        self.base.send_response_to_client(make_ok_response(req.id));
    }
}

impl DomainHandler for RuntimeDomainAgent {
    fn domain(&self) -> &'static str {
        RUNTIME_DOMAIN
    }

    fn handle_request(&mut self, request: &Request) {
        match RuntimeCommand::parse(&request.command) {
            Some(RuntimeCommand::Enable) => self.enable(request),
            Some(RuntimeCommand::Disable) => self.disable(request),
            Some(RuntimeCommand::DiscardConsoleEntries) => self.discard_console_entries(request),
            Some(RuntimeCommand::RunIfWaitingForDebugger) => {
                self.run_if_waiting_for_debugger(request)
            }
            None => {
                log::debug!("[cdp] Unknown Runtime command: {}", request.command);
                self.base.send_response_to_client(make_error_response(
                    request.id,
                    ErrorCode::MethodNotFound,
                    format!("Unsupported method '{}'", request.method()),
                ));
            }
        }
    }
}
