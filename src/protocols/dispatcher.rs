//! Dispatcher - routes client requests to the owning domain agent.
//!
//! The dispatcher owns every agent for the session's lifetime and processes
//! one request at a time, so agents mutate their own state through `&mut self`
//! without further locking. Requests it cannot route are answered here, which
//! keeps the one-response-per-request contract intact.

use std::collections::HashMap;

use crate::api::types::{
    ErrorCode, ExecutionContextDescription, OutboundMessage, Request, DEFAULT_EXECUTION_CONTEXT_ID,
};
use crate::config::SessionConfig;
use crate::protocols::cdp::RuntimeDomainAgent;
use crate::protocols::domain_agent::{make_error_response, DomainHandler, Notifier};
use crate::protocols::outbound::OutboundChannel;

pub struct Dispatcher {
    outbound: OutboundChannel,
    agents: HashMap<&'static str, Box<dyn DomainHandler>>,
}

impl Dispatcher {
    /// Empty dispatcher; register agents with `register`.
    pub fn new(outbound: OutboundChannel) -> Self {
        Self {
            outbound,
            agents: HashMap::new(),
        }
    }

    /// Dispatcher with every built-in domain registered.
    pub fn with_default_domains(outbound: OutboundChannel, config: &SessionConfig) -> Self {
        let mut dispatcher = Self::new(outbound.clone());
        let context = ExecutionContextDescription {
            id: DEFAULT_EXECUTION_CONTEXT_ID,
            name: config.execution_context_name.clone(),
        };
        dispatcher.register(Box::new(RuntimeDomainAgent::new(outbound, context)));
        dispatcher
    }

    /// Register an agent under its domain name, replacing any previous one.
    pub fn register(&mut self, agent: Box<dyn DomainHandler>) {
        let domain = agent.domain();
        if self.agents.insert(domain, agent).is_some() {
            log::warn!("Replaced existing agent for domain: {domain}");
        } else {
            log::debug!("Registered domain agent: {domain}");
        }
    }

    pub fn domains(&self) -> Vec<&'static str> {
        let mut domains: Vec<_> = self.agents.keys().copied().collect();
        domains.sort_unstable();
        domains
    }

    /// Notification handle for engine-side event sources.
    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.outbound.clone())
    }

    /// Route a parsed request to its domain agent.
    pub fn dispatch(&mut self, request: &Request) {
        log::debug!("Dispatching request: id={}, method={}", request.id, request.method());

        match self.agents.get_mut(request.domain.as_str()) {
            Some(agent) => agent.handle_request(request),
            None => {
                log::debug!("[cdp] Unknown domain: {}", request.domain);
                self.outbound.send(OutboundMessage::Response(make_error_response(
                    request.id,
                    ErrorCode::MethodNotFound,
                    format!("'{}' wasn't found", request.method()),
                )));
            }
        }
    }

    /// Parse one inbound message and dispatch it.
    pub fn handle_message(&mut self, text: &str) {
        match Request::from_json(text) {
            Ok(request) => self.dispatch(&request),
            Err((Some(id), details)) => {
                log::warn!("Rejecting malformed request: id={id}, {}", details.message);
                self.outbound.send(OutboundMessage::Response(make_error_response(
                    id,
                    details.code,
                    details.message,
                )));
            }
            Err((None, details)) => {
                log::warn!("Ignoring message without request id: {}", details.message);
            }
        }
    }
}
