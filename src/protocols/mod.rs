//! Protocol layer - domain agents and the paths messages take to the client.
//!
//! This module provides:
//! - `OutboundChannel`: the one synchronized sink shared by every agent
//! - `DomainAgent` / `DomainHandler`: base contract for domain agents
//! - `DomainLifecycle`: reusable enable/disable gating
//! - `cdp`: concrete domain agents (Runtime)
//! - `Dispatcher` and `Session`: request routing and the stdio session loop
//!
//! Agents never touch the transport directly; they only hand structured
//! values to the outbound channel.

pub mod cdp;
pub mod dispatcher;
pub mod domain_agent;
pub mod lifecycle;
pub mod outbound;
pub mod session;

pub use dispatcher::Dispatcher;
pub use domain_agent::{DomainAgent, DomainHandler, Notifier};
pub use lifecycle::{DomainLifecycle, DomainState};
pub use outbound::OutboundChannel;
pub use session::Session;
