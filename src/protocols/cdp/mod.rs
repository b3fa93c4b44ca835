//! Chrome DevTools Protocol domain agents.
//!
//! Each domain composes a `DomainAgent` and a `DomainLifecycle`; only the
//! `Runtime` domain is implemented here.

mod runtime_agent;

pub use runtime_agent::{RuntimeCommand, RuntimeDomainAgent, RUNTIME_DOMAIN};
