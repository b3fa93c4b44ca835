//! DomainLifecycle - the enable/disable state machine every domain composes.
//!
//! `enable` is deliberately not idempotent: a second `enable` is an error,
//! so the client sees domain setup notifications exactly once per enable.

use crate::api::types::{ErrorCode, ErrorDetails};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainState {
    Disabled,
    Enabled,
}

/// Two-state lifecycle for one domain instance.
#[derive(Debug, Clone)]
pub struct DomainLifecycle {
    domain: &'static str,
    state: DomainState,
}

impl DomainLifecycle {
    /// New lifecycle, initially disabled.
    pub fn new(domain: &'static str) -> Self {
        Self {
            domain,
            state: DomainState::Disabled,
        }
    }

    pub fn domain(&self) -> &'static str {
        self.domain
    }

    pub fn state(&self) -> DomainState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == DomainState::Enabled
    }

    /// Disabled → Enabled. Rejected when already enabled.
    pub fn enable(&mut self) -> Result<(), ErrorDetails> {
        if self.is_enabled() {
            return Err(ErrorDetails::new(
                ErrorCode::InvalidRequest,
                format!("{} domain already enabled", self.domain),
            ));
        }
        self.state = DomainState::Enabled;
        log::debug!("Domain enabled: domain={}", self.domain);
        Ok(())
    }

    /// Enabled → Disabled. Rejected through the enablement guard.
    pub fn disable(&mut self) -> Result<(), ErrorDetails> {
        self.check_enabled()?;
        self.state = DomainState::Disabled;
        log::debug!("Domain disabled: domain={}", self.domain);
        Ok(())
    }

    /// The enablement guard for every command other than `enable`.
    pub fn check_enabled(&self) -> Result<(), ErrorDetails> {
        if !self.is_enabled() {
            return Err(ErrorDetails::new(
                ErrorCode::InvalidRequest,
                format!("{} domain not enabled", self.domain),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disabled() {
        let lifecycle = DomainLifecycle::new("Debugger");
        assert_eq!(lifecycle.state(), DomainState::Disabled);
        assert_eq!(lifecycle.domain(), "Debugger");
        assert!(lifecycle.check_enabled().is_err());
    }

    #[test]
    fn test_enable_twice_is_rejected_without_state_change() {
        let mut lifecycle = DomainLifecycle::new("Debugger");
        lifecycle.enable().unwrap();

        let err = lifecycle.enable().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(err.message, "Debugger domain already enabled");
        assert!(lifecycle.is_enabled());
    }

    #[test]
    fn test_disable_when_disabled_uses_guard_message() {
        let mut lifecycle = DomainLifecycle::new("Network");
        let err = lifecycle.disable().unwrap_err();
        assert_eq!(err, lifecycle.check_enabled().unwrap_err());
        assert_eq!(err.message, "Network domain not enabled");
        assert_eq!(lifecycle.state(), DomainState::Disabled);
    }

    #[test]
    fn test_cycles_between_states() {
        let mut lifecycle = DomainLifecycle::new("Runtime");
        for _ in 0..3 {
            lifecycle.enable().unwrap();
            assert!(lifecycle.check_enabled().is_ok());
            lifecycle.disable().unwrap();
            assert!(lifecycle.check_enabled().is_err());
        }
    }
}
