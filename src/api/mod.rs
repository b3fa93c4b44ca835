//! API types for the debugger protocol.
//!
//! This module defines the structured request, response and notification
//! values exchanged with the client, isolating wire details from the agents.

pub mod types;
