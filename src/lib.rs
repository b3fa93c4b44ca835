//! Domain-segmented remote debugging agents.
//!
//! A runtime exposes protocol domains (Runtime, Debugger, …) to one debugger
//! client. Each domain agent gates its commands behind an enable/disable
//! lifecycle and shares a single synchronized outbound channel with every
//! other agent and engine-side event source.

pub mod api;
pub mod config;
pub mod protocols;
pub mod runtime;

use tokio::io::BufReader;

use crate::api::types::ApiError;
use crate::config::SessionConfig;
use crate::protocols::Session;

/// Serve one debugger session over stdin/stdout until the client hangs up.
pub async fn run(config: SessionConfig) -> Result<(), ApiError> {
    config.validate()?;
    log::info!(
        "Starting debugger agent: context={}, base_dir={}",
        config.execution_context_name,
        config.base_dir
    );

    let session = Session::new(&config);
    let stdin = BufReader::new(tokio::io::stdin());
    session.run(stdin, tokio::io::stdout()).await?;

    log::info!("Debugger agent stopped");
    Ok(())
}
