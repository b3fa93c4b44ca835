use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cdp_agent_lib::config::SessionConfig;

/// Debugger protocol agent speaking newline-delimited JSON on stdin/stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory relative script paths resolve against
    #[arg(long)]
    base_dir: Option<String>,

    /// Display name of the execution context announced on Runtime.enable
    #[arg(long)]
    context_name: Option<String>,

    /// Log filter, e.g. `info` or `cdp_agent_lib=debug` (logs go to stderr)
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(args: Args) -> Result<SessionConfig, cdp_agent_lib::api::types::ApiError> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(base_dir) = args.base_dir {
        config.base_dir = base_dir;
    }
    if let Some(name) = args.context_name {
        config.execution_context_name = name;
    }
    if let Some(level) = args.log_level {
        config.log_level = Some(level);
    }
    Ok(config)
}

fn init_logging(config: &SessionConfig) {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(filter) = &config.log_level {
        builder.parse_filters(filter);
    }
    builder.target(env_logger::Target::Stderr).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config(Args::parse()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cdp-agent: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    match cdp_agent_lib::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Debugger agent failed: {e}");
            ExitCode::FAILURE
        }
    }
}
