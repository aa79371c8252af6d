//! Process entrypoint: resolve configuration, build the transport/core
//! stack, and run the MCP server on stdio.

use std::process::ExitCode;
use std::sync::Arc;

use adt_config::{AdtConfig, AuthMethod, CliOverlay, ToolMode as ConfigToolMode};
use adt_core::{AtomicOps, WorkflowComposer};
use adt_mcp::{McpServer, ToolDispatcher, ToolMode};
use adt_transport::AdtTransport;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// stdout is reserved for JSON-RPC responses, so every log line goes to
/// stderr regardless of verbosity.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn tool_mode(mode: ConfigToolMode) -> ToolMode {
    match mode {
        ConfigToolMode::Focused => ToolMode::Focused,
        ConfigToolMode::Expert => ToolMode::Expert,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let overlay = CliOverlay::parse();
    init_logging(overlay.verbose);

    let config = match AdtConfig::resolve(&overlay) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            return ExitCode::from(1);
        }
    };

    let transport = match AdtTransport::new(&config) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            tracing::error!("failed to build ADT transport: {e}");
            return ExitCode::from(2);
        }
    };

    let authenticated_user = match &config.auth {
        AuthMethod::Basic { user, .. } => Some(user.clone()),
        AuthMethod::CookieFile(_) | AuthMethod::CookieString(_) => None,
    };

    let ops = Arc::new(AtomicOps::new(transport));
    let workflow = Arc::new(WorkflowComposer::new(ops.clone()));
    let dispatcher = ToolDispatcher::new(ops, workflow, authenticated_user);
    let server = McpServer::new(tool_mode(config.mode), dispatcher);

    tracing::info!(mode = ?config.mode, base_url = %config.base_url, "adt-mcp-server starting");

    match server.run_stdio().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("server terminated with an error: {e}");
            ExitCode::from(2)
        }
    }
}
