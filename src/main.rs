//! Tool Directory bootstrap.
//!
//! Loads configuration, restores the session, performs the initial tool
//! fetch and prints the directory the current session may see.

use std::process::ExitCode;

use tool_directory::application::AppContext;
use tool_directory::config::AppConfig;
use tool_directory::domain::tool::{ToolQuery, ToolSort};
use tool_directory::observability;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    observability::init_tracing(&config.runtime);

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let mut ctx = match AppContext::from_config(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };
    ctx.start().await;

    let session = ctx.session().state();
    if !session.can_view_tools() {
        tracing::info!("No active session; log in to see the directory");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = ctx.tools().load().await {
        tracing::error!(code = %e.code(), "Initial fetch failed: {}", e);
        return ExitCode::FAILURE;
    }

    let tools = ctx
        .tools()
        .query(&ToolQuery::new().sort(ToolSort::NameAscending));
    tracing::info!(
        authenticated = session.is_authenticated(),
        admin = session.is_admin(),
        tools = tools.len(),
        "Directory loaded"
    );
    for tool in tools {
        println!("{}\t{}\t{}", tool.name, tool.url, tool.description);
    }

    ExitCode::SUCCESS
}
