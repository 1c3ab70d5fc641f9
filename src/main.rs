use clap::Parser;
use std::path::PathBuf;

/// Exposes statically configured HTTP APIs as MCP tools over stdio.
#[derive(Debug, Parser)]
#[command(name = "mcp-api-server", version)]
struct Cli {
    /// JSON file with API definitions; the bundled samples are used when omitted.
    #[arg(long, env = "MCP_API_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = mcp_api_server::mcp::server::run_stdio(cli.config).await {
        eprintln!("mcp-api-server: {}", err);
        std::process::exit(1);
    }
}
