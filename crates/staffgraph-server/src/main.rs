//! CLI entry point for the staffgraph MCP server.
//!
//! Startup order: configuration, logging, Neo4j pool, schema, optional
//! demo data, then the tool transport.

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use staffgraph_core::config::{AppConfig, Transport};
use staffgraph_graph::{GraphClient, GraphConfig};

use staffgraph_server::demo;
use staffgraph_server::server::{self, McpHttpServerConfig};

#[derive(Parser)]
#[command(name = "staffgraph")]
#[command(about = "MCP tool server for the employee/department/project graph")]
struct Cli {
    /// Config file prefix (default: staffgraph).
    #[arg(short, long, default_value = "staffgraph")]
    config: String,

    /// Transport: stdio or http (overrides config).
    #[arg(short, long)]
    transport: Option<Transport>,

    /// Listen address for the http transport (overrides config).
    #[arg(long)]
    bind: Option<String>,

    /// Load demo departments and employees before serving.
    #[arg(long)]
    seed_demo: bool,

    /// Emit JSON log lines.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays free for the stdio transport.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(transport) = cli.transport {
        config.server.transport = transport;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    config.server.seed_demo |= cli.seed_demo;

    let graph = GraphClient::connect(&GraphConfig::from(&config.neo4j)).await?;
    graph.apply_schema().await?;

    if config.server.seed_demo {
        demo::seed_demo_data(&graph).await?;
    }

    match config.server.transport {
        Transport::Stdio => server::serve_stdio(graph).await?,
        Transport::Http => {
            let addr: SocketAddr = config
                .server
                .bind
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid bind address {}: {e}", config.server.bind))?;
            let http = McpHttpServerConfig::new(addr).with_stateful_mode(config.server.stateful_http);
            server::serve_streamable_http(graph, http).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
