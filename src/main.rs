//! Notebook gateway binary.
//!
//! Loads configuration (TOML file plus CLI overrides), assembles the
//! middleware chain over the default application router, and serves.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use notebook_gateway::config::{load_config, GatewayConfig, LspServerDescriptor};
use notebook_gateway::observability::{logging, metrics};
use notebook_gateway::server::{default_app, GatewayServer};

#[derive(Debug, Parser)]
#[command(name = "notebook-gateway", version, about)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Public hostname; also joins the default origin allow-list.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Mount path for the application routes.
    #[arg(long)]
    base_url: Option<String>,

    /// Disable authentication (every request gets an anonymous identity).
    #[arg(long)]
    no_auth: bool,

    /// Allowed origin host; repeatable. Overrides the derived default.
    #[arg(long = "allow-origin")]
    allow_origins: Vec<String>,

    /// LSP server to proxy, as id:port; repeatable.
    #[arg(long = "lsp", value_parser = parse_lsp)]
    lsp_servers: Vec<LspServerDescriptor>,
}

fn parse_lsp(value: &str) -> Result<LspServerDescriptor, String> {
    let (id, port) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("{value:?} is not id:port"))?;
    if id.is_empty() {
        return Err(format!("{value:?} has an empty id"));
    }
    let port = port
        .parse::<u16>()
        .map_err(|e| format!("bad port in {value:?}: {e}"))?;
    Ok(LspServerDescriptor {
        id: id.to_string(),
        port,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(logging::DEFAULT_FILTER);

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    // CLI flags override file values.
    if let Some(host) = &args.host {
        config.pipeline.host = Some(host.clone());
    }
    if args.host.is_some() || args.port.is_some() {
        let host = args.host.as_deref().unwrap_or("127.0.0.1");
        let port = args.port.unwrap_or(2718);
        config.listener.bind_address = format!("{host}:{port}");
    }
    if let Some(base_url) = args.base_url {
        config.pipeline.base_url = base_url;
    }
    if args.no_auth {
        config.pipeline.enable_auth = false;
    }
    if !args.allow_origins.is_empty() {
        config.pipeline.allow_origins = Some(args.allow_origins.iter().cloned().collect());
    }
    config.pipeline.lsp_servers.extend(args.lsp_servers);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_url = %config.pipeline.base_url,
        enable_auth = config.pipeline.enable_auth,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();

    // Configuration errors abort here, before the listener accepts anything.
    let server = GatewayServer::new(config, default_app())?;

    let listener = TcpListener::bind(&bind_address).await?;
    server.run(listener).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lsp_flag() {
        let server = parse_lsp("pylsp:9000").unwrap();
        assert_eq!(server.id, "pylsp");
        assert_eq!(server.port, 9000);

        assert!(parse_lsp("no-port").is_err());
        assert!(parse_lsp(":9000").is_err());
        assert!(parse_lsp("x:huge").is_err());
    }
}
