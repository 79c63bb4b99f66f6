//! tea - CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::net::{IpAddr, SocketAddr, TcpListener};
use tea::{BodyPrintLimit, TeaServer, REGISTER_PATH};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tea",
    about = "HTTP expectation server - register canned responses and replay them to the code under test",
    version
)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "TEA_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "TEA_PORT", default_value_t = 7111)]
    port: u16,

    /// Maximum number of body bytes printed when logging an unconfigured call (0 = no limit)
    #[arg(long, env = "TEA_BODY_PRINT_LIMIT", value_name = "BYTES")]
    body_print_limit: Option<usize>,

    /// Log filter, e.g. "info" or "tea=debug"
    #[arg(short = 'L', long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Also captures the `log` records emitted by the library.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log_level)?)
        .with_target(false)
        .init();

    let address = SocketAddr::new(args.host, args.port);
    let listener =
        TcpListener::bind(address).with_context(|| format!("Failed to bind {}", address))?;

    let mut builder = TeaServer::builder().listener(listener);
    if let Some(limit) = args.body_print_limit {
        builder = builder.body_print_limit(match limit {
            0 => BodyPrintLimit::Unlimited,
            limit => BodyPrintLimit::Limited(limit),
        });
    }
    let server = builder.start().context("Failed to start the server")?;
    info!(
        "Register expectations with POST {}{}",
        server.uri(),
        REGISTER_PATH
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for the shutdown signal")?;
    info!("Shutting down");
    drop(server);

    Ok(())
}
