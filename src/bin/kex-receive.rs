use std::sync::Arc;

use clap::Parser;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kex_relay::config::KexConfig;
use kex_relay::domains::{Direction, Meta, Secret};
use kex_relay::error::{KexError, Result};
use kex_relay::kex::{MessageCodec, Receiver};
use kex_relay::services::handler::TracingHandler;
use kex_relay::services::transport::HttpChannelFetcher;

#[derive(Parser, Debug)]
#[command(name = "kex-receive")]
#[command(about = "Follow one side of a device key exchange on the relay")]
struct Cli {
    #[arg(long, default_value = "./kex.json")]
    config: String,

    #[arg(long, env = "KEX_SECRET", hide_env_values = true)]
    secret: String,

    #[arg(long)]
    direction: Option<String>,

    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,kex_relay=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let mut config = KexConfig::from_file(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    let direction = match cli.direction.as_deref() {
        Some(value) => Direction::from_name(value)
            .ok_or_else(|| KexError::Config(format!("unknown direction {value:?}")))?,
        None => config.receiver.direction()?,
    };
    let secret = Secret::from_hex(&cli.secret)?;

    let handler = Arc::new(TracingHandler::new());
    let fetcher = Arc::new(HttpChannelFetcher::from_config(&config.api)?);
    let codec = Arc::new(MessageCodec::new(secret.clone()));
    let mut receiver = Receiver::new(handler.clone(), fetcher, codec, direction)
        .with_poll(config.receiver.poll());
    let mut meta = Meta::from_secret(&secret);

    let deadline = Instant::now() + config.receiver.global_timeout();
    info!(w = %meta.weak_id, dir = %direction, "waiting for kex messages");
    while !handler.is_done() {
        receiver.receive_until(&mut meta, deadline).await?;
    }
    info!(cursor = receiver.cursor(), "kex exchange complete");
    Ok(())
}
