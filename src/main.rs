use clap::Parser;

use passrelay::config::{Args, RelayConfig};
use passrelay::{logging, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(args.log_format);

    let config = RelayConfig::from(args);
    server::run(config).await.map_err(|e| {
        tracing::error!("passrelay failed: {}", e);
        e
    })?;

    Ok(())
}
