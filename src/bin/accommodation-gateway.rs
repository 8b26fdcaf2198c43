use clap::Parser;
use accommodation_gateway::server;
use accommodation_gateway::utils::config_loader;
use accommodation_gateway::utils::logging;
use anyhow::Result;
use accommodation_gateway::utils::logging::LogLevel;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "accommodation-gateway.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args
    // -------------------------------

    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config, init logging
    // -------------------------------

    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned()).await?;

    // -------------------------------
    // 3. Report missing booking API settings early;
    //    routes keep answering with a configuration error
    // -------------------------------

    if let Err(e) = service_config.booking_api.client_credentials() {
        warn!("token requests will fail: {}", e);
    }
    if let Err(e) = service_config.booking_api.booking_endpoint() {
        warn!("booking API requests will fail: {}", e);
    }

    // -------------------------------
    // 4. Start http server
    // -------------------------------

    info!("Service starting...");
    server::server::start(&service_config).await?;

    Ok(())
}
