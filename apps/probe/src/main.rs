use clap::Parser;
use std::time::Duration;
use trai_probe::{DEFAULT_TIMEOUT, DEFAULT_URL, check};

#[derive(Debug, Parser)]
#[command(name = "trai-probe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Exits 0 when trai-server answers its health check")]
struct Cli {
    /// Health endpoint to call.
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Seconds before the request is abandoned.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
}

#[trai_runtime::main(probe)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    check(&cli.url, Duration::from_secs(cli.timeout.max(1))).await?;
    Ok(())
}
