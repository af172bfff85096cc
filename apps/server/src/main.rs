use anyhow::Context;
use std::io::IsTerminal;
use trai::kernel::config::load_config;
use trai::domain::config::ApiConfig;
use trai_logger::Logger;
use trai_server::Server;

#[trai_runtime::main(server)]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig = load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let _log = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .ansi(std::io::stdout().is_terminal())
        .path(cfg.storage.data_dir.join("logs"))
        .init()?;

    Server::builder().config(cfg).build().await?.run().await
}
