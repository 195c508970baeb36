use anyhow::Context;
use remit::domain::config::ApiConfig;
use remit::domain::constants::DEFAULT_CONFIG_FILE;
use remit::kernel::config::load_config;
use remit_logger::Logger;
use remit_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig =
        load_config(Some(DEFAULT_CONFIG_FILE)).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.logging)?.init()?;

    Server::builder().config(cfg).build().await?.run().await
}
