//! feltd — authoritative multi-table No-Limit Hold'em server.
//!
//! Reads configuration from the environment, probes the durable store
//! once, pre-creates the directory tables, and serves the WebSocket
//! protocol plus the two operational GET routes.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    felt_core::log();
    felt_core::interrupt();
    let config = felt_core::Config::from_env();
    let port = config.port;
    let store = felt_store::connect(config.store_url.as_deref()).await;
    let casino = felt_hosting::Casino::boot(config, store).await;
    felt_hosting::run(casino, port).await?;
    Ok(())
}
