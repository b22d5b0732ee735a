use filelink_api::setup;
use filelink_core::Config;
use tokio::sync::watch;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (telemetry, messaging backend, routes)
    let (state, router) = setup::initialize_app(config.clone()).await?;

    // Consume inbound messages until shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher = setup::messenger::spawn_dispatcher(&state, shutdown_rx);

    // Start the server
    setup::server::start_server(&config, router, shutdown_tx).await?;

    if let Err(e) = dispatcher.await {
        tracing::error!(error = %e, "Dispatch loop task failed");
    }

    Ok(())
}
