mod api_doc;
mod error;
mod handlers;
mod setup;
mod state;
mod telemetry;

use seen_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    telemetry::init_telemetry();

    // Initialize the application (database, clients, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::start_server(&config, router).await?;

    Ok(())
}
