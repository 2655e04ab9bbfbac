use folio_api::setup;
use folio_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (database, storage, routes)
    let (state, router) = setup::initialize_app(&config).await?;

    // Start the server
    setup::server::start_server(&config, state, router).await?;

    Ok(())
}
