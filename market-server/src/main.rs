use market_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (.env is optional)
    let _ = dotenvy::dotenv();

    // 2. Configuration and logging
    let config = Config::from_env();
    setup_environment(&config);

    tracing::info!(
        port = config.http_port,
        environment = %config.environment,
        "market-server starting..."
    );

    // 3. State (store connection, migrations)
    let state = match ServerState::initialize(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            return Err(e.into());
        }
    };

    // 4. HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
