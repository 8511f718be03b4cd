use contribmod::{router, AppState, Config, MemoryStore, PgStore, Seed, Store};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt().with_max_level(config.log_level).init();

    let store = match config.database_url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            store.ensure_schema().await?;
            info!("Using PostgreSQL store");
            Store::Postgres(store)
        }
        None => {
            let seed = match config.seed_path.as_deref() {
                Some(path) => {
                    info!("Loading seed data from {}", path);
                    Seed::from_file(path)?
                }
                None => Seed::default(),
            };
            info!(
                "Using in-memory store with {} conference(s)",
                seed.conferences.len()
            );
            Store::Memory(MemoryStore::from_seed(seed))
        }
    };

    if config.api_tokens.is_empty() {
        tracing::warn!("API_TOKENS is empty; every protected route will answer 401");
    }

    let bind_addr = config.bind_addr.clone();
    let app = router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server is running on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
