use tokio::net::TcpListener;
use tracing::{info, warn};
use nozylot::{
    config::Config,
    api::routes::create_router,
    logging,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Config::load()?;
    let server_addr = config.server_addr;
    if !config.has_usable_api_key() {
        warn!("FEATHERLESS_API_KEY is not set; /api/analyze will answer with 500 until it is");
    }

    let app_state = AppState::new(config)?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    info!(%server_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
