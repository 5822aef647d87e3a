use syncui::config::Config;
use syncui::routes;
use syncui::services::page;
use syncui::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let port = config.port;
    tracing::info!(
        upload_dir = %config.upload_dir.display(),
        upload_max_bytes = ?config.upload_max_bytes,
        page_idle_secs = config.page_idle.as_secs(),
        "configuration loaded"
    );

    let state = AppState::new(config);

    // Spawn background idle-page reaper.
    let _reaper = page::spawn_page_reaper(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "syncui listening");
    axum::serve(listener, app).await.expect("server failed");
}
