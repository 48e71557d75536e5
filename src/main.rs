use wastewatch::{app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    wastewatch::init_tracing("wastewatch=debug,axum=info,tower_http=info");

    let state = AppState::init().await?;
    app::serve(app::build_app(state)).await
}
