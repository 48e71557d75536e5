use wastewatch::{config::SimulatorConfig, simulator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    wastewatch::init_tracing("wastewatch=info");

    simulator::run(SimulatorConfig::from_env()).await
}
