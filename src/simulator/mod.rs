//! Live detection simulator: posts synthetic detections to the backend at
//! random intervals and exposes a small control API.

use std::{net::SocketAddr, sync::Arc};

use time::OffsetDateTime;
use tracing::{error, info};

use crate::{config::SimulatorConfig, trash::dto::TrashItem, upstream::http_client};

pub mod api_client;
pub mod generator;
pub mod server;

use api_client::ApiClient;

pub struct Simulator {
    client: ApiClient,
}

impl Simulator {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn target(&self) -> &str {
        self.client.base_url()
    }

    /// Generates and posts `count` detections. Failed posts are logged and
    /// left out of the result.
    pub async fn post_batch(&self, count: usize) -> Vec<TrashItem> {
        let mut posted = Vec::with_capacity(count);
        for _ in 0..count {
            let (detection, pause) = {
                let mut rng = rand::thread_rng();
                (
                    generator::detection(&mut rng, OffsetDateTime::now_utc()),
                    generator::post_pause(&mut rng),
                )
            };
            match self.client.post_detection(&detection).await {
                Ok(item) => {
                    info!(
                        litter_type = %item.litter_type,
                        latitude = item.latitude,
                        longitude = item.longitude,
                        "detection recorded"
                    );
                    posted.push(item);
                }
                Err(e) => error!(error = %e, "posting detection failed"),
            }
            tokio::time::sleep(pause).await;
        }
        posted
    }

    /// Waits a random interval, posts a random batch, repeats.
    pub async fn run_schedule(self: Arc<Self>) {
        loop {
            let (delay, count) = {
                let mut rng = rand::thread_rng();
                (generator::next_delay(&mut rng), generator::batch_size(&mut rng))
            };
            info!(delay_secs = delay.as_secs(), count, "next detection scheduled");
            tokio::time::sleep(delay).await;

            let posted = self.post_batch(count).await;
            info!(posted = posted.len(), requested = count, "detections posted");
        }
    }
}

pub async fn run(config: SimulatorConfig) -> anyhow::Result<()> {
    let http = http_client(config.timeout_secs)?;
    let client = ApiClient::new(http, &config.api_url, config.credentials());
    let sim = Arc::new(Simulator::new(client));

    info!(target_url = %config.api_url, "starting detection simulator");
    tokio::spawn(sim.clone().run_schedule());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("control server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, server::router(sim)).await?;
    Ok(())
}
