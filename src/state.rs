use std::sync::Arc;

use crate::{
    analytics::{
        correlation::CorrelationApi,
        geocode::{Nominatim, ReverseGeocoder},
        locations::LocationDirectory,
    },
    auth::repo::{PgUserStore, UserStore},
    config::AppConfig,
    db,
    predictions::{
        model_api::{FastApiClient, PredictionApi},
        repo::{PgPredictionStore, PredictionStore},
    },
    trash::repo::{PgTrashStore, TrashStore},
    upstream::http_client,
    weather::{
        open_meteo::{OpenMeteo, WeatherApi},
        repo::{PgWeatherStore, WeatherStore},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub trash: Arc<dyn TrashStore>,
    pub weather: Arc<dyn WeatherStore>,
    pub predictions: Arc<dyn PredictionStore>,
    pub weather_api: Arc<dyn WeatherApi>,
    pub predictor: Arc<dyn PredictionApi>,
    pub correlation: Arc<dyn CorrelationApi>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub locations: Arc<LocationDirectory>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config).await?;
        let http = http_client(config.upstream.timeout_secs)?;
        let fastapi = FastApiClient::new(http.clone(), &config.upstream.fastapi_url);

        Ok(Self {
            users: Arc::new(PgUserStore::new(db.clone())),
            trash: Arc::new(PgTrashStore::new(db.clone())),
            weather: Arc::new(PgWeatherStore::new(db.clone())),
            predictions: Arc::new(PgPredictionStore::new(db)),
            weather_api: Arc::new(OpenMeteo::new(http.clone(), &config.upstream.open_meteo_url)),
            predictor: Arc::new(fastapi.clone()),
            correlation: Arc::new(fastapi),
            geocoder: Arc::new(Nominatim::new(http, &config.upstream.nominatim_url)),
            locations: Arc::new(LocationDirectory::new()),
            config,
        })
    }

    /// State backed by in-memory stores and canned upstream answers.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::testing::*;

        Self {
            config: Arc::new(test_config()),
            users: Arc::new(MemoryUserStore::default()),
            trash: Arc::new(MemoryTrashStore::default()),
            weather: Arc::new(MemoryWeatherStore::default()),
            predictions: Arc::new(MemoryPredictionStore::default()),
            weather_api: Arc::new(FakeWeatherApi::default()),
            predictor: Arc::new(FakePredictionApi::answering(Default::default())),
            correlation: Arc::new(FakeCorrelationApi::answering(Default::default())),
            geocoder: Arc::new(FakeGeocoder::default()),
            locations: Arc::new(LocationDirectory::new()),
        }
    }
}
