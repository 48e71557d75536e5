use std::time::Duration;

use axum::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::locations::{fallback_name, location_key, LocationDirectory};
use crate::upstream;

/// The address fields of a Nominatim reverse lookup that we use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    pub road: Option<String>,
    pub house_number: Option<String>,
    pub pedestrian: Option<String>,
    pub amenity: Option<String>,
    pub leisure: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub quarter: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// `Ok(None)` when the service knows no address for the point.
    async fn reverse(&self, lat: f32, lon: f32) -> upstream::Result<Option<Address>>;
}

#[derive(Clone)]
pub struct Nominatim {
    http: reqwest::Client,
    base_url: String,
}

impl Nominatim {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for Nominatim {
    async fn reverse(&self, lat: f32, lon: f32) -> upstream::Result<Option<Address>> {
        let url = format!(
            "{}/reverse?format=json&lat={:.5}&lon={:.5}&addressdetails=1&zoom=18",
            self.base_url, lat, lon
        );
        let resp = self.http.get(url).send().await?;
        let body = upstream::read_body(resp).await?;
        let parsed: ReverseResponse = serde_json::from_str(&body)?;
        Ok(parsed.address)
    }
}

/// Street, area and city, each optional, de-duplicated and joined by ", ".
pub fn compose_name(addr: &Address) -> String {
    let street = match (&addr.road, &addr.house_number) {
        (Some(road), Some(nr)) => Some(format!("{road} {nr}")),
        (Some(road), None) => Some(road.clone()),
        (None, _) => addr
            .pedestrian
            .clone()
            .or_else(|| addr.amenity.clone())
            .or_else(|| addr.leisure.clone()),
    };
    let area = addr
        .neighbourhood
        .clone()
        .or_else(|| addr.suburb.clone())
        .or_else(|| addr.quarter.clone());
    let city = addr
        .city
        .clone()
        .or_else(|| addr.town.clone())
        .or_else(|| addr.village.clone())
        .or_else(|| addr.municipality.clone());

    let mut parts: Vec<String> = Vec::with_capacity(3);
    for part in [street, area, city].into_iter().flatten() {
        let part = part.trim().to_string();
        if !part.is_empty() && !parts.contains(&part) {
            parts.push(part);
        }
    }
    parts.join(", ")
}

/// Detail name for a point: from the cache, else looked up and cached. Any
/// lookup failure caches the fallback name instead.
pub async fn resolve_detail(
    geocoder: &dyn ReverseGeocoder,
    directory: &LocationDirectory,
    lat: f32,
    lon: f32,
) -> (String, bool) {
    let key = location_key(lat, lon);
    if let Some(hit) = directory.cached_detail(&key) {
        return (hit, false);
    }

    let detail = match geocoder.reverse(lat, lon).await {
        Ok(Some(addr)) => {
            let name = compose_name(&addr);
            if name.is_empty() {
                fallback_name(lat, lon)
            } else {
                name
            }
        }
        Ok(None) => {
            debug!(%key, "no address for point");
            fallback_name(lat, lon)
        }
        Err(e) => {
            warn!(%key, error = %e, "reverse geocoding failed");
            fallback_name(lat, lon)
        }
    };
    directory.remember_detail(key, detail.clone());
    (detail, true)
}

/// Resolves distinct points, pausing between actual lookups. Stops after
/// `max_lookups` fresh lookups; cached points never count. Points left over
/// keep their fallback name until a later call reaches them.
pub async fn preload(
    geocoder: &dyn ReverseGeocoder,
    directory: &LocationDirectory,
    points: &[(f32, f32)],
    pause: Duration,
    max_lookups: usize,
) -> usize {
    let mut looked_up = 0;
    for &(lat, lon) in points {
        if looked_up >= max_lookups {
            break;
        }
        let (_, fresh) = resolve_detail(geocoder, directory, lat, lon).await;
        if fresh {
            looked_up += 1;
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
    }
    looked_up
}
