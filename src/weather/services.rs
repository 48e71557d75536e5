use std::collections::HashSet;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    codes,
    dto::{WeatherData, WeatherRequest},
    open_meteo::{Daily, DailyQuery, WeatherApi},
    repo::WeatherStore,
};
use crate::{datetime::parse_date, upstream::UpstreamError};

/// Fixed point used by `fetch-latest` (Breda).
pub const LATEST_LATITUDE: f32 = 51.57;
pub const LATEST_LONGITUDE: f32 = 4.76;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("weather request to {url} failed: {source}")]
    Upstream {
        url: String,
        #[source]
        source: UpstreamError,
    },

    #[error("response has no daily data")]
    NoDaily,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Turns the parallel `daily` arrays into records. Days with a missing
/// maximum or minimum, or an unparseable date, are left out.
pub fn daily_records(daily: &Daily, latitude: f32, longitude: f32) -> Vec<WeatherData> {
    let mut out = Vec::with_capacity(daily.time.len());
    for (i, day) in daily.time.iter().enumerate() {
        let max = daily.temperature_2m_max.get(i).copied().flatten();
        let min = daily.temperature_2m_min.get(i).copied().flatten();
        let (Some(max), Some(min)) = (max, min) else {
            debug!(%day, "skipping day without temperatures");
            continue;
        };
        let Some(date) = parse_date(day) else {
            warn!(%day, "skipping day with unparseable date");
            continue;
        };
        let code = daily.weather_code.get(i).copied().flatten();
        out.push(WeatherData {
            id: Uuid::new_v4(),
            timestamp: date.midnight().assume_utc(),
            latitude,
            longitude,
            temperature: (max + min) / 2.0,
            weather_description: codes::describe(code).to_string(),
        });
    }
    out
}

/// Fetches daily weather for the requested window and stores the days that
/// are not stored yet. Returns only the newly stored records.
///
/// The existence check and the inserts are separate statements, so two
/// concurrent calls for the same window may both insert.
pub async fn fetch_range(
    api: &dyn WeatherApi,
    store: &dyn WeatherStore,
    req: &WeatherRequest,
) -> Result<Vec<WeatherData>, FetchError> {
    let query = DailyQuery {
        latitude: req.latitude,
        longitude: req.longitude,
        start: req.start_date.date(),
        end: req.end_date.date(),
    };
    let daily = api
        .daily(&query)
        .await
        .map_err(|source| FetchError::Upstream {
            url: api.daily_url(&query),
            source,
        })?
        .ok_or(FetchError::NoDaily)?;

    let mut seen = HashSet::new();
    let mut fresh = Vec::new();
    for record in daily_records(&daily, req.latitude, req.longitude) {
        let day = record.timestamp.date();
        if !seen.insert(day) {
            continue;
        }
        if store.exists(day, record.latitude, record.longitude).await? {
            debug!(%day, "weather already stored");
            continue;
        }
        fresh.push(record);
    }

    for record in &fresh {
        store.save(record).await?;
    }

    info!(
        saved = fresh.len(),
        latitude = req.latitude,
        longitude = req.longitude,
        "weather window stored"
    );
    Ok(fresh)
}

/// Stores the current conditions at the fixed point, stamped with `now`.
pub async fn fetch_latest(
    api: &dyn WeatherApi,
    store: &dyn WeatherStore,
    now: OffsetDateTime,
) -> Result<WeatherData, FetchError> {
    let current = api
        .current(LATEST_LATITUDE, LATEST_LONGITUDE)
        .await
        .map_err(|source| FetchError::Upstream {
            url: api.current_url(LATEST_LATITUDE, LATEST_LONGITUDE),
            source,
        })?;

    let record = WeatherData {
        id: Uuid::new_v4(),
        timestamp: now,
        latitude: LATEST_LATITUDE,
        longitude: LATEST_LONGITUDE,
        temperature: current.temperature_2m,
        weather_description: codes::describe(current.weather_code).to_string(),
    };
    store.save(&record).await?;
    info!(temperature = record.temperature, "latest weather stored");
    Ok(record)
}
