//! Human-readable names for detection coordinates.
//!
//! Simulated detections fall into a handful of fixed Breda boxes. Real
//! detections are numbered as cameras in the order their coordinates are
//! first seen, with a detail taken from the reverse-geocode cache or from a
//! static fallback table.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use crate::trash::dto::ItemSource;

/// (name, lat_min, lat_max, lon_min, lon_max). First match wins.
const DUMMY_BOXES: [(&str, f32, f32, f32, f32); 6] = [
    ("Grote Markt Breda", 51.5890, 51.5900, 4.7750, 4.7765),
    ("Centraal Station Breda", 51.5953, 51.5963, 4.7787, 4.7797),
    ("Valkenberg Park", 51.5929, 51.5939, 4.7791, 4.7801),
    ("Haagdijk", 51.5920, 51.5925, 4.7685, 4.7695),
    ("Chassé Park", 51.5860, 51.5866, 4.7848, 4.7856),
    ("Chasséveld", 51.5890, 51.5902, 4.7750, 4.7766),
];

const DUMMY_OTHER: [&str; 5] = [
    "Stadspark",
    "Marktplein",
    "Winkelcentrum",
    "Sportpark",
    "Industrieterrein",
];

const FALLBACKS: [(&str, f32, f32, f32, f32); 10] = [
    ("Chasséveld, Breda", 51.588, 51.590, 4.784, 4.786),
    ("Grote Markt, Centrum, Breda", 51.588, 51.591, 4.774, 4.777),
    ("Stationsplein, Breda Centraal", 51.595, 51.597, 4.778, 4.780),
    ("Valkenberg Park, Breda", 51.592, 51.595, 4.778, 4.781),
    ("Haagdijk, Breda", 51.591, 51.594, 4.767, 4.770),
    ("Chassé Park, Breda", 51.585, 51.587, 4.784, 4.786),
    ("Breda", 51.55, 51.62, 4.73, 4.82),
    ("Amsterdam Centrum", 52.35, 52.38, 4.88, 4.92),
    ("Rotterdam Centrum", 51.91, 51.93, 4.46, 4.49),
    ("Den Haag Centrum", 52.06, 52.08, 4.29, 4.32),
];

fn in_box(lat: f32, lon: f32, (_, lat_min, lat_max, lon_min, lon_max): &(&str, f32, f32, f32, f32)) -> bool {
    (*lat_min..=*lat_max).contains(&lat) && (*lon_min..=*lon_max).contains(&lon)
}

fn round_to(value: f32, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (f64::from(value) * factor).round() / factor
}

/// Coordinates rounded to four decimals; detections this close share a camera.
pub fn location_key(lat: f32, lon: f32) -> String {
    format!("{:.4},{:.4}", round_to(lat, 4), round_to(lon, 4))
}

pub fn dummy_name(lat: f32, lon: f32) -> &'static str {
    if let Some((name, ..)) = DUMMY_BOXES.iter().find(|b| in_box(lat, lon, b)) {
        return name;
    }
    let seed = (f64::from(lat) * 1000.0 + f64::from(lon) * 1000.0) as i64;
    DUMMY_OTHER[seed.rem_euclid(DUMMY_OTHER.len() as i64) as usize]
}

/// Name used while no reverse-geocoded detail is known.
pub fn fallback_name(lat: f32, lon: f32) -> String {
    match FALLBACKS.iter().find(|b| in_box(lat, lon, b)) {
        Some((name, ..)) => (*name).to_string(),
        None => format!("Nederland ({}, {})", round_to(lat, 3), round_to(lon, 3)),
    }
}

#[derive(Default)]
struct Directory {
    cameras: HashMap<String, u32>,
    details: HashMap<String, String>,
}

/// Camera numbering and geocode cache, shared for the life of the process.
#[derive(Default)]
pub struct LocationDirectory {
    inner: Mutex<Directory>,
}

impl LocationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_for(&self, source: ItemSource, lat: f32, lon: f32) -> String {
        match source {
            ItemSource::Dummy => dummy_name(lat, lon).to_string(),
            ItemSource::Real => self.camera_name(lat, lon),
        }
    }

    /// `Camera N - detail`. A new key gets the next camera number.
    pub fn camera_name(&self, lat: f32, lon: f32) -> String {
        let key = location_key(lat, lon);
        let mut dir = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let next = dir.cameras.len() as u32 + 1;
        let number = *dir.cameras.entry(key.clone()).or_insert(next);
        let detail = dir
            .details
            .get(&key)
            .cloned()
            .unwrap_or_else(|| fallback_name(lat, lon));
        format!("Camera {number} - {detail}")
    }

    pub fn cached_detail(&self, key: &str) -> Option<String> {
        let dir = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        dir.details.get(key).cloned()
    }

    pub fn remember_detail(&self, key: String, detail: String) {
        let mut dir = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        dir.details.insert(key, detail);
    }
}
