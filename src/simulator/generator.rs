//! Random detections around a few Breda landmarks.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// (name, latitude range, longitude range)
pub const AREAS: [(&str, (f64, f64), (f64, f64)); 5] = [
    ("Grote Markt", (51.5890, 51.5900), (4.7750, 4.7765)),
    ("Centraal Station", (51.5953, 51.5963), (4.7787, 4.7797)),
    ("Valkenberg Park", (51.5929, 51.5939), (4.7791, 4.7801)),
    ("Havermarkt", (51.5920, 51.5925), (4.7685, 4.7695)),
    ("Wilhelminapark", (51.5860, 51.5866), (4.7848, 4.7856)),
];

pub const LITTER_WEIGHTS: [(&str, f64); 4] = [
    ("Plastic", 0.45),
    ("Papier", 0.25),
    ("Organisch", 0.20),
    ("Glas", 0.10),
];

/// Body posted to `/api/TrashItems/dummy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Detection {
    pub litter_type: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

fn round6(v: f64) -> f64 {
    (v * 1_000_000.0).round() / 1_000_000.0
}

pub fn litter_type<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (name, weight) in LITTER_WEIGHTS {
        cumulative += weight;
        if roll <= cumulative {
            return name;
        }
    }
    LITTER_WEIGHTS[0].0
}

pub fn detection<R: Rng + ?Sized>(rng: &mut R, now: OffsetDateTime) -> Detection {
    let (_, (lat_min, lat_max), (lon_min, lon_max)) = AREAS[rng.gen_range(0..AREAS.len())];
    let seconds_back: i64 = rng.gen_range(0..60);
    Detection {
        litter_type: litter_type(rng).to_string(),
        latitude: round6(rng.gen_range(lat_min..=lat_max)),
        longitude: round6(rng.gen_range(lon_min..=lon_max)),
        timestamp: now - time::Duration::seconds(seconds_back),
    }
}

/// Mostly one or two detections, sometimes a burst of three to six.
pub fn batch_size<R: Rng + ?Sized>(rng: &mut R) -> usize {
    if rng.gen_bool(0.8) {
        rng.gen_range(1..=2)
    } else {
        rng.gen_range(3..=6)
    }
}

pub fn next_delay<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    Duration::from_secs(rng.gen_range(20..=180))
}

pub fn post_pause<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    Duration::from_millis(rng.gen_range(50..200))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashMap;
    use time::macros::datetime;

    #[test]
    fn detections_stay_inside_an_area() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = datetime!(2025-06-15 12:00 UTC);
        for _ in 0..500 {
            let d = detection(&mut rng, now);
            assert!(AREAS.iter().any(|(_, (la0, la1), (lo0, lo1))| {
                (*la0..=*la1).contains(&d.latitude) && (*lo0..=*lo1).contains(&d.longitude)
            }));
            assert_eq!(round6(d.latitude), d.latitude);
            assert!(d.timestamp <= now && d.timestamp > now - time::Duration::seconds(60));
        }
    }

    #[test]
    fn litter_types_follow_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let n = 20_000;
        for _ in 0..n {
            *counts.entry(litter_type(&mut rng)).or_default() += 1;
        }
        for (name, weight) in LITTER_WEIGHTS {
            let share = counts[name] as f64 / n as f64;
            assert!((share - weight).abs() < 0.02, "{name}: {share}");
        }
    }

    #[test]
    fn batch_sizes_and_delays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bursts = 0;
        for _ in 0..2_000 {
            let n = batch_size(&mut rng);
            assert!((1..=6).contains(&n));
            if n >= 3 {
                bursts += 1;
            }
            let delay = next_delay(&mut rng);
            assert!(delay >= Duration::from_secs(20) && delay <= Duration::from_secs(180));
            let pause = post_pause(&mut rng);
            assert!(pause >= Duration::from_millis(50) && pause < Duration::from_millis(200));
        }
        let share = bursts as f64 / 2_000.0;
        assert!((share - 0.2).abs() < 0.05, "burst share {share}");
    }

    #[test]
    fn serialises_pascal_case() {
        let d = Detection {
            litter_type: "Glas".into(),
            latitude: 51.5895,
            longitude: 4.776,
            timestamp: datetime!(2025-06-15 12:00 UTC),
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["LitterType"], "Glas");
        assert_eq!(json["Timestamp"], "2025-06-15T12:00:00Z");
    }
}
