//! Bar-chart data for a stored prediction, in the shape Chart.js consumes.

use serde::Serialize;

use super::dto::PredictionResult;
use crate::datetime::format_date;

/// Model category, display label, colour.
const CATEGORIES: [(&str, &str, &str); 4] = [
    ("Plastic", "Plastic", "#e74c3c"),
    ("Paper", "Papier", "#3498db"),
    ("Organic", "Organisch", "#2ecc71"),
    ("Glass", "Glas", "#f39c12"),
];

const DEFAULT_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionChart {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<i32>,
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
    pub border_width: u32,
}

/// `#rrggbb` to `rgba(r, g, b, a)`. Malformed input falls back to grey.
pub fn hex_to_rgba(hex: &str, alpha: f32) -> String {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    let channel = |i: usize| hex.get(i..i + 2).and_then(|s| u8::from_str_radix(s, 16).ok());
    let alpha = (f64::from(alpha) * 1000.0).round() / 1000.0;
    match (hex.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => format!("rgba({r}, {g}, {b}, {alpha})"),
        _ => format!("rgba(119, 119, 119, {alpha})"),
    }
}

pub fn chart_for(result: &PredictionResult) -> PredictionChart {
    let mut labels = Vec::with_capacity(CATEGORIES.len());
    let mut data = Vec::with_capacity(CATEGORIES.len());
    let mut background_color = Vec::with_capacity(CATEGORIES.len());
    let mut border_color = Vec::with_capacity(CATEGORIES.len());

    for (key, label, color) in CATEGORIES {
        let category = result.predictions.iter().find(|c| c.category == key);
        let confidence = category.map_or(DEFAULT_CONFIDENCE, |c| c.confidence_score);

        labels.push(label.to_string());
        data.push(category.map_or(0, |c| c.predicted_value));
        background_color.push(hex_to_rgba(color, 0.3 + confidence * 0.7));
        border_color.push(color.to_string());
    }

    PredictionChart {
        labels,
        datasets: vec![ChartDataset {
            label: format!(
                "Voorspelde afvalitems voor {}",
                format_date(result.timestamp.date())
            ),
            data,
            background_color,
            border_color,
            border_width: 1,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictions::dto::CategoryPrediction;
    use time::macros::datetime;
    use uuid::Uuid;

    fn category(name: &str, value: i32, confidence: f32) -> CategoryPrediction {
        CategoryPrediction {
            id: Uuid::new_v4(),
            prediction_result_id: Uuid::nil(),
            category: name.into(),
            predicted_value: value,
            confidence_score: confidence,
            model_used: "rf".into(),
        }
    }

    #[test]
    fn hex_conversion() {
        assert_eq!(hex_to_rgba("#e74c3c", 1.0), "rgba(231, 76, 60, 1)");
        assert_eq!(hex_to_rgba("3498db", 0.3), "rgba(52, 152, 219, 0.3)");
        assert_eq!(hex_to_rgba("#abc", 0.5), "rgba(119, 119, 119, 0.5)");
        assert_eq!(hex_to_rgba("#zzzzzz", 0.5), "rgba(119, 119, 119, 0.5)");
    }

    #[test]
    fn chart_uses_fixed_order_and_defaults() {
        let result = PredictionResult {
            id: Uuid::new_v4(),
            timestamp: datetime!(2025-06-12 09:00 UTC),
            latitude: 0.0,
            longitude: 0.0,
            weather: "Regen".into(),
            temp: 18.0,
            avg_confidence: 0.5,
            predictions: vec![category("Glass", 4, 1.0), category("Plastic", 12, 0.0)],
        };

        let chart = chart_for(&result);
        assert_eq!(chart.labels, ["Plastic", "Papier", "Organisch", "Glas"]);

        let ds = &chart.datasets[0];
        assert_eq!(ds.label, "Voorspelde afvalitems voor 2025-06-12");
        assert_eq!(ds.data, [12, 0, 0, 4]);
        assert_eq!(ds.border_color, ["#e74c3c", "#3498db", "#2ecc71", "#f39c12"]);
        assert_eq!(ds.background_color[0], "rgba(231, 76, 60, 0.3)");
        assert_eq!(ds.background_color[1], "rgba(52, 152, 219, 0.65)");
        assert_eq!(ds.background_color[3], "rgba(243, 156, 18, 1)");
    }

    #[test]
    fn chart_serialises_for_chart_js() {
        let result = PredictionResult {
            id: Uuid::new_v4(),
            timestamp: datetime!(2025-06-12 00:00 UTC),
            latitude: 0.0,
            longitude: 0.0,
            weather: "Helder".into(),
            temp: 20.0,
            avg_confidence: 0.0,
            predictions: vec![],
        };
        let json = serde_json::to_value(chart_for(&result)).unwrap();
        assert!(json["datasets"][0]["backgroundColor"].is_array());
        assert_eq!(json["datasets"][0]["borderWidth"], 1);
    }
}
