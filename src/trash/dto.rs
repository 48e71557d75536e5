use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One detection, real or simulated. Both tables share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct TrashItem {
    pub id: Uuid,
    pub litter_type: String,
    pub latitude: f32,
    pub longitude: f32,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Which table a detection lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    #[default]
    Real,
    Dummy,
}

impl ItemSource {
    pub fn table(self) -> &'static str {
        match self {
            ItemSource::Real => "trash_items",
            ItemSource::Dummy => "dummy_trash_items",
        }
    }
}

/// POST body. `Id` and `Timestamp` are filled in by the server when absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTrashItem {
    #[serde(default, alias = "id")]
    pub id: Option<Uuid>,
    #[serde(alias = "litterType")]
    pub litter_type: String,
    #[serde(alias = "latitude")]
    pub latitude: f32,
    #[serde(alias = "longitude")]
    pub longitude: f32,
    #[serde(default, alias = "timestamp", deserialize_with = "crate::datetime::lenient_option::deserialize")]
    pub timestamp: Option<OffsetDateTime>,
}

impl CreateTrashItem {
    pub fn into_item(self, now: OffsetDateTime) -> TrashItem {
        TrashItem {
            id: self.id.filter(|id| !id.is_nil()).unwrap_or_else(Uuid::new_v4),
            litter_type: self.litter_type,
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SourceQuery {
    #[serde(default)]
    pub source: ItemSource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn missing_id_and_timestamp_are_generated() {
        let body: CreateTrashItem = serde_json::from_str(
            r#"{"LitterType":"Plastic","Latitude":51.58,"Longitude":4.77}"#,
        )
        .unwrap();
        let now = datetime!(2025-06-10 12:00 UTC);
        let item = body.into_item(now);
        assert!(!item.id.is_nil());
        assert_eq!(item.timestamp, now);
        assert_eq!(item.litter_type, "Plastic");
    }

    #[test]
    fn nil_id_is_replaced_but_given_values_are_kept() {
        let body: CreateTrashItem = serde_json::from_str(
            r#"{"Id":"00000000-0000-0000-0000-000000000000","LitterType":"Glas",
                "Latitude":51.5,"Longitude":4.7,"Timestamp":"2025-06-01T08:15:00Z"}"#,
        )
        .unwrap();
        let item = body.into_item(datetime!(2025-06-10 12:00 UTC));
        assert!(!item.id.is_nil());
        assert_eq!(item.timestamp, datetime!(2025-06-01 08:15 UTC));

        let id = Uuid::new_v4();
        let body: CreateTrashItem = serde_json::from_value(serde_json::json!({
            "id": id, "litterType": "Papier", "latitude": 1.0, "longitude": 2.0
        }))
        .unwrap();
        assert_eq!(body.into_item(datetime!(2025-06-10 12:00 UTC)).id, id);
    }

    #[test]
    fn serialises_pascal_case() {
        let item = TrashItem {
            id: Uuid::nil(),
            litter_type: "Organisch".into(),
            latitude: 51.5,
            longitude: 4.75,
            timestamp: datetime!(2025-06-01 08:15 UTC),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["LitterType"], "Organisch");
        assert_eq!(json["Timestamp"], "2025-06-01T08:15:00Z");
    }
}
