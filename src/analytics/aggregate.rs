use std::collections::{BTreeMap, BTreeSet, HashMap};

use time::{util::days_in_year_month, Date, Duration, Month, OffsetDateTime};

use super::dto::{AnalyticsSummary, FrequencyBucket, LocationCount, SummaryQuery};
use crate::trash::dto::TrashItem;

const TOP_LOCATIONS: usize = 5;
const FIRST_HOUR: u8 = 6;
const LAST_HOUR: u8 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            "year" => Some(Period::Year),
            _ => None,
        }
    }

    /// Oldest timestamp still inside the period.
    pub fn since(self, now: OffsetDateTime) -> OffsetDateTime {
        match self {
            Period::Week => now - Duration::days(7),
            Period::Month => shift_months(now, -1),
            Period::Year => shift_months(now, -12),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Period::Week => "de afgelopen week",
            Period::Month => "de afgelopen maand",
            Period::Year => "het afgelopen jaar",
        }
    }
}

/// Calendar month arithmetic, clamping the day to the target month.
fn shift_months(at: OffsetDateTime, months: i32) -> OffsetDateTime {
    let index = at.year() * 12 + i32::from(u8::from(at.month())) - 1 + months;
    let year = index.div_euclid(12);
    let month = (index.rem_euclid(12) + 1) as u8;
    let shifted = Month::try_from(month).ok().and_then(|m| {
        let day = at.day().min(days_in_year_month(year, m));
        Date::from_calendar_date(year, m, day).ok()
    });
    match shifted {
        Some(date) => at.replace_date(date),
        None => at - Duration::days(30 * i64::from(months.unsigned_abs())),
    }
}

/// Query key to the litter type stored on detections.
pub fn category_type(key: &str) -> Option<&'static str> {
    match key.trim().to_ascii_lowercase().as_str() {
        "plastic" => Some("Plastic"),
        "papier" => Some("Papier"),
        "gft" => Some("Organisch"),
        "glas" => Some("Glas"),
        _ => None,
    }
}

fn category_label(key: &str) -> String {
    match key.trim().to_ascii_lowercase().as_str() {
        "plastic" => "Plastic".into(),
        "papier" => "Papier".into(),
        "gft" => "GFT/Organisch".into(),
        "glas" => "Glas".into(),
        _ => key.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub period: Option<Period>,
    pub category: Option<String>,
    pub location: Option<String>,
}

fn non_empty(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Filters {
    pub fn from_query(q: &SummaryQuery) -> Self {
        Self {
            period: q.period.as_deref().and_then(Period::parse),
            category: non_empty(&q.category),
            location: non_empty(&q.location),
        }
    }

    pub fn is_active(&self) -> bool {
        self.period.is_some() || self.category.is_some() || self.location.is_some()
    }

    fn keeps(&self, item: &TrashItem, name: &str, now: OffsetDateTime) -> bool {
        if let Some(period) = self.period {
            if item.timestamp < period.since(now) {
                return false;
            }
        }
        // Unknown category keys do not filter.
        if let Some(litter_type) = self.category.as_deref().and_then(category_type) {
            if !item.litter_type.eq_ignore_ascii_case(litter_type) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if name.to_lowercase() != location.to_lowercase() {
                return false;
            }
        }
        true
    }

    /// Dutch one-line description, e.g.
    /// `de afgelopen week, alle locaties, categorie: Glas, (12 items)`.
    pub fn summary(&self, total: usize, filtered: usize) -> String {
        let period = self
            .period
            .map_or("de volledige periode", Period::describe)
            .to_string();
        let location = match &self.location {
            Some(l) => format!("locatie: {l}"),
            None => "alle locaties".to_string(),
        };
        let category = match &self.category {
            Some(c) => format!("categorie: {}", category_label(c)),
            None => "alle categorieën".to_string(),
        };
        let count = if self.is_active() { filtered } else { total };
        [period, location, category, format!("({count} items)")].join(", ")
    }
}

/// Per-location totals, top five by count. Ties keep name order.
pub fn top_locations<'a>(named: impl IntoIterator<Item = (&'a str, &'a TrashItem)>) -> Vec<LocationCount> {
    let mut groups: HashMap<&str, BTreeMap<String, usize>> = HashMap::new();
    for (name, item) in named {
        *groups
            .entry(name)
            .or_default()
            .entry(item.litter_type.clone())
            .or_default() += 1;
    }

    let mut locations: Vec<LocationCount> = groups
        .into_iter()
        .map(|(name, type_counts)| LocationCount {
            location_name: name.to_string(),
            total_count: type_counts.values().sum(),
            type_counts,
        })
        .collect();
    locations.sort_by(|a, b| {
        b.total_count
            .cmp(&a.total_count)
            .then_with(|| a.location_name.cmp(&b.location_name))
    });
    locations.truncate(TOP_LOCATIONS);
    locations
}

/// Counts per UTC hour from 06:00 to 22:00 inclusive.
pub fn hourly_frequency<'a>(items: impl IntoIterator<Item = &'a TrashItem>) -> Vec<FrequencyBucket> {
    let mut counts = [0usize; 24];
    for item in items {
        counts[usize::from(item.timestamp.hour())] += 1;
    }
    (FIRST_HOUR..=LAST_HOUR)
        .map(|hour| {
            let label = format!("{hour:02}:00");
            FrequencyBucket {
                time: label.clone(),
                label,
                value: counts[usize::from(hour)],
            }
        })
        .collect()
}

/// Items that pass the filters, in list order. `name_of` supplies the
/// location name the location filter compares against.
pub fn filtered<'a>(
    items: &'a [TrashItem],
    filters: &Filters,
    now: OffsetDateTime,
    mut name_of: impl FnMut(&TrashItem) -> String,
) -> Vec<&'a TrashItem> {
    items
        .iter()
        .filter(|item| {
            let name = name_of(item);
            filters.keeps(item, &name, now)
        })
        .collect()
}

/// Builds the dashboard summary. `name_of` is called once per item, in list
/// order, before any filtering.
pub fn summarize(
    items: &[TrashItem],
    filters: &Filters,
    now: OffsetDateTime,
    mut name_of: impl FnMut(&TrashItem) -> String,
) -> AnalyticsSummary {
    let names: Vec<String> = items.iter().map(&mut name_of).collect();

    let available_locations: Vec<String> = names
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let kept: Vec<(&str, &TrashItem)> = names
        .iter()
        .map(String::as_str)
        .zip(items)
        .filter(|(name, item)| filters.keeps(item, name, now))
        .collect();

    let locations = top_locations(kept.iter().copied());
    let waste_types: Vec<String> = locations
        .iter()
        .flat_map(|l| l.type_counts.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    AnalyticsSummary {
        frequency: hourly_frequency(kept.iter().map(|(_, item)| *item)),
        filter_summary: filters.summary(items.len(), kept.len()),
        locations,
        available_locations,
        waste_types,
        total_items: items.len(),
        filtered_items: kept.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    const NOW: OffsetDateTime = datetime!(2025-06-15 12:00 UTC);

    fn item(litter_type: &str, lat: f32, at: OffsetDateTime) -> TrashItem {
        TrashItem {
            id: Uuid::new_v4(),
            litter_type: litter_type.into(),
            latitude: lat,
            longitude: 4.77,
            timestamp: at,
        }
    }

    fn name(item: &TrashItem) -> String {
        format!("Plek {}", item.latitude)
    }

    #[test]
    fn period_bounds() {
        assert_eq!(Period::Week.since(NOW), datetime!(2025-06-08 12:00 UTC));
        assert_eq!(Period::Month.since(NOW), datetime!(2025-05-15 12:00 UTC));
        assert_eq!(Period::Year.since(NOW), datetime!(2024-06-15 12:00 UTC));
        assert_eq!(
            Period::Month.since(datetime!(2025-03-31 08:00 UTC)),
            datetime!(2025-02-28 08:00 UTC)
        );
        assert_eq!(
            Period::Month.since(datetime!(2025-01-10 08:00 UTC)),
            datetime!(2024-12-10 08:00 UTC)
        );
        assert_eq!(
            Period::Year.since(datetime!(2024-02-29 00:00 UTC)),
            datetime!(2023-02-28 00:00 UTC)
        );
        assert_eq!(Period::parse("Month"), Some(Period::Month));
        assert_eq!(Period::parse("decade"), None);
    }

    #[test]
    fn category_keys() {
        assert_eq!(category_type("gft"), Some("Organisch"));
        assert_eq!(category_type("GLAS"), Some("Glas"));
        assert_eq!(category_type("metaal"), None);
    }

    #[test]
    fn hourly_buckets_cover_six_to_twenty_two() {
        let items = [
            item("Plastic", 1.0, datetime!(2025-06-15 06:10 UTC)),
            item("Plastic", 1.0, datetime!(2025-06-15 06:50 UTC)),
            item("Glas", 1.0, datetime!(2025-06-15 22:59 UTC)),
            item("Glas", 1.0, datetime!(2025-06-15 03:00 UTC)),
            item("Glas", 1.0, datetime!(2025-06-15 23:00 UTC)),
        ];
        let buckets = hourly_frequency(&items);
        assert_eq!(buckets.len(), 17);
        assert_eq!(buckets[0].label, "06:00");
        assert_eq!(buckets[0].time, "06:00");
        assert_eq!(buckets[0].value, 2);
        assert_eq!(buckets[16].label, "22:00");
        assert_eq!(buckets[16].value, 1);
        assert_eq!(buckets.iter().map(|b| b.value).sum::<usize>(), 3);
    }

    #[test]
    fn top_five_by_count() {
        let mut items = Vec::new();
        for (lat, n) in [(1.0, 3), (2.0, 1), (3.0, 6), (4.0, 2), (5.0, 5), (6.0, 4)] {
            for _ in 0..n {
                items.push(item("Plastic", lat, NOW));
            }
        }
        items.push(item("Glas", 3.0, NOW));

        let summary = summarize(&items, &Filters::default(), NOW, name);
        let names: Vec<&str> = summary.locations.iter().map(|l| l.location_name.as_str()).collect();
        assert_eq!(names, ["Plek 3", "Plek 5", "Plek 6", "Plek 1", "Plek 4"]);
        assert_eq!(summary.locations[0].total_count, 7);
        assert_eq!(summary.locations[0].type_counts.get("Glas"), Some(&1));
        assert_eq!(summary.waste_types, ["Glas", "Plastic"]);
        assert_eq!(summary.available_locations.len(), 6);
        assert_eq!(summary.filter_summary, "de volledige periode, alle locaties, alle categorieën, (22 items)");
    }

    #[test]
    fn filtered_keeps_list_order() {
        let items = [
            item("Glas", 1.0, NOW),
            item("Plastic", 2.0, NOW),
            item("glas", 2.0, datetime!(2025-06-01 12:00 UTC)),
            item("Glas", 2.0, NOW),
        ];
        let filters = Filters {
            period: Some(Period::Week),
            category: Some("glas".into()),
            location: Some("plek 2".into()),
        };
        let kept = filtered(&items, &filters, NOW, name);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, items[3].id);

        assert_eq!(filtered(&items, &Filters::default(), NOW, name).len(), 4);
    }

    #[test]
    fn filters_combine() {
        let items = [
            item("Plastic", 1.0, datetime!(2025-06-14 09:00 UTC)),
            item("plastic", 1.0, datetime!(2025-06-10 09:00 UTC)),
            item("Glas", 1.0, datetime!(2025-06-14 09:00 UTC)),
            item("Plastic", 2.0, datetime!(2025-06-14 09:00 UTC)),
            item("Plastic", 1.0, datetime!(2025-05-01 09:00 UTC)),
        ];
        let filters = Filters {
            period: Some(Period::Week),
            category: Some("plastic".into()),
            location: Some("plek 1".into()),
        };
        let summary = summarize(&items, &filters, NOW, name);

        assert_eq!(summary.total_items, 5);
        assert_eq!(summary.filtered_items, 2);
        assert_eq!(summary.available_locations, ["Plek 1", "Plek 2"]);
        assert_eq!(summary.locations.len(), 1);
        assert_eq!(summary.frequency[3].value, 2);
        assert_eq!(
            summary.filter_summary,
            "de afgelopen week, locatie: plek 1, categorie: Plastic, (2 items)"
        );
    }

    #[test]
    fn unknown_category_does_not_filter() {
        let items = [item("Plastic", 1.0, NOW), item("Glas", 1.0, NOW)];
        let filters = Filters {
            category: Some("metaal".into()),
            ..Filters::default()
        };
        let summary = summarize(&items, &filters, NOW, name);
        assert_eq!(summary.filtered_items, 2);
        assert_eq!(summary.filter_summary, "de volledige periode, alle locaties, categorie: metaal, (2 items)");
    }

    #[test]
    fn gft_has_its_own_label() {
        let filters = Filters {
            category: Some("gft".into()),
            ..Filters::default()
        };
        assert_eq!(
            filters.summary(10, 4),
            "de volledige periode, alle locaties, categorie: GFT/Organisch, (4 items)"
        );
    }

    #[test]
    fn names_are_computed_in_list_order() {
        let items = [item("Plastic", 2.0, NOW), item("Plastic", 1.0, NOW), item("Glas", 2.0, NOW)];
        let mut seen = Vec::new();
        summarize(&items, &Filters::default(), NOW, |i| {
            seen.push(i.latitude);
            name(i)
        });
        assert_eq!(seen, [2.0, 1.0, 2.0]);
    }

    #[test]
    fn empty_query_strings_are_no_filter() {
        let q = SummaryQuery {
            period: Some("".into()),
            category: Some("  ".into()),
            location: None,
            ..SummaryQuery::default()
        };
        assert!(!Filters::from_query(&q).is_active());
    }
}
