//! Picking the newest entry of a show or feed

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::browse::BrowseResultItem;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse the date formats providers put in DIDL and SMAPI metadata.
///
/// Accepts RFC 3339, RFC 2822, `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD`.
/// Offset-less values are taken as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Date of an item: the first candidate, in preference order, that parses
pub fn item_date(item: &BrowseResultItem) -> Option<DateTime<Utc>> {
    item.dates().find_map(parse_date)
}

/// The newest dated item, or the first item when none carries a usable date.
///
/// Items with equal dates keep their input order.
pub fn pick_latest(items: &[BrowseResultItem]) -> Option<&BrowseResultItem> {
    let mut dated: Vec<(DateTime<Utc>, &BrowseResultItem)> = items
        .iter()
        .filter_map(|item| item_date(item).map(|date| (date, item)))
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    dated
        .first()
        .map(|(_, item)| *item)
        .or_else(|| items.first())
}
