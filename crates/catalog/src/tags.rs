//! Classification of flat backend tag strings.
//!
//! The backend sends tags as a comma-joined string (or occasionally a list).
//! `event_type` is the first tag naming a known kind. `period` follows the
//! war markers in the tags; when none is present it is derived from the
//! event date rather than assumed.

use chrono::{Datelike, NaiveDate};

use crate::event::{EventType, WarPeriod};

const WWII_MARKERS: &[&str] = &["wwii", "ww2", "world war ii", "world war 2"];
const WWI_MARKERS: &[&str] = &["wwi", "ww1", "world war i", "world war 1"];
const INTERWAR_MARKERS: &[&str] = &["interwar", "inter-war"];

/// Split a comma-joined tag string, trimming each tag and dropping empties.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Classification {
    pub event_type: EventType,
    pub period: WarPeriod,
    /// True if no tag named a period and `period` came from the date.
    pub period_inferred: bool,
}

fn has_marker(tags: &[String], markers: &[&str]) -> bool {
    tags.iter()
        .any(|t| markers.iter().any(|m| t.eq_ignore_ascii_case(m)))
}

/// Derive type and period from already-split tags.
pub fn classify_tags(tags: &[String], date: NaiveDate) -> Classification {
    let event_type = tags
        .iter()
        .find_map(|t| EventType::from_tag(t))
        .unwrap_or(EventType::Unclassified);

    let tagged = if has_marker(tags, WWII_MARKERS) {
        Some(WarPeriod::Wwii)
    } else if has_marker(tags, WWI_MARKERS) {
        Some(WarPeriod::Wwi)
    } else if has_marker(tags, INTERWAR_MARKERS) {
        Some(WarPeriod::Interwar)
    } else {
        None
    };

    Classification {
        event_type,
        period: tagged.unwrap_or_else(|| WarPeriod::for_year(date.year())),
        period_inferred: tagged.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_tags, split_tags};
    use crate::event::{EventType, WarPeriod};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn split_trims_and_drops_empty() {
        assert_eq!(
            split_tags(" wwii, battles ,,Normandy , "),
            vec!["wwii".to_string(), "battles".into(), "Normandy".into()]
        );
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn first_known_type_wins() {
        let tags = split_tags("Normandy,invasions,battles,wwii");
        let c = classify_tags(&tags, date(1944, 6, 6));
        assert_eq!(c.event_type, EventType::Invasions);
        assert_eq!(c.period, WarPeriod::Wwii);
        assert!(!c.period_inferred);
    }

    #[test]
    fn wwii_marker_beats_wwi_marker() {
        let tags = split_tags("wwi,WW2,treaties");
        let c = classify_tags(&tags, date(1919, 6, 28));
        assert_eq!(c.period, WarPeriod::Wwii);
        assert_eq!(c.event_type, EventType::Unclassified);
    }

    #[test]
    fn untagged_period_follows_date() {
        let none: Vec<String> = Vec::new();
        assert_eq!(classify_tags(&none, date(1916, 7, 1)).period, WarPeriod::Wwi);
        assert_eq!(classify_tags(&none, date(1923, 11, 8)).period, WarPeriod::Interwar);
        let c = classify_tags(&none, date(1942, 8, 23));
        assert_eq!(c.period, WarPeriod::Wwii);
        assert!(c.period_inferred);
    }

    #[test]
    fn explicit_interwar_tag() {
        let tags = split_tags("conferences, interwar");
        let c = classify_tags(&tags, date(1945, 2, 4));
        assert_eq!(c.period, WarPeriod::Interwar);
        assert_eq!(c.event_type, EventType::Conferences);
    }
}
