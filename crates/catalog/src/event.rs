use std::fmt;

use chrono::NaiveDate;
use foundation::GeoCoordinate;
use serde::{Deserialize, Serialize};

/// Kind of historical event, as tagged by the backend.
///
/// `Surrender` and `Surrenders` are both real tags in the data set and are
/// kept distinct.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Agreements,
    Assassinations,
    Attacks,
    Battles,
    Conferences,
    Declarations,
    Developments,
    Invasions,
    Mutinies,
    Operations,
    Surrender,
    Surrenders,
    Threats,
    Trials,
    Uprisings,
    /// No tag matched a known kind.
    Unclassified,
}

impl EventType {
    /// Every classifiable kind (excludes `Unclassified`).
    pub const KNOWN: [EventType; 15] = [
        EventType::Agreements,
        EventType::Assassinations,
        EventType::Attacks,
        EventType::Battles,
        EventType::Conferences,
        EventType::Declarations,
        EventType::Developments,
        EventType::Invasions,
        EventType::Mutinies,
        EventType::Operations,
        EventType::Surrender,
        EventType::Surrenders,
        EventType::Threats,
        EventType::Trials,
        EventType::Uprisings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Agreements => "agreements",
            EventType::Assassinations => "assassinations",
            EventType::Attacks => "attacks",
            EventType::Battles => "battles",
            EventType::Conferences => "conferences",
            EventType::Declarations => "declarations",
            EventType::Developments => "developments",
            EventType::Invasions => "invasions",
            EventType::Mutinies => "mutinies",
            EventType::Operations => "operations",
            EventType::Surrender => "surrender",
            EventType::Surrenders => "surrenders",
            EventType::Threats => "threats",
            EventType::Trials => "trials",
            EventType::Uprisings => "uprisings",
            EventType::Unclassified => "unclassified",
        }
    }

    /// Case-insensitive match of a single tag against the known kinds.
    pub fn from_tag(tag: &str) -> Option<EventType> {
        let tag = tag.trim();
        Self::KNOWN
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarPeriod {
    Wwi,
    Interwar,
    Wwii,
}

impl WarPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            WarPeriod::Wwi => "wwi",
            WarPeriod::Interwar => "interwar",
            WarPeriod::Wwii => "wwii",
        }
    }

    /// Period a calendar year falls into.
    pub fn for_year(year: i32) -> WarPeriod {
        match year {
            ..=1918 => WarPeriod::Wwi,
            1919..=1938 => WarPeriod::Interwar,
            _ => WarPeriod::Wwii,
        }
    }
}

impl fmt::Display for WarPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single historical event. Immutable once received; identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: GeoCoordinate,
    pub event_type: EventType,
    pub period: WarPeriod,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
