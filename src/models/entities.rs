use serde::{Deserialize, Serialize};

use crate::models::intent::Confidence;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Area {
    Kitchen,
    Bathroom,
    Bedroom,
    LivingRoom,
    EntireHouse,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Normal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimePreference {
    Asap,
    Morning,
    Afternoon,
    Evening,
}

impl TimePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimePreference::Asap => "asap",
            TimePreference::Morning => "morning",
            TimePreference::Afternoon => "afternoon",
            TimePreference::Evening => "evening",
        }
    }

    /// Parses an exact time-window token, ignoring case and surrounding whitespace.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "asap" => Some(TimePreference::Asap),
            "morning" => Some(TimePreference::Morning),
            "afternoon" => Some(TimePreference::Afternoon),
            "evening" => Some(TimePreference::Evening),
            _ => None,
        }
    }

    /// Local start and end hour of the window.
    pub fn hours(&self) -> (u32, u32) {
        match self {
            TimePreference::Morning => (8, 12),
            TimePreference::Afternoon => (12, 17),
            TimePreference::Evening => (17, 20),
            TimePreference::Asap => (8, 20),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedEntities {
    pub service_category: Option<String>,
    pub area: Option<Area>,
    pub priority: Option<Priority>,
    pub time_preference: Option<TimePreference>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub entities: ExtractedEntities,
    pub confidence: Confidence,
    /// Set when something was extracted but only at low confidence. Nothing acts on it yet.
    pub ambiguous: bool,
}
