use serde::{Deserialize, Serialize};

use crate::models::conversation::ActiveIntent;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DetectedIntent {
    NewBooking,
    Cancellation,
    Inquiry,
    Reschedule,
    Unknown,
}

impl DetectedIntent {
    /// Maps onto the session intent. Unknown falls back to a new booking.
    pub fn to_active(self) -> ActiveIntent {
        match self {
            DetectedIntent::Cancellation => ActiveIntent::Cancellation,
            DetectedIntent::Inquiry => ActiveIntent::Inquiry,
            DetectedIntent::Reschedule => ActiveIntent::Reschedule,
            DetectedIntent::NewBooking | DetectedIntent::Unknown => ActiveIntent::NewBooking,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    English,
    Hindi,
    Hinglish,
    Mixed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectionResult {
    pub intent: DetectedIntent,
    pub language: DetectedLanguage,
    pub confidence: Confidence,
}
