use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::entities::{Area, Priority, TimePreference};
use crate::models::intent::DetectedLanguage;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ConversationStep {
    Welcome,
    ServiceSelection,
    CustomerName,
    Address,
    TimeWindow,
    ContactInfo,
    Notes,
    Confirmation,
    Complete,
    CollectBookingId,
    CollectRescheduleTime,
    ExecuteAction,
    ShowResult,
}

impl ConversationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStep::Welcome => "welcome",
            ConversationStep::ServiceSelection => "service-selection",
            ConversationStep::CustomerName => "customer-name",
            ConversationStep::Address => "address",
            ConversationStep::TimeWindow => "time-window",
            ConversationStep::ContactInfo => "contact-info",
            ConversationStep::Notes => "notes",
            ConversationStep::Confirmation => "confirmation",
            ConversationStep::Complete => "complete",
            ConversationStep::CollectBookingId => "collect-booking-id",
            ConversationStep::CollectRescheduleTime => "collect-reschedule-time",
            ConversationStep::ExecuteAction => "execute-action",
            ConversationStep::ShowResult => "show-result",
        }
    }

    /// Steps that are only left through a restart.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversationStep::Complete | ConversationStep::ShowResult)
    }
}

/// The goal locked in by the first substantive utterance of a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveIntent {
    NewBooking,
    Cancellation,
    Inquiry,
    Reschedule,
}

impl ActiveIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveIntent::NewBooking => "new-booking",
            ActiveIntent::Cancellation => "cancellation",
            ActiveIntent::Inquiry => "inquiry",
            ActiveIntent::Reschedule => "reschedule",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Bot,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            quick_replies: None,
        }
    }

    pub fn with_quick_replies(mut self, replies: Vec<String>) -> Self {
        self.quick_replies = Some(replies);
        self
    }
}

/// A booking window as nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingDraft {
    #[serde(default)]
    pub service_category: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,

    // Extracted from the opening utterance, not confirmed by the user.
    #[serde(default)]
    pub area: Option<Area>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub time_preference: Option<TimePreference>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    pub step: ConversationStep,
    #[serde(default)]
    pub draft: BookingDraft,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub active_intent: Option<ActiveIntent>,
    #[serde(default)]
    pub detected_language: Option<DetectedLanguage>,
    #[serde(default)]
    pub target_booking_id: Option<u64>,
    #[serde(default)]
    pub reschedule_time: Option<String>,
}

impl ConversationState {
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
