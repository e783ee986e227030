pub mod booking;
pub mod conversation;
pub mod entities;
pub mod intent;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use conversation::{
    ActiveIntent, BookingDraft, ChatMessage, ConversationState, ConversationStep, MessageRole,
    TimeWindow,
};
pub use entities::{Area, ExtractedEntities, ExtractionResult, Priority, TimePreference};
pub use intent::{Confidence, DetectedIntent, DetectedLanguage, DetectionResult};
