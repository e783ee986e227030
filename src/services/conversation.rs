//! The booking dialogue as a pure state machine.
//!
//! Every entry point borrows the current [`ConversationState`] and returns a new one. Nothing
//! here performs I/O: when the dialogue needs the booking backend the state parks at
//! [`ConversationStep::ExecuteAction`] (or `Confirmation` for new bookings) and the caller
//! reports the outcome back through [`record_action_result`] or [`record_booking_confirmed`].

use chrono::{DateTime, Local, TimeZone};

use crate::models::{
    ActiveIntent, Booking, BookingDraft, ChatMessage, Confidence, ConversationState,
    ConversationStep, DetectedIntent, MessageRole, Priority, TimePreference,
};
use crate::services::extraction::extract_entities;
use crate::services::intent::detect_intent_and_language;
use crate::services::validators::{
    validate_address, validate_booking_id, validate_contact_info, validate_time_window_at,
};

const GREETING: &str = "Hi! I'm ServiceBot, your home service booking assistant. I can help you book services, check booking status, cancel, or reschedule. Just tell me what you need in English, Hindi, or Hinglish!";

const HELP_TEXT: &str = "I can help you:\n• Book a new service\n• Check booking status\n• Cancel a booking\n• Reschedule a booking\n\nJust tell me what you need! Type 'restart' anytime to start over.";

const ANYTHING_ELSE: &str =
    "Is there anything else I can help you with? Type \"restart\" to start a new conversation.";

const RESTART_COMMANDS: &[&str] = &["restart", "reset", "start over"];

/// What the caller observed when it ran the pending backend operation.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Cancelled,
    Rescheduled,
    Details(Booking),
    Failed(String),
}

pub fn create_initial_state() -> ConversationState {
    ConversationState {
        step: ConversationStep::Welcome,
        draft: BookingDraft::default(),
        messages: vec![bot(GREETING)],
        active_intent: None,
        detected_language: None,
        target_booking_id: None,
        reschedule_time: None,
    }
}

pub fn process_user_input(
    state: &ConversationState,
    input: &str,
    categories: &[String],
) -> ConversationState {
    process_user_input_at(state, input, categories, &Local::now())
}

/// Same as [`process_user_input`] with time windows resolved against `now`.
pub fn process_user_input_at<Tz: TimeZone>(
    state: &ConversationState,
    input: &str,
    categories: &[String],
    now: &DateTime<Tz>,
) -> ConversationState {
    let command = input.trim().to_lowercase();

    if RESTART_COMMANDS.contains(&command.as_str()) {
        tracing::debug!(from = state.step.as_str(), "conversation restarted");
        return create_initial_state();
    }

    if command == "help" {
        let mut next = state.clone();
        next.messages.push(bot(HELP_TEXT));
        return next;
    }

    let mut next = state.clone();
    next.messages.push(ChatMessage::new(MessageRole::User, input));

    let next = match state.active_intent {
        Some(intent) if state.step != ConversationStep::Welcome => {
            continue_conversation(next, intent, input, categories, now)
        }
        _ => start_conversation(next, input, categories),
    };

    tracing::debug!(
        from = state.step.as_str(),
        to = next.step.as_str(),
        intent = ?next.active_intent,
        "conversation transition"
    );

    next
}

/// Records the backend outcome for a parked non-booking action and ends the session.
pub fn record_action_result(state: &ConversationState, outcome: ActionOutcome) -> ConversationState {
    if state.step != ConversationStep::ExecuteAction {
        return state.clone();
    }

    let booking_ref = state
        .target_booking_id
        .map(format_booking_id)
        .unwrap_or_else(|| "your booking".to_string());

    let content = match outcome {
        ActionOutcome::Cancelled => format!(
            "✅ Your booking ({booking_ref}) has been cancelled successfully.\n\n{ANYTHING_ELSE}"
        ),
        ActionOutcome::Rescheduled => format!(
            "✅ Your booking ({booking_ref}) has been rescheduled to {} successfully!\n\n{ANYTHING_ELSE}",
            state.reschedule_time.as_deref().unwrap_or("the new time"),
        ),
        ActionOutcome::Details(booking) => {
            format!("{}\n\n{ANYTHING_ELSE}", format_booking_details(&booking))
        }
        ActionOutcome::Failed(error) => format!(
            "❌ Sorry, I couldn't complete that for {booking_ref}. {error}\n\nType \"restart\" to start over."
        ),
    };

    let mut next = state.clone();
    next.step = ConversationStep::ShowResult;
    next.messages.push(bot(content));
    next
}

/// Marks a submitted draft as booked.
pub fn record_booking_confirmed(state: &ConversationState, booking_id: u64) -> ConversationState {
    if state.step != ConversationStep::Confirmation {
        return state.clone();
    }

    let mut next = state.clone();
    next.step = ConversationStep::Complete;
    next.messages.push(bot(format!(
        "🎉 Your booking has been confirmed! Your booking ID is {}. Thank you for using ServiceBot!",
        format_booking_id(booking_id)
    )));
    next
}

/// Reports a failed submission. The draft stays at confirmation so it can be submitted again.
pub fn record_booking_failed(state: &ConversationState, error: &str) -> ConversationState {
    if state.step != ConversationStep::Confirmation {
        return state.clone();
    }

    let mut next = state.clone();
    next.messages.push(bot(format!("❌ Failed to create booking: {error}")));
    next
}

pub fn add_system_message(state: &ConversationState, content: &str) -> ConversationState {
    let mut next = state.clone();
    next.messages.push(ChatMessage::new(MessageRole::System, content));
    next
}

pub fn format_booking_id(id: u64) -> String {
    format!("BK{id}")
}

// ── First turn ──

fn start_conversation(
    mut next: ConversationState,
    input: &str,
    categories: &[String],
) -> ConversationState {
    let detection = detect_intent_and_language(input);
    next.detected_language = Some(detection.language);
    next.active_intent = Some(detection.intent.to_active());

    match detection.intent {
        DetectedIntent::NewBooking => {
            let extraction = extract_entities(input, categories);
            let entities = extraction.entities;

            next.draft.area = entities.area;
            next.draft.priority = entities.priority;
            next.draft.time_preference = entities.time_preference;
            if extraction.confidence == Confidence::High {
                next.draft.service_category = entities.service_category;
            }
            if let Some(location) = entities.location {
                next.draft.address = Some(location.clone());
                next.draft.location = Some(location);
            }

            match next.draft.service_category.clone() {
                Some(category) => {
                    next.step = ConversationStep::CustomerName;
                    next.messages.push(bot_with(
                        format!(
                            "Great! I detected you need {category} service. May I have your name? (You can type \"Skip\" if you prefer not to share)"
                        ),
                        vec!["Skip".to_string()],
                    ));
                    next
                }
                None => ask_for_service(next, categories),
            }
        }
        DetectedIntent::Unknown => ask_for_service(next, categories),
        DetectedIntent::Cancellation => ask_for_booking_id(
            next,
            "I can help you cancel your booking. Please provide your booking ID (e.g., BK10245 or 10245):",
        ),
        DetectedIntent::Inquiry => ask_for_booking_id(
            next,
            "I can check your booking status. Please provide your booking ID (e.g., BK10245 or 10245):",
        ),
        DetectedIntent::Reschedule => ask_for_booking_id(
            next,
            "I can help you reschedule your booking. Please provide your booking ID (e.g., BK10245 or 10245):",
        ),
    }
}

fn ask_for_service(mut next: ConversationState, categories: &[String]) -> ConversationState {
    next.step = ConversationStep::ServiceSelection;
    next.messages.push(bot_with(
        "What type of service do you need?",
        categories.to_vec(),
    ));
    next
}

fn ask_for_booking_id(mut next: ConversationState, prompt: &str) -> ConversationState {
    next.step = ConversationStep::CollectBookingId;
    next.messages.push(bot(prompt));
    next
}

// ── Later turns ──

fn continue_conversation<Tz: TimeZone>(
    next: ConversationState,
    intent: ActiveIntent,
    input: &str,
    categories: &[String],
    now: &DateTime<Tz>,
) -> ConversationState {
    use ConversationStep::*;

    match (intent, next.step) {
        (ActiveIntent::NewBooking, ServiceSelection) => select_service(next, input, categories),
        (ActiveIntent::NewBooking, CustomerName) => collect_name(next, input),
        (ActiveIntent::NewBooking, Address) => collect_address(next, input),
        (ActiveIntent::NewBooking, TimeWindow) => collect_time_window(next, input, now),
        (ActiveIntent::NewBooking, ContactInfo) => collect_contact(next, input),
        (ActiveIntent::NewBooking, Notes) => collect_notes(next, input),
        (
            ActiveIntent::Cancellation | ActiveIntent::Inquiry | ActiveIntent::Reschedule,
            CollectBookingId,
        ) => collect_booking_id(next, intent, input),
        (ActiveIntent::Reschedule, CollectRescheduleTime) => {
            collect_reschedule_time(next, input, now)
        }
        _ => idle_reply(next),
    }
}

fn select_service(
    mut next: ConversationState,
    input: &str,
    categories: &[String],
) -> ConversationState {
    let wanted = input.trim().to_lowercase();
    let Some(selected) = categories.iter().find(|c| c.to_lowercase() == wanted) else {
        next.messages.push(bot_with(
            format!(
                "I don't recognize that service. Please choose from: {}.",
                categories.join(", ")
            ),
            categories.to_vec(),
        ));
        return next;
    };

    next.step = ConversationStep::CustomerName;
    next.draft.service_category = Some(selected.clone());
    next.messages.push(bot_with(
        format!(
            "Great! You've selected {selected}. May I have your name? (You can type \"Skip\" if you prefer not to share)"
        ),
        vec!["Skip".to_string()],
    ));
    next
}

fn collect_name(mut next: ConversationState, input: &str) -> ConversationState {
    let name = input.trim();
    if name.is_empty() {
        next.messages.push(bot_with(
            "Please tell me your name, or type \"Skip\".",
            vec!["Skip".to_string()],
        ));
        return next;
    }

    let greeting = if name.eq_ignore_ascii_case("skip") {
        "No problem!".to_string()
    } else {
        next.draft.customer_name = Some(name.to_string());
        format!("Nice to meet you, {name}!")
    };

    next.step = ConversationStep::Address;
    let prompt = match &next.draft.address {
        Some(address) => bot_with(
            format!("{greeting} I have your address as: {address}. Is this correct?"),
            vec!["Yes".to_string(), "No".to_string()],
        ),
        None => bot(format!("{greeting} What's the service address?")),
    };
    next.messages.push(prompt);
    next
}

fn collect_address(mut next: ConversationState, input: &str) -> ConversationState {
    let answer = input.trim();

    // A pre-extracted address is confirmed or discarded with yes/no.
    if next.draft.address.is_some() {
        if answer.eq_ignore_ascii_case("yes") {
            return ask_for_time_window(next);
        }
        if answer.eq_ignore_ascii_case("no") {
            next.draft.address = None;
            next.messages.push(bot("No problem. What's the service address?"));
            return next;
        }
    }

    match validate_address(input) {
        Ok(address) => {
            next.draft.address = Some(address);
            ask_for_time_window(next)
        }
        Err(e) => {
            next.messages.push(bot(e.to_string()));
            next
        }
    }
}

fn ask_for_time_window(mut next: ConversationState) -> ConversationState {
    let prompt = if next.draft.priority == Some(Priority::Urgent) {
        "I see this is urgent! When would you like the service?"
    } else {
        "When would you like the service? Choose a time window:"
    };
    next.step = ConversationStep::TimeWindow;
    let replies = time_window_replies(&next.draft);
    next.messages.push(bot_with(prompt, replies));
    next
}

fn collect_time_window<Tz: TimeZone>(
    mut next: ConversationState,
    input: &str,
    now: &DateTime<Tz>,
) -> ConversationState {
    match validate_time_window_at(input, now) {
        Ok(window) => {
            let pref = TimePreference::parse(input);
            next.draft.time_window = Some(window);
            next.draft.time_preference = pref;
            next.step = ConversationStep::ContactInfo;
            next.messages.push(bot(format!(
                "Perfect! I've scheduled it for {}. What's the best way to contact you? (email or phone)",
                time_label(pref)
            )));
            next
        }
        Err(e) => {
            let replies = time_window_replies(&next.draft);
            next.messages.push(bot_with(e.to_string(), replies));
            next
        }
    }
}

fn collect_contact(mut next: ConversationState, input: &str) -> ConversationState {
    match validate_contact_info(input) {
        Ok(contact) => {
            next.draft.contact_info = Some(contact);
            next.step = ConversationStep::Notes;
            next.messages.push(bot_with(
                "Got it! Any special instructions or notes for the service provider? (or type \"none\" to skip)",
                vec!["None".to_string()],
            ));
            next
        }
        Err(e) => {
            next.messages.push(bot(e.to_string()));
            next
        }
    }
}

fn collect_notes(mut next: ConversationState, input: &str) -> ConversationState {
    let notes = input.trim();
    let notes = if notes.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        notes.to_string()
    };

    next.draft.notes = Some(notes);
    next.step = ConversationStep::Confirmation;
    let summary = summarize_draft(&next.draft);
    next.messages.push(bot(summary));
    next
}

fn collect_booking_id(
    mut next: ConversationState,
    intent: ActiveIntent,
    input: &str,
) -> ConversationState {
    let id = match validate_booking_id(input) {
        Ok(id) => id,
        Err(e) => {
            next.messages.push(bot(e.to_string()));
            return next;
        }
    };
    next.target_booking_id = Some(id);

    match intent {
        ActiveIntent::Reschedule => {
            next.step = ConversationStep::CollectRescheduleTime;
            next.messages.push(bot_with(
                "When would you like to reschedule to?",
                time_of_day_replies(),
            ));
        }
        ActiveIntent::Cancellation => {
            next.step = ConversationStep::ExecuteAction;
            next.messages
                .push(bot(format!("Cancelling booking {}...", format_booking_id(id))));
        }
        ActiveIntent::Inquiry | ActiveIntent::NewBooking => {
            next.step = ConversationStep::ExecuteAction;
            next.messages
                .push(bot(format!("Looking up booking {}...", format_booking_id(id))));
        }
    }
    next
}

fn collect_reschedule_time<Tz: TimeZone>(
    mut next: ConversationState,
    input: &str,
    now: &DateTime<Tz>,
) -> ConversationState {
    match validate_time_window_at(input, now) {
        Ok(window) => {
            let label = input.trim().to_lowercase();
            next.draft.time_window = Some(window);
            next.step = ConversationStep::ExecuteAction;
            next.messages.push(bot(format!(
                "Rescheduling {} to {label}...",
                next.target_booking_id
                    .map(format_booking_id)
                    .unwrap_or_else(|| "your booking".to_string()),
            )));
            next.reschedule_time = Some(label);
            next
        }
        Err(e) => {
            next.messages.push(bot_with(e.to_string(), time_of_day_replies()));
            next
        }
    }
}

/// Text typed at a step that doesn't take chat input.
fn idle_reply(mut next: ConversationState) -> ConversationState {
    let reply = match next.step {
        ConversationStep::Confirmation => {
            "Your booking is ready. Please confirm it to submit, or type \"restart\" to start over."
        }
        ConversationStep::ExecuteAction => "I'm still working on your request. One moment please.",
        ConversationStep::Complete | ConversationStep::ShowResult => ANYTHING_ELSE,
        _ => "Sorry, I didn't catch that. Type \"help\" to see what I can do, or \"restart\" to start over.",
    };
    next.messages.push(bot(reply));
    next
}

// ── Formatting ──

pub fn summarize_draft(draft: &BookingDraft) -> String {
    let mut lines = vec![
        "Perfect! Let me summarize your booking:".to_string(),
        String::new(),
        format!(
            "Service: {}",
            draft.service_category.as_deref().unwrap_or("-")
        ),
    ];
    if let Some(name) = &draft.customer_name {
        lines.push(format!("Name: {name}"));
    }
    lines.push(format!("Address: {}", draft.address.as_deref().unwrap_or("-")));
    lines.push(format!("Time: {}", time_label(draft.time_preference)));
    lines.push(format!(
        "Contact: {}",
        draft.contact_info.as_deref().unwrap_or("-")
    ));
    if let Some(notes) = draft.notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push(format!("Notes: {notes}"));
    }
    lines.push(String::new());
    lines.push("Please confirm to submit your booking, or type \"restart\" to start over.".to_string());
    lines.join("\n")
}

fn format_booking_details(booking: &Booking) -> String {
    let start = Local.timestamp_nanos(booking.time_window.start);
    let mut details = format!(
        "{} Booking Details:\n\nID: {}\nService: {}\nAddress: {}\nTime: {}\nStatus: {}\nContact: {}",
        booking.status.badge(),
        format_booking_id(booking.id),
        booking.service_category,
        booking.address,
        start.format("%Y-%m-%d %H:%M"),
        booking.status.as_str(),
        booking.contact_info,
    );
    if !booking.notes.is_empty() {
        details.push_str(&format!("\nNotes: {}", booking.notes));
    }
    details
}

fn time_label(pref: Option<TimePreference>) -> String {
    match pref {
        Some(TimePreference::Asap) => "as soon as possible".to_string(),
        Some(p) => format!("{} tomorrow", p.as_str()),
        None => "tomorrow".to_string(),
    }
}

fn time_window_replies(draft: &BookingDraft) -> Vec<String> {
    let mut replies = Vec::with_capacity(4);
    if draft.priority == Some(Priority::Urgent) {
        replies.push("ASAP".to_string());
    }
    replies.extend(time_of_day_replies());
    replies
}

fn time_of_day_replies() -> Vec<String> {
    ["Morning", "Afternoon", "Evening"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn bot(content: impl Into<String>) -> ChatMessage {
    ChatMessage::new(MessageRole::Bot, content)
}

fn bot_with(content: impl Into<String>, replies: Vec<String>) -> ChatMessage {
    bot(content).with_quick_replies(replies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Area, BookingStatus, DetectedLanguage, TimeWindow};
    use chrono::{Duration, FixedOffset, NaiveDateTime, Timelike};

    fn catalog() -> Vec<String> {
        ["Cleaning", "Plumbing", "Electrical", "HVAC", "Handyman"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(5 * 3600 + 1800)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 15, 10, 0, 0)
            .unwrap()
    }

    fn send(state: &ConversationState, input: &str) -> ConversationState {
        process_user_input_at(state, input, &catalog(), &now())
    }

    fn send_all(inputs: &[&str]) -> ConversationState {
        inputs
            .iter()
            .fold(create_initial_state(), |state, input| send(&state, input))
    }

    fn last_bot(state: &ConversationState) -> &ChatMessage {
        state
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Bot)
            .unwrap()
    }

    /// Strips the per-message id and timestamp so two runs can be compared.
    fn shape(state: &ConversationState) -> serde_json::Value {
        let mut value = serde_json::to_value(state).unwrap();
        for msg in value["messages"].as_array_mut().unwrap() {
            let obj = msg.as_object_mut().unwrap();
            obj.remove("id");
            obj.remove("timestamp");
        }
        value
    }

    fn sample_booking() -> Booking {
        let ts = NaiveDateTime::parse_from_str("2025-06-01 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Booking {
            id: 10245,
            service_category: "Plumbing".to_string(),
            address: "12 MG Road".to_string(),
            time_window: TimeWindow { start: 0, end: 1 },
            contact_info: "9876543210".to_string(),
            notes: "Ring twice".to_string(),
            customer_name: None,
            status: BookingStatus::Confirmed,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_initial_state() {
        let state = create_initial_state();
        assert_eq!(state.step, ConversationStep::Welcome);
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, MessageRole::Bot);
        assert!(state.active_intent.is_none());
        assert_eq!(state.draft, BookingDraft::default());
    }

    #[test]
    fn test_restart_from_any_state() {
        let initial = shape(&create_initial_state());
        let mid_flow = send_all(&["I need cleaning service", "Asha", "12 MG Road"]);
        let parked = send_all(&["cancel my booking", "BK10245"]);

        for state in [create_initial_state(), mid_flow, parked] {
            for command in ["restart", "RESET", "  Start Over  "] {
                let next = send(&state, command);
                assert_eq!(shape(&next), initial);
            }
        }
    }

    #[test]
    fn test_help_appends_one_message() {
        let state = send_all(&["I need cleaning service"]);
        let next = send(&state, "HELP");
        assert_eq!(next.messages.len(), state.messages.len() + 1);
        assert_eq!(next.step, state.step);
        assert_eq!(next.draft, state.draft);
        assert_eq!(last_bot(&next).content, HELP_TEXT);
    }

    #[test]
    fn test_cleaning_request_skips_service_selection() {
        let state = send_all(&["I need cleaning service"]);
        assert_eq!(state.step, ConversationStep::CustomerName);
        assert_eq!(state.active_intent, Some(ActiveIntent::NewBooking));
        assert_eq!(state.draft.service_category.as_deref(), Some("Cleaning"));
        assert_eq!(state.messages[1].role, MessageRole::User);
        assert_eq!(state.messages[1].content, "I need cleaning service");
        assert_eq!(
            last_bot(&state).quick_replies,
            Some(vec!["Skip".to_string()])
        );
    }

    #[test]
    fn test_medium_extraction_does_not_prefill_category() {
        // Extraction confidence is medium, so the category is asked for.
        let state = send_all(&["urgent plumbing leak in kitchen"]);
        assert_eq!(state.step, ConversationStep::ServiceSelection);
        assert!(state.draft.service_category.is_none());
        assert_eq!(state.draft.priority, Some(Priority::Urgent));
        assert_eq!(state.draft.area, Some(Area::Kitchen));
        assert_eq!(state.draft.address.as_deref(), Some("kitchen"));
        assert_eq!(last_bot(&state).quick_replies, Some(catalog()));
    }

    #[test]
    fn test_short_unknown_input_starts_booking() {
        let state = send_all(&["hi"]);
        assert_eq!(state.step, ConversationStep::ServiceSelection);
        assert_eq!(state.active_intent, Some(ActiveIntent::NewBooking));
        assert_eq!(state.draft, BookingDraft::default());
    }

    #[test]
    fn test_service_selection_is_case_insensitive() {
        let state = send_all(&["hi", "  plumbing "]);
        assert_eq!(state.step, ConversationStep::CustomerName);
        assert_eq!(state.draft.service_category.as_deref(), Some("Plumbing"));
    }

    #[test]
    fn test_unknown_service_reprompts() {
        let before = send_all(&["hi"]);
        let after = send(&before, "Gardening");
        assert_eq!(after.step, ConversationStep::ServiceSelection);
        assert_eq!(after.messages.len(), before.messages.len() + 2);
        let reply = last_bot(&after);
        assert!(reply.content.contains("Cleaning, Plumbing, Electrical, HVAC, Handyman"));
        assert_eq!(reply.quick_replies, Some(catalog()));
    }

    #[test]
    fn test_full_new_booking_flow() {
        let state = send_all(&[
            "I need cleaning service",
            "Asha",
            "12 MG Road, Pune",
            "Morning",
            "asha@example.com",
            "Bring a ladder",
        ]);

        assert_eq!(state.step, ConversationStep::Confirmation);
        let draft = &state.draft;
        assert_eq!(draft.service_category.as_deref(), Some("Cleaning"));
        assert_eq!(draft.customer_name.as_deref(), Some("Asha"));
        assert_eq!(draft.address.as_deref(), Some("12 MG Road, Pune"));
        assert_eq!(draft.time_preference, Some(TimePreference::Morning));
        assert_eq!(draft.contact_info.as_deref(), Some("asha@example.com"));
        assert_eq!(draft.notes.as_deref(), Some("Bring a ladder"));

        let window = draft.time_window.unwrap();
        let tz = now().timezone();
        let start = tz.timestamp_nanos(window.start);
        assert_eq!(start.date_naive(), now().date_naive() + Duration::days(1));
        assert_eq!(start.hour(), 8);
        assert_eq!(tz.timestamp_nanos(window.end).hour(), 12);

        let summary = &last_bot(&state).content;
        assert!(summary.contains("Service: Cleaning"));
        assert!(summary.contains("Name: Asha"));
        assert!(summary.contains("Notes: Bring a ladder"));
    }

    #[test]
    fn test_skip_name_and_none_notes() {
        let state = send_all(&[
            "I need cleaning service",
            "SKIP",
            "12 MG Road",
            "evening",
            "+91 98765 43210",
            "None",
        ]);
        assert_eq!(state.step, ConversationStep::Confirmation);
        assert!(state.draft.customer_name.is_none());
        assert_eq!(state.draft.notes.as_deref(), Some(""));
    }

    #[test]
    fn test_invalid_address_reprompts() {
        let before = send_all(&["I need cleaning service", "Asha"]);
        let after = send(&before, "abc");
        assert_eq!(after.step, ConversationStep::Address);
        assert!(after.draft.address.is_none());
        assert_eq!(after.messages.len(), before.messages.len() + 2);
        assert_eq!(last_bot(&after).content, "Please provide a complete address");
    }

    #[test]
    fn test_prefilled_address_confirmed_with_yes() {
        let state = send_all(&["I need cleaning at 42 Lake View Road", "Cleaning", "Asha"]);
        assert_eq!(state.step, ConversationStep::Address);
        assert!(last_bot(&state).content.contains("42 Lake View Road"));

        let next = send(&state, "yes");
        assert_eq!(next.step, ConversationStep::TimeWindow);
        assert_eq!(next.draft.address.as_deref(), Some("42 Lake View Road"));
    }

    #[test]
    fn test_prefilled_address_rejected_with_no() {
        let state = send_all(&["I need cleaning at 42 Lake View Road", "Cleaning", "Asha", "no"]);
        assert_eq!(state.step, ConversationStep::Address);
        assert!(state.draft.address.is_none());

        let next = send(&state, "7 Hill Road");
        assert_eq!(next.step, ConversationStep::TimeWindow);
        assert_eq!(next.draft.address.as_deref(), Some("7 Hill Road"));
    }

    #[test]
    fn test_invalid_time_window_keeps_quick_replies() {
        let before = send_all(&["I need cleaning service", "Asha", "12 MG Road"]);
        let after = send(&before, "tomorrow please");
        assert_eq!(after.step, ConversationStep::TimeWindow);
        assert!(after.draft.time_window.is_none());
        assert_eq!(
            last_bot(&after).quick_replies,
            Some(vec![
                "Morning".to_string(),
                "Afternoon".to_string(),
                "Evening".to_string()
            ])
        );
    }

    #[test]
    fn test_urgent_request_offers_asap() {
        let state = send_all(&["urgent cleaning needed now", "Skip", "12 MG Road"]);
        assert_eq!(state.step, ConversationStep::TimeWindow);
        let replies = last_bot(&state).quick_replies.clone().unwrap();
        assert_eq!(replies[0], "ASAP");

        let next = send(&state, "ASAP");
        assert_eq!(next.step, ConversationStep::ContactInfo);
        assert_eq!(next.draft.time_preference, Some(TimePreference::Asap));
        assert!(last_bot(&next).content.contains("as soon as possible"));
    }

    #[test]
    fn test_invalid_contact_reprompts() {
        let before = send_all(&["I need cleaning service", "Asha", "12 MG Road", "morning"]);
        let after = send(&before, "later");
        assert_eq!(after.step, ConversationStep::ContactInfo);
        assert_eq!(
            last_bot(&after).content,
            "Please provide a valid email or phone number"
        );
    }

    #[test]
    fn test_cancellation_flow() {
        let state = send_all(&["cancel my booking"]);
        assert_eq!(state.step, ConversationStep::CollectBookingId);
        assert_eq!(state.active_intent, Some(ActiveIntent::Cancellation));

        let state = send(&state, "BK10245");
        assert_eq!(state.step, ConversationStep::ExecuteAction);
        assert_eq!(state.target_booking_id, Some(10245));

        let done = record_action_result(&state, ActionOutcome::Cancelled);
        assert_eq!(done.step, ConversationStep::ShowResult);
        assert_eq!(done.messages.len(), state.messages.len() + 1);
        assert!(last_bot(&done).content.contains("BK10245"));
        assert!(last_bot(&done).content.contains("cancelled successfully"));
    }

    #[test]
    fn test_invalid_booking_id_reprompts() {
        let before = send_all(&["cancel my booking"]);
        let after = send(&before, "BK0");
        assert_eq!(after.step, ConversationStep::CollectBookingId);
        assert!(after.target_booking_id.is_none());
        assert_eq!(
            last_bot(&after).content,
            "Booking ID must be a positive number"
        );
    }

    #[test]
    fn test_reschedule_flow() {
        let state = send_all(&["please reschedule", "10245"]);
        assert_eq!(state.step, ConversationStep::CollectRescheduleTime);
        assert_eq!(state.active_intent, Some(ActiveIntent::Reschedule));

        let retry = send(&state, "next week");
        assert_eq!(retry.step, ConversationStep::CollectRescheduleTime);
        assert_eq!(last_bot(&retry).quick_replies, Some(time_of_day_replies()));

        let state = send(&retry, "Afternoon");
        assert_eq!(state.step, ConversationStep::ExecuteAction);
        assert_eq!(state.reschedule_time.as_deref(), Some("afternoon"));
        assert!(state.draft.time_window.is_some());

        let done = record_action_result(&state, ActionOutcome::Rescheduled);
        assert_eq!(done.step, ConversationStep::ShowResult);
        assert!(last_bot(&done).content.contains("rescheduled to afternoon"));
    }

    #[test]
    fn test_inquiry_details() {
        let state = send_all(&["check status", "BK10245"]);
        assert_eq!(state.active_intent, Some(ActiveIntent::Inquiry));
        assert_eq!(state.step, ConversationStep::ExecuteAction);

        let done = record_action_result(&state, ActionOutcome::Details(sample_booking()));
        let content = &last_bot(&done).content;
        assert!(content.contains("ID: BK10245"));
        assert!(content.contains("Service: Plumbing"));
        assert!(content.contains("Status: confirmed"));
        assert!(content.contains("Notes: Ring twice"));
    }

    #[test]
    fn test_action_failure_is_surfaced_verbatim() {
        let state = send_all(&["cancel my booking", "BK10245"]);
        let done = record_action_result(
            &state,
            ActionOutcome::Failed("Booking not found".to_string()),
        );
        assert_eq!(done.step, ConversationStep::ShowResult);
        assert_eq!(done.messages.len(), state.messages.len() + 1);
        assert!(last_bot(&done).content.contains("Booking not found"));
    }

    #[test]
    fn test_action_result_ignored_outside_execute_action() {
        let state = send_all(&["cancel my booking"]);
        let same = record_action_result(&state, ActionOutcome::Cancelled);
        assert_eq!(same, state);
    }

    #[test]
    fn test_text_at_execute_action_does_not_advance() {
        let state = send_all(&["cancel my booking", "BK10245"]);
        let next = send(&state, "hello?");
        assert_eq!(next.step, ConversationStep::ExecuteAction);
        assert_eq!(next.messages.len(), state.messages.len() + 2);
    }

    #[test]
    fn test_active_intent_is_locked() {
        // "cancel" at the name step is a name, not a new intent
        let state = send_all(&["I need cleaning service", "cancel"]);
        assert_eq!(state.active_intent, Some(ActiveIntent::NewBooking));
        assert_eq!(state.draft.customer_name.as_deref(), Some("cancel"));
    }

    #[test]
    fn test_booking_confirmed() {
        let state = send_all(&[
            "I need cleaning service",
            "Asha",
            "12 MG Road",
            "morning",
            "asha@example.com",
            "none",
        ]);
        let failed = record_booking_failed(&state, "backend unavailable");
        assert_eq!(failed.step, ConversationStep::Confirmation);
        assert!(last_bot(&failed).content.contains("backend unavailable"));

        let done = record_booking_confirmed(&failed, 7);
        assert_eq!(done.step, ConversationStep::Complete);
        assert!(last_bot(&done).content.contains("BK7"));

        let after = send(&done, "thanks");
        assert_eq!(after.step, ConversationStep::Complete);
    }

    #[test]
    fn test_hindi_language_recorded() {
        let state = send_all(&["मुझे सफाई चाहिए"]);
        assert_eq!(state.detected_language, Some(DetectedLanguage::Hindi));
        assert_eq!(state.active_intent, Some(ActiveIntent::NewBooking));
    }

    #[test]
    fn test_system_message() {
        let state = add_system_message(&create_initial_state(), "Please log in");
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].role, MessageRole::System);
    }

    #[test]
    fn test_transitions_are_deterministic() {
        let inputs = ["I need cleaning service", "Asha", "12 MG Road", "morning"];
        let a = send_all(&inputs);
        let b = send_all(&inputs);
        assert_eq!(shape(&a), shape(&b));
        assert_ne!(a.messages[0].id, b.messages[0].id);
    }

    #[test]
    fn test_empty_input_is_handled() {
        let state = send(&create_initial_state(), "");
        assert_eq!(state.step, ConversationStep::ServiceSelection);
        let state = send(&state, "");
        assert_eq!(state.step, ConversationStep::ServiceSelection);
    }
}
