//! Runs the backend work a conversation parks on and feeds the outcome back into it.

use crate::models::{ActiveIntent, BookingDraft, ConversationState, ConversationStep, NewBooking};
use crate::services::backend::BookingBackend;
use crate::services::conversation::{
    record_action_result, record_booking_confirmed, record_booking_failed, ActionOutcome,
};

const MISSING_FIELDS: &str = "Missing required booking information";

/// Executes the cancel / reschedule / lookup a state at `execute-action` is waiting on.
/// Any other state is returned unchanged.
pub async fn execute_pending_action(
    backend: &dyn BookingBackend,
    state: &ConversationState,
) -> ConversationState {
    if state.step != ConversationStep::ExecuteAction {
        return state.clone();
    }

    let Some(id) = state.target_booking_id else {
        return record_action_result(state, ActionOutcome::Failed("No booking ID provided".into()));
    };

    let outcome = match state.active_intent {
        Some(ActiveIntent::Cancellation) => backend
            .cancel_booking(id)
            .await
            .map(|_| ActionOutcome::Cancelled),
        Some(ActiveIntent::Reschedule) => match &state.draft.time_window {
            Some(window) => backend
                .reschedule_booking(id, window)
                .await
                .map(|_| ActionOutcome::Rescheduled),
            None => Err(anyhow::anyhow!("No new time was selected")),
        },
        _ => backend
            .get_booking_details(id)
            .await
            .map(ActionOutcome::Details),
    };

    let intent = state.active_intent.as_ref().map(ActiveIntent::as_str);
    let outcome = outcome.unwrap_or_else(|e| {
        tracing::warn!(booking_id = id, intent, error = %e, "booking action failed");
        ActionOutcome::Failed(e.to_string())
    });

    tracing::info!(booking_id = id, intent, "booking action executed");
    record_action_result(state, outcome)
}

/// Submits the draft of a state at `confirmation`. Failures keep the draft at confirmation.
pub async fn confirm_booking(
    backend: &dyn BookingBackend,
    state: &ConversationState,
) -> ConversationState {
    if state.step != ConversationStep::Confirmation {
        return state.clone();
    }

    let Some(booking) = to_new_booking(&state.draft) else {
        return record_booking_failed(state, MISSING_FIELDS);
    };

    match backend.create_booking(&booking).await {
        Ok(created) => record_booking_confirmed(state, created.id),
        Err(e) => {
            tracing::warn!(error = %e, "booking submission failed");
            record_booking_failed(state, &e.to_string())
        }
    }
}

fn to_new_booking(draft: &BookingDraft) -> Option<NewBooking> {
    Some(NewBooking {
        service_category: draft.service_category.clone()?,
        address: draft.address.clone()?,
        time_window: draft.time_window?,
        contact_info: draft.contact_info.clone()?,
        notes: draft.notes.clone().unwrap_or_default(),
        customer_name: draft.customer_name.clone(),
    })
}
