use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::db::queries::{self, SESSION_KEY};
use crate::errors::AppError;
use crate::models::{ActiveIntent, ConversationState, ConversationStep};
use crate::services::actions;
use crate::services::conversation::{create_initial_state, process_user_input};
use crate::state::AppState;

fn load_current(state: &AppState) -> Result<ConversationState, AppError> {
    let conn = state.conn()?;
    let current = queries::load_session(&conn, SESSION_KEY, state.config.session_max_age())?;
    Ok(current.unwrap_or_else(create_initial_state))
}

fn persist(state: &AppState, conversation: &ConversationState) -> Result<(), AppError> {
    let conn = state.conn()?;
    queries::save_session(&conn, SESSION_KEY, conversation)?;
    Ok(())
}

// GET /api/chat
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConversationState>, AppError> {
    Ok(Json(load_current(&state)?))
}

// POST /api/chat/message
#[derive(Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ConversationState>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }

    let _session = state.session.lock().await;
    let current = load_current(&state)?;
    let mut next = process_user_input(&current, &req.text, &state.config.service_categories);

    if next.step == ConversationStep::ExecuteAction {
        next = actions::execute_pending_action(state.backend.as_ref(), &next).await;
    }

    tracing::info!(
        from = current.step.as_str(),
        to = next.step.as_str(),
        intent = next.active_intent.as_ref().map(ActiveIntent::as_str),
        finished = next.step.is_terminal(),
        "chat message handled"
    );

    persist(&state, &next)?;
    Ok(Json(next))
}

// POST /api/chat/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConversationState>, AppError> {
    let _session = state.session.lock().await;
    let current = load_current(&state)?;
    if current.step != ConversationStep::Confirmation {
        return Err(AppError::BadRequest(format!(
            "nothing to confirm at step {}",
            current.step.as_str()
        )));
    }

    let next = actions::confirm_booking(state.backend.as_ref(), &current).await;
    persist(&state, &next)?;
    Ok(Json(next))
}

// POST /api/chat/restart
pub async fn restart(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConversationState>, AppError> {
    let _session = state.session.lock().await;
    {
        let conn = state.conn()?;
        queries::clear_session(&conn, SESSION_KEY)?;
    }
    tracing::info!("chat session cleared");
    Ok(Json(create_initial_state()))
}
