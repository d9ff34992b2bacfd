use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::chat::{Chat, ChatError};
use crate::models::{CreateChatResponse, MessageRequest, PromptAnswerResponse};
use crate::state::AppState;

const MAX_CHAT_MESSAGE_LEN: usize = 4000;

/// GET or POST /api/v1/chats: open an empty chat.
pub async fn create_chat(State(state): State<AppState>) -> impl IntoResponse {
    let chat = state.chat.create_chat();
    tracing::debug!(chat = %chat.uuid, open = state.chat.chat_count(), "chat created");
    let location = format!("/api/v1/chats/{}/messages", chat.uuid);
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreateChatResponse {
            chat_uuid: chat.uuid,
        }),
    )
}

/// GET /api/v1/chats/{id}
pub async fn get_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Chat>, (StatusCode, String)> {
    state.chat.require_chat(&id).map(Json).map_err(chat_error)
}

/// DELETE /api/v1/chats/{id}
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !state.chat.delete_chat(&id) {
        return Err(chat_error(ChatError::NotFound(id)));
    }
    tracing::debug!(chat = %id, open = state.chat.chat_count(), "chat deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/chats/{id}/messages: one user turn, one assistant answer.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<PromptAnswerResponse>, (StatusCode, String)> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Message is required".to_string()));
    }
    if message.chars().count() > MAX_CHAT_MESSAGE_LEN {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Message exceeds {MAX_CHAT_MESSAGE_LEN} characters"),
        ));
    }

    let answer = state
        .chat
        .reply_to_user(&id, message, &req.method)
        .await
        .map_err(chat_error)?;

    Ok(Json(PromptAnswerResponse { answer }))
}

fn chat_error(e: ChatError) -> (StatusCode, String) {
    let status = match &e {
        ChatError::NotFound(_) => StatusCode::NOT_FOUND,
        ChatError::Busy => StatusCode::CONFLICT,
        ChatError::InvalidMethod(_) => StatusCode::BAD_REQUEST,
        ChatError::Backend(err) => {
            tracing::error!("Chat backend failed: {err:#}");
            StatusCode::BAD_GATEWAY
        }
    };
    (status, e.to_string())
}
