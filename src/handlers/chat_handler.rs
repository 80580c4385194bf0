use actix_session::Session;
use actix_web::{web, HttpResponse};
use lazy_static::lazy_static;
use log::{error, info, warn};
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::handlers::{current_session, error_response};
use crate::routes::app_state::AppState;
use crate::services::GatewayError;

lazy_static! {
    static ref DATE_KEY_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

/// Page mount: fetch the file list first; only when that works are both
/// file sets populated and today's conversation loaded. A failed file
/// fetch leaves the page in its error state with no history load.
pub async fn load_page(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let Some((session_id, mut state)) = current_session(&data.session_manager, &session) else {
        return error_response(&GatewayError::NotAuthenticated);
    };

    match data.chat.get_files(&state.auth).await {
        Ok(files) => {
            state.apply_file_load(Some(files));
            match data.chat.get_chat_data(&state.auth, None).await {
                Ok(messages) => state.set_chat_data(messages),
                Err(e) => {
                    warn!("chat history load failed for {}: {}", state.auth.uid, e);
                    state.set_chat_data(Vec::new());
                }
            }
        }
        Err(e) => {
            warn!("file list load failed for {}: {}", state.auth.uid, e);
            state.apply_file_load(None);
        }
    }

    let body = json!({
        "files": state.uploaded_files,
        "messages": state.chat_data,
    });
    data.session_manager.insert(session_id, state);
    HttpResponse::Ok().json(body)
}

/// Read-only view of one day's conversation, for history selection.
pub async fn messages_for_date(
    data: web::Data<AppState>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let Some((_, state)) = current_session(&data.session_manager, &session) else {
        return error_response(&GatewayError::NotAuthenticated);
    };

    let date = query.get("date").map(String::as_str);
    if let Some(key) = date {
        if !DATE_KEY_RE.is_match(key) {
            return HttpResponse::BadRequest().json(json!({"error": "Invalid date key"}));
        }
    }

    match data.chat.get_chat_data(&state.auth, date).await {
        Ok(messages) => HttpResponse::Ok().json(json!({"messages": messages})),
        Err(e) => {
            error!("message load failed for {}: {}", state.auth.uid, e);
            error_response(&e)
        }
    }
}

pub async fn history(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let Some((_, state)) = current_session(&data.session_manager, &session) else {
        return error_response(&GatewayError::NotAuthenticated);
    };

    match data.chat.get_history(&state.auth).await {
        Ok(entries) => HttpResponse::Ok().json(json!({"history": entries})),
        Err(e) => {
            error!("history load failed for {}: {}", state.auth.uid, e);
            error_response(&e)
        }
    }
}

/// Submits a question with the current attach set. On success the
/// returned message is appended to the page state; on failure the state
/// is left untouched and the error is surfaced.
pub async fn send_chat(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> HttpResponse {
    let Some((session_id, mut state)) = current_session(&data.session_manager, &session) else {
        return error_response(&GatewayError::NotAuthenticated);
    };

    let query = req_body["query"].as_str().unwrap_or_default().to_string();
    if query.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Empty query"}));
    }

    let files = state.attach_set.clone().unwrap_or_default();
    info!(
        "Processing question for {} with {} attached files",
        state.auth.uid,
        files.len()
    );

    match data.chat.send_message(&state.auth, &query, &files, None).await {
        Ok(message) => {
            state.push_message(message.clone());
            data.session_manager.insert(session_id, state);
            HttpResponse::Ok().json(json!({"message": message}))
        }
        Err(e) => {
            error!("send failed for session {}: {}", session_id, e);
            error_response(&e)
        }
    }
}

/// Sidebar edit of the attach set. The display list is refreshed through
/// `/files`, never patched here.
pub async fn files_change(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> HttpResponse {
    let Some((session_id, mut state)) = current_session(&data.session_manager, &session) else {
        return error_response(&GatewayError::NotAuthenticated);
    };

    let file = req_body["file"].as_str().unwrap_or_default().to_string();
    let is_deleted = req_body["isDeleted"].as_bool().unwrap_or(false);
    if file.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Missing file"}));
    }

    state.apply_files_change(&file, is_deleted);
    let attach_set = state.attach_set.clone();
    data.session_manager.insert(session_id, state);
    HttpResponse::Ok().json(json!({"attachSet": attach_set}))
}
