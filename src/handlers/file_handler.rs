use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{error, info};
use serde_json::json;
use std::collections::HashMap;

use crate::handlers::{current_session, error_response};
use crate::helpers;
use crate::routes::app_state::AppState;
use crate::services::GatewayError;

/// Stores an uploaded file under the user's namespace. The original
/// filename arrives as the `name` query parameter; same-name uploads
/// overwrite.
pub async fn upload(
    data: web::Data<AppState>,
    session: Session,
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
    bytes: web::Bytes,
) -> HttpResponse {
    let Some((_, state)) = current_session(&data.session_manager, &session) else {
        return error_response(&GatewayError::NotAuthenticated);
    };

    let Some(filename) = query.get("name").filter(|name| !name.is_empty()) else {
        return HttpResponse::BadRequest().json(json!({"error": "Missing file name"}));
    };
    let content_type = req
        .headers()
        .get("Content-Type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream");

    match data
        .chat
        .upload_file(&state.auth, filename, bytes.to_vec(), content_type)
        .await
    {
        Ok(url) => {
            info!("uploaded {} for {}", filename, state.auth.uid);
            HttpResponse::Ok().json(json!({"url": url}))
        }
        Err(e) => {
            error!("upload failed for {}: {}", state.auth.uid, e);
            error_response(&e)
        }
    }
}

pub async fn list(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let Some((_, state)) = current_session(&data.session_manager, &session) else {
        return error_response(&GatewayError::NotAuthenticated);
    };

    match data.chat.get_files(&state.auth).await {
        Ok(urls) => {
            let files: Vec<_> = urls
                .iter()
                .map(|url| {
                    json!({
                        "url": url,
                        "name": helpers::filename_from_url(url),
                    })
                })
                .collect();
            HttpResponse::Ok().json(json!({"files": files}))
        }
        Err(e) => {
            error!("file list failed for {}: {}", state.auth.uid, e);
            error_response(&e)
        }
    }
}

pub async fn delete(
    data: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> HttpResponse {
    let Some((_, state)) = current_session(&data.session_manager, &session) else {
        return error_response(&GatewayError::NotAuthenticated);
    };

    let filename = path.into_inner();
    match data.chat.delete_file(&state.auth, &filename).await {
        Ok(()) => {
            info!("deleted {} for {}", filename, state.auth.uid);
            HttpResponse::Ok().json(json!({"deleted": true}))
        }
        Err(e) => {
            error!("delete failed for {}: {}", state.auth.uid, e);
            error_response(&e)
        }
    }
}
