use actix_session::Session;
use actix_web::{delete, get, post, web, HttpRequest, Responder};
use std::collections::HashMap;

use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload).service(list).service(delete_file);
}

#[post("/files/upload")]
async fn upload(
    data: web::Data<AppState>,
    session: Session,
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
    bytes: web::Bytes,
) -> impl Responder {
    crate::handlers::file_handler::upload(data, session, req, query, bytes).await
}

#[get("/files")]
async fn list(data: web::Data<AppState>, session: Session) -> impl Responder {
    crate::handlers::file_handler::list(data, session).await
}

#[delete("/files/{name}")]
async fn delete_file(
    data: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> impl Responder {
    crate::handlers::file_handler::delete(data, session, path).await
}
