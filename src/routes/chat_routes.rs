use actix_session::Session;
use actix_web::{get, post, web, Responder};
use serde_json::Value;
use std::collections::HashMap;

use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(load_page)
        .service(messages_for_date)
        .service(history)
        .service(send_chat)
        .service(files_change);
}

#[get("/chat/page")]
async fn load_page(data: web::Data<AppState>, session: Session) -> impl Responder {
    crate::handlers::chat_handler::load_page(data, session).await
}

#[get("/chat/messages")]
async fn messages_for_date(
    data: web::Data<AppState>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    crate::handlers::chat_handler::messages_for_date(data, session, query).await
}

#[get("/chat/history")]
async fn history(data: web::Data<AppState>, session: Session) -> impl Responder {
    crate::handlers::chat_handler::history(data, session).await
}

#[post("/chat/send")]
async fn send_chat(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> impl Responder {
    crate::handlers::chat_handler::send_chat(data, session, req_body).await
}

#[post("/chat/files_change")]
async fn files_change(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> impl Responder {
    crate::handlers::chat_handler::files_change(data, session, req_body).await
}
