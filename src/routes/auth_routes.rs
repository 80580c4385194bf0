use actix_session::Session;
use actix_web::{get, post, web, Responder};
use serde_json::Value;
use std::collections::HashMap;

use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(signup)
        .service(logout)
        .service(change_password)
        .service(update_name)
        .service(me)
        .service(google_login)
        .service(google_callback);
}

#[post("/auth/login")]
async fn login(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> impl Responder {
    crate::handlers::auth_handler::login(data, session, req_body).await
}

#[post("/auth/signup")]
async fn signup(data: web::Data<AppState>, req_body: web::Json<Value>) -> impl Responder {
    crate::handlers::auth_handler::signup(data, req_body).await
}

#[post("/auth/logout")]
async fn logout(data: web::Data<AppState>, session: Session) -> impl Responder {
    crate::handlers::auth_handler::logout(data, session).await
}

#[post("/auth/password")]
async fn change_password(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> impl Responder {
    crate::handlers::auth_handler::change_password(data, session, req_body).await
}

#[post("/auth/name")]
async fn update_name(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> impl Responder {
    crate::handlers::auth_handler::update_name(data, session, req_body).await
}

#[get("/auth/me")]
async fn me(data: web::Data<AppState>, session: Session) -> impl Responder {
    crate::handlers::auth_handler::me(data, session).await
}

#[get("/auth/google/login")]
async fn google_login() -> impl Responder {
    crate::handlers::auth_handler::google_login().await
}

#[get("/auth/google/callback")]
async fn google_callback(
    data: web::Data<AppState>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    crate::handlers::auth_handler::google_callback(data, session, query).await
}
