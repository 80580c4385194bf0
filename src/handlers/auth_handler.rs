use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse,
    TokenUrl,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use uuid::Uuid;

use crate::config;
use crate::handlers::{current_session, error_response};
use crate::models::auth_user::AuthSession;
use crate::routes::app_state::AppState;
use crate::services::GatewayError;
use crate::UserSession;

/// Issues the cookie and server-side state for a fresh login.
fn open_session(data: &web::Data<AppState>, session: &Session, auth: AuthSession) -> Value {
    let session_id = Uuid::new_v4().to_string();
    if let Err(e) = session.insert("session_id", session_id.clone()) {
        error!("Failed to insert session_id into cookie: {:?}", e);
    }
    let user = json!({
        "uid": auth.uid,
        "email": auth.email,
        "userName": auth.display_name,
        "emailVerified": auth.email_verified,
    });
    data.session_manager.insert(session_id, UserSession::new(auth));
    user
}

pub async fn login(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> HttpResponse {
    let email = req_body["email"].as_str().unwrap_or_default();
    let password = req_body["password"].as_str().unwrap_or_default();

    match data.auth.login(email, password).await {
        Ok(auth) if !auth.email_verified => {
            // Backend-level success, but the page may not proceed.
            info!("login rejected for {}: email not verified", auth.uid);
            HttpResponse::Unauthorized().json(json!({"error": "Email not verified."}))
        }
        Ok(auth) => {
            info!("login succeeded for {}", auth.uid);
            let user = open_session(&data, &session, auth);
            HttpResponse::Ok().json(json!({"user": user}))
        }
        Err(GatewayError::Validation(_)) => {
            warn!("login failed for {}: invalid credentials", email);
            HttpResponse::Unauthorized().json(json!({"error": "Invalid email or password"}))
        }
        Err(e) => {
            error!("login error for {}: {}", email, e);
            error_response(&e)
        }
    }
}

pub async fn signup(
    data: web::Data<AppState>,
    req_body: web::Json<Value>,
) -> HttpResponse {
    let user_name = req_body["userName"].as_str().unwrap_or_default();
    let email = req_body["email"].as_str().unwrap_or_default();
    let password = req_body["password"].as_str().unwrap_or_default();

    match data.auth.signup(user_name, email, password).await {
        Ok(auth) => {
            info!("signup succeeded for {}", auth.uid);
            // No session yet: the email must be verified before login.
            HttpResponse::Ok().json(json!({
                "uid": auth.uid,
                "verificationEmailSent": true,
            }))
        }
        Err(e) => {
            warn!("signup failed for {}: {}", email, e);
            error_response(&e)
        }
    }
}

pub async fn logout(data: web::Data<AppState>, session: Session) -> HttpResponse {
    if let Some((session_id, state)) = current_session(&data.session_manager, &session) {
        data.auth.logout(&state.auth);
        data.session_manager.remove(&session_id);
    }
    session.purge();
    HttpResponse::Ok().json(json!({"loggedOut": true}))
}

pub async fn change_password(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> HttpResponse {
    let email = req_body["email"].as_str().unwrap_or_default();
    let old_password = req_body["oldPassword"].as_str().unwrap_or_default();
    let new_password = req_body["newPassword"].as_str().unwrap_or_default();

    let current = current_session(&data.session_manager, &session);
    let auth = current.as_ref().map(|(_, state)| &state.auth);

    match data
        .auth
        .change_password(auth, email, old_password, new_password)
        .await
    {
        Ok(refreshed) => {
            // The id token changed; later backend calls must use it.
            if let Some((session_id, mut state)) = current {
                state.auth = refreshed;
                data.session_manager.insert(session_id, state);
            }
            HttpResponse::Ok().json(json!({"passwordChanged": true}))
        }
        Err(e) => error_response(&e),
    }
}

pub async fn update_name(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> HttpResponse {
    let user_name = req_body["userName"].as_str().unwrap_or_default().to_string();
    let Some((session_id, mut state)) = current_session(&data.session_manager, &session) else {
        return error_response(&GatewayError::NotAuthenticated);
    };

    match data.auth.update_name(&state.auth, &user_name).await {
        Ok(()) => {
            state.auth.display_name = user_name;
            data.session_manager.insert(session_id, state);
            HttpResponse::Ok().json(json!({"updated": true}))
        }
        Err(e) => {
            error!("update_name failed: {}", e);
            error_response(&e)
        }
    }
}

pub async fn me(data: web::Data<AppState>, session: Session) -> HttpResponse {
    let Some((_, state)) = current_session(&data.session_manager, &session) else {
        return error_response(&GatewayError::NotAuthenticated);
    };
    match data.auth.get_user(&state.auth, &state.auth.uid).await {
        Ok(Some(user)) => HttpResponse::Ok().json(user),
        Ok(None) => HttpResponse::NotFound().json(json!({"error": "Profile not found"})),
        Err(e) => error_response(&e),
    }
}

/// Constructs the OAuth2 client for the federated login flow from the
/// client secret file.
fn build_oauth_client() -> BasicClient {
    let secret_str = fs::read_to_string(config::client_secret_path())
        .expect("Unable to read client secret file");
    let json_secret: Value =
        serde_json::from_str(&secret_str).expect("Invalid JSON in client secret file");
    let web = if json_secret["web"].is_object() {
        &json_secret["web"]
    } else {
        &json_secret["installed"]
    };
    let client_id = ClientId::new(web["client_id"].as_str().unwrap().to_string());
    let client_secret = ClientSecret::new(web["client_secret"].as_str().unwrap().to_string());
    let auth_url = AuthUrl::new(web["auth_uri"].as_str().unwrap().to_string())
        .expect("Invalid authorization endpoint URL");
    let token_url = TokenUrl::new(web["token_uri"].as_str().unwrap().to_string())
        .expect("Invalid token endpoint URL");

    BasicClient::new(client_id, Some(client_secret), auth_url, Some(token_url)).set_redirect_uri(
        RedirectUrl::new(config::oauth_redirect_url()).expect("Invalid redirect URL"),
    )
}

/// Starts the federated login by redirecting to the consent screen.
pub async fn google_login() -> HttpResponse {
    let oauth_client = build_oauth_client();
    let (auth_url, _csrf_token) = oauth_client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new("openid".to_string()))
        .add_scope(Scope::new("email".to_string()))
        .add_scope(Scope::new("profile".to_string()))
        .url();

    HttpResponse::Found()
        .append_header(("Location", auth_url.to_string()))
        .finish()
}

/// Finishes the federated login: exchanges the authorization code for a
/// Google credential, signs in at the identity backend, and opens the
/// session.
pub async fn google_callback(
    data: web::Data<AppState>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let Some(code) = query.get("code") else {
        return HttpResponse::BadRequest().body("Missing code");
    };

    let oauth_client = build_oauth_client();
    let token_result = oauth_client
        .exchange_code(AuthorizationCode::new(code.clone()))
        .request_async(async_http_client)
        .await;

    let token = match token_result {
        Ok(token) => token,
        Err(e) => {
            error!("Token exchange error: {:?}", e);
            return HttpResponse::BadGateway().json(json!({"error": "Token exchange failed"}));
        }
    };

    match data
        .auth
        .google_login(token.access_token().secret())
        .await
    {
        Ok(auth) => {
            info!("federated login succeeded for {}", auth.uid);
            open_session(&data, &session, auth);
            HttpResponse::Found().append_header(("Location", "/")).finish()
        }
        Err(e) => {
            error!("federated login failed: {}", e);
            error_response(&e)
        }
    }
}
