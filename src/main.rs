use std::sync::Arc;

use actix_files::Files;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::{middleware::Logger, web, App, HttpServer};

use StudyChatAgent::config;
use StudyChatAgent::memory_session_store::MemorySessionStore;
use StudyChatAgent::models::global_session_manager::GlobalSessionManager;
use StudyChatAgent::routes;
use StudyChatAgent::routes::app_state::AppState;
use StudyChatAgent::services::auth_service::AuthGateway;
use StudyChatAgent::services::chat_service::ChatGateway;
use StudyChatAgent::services::completion_service::CompletionClient;
use StudyChatAgent::services::docstore_service::DocStoreClient;
use StudyChatAgent::services::identity_service::IdentityClient;
use StudyChatAgent::services::storage_service::StorageClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    config::init_logging();

    let identity = Arc::new(IdentityClient::from_config());
    let docstore = Arc::new(DocStoreClient::from_config());
    let objects = Arc::new(StorageClient::from_config());
    let completion = Arc::new(CompletionClient::from_config());

    let state = AppState {
        auth: Arc::new(AuthGateway::new(identity, docstore.clone())),
        chat: Arc::new(ChatGateway::new(objects, docstore, completion)),
        session_manager: GlobalSessionManager::new(),
    };

    // One store and one signing key shared by every worker.
    let session_store = MemorySessionStore::new();
    let secret_key = Key::generate();

    let address = config::bind_address();
    log::info!("Starting server on http://{}:{}", address.0, address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(SessionMiddleware::new(
                session_store.clone(),
                secret_key.clone(),
            ))
            .app_data(web::Data::new(state.clone()))
            .configure(routes::auth_routes::init_routes)
            .configure(routes::chat_routes::init_routes)
            .configure(routes::file_routes::init_routes)
            .service(Files::new("/", "./static").index_file("index.html"))
    })
    .bind(address)?
    .run()
    .await
}
