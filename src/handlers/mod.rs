pub mod capture;
pub mod chat;
pub mod health;

use crate::config::Config;
use crate::error::RelayResult;
use crate::services::{CaptureStore, ChatGptClient, ConversationManager};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ConversationManager>,
    pub capture: Arc<CaptureStore>,
    pub config: Config,
}

pub async fn create_router(config: Config) -> RelayResult<Router> {
    let capture = Arc::new(CaptureStore::new());
    let client = ChatGptClient::new(&config, capture.clone())?;
    let manager = Arc::new(ConversationManager::new(client));

    let state = AppState {
        manager,
        capture,
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let app = Router::new()
        // Health check
        .route("/", get(health::root))
        .route("/ping", get(health::ping))
        // Typed envelopes from UI surfaces
        .route("/message", post(chat::message))
        // Notification feed for the currently attached surface
        .route("/events", get(chat::events))
        // Current transcript snapshot
        .route("/conversation", get(chat::conversation))
        // Observed arkose challenge requests
        .route("/capture", post(capture::record))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state);

    Ok(app)
}
