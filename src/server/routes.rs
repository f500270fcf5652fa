//! HTTP routes
//!
//! Thin mapping from REST endpoints onto registry operations.
//!
//! | Method | Path                          | Operation              |
//! |--------|-------------------------------|------------------------|
//! | GET    | `/topic`                      | list active topics     |
//! | POST   | `/topic`                      | create topic           |
//! | GET    | `/topic/{id}`                 | get topic              |
//! | DELETE | `/topic/{id}`                 | soft-delete topic      |
//! | POST   | `/topic/{id}/vote/{index}`    | vote                   |
//! | GET    | `/ws/{id}`                    | observe live tallies   |

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::registry::{RegistryError, Topic, TopicForm, TopicId, TopicRegistry};
use crate::session::{ObserverConfig, ObserverSession};

use super::ws::WsSink;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<TopicRegistry>,
    pub observer: ObserverConfig,
    next_session_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(registry: Arc<TopicRegistry>, observer: ObserverConfig) -> Self {
        Self {
            registry,
            observer,
            next_session_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn next_session_id(&self) -> u64 {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Registry error rendered as an HTTP rejection
#[derive(Debug)]
pub struct ApiError(pub RegistryError);

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::InvalidIndex { .. } => StatusCode::BAD_REQUEST,
            RegistryError::TopicDeleted(_) => StatusCode::GONE,
            RegistryError::IdSpaceExhausted => StatusCode::INSUFFICIENT_STORAGE,
        };

        tracing::debug!(error = %self.0, status = status.as_u16(), "Request rejected");

        (status, self.0.to_string()).into_response()
    }
}

/// Build the application router
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/topic", get(list_topics).post(create_topic))
        .route("/topic/{id}", get(get_topic).delete(delete_topic))
        .route("/topic/{id}/vote/{index}", post(vote))
        .route("/ws/{id}", get(observe))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::OPTIONS,
            Method::DELETE,
            Method::HEAD,
            Method::POST,
            Method::GET,
        ])
        .allow_headers([
            header::ORIGIN,
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
        ])
}

pub async fn list_topics(State(state): State<AppState>) -> Json<Vec<Topic>> {
    Json(state.registry.list_active().await)
}

pub async fn create_topic(
    State(state): State<AppState>,
    Json(form): Json<TopicForm>,
) -> Result<Json<Topic>, ApiError> {
    Ok(Json(state.registry.create(form).await?))
}

pub async fn get_topic(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
) -> Result<Json<Topic>, ApiError> {
    Ok(Json(state.registry.get(id).await?))
}

/// Unknown topics are 404, already deleted ones 410
pub async fn delete_topic(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
) -> Result<StatusCode, ApiError> {
    if state.registry.delete(id).await {
        return Ok(StatusCode::OK);
    }

    let topic = state.registry.get(id).await?;
    Err(RegistryError::TopicDeleted(topic.id).into())
}

pub async fn vote(
    State(state): State<AppState>,
    Path((id, index)): Path<(TopicId, usize)>,
) -> Result<Json<Vec<u64>>, ApiError> {
    Ok(Json(state.registry.vote(id, index).await?))
}

/// Upgrade to a WebSocket streaming the topic's tally
///
/// Unknown topics are rejected before the upgrade.
pub async fn observe(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let session = ObserverSession::open(
        state.next_session_id(),
        id,
        Arc::clone(&state.registry),
        state.observer.clone(),
    )
    .await?;

    Ok(ws.on_upgrade(move |socket| async move {
        let (mut sink, left) = WsSink::split(socket);
        let summary = session.run_until(&mut sink, left).await;
        sink.close().await;

        tracing::info!(
            session_id = summary.session_id,
            topic_id = summary.topic_id,
            pushes = summary.pushes,
            reason = ?summary.reason,
            "Observer disconnected"
        );
    }))
}
