//! HTTP surface for the web app.
//!
//! Write requests flow rate limiter -> signature verification -> date
//! normalization -> store, rejecting as early and as cheaply as possible.
//! Reads carry no signature; they are keyed by the public user id the bot
//! hands out and leak nothing that was not already shown in the chat.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::database::connection::DatabaseManager;
use crate::database::models::EventId;
use crate::database::store::EventStore;
use crate::security::auth::RequestAuthenticator;
use crate::security::rate_limit::RateLimiter;
use crate::utils::dates::{normalize, CanonicalDate};
use crate::utils::validation::{validate_event_key, validate_event_title};

/// Raw date strings longer than this are rejected before normalization.
const MAX_RAW_DATE_FIELD_LEN: usize = 15;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub store: EventStore,
    pub limiter: Arc<dyn RateLimiter>,
    pub authenticator: Arc<dyn RequestAuthenticator>,
}

#[derive(Debug, Deserialize)]
pub struct AddEventRequest {
    #[serde(rename = "initData")]
    pub init_data: String,
    pub title: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteEventRequest {
    #[serde(rename = "initData")]
    pub init_data: String,
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    fn ok() -> Json<Self> {
        Json(Self {
            success: true,
            error: None,
        })
    }

    fn error(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            error: Some(message.to_string()),
        })
    }
}

/// One event as rendered on listings: the canonical Gregorian date plus its
/// Jalali re-expression for Persian-calendar users.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventView {
    pub title: String,
    pub date: String,
    pub shamsi_date: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: String,
}

pub struct ApiService {
    pub router: Router,
}

impl ApiService {
    pub fn new(state: AppState) -> Self {
        let router = Router::new()
            .route("/api/add", post(add_event))
            .route("/api/delete", post(delete_event))
            .route("/api/events/:user_id", get(list_events))
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

/// The limiter keys on network origin because identity is not known until
/// the signature has been verified, which happens after admission.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn add_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddEventRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    if !state.limiter.allow(&client_key(&headers)) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            ApiResponse::error("Too many requests"),
        );
    }

    let identity = match state.authenticator.authenticate(&request.init_data) {
        Ok(identity) => identity,
        Err(reason) => {
            // Hostile until proven otherwise: log the reason, never return it.
            warn!(%reason, "rejected unauthenticated add request");
            return (
                StatusCode::FORBIDDEN,
                ApiResponse::error("Invalid Security Data"),
            );
        }
    };

    let title = match validate_event_title(&request.title) {
        Ok(title) => title,
        Err(reason) => {
            debug!(user_id = identity.id, %reason, "rejected event title");
            return (StatusCode::BAD_REQUEST, ApiResponse::error("Invalid Title"));
        }
    };

    if request.date.chars().count() > MAX_RAW_DATE_FIELD_LEN {
        return (StatusCode::BAD_REQUEST, ApiResponse::error("Invalid Date"));
    }
    let date = match normalize(&request.date) {
        Ok(date) => date,
        Err(reason) => {
            debug!(user_id = identity.id, %reason, "rejected date input");
            return (StatusCode::BAD_REQUEST, ApiResponse::error("Invalid Date"));
        }
    };

    match state
        .store
        .create_event(&identity.id.to_string(), &title, &date)
        .await
    {
        Ok(event_id) => {
            info!(user_id = identity.id, %event_id, "event added");
            (StatusCode::OK, ApiResponse::ok())
        }
        Err(reason) => {
            error!(user_id = identity.id, %reason, "event create failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error("Internal Server Error"),
            )
        }
    }
}

async fn delete_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<DeleteEventRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    if !state.limiter.allow(&client_key(&headers)) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            ApiResponse::error("Too many requests"),
        );
    }

    let identity = match state.authenticator.authenticate(&request.init_data) {
        Ok(identity) => identity,
        Err(reason) => {
            warn!(%reason, "rejected unauthenticated delete request");
            return (
                StatusCode::FORBIDDEN,
                ApiResponse::error("Invalid Security Data"),
            );
        }
    };

    if let Err(reason) = validate_event_key(&request.key) {
        debug!(user_id = identity.id, %reason, "rejected event key");
        return (StatusCode::BAD_REQUEST, ApiResponse::error("Invalid Key"));
    }

    let event_id = EventId::new(request.key.trim());
    match state
        .store
        .delete_event(&identity.id.to_string(), &event_id)
        .await
    {
        // Deleting an absent key also lands here: the operation is idempotent.
        Ok(()) => {
            info!(user_id = identity.id, %event_id, "event deleted");
            (StatusCode::OK, ApiResponse::ok())
        }
        Err(reason) => {
            error!(user_id = identity.id, %reason, "event delete failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error("Internal Server Error"),
            )
        }
    }
}

async fn list_events(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<HashMap<String, EventView>>, StatusCode> {
    let events = state.store.list_events(&user_id).await.map_err(|reason| {
        error!(%user_id, %reason, "event list failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let views = events
        .into_iter()
        .map(|(id, event)| {
            let shamsi_date = CanonicalDate::from_stored(&event.date)
                .map(|date| date.to_shamsi_string())
                .unwrap_or_default();
            (
                id.as_str().to_string(),
                EventView {
                    title: event.title,
                    date: event.date,
                    shamsi_date,
                    created_at: event.created_at,
                },
            )
        })
        .collect();

    Ok(Json(views))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let database = match sqlx::query("SELECT 1").fetch_one(&state.db.pool).await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let response = HealthResponse {
        status: database.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    };

    if database == "healthy" {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
