use crate::config::Settings;
use crate::core::{verify_signature, SIGNATURE_HEADER};
use crate::models::{ErrorResponse, HealthResponse, WebhookBody};
use crate::services::{EventDispatcher, UpstreamError};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<EventDispatcher>,
    /// `None` disables signature verification
    pub channel_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Result<Self, UpstreamError> {
        Ok(Self {
            dispatcher: Arc::new(EventDispatcher::from_settings(settings)?),
            channel_secret: settings.line.signing_secret().map(Arc::from),
        })
    }
}

/// Configure webhook and health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/", web::get().to(health_check))
        .route("/health", web::get().to(health_check))
        .route("/webhook", web::post().to(receive_webhook));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// LINE webhook endpoint
///
/// POST /webhook
///
/// Acknowledges with 200 as soon as the body is verified and parsed. The
/// events are processed afterwards in a detached task, so nothing that
/// happens downstream can change the status LINE sees.
async fn receive_webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    if let Some(secret) = state.channel_secret.as_deref() {
        let signature = req
            .headers()
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());

        if let Err(e) = verify_signature(secret, &body, signature) {
            tracing::warn!("Rejected webhook from {:?}: {}", req.peer_addr(), e);
            return HttpResponse::Unauthorized().json(ErrorResponse::new(
                "invalid_signature",
                e.to_string(),
                401,
            ));
        }
    }

    let payload: WebhookBody = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::info!("Invalid webhook body: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "invalid_json",
                format!("Invalid JSON: {}", e),
                400,
            ));
        }
    };

    let destination = payload.destination.clone().unwrap_or_default();
    let events = payload.decode_events();
    if events.is_empty() {
        tracing::debug!("Webhook delivery with no events");
        return HttpResponse::Ok().finish();
    }

    let delivery_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "webhook_delivery",
        %delivery_id,
        %destination,
        events = events.len()
    );
    let dispatcher = Arc::clone(&state.dispatcher);

    actix_web::rt::spawn(
        async move {
            dispatcher.dispatch(events).await;
        }
        .instrument(span),
    );

    HttpResponse::Ok().finish()
}
