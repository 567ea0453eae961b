use actix_web::{middleware, web, App, HttpServer};
use bmi_line_bot::routes::{self, AppState};
use bmi_line_bot::Settings;
use std::io::{Error, ErrorKind};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting BMI LINE bot...");

    // Load configuration; missing credentials stop the process here
    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        Error::new(ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");
    info!("Classifier endpoint: {}", settings.classifier.predict_url());

    if settings.line.signing_secret().is_none() {
        warn!("LINE channel secret is not set, webhook signatures will not be verified");
    }

    let state = AppState::from_settings(&settings).map_err(|e| {
        error!("Failed to initialize HTTP clients: {}", e);
        Error::new(ErrorKind::Other, e.to_string())
    })?;

    info!(
        "Reply formatter ready (min confidence: {})",
        settings.classifier.min_confidence
    );

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let max_body_bytes = settings.server.max_body_bytes;

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::new(max_body_bytes))
            .wrap(middleware::Logger::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

/// Initialize logging from LOG_LEVEL (an EnvFilter directive) and
/// LOG_FORMAT (json, pretty or compact)
fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match log_format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}
