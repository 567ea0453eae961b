// Route exports
pub mod webhook;

use actix_web::web;

pub use webhook::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(webhook::configure);
}
