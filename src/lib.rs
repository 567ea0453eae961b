//! BMI LINE bot - relays face photos sent to a LINE official account to an
//! external BMI classifier and replies with the result.
//!
//! The service owns no state: every webhook event is answered from the
//! classifier's response and a fixed table of five BMI categories.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::config::Settings;
pub use crate::core::{BmiCategory, Command, ReplyFormatter};
pub use models::{MessageBlock, Prediction, PredictionKind, WebhookEvent};
pub use routes::AppState;
pub use services::{ClassifierClient, EventDispatcher, EventOutcome, LineClient, UpstreamError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let formatter = ReplyFormatter::new(0.45, "https://img.test");
        assert_eq!(formatter.image_url(BmiCategory::Normal), "https://img.test/bmi_1_normal.png");
    }
}
