// Model exports
pub mod events;
pub mod messages;
pub mod prediction;
pub mod responses;

pub use events::{MessageContent, WebhookBody, WebhookEvent, VERIFY_REPLY_TOKEN};
pub use messages::{MessageBlock, ReplyRequest};
pub use prediction::{decode_history, ClassRef, HistoryEntry, Prediction, PredictionKind};
pub use responses::{ErrorResponse, HealthResponse};
