// Service exports
pub mod classifier;
pub mod dispatcher;
pub mod error;
pub mod line;

pub use classifier::ClassifierClient;
pub use dispatcher::{EventDispatcher, EventOutcome};
pub use error::UpstreamError;
pub use line::{ImageContent, LineClient};
