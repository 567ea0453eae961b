// Core exports
pub mod bmi;
pub mod commands;
pub mod formatter;
pub mod signature;

pub use bmi::{BmiCategory, CATEGORIES, UNKNOWN_LABEL};
pub use commands::Command;
pub use formatter::{format_history, format_percent, Rejection, ReplyFormatter, Verdict};
pub use signature::{sign, verify_signature, SignatureError, SIGNATURE_HEADER};
