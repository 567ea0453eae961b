use crate::config::LineSettings;
use crate::models::{MessageBlock, ReplyRequest};
use crate::services::error::UpstreamError;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;

/// LINE accepts at most this many messages per reply call
pub const MAX_REPLY_BLOCKS: usize = 5;
/// LINE text message length limit, in UTF-16 code units
pub const MAX_TEXT_UNITS: usize = 5000;

const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

/// Binary content of a user's image message
#[derive(Debug, Clone)]
pub struct ImageContent {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageContent {
    /// File name to present to the classifier's upload field
    pub fn file_name(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "image.png",
            "image/webp" => "image.webp",
            "image/gif" => "image.gif",
            _ => "image.jpg",
        }
    }
}

/// LINE Messaging API client
///
/// Handles the two calls the bot makes to LINE:
/// - Downloading the content of an image message
/// - Sending the reply for an event
pub struct LineClient {
    access_token: String,
    content_api_base: String,
    reply_url: String,
    client: Client,
}

impl LineClient {
    pub fn new(settings: &LineSettings) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(UpstreamError::ClientBuild)?;

        Ok(Self {
            access_token: settings.channel_access_token.clone(),
            content_api_base: settings.content_api_base.trim_end_matches('/').to_string(),
            reply_url: settings.reply_url.clone(),
            client,
        })
    }

    /// Download the binary content of a message
    pub async fn fetch_content(&self, message_id: &str) -> Result<ImageContent, UpstreamError> {
        const OP: &str = "line content fetch";

        let url = format!("{}/{}/content", self.content_api_base, message_id);
        tracing::debug!("Fetching message content from: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(OP, e))?;
        let response = UpstreamError::check_status(OP, response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::trim)
            .filter(|v| v.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_TYPE)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(OP, e))?;

        if bytes.is_empty() {
            return Err(UpstreamError::malformed(OP, "empty content"));
        }

        tracing::debug!("Fetched {} bytes ({}) for message {}", bytes.len(), content_type, message_id);

        Ok(ImageContent {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    /// Send one reply call for `reply_token`
    pub async fn reply(&self, reply_token: &str, blocks: &[MessageBlock]) -> Result<(), UpstreamError> {
        const OP: &str = "line reply";

        let messages = bounded_blocks(blocks);
        if messages.len() < blocks.len() {
            tracing::warn!(
                "Dropping {} reply blocks over the LINE limit of {}",
                blocks.len() - messages.len(),
                MAX_REPLY_BLOCKS
            );
        }

        let request = ReplyRequest {
            reply_token,
            messages: &messages,
        };

        let response = self
            .client
            .post(&self.reply_url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(OP, e))?;
        UpstreamError::check_status(OP, response).await?;

        tracing::debug!("Sent {} reply blocks", messages.len());

        Ok(())
    }
}

/// Apply LINE's message count and text length limits
pub fn bounded_blocks(blocks: &[MessageBlock]) -> Vec<MessageBlock> {
    blocks
        .iter()
        .take(MAX_REPLY_BLOCKS)
        .map(|block| match block {
            MessageBlock::Text { text } => MessageBlock::Text {
                text: truncate_utf16(text, MAX_TEXT_UNITS),
            },
            other => other.clone(),
        })
        .collect()
}

/// Cut `text` to at most `max_units` UTF-16 code units without splitting
/// a character
fn truncate_utf16(text: &str, max_units: usize) -> String {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return text[..index].to_string();
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_blocks() {
        let blocks: Vec<MessageBlock> = (0..7).map(|i| MessageBlock::text(i.to_string())).collect();
        assert_eq!(bounded_blocks(&blocks).len(), MAX_REPLY_BLOCKS);

        let long = MessageBlock::text("ก".repeat(MAX_TEXT_UNITS + 10));
        let bounded = bounded_blocks(&[long]);
        assert_eq!(bounded[0].as_text().unwrap().chars().count(), MAX_TEXT_UNITS);
    }

    #[test]
    fn test_text_limit_counts_utf16_units() {
        // each emoji is a surrogate pair
        let emoji = MessageBlock::text("😀".repeat(MAX_TEXT_UNITS));
        let bounded = bounded_blocks(&[emoji]);
        let text = bounded[0].as_text().unwrap();
        assert_eq!(text.encode_utf16().count(), MAX_TEXT_UNITS);
        assert_eq!(text.chars().count(), MAX_TEXT_UNITS / 2);

        let mixed = format!("{}😀", "a".repeat(MAX_TEXT_UNITS - 1));
        let bounded = bounded_blocks(&[MessageBlock::text(mixed)]);
        assert_eq!(bounded[0].as_text().unwrap(), "a".repeat(MAX_TEXT_UNITS - 1));

        assert_eq!(truncate_utf16("สวัสดี", 100), "สวัสดี");
    }

    #[test]
    fn test_file_name_from_content_type() {
        let image = ImageContent { bytes: vec![1], content_type: "image/png".into() };
        assert_eq!(image.file_name(), "image.png");
        let image = ImageContent { bytes: vec![1], content_type: "image/heic".into() };
        assert_eq!(image.file_name(), "image.jpg");
    }
}
