use serde::{Deserialize, Serialize};

/// One outbound reply block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBlock {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        #[serde(rename = "previewImageUrl")]
        preview_image_url: String,
    },
}

impl MessageBlock {
    pub fn text(text: impl Into<String>) -> Self {
        MessageBlock::Text { text: text.into() }
    }

    /// Image block using the same URL for the preview
    pub fn image(url: impl Into<String>) -> Self {
        let url = url.into();
        MessageBlock::Image {
            original_content_url: url.clone(),
            preview_image_url: url,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageBlock::Text { text } => Some(text),
            MessageBlock::Image { .. } => None,
        }
    }
}

/// Body of the reply API call
#[derive(Debug, Serialize)]
pub struct ReplyRequest<'a> {
    #[serde(rename = "replyToken")]
    pub reply_token: &'a str,
    pub messages: &'a [MessageBlock],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_wire_format() {
        let blocks = vec![
            MessageBlock::text("hello"),
            MessageBlock::image("https://img.test/a.png"),
        ];
        let request = ReplyRequest { reply_token: "tok", messages: &blocks };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "replyToken": "tok",
                "messages": [
                    {"type": "text", "text": "hello"},
                    {
                        "type": "image",
                        "originalContentUrl": "https://img.test/a.png",
                        "previewImageUrl": "https://img.test/a.png"
                    }
                ]
            })
        );
    }
}
