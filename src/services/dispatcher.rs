use crate::config::Settings;
use crate::core::{Command, ReplyFormatter};
use crate::models::{MessageBlock, MessageContent, Prediction, WebhookEvent};
use crate::services::classifier::ClassifierClient;
use crate::services::error::UpstreamError;
use crate::services::line::LineClient;

/// What happened to a single webhook event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Replied,
    /// A reply was built but the reply call failed
    ReplyFailed,
    Ignored,
}

/// Routes webhook events to the classifier and replies through LINE
pub struct EventDispatcher {
    line: LineClient,
    classifier: ClassifierClient,
    formatter: ReplyFormatter,
    history_limit: u32,
}

impl EventDispatcher {
    pub fn new(
        line: LineClient,
        classifier: ClassifierClient,
        formatter: ReplyFormatter,
        history_limit: u32,
    ) -> Self {
        Self {
            line,
            classifier,
            formatter,
            history_limit,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, UpstreamError> {
        Ok(Self::new(
            LineClient::new(&settings.line)?,
            ClassifierClient::new(&settings.classifier)?,
            ReplyFormatter::from_settings(settings),
            settings.classifier.history_limit,
        ))
    }

    /// Process a batch in order. Each event runs to completion on its own;
    /// a failure in one never stops the rest.
    pub async fn dispatch(&self, events: Vec<WebhookEvent>) -> Vec<EventOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for event in &events {
            outcomes.push(self.handle_event(event).await);
        }

        let replied = outcomes.iter().filter(|o| **o == EventOutcome::Replied).count();
        tracing::info!("Processed {} events ({} replied)", outcomes.len(), replied);

        outcomes
    }

    pub async fn handle_event(&self, event: &WebhookEvent) -> EventOutcome {
        let Some(reply_token) = event.reply_token() else {
            tracing::debug!("Ignoring event without a usable reply token");
            return EventOutcome::Ignored;
        };

        let WebhookEvent::Message { message, .. } = event else {
            return EventOutcome::Ignored;
        };

        let blocks = match message {
            MessageContent::Image { id } => {
                let outcome = self.analyze_image(id).await;
                if let Err(e) = &outcome {
                    tracing::error!("Image analysis failed for message {}: {}", id, e);
                }
                self.formatter.prediction_reply(&outcome)
            }
            MessageContent::Text { text, .. } => self.reply_for_text(text).await,
            MessageContent::Unsupported => {
                tracing::debug!("Ignoring unsupported message type");
                return EventOutcome::Ignored;
            }
        };

        self.send_reply(reply_token, &blocks).await
    }

    async fn analyze_image(&self, message_id: &str) -> Result<Prediction, UpstreamError> {
        let image = self.line.fetch_content(message_id).await?;
        let prediction = self.classifier.predict(image).await?;

        tracing::info!(
            "Prediction for message {}: kind={:?}, confidence={:?}, faces={:?}",
            message_id,
            prediction.kind,
            prediction.confidence,
            prediction.face_count
        );

        Ok(prediction)
    }

    async fn reply_for_text(&self, text: &str) -> Vec<MessageBlock> {
        match Command::parse(text) {
            Command::History => {
                let outcome = self.classifier.history(self.history_limit).await;
                match &outcome {
                    Ok(entries) => tracing::debug!("Fetched {} history entries", entries.len()),
                    Err(e) => tracing::error!("History fetch failed: {}", e),
                }
                self.formatter.history_reply(&outcome)
            }
            Command::Help | Command::Unknown => self.formatter.usage_prompt(),
        }
    }

    async fn send_reply(&self, reply_token: &str, blocks: &[MessageBlock]) -> EventOutcome {
        match self.line.reply(reply_token, blocks).await {
            Ok(()) => EventOutcome::Replied,
            Err(e) => {
                // Webhook already acknowledged; nothing left to retry with.
                tracing::error!("Failed to send reply: {}", e);
                EventOutcome::ReplyFailed
            }
        }
    }
}
