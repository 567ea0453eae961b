use crate::config::ClassifierSettings;
use crate::models::{decode_history, HistoryEntry, Prediction};
use crate::services::error::UpstreamError;
use crate::services::line::ImageContent;
use reqwest::{multipart, Client};
use serde_json::Value;
use std::time::Duration;

/// Client for the external BMI face classifier
pub struct ClassifierClient {
    predict_url: String,
    history_url: String,
    client: Client,
}

impl ClassifierClient {
    pub fn new(settings: &ClassifierSettings) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(UpstreamError::ClientBuild)?;

        Ok(Self {
            predict_url: settings.predict_url(),
            history_url: settings.history_url(),
            client,
        })
    }

    /// Upload an image as the multipart `file` field and decode the result
    pub async fn predict(&self, image: ImageContent) -> Result<Prediction, UpstreamError> {
        const OP: &str = "classifier predict";

        let file_name = image.file_name();
        let part = multipart::Part::bytes(image.bytes)
            .file_name(file_name)
            .mime_str(&image.content_type)
            .map_err(|e| UpstreamError::malformed(OP, format!("invalid content type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(OP, e))?;
        let response = UpstreamError::check_status(OP, response).await?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(OP, e))?;

        tracing::debug!("Classifier response: {}", json);

        Ok(Prediction::from_value(&json))
    }

    /// Fetch the most recent predictions recorded by the classifier
    pub async fn history(&self, limit: u32) -> Result<Vec<HistoryEntry>, UpstreamError> {
        const OP: &str = "classifier history";

        let response = self
            .client
            .get(&self.history_url)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(OP, e))?;
        let response = UpstreamError::check_status(OP, response).await?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(OP, e))?;

        decode_history(&json)
            .ok_or_else(|| UpstreamError::malformed(OP, "missing history array"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_urls() {
        let settings = ClassifierSettings {
            base_url: "https://bmi-ai.test/predict".to_string(),
            min_confidence: 0.45,
            timeout_secs: 30,
            history_limit: 5,
        };

        let client = ClassifierClient::new(&settings).unwrap();

        assert_eq!(client.predict_url, "https://bmi-ai.test/predict");
        assert_eq!(client.history_url, "https://bmi-ai.test/history");
    }
}
