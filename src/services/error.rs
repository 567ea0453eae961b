use reqwest::Response;
use thiserror::Error;

/// Failure of an outbound call to LINE or the classifier
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    #[error("{operation} returned HTTP {status}: {body}")]
    HttpStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation} failed: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} returned a malformed body: {reason}")]
    MalformedBody {
        operation: &'static str,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl UpstreamError {
    pub(crate) fn from_reqwest(operation: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { operation }
        } else if err.is_decode() {
            UpstreamError::MalformedBody {
                operation,
                reason: err.to_string(),
            }
        } else {
            UpstreamError::Network {
                operation,
                source: err,
            }
        }
    }

    pub(crate) fn malformed(operation: &'static str, reason: impl Into<String>) -> Self {
        UpstreamError::MalformedBody {
            operation,
            reason: reason.into(),
        }
    }

    /// Pass 2xx responses through, turn anything else into `HttpStatus`
    pub(crate) async fn check_status(
        operation: &'static str,
        response: Response,
    ) -> Result<Response, Self> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());

        Err(UpstreamError::HttpStatus {
            operation,
            status: status.as_u16(),
            body: truncate_chars(&body, 300),
        })
    }
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
