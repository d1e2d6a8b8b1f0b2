use reqwest::StatusCode;

use orecart_api_types::ErrorDetail;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{}", describe_status(.status, .body))]
    Status { status: StatusCode, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("token storage failed: {0}")]
    TokenStorage(#[from] std::io::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(error) => error.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Prefer the backend's `detail`/`message` text, then the raw body, then the status.
fn describe_status(status: &StatusCode, body: &str) -> String {
    if let Ok(detail) = serde_json::from_str::<ErrorDetail>(body) {
        return format!("{status}: {}", detail.detail);
    }

    match body.trim() {
        "" => format!("{status}"),
        body => format!("{status}: {body}"),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Failed to connect to {feed} feed: {source}")]
    Connect {
        feed: &'static str,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("{feed} socket failed: {source}")]
    Socket {
        feed: &'static str,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("feed task has shut down")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_prefers_detail() {
        let error = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: r#"{"message":"Van not found"}"#.into(),
        };

        assert_eq!(error.to_string(), "404 Not Found: Van not found");
        assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_status_message_falls_back_to_body() {
        let raw = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".into(),
        };
        let empty = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };

        assert_eq!(raw.to_string(), "502 Bad Gateway: upstream down");
        assert_eq!(empty.to_string(), "401 Unauthorized");
        assert!(empty.is_unauthorized());
    }
}
