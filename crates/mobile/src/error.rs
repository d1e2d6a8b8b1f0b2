use orecart_core::{ApiError, ConfigError, FeedError};

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum MobileError {
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Api(String),
    /// The session token is missing or was rejected
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Feed(String),
    #[error("{0}")]
    Runtime(String),
}

impl From<ConfigError> for MobileError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<serde_json::Error> for MobileError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(format!("invalid client config: {error}"))
    }
}

impl From<ApiError> for MobileError {
    fn from(error: ApiError) -> Self {
        if error.is_unauthorized() {
            Self::Unauthorized(error.to_string())
        } else {
            Self::Api(error.to_string())
        }
    }
}

impl From<FeedError> for MobileError {
    fn from(error: FeedError) -> Self {
        Self::Feed(error.to_string())
    }
}

impl From<std::io::Error> for MobileError {
    fn from(error: std::io::Error) -> Self {
        Self::Runtime(error.to_string())
    }
}

impl From<tokio::task::JoinError> for MobileError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Runtime(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_is_split_out() {
        let error = ApiError::Status {
            status: 401u16.try_into().unwrap(),
            body: String::new(),
        };

        assert!(matches!(MobileError::from(error), MobileError::Unauthorized(_)));
        assert!(matches!(
            MobileError::from(ApiError::InvalidData("x".into())),
            MobileError::Api(_)
        ));
    }
}
