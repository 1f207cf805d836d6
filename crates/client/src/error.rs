use std::collections::BTreeMap;

/// Error type for comment API calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// Field-level validation messages, when the server sent any.
        fields: BTreeMap<String, Vec<String>>,
    },

    /// The request never produced a response (connect, DNS, timeout).
    #[error("Request failed: {0}")]
    Network(String),

    /// A 2xx response whose body could not be decoded.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text to show inline next to the control that failed.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api {
                status,
                message,
                fields,
            } => match status {
                400 => fields
                    .values()
                    .find_map(|messages| messages.first().cloned())
                    .unwrap_or_else(|| message.clone()),
                401 => "Please sign in".to_string(),
                403 => "You do not have permission".to_string(),
                429 => "Too many requests".to_string(),
                500..=599 => "Server error".to_string(),
                _ => message.clone(),
            },
            ClientError::Network(_) => "Network error".to_string(),
            ClientError::Decode(_) => "Server error".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}
