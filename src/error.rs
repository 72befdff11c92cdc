use thiserror::Error;

#[derive(Debug, Error)]
pub enum KexError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("api error {code}: {name}")]
    Api { code: i64, name: String },
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("message decode error: {0}")]
    Decode(String),
    #[error("message MAC mismatch")]
    MacMismatch,
    #[error("unhandled message name: {0:?}")]
    UnknownMessageKind(String),
    #[error("receive deadline exceeded")]
    Timeout,
    #[error("handler error: {0}")]
    Handler(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl KexError {
    /// True for the one decode outcome a receiver tolerates.
    pub fn is_mac_mismatch(&self) -> bool {
        matches!(self, KexError::MacMismatch)
    }
}

pub type Result<T> = std::result::Result<T, KexError>;
