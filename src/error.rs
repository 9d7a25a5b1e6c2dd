//! Error types for rpcwire.

use thiserror::Error;

/// Error returned by an invoked method, passed through untouched.
///
/// Holds the method's own error value; downcast it to recover the original type.
pub type MethodError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for codec and registry operations.
#[derive(Debug, Error)]
pub enum RpcwireError {
    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error while flushing a frame to the stream.
    #[error("I/O error writing frame: {0}")]
    Write(#[source] std::io::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// JSON deserialization error.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON serialization error.
    #[error("JSON encode error: {0}")]
    JsonEncode(serde_json::Error),

    /// A frame body could not be decoded into the supplied value.
    #[error("body decode error: {0}")]
    Body(#[from] erased_serde::Error),

    /// Frame sequencing or shape error.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The codec (or its connection) is closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Service name is not an exported identifier.
    #[error("{0:?} is not a valid service name")]
    InvalidServiceName(String),

    /// The same method name was registered twice on one service.
    #[error("method {service}.{method} registered twice")]
    DuplicateMethod { service: String, method: String },

    /// No method with this name on the service.
    #[error("can't find method {service}.{method}")]
    MethodNotFound { service: String, method: String },

    /// A value handed to the dispatcher has the wrong concrete type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl RpcwireError {
    /// True for failures while reading a frame.
    pub fn is_decode(&self) -> bool {
        match self {
            Self::MsgPackDecode(_) | Self::Json(_) | Self::Body(_) | Self::Protocol(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }

    /// True for failures while serializing a frame.
    pub fn is_encode(&self) -> bool {
        matches!(
            self,
            Self::MsgPackEncode(_) | Self::JsonEncode(_) | Self::Write(_)
        )
    }
}

/// Result type alias using RpcwireError.
pub type Result<T> = std::result::Result<T, RpcwireError>;
