//! Call header carried in front of every frame body.
//!
//! The header is a self-describing record with exactly three fields:
//! ```text
//! ┌───────────────────┬──────────┬───────────────┐
//! │ ServiceMethod     │ Seq      │ Error         │
//! │ "Service.Method"  │ u64      │ "" on success │
//! └───────────────────┴──────────┴───────────────┘
//! ```
//!
//! There is no length prefix; the codec relies on the peer decoding the same
//! sequence of values it encoded.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RpcwireError};

/// Per-frame metadata identifying one call/response pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Dot-separated service and method name, e.g. `"Arith.Multiply"`.
    #[serde(rename = "ServiceMethod")]
    pub service_method: String,
    /// Call sequence number chosen by the caller.
    #[serde(rename = "Seq")]
    pub seq: u64,
    /// Error message, empty on success.
    #[serde(rename = "Error")]
    pub error: String,
}

impl Header {
    /// Create a request header with an empty error.
    pub fn new(service_method: impl Into<String>, seq: u64) -> Self {
        Self {
            service_method: service_method.into(),
            seq,
            error: String::new(),
        }
    }

    /// Check if this header reports a failed call.
    #[inline]
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }

    /// Split `ServiceMethod` at the last dot into `(service, method)`.
    ///
    /// # Errors
    ///
    /// Returns a protocol error when there is no dot or either half is empty.
    pub fn split_service_method(&self) -> Result<(&str, &str)> {
        match self.service_method.rsplit_once('.') {
            Some((service, method)) if !service.is_empty() && !method.is_empty() => {
                Ok((service, method))
            }
            _ => Err(RpcwireError::Protocol(format!(
                "service/method request ill-formed: {:?}",
                self.service_method
            ))),
        }
    }
}
