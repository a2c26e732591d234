//! Gateway Traits - Outbound ports to git and the local filesystem
//!
//! These are synchronous on purpose: running `git` blocks for as long as the
//! network needs. Callers that care about latency move the call onto a
//! blocking worker.

pub mod git;
pub mod storage;

/// A failed outbound call, reduced to a human readable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl core::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GatewayError {}
