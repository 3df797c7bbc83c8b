use thiserror::Error;

/// Result alias for automation surface operations.
pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// Failure signalled by an automation surface.
///
/// Timeouts get their own variant because the engine treats an expired
/// bounded wait differently from a driver fault: a login marker or like
/// control that never appears is an expected outcome, not an error.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// A bounded wait expired before the condition was met.
    #[error("timed out after {ms}ms waiting for `{what}`")]
    Timeout { what: String, ms: u64 },

    /// Any other failure reported by the underlying driver.
    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

impl SurfaceError {
    /// Creates a timeout for the given wait target.
    pub fn timeout(what: impl Into<String>, ms: u64) -> Self {
        Self::Timeout { what: what.into(), ms }
    }

    /// Creates an opaque driver failure from a message.
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(anyhow::anyhow!(message.into()))
    }

    /// Whether this failure is an expired bounded wait.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
