use thiserror::Error;

/// Error taxonomy for all suretrack operations.
///
/// Three categories matter to callers: `Validation` is raised before any
/// network call, `Conflict` means another client already handled the row
/// (zero rows affected by a compare-and-swap), and everything else is a
/// backend/transport failure. Failures are terminal for the current action;
/// there is no retry layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any network call was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The row was already handled by another client (lost compare-and-swap).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected request ({status}): {body}")]
    Backend { status: u16, body: String },

    /// No row matched a lookup that expected exactly one.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not decode backend payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the failure is the benign "someone else got there first"
    /// outcome rather than a real fault.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_detection() {
        let err = Error::Conflict("already reconciled".to_string());
        assert!(err.is_conflict());

        let err = Error::Validation("bad odd".to_string());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_backend_error_display() {
        let err = Error::Backend {
            status: 409,
            body: "duplicate key".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("409"));
        assert!(msg.contains("duplicate key"));
    }
}
