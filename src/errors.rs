use thiserror::Error;

/// Error type for framegraph operations.
///
/// `NoSuchElement`, `TypeMismatch` and `StaleFrame` come from the framing
/// layer. The remaining variants are raised by a graph adapter and are
/// propagated unchanged by traversals and link operators.
#[derive(Debug, Error)]
pub enum FrameGraphError {
    #[error("no such element: {0}")]
    NoSuchElement(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("stale frame: {0}")]
    StaleFrame(String),
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("schema error: {0}")]
    SchemaError(String),
    #[error("query error: {0}")]
    QueryError(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("transaction error: {0}")]
    TransactionError(String),
}

impl FrameGraphError {
    pub fn no_such_element<T: Into<String>>(msg: T) -> Self {
        FrameGraphError::NoSuchElement(msg.into())
    }

    pub fn type_mismatch<E: Into<String>, F: Into<String>>(expected: E, found: F) -> Self {
        FrameGraphError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn stale<T: Into<String>>(msg: T) -> Self {
        FrameGraphError::StaleFrame(msg.into())
    }

    pub fn connection<T: Into<String>>(msg: T) -> Self {
        FrameGraphError::ConnectionError(msg.into())
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        FrameGraphError::SchemaError(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        FrameGraphError::QueryError(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        FrameGraphError::InvalidInput(msg.into())
    }

    pub fn transaction<T: Into<String>>(msg: T) -> Self {
        FrameGraphError::TransactionError(msg.into())
    }

    /// True for failures surfaced by the storage layer rather than the framing layer.
    pub fn is_adapter_error(&self) -> bool {
        matches!(
            self,
            FrameGraphError::ConnectionError(_)
                | FrameGraphError::SchemaError(_)
                | FrameGraphError::QueryError(_)
                | FrameGraphError::TransactionError(_)
        )
    }
}
