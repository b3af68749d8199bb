use axum::http::StatusCode;
use thiserror::Error;

/// Failures of the durable key-value provider.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the catalog, counter store and interaction handler.
#[derive(Error, Debug)]
pub enum WidgetError {
    /// The persisted snapshot is not a JSON object. Recovered to zero counts.
    #[error("corrupt persisted state: {0}")]
    CorruptPersistedState(String),

    #[error("unknown emotion label: {0}")]
    UnknownLabel(String),

    /// A control the handler needs is absent from the page.
    #[error("missing page control: {0}")]
    MissingControl(&'static str),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<WidgetError> for AppError {
    fn from(err: WidgetError) -> Self {
        let status = match &err {
            WidgetError::UnknownLabel(_) => StatusCode::NOT_FOUND,
            WidgetError::MissingControl(_) => StatusCode::CONFLICT,
            WidgetError::InvalidCatalog(_) => StatusCode::BAD_REQUEST,
            WidgetError::CorruptPersistedState(_) | WidgetError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
