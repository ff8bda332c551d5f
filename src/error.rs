use actix_web::{error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use log::warn;
use mongodb::bson;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Error raised by a storage backend, kept opaque above the adapter.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Longest `detail` string sent back on a 500.
pub const MAX_DETAIL_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database not available: {0}")]
    Unavailable(String),

    #[error("Failed to read from collection '{collection}': {source}")]
    Read {
        collection: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to write to collection '{collection}': {source}")]
    Write {
        collection: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[from] bson::ser::Error),
}

/// One entry of a 422 body, shaped like `{"loc": [...], "msg": ..., "type": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn body(field: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: "value_error".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request validation failed")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::Unavailable(_))
            | ApiError::Store(StoreError::Read { .. })
            | ApiError::Store(StoreError::Write { .. })
            | ApiError::Store(StoreError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => {
                HttpResponse::build(self.status_code()).json(json!({ "detail": errors }))
            }
            ApiError::Store(e) => HttpResponse::build(self.status_code())
                .json(json!({ "detail": truncate(&e.to_string(), MAX_DETAIL_CHARS) })),
        }
    }
}

/// Error handler for `web::JsonConfig`. Malformed or mistyped bodies are 422,
/// oversized bodies 413 and non-JSON content types 415.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected body for {}: {}", req.path(), err);
    let (status, kind) = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")
        }
        JsonPayloadError::ContentType => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "content_type_error"),
        JsonPayloadError::Deserialize(_) => (StatusCode::UNPROCESSABLE_ENTITY, "value_error"),
        _ => (StatusCode::UNPROCESSABLE_ENTITY, "payload_error"),
    };
    let detail = FieldError {
        loc: vec!["body".to_string()],
        msg: err.to_string(),
        kind: kind.to_string(),
    };
    let response = HttpResponse::build(status).json(json!({ "detail": [detail] }));
    actix_web::error::InternalError::from_response(err, response).into()
}

/// Cuts `text` down to at most `max_chars` characters.
pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
