use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `error_code` of every success envelope
pub const SUCCESS_CODE: u32 = 0;

/// JSON envelope shared by success and error responses.
///
/// `url` is filled in by the request-url middleware; a copy of the envelope
/// travels in the response extensions so the middleware can re-render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope {
    /// 0 on success, a stable error code otherwise
    #[schema(example = 0)]
    pub error_code: u32,
    /// Human readable message
    #[schema(example = "Operation succeeded")]
    pub msg: String,
    /// Path and query of the request that produced this envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "/cms/admin/1")]
    pub url: Option<String>,
}

impl Envelope {
    pub fn new(error_code: u32, msg: impl Into<String>) -> Self {
        Self {
            error_code,
            msg: msg.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Render with the given status, keeping a copy in the response extensions.
    pub fn into_response_with(self, status: StatusCode) -> axum::response::Response {
        let mut response = (status, Json(self.clone())).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Success envelope (HTTP 201, `error_code` 0)
#[derive(Debug)]
pub struct Success(pub String);

impl Success {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl IntoResponse for Success {
    fn into_response(self) -> axum::response::Response {
        Envelope::new(SUCCESS_CODE, self.0).into_response_with(StatusCode::CREATED)
    }
}
