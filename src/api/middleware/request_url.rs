//! Fills the `url` field of JSON envelopes with the request path and query.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::types::Envelope;

pub async fn stamp_request_url(request: Request, next: Next) -> Response {
    let uri = request.uri();
    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let response = next.run(request).await;

    match response.extensions().get::<Envelope>().cloned() {
        Some(envelope) => {
            let status = response.status();
            (status, Json(envelope.with_url(url))).into_response()
        }
        None => response,
    }
}
