//! Proxy: forwards one request to its backend and buffers the answer.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, Response, Version};
use http_body_util::BodyExt;
use tracing::{debug, warn};

use crate::error::{HarbourError, HarbourResult};
use crate::state::AppState;

/// Forward `req` unchanged to `port` on the upstream host.
///
/// The whole upstream body is read before anything is returned, so the
/// response never carries `transfer-encoding`.
pub async fn forward(state: &AppState, port: u16, req: Request) -> HarbourResult<Response<Body>> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let uri = format!("http://{}:{}{}", state.upstream_host, port, path_and_query);

    let upstream_failed = |reason: String| HarbourError::Upstream { uri: uri.clone(), reason };

    let (mut parts, body) = req.into_parts();
    parts.uri = uri.parse().map_err(|e: axum::http::uri::InvalidUri| upstream_failed(e.to_string()))?;
    parts.headers.remove(header::HOST);
    parts.version = Version::HTTP_11;

    debug!(method = %parts.method, %uri, "Forwarding request");
    let upstream = state
        .client
        .request(Request::from_parts(parts, body))
        .await
        .map_err(|e| upstream_failed(e.to_string()))?;

    let (mut parts, body) = upstream.into_parts();
    let bytes = body
        .collect()
        .await
        .map_err(|e| upstream_failed(e.to_string()))?
        .to_bytes();
    parts.headers.remove(header::TRANSFER_ENCODING);

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

/// `forward`, with failures turned into a 502 for the client.
pub async fn forward_or_bad_gateway(state: &AppState, port: u16, req: Request) -> Response<Body> {
    match forward(state, port, req).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Upstream request failed");
            axum::response::IntoResponse::into_response(e)
        }
    }
}
