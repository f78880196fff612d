use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::AppState;

/// Parse the configured security header pairs once at startup. Invalid names
/// or values are skipped with a warning rather than failing the server.
pub fn header_map(pairs: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("Skipping invalid security header: {name}"),
        }
    }
    headers
}

/// Stamp every response with the profile's security headers
pub async fn apply_security_headers(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    for (name, value) in state.security_headers.iter() {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}
