use axum::{
    body::Body,
    extract::Request,
    http::{header::InvalidHeaderValue, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// HTTP header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request-scoped correlation id, stored in request extensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuses a well-formed incoming id, otherwise mints a new one
    pub fn from_header(value: Option<&HeaderValue>) -> Self {
        value
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(RequestId)
            .unwrap_or_else(RequestId::new)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<RequestId> for HeaderValue {
    type Error = InvalidHeaderValue;

    fn try_from(id: RequestId) -> Result<Self, Self::Error> {
        HeaderValue::from_str(&id.to_string())
    }
}

/// Attaches a [`RequestId`] to the request and echoes it on the response
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_header(request.headers().get(REQUEST_ID_HEADER));
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    match HeaderValue::try_from(request_id) {
        Ok(value) => {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        Err(e) => tracing::warn!(error = %e, request_id = %request_id, "Request id not echoed"),
    }

    response
}

/// Span for `TraceLayer`; `request_id` stays empty when the middleware did not run
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let span = tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    );

    if let Some(id) = request.extensions().get::<RequestId>() {
        span.record("request_id", tracing::field::display(id));
    }

    span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header_reuses_valid_uuid() {
        let id = Uuid::new_v4();
        let header = HeaderValue::from_str(&id.to_string()).unwrap();
        assert_eq!(RequestId::from_header(Some(&header)), RequestId(id));
    }

    #[test]
    fn test_from_header_replaces_garbage() {
        let header = HeaderValue::from_static("not-a-uuid");
        let id = RequestId::from_header(Some(&header));
        assert_ne!(id.to_string(), "not-a-uuid");
        assert_ne!(RequestId::from_header(None), id);
    }

    #[test]
    fn test_header_value_is_hyphenated_uuid() {
        let id = RequestId::new();
        let value = HeaderValue::try_from(id).unwrap();
        assert_eq!(value.to_str().unwrap(), id.0.hyphenated().to_string());
        assert_eq!(RequestId::from_header(Some(&value)), id);
    }
}
