use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id of one request, stored in the request extensions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Takes the caller's id when it is printable and reasonably short
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
        if value.is_empty() || value.len() > MAX_REQUEST_ID_LEN {
            return None;
        }
        Some(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Honors an incoming `x-request-id` or generates one, and echoes it on the response
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id =
        RequestId::from_headers(request.headers()).unwrap_or_else(RequestId::generate);

    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(request_id.as_str()) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// Span for `TraceLayer` carrying the request id
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(RequestId::as_str)
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(" trace-42 "));
        assert_eq!(
            RequestId::from_headers(&headers).unwrap().as_str(),
            "trace-42"
        );
    }

    #[test]
    fn test_request_id_rejects_blank_or_oversized() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("  "));
        assert!(RequestId::from_headers(&headers).is_none());

        let long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&long).unwrap());
        assert!(RequestId::from_headers(&headers).is_none());

        assert!(RequestId::from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_generated_request_id_is_uuid() {
        let id = RequestId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }
}
