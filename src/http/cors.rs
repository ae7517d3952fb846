//! Permissive CORS on every response, plus the bespoke `OPTIONS` preflight
//! branching from spec.md §6.1. The preflight rules check for the presence of
//! three specific headers rather than implementing a generic origin policy, so
//! this is hand-written middleware instead of `tower_http::cors::CorsLayer`.

use axum::extract::Request;
use axum::http::{HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const ALLOW_METHODS: &str = "GET, HEAD, POST, OPTIONS";

pub async fn cors_layer(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return preflight_response(&request);
    }

    let mut response = next.run(request).await;
    apply_permissive_headers(response.headers_mut());
    response
}

fn preflight_response(request: &Request) -> Response {
    let headers = request.headers();
    let is_full_preflight = headers.contains_key("origin")
        && headers.contains_key("access-control-request-method")
        && headers.contains_key("access-control-request-headers");

    let mut response = axum::http::StatusCode::OK.into_response();
    if is_full_preflight {
        apply_permissive_headers(response.headers_mut());
        response.headers_mut().insert("access-control-max-age", HeaderValue::from_static("86400"));
    } else {
        response.headers_mut().insert("allow", HeaderValue::from_static(ALLOW_METHODS));
    }
    response
}

fn apply_permissive_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert("access-control-allow-methods", HeaderValue::from_static(ALLOW_METHODS));
}
