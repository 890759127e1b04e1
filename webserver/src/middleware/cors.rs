use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str =
    "Content-Type,AccessToken,X-CSRF-Token, Authorization, Token";
pub const ALLOW_METHODS: &str = "POST, GET, OPTIONS, PUT, PATCH, DELETE";
pub const EXPOSE_HEADERS: &str = "Content-Length, \
                                  Access-Control-Allow-Origin, \
                                  Access-Control-Allow-Headers, Content-Type";
pub const ALLOW_CREDENTIALS: &str = "true";

/// Cross-origin middleware, used with `axum::middleware::from_fn`.
///
/// Every `OPTIONS` request is answered with `204 No Content` without reaching
/// the inner service. Any other request runs normally and gets the CORS
/// headers added to its response.
///
/// `tower_http::cors::CorsLayer` is not used here: it rejects a wildcard
/// origin together with credentials and only short-circuits real preflight
/// requests.
pub async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    set_cors_headers(response.headers_mut());

    response
}

pub fn set_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSE_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static(ALLOW_CREDENTIALS),
    );
}
