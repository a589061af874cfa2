use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::app_state;
use crate::errors::AppError;

/// Browser-origin CORS, scoped to the single dashboard origin named in
/// configuration (spec section 6, "permitted origin for browser clients").
/// Reads `CorsSettings` from the process-wide `app_state` singleton so it
/// can be layered with a plain `from_fn` onto loco's `AppContext`-typed
/// router.
pub async fn cors_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let settings = &app_state::app_settings().cors;
    let method = request.method().clone();
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let origin_allowed = origin == settings.allowed_origin;

    if method == Method::OPTIONS {
        let mut response = Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(axum::body::Body::empty())
            .map_err(|e| AppError::Internal(e.to_string()))?;
        if origin_allowed {
            add_cors_headers(&mut response, &origin);
        }
        return Ok(response);
    }

    let mut response = next.run(request).await;
    if origin_allowed {
        add_cors_headers(&mut response, &origin);
    }
    Ok(response)
}

fn add_cors_headers(response: &mut Response, origin: &str) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert("access-control-allow-origin", value);
    }
    headers.insert("access-control-allow-credentials", HeaderValue::from_static("true"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type, authorization"),
    );
    headers.insert("vary", HeaderValue::from_static("Origin"));
}
