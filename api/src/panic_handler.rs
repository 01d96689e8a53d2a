use std::any::Any;

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
};

use project_tracker_http_errors::ErrorResponseData;

/// Turns a caught handler panic into the same error body shape every other
/// failure uses. Panic details only leave the process outside production.
pub fn handle_panic(production: bool, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let data = if production {
        ErrorResponseData::new("internal_server_error", "Server error")
    } else {
        let details = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            (*s).to_string()
        } else {
            "Unknown panic message".to_string()
        };

        ErrorResponseData::new("panic", details)
    };

    let body = serde_json::to_string(&data).unwrap();

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}
