use actix_web::{error, HttpRequest};

use crate::core::AppError;

/// Turn JSON body extraction failures into the standard error envelope
pub fn json_error_handler(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    log_error(req, &err);
    AppError::validation(format!("Invalid request body: {}", err)).into()
}

/// Turn query string extraction failures into the standard error envelope
pub fn query_error_handler(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log_error(req, &err);
    AppError::validation(format!("Invalid query string: {}", err)).into()
}

/// Turn path extraction failures into the standard error envelope
pub fn path_error_handler(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    log_error(req, &err);
    AppError::validation(format!("Invalid path: {}", err)).into()
}

pub fn log_error(req: &HttpRequest, err: &dyn std::fmt::Display) {
    tracing::warn!(
        method = %req.method(),
        path = %req.path(),
        error = %err,
        "Rejected malformed request"
    );
}
