use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Inline fallback for hosts this server has no site root for.
/// Rendered directly, bypassing the template cache.
pub const DOMAIN_ERROR: &str = "Sorry, this server doesn't know how to serve {{host}}!";

/// Error types for the content server.
/// Content-resolution failures map to 404, template and domain-config
/// failures to 500.
#[derive(Debug)]
pub enum ServeError {
    /// Classification exhausted all resolution candidates
    NotFound(String),
    /// Path would escape the content root
    Containment,
    /// Filesystem read error, cause deliberately not distinguished
    Io(io::Error),
    TemplateParse(String),
    TemplateExec(String),
    /// Site root for the host is missing pub/ or templates/
    DomainConfig(String),
}

impl From<io::Error> for ServeError {
    fn from(err: io::Error) -> Self {
        ServeError::Io(err)
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        match self {
            ServeError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                format!("Could not load {path}: File not found"),
            )
                .into_response(),
            ServeError::Containment | ServeError::Io(_) => {
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            ServeError::TemplateParse(_) | ServeError::TemplateExec(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not load templates.",
            )
                .into_response(),
            ServeError::DomainConfig(host) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                DOMAIN_ERROR.replace("{{host}}", &host),
            )
                .into_response(),
        }
    }
}
