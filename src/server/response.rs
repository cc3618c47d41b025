//! HTTP response helpers.

use anyhow::Result;
use tiny_http::{Header, Request, Response, StatusCode};

/// MIME types the control server answers with.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
}

/// Body returned once a reload has been scheduled.
pub const RELOAD_TRIGGERED: &str = "OK: Reload triggered";

/// Respond with the trigger page.
pub fn respond_page(request: Request, html: &str) -> Result<()> {
    send_body(request, 200, types::HTML, html.as_bytes().to_vec())
}

/// Respond after scheduling a reload (does not wait for it).
pub fn respond_triggered(request: Request) -> Result<()> {
    send_body(request, 200, types::PLAIN, RELOAD_TRIGGERED.as_bytes().to_vec())
}

/// Respond with 400 for a body that is not a valid reload request.
pub fn respond_bad_request(request: Request, error: &serde_json::Error) -> Result<()> {
    let body = format!("Bad Request: Invalid JSON ({error})");
    send_body(request, 400, types::PLAIN, body.into_bytes())
}

/// Respond with 413 for a body over the size limit.
pub fn respond_too_large(request: Request) -> Result<()> {
    send_body(request, 413, types::PLAIN, b"Payload Too Large".to_vec())
}

/// Respond with 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, types::PLAIN, b"Not Found".to_vec())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let mut response = Response::from_data(body).with_status_code(StatusCode(status));
    if let Some(header) = make_header("Content-Type", content_type) {
        response = response.with_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Option<Header> {
    Header::from_bytes(key, value).ok()
}
