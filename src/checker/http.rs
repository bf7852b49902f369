// src/checker/http.rs
// =============================================================================
// This module checks if remote URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when a server refuses HEAD (405/501)
// - Every request is bounded by the client timeout, so one dead host can't
//   stall the whole scan
// - Turns transport failures into a readable reason (timeout, DNS, TLS...)
// =============================================================================

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use super::classify::{BrokenReason, LinkVerdict};

// Builds the client shared by all checks in one run
//
// Client is cheap to clone (it's just a reference counter internally), so
// the checker clones it into each concurrent task.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(5)) // Follow up to 5 redirects
        .user_agent(concat!("mdsplice/", env!("CARGO_PKG_VERSION")))
        .build()
}

// Checks a single remote URL
//
// Returns the verdict plus a short human-readable message
pub async fn check_remote(client: &Client, url: &str) -> (LinkVerdict, String) {
    // First, try a HEAD request (faster, no body download)
    let result = match client.head(url).send().await {
        Ok(response) if refuses_head(response.status()) => {
            tracing::debug!("HEAD not allowed for {}, retrying with GET", url);
            client.get(url).send().await
        }
        other => other,
    };

    match result {
        Ok(response) => analyze_response(response),
        Err(e) => categorize_error(e),
    }
}

fn refuses_head(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
    )
}

// Redirects have already been followed by the client, so anything that is
// not 2xx here is a failure
fn analyze_response(response: Response) -> (LinkVerdict, String) {
    let status_code = response.status();
    let message = format!("HTTP {}", status_code.as_u16());

    if status_code.is_success() {
        (LinkVerdict::Ok, message)
    } else {
        (
            LinkVerdict::Broken(BrokenReason::StatusCode(status_code.as_u16())),
            message,
        )
    }
}

// Categorizes different error types from reqwest
//
// All of them mean the target could not be reached; the message says why.
fn categorize_error(error: reqwest::Error) -> (LinkVerdict, String) {
    // Convert error to string once to avoid lifetime issues
    let error_string = error.to_string();

    let message = if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") {
            "Could not resolve hostname".to_string()
        } else {
            "Connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    };

    (LinkVerdict::Broken(BrokenReason::Unreachable), message)
}
