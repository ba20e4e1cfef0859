//! Stateless request builder and response parser for the post feed.
//!
//! # Design
//! `PostsClient` holds only the endpoint. `build_fetch_posts` produces the
//! `HttpRequest` a queue executes; `parse_posts` consumes the `HttpResponse`
//! it hands back. Parsing is all-or-nothing: one bad element rejects the
//! whole batch.

use serde_json::Value;

use crate::error::{FetchError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Post;

/// Public test API the feed points at unless configured otherwise.
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";

/// Synchronous, stateless client for the post feed.
#[derive(Debug, Clone)]
pub struct PostsClient {
    endpoint: String,
}

impl PostsClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// A bare GET: no query, no custom headers, no body.
    pub fn build_fetch_posts(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.endpoint.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_posts(&self, response: HttpResponse) -> Result<Vec<Post>, FetchError> {
        check_status(&response)?;
        parse_post_array(&response.body)
    }
}

impl Default for PostsClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

/// Map non-2xx status codes to `TransportError::Status`.
fn check_status(response: &HttpResponse) -> Result<(), TransportError> {
    if response.is_success() {
        return Ok(());
    }
    Err(TransportError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}

/// Parse a JSON array of posts, preserving array order.
///
/// The body is decoded into a `Value` first so a bad element can be reported
/// by index instead of by line/column.
pub fn parse_post_array(body: &str) -> Result<Vec<Post>, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(FetchError::MalformedResponse(format!(
                "expected a JSON array, found {}",
                kind_of(&other)
            )))
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            if !element.is_object() {
                return Err(FetchError::MalformedResponse(format!(
                    "element {index}: expected an object, found {}",
                    kind_of(&element)
                )));
            }
            serde_json::from_value::<Post>(element)
                .map_err(|e| FetchError::MalformedResponse(format!("element {index}: {e}")))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
