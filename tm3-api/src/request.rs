//! Single-request execution.
//!
//! One `RequestOptions` describes one HTTP call. `execute` interprets the
//! status/body envelope: 200 resolves to the parsed body, anything else
//! becomes a typed failure carrying the server-supplied message where the
//! body had one. Network-level failures (no response at all) stay distinct
//! from protocol-level failures (non-200 status).

use log::debug;
use reqwest::{Method, StatusCode, header};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Fallback when a failed response body has no `message` field.
pub(crate) const GENERIC_ERROR: &str = "unknown Ticketmatic API error";

/// Request body shapes the executor knows how to send.
#[derive(Debug, Clone)]
pub(crate) enum RequestBody {
    Json(Value),
    /// Raw bytes, used for file uploads.
    Raw(Vec<u8>),
}

/// Everything needed for one HTTP call. Constructed fresh per call, never
/// shared.
#[derive(Debug, Clone)]
pub(crate) struct RequestOptions {
    pub method: Method,
    pub url: String,
    pub params: Map<String, Value>,
    pub body: Option<RequestBody>,
    pub authorization: Option<String>,
}

impl RequestOptions {
    pub fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            params: Map::new(),
            body: None,
            authorization: None,
        }
    }

    pub(crate) fn build(self, http: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut request = http.request(self.method, self.url.as_str());

        if !self.params.is_empty() {
            let pairs: Vec<(String, String)> = self
                .params
                .iter()
                .map(|(key, value)| (key.clone(), param_value(value)))
                .collect();
            request = request.query(&pairs);
        }

        match self.body {
            Some(RequestBody::Json(body)) => request = request.json(&body),
            Some(RequestBody::Raw(bytes)) => request = request.body(bytes),
            None => {}
        }

        if let Some(authorization) = self.authorization {
            request = request.header(header::AUTHORIZATION, authorization);
        }

        request
    }
}

/// Issue one HTTP call and interpret the response envelope.
pub(crate) async fn execute(
    http: &reqwest::Client,
    options: RequestOptions,
    debug_enabled: bool,
) -> Result<Value, ApiError> {
    let method = options.method.clone();
    let url = options.url.clone();

    let response = options
        .build(http)
        .send()
        .await
        .map_err(ApiError::from_reqwest)?;
    let status = response.status();
    let bytes = response.bytes().await.map_err(ApiError::from_reqwest)?;

    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) if status == StatusCode::OK => return Err(ApiError::Decode(err)),
            // Failed responses are allowed a non-JSON body; the generic
            // message covers them.
            Err(_) => Value::Null,
        }
    };

    if status == StatusCode::OK {
        return Ok(body);
    }

    if debug_enabled {
        debug!("API request failed: {method} {url} responded {status}: {body}");
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| GENERIC_ERROR.to_string());

    Err(ApiError::Remote { status, message })
}

fn param_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
