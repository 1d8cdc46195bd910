//! Streaming query export.
//!
//! The export endpoint answers with newline-delimited JSON. The response
//! body is decoded incrementally as chunks arrive; records accumulate in
//! arrival order and a mid-stream failure discards the partial result.

use futures::StreamExt;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::ApiError;
use crate::request::RequestOptions;

/// Issue one streaming request and decode its line-delimited body.
pub(crate) async fn execute_streaming(
    http: &reqwest::Client,
    options: RequestOptions,
) -> Result<Vec<Value>, ApiError> {
    let response = options
        .build(http)
        .send()
        .await
        .map_err(ApiError::from_reqwest)?;

    let status = response.status();
    if status != StatusCode::OK {
        let message = if status == StatusCode::UNAUTHORIZED {
            "Ticketmatic API responded with status 'Unauthorized'".to_string()
        } else {
            format!("Ticketmatic API error with status {status}")
        };
        return Err(ApiError::Remote { status, message });
    }

    let mut records = Vec::new();
    let mut pending: Vec<u8> = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::from_reqwest)?;
        pending.extend_from_slice(&chunk);

        while let Some(newline) = pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = pending.drain(..=newline).collect();
            decode_line(&line[..line.len() - 1], &mut records)?;
        }
    }

    // The final record is not always newline-terminated.
    decode_line(&pending, &mut records)?;

    Ok(records)
}

/// Decode one line into `records`. Blank lines are skipped.
fn decode_line(line: &[u8], records: &mut Vec<Value>) -> Result<(), ApiError> {
    let line = match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    };
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    records.push(serde_json::from_slice(line)?);
    Ok(())
}
