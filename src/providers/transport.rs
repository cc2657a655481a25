//! Shared JSON-over-HTTP call used by every provider client and by the
//! chat client talking to the analyst API.

use std::time::Instant;

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::LlmError;
use crate::observability::ProviderTracer;

/// POST `body` to `url` and decode the JSON reply.
///
/// Non-2xx responses become `ApiError` carrying the provider's own message
/// when the body has the usual `{"error": {"message": ..}}` shape; an empty
/// or undecodable body becomes `ParseError`.
pub(crate) async fn post_json<B, T>(
    http_client: &reqwest::Client,
    tracer: &ProviderTracer,
    url: &str,
    headers: HeaderMap,
    body: &B,
) -> Result<T, LlmError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let started = Instant::now();
    tracer.trace_request_start("POST", url);
    tracer.trace_request_details(&headers);

    let response = http_client
        .post(url)
        .headers(headers)
        .json(body)
        .send()
        .await
        .map_err(|e| {
            let err = LlmError::from(e);
            tracer.trace_request_error(None, &err.to_string(), started);
            err
        })?;

    let status = response.status();
    let text = response.text().await.map_err(LlmError::from)?;

    if !status.is_success() {
        tracer.trace_request_error(Some(status.as_u16()), &text, started);
        let details = serde_json::from_str::<serde_json::Value>(&text).ok();
        let message = details
            .as_ref()
            .and_then(extract_error_message)
            .unwrap_or_else(|| text.clone());
        return Err(LlmError::ApiError {
            code: status.as_u16(),
            message,
            details,
        });
    }

    if text.trim().is_empty() {
        tracer.trace_request_error(Some(status.as_u16()), "empty response body", started);
        return Err(LlmError::ParseError("Provider returned an empty response body".into()));
    }

    let parsed = serde_json::from_str(&text)
        .map_err(|e| LlmError::ParseError(format!("Failed to parse response JSON: {e}")))?;
    tracer.trace_request_complete(started, text.len());
    Ok(parsed)
}

fn extract_error_message(body: &serde_json::Value) -> Option<String> {
    match body.get("error") {
        Some(error) => error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .or_else(|| error.as_str()),
        // Snowflake style {"message": ..} or our own API's {"detail": ..}
        None => body
            .get("message")
            .or_else(|| body.get("detail"))
            .and_then(serde_json::Value::as_str),
    }
    .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_nested_error_message() {
        let body = json!({"error": {"code": 401, "message": "API key not valid."}});
        assert_eq!(extract_error_message(&body).as_deref(), Some("API key not valid."));

        let flat = json!({"error": "rate limited"});
        assert_eq!(extract_error_message(&flat).as_deref(), Some("rate limited"));

        let snowflake = json!({"message": "Invalid semantic model", "code": "392708"});
        assert_eq!(
            extract_error_message(&snowflake).as_deref(),
            Some("Invalid semantic model")
        );

        let api = json!({"detail": "Unsupported AI provider: x. Available providers: []"});
        assert!(extract_error_message(&api).unwrap().starts_with("Unsupported"));

        assert_eq!(extract_error_message(&json!({"status": 500})), None);
    }
}
