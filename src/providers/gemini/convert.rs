//! Request/response shapes for `models/{model}:generateContent`.

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::types::GenerationOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

fn text_content(role: Option<&str>, text: &str) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: vec![Part {
            text: Some(text.to_string()),
        }],
    }
}

pub fn build_request(prompt: &str, options: &GenerationOptions) -> GenerateContentRequest {
    let wants_config = options.temperature.is_some() || options.max_tokens.is_some();
    let generation_config = wants_config.then(|| GenerationConfig {
        temperature: options.temperature,
        max_output_tokens: options.max_tokens,
    });
    GenerateContentRequest {
        contents: vec![text_content(Some("user"), prompt)],
        system_instruction: options
            .system_prompt
            .as_deref()
            .map(|system| text_content(None, system)),
        generation_config,
    }
}

/// Concatenate the text parts of the first candidate.
pub fn extract_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(LlmError::ParseError(format!("Gemini returned no candidates: {reason}")));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(LlmError::ParseError(format!(
            "Gemini candidate contained no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_shape() {
        let options = GenerationOptions::new()
            .with_system_prompt("be terse")
            .with_temperature(0.0)
            .with_max_tokens(500);
        let body = serde_json::to_value(build_request("count rows", &options)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "count rows"}]}],
                "systemInstruction": {"parts": [{"text": "be terse"}]},
                "generationConfig": {"temperature": 0.0, "maxOutputTokens": 500}
            })
        );
    }

    #[test]
    fn plain_request_has_no_config() {
        let body =
            serde_json::to_value(build_request("hi", &GenerationOptions::default())).unwrap();
        assert!(body.get("systemInstruction").is_none());
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn joins_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "SELECT "}, {"text": "1;"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "SELECT 1;");
    }

    #[test]
    fn blocked_prompt_is_parse_error() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        let err = extract_text(response).unwrap_err();
        assert!(matches!(err, LlmError::ParseError(ref m) if m.contains("SAFETY")));
    }
}
