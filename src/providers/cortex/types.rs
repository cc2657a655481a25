//! Cortex Analyst `message` endpoint payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct AnalystRequest<'a> {
    pub messages: Vec<AnalystRequestMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_model_file: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalystRequestMessage<'a> {
    pub role: &'static str,
    pub content: Vec<RequestContent<'a>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestContent<'a> {
    Text { text: &'a str },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalystResponse {
    pub message: AnalystMessage,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub warnings: Vec<AnalystWarning>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalystMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalystWarning {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Sql {
        statement: String,
    },
    Suggestions {
        #[serde(default)]
        suggestions: Vec<String>,
    },
    #[serde(other)]
    Unknown,
}

impl AnalystMessage {
    /// All text blocks, newline separated.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn first_sql(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Sql { statement } => Some(statement.as_str()),
            _ => None,
        })
    }

    pub fn suggestions(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Suggestions { suggestions } => Some(suggestions),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
            .collect()
    }
}
