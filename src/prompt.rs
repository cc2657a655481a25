//! SQL generation prompt
//!
//! Both the specialized provider paths and the manager's generic fallback
//! build their system prompt here, so the schema context and the
//! "cannot answer" convention are identical whichever path runs.

use crate::semantic_model::SemanticModel;
use crate::types::GenerationOptions;

/// Exact reply the model must give for unanswerable questions. Callers
/// match on this substring, so case and punctuation are part of the contract.
pub const CANNOT_ANSWER_SENTINEL: &str = "I cannot answer this question.";

pub const DEFAULT_DIALECT: &str = "SQLite";

pub const SQL_TEMPERATURE: f32 = 0.0;
pub const SQL_MAX_TOKENS: u32 = 500;

pub const SEMANTIC_MODEL_START: &str = "--- SEMANTIC MODEL START ---";
pub const SEMANTIC_MODEL_END: &str = "--- SEMANTIC MODEL END ---";

/// Rules appended after the semantic model. `{dialect}` is substituted.
const RULES: [&str; 4] = [
    "- The query must be compatible with {dialect}.",
    "- Only use tables and columns defined in the semantic model above.",
    "- Use the relationships defined in the model to correctly join tables.",
    "- If the question cannot be answered with the given schema, respond with \"I cannot answer this question.\"",
];

/// The fixed rules with the model's dialect filled in.
pub fn system_rules(dialect: &str) -> Vec<String> {
    RULES
        .iter()
        .map(|rule| rule.replace("{dialect}", dialect))
        .collect()
}

/// System prompt that turns a question into a single SQL statement.
pub fn build_sql_system_prompt(semantic_model: &SemanticModel) -> String {
    let dialect = semantic_model.dialect();
    let mut prompt = format!(
        "You are an expert {dialect} data analyst. Your task is to convert a user's question in natural language into a valid {dialect} query.\n\
         You must only respond with the SQL query and nothing else. Do not add explanations, comments, or any surrounding text.\n\
         The database has the following schema, defined by this semantic model:\n\n\
         {SEMANTIC_MODEL_START}\n{}\n{SEMANTIC_MODEL_END}\n\n",
        semantic_model.as_str()
    );
    for rule in system_rules(dialect) {
        prompt.push_str(&rule);
        prompt.push('\n');
    }
    prompt
}

/// Deterministic sampling settings for SQL generation.
pub fn sql_generation_options(semantic_model: &SemanticModel) -> GenerationOptions {
    GenerationOptions::new()
        .with_system_prompt(build_sql_system_prompt(semantic_model))
        .with_temperature(SQL_TEMPERATURE)
        .with_max_tokens(SQL_MAX_TOKENS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_model_and_rules() {
        let model = SemanticModel::from_text("tables:\n  - name: X\n").with_dialect("PostgreSQL");
        let prompt = build_sql_system_prompt(&model);

        assert!(prompt.contains("tables:\n  - name: X\n"));
        assert!(prompt.contains(SEMANTIC_MODEL_START));
        assert!(prompt.contains(SEMANTIC_MODEL_END));
        assert!(prompt.contains("You must only respond with the SQL query and nothing else."));
        assert!(prompt.contains("- The query must be compatible with PostgreSQL."));
        for rule in system_rules("PostgreSQL") {
            assert!(prompt.contains(&rule), "missing rule: {rule}");
        }
        assert!(prompt.contains(CANNOT_ANSWER_SENTINEL));
    }

    #[test]
    fn options_are_deterministic() {
        let model = SemanticModel::from_text("tables: []");
        let options = sql_generation_options(&model);
        assert_eq!(options.temperature, Some(0.0));
        assert_eq!(options.max_tokens, Some(500));
        assert_eq!(
            options.system_prompt.as_deref(),
            Some(build_sql_system_prompt(&model).as_str())
        );
    }
}
