//! Production [`GenerationPort`] over `ai_llm_service::LlmService`.
//!
//! System message = stage instructions + the declared shape rendered as JSON.
//! User message = the stage prompt. The backend runs in JSON mode; the reply is
//! stripped of Markdown fences and parsed.

use std::sync::Arc;

use ai_llm_service::{AiLlmError, LlmService};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::PortError;
use crate::port::{GenerationPort, OutputShape, PortFuture, StructuredCall};

#[derive(Debug, Clone)]
pub struct LlmGenerationPort {
    svc: Arc<LlmService>,
}

impl LlmGenerationPort {
    pub fn new(svc: Arc<LlmService>) -> Self {
        Self { svc }
    }
}

impl GenerationPort for LlmGenerationPort {
    fn generate_structured<'a>(&'a self, call: StructuredCall) -> PortFuture<'a> {
        Box::pin(async move {
            let system = system_message(&call.instructions, &call.shape);
            let raw = self
                .svc
                .generate(&call.prompt, Some(&system))
                .await
                .map_err(port_error_from_backend)?;

            debug!(shape = call.shape.name, reply_len = raw.len(), "backend replied");
            parse_reply(&raw).inspect_err(|e| {
                warn!(shape = call.shape.name, error = %e, "backend reply is not JSON");
            })
        })
    }
}

/// Renders the system message for one call.
pub fn system_message(instructions: &str, shape: &OutputShape) -> String {
    let schema = serde_json::to_string_pretty(&shape.schema).unwrap_or_else(|_| shape.schema.to_string());
    format!(
        "{instructions}\n\n\
         Respond with exactly one JSON object (`{name}`) matching this schema:\n\
         {schema}\n\
         Return JSON only, without Markdown fences or commentary.",
        name = shape.name,
    )
}

/// Connection failures become `Unavailable`, client timeouts `Timeout`, the rest `Backend`.
fn port_error_from_backend(err: AiLlmError) -> PortError {
    match err {
        AiLlmError::HttpTransport(e) if e.is_connect() => PortError::Unavailable(e.to_string()),
        AiLlmError::Timeout(d) => PortError::Timeout(d),
        other => PortError::Backend(other),
    }
}

/// Parses a backend reply as a JSON object, tolerating ```json fences.
fn parse_reply(raw: &str) -> Result<Value, PortError> {
    let clean = cleanup_json_like(raw);
    match serde_json::from_str::<Value>(&clean) {
        Ok(v @ Value::Object(_)) => Ok(v),
        Ok(other) => Err(PortError::Malformed(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
        Err(e) => Err(PortError::Malformed(e.to_string())),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn cleanup_json_like(s: &str) -> String {
    let mut t = s.trim().to_string();
    if t.starts_with("```") {
        t = t
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .to_string();
        if let Some(pos) = t.rfind("```") {
            t.truncate(pos);
        }
    }
    t.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{CodeDraft, OutputShape};

    #[test]
    fn strips_fences() {
        assert_eq!(cleanup_json_like("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(cleanup_json_like("```\n{\"a\":1}```  "), "{\"a\":1}");
        assert_eq!(cleanup_json_like("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn parse_reply_requires_object() {
        assert!(parse_reply("```json\n{\"code\":\"x\"}\n```").is_ok());
        assert!(matches!(parse_reply("[1,2]"), Err(PortError::Malformed(m)) if m.contains("array")));
        assert!(matches!(parse_reply("Sure! Here is"), Err(PortError::Malformed(_))));
    }

    #[test]
    fn system_message_contains_instructions_and_shape() {
        let msg = system_message("Be helpful.", &OutputShape::of::<CodeDraft>());
        assert!(msg.starts_with("Be helpful."));
        assert!(msg.contains("`generated_code`"));
        assert!(msg.contains("\"code\""));
    }
}
