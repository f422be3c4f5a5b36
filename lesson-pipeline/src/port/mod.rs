//! The structured-generation capability every stage is built on.
//!
//! A [`GenerationPort`] takes instructions, a prompt and a declared
//! [`OutputShape`] and returns a JSON value, or fails. Stages hold it as
//! `Arc<dyn GenerationPort>`, so the production backend ([`LlmGenerationPort`])
//! and test doubles are interchangeable.

pub mod llm_port;

use std::{future::Future, pin::Pin, time::Duration};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

use crate::errors::PortError;
use crate::models::{CodeChunk, ExplainedLine};

pub use llm_port::LlmGenerationPort;

/// Boxed future returned by [`GenerationPort::generate_structured`].
pub type PortFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, PortError>> + Send + 'a>>;

/// Provider interface for structured generation.
///
/// Implementations never retry; a failure is returned as-is.
pub trait GenerationPort: Send + Sync {
    fn generate_structured<'a>(&'a self, call: StructuredCall) -> PortFuture<'a>;
}

/// Declared target of a call: a name plus a JSON description of the fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputShape {
    pub name: &'static str,
    pub schema: Value,
}

impl OutputShape {
    pub fn of<T: Shaped>() -> Self {
        Self {
            name: T::NAME,
            schema: T::schema(),
        }
    }
}

/// Types a port can be asked to produce.
pub trait Shaped {
    const NAME: &'static str;
    fn schema() -> Value;
}

/// One request to the port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredCall {
    pub instructions: String,
    pub prompt: String,
    pub shape: OutputShape,
}

impl StructuredCall {
    pub fn new<T: Shaped>(instructions: &str, prompt: String) -> Self {
        Self {
            instructions: instructions.to_string(),
            prompt,
            shape: OutputShape::of::<T>(),
        }
    }
}

/// Invokes `port`, applies the optional deadline, and decodes the value as `T`.
///
/// # Errors
/// - the port's own [`PortError`]
/// - [`PortError::Timeout`] when `deadline` expires first
/// - [`PortError::ShapeMismatch`] when the value does not deserialize into `T`
pub async fn generate_as<T>(
    port: &dyn GenerationPort,
    call: StructuredCall,
    deadline: Option<Duration>,
) -> Result<T, PortError>
where
    T: Shaped + DeserializeOwned,
{
    debug!(
        shape = T::NAME,
        instructions_len = call.instructions.len(),
        prompt_len = call.prompt.len(),
        "calling generation port"
    );

    let fut = port.generate_structured(call);
    let value = match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| PortError::Timeout(d))??,
        None => fut.await?,
    };

    serde_json::from_value::<T>(value).map_err(|e| PortError::ShapeMismatch {
        shape: T::NAME,
        reason: e.to_string(),
    })
}

/* ---------------------------------------------------------------------------
Draft shapes: what the backend must return for each stage.
Fields the stage backfills or overwrites are optional or absent here.
--------------------------------------------------------------------------- */

/// Backend reply for code generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodeDraft {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    pub code: String,
}

impl Shaped for CodeDraft {
    const NAME: &'static str = "generated_code";

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["code"],
            "properties": {
                "timestamp": { "type": "string", "description": "ISO-8601 creation time" },
                "language": { "type": "string" },
                "code": { "type": "string", "description": "source; \\n starts a line, \\n\\n encodes one blank line" }
            }
        })
    }
}

/// Backend reply for line explanation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExplanationDraft {
    pub lines: Vec<ExplainedLine>,
    pub summary: String,
}

impl Shaped for ExplanationDraft {
    const NAME: &'static str = "line_explanation";

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["lines", "summary"],
            "properties": {
                "lines": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["line_number", "line_text", "line_explanation"],
                        "properties": {
                            "line_number": { "type": "integer", "minimum": 1 },
                            "line_text": { "type": "string" },
                            "line_explanation": { "type": ["string", "null"] }
                        }
                    }
                },
                "summary": { "type": "string" }
            }
        })
    }
}

/// Backend reply for chunking.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChunkDraft {
    pub chunks: Vec<CodeChunk>,
}

impl Shaped for ChunkDraft {
    const NAME: &'static str = "code_chunks";

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["chunks"],
            "properties": {
                "chunks": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["first_line", "last_line", "text", "rationale"],
                        "properties": {
                            "first_line": { "type": "integer", "minimum": 1 },
                            "last_line": { "type": "integer", "minimum": 1 },
                            "text": { "type": "string" },
                            "rationale": { "type": "string" }
                        }
                    }
                }
            }
        })
    }
}
