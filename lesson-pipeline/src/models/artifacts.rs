use serde::{Deserialize, Serialize};

/// Output of code generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeArtifact {
    pub timestamp: String,
    pub language: String,
    /// Source text. `\n` starts a new line, `\n\n` encodes one blank line.
    pub code: String,
}

/// One physical line of the generated code with its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainedLine {
    /// 1-based.
    pub line_number: usize,
    pub line_text: String,
    /// `null` exactly when the line is blank.
    #[serde(default)]
    pub line_explanation: Option<String>,
}

/// Output of line explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationArtifact {
    pub timestamp: String,
    pub language: String,
    pub lines: Vec<ExplainedLine>,
    pub summary: String,
}

/// A contiguous, inclusive range of lines that belong together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChunk {
    pub first_line: usize,
    pub last_line: usize,
    pub text: String,
    pub rationale: String,
}

/// Output of chunking. `summary` is carried from the explanation unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkArtifact {
    pub timestamp: String,
    pub language: String,
    pub chunks: Vec<CodeChunk>,
    pub summary: String,
}
