use serde::Deserialize;

/// Request payload for POST /api/v1/generate.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// What the code should do.
    pub prompt: String,
    /// Target language; the pipeline default applies when omitted.
    #[serde(default)]
    pub language: Option<String>,
    /// Extra requirements passed to code generation.
    #[serde(default)]
    pub context: Option<String>,
}
