//! Deterministic port double for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Value, json};

use crate::errors::PortError;
use crate::port::{
    ChunkDraft, CodeDraft, ExplanationDraft, GenerationPort, PortFuture, Shaped, StructuredCall,
};

#[derive(Debug, Clone)]
enum Reply {
    Value(Value),
    Fail(String),
    Hang,
}

/// Answers each shape with a canned reply and records every call it receives.
#[derive(Debug, Default)]
pub(crate) struct ScriptedPort {
    replies: HashMap<&'static str, Reply>,
    calls: Mutex<Vec<StructuredCall>>,
}

impl ScriptedPort {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(mut self, shape: &'static str, value: Value) -> Self {
        self.replies.insert(shape, Reply::Value(value));
        self
    }

    pub(crate) fn fail(mut self, shape: &'static str, message: &str) -> Self {
        self.replies.insert(shape, Reply::Fail(message.to_string()));
        self
    }

    pub(crate) fn hang(mut self, shape: &'static str) -> Self {
        self.replies.insert(shape, Reply::Hang);
        self
    }

    pub(crate) fn calls(&self) -> Vec<StructuredCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub(crate) fn shapes_called(&self) -> Vec<&'static str> {
        self.calls().iter().map(|c| c.shape.name).collect()
    }

    /// `add two numbers` in Python: two lines, one chunk.
    pub(crate) fn add_two_numbers() -> Self {
        Self::new()
            .reply(
                CodeDraft::NAME,
                json!({ "language": "python", "code": "def add(a,b):\n    return a+b" }),
            )
            .reply(
                ExplanationDraft::NAME,
                json!({
                    "timestamp": "1999-01-01T00:00:00Z",
                    "language": "cobol",
                    "lines": [
                        { "line_number": 1, "line_text": "def add(a,b):", "line_explanation": "Defines a function taking two values." },
                        { "line_number": 2, "line_text": "    return a+b", "line_explanation": "Returns their sum to the caller." }
                    ],
                    "summary": "A function that adds two numbers."
                }),
            )
            .reply(
                ChunkDraft::NAME,
                json!({
                    "summary": "regenerated summary that must be ignored",
                    "chunks": [
                        { "first_line": 1, "last_line": 2, "text": "def add(a,b):\n    return a+b", "rationale": "One complete function." }
                    ]
                }),
            )
    }

    /// Three lines with a blank line in the middle.
    pub(crate) fn with_blank_line() -> Self {
        Self::new()
            .reply(
                CodeDraft::NAME,
                json!({ "timestamp": "2025-10-31T12:00:00Z", "code": "import os\n\nprint(os.name)" }),
            )
            .reply(
                ExplanationDraft::NAME,
                json!({
                    "lines": [
                        { "line_number": 1, "line_text": "import os", "line_explanation": "Imports the os module." },
                        { "line_number": 2, "line_text": "", "line_explanation": null },
                        { "line_number": 3, "line_text": "print(os.name)", "line_explanation": "Prints the OS family name." }
                    ],
                    "summary": "Prints the operating system family."
                }),
            )
            .reply(
                ChunkDraft::NAME,
                json!({
                    "chunks": [
                        { "first_line": 1, "last_line": 2, "text": "import os\n", "rationale": "Imports." },
                        { "first_line": 3, "last_line": 3, "text": "print(os.name)", "rationale": "Top-level logic." }
                    ]
                }),
            )
    }
}

impl GenerationPort for ScriptedPort {
    fn generate_structured<'a>(&'a self, call: StructuredCall) -> PortFuture<'a> {
        let reply = self.replies.get(call.shape.name).cloned();
        let shape = call.shape.name;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        Box::pin(async move {
            match reply {
                Some(Reply::Value(v)) => Ok(v),
                Some(Reply::Fail(m)) => Err(PortError::Unavailable(m)),
                Some(Reply::Hang) => std::future::pending().await,
                None => Err(PortError::Unavailable(format!("no scripted reply for `{shape}`"))),
            }
        })
    }
}
