//! Pipeline input and output types.

use serde::{Deserialize, Serialize};

/// A raw query split into its question and answer options.
///
/// The wire format is a single text blob: the first line is the question,
/// every following line is one answer option (1-indexed by position).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// The question text (first line of the raw input)
    pub question: String,

    /// Answer options in input order; may contain empty lines
    pub options: Vec<String>,
}

impl Query {
    /// Split a raw query blob into question and options.
    ///
    /// Splits on `'\n'` only, so blank lines after the question still count
    /// as options. An input without any newline has no options.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('\n');
        let question = parts.next().unwrap_or("").to_string();
        let options = parts.map(str::to_string).collect();

        Self { question, options }
    }
}

/// The terminal artifact of one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentAnswer {
    /// Chosen option index as text, or `None` when no answer applies
    pub answer: Option<String>,

    /// Free-form model explanation, with verification notes appended
    pub reasoning: String,

    /// Up to three source URLs backing the answer, in relevance order
    pub sources: Vec<String>,
}
