//! Agent module - the retrieval-augmented answer pipeline.
//!
//! The pipeline runs in a fixed sequence:
//! 1. Split the raw query into question and options
//! 2. Reformulate the question into a search-friendly phrase
//! 3. Retrieve snippets and build the answer context
//! 4. Ask the model to pick an option, extract the digit
//! 5. Verify the answer against up to three source pages, in order

pub mod extract;
mod pipeline;
mod prompt;

pub use pipeline::{Agent, AgentError, Verification, MAX_SOURCES, PAGE_TEXT_LIMIT};
