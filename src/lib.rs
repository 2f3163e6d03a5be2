//! # ITMO QA Agent
//!
//! A retrieval-augmented agent that answers multiple-choice questions about
//! ITMO University by combining YandexGPT with live web search.
//!
//! This library provides:
//! - A search client for the Yandex XML search API
//! - A best-effort page fetcher for source verification
//! - A one-shot completion client for YandexGPT
//! - The pipeline that sequences them into an answer
//!
//! ## Pipeline
//!
//! 1. Split the raw query: first line is the question, the rest are options
//! 2. Reformulate the question into a search phrase (few-shot prompt)
//! 3. Search, join the result snippets into the answer context
//! 4. Ask the model to pick an option, extract the digit from its reply
//! 5. Re-check the answer against up to three source pages, in order
//!
//! ## Example
//!
//! ```rust,ignore
//! use itmo_qa_agent::{agent::Agent, config::Config};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::new(&config)?;
//! let result = agent.answer("Когда основан ИТМО?\n1) 1900\n2) 1990").await?;
//! ```

pub mod agent;
pub mod config;
pub mod fetch;
pub mod llm;
pub mod search;
pub mod types;

pub use config::Config;
