//! The retrieval-augmented answer pipeline.
//!
//! One invocation runs strictly in sequence: split the query, reformulate
//! the question for search, retrieve snippets, pick an answer, then verify
//! the answer against the top source pages one by one. Verification is
//! order-dependent on purpose - a later source can override a correction
//! made by an earlier one - so the steps must not be parallelized.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::extract::extract_digit;
use super::prompt;
use crate::config::Config;
use crate::fetch::{HttpPageFetcher, PageFetcher};
use crate::llm::{CompletionClient, CompletionError, YandexGptClient};
use crate::search::{SearchClient, SearchError, SearchResult, YandexSearchClient};
use crate::types::{AgentAnswer, Query};

/// At most this many sources are collected and verified per query.
pub const MAX_SOURCES: usize = 3;

/// Page text is cut to this many characters before it enters a
/// verification prompt.
pub const PAGE_TEXT_LIMIT: usize = 5000;

const NO_OPTIONS_REASONING: &str = "Вопрос не предполагает выбор из вариантов.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("model output contained no answer digit")]
    AnswerParse,

    #[error("failed to build HTTP client: {0}")]
    Init(#[from] reqwest::Error),
}

/// Outcome of checking the candidate answer against one source page.
///
/// `Confirmed` and `Inconclusive` currently produce the same note in the
/// returned reasoning; the distinction is kept here so the two cases stay
/// separable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The page check produced the same digit
    Confirmed,
    /// The page check produced a different digit
    Corrected(String),
    /// No digit could be recovered from the page check
    Inconclusive,
}

/// The question-answering agent.
pub struct Agent {
    llm: Arc<dyn CompletionClient>,
    search: Arc<dyn SearchClient>,
    fetcher: Arc<dyn PageFetcher>,
}

impl Agent {
    /// Create an agent wired to the Yandex search and completion APIs.
    pub fn new(config: &Config) -> Result<Self, AgentError> {
        let llm = Arc::new(YandexGptClient::new(config)?);
        let search = Arc::new(YandexSearchClient::new(config)?);
        let fetcher = Arc::new(HttpPageFetcher::new(config)?);

        Ok(Self::with_clients(llm, search, fetcher))
    }

    /// Create an agent from explicit capability implementations
    /// (useful for testing).
    pub fn with_clients(
        llm: Arc<dyn CompletionClient>,
        search: Arc<dyn SearchClient>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            llm,
            search,
            fetcher,
        }
    }

    /// Run the full pipeline for one raw query and return the answer.
    ///
    /// Reformulation, search, and answer selection are hard steps: their
    /// errors abort the invocation. Verification is best-effort and never
    /// does.
    pub async fn answer(&self, raw_query: &str) -> Result<AgentAnswer, AgentError> {
        let query = Query::parse(raw_query);

        if query.options.is_empty() {
            debug!("query has no options, returning terminal result");
            return Ok(AgentAnswer {
                answer: None,
                reasoning: NO_OPTIONS_REASONING.to_string(),
                sources: Vec::new(),
            });
        }

        // Degenerate reformulations are passed to search as-is.
        let reformulated = self
            .llm
            .complete(&prompt::reformulation(&query.question))
            .await?;
        info!("reformulated query: {}", reformulated.trim());

        let results = self.search.search(&reformulated).await?;
        let context = join_snippets(&results);

        let reasoning = self
            .llm
            .complete(&prompt::answer_selection(
                &query.question,
                &query.options,
                &context,
            ))
            .await?;
        let answer = extract_digit(&reasoning)
            .ok_or(AgentError::AnswerParse)?
            .to_string();
        debug!("initial answer: {}", answer);

        let sources: Vec<String> = results
            .iter()
            .filter(|result| !result.url.is_empty())
            .take(MAX_SOURCES)
            .map(|result| result.url.clone())
            .collect();

        let (answer, reasoning) = self
            .verify_against_sources(&query.question, answer, reasoning, &sources)
            .await;

        Ok(AgentAnswer {
            answer: Some(answer),
            reasoning,
            sources,
        })
    }

    /// Re-check the candidate answer against each source page in order.
    ///
    /// Sequential and cumulative: a later source sees - and may override -
    /// the answer left by an earlier one. Unreachable pages and failed
    /// check completions skip their source without touching the answer.
    async fn verify_against_sources(
        &self,
        question: &str,
        mut answer: String,
        mut reasoning: String,
        sources: &[String],
    ) -> (String, String) {
        for url in sources {
            let Some(text) = self.fetcher.fetch_text(url).await else {
                debug!("skipping unreachable source {}", url);
                continue;
            };

            let outcome = match self.check_source(question, &answer, &text).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("verification against {} failed: {}", url, e);
                    continue;
                }
            };

            match outcome {
                Verification::Corrected(digit) => {
                    info!("source {} corrected answer {} -> {}", url, answer, digit);
                    reasoning.push_str(&format!(
                        "\nПроверка по ссылке {}: ответ исправлен на {}.",
                        url, digit
                    ));
                    answer = digit;
                }
                Verification::Confirmed | Verification::Inconclusive => {
                    reasoning.push_str(&format!(
                        "\nПроверка по ссылке {}: Ответ подтвержден.",
                        url
                    ));
                }
            }
        }

        (answer, reasoning)
    }

    async fn check_source(
        &self,
        question: &str,
        answer: &str,
        page_text: &str,
    ) -> Result<Verification, CompletionError> {
        let text = truncate_chars(page_text, PAGE_TEXT_LIMIT);
        let response = self
            .llm
            .complete(&prompt::verification(question, answer, text))
            .await?;

        Ok(match extract_digit(&response) {
            Some(digit) if digit != answer => Verification::Corrected(digit.to_string()),
            Some(_) => Verification::Confirmed,
            None => Verification::Inconclusive,
        })
    }
}

/// Space-join every snippet in result order. Empty snippets contribute
/// nothing but still occupy a separator slot.
fn join_snippets(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|result| result.snippet.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `max` characters of `s`, never splitting a UTF-8 sequence.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Completion stub that replays scripted replies in order and records
    /// every prompt it was given. Errors once the script runs out.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedLlm {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(CompletionError::Empty)
        }
    }

    struct StubSearch {
        results: Vec<SearchResult>,
        calls: AtomicUsize,
    }

    impl StubSearch {
        fn new(results: Vec<SearchResult>) -> Arc<Self> {
            Arc::new(Self {
                results,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SearchClient for StubSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchClient for FailingSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, SearchError> {
            Err(SearchError::Status(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    /// Fetch stub serving pages from a map; unknown URLs fail like dead
    /// links.
    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    impl StubFetcher {
        fn new(pages: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .iter()
                    .map(|(url, text)| (url.to_string(), text.to_string()))
                    .collect(),
            })
        }

        fn empty() -> Arc<Self> {
            Self::new(&[])
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch_text(&self, url: &str) -> Option<String> {
            self.pages.get(url).cloned()
        }
    }

    fn hit(snippet: &str, url: &str) -> SearchResult {
        SearchResult {
            snippet: snippet.to_string(),
            url: url.to_string(),
        }
    }

    const ITMO_QUERY: &str = "Когда основан ИТМО?\n1) 1900\n2) 1930\n3) 1990";

    #[tokio::test]
    async fn no_options_short_circuits_without_network_calls() {
        let llm = ScriptedLlm::new(&[]);
        let search = StubSearch::new(vec![hit("snippet", "http://a.example")]);
        let agent = Agent::with_clients(llm.clone(), search.clone(), StubFetcher::empty());

        let result = agent.answer("Когда основан ИТМО?").await.unwrap();

        assert_eq!(result.answer, None);
        assert_eq!(result.reasoning, NO_OPTIONS_REASONING);
        assert!(result.sources.is_empty());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn answers_from_snippets_and_confirms_against_source() {
        let llm = ScriptedLlm::new(&["год основания итмо", "3 - годы совпадают", "3"]);
        let search = StubSearch::new(vec![hit("ИТМО основан в 1990 году", "http://example.com")]);
        let fetcher = StubFetcher::new(&[("http://example.com", "ИТМО основан в 1990 году")]);
        let agent = Agent::with_clients(llm, search, fetcher);

        let result = agent.answer(ITMO_QUERY).await.unwrap();

        assert_eq!(result.answer.as_deref(), Some("3"));
        assert_eq!(result.sources, vec!["http://example.com"]);
        assert!(result.reasoning.starts_with("3 - годы совпадают"));
        assert!(result
            .reasoning
            .contains("Проверка по ссылке http://example.com: Ответ подтвержден."));
    }

    #[tokio::test]
    async fn failed_fetch_skips_verification_and_keeps_answer() {
        let llm = ScriptedLlm::new(&["год основания итмо", "3 - годы совпадают"]);
        let search = StubSearch::new(vec![hit("ИТМО основан в 1990 году", "http://example.com")]);
        let agent = Agent::with_clients(llm, search, StubFetcher::empty());

        let result = agent.answer(ITMO_QUERY).await.unwrap();

        assert_eq!(result.answer.as_deref(), Some("3"));
        assert_eq!(result.reasoning, "3 - годы совпадают");
        assert_eq!(result.sources, vec!["http://example.com"]);
    }

    #[tokio::test]
    async fn later_source_overrides_earlier_correction() {
        let llm = ScriptedLlm::new(&[
            "запрос",
            "1 - первый вариант",
            "Ответ: 2",
            "Ответ: 3",
        ]);
        let search = StubSearch::new(vec![
            hit("a", "http://a.example"),
            hit("b", "http://b.example"),
        ]);
        let fetcher = StubFetcher::new(&[
            ("http://a.example", "страница A"),
            ("http://b.example", "страница B"),
        ]);
        let agent = Agent::with_clients(llm, search, fetcher);

        let result = agent.answer(ITMO_QUERY).await.unwrap();

        assert_eq!(result.answer.as_deref(), Some("3"));
        assert!(result
            .reasoning
            .contains("Проверка по ссылке http://a.example: ответ исправлен на 2."));
        assert!(result
            .reasoning
            .contains("Проверка по ссылке http://b.example: ответ исправлен на 3."));
    }

    #[tokio::test]
    async fn sources_keep_first_three_nonempty_urls_in_order() {
        let llm = ScriptedLlm::new(&["запрос", "1 - ответ"]);
        let search = StubSearch::new(vec![
            hit("s1", ""),
            hit("s2", "http://one.example"),
            hit("s3", "http://two.example"),
            hit("s4", ""),
            hit("s5", "http://three.example"),
            hit("s6", "http://four.example"),
        ]);
        let agent = Agent::with_clients(llm, search, StubFetcher::empty());

        let result = agent.answer(ITMO_QUERY).await.unwrap();

        assert_eq!(
            result.sources,
            vec![
                "http://one.example",
                "http://two.example",
                "http://three.example",
            ]
        );
    }

    #[tokio::test]
    async fn verification_completion_error_is_contained() {
        // the script runs dry before the verification call
        let llm = ScriptedLlm::new(&["запрос", "1 - ответ"]);
        let search = StubSearch::new(vec![hit("s", "http://a.example")]);
        let fetcher = StubFetcher::new(&[("http://a.example", "страница")]);
        let agent = Agent::with_clients(llm, search, fetcher);

        let result = agent.answer(ITMO_QUERY).await.unwrap();

        assert_eq!(result.answer.as_deref(), Some("1"));
        assert_eq!(result.reasoning, "1 - ответ");
    }

    #[tokio::test]
    async fn answer_without_digit_is_a_parse_error() {
        let llm = ScriptedLlm::new(&["запрос", "не могу выбрать вариант"]);
        let search = StubSearch::new(vec![hit("s", "http://a.example")]);
        let agent = Agent::with_clients(llm, search, StubFetcher::empty());

        let result = agent.answer(ITMO_QUERY).await;

        assert!(matches!(result, Err(AgentError::AnswerParse)));
    }

    #[tokio::test]
    async fn search_failure_aborts_the_pipeline() {
        let llm = ScriptedLlm::new(&["запрос"]);
        let agent = Agent::with_clients(llm, Arc::new(FailingSearch), StubFetcher::empty());

        let result = agent.answer(ITMO_QUERY).await;

        assert!(matches!(result, Err(AgentError::Search(_))));
    }

    #[tokio::test]
    async fn page_text_is_truncated_to_char_limit() {
        let long_page: String = "ю".repeat(PAGE_TEXT_LIMIT + 1000);
        let llm = ScriptedLlm::new(&["запрос", "1 - ответ", "1"]);
        let search = StubSearch::new(vec![hit("s", "http://a.example")]);
        let fetcher = StubFetcher::new(&[("http://a.example", long_page.as_str())]);
        let agent = Agent::with_clients(llm.clone(), search, fetcher);

        agent.answer(ITMO_QUERY).await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        let verification_prompt = prompts.last().unwrap();
        assert_eq!(
            verification_prompt.chars().filter(|c| *c == 'ю').count(),
            PAGE_TEXT_LIMIT
        );
    }

    #[test]
    fn join_snippets_preserves_separators_for_empty_snippets() {
        let results = vec![hit("a", ""), hit("", ""), hit("b", "")];
        assert_eq!(join_snippets(&results), "a  b");

        assert_eq!(join_snippets(&[hit("x", "")]), "x");
        assert_eq!(join_snippets(&[]), "");
    }

    #[test]
    fn truncate_chars_respects_utf8_boundaries() {
        assert_eq!(truncate_chars("абвгд", 3), "абв");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 5), "");
    }
}
