use std::{collections::HashSet, fmt, path::PathBuf, sync::Arc, time::Duration};

use parking_lot::RwLock;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{config::AppConfig, models::Question};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure to obtain a usable question dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The dataset file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The dataset URL could not be reached.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        /// URL that was requested.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("{url} responded with HTTP {status}")]
    Status {
        /// URL that was requested.
        url: String,
        /// Status returned by the server.
        status: reqwest::StatusCode,
    },
    /// The payload is not a well-formed question list.
    #[error("question data is not well-formed: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A record points its answer outside of its options.
    #[error("question {index} marks answer {correct} as correct but has {options} options")]
    InvalidAnswer {
        /// Zero-based position of the record in the dataset.
        index: usize,
        /// Answer index found in the record.
        correct: i64,
        /// Number of options the record carries.
        options: usize,
    },
    /// The dataset parsed but holds no questions.
    #[error("question data contains no questions")]
    Empty,
}

/// Where a dataset is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSource {
    /// Local JSON file.
    File(PathBuf),
    /// Remote JSON document fetched over HTTP(S).
    Url(String),
}

impl QuestionSource {
    /// Interpret `raw` as a URL when it carries an http(s) scheme, otherwise as a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            QuestionSource::Url(trimmed.to_string())
        } else {
            QuestionSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for QuestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionSource::File(path) => write!(f, "{}", path.display()),
            QuestionSource::Url(url) => f.write_str(url),
        }
    }
}

/// Thread-safe loader that fetches, normalises and caches the question set.
#[derive(Clone)]
pub struct QuestionRepository {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    source: QuestionSource,
    default_category: String,
    timeout: Duration,
    cache: Vec<Question>,
}

impl QuestionRepository {
    /// Build a repository reading from `source`.
    pub fn new(source: QuestionSource, default_category: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                source,
                default_category: default_category.into(),
                timeout: DEFAULT_FETCH_TIMEOUT,
                cache: Vec::new(),
            })),
        }
    }

    /// Build a repository from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let repository = Self::new(
            QuestionSource::parse(&config.questions_source),
            config.default_category.clone(),
        );
        repository.inner.write().timeout = config.fetch_timeout();
        repository
    }

    /// Current dataset source.
    pub fn source(&self) -> QuestionSource {
        self.inner.read().source.clone()
    }

    /// Point the repository at a new source, dropping cached questions.
    pub fn set_source(&self, source: QuestionSource) {
        let mut inner = self.inner.write();
        inner.source = source;
        inner.cache.clear();
    }

    /// Fetch and parse the dataset, replacing the cache on success.
    pub async fn load(&self) -> Result<Vec<Question>, LoadError> {
        let (source, default_category, timeout) = {
            let inner = self.inner.read();
            (
                inner.source.clone(),
                inner.default_category.clone(),
                inner.timeout,
            )
        };

        let payload = match fetch(&source, timeout).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(source = %source, %err, "Question source unavailable");
                return Err(err);
            }
        };
        let questions = match parse_questions(&payload, &default_category) {
            Ok(questions) => questions,
            Err(err) => {
                warn!(source = %source, %err, "Question data rejected");
                return Err(err);
            }
        };
        info!(
            source = %source,
            total = questions.len(),
            categories = list_categories(&questions).len(),
            "Questions loaded"
        );

        self.inner.write().cache = questions.clone();
        Ok(questions)
    }

    /// Questions from the last successful load.
    pub fn questions(&self) -> Vec<Question> {
        self.inner.read().cache.clone()
    }

    /// Categories of the cached questions.
    pub fn categories(&self) -> Vec<String> {
        list_categories(&self.inner.read().cache)
    }
}

async fn fetch(source: &QuestionSource, timeout: Duration) -> Result<Vec<u8>, LoadError> {
    match source {
        QuestionSource::File(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|source| LoadError::Read {
                    path: path.clone(),
                    source,
                })
        }
        QuestionSource::Url(url) => {
            let fetch_err = |source: reqwest::Error| LoadError::Fetch {
                url: url.clone(),
                source,
            };
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(fetch_err)?;
            let response = client.get(url).send().await.map_err(fetch_err)?;
            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    url: url.clone(),
                    status,
                });
            }
            let body = response.bytes().await.map_err(fetch_err)?;
            Ok(body.to_vec())
        }
    }
}

/// Parse a JSON dataset, assigning `default_category` where none is given.
pub fn parse_questions(payload: &[u8], default_category: &str) -> Result<Vec<Question>, LoadError> {
    let raw: Vec<RawQuestion> = serde_json::from_slice(payload)?;
    if raw.is_empty() {
        return Err(LoadError::Empty);
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, record)| record.into_question(index, default_category))
        .collect()
}

/// Unique category labels in first-seen order.
pub fn list_categories(questions: &[Question]) -> Vec<String> {
    let mut seen = HashSet::new();
    questions
        .iter()
        .filter(|question| seen.insert(question.category.as_str()))
        .map(|question| question.category.clone())
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    q: String,
    #[serde(default)]
    options: Vec<String>,
    correct: i64,
    #[serde(default)]
    category: Option<String>,
}

impl RawQuestion {
    fn into_question(self, index: usize, default_category: &str) -> Result<Question, LoadError> {
        let correct_index = usize::try_from(self.correct)
            .ok()
            .filter(|correct| *correct < self.options.len())
            .ok_or(LoadError::InvalidAnswer {
                index,
                correct: self.correct,
                options: self.options.len(),
            })?;

        let category = self
            .category
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_category.to_string());

        Ok(Question {
            text: self.q,
            options: self.options,
            correct_index,
            category,
        })
    }
}
