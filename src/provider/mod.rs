//! Question service integration.
//!
//! # Data Flow
//! ```text
//! QuizOrchestrator
//!     → resilience::Resilient (timeout, retry, circuit breaker)
//!     → QuestionProvider (trait)
//!     → client.rs (HTTP/JSON to the question service)
//! ```
//!
//! # Design Decisions
//! - The provider is trusted verbatim: ids keep their JSON form and content,
//!   answers and scores pass through unmodified
//! - Every failure mode (transport, status, decode) is one error type so the
//!   resilience layer can treat them uniformly

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::quiz::{QuestionId, QuestionWrapper, Response};

pub use client::HttpQuestionProvider;

/// Errors from the question service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, DNS or protocol failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("question service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client could not be constructed from configuration.
    #[error("invalid question service configuration: {0}")]
    Config(String),

    #[error("question service unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Pick `count` question identifiers from `category`.
    async fn select_questions(&self, category: &str, count: u32) -> Result<Vec<QuestionId>, ProviderError>;

    /// Full content for the given identifiers, in the same order.
    async fn fetch_questions(&self, ids: &[QuestionId]) -> Result<Vec<QuestionWrapper>, ProviderError>;

    async fn score(&self, responses: &[Response]) -> Result<i32, ProviderError>;
}
