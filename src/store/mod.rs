//! Quiz persistence.
//!
//! # Responsibilities
//! - Persist quizzes and assign identifiers on first save
//! - Look quizzes up by identifier
//!
//! # Design Decisions
//! - The orchestrator only sees the `QuizStore` trait; storage mechanics stay behind it
//! - Lookups return `Ok(None)` for unknown ids; errors are reserved for storage faults

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::quiz::{Quiz, QuizId};

pub use memory::MemoryQuizStore;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Persist a quiz, assigning an identifier when it has none.
    async fn save(&self, quiz: Quiz) -> Result<Quiz, StoreError>;

    async fn find_by_id(&self, id: &QuizId) -> Result<Option<Quiz>, StoreError>;
}
