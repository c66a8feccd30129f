//! The three quiz use cases.
//!
//! # Responsibilities
//! - Create a quiz from question ids chosen by the question service
//! - Resolve a stored quiz into full question content
//! - Forward submissions to the question service for scoring
//!
//! # Design Decisions
//! - Store lookups are local and never wrapped by the resilience policy
//! - Question service failures never surface as errors; each use case
//!   has its own degraded value
//! - No partial state on degradation: the store is untouched when creation degrades

use std::sync::Arc;

use thiserror::Error;

use crate::provider::QuestionProvider;
use crate::quiz::types::{QuestionWrapper, Quiz, QuizId, Response, SCORE_UNAVAILABLE};
use crate::resilience::{Outcome, Resilient};
use crate::store::{QuizStore, StoreError};

/// Local failures of a use case.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("quiz '{0}' not found")]
    QuizNotFound(QuizId),

    #[error("invalid request: {0}")]
    InvalidInput(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct QuizOrchestrator {
    store: Arc<dyn QuizStore>,
    provider: Arc<dyn QuestionProvider>,
    resilient: Resilient,
}

impl QuizOrchestrator {
    pub fn new(store: Arc<dyn QuizStore>, provider: Arc<dyn QuestionProvider>, resilient: Resilient) -> Self {
        Self {
            store,
            provider,
            resilient,
        }
    }

    /// Resilience policy guarding the question service.
    pub fn resilience(&self) -> &Resilient {
        &self.resilient
    }

    /// Create and persist a quiz of `count` questions from `category`.
    ///
    /// Identical calls create distinct quizzes; there is no idempotency key.
    pub async fn create_quiz(&self, category: &str, count: u32, title: &str) -> Result<Outcome<()>, OrchestratorError> {
        if category.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput("category must not be empty"));
        }
        if count == 0 {
            return Err(OrchestratorError::InvalidInput("question count must be positive"));
        }

        let selected = self
            .resilient
            .call(
                "select_questions",
                || self.provider.select_questions(category, count),
                |_| Vec::new(),
            )
            .await;

        let question_ids = match selected {
            Outcome::Success(ids) => ids,
            Outcome::Degraded(_) => return Ok(Outcome::Degraded(())),
        };

        if question_ids.len() != count as usize {
            tracing::debug!(
                category,
                requested = count,
                returned = question_ids.len(),
                "Question service returned a different number of questions"
            );
        }

        let quiz = self.store.save(Quiz::new(title, question_ids)).await?;
        tracing::info!(
            quiz_id = ?quiz.id,
            title = %quiz.title,
            questions = quiz.question_ids.len(),
            "Quiz created"
        );

        Ok(Outcome::Success(()))
    }

    /// Question content for a stored quiz, in the quiz's order.
    pub async fn get_quiz_questions(&self, id: &QuizId) -> Result<Outcome<Vec<QuestionWrapper>>, OrchestratorError> {
        let quiz = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| OrchestratorError::QuizNotFound(id.clone()))?;

        let ids = &quiz.question_ids;
        Ok(self
            .resilient
            .call("fetch_questions", || self.provider.fetch_questions(ids), |_| Vec::new())
            .await)
    }

    /// Score a submission. `id` is only used for tracing.
    pub async fn calculate_result(&self, id: &QuizId, responses: &[Response]) -> Result<Outcome<i32>, OrchestratorError> {
        let outcome = self
            .resilient
            .call("score", || self.provider.score(responses), |_| SCORE_UNAVAILABLE)
            .await;

        tracing::debug!(quiz_id = %id, responses = responses.len(), degraded = outcome.is_degraded(), "Submission scored");
        Ok(outcome)
    }
}
