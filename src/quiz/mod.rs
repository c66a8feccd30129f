//! Quiz orchestration.

pub mod orchestrator;
pub mod types;

pub use orchestrator::{OrchestratorError, QuizOrchestrator};
pub use types::{QuestionId, QuestionWrapper, Quiz, QuizId, Response, SCORE_UNAVAILABLE};
