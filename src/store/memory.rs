//! In-memory quiz store backed by a concurrent map.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::quiz::{Quiz, QuizId};
use crate::store::{QuizStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct MemoryQuizStore {
    quizzes: Arc<DashMap<QuizId, Quiz>>,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored quizzes.
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    /// All stored quizzes, in no particular order.
    pub fn all(&self) -> Vec<Quiz> {
        self.quizzes.iter().map(|r| r.value().clone()).collect()
    }
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn save(&self, mut quiz: Quiz) -> Result<Quiz, StoreError> {
        let id = quiz.id.get_or_insert_with(QuizId::generate).clone();
        self.quizzes.insert(id, quiz.clone());
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &QuizId) -> Result<Option<Quiz>, StoreError> {
        Ok(self.quizzes.get(id).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_assigns_id() {
        let store = MemoryQuizStore::new();
        let saved = store
            .save(Quiz::new("Science", vec!["q1".into(), "q2".into()]))
            .await
            .unwrap();

        let id = saved.id.clone().expect("id assigned");
        let found = store.find_by_id(&id).await.unwrap().expect("quiz stored");
        assert_eq!(found, saved);
        assert_eq!(found.question_ids, vec!["q1", "q2"]);
    }

    #[tokio::test]
    async fn test_save_keeps_existing_id() {
        let store = MemoryQuizStore::new();
        let mut quiz = Quiz::new("History", vec![]);
        quiz.id = Some(QuizId::from("fixed"));

        let saved = store.save(quiz).await.unwrap();
        assert_eq!(saved.id, Some(QuizId::from("fixed")));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let store = MemoryQuizStore::new();
        assert!(store.find_by_id(&QuizId::from("missing")).await.unwrap().is_none());
    }
}
