//! Quiz domain types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Score returned when the question service cannot score a submission.
pub const SCORE_UNAVAILABLE: i32 = -1;

/// Identifier of a stored quiz.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(pub String);

impl QuizId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuizId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for QuizId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A quiz: a title plus the question identifiers chosen at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Assigned by the store on first save.
    pub id: Option<QuizId>,
    pub title: String,
    /// Exactly what the question service selected, in its order.
    pub question_ids: Vec<QuestionId>,
}

impl Quiz {
    pub fn new(title: impl Into<String>, question_ids: Vec<QuestionId>) -> Self {
        Self {
            id: None,
            title: title.into(),
            question_ids,
        }
    }
}

/// Question identifier exactly as the question service issued it.
///
/// The service may use JSON strings or numbers; the original form is kept so
/// ids go back to it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Text(String),
    Number(Number),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Text(s) => f.write_str(s),
            QuestionId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        QuestionId::Text(id.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(id: String) -> Self {
        QuestionId::Text(id)
    }
}

impl From<i64> for QuestionId {
    fn from(id: i64) -> Self {
        QuestionId::Number(id.into())
    }
}

/// Only textual ids compare equal to a string.
impl PartialEq<&str> for QuestionId {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, QuestionId::Text(s) if s == other)
    }
}

/// A question as displayed to a quiz taker. Owned by the question service.
///
/// Everything besides the id is carried as-is in `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionWrapper {
    pub id: QuestionId,
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl QuestionWrapper {
    /// The `questionTitle` field, when the service sends one.
    pub fn question_title(&self) -> Option<&str> {
        self.content.get("questionTitle").and_then(Value::as_str)
    }
}

/// One submitted answer, forwarded to the question service unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Question the answer refers to.
    #[serde(rename = "id")]
    pub question_id: QuestionId,
    /// Chosen answer value.
    #[serde(rename = "response")]
    pub answer: Value,
    /// Fields this service does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Response {
    pub fn new(question_id: impl Into<QuestionId>, answer: impl Into<Value>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: answer.into(),
            extra: Map::new(),
        }
    }
}
