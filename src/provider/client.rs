//! HTTP client for the question service.
//!
//! # Endpoints
//! - `GET  question/generate?categoryName=..&numQuestions=..` → ids
//! - `POST question/getQuestions` (ids) → questions
//! - `POST question/getScore` (responses) → score

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::QuestionServiceConfig;
use crate::provider::{ProviderError, QuestionProvider};
use crate::quiz::{QuestionId, QuestionWrapper, Response};

#[derive(Debug, Clone)]
pub struct HttpQuestionProvider {
    client: Client,
    base_url: Url,
}

impl HttpQuestionProvider {
    pub fn new(config: &QuestionServiceConfig) -> Result<Self, ProviderError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ProviderError::Config(format!("base_url '{}': {}", config.base_url, e)))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;

        tracing::info!(base_url = %base_url, "Question service client initialized");

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Config(format!("endpoint '{}': {}", path, e)))
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl QuestionProvider for HttpQuestionProvider {
    async fn select_questions(&self, category: &str, count: u32) -> Result<Vec<QuestionId>, ProviderError> {
        let response = self
            .client
            .get(self.endpoint("question/generate")?)
            .query(&[("categoryName", category.to_string()), ("numQuestions", count.to_string())])
            .send()
            .await?;

        read_json(response).await
    }

    async fn fetch_questions(&self, ids: &[QuestionId]) -> Result<Vec<QuestionWrapper>, ProviderError> {
        let response = self
            .client
            .post(self.endpoint("question/getQuestions")?)
            .json(ids)
            .send()
            .await?;

        read_json(response).await
    }

    async fn score(&self, responses: &[Response]) -> Result<i32, ProviderError> {
        let response = self
            .client
            .post(self.endpoint("question/getScore")?)
            .json(responses)
            .send()
            .await?;

        read_json(response).await
    }
}
