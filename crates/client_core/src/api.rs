//! Transport to the remote game server.
//!
//! [`GameApi`] is the seam the controller talks to; [`HttpGameApi`] is the
//! JSON-over-HTTP implementation used outside of tests.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::Username,
    error::ApiErrorBody,
    protocol::{
        GuessLengthRequest, GuessLengthResponse, HealthResponse, HintUsageResponse,
        LeaderboardQuery, LeaderboardResponse, RevealAnswerResponse, StartGameRequest,
        StartGameResponse, SubmitScoreRequest, SubmitScoreResponse, SubmitSpellingRequest,
        SubmitSpellingResponse, UserStatsResponse, WordRequest,
    },
};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiClientError {
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("{0}")]
    Transport(String),
    #[error("{detail}")]
    Status { status: u16, detail: String },
    #[error("unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl From<reqwest::Error> for ApiClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

#[async_trait]
pub trait GameApi: Send + Sync {
    async fn health(&self) -> Result<HealthResponse, ApiClientError>;
    async fn start_game(
        &self,
        request: &StartGameRequest,
    ) -> Result<StartGameResponse, ApiClientError>;
    async fn guess_length(
        &self,
        request: &GuessLengthRequest,
    ) -> Result<GuessLengthResponse, ApiClientError>;
    async fn submit_spelling(
        &self,
        request: &SubmitSpellingRequest,
    ) -> Result<SubmitSpellingResponse, ApiClientError>;
    async fn reveal_answer(
        &self,
        request: &WordRequest,
    ) -> Result<RevealAnswerResponse, ApiClientError>;
    async fn use_hint(&self, request: &WordRequest) -> Result<HintUsageResponse, ApiClientError>;
    async fn submit_score(
        &self,
        request: &SubmitScoreRequest,
    ) -> Result<SubmitScoreResponse, ApiClientError>;
    async fn leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<LeaderboardResponse, ApiClientError>;
    async fn user_stats(&self, username: &Username) -> Result<UserStatsResponse, ApiClientError>;
}

pub struct HttpGameApi {
    http: Client,
    base_url: String,
}

impl HttpGameApi {
    pub fn new(base_url: &str) -> Result<Self, ApiClientError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ApiClientError> {
        let parsed = Url::parse(base_url.trim()).map_err(|err| ApiClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiClientError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        debug!(path, "POST game api");
        let res = self.http.post(self.endpoint(path)).json(body).send().await?;
        decode_response(path, res).await
    }

    async fn get_json<R>(&self, path: &str) -> Result<R, ApiClientError>
    where
        R: DeserializeOwned,
    {
        debug!(path, "GET game api");
        let res = self.http.get(self.endpoint(path)).send().await?;
        decode_response(path, res).await
    }
}

async fn decode_response<R: DeserializeOwned>(
    path: &str,
    res: Response,
) -> Result<R, ApiClientError> {
    let status = res.status();
    let body = res.bytes().await?;
    if !status.is_success() {
        let error_body: ApiErrorBody = serde_json::from_slice(&body).unwrap_or_default();
        return Err(ApiClientError::Status {
            status: status.as_u16(),
            detail: error_body.describe(status.as_u16()),
        });
    }
    serde_json::from_slice(&body).map_err(|err| ApiClientError::Decode {
        path: path.to_string(),
        reason: err.to_string(),
    })
}

#[async_trait]
impl GameApi for HttpGameApi {
    async fn health(&self) -> Result<HealthResponse, ApiClientError> {
        self.get_json("/health").await
    }

    async fn start_game(
        &self,
        request: &StartGameRequest,
    ) -> Result<StartGameResponse, ApiClientError> {
        self.post_json("/game/start", request).await
    }

    async fn guess_length(
        &self,
        request: &GuessLengthRequest,
    ) -> Result<GuessLengthResponse, ApiClientError> {
        self.post_json("/game/guess-length", request).await
    }

    async fn submit_spelling(
        &self,
        request: &SubmitSpellingRequest,
    ) -> Result<SubmitSpellingResponse, ApiClientError> {
        self.post_json("/game/submit-spelling", request).await
    }

    async fn reveal_answer(
        &self,
        request: &WordRequest,
    ) -> Result<RevealAnswerResponse, ApiClientError> {
        self.post_json("/game/reveal-answer", request).await
    }

    async fn use_hint(&self, request: &WordRequest) -> Result<HintUsageResponse, ApiClientError> {
        self.post_json("/game/use-hint", request).await
    }

    async fn submit_score(
        &self,
        request: &SubmitScoreRequest,
    ) -> Result<SubmitScoreResponse, ApiClientError> {
        self.post_json("/leaderboard/submit", request).await
    }

    async fn leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<LeaderboardResponse, ApiClientError> {
        let path = "/leaderboard";
        debug!(path, "GET game api");
        let res = self
            .http
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await?;
        decode_response(path, res).await
    }

    async fn user_stats(&self, username: &Username) -> Result<UserStatsResponse, ApiClientError> {
        // Usernames are restricted to [A-Za-z0-9_], so no path escaping is needed.
        self.get_json(&format!("/leaderboard/user/{username}")).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
