use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::UploadError;
use crate::stage::AuthContext;

/// Read-only collaborators the screens render between recordings: AI
/// counterpart text and video for playback, feedback summaries, and the
/// debate/interview bootstrap calls.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth: AuthContext,
}

/// Response of `POST /api/debate/start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateStart {
    pub debate_id: String,
    pub topic: String,
    pub position: String,
}

/// An interview question (technical or follow-up).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
}

/// AI-generated feedback summary for a finished debate or interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub summary: Option<String>,
    /// Per-criterion scores as the backend reports them.
    #[serde(default)]
    pub scores: serde_json::Value,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, auth: AuthContext) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            auth,
        }
    }

    pub async fn start_debate(
        &self,
        topic: &str,
        position: &str,
    ) -> Result<DebateStart, UploadError> {
        let url = format!("{}/api/debate/start", self.base_url);
        let body = serde_json::json!({ "topic": topic, "position": position });
        let response = self.checked(self.request(&url).json(&body)).await?;
        Ok(response.json().await?)
    }

    /// AI counterpart text for a debate stage, e.g. `ai-opening`.
    pub async fn ai_stage_text(
        &self,
        debate_id: &str,
        stage: &str,
    ) -> Result<serde_json::Value, UploadError> {
        let url = format!("{}/api/debate/{}/{}", self.base_url, debate_id, stage);
        let response = self.checked_get(&url).await?;
        Ok(response.json().await?)
    }

    /// AI counterpart video for playback, e.g. `ai-opening-video`.
    pub async fn ai_stage_video(
        &self,
        debate_id: &str,
        stage: &str,
    ) -> Result<Vec<u8>, UploadError> {
        let url = format!("{}/api/debate/{}/{}", self.base_url, debate_id, stage);
        let response = self.checked_get(&url).await?;
        let bytes = response.bytes().await?;
        info!("Fetched AI stage video: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    pub async fn debate_feedback(&self, debate_id: &str) -> Result<Feedback, UploadError> {
        let url = format!("{}/api/debate/{}/feedback", self.base_url, debate_id);
        Ok(self.checked_get(&url).await?.json().await?)
    }

    pub async fn interview_feedback(&self, interview_id: &str) -> Result<Feedback, UploadError> {
        let url = format!("{}/api/interview/{}/feedback", self.base_url, interview_id);
        Ok(self.checked_get(&url).await?.json().await?)
    }

    pub async fn interview_question(&self, interview_id: &str) -> Result<Question, UploadError> {
        let url = format!("{}/api/interview/{}/question", self.base_url, interview_id);
        Ok(self.checked_get(&url).await?.json().await?)
    }

    pub async fn interview_followup_question(
        &self,
        interview_id: &str,
    ) -> Result<Question, UploadError> {
        let url = format!(
            "{}/api/interview/{}/followup-question",
            self.base_url, interview_id
        );
        Ok(self.checked_get(&url).await?.json().await?)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.post(url);
        if let Some(token) = &self.auth.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn checked_get(&self, url: &str) -> Result<reqwest::Response, UploadError> {
        let mut req = self.client.get(url);
        if let Some(token) = &self.auth.token {
            req = req.bearer_auth(token);
        }
        self.checked(req).await
    }

    async fn checked(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, UploadError> {
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status.as_u16()));
        }
        Ok(response)
    }
}
