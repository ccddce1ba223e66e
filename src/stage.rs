//! Stages, screens, and the routing metadata threaded between them.
//!
//! Each scripted step of a debate or interview flow has its own recording
//! screen, upload endpoint, and follow-on screen. The metadata bundle is
//! passed by value from screen to screen; nothing here reads ambient
//! storage.

use serde::{Deserialize, Serialize};

/// One scripted step with its own recording screen and upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    DebateOpening,
    DebateRebuttal,
    DebateCounterRebuttal,
    DebateClosing,
    InterviewTech,
    InterviewFollowup,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::DebateOpening,
        Stage::DebateRebuttal,
        Stage::DebateCounterRebuttal,
        Stage::DebateClosing,
        Stage::InterviewTech,
        Stage::InterviewFollowup,
    ];

    /// Upload endpoint path for this stage, relative to the API base.
    pub fn upload_path(&self, entity_id: &str) -> String {
        match self {
            Stage::DebateOpening => format!("/api/debate/{entity_id}/opening-video"),
            Stage::DebateRebuttal => format!("/api/debate/{entity_id}/rebuttal-video"),
            Stage::DebateCounterRebuttal => {
                format!("/api/debate/{entity_id}/counter-rebuttal-video")
            }
            Stage::DebateClosing => format!("/api/debate/{entity_id}/closing-video"),
            Stage::InterviewTech => format!("/api/interview/{entity_id}/TECH/answer-video"),
            Stage::InterviewFollowup => {
                format!("/api/interview/{entity_id}/FOLLOWUP/answer-video")
            }
        }
    }

    /// Multipart field name the endpoint expects for the binary payload.
    /// Uniformly "file"; config can override per stage for backends that
    /// still expect the legacy "video" field.
    pub fn field_name(&self) -> &'static str {
        "file"
    }

    /// Filename attached to the multipart part.
    pub fn file_name(&self) -> &'static str {
        match self {
            Stage::DebateOpening => "opening-video.webm",
            Stage::DebateRebuttal => "rebuttal-video.webm",
            Stage::DebateCounterRebuttal => "counter-rebuttal-video.webm",
            Stage::DebateClosing => "closing-video.webm",
            Stage::InterviewTech => "tech.webm",
            Stage::InterviewFollowup => "followup.webm",
        }
    }

    /// Screen the pipeline navigates to after a successful upload.
    pub fn next_screen(&self) -> Screen {
        match self {
            Stage::DebateOpening => Screen::AiOpening,
            Stage::DebateRebuttal => Screen::AiRebuttal,
            Stage::DebateCounterRebuttal => Screen::AiCounterRebuttal,
            Stage::DebateClosing => Screen::AiClosing,
            Stage::InterviewTech => Screen::InterviewFollowupQuestion,
            Stage::InterviewFollowup => Screen::InterviewFeedback,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::DebateOpening => "debate-opening",
            Stage::DebateRebuttal => "debate-rebuttal",
            Stage::DebateCounterRebuttal => "debate-counter-rebuttal",
            Stage::DebateClosing => "debate-closing",
            Stage::InterviewTech => "interview-tech",
            Stage::InterviewFollowup => "interview-followup",
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown stage: {s}"))
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation target after a pipeline completes or is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    AiOpening,
    AiRebuttal,
    AiCounterRebuttal,
    AiClosing,
    DebateFeedback,
    InterviewFollowupQuestion,
    InterviewFeedback,
    Home,
}

impl Screen {
    pub fn route(&self) -> &'static str {
        match self {
            Screen::AiOpening => "/debate/ai-opening",
            Screen::AiRebuttal => "/debate/ai-rebuttal",
            Screen::AiCounterRebuttal => "/debate/ai-counter",
            Screen::AiClosing => "/debate/ai-closing",
            Screen::DebateFeedback => "/debate/feedback",
            Screen::InterviewFollowupQuestion => "/interview/q5",
            Screen::InterviewFeedback => "/interview/feedback",
            Screen::Home => "/",
        }
    }
}

/// Identifiers threaded from screen to screen via navigation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingMetadata {
    /// Debate or interview id the uploads are routed to.
    pub entity_id: String,
    /// Debate topic or interview question, when the flow carries one.
    pub topic: Option<String>,
    /// Debate position (PRO/CON), debate flows only.
    pub position: Option<String>,
    /// Client session id for log correlation.
    pub session_id: String,
}

impl RoutingMetadata {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            topic: None,
            position: None,
            session_id: format!("capture-{}", uuid::Uuid::new_v4()),
        }
    }
}

/// Explicit authentication context injected into each screen, replacing
/// ambient storage reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: String,
    /// Bearer token attached to API calls; absent for anonymous flows.
    pub token: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            token: None,
        }
    }
}
