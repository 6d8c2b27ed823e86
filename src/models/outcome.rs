use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::CatalogItem;

/// Why a pipeline run ended without a primary match
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Transport, auth, timeout or malformed response from the completion stage
    #[error("completion failed")]
    CompletionFailed,
    /// Transport, auth or timeout failure from the title search stage
    #[error("catalog search failed")]
    CatalogSearchFailed,
}

/// What a single pipeline run produced
///
/// `failure_reason` is set only when the run ended in error, in which case there is no
/// primary match and no related items. A clean "no match" has neither a primary nor a
/// failure reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationOutcome {
    pub recommended_title: Option<String>,
    pub primary: Option<CatalogItem>,
    pub related: Vec<CatalogItem>,
    pub failure_reason: Option<FailureReason>,
}

/// Assembles an outcome from the stage results
///
/// An error wins over everything else, and related items never outlive a missing primary.
pub fn aggregate(
    primary: Option<CatalogItem>,
    related: Vec<CatalogItem>,
    error: Option<FailureReason>,
) -> RecommendationOutcome {
    match (error, primary) {
        (Some(reason), _) => RecommendationOutcome {
            recommended_title: None,
            primary: None,
            related: Vec::new(),
            failure_reason: Some(reason),
        },
        (None, None) => RecommendationOutcome {
            recommended_title: None,
            primary: None,
            related: Vec::new(),
            failure_reason: None,
        },
        (None, Some(primary)) => RecommendationOutcome {
            recommended_title: None,
            primary: Some(primary),
            related,
            failure_reason: None,
        },
    }
}

impl RecommendationOutcome {
    pub fn with_recommended_title(mut self, title: impl Into<String>) -> Self {
        self.recommended_title = Some(title.into());
        self
    }

    /// True when the search ran cleanly but found nothing
    pub fn is_no_match(&self) -> bool {
        self.primary.is_none() && self.failure_reason.is_none()
    }
}

/// Identity of one `submit` call; later submissions get larger tokens
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct InvocationToken(pub u64);

impl Display for InvocationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a pipeline run currently is
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    BuildingPrompt,
    AwaitingCompletion,
    AwaitingPrimarySearch { title: String },
    AwaitingRelated { primary_id: u64 },
    Done { outcome: RecommendationOutcome },
    Errored { reason: FailureReason },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done { .. } | PipelineState::Errored { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::BuildingPrompt => "building_prompt",
            PipelineState::AwaitingCompletion => "awaiting_completion",
            PipelineState::AwaitingPrimarySearch { .. } => "awaiting_primary_search",
            PipelineState::AwaitingRelated { .. } => "awaiting_related",
            PipelineState::Done { .. } => "done",
            PipelineState::Errored { .. } => "errored",
        }
    }
}

/// Latest published state, tagged with the run that produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSnapshot {
    pub token: InvocationToken,
    #[serde(flatten)]
    pub state: PipelineState,
}

impl Default for PipelineSnapshot {
    fn default() -> Self {
        Self {
            token: InvocationToken::default(),
            state: PipelineState::Idle,
        }
    }
}
