use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Review stages enabled for a conference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewChoice {
    /// Referee only, no content or layout stage
    #[default]
    NoReviewing,
    ContentReviewing,
    LayoutReviewing,
    ContentAndLayoutReviewing,
}

impl ReviewChoice {
    pub const ALL: [ReviewChoice; 4] = [
        ReviewChoice::NoReviewing,
        ReviewChoice::ContentReviewing,
        ReviewChoice::LayoutReviewing,
        ReviewChoice::ContentAndLayoutReviewing,
    ];

    pub fn has_content_review(self) -> bool {
        matches!(
            self,
            ReviewChoice::ContentReviewing | ReviewChoice::ContentAndLayoutReviewing
        )
    }

    pub fn has_layout_review(self) -> bool {
        matches!(
            self,
            ReviewChoice::LayoutReviewing | ReviewChoice::ContentAndLayoutReviewing
        )
    }
}

/// Conference-wide paper reviewing settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfPaperReview {
    #[serde(default)]
    pub choice: ReviewChoice,
    /// Paper review managers
    #[serde(default)]
    pub managers: Vec<UserId>,
}

impl ConfPaperReview {
    pub fn is_paper_review_manager(&self, user: &str) -> bool {
        self.managers.iter().any(|m| m == user)
    }
}

/// Review workflow role assignments of a single contribution
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReviewManager {
    pub referee: Option<UserId>,
    pub editor: Option<UserId>,
    #[serde(default)]
    pub reviewers: Vec<UserId>,
    /// Whether the author submitted material for the current review round
    #[serde(default)]
    pub last_review_author_submitted: bool,
}

impl ReviewManager {
    pub fn has_referee(&self) -> bool {
        self.referee.is_some()
    }

    pub fn is_referee(&self, user: &str) -> bool {
        self.referee.as_deref() == Some(user)
    }

    pub fn has_editor(&self) -> bool {
        self.editor.is_some()
    }

    pub fn is_editor(&self, user: &str) -> bool {
        self.editor.as_deref() == Some(user)
    }

    pub fn is_reviewer(&self, user: &str) -> bool {
        self.reviewers.iter().any(|r| r == user)
    }
}
