use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reviewing state from which a material is locked for author submissions
pub const REVIEWING_STATE_LOCKED: u8 = 3;

/// A link or file reference attached to a material
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

/// A file/resource collection attached to a contribution
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Material {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Factory key for special materials (paper, slides, ...); None for additional materials
    pub kind: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// 1 = not submitted, 2 = submitted, 3 = under review, 4 = reviewed
    #[serde(default = "default_reviewing_state")]
    pub reviewing_state: u8,
}

fn default_reviewing_state() -> u8 {
    1
}

impl Material {
    pub fn new(id: &str, title: &str, kind: Option<&str>) -> Self {
        Material {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            kind: kind.map(str::to_string),
            resources: Vec::new(),
            reviewing_state: default_reviewing_state(),
        }
    }

    pub fn is_locked_for_review(&self) -> bool {
        self.reviewing_state >= REVIEWING_STATE_LOCKED
    }
}
