use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ordering::Identified;

/// Speaker participation of a sub-contribution.
///
/// Field names follow the JSON sent by the presenter editor (`firstName`, `familyName`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Presenter {
    pub title: String,
    pub first_name: String,
    pub family_name: String,
    pub affiliation: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub fax: String,
}

impl Presenter {
    pub fn full_name(&self) -> String {
        [self.title.as_str(), self.first_name.as_str(), self.family_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<&str>>()
            .join(" ")
    }
}

/// A child item of a contribution; its position is its index in the parent's list
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SubContribution {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub duration_minutes: u32,
    /// Free-text speaker line
    #[serde(default)]
    pub speaker_text: String,
    #[serde(default)]
    pub presenters: Vec<Presenter>,
}

impl SubContribution {
    pub fn set_duration(&mut self, hours: u32, minutes: u32) {
        self.duration_minutes = hours * 60 + minutes;
    }

    /// Duration as (hours, minutes)
    pub fn duration(&self) -> (u32, u32) {
        (self.duration_minutes / 60, self.duration_minutes % 60)
    }
}

impl Identified for SubContribution {
    fn id(&self) -> &str {
        &self.id
    }
}
