//! Paths used for redirects and links.
//!
//! Conference and session management pages belong to the hosting application; only
//! their paths are built here.

pub fn conference_management(conference_id: &str) -> String {
    format!("/conferences/{}/manage", conference_id)
}

pub fn session_management(conference_id: &str, session_id: &str) -> String {
    format!("/conferences/{}/manage/sessions/{}", conference_id, session_id)
}

pub fn event_protection(conference_id: &str) -> String {
    format!("/conferences/{}/manage/protection", conference_id)
}

/// Builder for the pages of one contribution
#[derive(Debug, Clone)]
pub struct ContributionUrls {
    base: String,
}

impl ContributionUrls {
    pub fn new(conference_id: &str, contribution_id: &str) -> Self {
        ContributionUrls {
            base: format!(
                "/conferences/{}/contributions/{}/modify",
                conference_id, contribution_id
            ),
        }
    }

    pub fn modification(&self) -> String {
        self.base.clone()
    }

    /// Page below `/modify`, e.g. `page("tools")`
    pub fn page(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    pub fn report_numbers(&self) -> String {
        format!("{}#reportNumber", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_urls() {
        let urls = ContributionUrls::new("c1", "7");
        assert_eq!(urls.modification(), "/conferences/c1/contributions/7/modify");
        assert_eq!(
            urls.page("subcontributions"),
            "/conferences/c1/contributions/7/modify/subcontributions"
        );
        assert_eq!(
            urls.report_numbers(),
            "/conferences/c1/contributions/7/modify#reportNumber"
        );
        assert_eq!(session_management("c1", "s1"), "/conferences/c1/manage/sessions/s1");
    }
}
