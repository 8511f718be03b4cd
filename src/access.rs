//! Authorization gates for contribution modification.
//!
//! Each predicate is a pure function of the acting user, the conference and the
//! contribution. Gates OR the predicates together; when a gate fails the request may
//! still proceed if the user has plain modification rights on the contribution.

use thiserror::Error;

use crate::models::{Conference, Contribution, CoordinatorPrivilege, Material, Principal};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("you are not allowed to modify this contribution")]
    Forbidden,
    #[error("you are not allowed to manage this event")]
    EventForbidden,
}

/// Named composition of role predicates guarding a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Only the base modification check
    BaseModification,
    SessionCoordinator,
    ReviewingStaff,
    SessionCoordinatorOrReviewingStaff,
}

#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    pub user: &'a Principal,
    pub conference: &'a Conference,
    pub contribution: &'a Contribution,
}

impl<'a> AccessContext<'a> {
    pub fn new(user: &'a Principal, conference: &'a Conference, contribution: &'a Contribution) -> Self {
        AccessContext {
            user,
            conference,
            contribution,
        }
    }

    /// Coordinator of the contribution's session, with the event granting coordinators
    /// the right to modify contributions
    pub fn is_session_coordinator(&self) -> bool {
        let Some(session_id) = self.contribution.session_id.as_deref() else {
            return false;
        };
        match self.conference.session(session_id) {
            Some(session) => {
                session.is_coordinator(&self.user.id)
                    && self
                        .conference
                        .has_coordinator_privilege(CoordinatorPrivilege::ManageContributions)
            }
            None => false,
        }
    }

    pub fn is_paper_review_manager(&self) -> bool {
        self.conference
            .paper_review
            .is_paper_review_manager(&self.user.id)
    }

    pub fn is_referee(&self) -> bool {
        let review = &self.contribution.review;
        review.has_referee() && review.is_referee(&self.user.id)
    }

    /// Editors only count when the conference reviews layout
    pub fn is_editor(&self) -> bool {
        let review = &self.contribution.review;
        self.conference.paper_review.choice.has_layout_review()
            && review.has_editor()
            && review.is_editor(&self.user.id)
    }

    /// Reviewers only count when asked for and when the conference reviews content
    pub fn is_reviewer(&self, including_content_reviewer: bool) -> bool {
        including_content_reviewer
            && self.conference.paper_review.choice.has_content_review()
            && self.contribution.review.is_reviewer(&self.user.id)
    }

    pub fn is_reviewing_staff(&self, including_content_reviewer: bool) -> bool {
        self.is_paper_review_manager()
            || self.is_referee()
            || self.is_editor()
            || self.is_reviewer(including_content_reviewer)
    }

    /// Base modification rights: event manager or contribution manager
    pub fn can_modify(&self) -> bool {
        self.conference.is_manager(self.user) || self.contribution.is_manager(self.user)
    }

    /// Whether the gate's own predicates pass, without the base fallback
    pub fn passes(&self, gate: Gate) -> bool {
        match gate {
            Gate::BaseModification => false,
            Gate::SessionCoordinator => self.is_session_coordinator(),
            Gate::ReviewingStaff => self.is_reviewing_staff(true),
            Gate::SessionCoordinatorOrReviewingStaff => {
                self.is_session_coordinator() || self.is_reviewing_staff(true)
            }
        }
    }

    pub fn allows(&self, gate: Gate) -> bool {
        self.passes(gate) || self.can_modify()
    }

    pub fn check(&self, gate: Gate) -> Result<(), AccessError> {
        if self.allows(gate) {
            Ok(())
        } else {
            Err(AccessError::Forbidden)
        }
    }

    /// Material submission: submitters while the material is not yet under review,
    /// reviewing staff (content reviewers excluded) once the author has submitted,
    /// everyone else needs base modification rights.
    pub fn check_material_submission(&self, material: Option<&Material>) -> Result<(), AccessError> {
        let open_for_submitter = material.map(|m| !m.is_locked_for_review()).unwrap_or(true);
        if self.contribution.is_submitter(self.user) && open_for_submitter {
            return Ok(());
        }
        if self.is_reviewing_staff(false) && self.contribution.review.last_review_author_submitted {
            return Ok(());
        }
        self.check(Gate::BaseModification)
    }
}

/// Event-level management (the protection form)
pub fn check_event_management(user: &Principal, conference: &Conference) -> Result<(), AccessError> {
    if conference.is_manager(user) {
        Ok(())
    } else {
        Err(AccessError::EventForbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewChoice, Session};

    const USER: &str = "u1";

    /// Roles held by the acting user
    #[derive(Debug, Clone, Copy)]
    struct Roles {
        coordinator: bool,
        prm: bool,
        referee: bool,
        editor: bool,
        reviewer: bool,
    }

    impl Roles {
        fn from_bits(bits: u8) -> Self {
            Roles {
                coordinator: bits & 1 != 0,
                prm: bits & 2 != 0,
                referee: bits & 4 != 0,
                editor: bits & 8 != 0,
                reviewer: bits & 16 != 0,
            }
        }
    }

    /// The acting user when they hold the role, someone else otherwise
    fn holder(has_role: bool) -> String {
        if has_role { USER.to_string() } else { "other".to_string() }
    }

    fn fixture(roles: Roles, choice: ReviewChoice) -> (Principal, Conference, Contribution) {
        let user = Principal::user(USER, "Acting User");
        let mut conference = Conference::new("conf", "Conference");
        conference.paper_review.choice = choice;
        conference
            .coordinator_privileges
            .insert(CoordinatorPrivilege::ManageContributions);
        conference.sessions.push(Session {
            id: "s1".into(),
            title: "Session".into(),
            closed: false,
            coordinators: vec![holder(roles.coordinator)],
        });
        if roles.prm {
            conference.paper_review.managers.push(USER.into());
        }

        let mut contribution = Contribution::new("c1", "Talk");
        contribution.session_id = Some("s1".into());
        contribution.review.referee = Some(holder(roles.referee));
        contribution.review.editor = Some(holder(roles.editor));
        if roles.reviewer {
            contribution.review.reviewers.push(USER.into());
        }
        (user, conference, contribution)
    }

    #[test]
    fn test_or_composition_over_all_roles_and_choices() {
        for choice in ReviewChoice::ALL {
            for bits in 0..32u8 {
                let roles = Roles::from_bits(bits);
                let (user, conference, contribution) = fixture(roles, choice);
                let ctx = AccessContext::new(&user, &conference, &contribution);

                let staff = roles.prm
                    || roles.referee
                    || (roles.editor && choice.has_layout_review())
                    || (roles.reviewer && choice.has_content_review());
                let expected = roles.coordinator || staff;

                assert_eq!(
                    ctx.passes(Gate::SessionCoordinatorOrReviewingStaff),
                    expected,
                    "roles {:?}, choice {:?}",
                    roles,
                    choice
                );
                assert_eq!(ctx.passes(Gate::ReviewingStaff), staff);
                assert_eq!(ctx.passes(Gate::SessionCoordinator), roles.coordinator);
                // Nobody here is a manager, so the gate result is final
                assert_eq!(ctx.check(Gate::SessionCoordinatorOrReviewingStaff).is_ok(), expected);
            }
        }
    }

    #[test]
    fn test_editor_requires_layout_review() {
        let editor = Roles::from_bits(8);
        for (choice, allowed) in [
            (ReviewChoice::NoReviewing, false),
            (ReviewChoice::ContentReviewing, false),
            (ReviewChoice::LayoutReviewing, true),
            (ReviewChoice::ContentAndLayoutReviewing, true),
        ] {
            let (user, conference, contribution) = fixture(editor, choice);
            let ctx = AccessContext::new(&user, &conference, &contribution);
            assert_eq!(ctx.is_editor(), allowed, "choice {:?}", choice);
        }
    }

    #[test]
    fn test_reviewer_requires_content_review_and_flag() {
        let reviewer = Roles::from_bits(16);
        let (user, conference, contribution) =
            fixture(reviewer, ReviewChoice::ContentAndLayoutReviewing);
        let ctx = AccessContext::new(&user, &conference, &contribution);
        assert!(ctx.is_reviewer(true));
        assert!(!ctx.is_reviewer(false));
        assert!(!ctx.is_reviewing_staff(false));

        let (user, conference, contribution) = fixture(reviewer, ReviewChoice::LayoutReviewing);
        let ctx = AccessContext::new(&user, &conference, &contribution);
        assert!(!ctx.is_reviewer(true));
    }

    #[test]
    fn test_coordinator_needs_privilege() {
        let coordinator = Roles::from_bits(1);
        let (user, mut conference, contribution) = fixture(coordinator, ReviewChoice::NoReviewing);
        conference.coordinator_privileges.clear();
        let ctx = AccessContext::new(&user, &conference, &contribution);
        assert!(!ctx.is_session_coordinator());
    }

    #[test]
    fn test_coordinator_without_session() {
        let coordinator = Roles::from_bits(1);
        let (user, conference, mut contribution) = fixture(coordinator, ReviewChoice::NoReviewing);
        contribution.session_id = None;
        let ctx = AccessContext::new(&user, &conference, &contribution);
        assert!(!ctx.is_session_coordinator());
    }

    #[test]
    fn test_fallback_to_base_modification() {
        let (user, mut conference, contribution) =
            fixture(Roles::from_bits(0), ReviewChoice::NoReviewing);
        {
            let ctx = AccessContext::new(&user, &conference, &contribution);
            assert_eq!(ctx.check(Gate::SessionCoordinator), Err(AccessError::Forbidden));
            assert_eq!(ctx.check(Gate::BaseModification), Err(AccessError::Forbidden));
        }

        conference.managers.push(USER.into());
        let ctx = AccessContext::new(&user, &conference, &contribution);
        assert!(!ctx.passes(Gate::SessionCoordinator));
        assert_eq!(ctx.check(Gate::SessionCoordinator), Ok(()));
        assert_eq!(ctx.check(Gate::BaseModification), Ok(()));
    }

    #[test]
    fn test_contribution_manager_can_modify() {
        let (user, conference, mut contribution) =
            fixture(Roles::from_bits(0), ReviewChoice::NoReviewing);
        contribution.managers.push(USER.into());
        let ctx = AccessContext::new(&user, &conference, &contribution);
        assert!(ctx.can_modify());
    }

    #[test]
    fn test_material_submission() {
        let (user, conference, mut contribution) =
            fixture(Roles::from_bits(0), ReviewChoice::ContentAndLayoutReviewing);
        contribution.submitters.push(USER.into());

        let mut material = Material::new("paper", "Paper", Some("paper"));
        {
            let ctx = AccessContext::new(&user, &conference, &contribution);
            assert!(ctx.check_material_submission(None).is_ok());
            assert!(ctx.check_material_submission(Some(&material)).is_ok());
            material.reviewing_state = 3;
            assert_eq!(
                ctx.check_material_submission(Some(&material)),
                Err(AccessError::Forbidden)
            );
        }

        // Referee after the author submitted
        let (user, conference, mut contribution) =
            fixture(Roles::from_bits(4), ReviewChoice::ContentAndLayoutReviewing);
        contribution.review.last_review_author_submitted = true;
        let ctx = AccessContext::new(&user, &conference, &contribution);
        assert!(ctx.check_material_submission(Some(&material)).is_ok());

        // Content reviewers never qualify through the staff rule
        let (user, conference, mut contribution) =
            fixture(Roles::from_bits(16), ReviewChoice::ContentAndLayoutReviewing);
        contribution.review.last_review_author_submitted = true;
        let ctx = AccessContext::new(&user, &conference, &contribution);
        assert_eq!(
            ctx.check_material_submission(Some(&material)),
            Err(AccessError::Forbidden)
        );
    }

    #[test]
    fn test_event_management() {
        let user = Principal::user(USER, "User");
        let mut conference = Conference::new("conf", "Conference");
        assert_eq!(
            check_event_management(&user, &conference),
            Err(AccessError::EventForbidden)
        );
        conference.managers.push(USER.into());
        assert!(check_event_management(&user, &conference).is_ok());
    }
}
