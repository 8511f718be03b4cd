use serde::Deserialize;
use utoipa::IntoParams;

use crate::access::{AccessContext, Gate};
use crate::error::AppError;
use crate::models::{Conference, Contribution, Principal};
use crate::store::Store;
use crate::urls::ContributionUrls;

/// Path parameters shared by every contribution page
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ContributionPath {
    /// Conference ID
    pub conference_id: String,
    /// Contribution ID within the conference
    pub contribution_id: String,
}

/// The conference document holding the requested contribution, loaded for one request.
///
/// Handlers mutate this copy and write it back with [`ContributionTarget::save`].
pub struct ContributionTarget {
    pub conference: Conference,
    pub user: Principal,
    index: usize,
}

impl ContributionTarget {
    pub async fn load(store: &Store, path: &ContributionPath, user: Principal) -> Result<Self, AppError> {
        let conference = store
            .load_conference(&path.conference_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Conference {}", path.conference_id)))?;
        let index = conference
            .contribution_position(&path.contribution_id)
            .ok_or_else(|| AppError::NotFound(format!("Contribution {}", path.contribution_id)))?;
        Ok(ContributionTarget {
            conference,
            user,
            index,
        })
    }

    /// Load and check `gate` in one step
    pub async fn authorized(
        store: &Store,
        path: &ContributionPath,
        user: Principal,
        gate: Gate,
    ) -> Result<Self, AppError> {
        let target = Self::load(store, path, user).await?;
        target.authorize(gate)?;
        Ok(target)
    }

    pub fn contribution(&self) -> &Contribution {
        &self.conference.contributions[self.index]
    }

    pub fn contribution_mut(&mut self) -> &mut Contribution {
        &mut self.conference.contributions[self.index]
    }

    pub fn access(&self) -> AccessContext<'_> {
        AccessContext::new(&self.user, &self.conference, self.contribution())
    }

    pub fn authorize(&self, gate: Gate) -> Result<(), AppError> {
        if let Err(e) = self.access().check(gate) {
            tracing::warn!(
                "User {} denied {:?} on contribution {} of {}",
                self.user.id,
                gate,
                self.contribution().id,
                self.conference.id
            );
            return Err(e.into());
        }
        Ok(())
    }

    pub fn urls(&self) -> ContributionUrls {
        ContributionUrls::new(&self.conference.id, &self.contribution().id)
    }

    pub fn is_owner_closed(&self) -> bool {
        self.conference.is_owner_closed(self.contribution())
    }

    /// Rejects edits of a withdrawn contribution
    pub fn ensure_active(&self) -> Result<(), AppError> {
        if self.contribution().is_withdrawn() {
            return Err(AppError::Domain(
                "The contribution has been withdrawn and cannot be modified.".to_string(),
            ));
        }
        Ok(())
    }

    /// Records a change in the event log and bumps the modification time
    pub fn touch(&mut self, module: &str, subject: &str) {
        self.contribution_mut().notify_modification();
        let user = self.user.id.clone();
        self.conference.log_action(module, subject, &user);
    }

    pub async fn save(&self, store: &Store) -> Result<(), AppError> {
        store.save_conference(&self.conference).await?;
        Ok(())
    }
}
