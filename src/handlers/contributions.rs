use axum::{
    extract::{Extension, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::access::Gate;
use crate::app::AppState;
use crate::error::AppError;
use crate::handlers::web::{ContributionPath, ContributionTarget};
use crate::middleware::CurrentUser;
use crate::models::{Material, ProtectionMode};

/// Read-only view of a contribution for API clients
#[derive(Debug, Serialize, ToSchema)]
pub struct ContributionSummary {
    pub id: String,
    pub conference_id: String,
    pub title: String,
    pub description: String,
    pub start: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub session_id: Option<String>,
    pub track_id: Option<String>,
    /// Name of the contribution type, if any
    pub type_name: Option<String>,
    pub protection: ProtectionMode,
    pub withdrawn: bool,
    pub speakers: Vec<String>,
    /// Sub-contribution titles in display order
    pub sub_contributions: Vec<String>,
    pub materials: Vec<Material>,
}

#[utoipa::path(
    get,
    path = "/api/conferences/{conference_id}/contributions/{contribution_id}",
    tag = "contributions",
    params(ContributionPath),
    responses(
        (status = 200, description = "Contribution found", body = ContributionSummary),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Modification forbidden"),
        (status = 404, description = "Conference or contribution not found")
    )
)]
pub async fn get_contribution(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Json<ContributionSummary>, AppError> {
    let target = ContributionTarget::authorized(
        &state.store,
        &path,
        user,
        Gate::SessionCoordinatorOrReviewingStaff,
    )
    .await?;
    let conference = &target.conference;
    let contribution = target.contribution();

    Ok(Json(ContributionSummary {
        id: contribution.id.clone(),
        conference_id: conference.id.clone(),
        title: contribution.title.clone(),
        description: contribution.description.clone(),
        start: contribution.start,
        duration_minutes: contribution.duration_minutes,
        session_id: contribution.session_id.clone(),
        track_id: contribution.track_id.clone(),
        type_name: contribution
            .type_id
            .as_deref()
            .and_then(|id| conference.contribution_type(id))
            .map(|t| t.name.clone()),
        protection: contribution.protection,
        withdrawn: contribution.is_withdrawn(),
        speakers: contribution.speakers.iter().map(|p| p.full_name()).collect(),
        sub_contributions: contribution
            .sub_contributions
            .iter()
            .map(|sc| sc.title.clone())
            .collect(),
        materials: contribution.materials.clone(),
    }))
}
