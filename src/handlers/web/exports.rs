use axum::extract::{Extension, Path, State};
use axum::response::{IntoResponse, Response};

use super::{ContributionPath, ContributionTarget};
use crate::access::Gate;
use crate::app::AppState;
use crate::error::AppError;
use crate::export;
use crate::middleware::CurrentUser;

pub async fn contribution_xml(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Response, AppError> {
    let target = ContributionTarget::authorized(
        &state.store,
        &path,
        user,
        Gate::SessionCoordinatorOrReviewingStaff,
    )
    .await?;
    let payload = export::contribution_xml(&target.conference, target.contribution())?;
    tracing::info!(
        "Exported contribution {} of {} as XML ({} bytes)",
        target.contribution().id,
        target.conference.id,
        payload.body.len()
    );
    Ok(payload.into_response())
}

pub async fn contribution_pdf(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Response, AppError> {
    let target = ContributionTarget::authorized(
        &state.store,
        &path,
        user,
        Gate::SessionCoordinatorOrReviewingStaff,
    )
    .await?;
    let payload = export::contribution_pdf(
        state.documents.as_ref(),
        &target.conference,
        target.contribution(),
    )?;
    tracing::info!(
        "Exported contribution {} of {} as PDF ({} bytes)",
        target.contribution().id,
        target.conference.id,
        payload.body.len()
    );
    Ok(payload.into_response())
}
