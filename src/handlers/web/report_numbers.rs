use askama::Template;
use axum::extract::{Extension, Form, Path, Query, State};
use axum::response::Response;

use super::{render, see_other, ContributionPath, ContributionTarget, Pairs};
use crate::access::Gate;
use crate::app::AppState;
use crate::error::AppError;
use crate::forms::{report_number_positions, RequestParams, ValidationError};
use crate::middleware::CurrentUser;

#[derive(Template)]
#[template(path = "report_number_edit.html")]
struct ReportNumberEditTemplate {
    title: String,
    system: String,
    action_url: String,
    back_url: String,
}

pub async fn edit_report_number(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Query(query): Query<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(query);
    let target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::BaseModification).await?;
    let urls = target.urls();

    match params.get_trimmed("reportNumberSystem") {
        Some(system) => render(&ReportNumberEditTemplate {
            title: target.contribution().title.clone(),
            system: system.to_string(),
            action_url: urls.page("report-numbers"),
            back_url: urls.report_numbers(),
        }),
        None => Ok(see_other(&urls.report_numbers())),
    }
}

pub async fn add_report_number(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::BaseModification).await?;
    let back = target.urls().report_numbers();

    let (system, number) = match (
        params.get_trimmed("reportNumberSystem"),
        params.get_trimmed("reportNumber"),
    ) {
        (Some(system), Some(number)) => (system.to_string(), number.to_string()),
        _ => return Ok(see_other(&back)),
    };
    if !state.config.accepts_report_number_system(&system) {
        return Err(ValidationError::new(
            "reportNumberSystem",
            format!("Unknown report number system: {}", system),
        )
        .into());
    }

    if target.contribution_mut().report_numbers.add(&system, &number) {
        target.touch(
            "Timetable/Contribution",
            &format!("Added report number {} ({})", number, system),
        );
        target.save(&state.store).await?;
        tracing::info!(
            "Added report number {}:{} to contribution {} of {}",
            system,
            number,
            target.contribution().id,
            target.conference.id
        );
    }
    Ok(see_other(&back))
}

pub async fn remove_report_numbers(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::BaseModification).await?;
    let positions = report_number_positions(&params)?;

    let removed = target
        .contribution_mut()
        .report_numbers
        .remove_positions(&positions);
    if removed > 0 {
        target.touch(
            "Timetable/Contribution",
            &format!("Removed {} report number(s)", removed),
        );
        target.save(&state.store).await?;
    }
    Ok(see_other(&target.urls().report_numbers()))
}
