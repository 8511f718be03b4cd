use askama::Template;
use axum::extract::{Extension, Form, Path, State};
use axum::response::Response;

use super::{render, see_other, ContributionPath, ContributionTarget, Pairs};
use crate::access::Gate;
use crate::app::AppState;
use crate::error::AppError;
use crate::forms::{RequestParams, SubContribAction, SubContributionInput, ValidationError};
use crate::middleware::CurrentUser;
use crate::models::Principal;
use crate::ordering;

struct PositionOption {
    value: usize,
    selected: bool,
}

struct SubContributionItem {
    id: String,
    position: usize,
    title: String,
    duration: String,
    speakers: String,
    targets: Vec<PositionOption>,
}

#[derive(Template)]
#[template(path = "subcontributions.html")]
struct SubContributionsTemplate {
    title: String,
    items: Vec<SubContributionItem>,
    base_url: String,
}

pub async fn subcontributions_page(
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
    let contribution = target.contribution();
    let count = contribution.sub_contributions.len();

    let items: Vec<SubContributionItem> = contribution
        .sub_contributions
        .iter()
        .enumerate()
        .map(|(position, sc)| {
            let (hours, minutes) = sc.duration();
            let mut speakers: Vec<String> = sc.presenters.iter().map(|p| p.full_name()).collect();
            if !sc.speaker_text.trim().is_empty() {
                speakers.push(sc.speaker_text.trim().to_string());
            }
            SubContributionItem {
                id: sc.id.clone(),
                position,
                title: sc.title.clone(),
                duration: format!("{}h{:02}", hours, minutes),
                speakers: speakers.join(", "),
                targets: (0..count)
                    .map(|value| PositionOption {
                        value,
                        selected: value == position,
                    })
                    .collect(),
            }
        })
        .collect();

    render(&SubContributionsTemplate {
        title: contribution.title.clone(),
        items,
        base_url: target.urls().modification(),
    })
}

pub async fn subcontribution_actions(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    let action = SubContribAction::from_params(&params)?;
    let back = target.urls().page("subcontributions");

    match action {
        None | Some(SubContribAction::Cancel) => return Ok(see_other(&back)),
        Some(SubContribAction::Delete(ids)) => {
            let removed =
                ordering::delete_batch(&mut target.contribution_mut().sub_contributions, ids.as_slice())?;
            let titles: Vec<String> = removed.iter().map(|sc| sc.title.clone()).collect();
            target.touch(
                "Timetable/SubContribution",
                &format!("Deleted subcontributions: {}", titles.join(", ")),
            );
            tracing::info!(
                "Deleted {} subcontribution(s) of contribution {} in {}",
                removed.len(),
                target.contribution().id,
                target.conference.id
            );
        }
        Some(SubContribAction::Move { old, new }) => {
            ordering::move_item(&mut target.contribution_mut().sub_contributions, old, new)?;
            target.touch(
                "Timetable/SubContribution",
                &format!("Moved subcontribution from position {} to {}", old, new),
            );
        }
    }

    target.save(&state.store).await?;
    Ok(see_other(&back))
}

#[derive(Template)]
#[template(path = "subcontribution_new.html")]
struct NewSubContributionTemplate {
    title: String,
    action_url: String,
    back_url: String,
}

pub async fn new_subcontribution(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Response, AppError> {
    let target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    render(&NewSubContributionTemplate {
        title: target.contribution().title.clone(),
        action_url: target.urls().page("subcontributions/create"),
        back_url: target.urls().page("subcontributions"),
    })
}

pub async fn create_subcontribution(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    let back = target.urls().page("subcontributions");
    if !params.has("ok") {
        return Ok(see_other(&back));
    }

    let input = SubContributionInput::from_params(&params)?;
    target.ensure_active()?;

    let sub_contribution = target.contribution_mut().new_sub_contribution();
    sub_contribution.title = input.title;
    sub_contribution.description = input.description;
    sub_contribution.keywords = input.keywords;
    sub_contribution.set_duration(input.hours, input.minutes);
    sub_contribution.speaker_text = input.speaker_text;
    sub_contribution.presenters = input.presenters;
    let subject = format!("Create new subcontribution: {}", sub_contribution.title);

    target.touch("Timetable/SubContribution", &subject);
    target.save(&state.store).await?;
    tracing::info!(
        "Created subcontribution in contribution {} of {}",
        target.contribution().id,
        target.conference.id
    );
    Ok(see_other(&back))
}

async fn step(
    state: AppState,
    user: Principal,
    path: ContributionPath,
    body: Pairs,
    up: bool,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    let id = params
        .get_trimmed("subContId")
        .ok_or_else(|| ValidationError::new("subContId", "Please select a subcontribution"))?
        .to_string();

    let list = &mut target.contribution_mut().sub_contributions;
    let moved = if up {
        ordering::move_up(list, &id)?
    } else {
        ordering::move_down(list, &id)?
    };
    if moved {
        target.touch(
            "Timetable/SubContribution",
            &format!("Moved subcontribution {} {}", id, if up { "up" } else { "down" }),
        );
        target.save(&state.store).await?;
    }
    Ok(see_other(&target.urls().page("subcontributions")))
}

pub async fn move_up(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    step(state, user, path, body, true).await
}

pub async fn move_down(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    step(state, user, path, body, false).await
}
