use askama::Template;
use axum::extract::{Extension, Form, Path, State};
use axum::response::Response;

use super::overview::{format_start, session_options, OptionItem};
use super::{closed_page, render, see_other, ContributionPath, ContributionTarget, Pairs};
use crate::access::Gate;
use crate::app::AppState;
use crate::error::AppError;
use crate::forms::{ContributionDataInput, MoveDestination, RequestParams};
use crate::middleware::CurrentUser;
use crate::urls;

#[derive(Template)]
#[template(path = "tools.html")]
struct ToolsTemplate {
    title: String,
    base_url: String,
}

pub async fn tools_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Response, AppError> {
    let target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    if target.is_owner_closed() {
        return closed_page(&target);
    }
    render(&ToolsTemplate {
        title: target.contribution().title.clone(),
        base_url: target.urls().modification(),
    })
}

struct FieldItem {
    id: String,
    name: String,
    value: String,
}

#[derive(Template)]
#[template(path = "edit_data.html")]
struct EditDataTemplate {
    title: String,
    description: String,
    date_time: String,
    timezone: String,
    duration: u32,
    types: Vec<OptionItem>,
    fields: Vec<FieldItem>,
    action_url: String,
}

pub async fn edit_data_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Response, AppError> {
    let target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    if target.is_owner_closed() {
        return closed_page(&target);
    }

    let conference = &target.conference;
    let contribution = target.contribution();
    let date_time = match contribution.start {
        Some(_) => format_start(conference, contribution),
        None => String::new(),
    };
    render(&EditDataTemplate {
        title: contribution.title.clone(),
        description: contribution.description.clone(),
        date_time,
        timezone: conference.timezone.clone(),
        duration: contribution.duration_minutes,
        types: conference
            .contribution_types
            .iter()
            .map(|t| OptionItem {
                id: t.id.clone(),
                label: t.name.clone(),
                selected: contribution.type_id.as_deref() == Some(t.id.as_str()),
            })
            .collect(),
        fields: conference
            .abstract_fields
            .iter()
            .filter(|f| f.active)
            .map(|f| FieldItem {
                id: f.id.clone(),
                name: f.name.clone(),
                value: contribution.field(&f.id).to_string(),
            })
            .collect(),
        action_url: target.urls().page("data"),
    })
}

pub async fn update_data(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    if params.has("cancel") {
        return Ok(see_other(&target.urls().modification()));
    }

    let input = ContributionDataInput::from_params(&params, &target.conference.utc_offset())?;
    target.ensure_active()?;
    if let Some(type_id) = input.type_id.as_deref() {
        if target.conference.contribution_type(type_id).is_none() {
            return Err(AppError::NotFound(format!("Contribution type {}", type_id)));
        }
    }
    let known_fields: Vec<String> = target
        .conference
        .abstract_fields
        .iter()
        .map(|f| f.id.clone())
        .collect();

    let contribution = target.contribution_mut();
    if let Some(title) = input.title {
        contribution.title = title;
    }
    if let Some(description) = input.description {
        contribution.description = description;
    }
    if input.start.is_some() {
        contribution.start = input.start;
    }
    if let Some(minutes) = input.duration_minutes {
        contribution.duration_minutes = minutes;
    }
    contribution.type_id = input.type_id;
    for (id, value) in input.fields {
        if known_fields.contains(&id) {
            contribution.fields.insert(id, value);
        }
    }

    let subject = format!("Modified contribution data: {}", target.contribution().title);
    target.touch("Timetable/Contribution", &subject);
    target.save(&state.store).await?;
    tracing::info!(
        "Updated data of contribution {} in {}",
        target.contribution().id,
        target.conference.id
    );
    Ok(see_other(&target.urls().modification()))
}

pub async fn set_track(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::BaseModification).await?;

    let track_id = params.get_trimmed("selTrack").map(str::to_string);
    if let Some(id) = track_id.as_deref() {
        if target.conference.track(id).is_none() {
            return Err(AppError::NotFound(format!("Track {}", id)));
        }
    }
    target.contribution_mut().track_id = track_id;
    target.touch("Timetable/Contribution", "Changed contribution track");
    target.save(&state.store).await?;
    Ok(see_other(&target.urls().modification()))
}

pub async fn set_session(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::BaseModification).await?;

    let session_id = params.get_trimmed("selSession").map(str::to_string);
    if let Some(id) = session_id.as_deref() {
        if target.conference.session(id).is_none() {
            return Err(AppError::NotFound(format!("Session {}", id)));
        }
    }
    target.contribution_mut().session_id = session_id;
    target.touch("Timetable/Contribution", "Changed contribution session");
    target.save(&state.store).await?;
    Ok(see_other(&target.urls().modification()))
}

#[derive(Template)]
#[template(path = "deletion.html")]
struct DeletionTemplate {
    title: String,
    action_url: String,
}

fn deletion_page(target: &ContributionTarget) -> Result<Response, AppError> {
    render(&DeletionTemplate {
        title: target.contribution().title.clone(),
        action_url: target.urls().page("delete"),
    })
}

pub async fn delete_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Response, AppError> {
    let target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    deletion_page(&target)
}

pub async fn delete_contribution(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;

    if params.has("cancel") {
        return Ok(see_other(&target.urls().page("tools")));
    }
    if !params.has("confirm") {
        return deletion_page(&target);
    }

    let conference_id = target.conference.id.clone();
    let redirect = match target.contribution().session_id.as_deref() {
        Some(session_id) => urls::session_management(&conference_id, session_id),
        None => urls::conference_management(&conference_id),
    };
    let contribution_id = target.contribution().id.clone();
    let subject = format!("Deleted contribution: {}", target.contribution().title);
    let user_id = target.user.id.clone();

    target.conference.remove_contribution(&contribution_id);
    target.conference.log_action("Timetable/Contribution", &subject, &user_id);
    target.save(&state.store).await?;
    tracing::info!("Deleted contribution {} of {}", contribution_id, conference_id);
    Ok(see_other(&redirect))
}

#[derive(Template)]
#[template(path = "move.html")]
struct MoveTemplate {
    title: String,
    in_conference: bool,
    sessions: Vec<OptionItem>,
    action_url: String,
}

pub async fn move_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Response, AppError> {
    let target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    let contribution = target.contribution();
    render(&MoveTemplate {
        title: contribution.title.clone(),
        in_conference: contribution.session_id.is_none(),
        sessions: session_options(&target.conference, contribution),
        action_url: target.urls().page("move"),
    })
}

pub async fn perform_move(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;

    let session_id = match MoveDestination::from_params(&params)? {
        MoveDestination::Undefined => {
            return Err(AppError::Domain(
                "Undefined destination for the contribution.".to_string(),
            ))
        }
        MoveDestination::Conference => None,
        MoveDestination::Session(id) => {
            if target.conference.session(&id).is_none() {
                return Err(AppError::NotFound(format!("Session {}", id)));
            }
            Some(id)
        }
    };
    target.ensure_active()?;

    let owner = session_id.clone().unwrap_or_else(|| "conference".to_string());
    target.contribution_mut().session_id = session_id;
    let subject = format!("Moved contribution {} to {}", target.contribution().title, owner);
    target.touch("Timetable/Contribution", &subject);
    target.save(&state.store).await?;
    tracing::info!(
        "Moved contribution {} of {} to {}",
        target.contribution().id,
        target.conference.id,
        owner
    );
    Ok(see_other(&target.urls().page("tools")))
}
