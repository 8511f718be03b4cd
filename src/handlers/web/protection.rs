use askama::Template;
use axum::extract::{Extension, Form, Path, State};
use axum::response::Response;
use serde::Deserialize;

use super::overview::OptionItem;
use super::{render, see_other, Pairs};
use crate::access::check_event_management;
use crate::app::AppState;
use crate::error::AppError;
use crate::forms::{EventProtectionForm, PrivilegeField, RequestParams};
use crate::middleware::CurrentUser;
use crate::models::{Conference, Principal, ProtectionMode};
use crate::urls;

#[derive(Debug, Deserialize)]
pub struct EventPath {
    pub conference_id: String,
}

#[derive(Template)]
#[template(path = "event_protection.html")]
struct EventProtectionTemplate {
    conference_title: String,
    modes: Vec<OptionItem>,
    protected: bool,
    acl: Vec<String>,
    access_key: String,
    managers: Vec<String>,
    registration_managers: Vec<String>,
    privileges: Vec<PrivilegeField>,
    action_url: String,
}

impl EventProtectionTemplate {
    fn new(conference: &Conference, form: EventProtectionForm) -> Self {
        let modes = [
            ProtectionMode::Inheriting,
            ProtectionMode::Protected,
            ProtectionMode::Public,
        ]
        .iter()
        .map(|mode| OptionItem {
            id: mode.as_str().to_string(),
            label: mode.as_str().to_string(),
            selected: *mode == form.protection_mode,
        })
        .collect();
        EventProtectionTemplate {
            conference_title: conference.title.clone(),
            modes,
            protected: form.protection_mode == ProtectionMode::Protected,
            acl: form.acl_values(),
            access_key: form.access_key.clone().unwrap_or_default(),
            managers: form.managers,
            registration_managers: form.registration_managers,
            privileges: form.privileges,
            action_url: urls::event_protection(&conference.id),
        }
    }
}

async fn managed_conference(
    state: &AppState,
    conference_id: &str,
    user: &Principal,
) -> Result<Conference, AppError> {
    let conference = state
        .store
        .load_conference(conference_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Conference {}", conference_id)))?;
    if let Err(e) = check_event_management(user, &conference) {
        tracing::warn!(
            "User {} denied protection settings of {}",
            user.id,
            conference.id
        );
        return Err(e.into());
    }
    Ok(conference)
}

pub async fn event_protection_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<EventPath>,
) -> Result<Response, AppError> {
    let conference = managed_conference(&state, &path.conference_id, &user).await?;
    let form = EventProtectionForm::from_conference(&conference);
    render(&EventProtectionTemplate::new(&conference, form))
}

pub async fn update_event_protection(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<EventPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut conference = managed_conference(&state, &path.conference_id, &user).await?;
    let principals = state.store.principals().await?;
    let form = EventProtectionForm::from_params(&params, &principals)?;

    let mode = form.protection_mode;
    form.apply(&mut conference);
    conference.log_action(
        "Protection",
        &format!("Event protection set to {}", mode.as_str()),
        &user.id,
    );
    state.store.save_conference(&conference).await?;
    tracing::info!(
        "User {} updated protection of {} ({})",
        user.id,
        conference.id,
        mode.as_str()
    );
    Ok(see_other(&urls::event_protection(&conference.id)))
}
