use askama::Template;
use axum::extract::{Extension, Form, Path, State};
use axum::response::Response;

use super::{closed_page, render, see_other, ContributionPath, ContributionTarget, Pairs};
use crate::access::Gate;
use crate::app::AppState;
use crate::error::AppError;
use crate::forms::{requested_visibility, RequestParams};
use crate::middleware::CurrentUser;
use crate::models::{Domain, Principal};

struct PrincipalItem {
    id: String,
    name: String,
    kind: &'static str,
}

struct DomainItem {
    id: String,
    name: String,
    filters: String,
}

impl From<&Domain> for DomainItem {
    fn from(domain: &Domain) -> Self {
        DomainItem {
            id: domain.id.clone(),
            name: domain.name.clone(),
            filters: domain.filters.join(", "),
        }
    }
}

fn principal_item(id: &str, principals: &[Principal]) -> PrincipalItem {
    match principals.iter().find(|p| p.id == id) {
        Some(p) => PrincipalItem {
            id: p.id.clone(),
            name: p.name.clone(),
            kind: if p.is_user() { "user" } else { "group" },
        },
        None => PrincipalItem {
            id: id.to_string(),
            name: id.to_string(),
            kind: "unknown",
        },
    }
}

#[derive(Template)]
#[template(path = "contribution_access.html")]
struct AccessTemplate {
    title: String,
    protection: &'static str,
    allowed: Vec<PrincipalItem>,
    required_domains: Vec<DomainItem>,
    available_domains: Vec<DomainItem>,
    base_url: String,
}

pub async fn access_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Response, AppError> {
    let target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    if target.is_owner_closed() {
        return closed_page(&target);
    }

    let principals = state.store.principals().await?;
    let domains = state.store.domains().await?;
    let contribution = target.contribution();
    let (required, available): (Vec<&Domain>, Vec<&Domain>) = domains
        .iter()
        .partition(|d| contribution.domains.contains(&d.id));

    render(&AccessTemplate {
        title: contribution.title.clone(),
        protection: contribution.protection.as_str(),
        allowed: contribution
            .allowed
            .iter()
            .map(|id| principal_item(id, &principals))
            .collect(),
        required_domains: required.into_iter().map(DomainItem::from).collect(),
        available_domains: available.into_iter().map(DomainItem::from).collect(),
        base_url: target.urls().modification(),
    })
}

pub async fn set_visibility(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;

    if let Some(mode) = requested_visibility(&params) {
        target.contribution_mut().set_protection(mode);
        let subject = format!("Protection of {} set to {}", target.contribution().title, mode.as_str());
        target.touch("Timetable/Contribution", &subject);
        target.save(&state.store).await?;
        tracing::info!(
            "Contribution {} of {} is now {}",
            target.contribution().id,
            target.conference.id,
            mode.as_str()
        );
    }
    Ok(see_other(&target.urls().page("access")))
}

#[derive(Template)]
#[template(path = "select_allowed.html")]
struct SelectAllowedTemplate {
    title: String,
    candidates: Vec<PrincipalItem>,
    action_url: String,
    back_url: String,
}

pub async fn select_allowed(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Response, AppError> {
    let target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    let principals = state.store.principals().await?;
    let contribution = target.contribution();

    render(&SelectAllowedTemplate {
        title: contribution.title.clone(),
        candidates: principals
            .iter()
            .filter(|p| !contribution.allowed.contains(&p.id))
            .map(|p| principal_item(&p.id, &principals))
            .collect(),
        action_url: target.urls().page("access/allowed/add"),
        back_url: target.urls().page("access"),
    })
}

pub async fn add_allowed(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;

    let selected = params.list("selectedPrincipals");
    if !params.has("cancel") && !selected.is_empty() {
        let principals = state.store.principals().await?;
        if let Some(unknown) = selected.iter().find(|id| !principals.iter().any(|p| &p.id == *id)) {
            return Err(AppError::NotFound(format!("Principal {}", unknown)));
        }
        for id in &selected {
            target.contribution_mut().grant_access(id);
        }
        let subject = format!("Granted access to {}", selected.join(", "));
        target.touch("Timetable/Contribution", &subject);
        target.save(&state.store).await?;
        tracing::info!(
            "Granted access to {} principal(s) on contribution {} of {}",
            selected.len(),
            target.contribution().id,
            target.conference.id
        );
    }
    Ok(see_other(&target.urls().page("access")))
}

pub async fn remove_allowed(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;

    let revoked: Vec<String> = params
        .list("selectedPrincipals")
        .into_iter()
        .filter(|id| target.contribution_mut().revoke_access(id))
        .collect();
    if !revoked.is_empty() {
        let subject = format!("Revoked access of {}", revoked.join(", "));
        target.touch("Timetable/Contribution", &subject);
        target.save(&state.store).await?;
        tracing::info!(
            "Revoked access of {} principal(s) on contribution {} of {}",
            revoked.len(),
            target.contribution().id,
            target.conference.id
        );
    }
    Ok(see_other(&target.urls().page("access")))
}

async fn ensure_known_domains(state: &AppState, ids: &[String]) -> Result<(), AppError> {
    let domains = state.store.domains().await?;
    match ids.iter().find(|id| !domains.iter().any(|d| &d.id == *id)) {
        Some(unknown) => Err(AppError::NotFound(format!("Domain {}", unknown))),
        None => Ok(()),
    }
}

pub async fn add_domains(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;

    let ids = params.list("addDomain");
    if !ids.is_empty() {
        ensure_known_domains(&state, &ids).await?;
        for id in &ids {
            target.contribution_mut().require_domain(id);
        }
        target.touch("Timetable/Contribution", &format!("Required domains {}", ids.join(", ")));
        target.save(&state.store).await?;
    }
    Ok(see_other(&target.urls().page("access")))
}

pub async fn remove_domains(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;

    let freed: Vec<String> = params
        .list("selectedDomain")
        .into_iter()
        .filter(|id| target.contribution_mut().free_domain(id))
        .collect();
    if !freed.is_empty() {
        target.touch("Timetable/Contribution", &format!("Freed domains {}", freed.join(", ")));
        target.save(&state.store).await?;
    }
    Ok(see_other(&target.urls().page("access")))
}
