use askama::Template;
use axum::extract::{Extension, Form, Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use super::{closed_page, render, see_other, ContributionPath, ContributionTarget, Pairs};
use crate::access::Gate;
use crate::app::AppState;
use crate::error::AppError;
use crate::forms::{local_return_url, MaterialSubmission, RequestParams, ValidationError};
use crate::middleware::CurrentUser;
use crate::models::{Material, Resource};

struct MaterialItem {
    id: String,
    title: String,
    kind: String,
    resource_count: usize,
    locked: bool,
    url: String,
}

struct FactoryItem {
    key: String,
    title: String,
}

#[derive(Template)]
#[template(path = "materials.html")]
struct MaterialsTemplate {
    title: String,
    materials: Vec<MaterialItem>,
    factories: Vec<FactoryItem>,
    base_url: String,
}

pub async fn materials_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Query(query): Query<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(query);
    let target = ContributionTarget::authorized(
        &state.store,
        &path,
        user,
        Gate::SessionCoordinatorOrReviewingStaff,
    )
    .await?;
    if params.any_key_contains("delete") {
        target.authorize(Gate::SessionCoordinator)?;
    }
    if target.is_owner_closed() {
        return closed_page(&target);
    }

    let urls = target.urls();
    let contribution = target.contribution();
    render(&MaterialsTemplate {
        title: contribution.title.clone(),
        materials: contribution
            .materials
            .iter()
            .map(|m| MaterialItem {
                id: m.id.clone(),
                title: m.title.clone(),
                kind: m.kind.clone().unwrap_or_default(),
                resource_count: m.resources.len(),
                locked: m.is_locked_for_review(),
                url: urls.page(&format!("materials/{}", m.id)),
            })
            .collect(),
        factories: state
            .materials
            .factories()
            .iter()
            .filter(|f| contribution.material_of_kind(f.key).is_none())
            .map(|f| FactoryItem {
                key: f.key.to_string(),
                title: f.title.to_string(),
            })
            .collect(),
        base_url: urls.modification(),
    })
}

#[derive(Debug, Deserialize)]
pub struct MaterialPath {
    pub conference_id: String,
    pub contribution_id: String,
    pub material_id: String,
}

#[derive(Template)]
#[template(path = "material_display.html")]
struct MaterialDisplayTemplate {
    contribution_title: String,
    title: String,
    description: String,
    resources: Vec<Resource>,
    locked: bool,
    back_url: String,
}

pub async fn material_display(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<MaterialPath>,
) -> Result<Response, AppError> {
    let contribution_path = ContributionPath {
        conference_id: path.conference_id,
        contribution_id: path.contribution_id,
    };
    let target =
        ContributionTarget::authorized(&state.store, &contribution_path, user, Gate::BaseModification)
            .await?;
    let material = target
        .contribution()
        .material(&path.material_id)
        .ok_or_else(|| AppError::NotFound(format!("Material {}", path.material_id)))?;

    render(&MaterialDisplayTemplate {
        contribution_title: target.contribution().title.clone(),
        title: material.title.clone(),
        description: material.description.clone(),
        resources: material.resources.clone(),
        locked: material.is_locked_for_review(),
        back_url: target.urls().page("materials"),
    })
}

#[derive(Template)]
#[template(path = "material_add.html")]
struct MaterialAddTemplate {
    contribution_title: String,
    kind: String,
    kind_title: String,
    action_url: String,
    back_url: String,
}

pub async fn add_material(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    let kind = params
        .get_trimmed("typeMaterial")
        .ok_or_else(|| ValidationError::new("typeMaterial", "Please choose a material type"))?
        .to_string();

    match state.materials.get(&kind) {
        Some(factory) if !factory.needs_creation_page => {
            factory.create(target.contribution_mut(), "");
            target.touch("Material", &format!("Created material {}", factory.title));
            target.save(&state.store).await?;
            tracing::info!(
                "Created {} material for contribution {} of {}",
                factory.key,
                target.contribution().id,
                target.conference.id
            );
            Ok(see_other(&target.urls().page("materials")))
        }
        factory => render(&MaterialAddTemplate {
            contribution_title: target.contribution().title.clone(),
            kind_title: factory.map(|f| f.title.to_string()).unwrap_or_default(),
            kind: factory.map(|f| f.key.to_string()).unwrap_or_default(),
            action_url: target.urls().page("materials/perform-add"),
            back_url: target.urls().page("materials"),
        }),
    }
}

pub async fn perform_add_material(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    if params.has("cancel") {
        return Ok(see_other(&target.urls().page("materials")));
    }

    let description = params.text("description");
    let factory = params
        .get_trimmed("typeMaterial")
        .and_then(|key| state.materials.get(key));
    let id = match factory {
        Some(factory) => factory.create(target.contribution_mut(), &description),
        None => {
            let title = params
                .get_trimmed("title")
                .ok_or_else(|| ValidationError::new("title", "Please specify a title"))?
                .to_string();
            target.contribution_mut().add_material(&title, &description)
        }
    };

    let title = target
        .contribution()
        .material(&id)
        .map(|m| m.title.clone())
        .unwrap_or_default();
    target.touch("Material", &format!("Created material {}", title));
    target.save(&state.store).await?;
    tracing::info!(
        "Created material {} for contribution {} of {}",
        id,
        target.contribution().id,
        target.conference.id
    );
    Ok(see_other(&target.urls().page(&format!("materials/{}", id))))
}

pub async fn remove_materials(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;

    let redirect = local_return_url(&params).unwrap_or_else(|| target.urls().page("materials"));

    let mut ids = params.list("materialId");
    ids.extend(params.list("deleteMaterial"));
    ids.dedup();

    // Factory keys name special materials; anything else must be an existing material
    if let Some(unknown) = ids.iter().find(|id| {
        state.materials.get(id).is_none() && target.contribution().material(id).is_none()
    }) {
        return Err(AppError::NotFound(format!("Material {}", unknown)));
    }

    let mut removed: Vec<Material> = Vec::new();
    for id in &ids {
        let material = match state.materials.get(id) {
            Some(factory) => factory.remove(target.contribution_mut()),
            None => target.contribution_mut().remove_material(id),
        };
        removed.extend(material);
    }

    if !removed.is_empty() {
        let titles: Vec<String> = removed.iter().map(|m| m.title.clone()).collect();
        target.touch("Material", &format!("Removed materials: {}", titles.join(", ")));
        target.save(&state.store).await?;
        tracing::info!(
            "Removed {} material(s) of contribution {} in {}",
            removed.len(),
            target.contribution().id,
            target.conference.id
        );
    }

    Ok(see_other(&redirect))
}

pub async fn submit_resource(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target = ContributionTarget::load(&state.store, &path, user).await?;
    let submission = MaterialSubmission::from_params(&params)?;

    let material_id = match (&submission.material_id, &submission.kind) {
        (Some(id), _) => {
            let material = target
                .contribution()
                .material(id)
                .ok_or_else(|| AppError::NotFound(format!("Material {}", id)))?;
            target.access().check_material_submission(Some(material))?;
            id.clone()
        }
        (None, Some(kind)) => {
            let factory = state
                .materials
                .get(kind)
                .ok_or_else(|| ValidationError::new("typeMaterial", "Unknown material type"))?;
            target
                .access()
                .check_material_submission(target.contribution().material_of_kind(kind))?;
            factory.create(target.contribution_mut(), "")
        }
        (None, None) => {
            return Err(ValidationError::new("typeMaterial", "Please choose a material type").into())
        }
    };

    if let Some(material) = target.contribution_mut().material_mut(&material_id) {
        material.resources.push(Resource {
            title: submission.title.clone(),
            url: submission.url.clone(),
        });
    }
    target.touch("Material", &format!("Submitted {} to material {}", submission.url, material_id));
    target.save(&state.store).await?;
    tracing::info!(
        "User {} submitted a resource to material {} of contribution {}",
        target.user.id,
        material_id,
        target.contribution().id
    );
    Ok(see_other(&target.urls().page("materials")))
}
