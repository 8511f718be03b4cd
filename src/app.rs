use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::Config;
use crate::export::{DocumentGenerator, SimplePdf};
use crate::handlers::{self, web};
use crate::materials::MaterialRegistry;
use crate::middleware::auth::auth_middleware;
use crate::store::Store;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
    pub materials: Arc<MaterialRegistry>,
    pub documents: Arc<dyn DocumentGenerator>,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        AppState {
            store,
            config: Arc::new(config),
            materials: Arc::new(MaterialRegistry::default()),
            documents: Arc::new(SimplePdf),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::contributions::get_contribution),
    components(schemas(handlers::contributions::ContributionSummary)),
    tags((name = "contributions", description = "Contribution metadata"))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn root() -> &'static str {
    "Contribution modification service"
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let contribution = Router::new()
        .route("/modify", get(web::overview::contribution_modification))
        .route(
            "/modify/withdraw",
            get(web::overview::withdraw_page).post(web::overview::withdraw),
        )
        // Access control
        .route("/modify/access", get(web::access::access_page))
        .route("/modify/access/visibility", post(web::access::set_visibility))
        .route("/modify/access/select", get(web::access::select_allowed))
        .route("/modify/access/allowed/add", post(web::access::add_allowed))
        .route("/modify/access/allowed/remove", post(web::access::remove_allowed))
        .route("/modify/access/domains/add", post(web::access::add_domains))
        .route("/modify/access/domains/remove", post(web::access::remove_domains))
        // Sub-contributions
        .route(
            "/modify/subcontributions",
            get(web::subcontributions::subcontributions_page),
        )
        .route(
            "/modify/subcontributions/actions",
            post(web::subcontributions::subcontribution_actions),
        )
        .route(
            "/modify/subcontributions/new",
            get(web::subcontributions::new_subcontribution),
        )
        .route(
            "/modify/subcontributions/create",
            post(web::subcontributions::create_subcontribution),
        )
        .route("/modify/subcontributions/up", post(web::subcontributions::move_up))
        .route("/modify/subcontributions/down", post(web::subcontributions::move_down))
        // Data, tools, moving and deletion
        .route("/modify/tools", get(web::data::tools_page))
        .route(
            "/modify/data",
            get(web::data::edit_data_page).post(web::data::update_data),
        )
        .route("/modify/track", post(web::data::set_track))
        .route("/modify/session", post(web::data::set_session))
        .route(
            "/modify/delete",
            get(web::data::delete_page).post(web::data::delete_contribution),
        )
        .route(
            "/modify/move",
            get(web::data::move_page).post(web::data::perform_move),
        )
        // Materials
        .route("/modify/materials", get(web::materials::materials_page))
        .route("/modify/materials/add", post(web::materials::add_material))
        .route(
            "/modify/materials/perform-add",
            post(web::materials::perform_add_material),
        )
        .route("/modify/materials/remove", post(web::materials::remove_materials))
        .route("/modify/materials/submit", post(web::materials::submit_resource))
        .route(
            "/modify/materials/{material_id}",
            get(web::materials::material_display),
        )
        // Exports
        .route("/modify/xml", get(web::exports::contribution_xml))
        .route("/modify/pdf", get(web::exports::contribution_pdf))
        // Report numbers
        .route(
            "/modify/report-numbers/edit",
            get(web::report_numbers::edit_report_number),
        )
        .route(
            "/modify/report-numbers",
            post(web::report_numbers::add_report_number),
        )
        .route(
            "/modify/report-numbers/remove",
            post(web::report_numbers::remove_report_numbers),
        );

    let protected = Router::new()
        .nest(
            "/conferences/{conference_id}/contributions/{contribution_id}",
            contribution,
        )
        .route(
            "/conferences/{conference_id}/manage/protection",
            get(web::protection::event_protection_page).post(web::protection::update_event_protection),
        )
        .route(
            "/api/conferences/{conference_id}/contributions/{contribution_id}",
            get(handlers::contributions::get_contribution),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(root))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
