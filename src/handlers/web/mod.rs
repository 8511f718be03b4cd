//! HTML pages and form posts of the contribution modification area.

pub mod access;
pub mod data;
pub mod exports;
pub mod materials;
pub mod overview;
pub mod protection;
pub mod report_numbers;
pub mod subcontributions;
pub mod target;

use askama::Template;
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::error::AppError;

pub use target::{ContributionPath, ContributionTarget};

/// Raw form or query pairs; repeated keys are kept
pub type Pairs = Vec<(String, String)>;

pub fn render<T: Template>(template: &T) -> Result<Response, AppError> {
    let html = template.render()?;
    Ok(Html(html).into_response())
}

/// 303 redirect after a form post
pub fn see_other(url: &str) -> Response {
    Redirect::to(url).into_response()
}

#[derive(Template)]
#[template(path = "contribution_closed.html")]
pub struct ClosedPage {
    pub conference_title: String,
    pub contribution_title: String,
    pub back_url: String,
}

/// Page shown instead of an editor when the contribution's owner is closed
pub fn closed_page(target: &ContributionTarget) -> Result<Response, AppError> {
    render(&ClosedPage {
        conference_title: target.conference.title.clone(),
        contribution_title: target.contribution().title.clone(),
        back_url: target.urls().modification(),
    })
}
