use askama::Template;
use axum::extract::{Extension, Form, Path, State};
use axum::response::Response;

use super::{closed_page, render, see_other, ContributionPath, ContributionTarget, Pairs};
use crate::access::Gate;
use crate::app::AppState;
use crate::error::AppError;
use crate::forms::{RequestParams, WithdrawAction};
use crate::middleware::CurrentUser;
use crate::models::{Conference, Contribution, Person};

pub(crate) struct PersonItem {
    pub name: String,
    pub email: String,
    pub affiliation: String,
}

impl From<&Person> for PersonItem {
    fn from(person: &Person) -> Self {
        PersonItem {
            name: person.full_name(),
            email: person.email.clone(),
            affiliation: person.affiliation.clone(),
        }
    }
}

pub(crate) struct OptionItem {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

struct ReportNumberItem {
    index: usize,
    system: String,
    number: String,
}

#[derive(Template)]
#[template(path = "contribution_modification.html")]
struct ModificationTemplate {
    conference_title: String,
    id: String,
    title: String,
    description: String,
    start: String,
    duration: String,
    type_name: String,
    primary_authors: Vec<PersonItem>,
    co_authors: Vec<PersonItem>,
    speakers: Vec<PersonItem>,
    withdrawn: bool,
    withdrawal_comment: String,
    tracks: Vec<OptionItem>,
    sessions: Vec<OptionItem>,
    report_numbers: Vec<ReportNumberItem>,
    report_number_systems: Vec<String>,
    sub_contribution_count: usize,
    material_count: usize,
    base_url: String,
}

/// Start time in the conference offset, `-` when unscheduled
pub(crate) fn format_start(conference: &Conference, contribution: &Contribution) -> String {
    contribution
        .start
        .map(|start| {
            start
                .with_timezone(&conference.utc_offset())
                .format("%d/%m/%Y %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn track_options(conference: &Conference, contribution: &Contribution) -> Vec<OptionItem> {
    conference
        .tracks
        .iter()
        .map(|t| OptionItem {
            id: t.id.clone(),
            label: t.title.clone(),
            selected: contribution.track_id.as_deref() == Some(t.id.as_str()),
        })
        .collect()
}

pub(crate) fn session_options(conference: &Conference, contribution: &Contribution) -> Vec<OptionItem> {
    conference
        .sessions
        .iter()
        .map(|s| OptionItem {
            id: s.id.clone(),
            label: s.title.clone(),
            selected: contribution.session_id.as_deref() == Some(s.id.as_str()),
        })
        .collect()
}

pub async fn contribution_modification(
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
    if target.is_owner_closed() {
        return closed_page(&target);
    }

    let conference = &target.conference;
    let contribution = target.contribution();
    let template = ModificationTemplate {
        conference_title: conference.title.clone(),
        id: contribution.id.clone(),
        title: contribution.title.clone(),
        description: contribution.description.clone(),
        start: format_start(conference, contribution),
        duration: format!(
            "{}h{:02}",
            contribution.duration_minutes / 60,
            contribution.duration_minutes % 60
        ),
        type_name: contribution
            .type_id
            .as_deref()
            .and_then(|id| conference.contribution_type(id))
            .map(|t| t.name.clone())
            .unwrap_or_default(),
        primary_authors: contribution.primary_authors().map(PersonItem::from).collect(),
        co_authors: contribution.co_authors().map(PersonItem::from).collect(),
        speakers: contribution.speakers.iter().map(PersonItem::from).collect(),
        withdrawn: contribution.is_withdrawn(),
        withdrawal_comment: contribution
            .withdrawal
            .as_ref()
            .map(|w| w.comment.clone())
            .unwrap_or_default(),
        tracks: track_options(conference, contribution),
        sessions: session_options(conference, contribution),
        report_numbers: contribution
            .report_numbers
            .numbers
            .iter()
            .enumerate()
            .map(|(index, n)| ReportNumberItem {
                index,
                system: n.system.clone(),
                number: n.number.clone(),
            })
            .collect(),
        report_number_systems: state.config.report_number_systems.clone(),
        sub_contribution_count: contribution.sub_contributions.len(),
        material_count: contribution.materials.len(),
        base_url: target.urls().modification(),
    };
    render(&template)
}

#[derive(Template)]
#[template(path = "withdraw.html")]
struct WithdrawTemplate {
    title: String,
    withdrawn: bool,
    action_url: String,
}

pub async fn withdraw_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
) -> Result<Response, AppError> {
    let target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;
    render(&WithdrawTemplate {
        title: target.contribution().title.clone(),
        withdrawn: target.contribution().is_withdrawn(),
        action_url: target.urls().page("withdraw"),
    })
}

pub async fn withdraw(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(path): Path<ContributionPath>,
    Form(body): Form<Pairs>,
) -> Result<Response, AppError> {
    let params = RequestParams::from(body);
    let mut target =
        ContributionTarget::authorized(&state.store, &path, user, Gate::SessionCoordinator).await?;

    let subject = match WithdrawAction::from_params(&params) {
        None => {
            return render(&WithdrawTemplate {
                title: target.contribution().title.clone(),
                withdrawn: target.contribution().is_withdrawn(),
                action_url: target.urls().page("withdraw"),
            })
        }
        Some(WithdrawAction::Cancel) => return Ok(see_other(&target.urls().modification())),
        Some(WithdrawAction::Withdraw { comment }) => {
            let user_id = target.user.id.clone();
            target.contribution_mut().withdraw(&user_id, &comment);
            "Withdrawn contribution"
        }
        Some(WithdrawAction::Reactivate) => {
            target.contribution_mut().reactivate();
            "Reactivated contribution"
        }
    };

    let title = target.contribution().title.clone();
    target.touch("Timetable/Contribution", &format!("{}: {}", subject, title));
    target.save(&state.store).await?;
    tracing::info!(
        "{} {} of conference {}",
        subject,
        target.contribution().id,
        target.conference.id
    );
    Ok(see_other(&target.urls().modification()))
}
