use std::collections::BTreeMap;

use axum::http::{HeaderValue, Uri};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use super::ValidationError;
use crate::models::{Presenter, ProtectionMode};

/// Format of the `dateTime` field of the contribution data form
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Form or query parameters in submission order; keys may repeat
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
}

impl From<Vec<(String, String)>> for RequestParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        RequestParams { pairs }
    }
}

impl RequestParams {
    /// Query parameters followed by body parameters
    pub fn merged(query: Vec<(String, String)>, body: Vec<(String, String)>) -> Self {
        let mut pairs = query;
        pairs.extend(body);
        RequestParams { pairs }
    }

    pub fn has(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// First value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value of `key`, trimmed; blank values count as absent
    pub fn get_trimmed(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// First value of `key`, or an empty string
    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or("").to_string()
    }

    /// All non-blank values of `key`, trimmed, in submission order
    pub fn list(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    pub fn any_key_contains(&self, needle: &str) -> bool {
        self.keys().any(|k| k.contains(needle))
    }
}

fn parse_number<T: std::str::FromStr>(
    params: &RequestParams,
    field: &str,
    message: &str,
) -> Result<T, ValidationError> {
    params
        .get(field)
        .map(str::trim)
        .and_then(|v| v.parse::<T>().ok())
        .ok_or_else(|| ValidationError::new(field, message))
}

// Withdrawal

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawAction {
    Withdraw { comment: String },
    Reactivate,
    Cancel,
}

impl WithdrawAction {
    /// `None` means no action was chosen yet and the confirmation page is shown
    pub fn from_params(params: &RequestParams) -> Option<Self> {
        if params.has("OK") {
            Some(WithdrawAction::Withdraw {
                comment: params.text("comment"),
            })
        } else if params.has("REACTIVATE") {
            Some(WithdrawAction::Reactivate)
        } else if params.has("CANCEL") {
            Some(WithdrawAction::Cancel)
        } else {
            None
        }
    }
}

/// Protection mode requested by the visibility buttons of the access page
pub fn requested_visibility(params: &RequestParams) -> Option<ProtectionMode> {
    if params.has("changeToPrivate") {
        Some(ProtectionMode::Protected)
    } else if params.has("changeToInheriting") {
        Some(ProtectionMode::Inheriting)
    } else if params.has("changeToPublic") {
        Some(ProtectionMode::Public)
    } else {
        None
    }
}

// Sub-contributions

pub const HOURS_MESSAGE: &str = "Please specify a valid hour format (0-23).";
pub const MINUTES_MESSAGE: &str = "Please specify a valid minutes format (0-59).";

/// Values of the sub-contribution creation form
#[derive(Debug, Clone, Default)]
pub struct SubContributionInput {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub hours: u32,
    pub minutes: u32,
    pub speaker_text: String,
    pub presenters: Vec<Presenter>,
}

impl SubContributionInput {
    pub fn from_params(params: &RequestParams) -> Result<Self, ValidationError> {
        let hours: u32 = parse_number(params, "durationHours", HOURS_MESSAGE)?;
        if hours > 23 {
            return Err(ValidationError::new("durationHours", HOURS_MESSAGE));
        }
        let minutes: u32 = parse_number(params, "durationMinutes", MINUTES_MESSAGE)?;
        if minutes > 59 {
            return Err(ValidationError::new("durationMinutes", MINUTES_MESSAGE));
        }

        let presenters = match params.get_trimmed("presenters") {
            Some(raw) => serde_json::from_str::<Vec<Presenter>>(raw).map_err(|e| {
                ValidationError::new("presenters", format!("Invalid presenter list: {}", e))
            })?,
            None => Vec::new(),
        };

        Ok(SubContributionInput {
            title: params.text("title"),
            description: params.text("description"),
            keywords: params.text("keywords"),
            hours,
            minutes,
            speaker_text: params.text("speakers"),
            presenters,
        })
    }
}

/// Action posted from the sub-contribution list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubContribAction {
    Cancel,
    Delete(Vec<String>),
    Move { old: usize, new: usize },
}

impl SubContribAction {
    /// A move (`oldpos` with its `newpos<oldpos>` companion) takes precedence over a delete
    pub fn from_params(params: &RequestParams) -> Result<Option<Self>, ValidationError> {
        if params.has("cancel") {
            return Ok(Some(SubContribAction::Cancel));
        }

        if let Some(old_raw) = params.get_trimmed("oldpos") {
            let old: usize = old_raw
                .parse()
                .map_err(|_| ValidationError::new("oldpos", "Invalid position"))?;
            let new_field = format!("newpos{}", old_raw);
            let new: usize = parse_number(params, &new_field, "Please choose a new position")?;
            return Ok(Some(SubContribAction::Move { old, new }));
        }

        let ids = params.list("selSubContribs");
        if ids.is_empty() {
            Ok(None)
        } else {
            Ok(Some(SubContribAction::Delete(ids)))
        }
    }
}

// Contribution data

/// Values of the contribution data form; only submitted keys are applied
#[derive(Debug, Clone, Default)]
pub struct ContributionDataInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    /// Blank or missing clears the type
    pub type_id: Option<String>,
    /// Abstract field values from `f_<field id>` keys
    pub fields: BTreeMap<String, String>,
}

impl ContributionDataInput {
    /// Dates are read in the conference offset
    pub fn from_params<Tz: TimeZone>(
        params: &RequestParams,
        timezone: &Tz,
    ) -> Result<Self, ValidationError> {
        let start = match params.get_trimmed("dateTime") {
            Some(raw) => Some(parse_local_date_time(raw, timezone).ok_or_else(|| {
                ValidationError::new("dateTime", "Please specify a valid date (DD/MM/YYYY HH:MM).")
            })?),
            None => None,
        };

        let duration_minutes = match params.get_trimmed("duration") {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                ValidationError::new("duration", "Please specify a valid duration in minutes.")
            })?),
            None => None,
        };

        let fields = params
            .pairs
            .iter()
            .filter_map(|(k, v)| k.strip_prefix("f_").map(|id| (id.to_string(), v.clone())))
            .collect();

        Ok(ContributionDataInput {
            title: params.get("title").map(str::to_string),
            description: params.get("description").map(str::to_string),
            start,
            duration_minutes,
            type_id: params.get_trimmed("type").map(str::to_string),
            fields,
        })
    }
}

fn parse_local_date_time<Tz: TimeZone>(raw: &str, timezone: &Tz) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).ok()?;
    timezone
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

// Moving

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveDestination {
    Conference,
    Session(String),
    /// The chooser's placeholder when the conference has no sessions
    Undefined,
}

impl MoveDestination {
    pub fn from_params(params: &RequestParams) -> Result<Self, ValidationError> {
        match params.get_trimmed("Destination") {
            None => Err(ValidationError::new("Destination", "Please choose a destination")),
            Some("--no-sessions--") => Ok(MoveDestination::Undefined),
            Some("CONF") => Ok(MoveDestination::Conference),
            Some(id) => Ok(MoveDestination::Session(id.to_string())),
        }
    }
}

// Materials

/// Resource submission for a material, addressed by id or by factory key
#[derive(Debug, Clone)]
pub struct MaterialSubmission {
    pub material_id: Option<String>,
    pub kind: Option<String>,
    pub title: String,
    pub url: String,
}

impl MaterialSubmission {
    pub fn from_params(params: &RequestParams) -> Result<Self, ValidationError> {
        let material_id = params.get_trimmed("materialId").map(str::to_string);
        let kind = params.get_trimmed("typeMaterial").map(str::to_string);
        if material_id.is_none() && kind.is_none() {
            return Err(ValidationError::new("typeMaterial", "Please choose a material type"));
        }
        let url = params
            .get_trimmed("url")
            .ok_or_else(|| ValidationError::new("url", "Please specify a URL"))?
            .to_string();
        let title = params.get_trimmed("title").unwrap_or(url.as_str()).to_string();
        Ok(MaterialSubmission {
            material_id,
            kind,
            title,
            url,
        })
    }
}

/// Only site-local paths are followed after a removal. The value must parse as a
/// path-only URI and be usable as a `Location` header as is.
pub fn local_return_url(params: &RequestParams) -> Option<String> {
    let raw = params.get_trimmed("returnURL")?;
    if !raw.starts_with('/') || raw.starts_with("//") || raw.contains('\\') {
        return None;
    }
    let uri: Uri = raw.parse().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    HeaderValue::from_str(raw).ok()?;
    Some(raw.to_string())
}

// Report numbers

/// 0-based positions from the `deleteReportNumber` list
pub fn report_number_positions(params: &RequestParams) -> Result<Vec<usize>, ValidationError> {
    params
        .list("deleteReportNumber")
        .iter()
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|_| ValidationError::new("deleteReportNumber", "Invalid report number index"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn params(pairs: &[(&str, &str)]) -> RequestParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into()
    }

    fn sub_contribution(hours: &str, minutes: &str) -> Result<SubContributionInput, ValidationError> {
        SubContributionInput::from_params(&params(&[
            ("ok", "1"),
            ("title", "Intro"),
            ("durationHours", hours),
            ("durationMinutes", minutes),
        ]))
    }

    #[test]
    fn test_list_skips_blanks_and_keeps_order() {
        let p = params(&[("id", "b"), ("other", "x"), ("id", " "), ("id", "a")]);
        assert_eq!(p.list("id"), vec!["b", "a"]);
        assert_eq!(p.get("id"), Some("b"));
        assert!(p.list("missing").is_empty());
    }

    #[test]
    fn test_duration_hours_out_of_range() {
        let err = sub_contribution("24", "0").unwrap_err();
        assert_eq!(err.field, "durationHours");
        assert_eq!(err.message, HOURS_MESSAGE);
    }

    #[test]
    fn test_duration_minutes_negative() {
        let err = sub_contribution("1", "-1").unwrap_err();
        assert_eq!(err.field, "durationMinutes");
        assert_eq!(err.message, MINUTES_MESSAGE);
    }

    #[test]
    fn test_duration_not_numeric() {
        assert_eq!(sub_contribution("", "10").unwrap_err().field, "durationHours");
        assert_eq!(sub_contribution("1", "ten").unwrap_err().field, "durationMinutes");
    }

    #[test]
    fn test_duration_accepted() {
        let input = sub_contribution("5", "30").unwrap();
        assert_eq!((input.hours, input.minutes), (5, 30));
        assert_eq!(input.title, "Intro");
    }

    #[test]
    fn test_presenters_json() {
        let input = SubContributionInput::from_params(&params(&[
            ("durationHours", "0"),
            ("durationMinutes", "20"),
            (
                "presenters",
                r#"[{"title":"Dr.","firstName":"Ada","familyName":"Lovelace","affiliation":"AE","email":"ada@example.org","address":"","phone":"","fax":""}]"#,
            ),
        ]))
        .unwrap();
        assert_eq!(input.presenters.len(), 1);
        assert_eq!(input.presenters[0].family_name, "Lovelace");

        let err = SubContributionInput::from_params(&params(&[
            ("durationHours", "0"),
            ("durationMinutes", "20"),
            ("presenters", "{not json"),
        ]))
        .unwrap_err();
        assert_eq!(err.field, "presenters");
    }

    #[test]
    fn test_sub_contrib_actions() {
        assert_eq!(
            SubContribAction::from_params(&params(&[("cancel", ""), ("selSubContribs", "1")])).unwrap(),
            Some(SubContribAction::Cancel)
        );
        assert_eq!(
            SubContribAction::from_params(&params(&[("selSubContribs", "1"), ("selSubContribs", "3")]))
                .unwrap(),
            Some(SubContribAction::Delete(vec!["1".into(), "3".into()]))
        );
        assert_eq!(
            SubContribAction::from_params(&params(&[
                ("selSubContribs", "1"),
                ("oldpos", "3"),
                ("newpos3", "0")
            ]))
            .unwrap(),
            Some(SubContribAction::Move { old: 3, new: 0 })
        );
        assert_eq!(SubContribAction::from_params(&params(&[("oldpos", "")])).unwrap(), None);
    }

    #[test]
    fn test_move_without_new_position() {
        let err = SubContribAction::from_params(&params(&[("oldpos", "2")])).unwrap_err();
        assert_eq!(err.field, "newpos2");
    }

    #[test]
    fn test_withdraw_actions() {
        assert_eq!(
            WithdrawAction::from_params(&params(&[("OK", "1"), ("comment", "dup")])),
            Some(WithdrawAction::Withdraw { comment: "dup".into() })
        );
        assert_eq!(
            WithdrawAction::from_params(&params(&[("REACTIVATE", "1")])),
            Some(WithdrawAction::Reactivate)
        );
        assert_eq!(WithdrawAction::from_params(&params(&[])), None);
    }

    #[test]
    fn test_contribution_data_in_conference_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let input = ContributionDataInput::from_params(
            &params(&[
                ("title", "New title"),
                ("dateTime", "01/03/2024 10:30"),
                ("duration", "45"),
                ("type", " "),
                ("f_summary", "Short"),
            ]),
            &offset,
        )
        .unwrap();

        assert_eq!(input.title.as_deref(), Some("New title"));
        assert_eq!(input.description, None);
        assert_eq!(
            input.start,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap())
        );
        assert_eq!(input.duration_minutes, Some(45));
        assert_eq!(input.type_id, None);
        assert_eq!(input.fields.get("summary").map(String::as_str), Some("Short"));
    }

    #[test]
    fn test_contribution_data_bad_date() {
        let err = ContributionDataInput::from_params(&params(&[("dateTime", "2024-03-01")]), &Utc)
            .unwrap_err();
        assert_eq!(err.field, "dateTime");
    }

    #[test]
    fn test_move_destination() {
        assert_eq!(
            MoveDestination::from_params(&params(&[("Destination", "CONF")])).unwrap(),
            MoveDestination::Conference
        );
        assert_eq!(
            MoveDestination::from_params(&params(&[("Destination", "--no-sessions--")])).unwrap(),
            MoveDestination::Undefined
        );
        assert_eq!(
            MoveDestination::from_params(&params(&[("Destination", "s2")])).unwrap(),
            MoveDestination::Session("s2".into())
        );
        assert!(MoveDestination::from_params(&params(&[])).is_err());
    }

    #[test]
    fn test_return_url_must_be_local() {
        assert_eq!(
            local_return_url(&params(&[("returnURL", "/conferences/c1")])).as_deref(),
            Some("/conferences/c1")
        );
        assert_eq!(local_return_url(&params(&[("returnURL", "//evil.example")])), None);
        assert_eq!(local_return_url(&params(&[("returnURL", "https://evil.example")])), None);
        assert_eq!(local_return_url(&params(&[("returnURL", "/\\evil.example")])), None);
        assert_eq!(local_return_url(&params(&[("returnURL", "/x\u{1}y")])), None);
        assert_eq!(
            local_return_url(&params(&[("returnURL", "/conferences/c1?tab=2")])).as_deref(),
            Some("/conferences/c1?tab=2")
        );
    }

    #[test]
    fn test_report_number_positions() {
        assert_eq!(
            report_number_positions(&params(&[("deleteReportNumber", "2"), ("deleteReportNumber", "0")]))
                .unwrap(),
            vec![2, 0]
        );
        assert!(report_number_positions(&params(&[("deleteReportNumber", "x")])).is_err());
    }

    #[test]
    fn test_material_submission_needs_target_and_url() {
        let err = MaterialSubmission::from_params(&params(&[("url", "https://x")])).unwrap_err();
        assert_eq!(err.field, "typeMaterial");
        let err = MaterialSubmission::from_params(&params(&[("typeMaterial", "slides")])).unwrap_err();
        assert_eq!(err.field, "url");
        let ok = MaterialSubmission::from_params(&params(&[
            ("typeMaterial", "slides"),
            ("url", "https://x/slides.pdf"),
        ]))
        .unwrap();
        assert_eq!(ok.title, "https://x/slides.pdf");
    }
}
