use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ConfPaperReview, Contribution, Principal, ProtectionMode, UserId};

/// A conference session; contributions assigned to it are owned by it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub coordinators: Vec<UserId>,
}

impl Session {
    pub fn is_coordinator(&self, user: &str) -> bool {
        self.coordinators.iter().any(|c| c == user)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionType {
    pub id: String,
    pub name: String,
}

/// Custom abstract field defined by the conference (e.g. "Summary", "Keywords")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbstractField {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Rights the event grants to every session coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoordinatorPrivilege {
    #[serde(rename = "can_manage_contributions")]
    ManageContributions,
    #[serde(rename = "can_manage_blocks")]
    ManageBlocks,
}

impl CoordinatorPrivilege {
    pub const ALL: [CoordinatorPrivilege; 2] = [
        CoordinatorPrivilege::ManageContributions,
        CoordinatorPrivilege::ManageBlocks,
    ];

    /// Form field name of the privilege switch
    pub fn field_name(self) -> &'static str {
        match self {
            CoordinatorPrivilege::ManageContributions => "can_manage_contributions",
            CoordinatorPrivilege::ManageBlocks => "can_manage_blocks",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CoordinatorPrivilege::ManageContributions => "Contributions",
            CoordinatorPrivilege::ManageBlocks => "Session blocks",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CoordinatorPrivilege::ManageContributions => {
                "Allows coordinators to modify contributions in their sessions."
            }
            CoordinatorPrivilege::ManageBlocks => {
                "Allows coordinators to manage and reschedule the blocks of their sessions."
            }
        }
    }
}

/// Entry of an event access control list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AclEntry {
    Principal(String),
    Email(String),
    /// Named IP network
    Network(String),
}

impl AclEntry {
    /// Form representation, as accepted by the protection form
    pub fn to_form_value(&self) -> String {
        match self {
            AclEntry::Principal(id) => id.clone(),
            AclEntry::Email(email) => email.clone(),
            AclEntry::Network(name) => format!("network:{}", name),
        }
    }
}

/// Event-level protection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventProtection {
    #[serde(default)]
    pub mode: ProtectionMode,
    #[serde(default)]
    pub acl: Vec<AclEntry>,
    pub access_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub module: String,
    pub subject: String,
    pub user: UserId,
}

/// Entries kept in a conference's action log; older ones are dropped
pub const MAX_LOG_ENTRIES: usize = 500;

/// Conference (event) document: the root of the contribution object graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conference {
    pub id: String,
    pub title: String,
    /// `UTC` or a fixed offset such as `+01:00`
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub closed: bool,
    /// Event managers: principal ids or e-mail addresses
    #[serde(default)]
    pub managers: Vec<String>,
    #[serde(default)]
    pub registration_managers: Vec<String>,
    #[serde(default)]
    pub protection: EventProtection,
    #[serde(default)]
    pub coordinator_privileges: BTreeSet<CoordinatorPrivilege>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub contribution_types: Vec<ContributionType>,
    #[serde(default)]
    pub abstract_fields: Vec<AbstractField>,
    #[serde(default)]
    pub paper_review: ConfPaperReview,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Conference {
    pub fn new(id: &str, title: &str) -> Self {
        Conference {
            id: id.to_string(),
            title: title.to_string(),
            timezone: default_timezone(),
            ..Default::default()
        }
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn contribution_type(&self, id: &str) -> Option<&ContributionType> {
        self.contribution_types.iter().find(|t| t.id == id)
    }

    pub fn contribution(&self, id: &str) -> Option<&Contribution> {
        self.contributions.iter().find(|c| c.id == id)
    }

    pub fn contribution_position(&self, id: &str) -> Option<usize> {
        self.contributions.iter().position(|c| c.id == id)
    }

    pub fn remove_contribution(&mut self, id: &str) -> Option<Contribution> {
        let position = self.contribution_position(id)?;
        Some(self.contributions.remove(position))
    }

    pub fn is_manager(&self, user: &Principal) -> bool {
        self.managers.iter().any(|m| user.matches(m))
    }

    pub fn has_coordinator_privilege(&self, privilege: CoordinatorPrivilege) -> bool {
        self.coordinator_privileges.contains(&privilege)
    }

    /// Whether the object owning the contribution (its session, or the conference) is closed
    pub fn is_owner_closed(&self, contribution: &Contribution) -> bool {
        if self.closed {
            return true;
        }
        contribution
            .session_id
            .as_deref()
            .and_then(|id| self.session(id))
            .map(|s| s.closed)
            .unwrap_or(false)
    }

    /// Appends to the action log, keeping only the newest `MAX_LOG_ENTRIES`
    pub fn log_action(&mut self, module: &str, subject: &str, user: &str) {
        self.log.push(LogEntry {
            id: Uuid::new_v4(),
            at: Utc::now(),
            module: module.to_string(),
            subject: subject.to_string(),
            user: user.to_string(),
        });
        if self.log.len() > MAX_LOG_ENTRIES {
            let excess = self.log.len() - MAX_LOG_ENTRIES;
            self.log.drain(..excess);
        }
    }

    /// Offset used to display and parse dates of this conference
    pub fn utc_offset(&self) -> FixedOffset {
        parse_utc_offset(&self.timezone).unwrap_or_else(utc)
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Parse `UTC`, `Z`, or a `+HH:MM` / `-HH:MM` offset
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("utc") || value == "Z" {
        return Some(utc());
    }

    let (sign, rest) = match value.chars().next()? {
        '+' => (1, &value[1..]),
        '-' => (-1, &value[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
