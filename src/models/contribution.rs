use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Material, Principal, ReviewManager, SubContribution, UserId};

/// Access-control state of a protectable object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionMode {
    /// Inherit protection from the parent object
    #[default]
    Inheriting,
    Protected,
    Public,
}

impl ProtectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ProtectionMode::Inheriting => "inheriting",
            ProtectionMode::Protected => "protected",
            ProtectionMode::Public => "public",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "inheriting" => Some(ProtectionMode::Inheriting),
            "protected" => Some(ProtectionMode::Protected),
            "public" => Some(ProtectionMode::Public),
            _ => None,
        }
    }
}

/// A person attached to a contribution (author or speaker)
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Person {
    pub first_name: String,
    pub family_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub affiliation: String,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.family_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub person: Person,
    /// Primary author (as opposed to co-author)
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Withdrawal {
    pub by: UserId,
    pub comment: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportNumber {
    pub system: String,
    pub number: String,
}

/// Report numbers assigned to a contribution, keyed by numbering system
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReportNumberHolder {
    #[serde(default)]
    pub numbers: Vec<ReportNumber>,
}

impl ReportNumberHolder {
    /// Adds a number unless the same (system, number) pair is already present
    pub fn add(&mut self, system: &str, number: &str) -> bool {
        let entry = ReportNumber {
            system: system.to_string(),
            number: number.to_string(),
        };
        if self.numbers.contains(&entry) {
            return false;
        }
        self.numbers.push(entry);
        true
    }

    /// Removes the entries at the given positions. Out-of-range positions are ignored.
    ///
    /// Positions refer to the list before any removal; they are removed highest first so
    /// that earlier removals do not shift later ones.
    pub fn remove_positions(&mut self, positions: &[usize]) -> usize {
        let mut sorted: Vec<usize> = positions
            .iter()
            .copied()
            .filter(|p| *p < self.numbers.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();
        for position in sorted.iter().rev() {
            self.numbers.remove(*position);
        }
        sorted.len()
    }
}

/// A titled, timed item of a conference, owned by the conference or one of its sessions
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Contribution {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Values of the conference's abstract fields, keyed by field id
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Owning session; the conference owns the contribution when unset
    pub session_id: Option<String>,
    pub track_id: Option<String>,
    pub type_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub speakers: Vec<Person>,
    #[serde(default)]
    pub sub_contributions: Vec<SubContribution>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub protection: ProtectionMode,
    /// Principals explicitly allowed to access a protected contribution
    #[serde(default)]
    pub allowed: Vec<String>,
    /// Domain ids required to access the contribution
    #[serde(default)]
    pub domains: Vec<String>,
    /// Principals allowed to modify this contribution
    #[serde(default)]
    pub managers: Vec<String>,
    /// Principals allowed to submit material
    #[serde(default)]
    pub submitters: Vec<String>,
    #[serde(default)]
    pub report_numbers: ReportNumberHolder,
    #[serde(default)]
    pub review: ReviewManager,
    pub withdrawal: Option<Withdrawal>,
    /// Counter for ids of children created in this contribution
    #[serde(default)]
    pub next_child_id: u32,
    #[serde(default)]
    pub modified_at: DateTime<Utc>,
}

impl Contribution {
    pub fn new(id: &str, title: &str) -> Self {
        Contribution {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// Value of an abstract field, empty when unset
    pub fn field(&self, field_id: &str) -> &str {
        self.fields.get(field_id).map(String::as_str).unwrap_or("")
    }

    pub fn primary_authors(&self) -> impl Iterator<Item = &Person> {
        self.authors.iter().filter(|a| a.primary).map(|a| &a.person)
    }

    pub fn co_authors(&self) -> impl Iterator<Item = &Person> {
        self.authors.iter().filter(|a| !a.primary).map(|a| &a.person)
    }

    pub fn notify_modification(&mut self) {
        self.modified_at = Utc::now();
    }

    /// Next free child id, above every numeric child id already in use
    fn allocate_child_id(&mut self) -> String {
        let in_use = self
            .sub_contributions
            .iter()
            .map(|sc| sc.id.as_str())
            .chain(self.materials.iter().map(|m| m.id.as_str()))
            .filter_map(|id| id.parse::<u32>().ok())
            .map(|n| n.saturating_add(1))
            .max()
            .unwrap_or(0);
        let id = self.next_child_id.max(in_use);
        self.next_child_id = id.saturating_add(1);
        id.to_string()
    }

    // Sub-contributions

    pub fn sub_contribution(&self, id: &str) -> Option<&SubContribution> {
        self.sub_contributions.iter().find(|sc| sc.id == id)
    }

    /// Appends an empty sub-contribution and returns it for filling in
    pub fn new_sub_contribution(&mut self) -> &mut SubContribution {
        let id = self.allocate_child_id();
        self.sub_contributions.push(SubContribution {
            id,
            ..Default::default()
        });
        self.notify_modification();
        let last = self.sub_contributions.len() - 1;
        &mut self.sub_contributions[last]
    }

    // Withdrawal

    pub fn is_withdrawn(&self) -> bool {
        self.withdrawal.is_some()
    }

    pub fn withdraw(&mut self, user: &str, comment: &str) {
        self.withdrawal = Some(Withdrawal {
            by: user.to_string(),
            comment: comment.to_string(),
            at: Utc::now(),
        });
        self.notify_modification();
    }

    pub fn reactivate(&mut self) {
        self.withdrawal = None;
        self.notify_modification();
    }

    // Access control

    pub fn set_protection(&mut self, mode: ProtectionMode) {
        self.protection = mode;
        self.notify_modification();
    }

    pub fn grant_access(&mut self, principal_id: &str) {
        if !self.allowed.iter().any(|p| p == principal_id) {
            self.allowed.push(principal_id.to_string());
            self.notify_modification();
        }
    }

    /// Returns whether anything was removed
    pub fn revoke_access(&mut self, principal_id: &str) -> bool {
        let before = self.allowed.len();
        self.allowed.retain(|p| p != principal_id);
        let removed = self.allowed.len() != before;
        if removed {
            self.notify_modification();
        }
        removed
    }

    pub fn require_domain(&mut self, domain_id: &str) {
        if !self.domains.iter().any(|d| d == domain_id) {
            self.domains.push(domain_id.to_string());
            self.notify_modification();
        }
    }

    /// Returns whether anything was removed
    pub fn free_domain(&mut self, domain_id: &str) -> bool {
        let before = self.domains.len();
        self.domains.retain(|d| d != domain_id);
        let removed = self.domains.len() != before;
        if removed {
            self.notify_modification();
        }
        removed
    }

    pub fn is_manager(&self, user: &Principal) -> bool {
        self.managers.iter().any(|m| user.matches(m))
    }

    pub fn is_submitter(&self, user: &Principal) -> bool {
        self.submitters.iter().any(|s| user.matches(s))
    }

    // Materials

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.id == id)
    }

    pub fn material_of_kind(&self, kind: &str) -> Option<&Material> {
        self.materials
            .iter()
            .find(|m| m.kind.as_deref() == Some(kind))
    }

    /// Adds an additional (non-special) material and returns its id
    pub fn add_material(&mut self, title: &str, description: &str) -> String {
        let id = self.allocate_child_id();
        let mut material = Material::new(&id, title, None);
        material.description = description.to_string();
        self.materials.push(material);
        self.notify_modification();
        id
    }

    pub fn remove_material(&mut self, id: &str) -> Option<Material> {
        let position = self.materials.iter().position(|m| m.id == id)?;
        self.notify_modification();
        Some(self.materials.remove(position))
    }
}
