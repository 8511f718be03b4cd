use serde::{Deserialize, Serialize};

/// Identifier of a user principal
pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Group,
}

/// A user or group that can hold access-control entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub kind: PrincipalKind,
    pub name: String,
    pub email: Option<String>,
    /// Groups this user belongs to (always empty for groups)
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Principal {
    pub fn user(id: &str, name: &str) -> Self {
        Principal {
            id: id.to_string(),
            kind: PrincipalKind::User,
            name: name.to_string(),
            email: None,
            groups: Vec::new(),
        }
    }

    pub fn group(id: &str, name: &str) -> Self {
        Principal {
            id: id.to_string(),
            kind: PrincipalKind::Group,
            name: name.to_string(),
            email: None,
            groups: Vec::new(),
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn in_group(mut self, group_id: &str) -> Self {
        self.groups.push(group_id.to_string());
        self
    }

    pub fn is_user(&self) -> bool {
        self.kind == PrincipalKind::User
    }

    /// Whether an ACL entry (principal id or e-mail address) designates this principal,
    /// directly or through one of its groups.
    pub fn matches(&self, entry: &str) -> bool {
        if self.id == entry || self.groups.iter().any(|g| g == entry) {
            return true;
        }
        match &self.email {
            Some(email) => entry.contains('@') && email.eq_ignore_ascii_case(entry),
            None => false,
        }
    }
}

/// An IP domain that can be required to access a contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    pub name: String,
    /// Address prefixes, e.g. `137.138.`
    #[serde(default)]
    pub filters: Vec<String>,
}
