use std::collections::BTreeSet;

use super::{RequestParams, ValidationError};
use crate::models::{AclEntry, Conference, CoordinatorPrivilege, Principal, ProtectionMode};

const NETWORK_PREFIX: &str = "network:";

/// A coordinator privilege switch as shown on the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeField {
    pub privilege: CoordinatorPrivilege,
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub enabled: bool,
}

/// Event-level protection settings: protection mode, access list, access key,
/// managers and the privileges granted to session coordinators.
#[derive(Debug, Clone)]
pub struct EventProtectionForm {
    pub protection_mode: ProtectionMode,
    /// Only used when the event is protected; `None` leaves the stored list untouched
    pub acl: Option<Vec<AclEntry>>,
    pub access_key: Option<String>,
    pub managers: Vec<String>,
    pub registration_managers: Vec<String>,
    /// Sorted by title
    pub privileges: Vec<PrivilegeField>,
}

fn privilege_fields(enabled: impl Fn(CoordinatorPrivilege) -> bool) -> Vec<PrivilegeField> {
    let mut fields: Vec<PrivilegeField> = CoordinatorPrivilege::ALL
        .iter()
        .map(|p| PrivilegeField {
            privilege: *p,
            name: p.field_name(),
            title: p.title(),
            description: p.description(),
            enabled: enabled(*p),
        })
        .collect();
    fields.sort_by_key(|f| f.title);
    fields
}

fn parse_switch(params: &RequestParams, name: &str) -> bool {
    match params.get(name) {
        Some(value) => !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "false"),
        None => false,
    }
}

fn is_known_principal(principals: &[Principal], id: &str) -> bool {
    principals.iter().any(|p| p.id == id)
}

/// Principal list entries: e-mail addresses or ids of known principals
fn parse_principal_list(
    params: &RequestParams,
    field: &str,
    principals: &[Principal],
) -> Result<Vec<String>, ValidationError> {
    let mut entries: Vec<String> = Vec::new();
    for value in params.list(field) {
        if !value.contains('@') && !is_known_principal(principals, &value) {
            return Err(ValidationError::new(field, format!("Unknown user or group: {}", value)));
        }
        if !entries.contains(&value) {
            entries.push(value);
        }
    }
    Ok(entries)
}

fn parse_acl(params: &RequestParams, principals: &[Principal]) -> Result<Vec<AclEntry>, ValidationError> {
    let mut acl: Vec<AclEntry> = Vec::new();
    for value in params.list("acl") {
        let entry = if let Some(network) = value.strip_prefix(NETWORK_PREFIX) {
            let network = network.trim();
            if network.is_empty() {
                return Err(ValidationError::new("acl", "Network name is missing"));
            }
            AclEntry::Network(network.to_string())
        } else if value.contains('@') {
            AclEntry::Email(value)
        } else if is_known_principal(principals, &value) {
            AclEntry::Principal(value)
        } else {
            return Err(ValidationError::new("acl", format!("Unknown user or group: {}", value)));
        };
        if !acl.contains(&entry) {
            acl.push(entry);
        }
    }
    Ok(acl)
}

impl EventProtectionForm {
    /// Form pre-filled with the conference's current settings
    pub fn from_conference(conference: &Conference) -> Self {
        EventProtectionForm {
            protection_mode: conference.protection.mode,
            acl: Some(conference.protection.acl.clone()),
            access_key: conference.protection.access_key.clone(),
            managers: conference.managers.clone(),
            registration_managers: conference.registration_managers.clone(),
            privileges: privilege_fields(|p| conference.has_coordinator_privilege(p)),
        }
    }

    pub fn from_params(
        params: &RequestParams,
        principals: &[Principal],
    ) -> Result<Self, ValidationError> {
        let mode_value = params
            .get_trimmed("protection_mode")
            .ok_or_else(|| ValidationError::new("protection_mode", "This field is required."))?;
        let protection_mode = ProtectionMode::parse(mode_value)
            .ok_or_else(|| ValidationError::new("protection_mode", "Not a valid choice"))?;
        // ACL and access key follow the submitted mode, not the event's current one,
        // so a public event switched to protected gets both in the same request.
        let protected = protection_mode == ProtectionMode::Protected;

        let acl = if protected {
            Some(parse_acl(params, principals)?)
        } else {
            None
        };
        let access_key = if protected {
            params.get_trimmed("access_key").map(str::to_string)
        } else {
            None
        };

        Ok(EventProtectionForm {
            protection_mode,
            acl,
            access_key,
            managers: parse_principal_list(params, "managers", principals)?,
            registration_managers: parse_principal_list(params, "registration_managers", principals)?,
            privileges: privilege_fields(|p| parse_switch(params, p.field_name())),
        })
    }

    /// ACL entries in their form representation
    pub fn acl_values(&self) -> Vec<String> {
        self.acl
            .iter()
            .flatten()
            .map(AclEntry::to_form_value)
            .collect()
    }

    pub fn apply(self, conference: &mut Conference) {
        conference.protection.mode = self.protection_mode;
        if let Some(acl) = self.acl {
            conference.protection.acl = acl;
        }
        conference.protection.access_key = self.access_key;
        conference.managers = self.managers;
        conference.registration_managers = self.registration_managers;
        conference.coordinator_privileges = self
            .privileges
            .iter()
            .filter(|f| f.enabled)
            .map(|f| f.privilege)
            .collect::<BTreeSet<_>>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RequestParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into()
    }

    fn principals() -> Vec<Principal> {
        vec![Principal::user("u1", "Ada"), Principal::group("g1", "Organizers")]
    }

    #[test]
    fn test_privileges_sorted_by_title() {
        let form = EventProtectionForm::from_conference(&Conference::new("c", "C"));
        let names: Vec<&str> = form.privileges.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["can_manage_contributions", "can_manage_blocks"]);
        assert_eq!(form.privileges[0].title, "Contributions");
        assert!(form.privileges.iter().all(|f| !f.enabled));
    }

    #[test]
    fn test_protected_form_applies_acl_and_key() {
        let form = EventProtectionForm::from_params(
            &params(&[
                ("protection_mode", "protected"),
                ("acl", "u1"),
                ("acl", "guest@example.org"),
                ("acl", "network:CERN"),
                ("acl", "u1"),
                ("access_key", "secret"),
                ("managers", "g1"),
                ("can_manage_contributions", "y"),
                ("can_manage_blocks", "false"),
            ]),
            &principals(),
        )
        .unwrap();

        let mut conference = Conference::new("c", "C");
        form.apply(&mut conference);

        assert_eq!(conference.protection.mode, ProtectionMode::Protected);
        assert_eq!(
            conference.protection.acl,
            vec![
                AclEntry::Principal("u1".into()),
                AclEntry::Email("guest@example.org".into()),
                AclEntry::Network("CERN".into()),
            ]
        );
        assert_eq!(conference.protection.access_key.as_deref(), Some("secret"));
        assert_eq!(conference.managers, vec!["g1".to_string()]);
        assert!(conference.has_coordinator_privilege(CoordinatorPrivilege::ManageContributions));
        assert!(!conference.has_coordinator_privilege(CoordinatorPrivilege::ManageBlocks));
    }

    #[test]
    fn test_acl_ignored_unless_protected() {
        let mut conference = Conference::new("c", "C");
        conference.protection.acl = vec![AclEntry::Principal("u1".into())];
        conference.protection.access_key = Some("old".into());

        let form = EventProtectionForm::from_params(
            &params(&[
                ("protection_mode", "public"),
                ("acl", "nobody-known"),
                ("access_key", "new"),
            ]),
            &principals(),
        )
        .unwrap();
        assert!(form.acl.is_none());
        form.apply(&mut conference);

        assert_eq!(conference.protection.mode, ProtectionMode::Public);
        assert_eq!(conference.protection.acl, vec![AclEntry::Principal("u1".into())]);
        assert_eq!(conference.protection.access_key, None);
    }

    #[test]
    fn test_acl_applies_when_switching_to_protected() {
        let mut conference = Conference::new("c", "C");
        conference.protection.mode = ProtectionMode::Public;

        let form = EventProtectionForm::from_params(
            &params(&[
                ("protection_mode", "protected"),
                ("acl", "g1"),
                ("access_key", "secret"),
            ]),
            &principals(),
        )
        .unwrap();
        form.apply(&mut conference);

        assert_eq!(conference.protection.mode, ProtectionMode::Protected);
        assert_eq!(conference.protection.acl, vec![AclEntry::Principal("g1".into())]);
        assert_eq!(conference.protection.access_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_unknown_principal_names_field() {
        let err = EventProtectionForm::from_params(
            &params(&[("protection_mode", "protected"), ("acl", "ghost")]),
            &principals(),
        )
        .unwrap_err();
        assert_eq!(err.field, "acl");

        let err = EventProtectionForm::from_params(
            &params(&[("protection_mode", "inheriting"), ("registration_managers", "ghost")]),
            &principals(),
        )
        .unwrap_err();
        assert_eq!(err.field, "registration_managers");
    }

    #[test]
    fn test_invalid_mode() {
        let err = EventProtectionForm::from_params(&params(&[("protection_mode", "secret")]), &principals())
            .unwrap_err();
        assert_eq!(err.field, "protection_mode");
        assert!(EventProtectionForm::from_params(&params(&[]), &principals()).is_err());
    }

    #[test]
    fn test_acl_form_values() {
        let mut conference = Conference::new("c", "C");
        conference.protection.acl = vec![
            AclEntry::Principal("u1".into()),
            AclEntry::Network("Lab".into()),
        ];
        let form = EventProtectionForm::from_conference(&conference);
        assert_eq!(form.acl_values(), vec!["u1".to_string(), "network:Lab".to_string()]);
    }
}
