#![allow(dead_code)]

use axum::Router;
use contribmod::{router, AppState, Config, MemoryStore, Seed, Store};
use serde_json::json;

pub const CONFERENCE: &str = "conf";
pub const CONTRIBUTION: &str = "1";
pub const UNSCHEDULED: &str = "2";

pub const MANAGER_TOKEN: &str = "manager-token-0123456789abcdefghijklmn";
pub const COORDINATOR_TOKEN: &str = "coordinator-token-0123456789abcdefghij";
pub const REVIEWER_TOKEN: &str = "reviewer-token-0123456789abcdefghijklm";
pub const SUBMITTER_TOKEN: &str = "submitter-token-0123456789abcdefghijkl";
pub const OUTSIDER_TOKEN: &str = "outsider-token-0123456789abcdefghijklm";

/// Base path of the seeded contribution's modification pages
pub fn modify_url(page: &str) -> String {
    let base = format!("/conferences/{}/contributions/{}/modify", CONFERENCE, CONTRIBUTION);
    if page.is_empty() {
        base
    } else {
        format!("{}/{}", base, page)
    }
}

/// One conference with a coordinated session, a contribution holding four
/// sub-contributions and an unscheduled contribution
pub fn test_seed() -> Seed {
    serde_json::from_value(json!({
        "conferences": [{
            "id": CONFERENCE,
            "title": "Quantum Days",
            "timezone": "+01:00",
            "managers": ["manager"],
            "coordinator_privileges": ["can_manage_contributions"],
            "sessions": [
                {"id": "s1", "title": "Algorithms", "coordinators": ["coord"]},
                {"id": "s2", "title": "Hardware"}
            ],
            "tracks": [{"id": "t1", "title": "Theory"}],
            "contribution_types": [{"id": "talk", "name": "Talk"}],
            "abstract_fields": [
                {"id": "summary", "name": "Summary"},
                {"id": "legacy", "name": "Legacy notes", "active": false}
            ],
            "paper_review": {"choice": "content_reviewing", "managers": ["prm"]},
            "contributions": [
                {
                    "id": CONTRIBUTION,
                    "title": "Error correction at scale",
                    "description": "Surface codes",
                    "session_id": "s1",
                    "type_id": "talk",
                    "start": "2024-03-01T09:00:00Z",
                    "duration_minutes": 30,
                    "fields": {"summary": "Threshold results", "legacy": "hidden"},
                    "authors": [
                        {"person": {"first_name": "Ada", "family_name": "Lovelace", "affiliation": "AE"}, "primary": true},
                        {"person": {"first_name": "Alan", "family_name": "Turing"}, "primary": false}
                    ],
                    "speakers": [{"first_name": "Ada", "family_name": "Lovelace"}],
                    "submitters": ["submitter"],
                    "sub_contributions": [
                        {"id": "0", "title": "A"},
                        {"id": "1", "title": "B"},
                        {"id": "2", "title": "C"},
                        {"id": "3", "title": "D"}
                    ],
                    "next_child_id": 4
                },
                {"id": UNSCHEDULED, "title": "Unscheduled talk"}
            ]
        }],
        "principals": [
            {"id": "manager", "kind": "user", "name": "Event Manager"},
            {"id": "coord", "kind": "user", "name": "Session Coordinator"},
            {"id": "prm", "kind": "user", "name": "Paper Review Manager"},
            {"id": "submitter", "kind": "user", "name": "Material Submitter"},
            {"id": "outsider", "kind": "user", "name": "Someone Else"},
            {"id": "g1", "kind": "group", "name": "Organizers"}
        ],
        "domains": [
            {"id": "d1", "name": "CERN", "filters": ["137.138."]}
        ]
    }))
    .expect("valid test seed")
}

pub fn test_config() -> Config {
    Config::default()
        .with_token("manager", MANAGER_TOKEN)
        .with_token("coord", COORDINATOR_TOKEN)
        .with_token("prm", REVIEWER_TOKEN)
        .with_token("submitter", SUBMITTER_TOKEN)
        .with_token("outsider", OUTSIDER_TOKEN)
}

/// Create the application router for testing, with a handle on its store
pub fn create_test_app() -> (Router, MemoryStore) {
    let memory = MemoryStore::from_seed(test_seed());
    let state = AppState::new(Store::Memory(memory.clone()), test_config());
    (router(state), memory)
}
