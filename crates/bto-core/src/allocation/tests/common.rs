use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::allocation::{
    allocation_router, AllocationEngine, ApplicantPost, Catalog, FlatCategory, ManagerPost,
    MaritalStatus, OfficerPost, OpenWindow, Project, ProjectDraft, ProjectId, Role, SharedEngine,
    SnapshotError, SnapshotSink, User, UserId, UserProfile,
};

pub(super) const MANAGER: &str = "S9876543C";
pub(super) const MANAGER_TWO: &str = "S8765432F";
pub(super) const OFFICER: &str = "T7654321B";
pub(super) const OFFICER_TWO: &str = "T1111111C";
pub(super) const SINGLE_APPLICANT: &str = "S1234567A";
pub(super) const MARRIED_APPLICANT: &str = "S2345678B";
pub(super) const YOUNG_SINGLE: &str = "S3456789D";
pub(super) const UNDERAGE_APPLICANT: &str = "S4567890E";

pub(super) fn uid(id: &str) -> UserId {
    UserId(id.to_string())
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn timestamp() -> NaiveDateTime {
    date(2025, 2, 20).and_hms_opt(9, 0, 0).expect("valid time")
}

pub(super) fn profile(id: &str, name: &str, age: u8, marital_status: MaritalStatus) -> UserProfile {
    UserProfile {
        user_id: uid(id),
        name: name.to_string(),
        age,
        marital_status,
    }
}

pub(super) fn applicant(id: &str, name: &str, age: u8, marital_status: MaritalStatus) -> User {
    User::new(
        profile(id, name, age, marital_status),
        Role::Applicant(ApplicantPost::default()),
    )
}

pub(super) fn officer(id: &str, name: &str) -> User {
    User::new(
        profile(id, name, 29, MaritalStatus::Married),
        Role::Officer(OfficerPost::default()),
    )
}

pub(super) fn manager(id: &str, name: &str) -> User {
    User::new(
        profile(id, name, 45, MaritalStatus::Married),
        Role::Manager(ManagerPost::default()),
    )
}

pub(super) fn base_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.insert_user(manager(MANAGER, "Nur Aisyah"));
    catalog.insert_user(manager(MANAGER_TWO, "Goh Boon Keng"));
    catalog.insert_user(officer(OFFICER, "Lee Hui Lin"));
    catalog.insert_user(officer(OFFICER_TWO, "Ong Jia Le"));
    catalog.insert_user(applicant(
        SINGLE_APPLICANT,
        "Tan Wei Ming",
        36,
        MaritalStatus::Single,
    ));
    catalog.insert_user(applicant(
        MARRIED_APPLICANT,
        "Priya Rajan",
        30,
        MaritalStatus::Married,
    ));
    catalog.insert_user(applicant(
        YOUNG_SINGLE,
        "Muhammad Irfan",
        30,
        MaritalStatus::Single,
    ));
    catalog.insert_user(applicant(
        UNDERAGE_APPLICANT,
        "Chloe Lim",
        19,
        MaritalStatus::Single,
    ));
    catalog
}

pub(super) fn draft(name: &str, two_room: u32, three_room: u32) -> ProjectDraft {
    draft_with_window(name, two_room, three_room, date(2025, 2, 15), date(2025, 3, 20))
}

pub(super) fn draft_with_window(
    name: &str,
    two_room: u32,
    three_room: u32,
    opens_on: NaiveDate,
    closes_on: NaiveDate,
) -> ProjectDraft {
    let mut units = BTreeMap::new();
    if two_room > 0 {
        units.insert(FlatCategory::TwoRoom, two_room);
    }
    if three_room > 0 {
        units.insert(FlatCategory::ThreeRoom, three_room);
    }
    ProjectDraft {
        name: name.to_string(),
        neighborhood: "Yishun".to_string(),
        opens_on,
        closes_on,
        units,
        max_officer_slots: 3,
    }
}

/// Standalone project for rule-level tests that bypass the engine.
pub(super) fn bare_project(
    id: &str,
    name: &str,
    manager_id: &str,
    opens_on: NaiveDate,
    closes_on: NaiveDate,
) -> Project {
    let mut units = BTreeMap::new();
    units.insert(FlatCategory::TwoRoom, 2);
    Project::new(
        ProjectId(id.to_string()),
        name.to_string(),
        "Bishan".to_string(),
        OpenWindow::new(opens_on, closes_on).expect("valid window"),
        units,
        3,
        UserId(manager_id.to_string()),
    )
    .expect("valid project")
}

#[derive(Default)]
pub(super) struct RecordingSink {
    snapshots: Mutex<Vec<Catalog>>,
}

impl RecordingSink {
    pub(super) fn count(&self) -> usize {
        self.snapshots.lock().expect("snapshot mutex poisoned").len()
    }

    pub(super) fn last(&self) -> Option<Catalog> {
        self.snapshots
            .lock()
            .expect("snapshot mutex poisoned")
            .last()
            .cloned()
    }
}

impl SnapshotSink for RecordingSink {
    fn persist(&self, catalog: &Catalog) -> Result<(), SnapshotError> {
        self.snapshots
            .lock()
            .expect("snapshot mutex poisoned")
            .push(catalog.clone());
        Ok(())
    }
}

pub(super) struct FailingSink;

impl SnapshotSink for FailingSink {
    fn persist(&self, _catalog: &Catalog) -> Result<(), SnapshotError> {
        Err(SnapshotError::Unavailable(
            "snapshot store offline".to_string(),
        ))
    }
}

pub(super) fn build_engine() -> (AllocationEngine<RecordingSink>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    (AllocationEngine::new(base_catalog(), sink.clone()), sink)
}

/// Engine with one project ("Acacia Breeze", 2x two-room, 3x three-room)
/// whose roster already carries the approved officer fixture.
pub(super) fn engine_with_project() -> (
    AllocationEngine<RecordingSink>,
    Arc<RecordingSink>,
    ProjectId,
) {
    let (mut engine, sink) = build_engine();
    let project = engine
        .create_project(&uid(MANAGER), draft("Acacia Breeze", 2, 3))
        .expect("project created")
        .project_id;
    engine
        .register_officer(&uid(OFFICER), &project)
        .expect("officer registered");
    engine
        .approve_officer(&uid(MANAGER), &project, &uid(OFFICER))
        .expect("officer approved");
    (engine, sink, project)
}

pub(super) fn shared_engine_with_project() -> (SharedEngine<RecordingSink>, ProjectId) {
    let (engine, _, project) = engine_with_project();
    (Arc::new(Mutex::new(engine)), project)
}

pub(super) fn router_with_project() -> (axum::Router, ProjectId) {
    let (engine, project) = shared_engine_with_project();
    (allocation_router(engine), project)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
