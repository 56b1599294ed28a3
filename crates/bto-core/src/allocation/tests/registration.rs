use super::common::*;
use crate::allocation::registration::{
    can_register, ensure_can_register, ensure_creation_window_clear, ensure_roster_open,
};
use crate::allocation::{CommandError, ConflictError, OfficerPost, OpenWindow, ProjectId};

#[test]
fn registration_rejected_while_assigned_elsewhere() {
    let candidate = bare_project(
        "prj-000002",
        "Bishan Loft",
        MANAGER,
        date(2025, 3, 1),
        date(2025, 4, 1),
    );
    let post = OfficerPost {
        assigned_project: Some(ProjectId("prj-000001".to_string())),
        ..OfficerPost::default()
    };

    match ensure_can_register(&uid(OFFICER), &post, None, &candidate, [].iter()) {
        Err(CommandError::Conflict(ConflictError::AlreadyAssigned { project, .. })) => {
            assert_eq!(project, ProjectId("prj-000001".to_string()));
        }
        other => panic!("expected already-assigned error, got {other:?}"),
    }
}

#[test]
fn officers_cannot_register_where_they_applied() {
    let candidate = bare_project(
        "prj-000002",
        "Bishan Loft",
        MANAGER,
        date(2025, 3, 1),
        date(2025, 4, 1),
    );
    let post = OfficerPost::default();

    match ensure_can_register(
        &uid(OFFICER),
        &post,
        Some(&candidate.project_id),
        &candidate,
        [].iter(),
    ) {
        Err(CommandError::Conflict(ConflictError::ApplicantOnProject { officer, project })) => {
            assert_eq!(officer, uid(OFFICER));
            assert_eq!(project, candidate.project_id);
        }
        other => panic!("expected applicant-on-project error, got {other:?}"),
    }
}

#[test]
fn overlapping_roster_membership_blocks_registration() {
    let mut existing = bare_project(
        "prj-000001",
        "Acacia Breeze",
        MANAGER,
        date(2025, 2, 15),
        date(2025, 3, 10),
    );
    existing.officers.push(uid(OFFICER));
    let candidate = bare_project(
        "prj-000002",
        "Bishan Loft",
        MANAGER_TWO,
        date(2025, 3, 1),
        date(2025, 4, 1),
    );

    match ensure_can_register(
        &uid(OFFICER),
        &OfficerPost::default(),
        None,
        &candidate,
        [existing.clone()].iter(),
    ) {
        Err(CommandError::Conflict(ConflictError::OverlappingAssignment {
            candidate: candidate_id,
            existing: existing_id,
            ..
        })) => {
            assert_eq!(candidate_id, candidate.project_id);
            assert_eq!(existing_id, existing.project_id);
        }
        other => panic!("expected overlapping-assignment error, got {other:?}"),
    }
}

#[test]
fn disjoint_windows_clear_the_overlap_scan() {
    let mut existing = bare_project(
        "prj-000001",
        "Acacia Breeze",
        MANAGER,
        date(2025, 1, 1),
        date(2025, 1, 31),
    );
    existing.officers.push(uid(OFFICER));
    let candidate = bare_project(
        "prj-000002",
        "Bishan Loft",
        MANAGER_TWO,
        date(2025, 3, 1),
        date(2025, 4, 1),
    );

    ensure_can_register(
        &uid(OFFICER),
        &OfficerPost::default(),
        None,
        &candidate,
        [existing].iter(),
    )
    .expect("registration allowed");
}

#[test]
fn overlap_scan_skips_the_candidate_itself() {
    // A catalog iterator usually includes the candidate project; its own
    // roster must not count as an overlapping assignment.
    let mut candidate = bare_project(
        "prj-000002",
        "Bishan Loft",
        MANAGER,
        date(2025, 3, 1),
        date(2025, 4, 1),
    );
    candidate.officers.push(uid(OFFICER_TWO));

    ensure_can_register(
        &uid(OFFICER),
        &OfficerPost::default(),
        None,
        &candidate,
        [candidate.clone()].iter(),
    )
    .expect("registration allowed");
}

#[test]
fn can_register_mirrors_the_guard() {
    let candidate = bare_project(
        "prj-000002",
        "Bishan Loft",
        MANAGER,
        date(2025, 3, 1),
        date(2025, 4, 1),
    );

    assert!(can_register(
        &uid(OFFICER),
        &OfficerPost::default(),
        None,
        &candidate,
        [].iter(),
    ));
    let assigned = OfficerPost {
        assigned_project: Some(ProjectId("prj-000001".to_string())),
        ..OfficerPost::default()
    };
    assert!(!can_register(
        &uid(OFFICER),
        &assigned,
        None,
        &candidate,
        [].iter(),
    ));
}

#[test]
fn roster_rejects_duplicate_members() {
    let mut project = bare_project(
        "prj-000001",
        "Acacia Breeze",
        MANAGER,
        date(2025, 2, 15),
        date(2025, 3, 20),
    );
    project.officers.push(uid(OFFICER));

    match ensure_roster_open(&project, &uid(OFFICER)) {
        Err(ConflictError::AlreadyOnRoster { officer, project: id }) => {
            assert_eq!(officer, uid(OFFICER));
            assert_eq!(id, project.project_id);
        }
        other => panic!("expected already-on-roster error, got {other:?}"),
    }
}

#[test]
fn roster_rejects_members_beyond_the_slot_cap() {
    let mut project = bare_project(
        "prj-000001",
        "Acacia Breeze",
        MANAGER,
        date(2025, 2, 15),
        date(2025, 3, 20),
    );
    project.officers = vec![uid("T0000001A"), uid("T0000002B"), uid("T0000003C")];
    assert!(project.roster_full());

    match ensure_roster_open(&project, &uid(OFFICER)) {
        Err(ConflictError::RosterFull { slots, .. }) => assert_eq!(slots, 3),
        other => panic!("expected roster-full error, got {other:?}"),
    }
}

#[test]
fn managers_cannot_stack_overlapping_windows() {
    let current = bare_project(
        "prj-000001",
        "Acacia Breeze",
        MANAGER,
        date(2025, 2, 15),
        date(2025, 3, 20),
    );
    let window = OpenWindow::new(date(2025, 3, 10), date(2025, 4, 10)).expect("valid window");

    match ensure_creation_window_clear(Some(&current), &window) {
        Err(ConflictError::OverlappingManagedWindow { current: id }) => {
            assert_eq!(id, current.project_id);
        }
        other => panic!("expected overlapping-window error, got {other:?}"),
    }
}

#[test]
fn disjoint_or_absent_current_project_clears_creation() {
    let current = bare_project(
        "prj-000001",
        "Acacia Breeze",
        MANAGER,
        date(2025, 2, 15),
        date(2025, 3, 20),
    );
    let window = OpenWindow::new(date(2025, 4, 1), date(2025, 5, 1)).expect("valid window");

    ensure_creation_window_clear(Some(&current), &window).expect("disjoint window allowed");
    ensure_creation_window_clear(None, &window).expect("no current project");
}

#[test]
fn windows_touching_on_a_single_day_still_overlap() {
    let first = OpenWindow::new(date(2025, 2, 15), date(2025, 3, 20)).expect("valid window");
    let second = OpenWindow::new(date(2025, 3, 20), date(2025, 4, 20)).expect("valid window");

    assert!(first.overlaps(&second));
    assert!(second.overlaps(&first));
}
