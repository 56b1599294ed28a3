use super::common::*;
use crate::allocation::{
    CommandError, ConflictError, FlatCategory, ProjectId, ValidationError,
};

#[test]
fn projects_number_sequentially_and_start_visible() {
    let (mut engine, _) = build_engine();

    let project = engine
        .create_project(&uid(MANAGER), draft("Acacia Breeze", 2, 3))
        .expect("project created");

    assert_eq!(project.project_id, ProjectId("prj-000001".to_string()));
    assert!(project.visible);
    assert_eq!(project.manager, uid(MANAGER));
    assert!(project.officers.is_empty());

    let post = engine
        .catalog()
        .user(&uid(MANAGER))
        .expect("user known")
        .manager_post()
        .expect("manager post")
        .clone();
    assert_eq!(post.created_projects, vec![project.project_id.clone()]);
    assert_eq!(post.current_project, Some(project.project_id));
}

#[test]
fn project_names_are_unique() {
    let (mut engine, _) = build_engine();
    engine
        .create_project(&uid(MANAGER), draft("Acacia Breeze", 2, 3))
        .expect("project created");

    match engine.create_project(&uid(MANAGER_TWO), draft("Acacia Breeze", 1, 1)) {
        Err(CommandError::Conflict(ConflictError::DuplicateProjectName(name))) => {
            assert_eq!(name, "Acacia Breeze");
        }
        other => panic!("expected duplicate-name error, got {other:?}"),
    }
}

#[test]
fn managers_cannot_run_two_overlapping_projects() {
    let (mut engine, _) = build_engine();
    let first = engine
        .create_project(&uid(MANAGER), draft("Acacia Breeze", 2, 3))
        .expect("project created");

    match engine.create_project(&uid(MANAGER), draft("Citrus Rise", 1, 1)) {
        Err(CommandError::Conflict(ConflictError::OverlappingManagedWindow { current })) => {
            assert_eq!(current, first.project_id);
        }
        other => panic!("expected overlapping-window error, got {other:?}"),
    }

    // A disjoint window is allowed and takes over as the current project.
    let second = engine
        .create_project(
            &uid(MANAGER),
            draft_with_window("Citrus Rise", 1, 1, date(2025, 4, 1), date(2025, 5, 1)),
        )
        .expect("disjoint project created");
    let post = engine
        .catalog()
        .user(&uid(MANAGER))
        .expect("user known")
        .manager_post()
        .expect("manager post")
        .clone();
    assert_eq!(post.current_project, Some(second.project_id));
    assert_eq!(post.created_projects.len(), 2);
}

#[test]
fn different_managers_may_overlap_freely() {
    let (mut engine, _) = build_engine();
    engine
        .create_project(&uid(MANAGER), draft("Acacia Breeze", 2, 3))
        .expect("project created");
    engine
        .create_project(&uid(MANAGER_TWO), draft("Bishan Loft", 4, 4))
        .expect("overlapping project by another manager");
}

#[test]
fn only_managers_create_projects() {
    let (mut engine, _) = build_engine();

    match engine.create_project(&uid(OFFICER), draft("Acacia Breeze", 2, 3)) {
        Err(CommandError::Validation(ValidationError::NotAManager(user))) => {
            assert_eq!(user, uid(OFFICER));
        }
        other => panic!("expected not-a-manager error, got {other:?}"),
    }
}

#[test]
fn creation_rejects_inverted_windows() {
    let (mut engine, _) = build_engine();

    match engine.create_project(
        &uid(MANAGER),
        draft_with_window("Acacia Breeze", 2, 3, date(2025, 3, 20), date(2025, 2, 15)),
    ) {
        Err(CommandError::Validation(ValidationError::InvalidWindow { opens_on, .. })) => {
            assert_eq!(opens_on, date(2025, 3, 20));
        }
        other => panic!("expected invalid-window error, got {other:?}"),
    }
}

#[test]
fn creation_requires_at_least_one_unit() {
    let (mut engine, _) = build_engine();

    match engine.create_project(&uid(MANAGER), draft("Acacia Breeze", 0, 0)) {
        Err(CommandError::Validation(ValidationError::NoCategoriesOffered)) => {}
        other => panic!("expected no-categories error, got {other:?}"),
    }
}

#[test]
fn zero_count_categories_are_dropped() {
    let (mut engine, _) = build_engine();
    let mut submitted = draft("Acacia Breeze", 3, 0);
    submitted.units.insert(FlatCategory::ThreeRoom, 0);

    let project = engine
        .create_project(&uid(MANAGER), submitted)
        .expect("project created");
    assert!(project.inventory.offers(FlatCategory::TwoRoom));
    assert!(!project.inventory.offers(FlatCategory::ThreeRoom));
}

#[test]
fn visibility_toggles_and_only_for_the_owner() {
    let (mut engine, _, project) = engine_with_project();

    let hidden = engine
        .toggle_visibility(&uid(MANAGER), &project)
        .expect("toggle accepted");
    assert!(!hidden.visible);
    let shown = engine
        .toggle_visibility(&uid(MANAGER), &project)
        .expect("toggle accepted");
    assert!(shown.visible);

    match engine.toggle_visibility(&uid(MANAGER_TWO), &project) {
        Err(CommandError::Validation(ValidationError::NotProjectManager { user, .. })) => {
            assert_eq!(user, uid(MANAGER_TWO));
        }
        other => panic!("expected not-project-manager error, got {other:?}"),
    }
    match engine.toggle_visibility(&uid(OFFICER), &project) {
        Err(CommandError::Validation(ValidationError::NotAManager(_))) => {}
        other => panic!("expected not-a-manager error, got {other:?}"),
    }
}

#[test]
fn listings_track_viewer_eligibility() {
    let (engine, _, _) = engine_with_project();

    assert!(engine
        .visible_projects(&uid(UNDERAGE_APPLICANT))
        .expect("user known")
        .is_empty());
    assert!(engine
        .visible_projects(&uid(YOUNG_SINGLE))
        .expect("user known")
        .is_empty());

    let single = engine
        .visible_projects(&uid(SINGLE_APPLICANT))
        .expect("user known");
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].eligible_categories, vec![FlatCategory::TwoRoom]);

    let married = engine
        .visible_projects(&uid(MARRIED_APPLICANT))
        .expect("user known");
    assert_eq!(
        married[0].eligible_categories,
        vec![FlatCategory::TwoRoom, FlatCategory::ThreeRoom]
    );
}

#[test]
fn single_applicants_skip_projects_without_small_units() {
    let (mut engine, _) = build_engine();
    engine
        .create_project(&uid(MANAGER), draft("Three Room Towers", 0, 6))
        .expect("project created");

    assert!(engine
        .visible_projects(&uid(SINGLE_APPLICANT))
        .expect("user known")
        .is_empty());
    assert_eq!(
        engine
            .visible_projects(&uid(MARRIED_APPLICANT))
            .expect("user known")
            .len(),
        1
    );
}

#[test]
fn hidden_projects_stay_listed_for_their_staff() {
    let (mut engine, _, project) = engine_with_project();
    engine
        .toggle_visibility(&uid(MANAGER), &project)
        .expect("toggle accepted");

    assert!(engine
        .visible_projects(&uid(SINGLE_APPLICANT))
        .expect("user known")
        .is_empty());
    assert!(engine
        .visible_projects(&uid(MANAGER_TWO))
        .expect("user known")
        .is_empty());

    let owner = engine.visible_projects(&uid(MANAGER)).expect("user known");
    assert_eq!(owner.len(), 1);
    assert!(!owner[0].visible);

    let assigned = engine.visible_projects(&uid(OFFICER)).expect("user known");
    assert_eq!(assigned.len(), 1);
}

#[test]
fn listings_sort_by_project_name() {
    let (mut engine, _) = build_engine();
    engine
        .create_project(&uid(MANAGER), draft("Citrus Rise", 2, 2))
        .expect("project created");
    engine
        .create_project(
            &uid(MANAGER),
            draft_with_window("Acacia Breeze", 2, 2, date(2025, 4, 1), date(2025, 5, 1)),
        )
        .expect("project created");
    engine
        .create_project(&uid(MANAGER_TWO), draft("Bishan Loft", 2, 2))
        .expect("project created");

    let names: Vec<String> = engine
        .visible_projects(&uid(MARRIED_APPLICANT))
        .expect("user known")
        .into_iter()
        .map(|summary| summary.name)
        .collect();
    assert_eq!(names, vec!["Acacia Breeze", "Bishan Loft", "Citrus Rise"]);
}

#[test]
fn registration_holds_the_assignment_until_decided() {
    let (mut engine, _, project) = engine_with_project();

    let updated = engine
        .register_officer(&uid(OFFICER_TWO), &project)
        .expect("registration accepted");
    assert!(updated.has_officer(&uid(OFFICER_TWO)));

    let post = engine
        .catalog()
        .user(&uid(OFFICER_TWO))
        .expect("user known")
        .officer_post()
        .expect("officer post")
        .clone();
    assert_eq!(post.assigned_project, Some(project.clone()));
    assert!(!post.registration_approved);

    // The pending assignment already blocks further registrations.
    assert!(!engine
        .can_register(&uid(OFFICER_TWO), &project)
        .expect("pre-check answers"));
}

#[test]
fn approval_flips_the_registration_flag() {
    let (mut engine, _, project) = engine_with_project();
    engine
        .register_officer(&uid(OFFICER_TWO), &project)
        .expect("registration accepted");

    engine
        .approve_officer(&uid(MANAGER), &project, &uid(OFFICER_TWO))
        .expect("approval accepted");

    let post = engine
        .catalog()
        .user(&uid(OFFICER_TWO))
        .expect("user known")
        .officer_post()
        .expect("officer post")
        .clone();
    assert!(post.registration_approved);
    assert_eq!(post.assigned_project, Some(project));
}

#[test]
fn rejection_clears_the_roster_and_the_post() {
    let (mut engine, _, project) = engine_with_project();
    engine
        .register_officer(&uid(OFFICER_TWO), &project)
        .expect("registration accepted");

    let updated = engine
        .reject_officer(&uid(MANAGER), &project, &uid(OFFICER_TWO))
        .expect("rejection accepted");
    assert!(!updated.has_officer(&uid(OFFICER_TWO)));

    let post = engine
        .catalog()
        .user(&uid(OFFICER_TWO))
        .expect("user known")
        .officer_post()
        .expect("officer post")
        .clone();
    assert_eq!(post.assigned_project, None);
    assert!(!post.registration_approved);

    // A rejected officer may bid again.
    engine
        .register_officer(&uid(OFFICER_TWO), &project)
        .expect("second registration accepted");
}

#[test]
fn rosters_cap_at_the_slot_limit() {
    let (mut engine, _) = build_engine();
    let mut submitted = draft("Acacia Breeze", 2, 3);
    submitted.max_officer_slots = 1;
    let project = engine
        .create_project(&uid(MANAGER), submitted)
        .expect("project created")
        .project_id;

    engine
        .register_officer(&uid(OFFICER), &project)
        .expect("registration accepted");
    match engine.register_officer(&uid(OFFICER_TWO), &project) {
        Err(CommandError::Conflict(ConflictError::RosterFull { slots, .. })) => {
            assert_eq!(slots, 1);
        }
        other => panic!("expected roster-full error, got {other:?}"),
    }
}

#[test]
fn assigned_officers_cannot_take_an_overlapping_project() {
    let (mut engine, _, _) = engine_with_project();
    let overlapping = engine
        .create_project(&uid(MANAGER_TWO), draft("Bishan Loft", 4, 4))
        .expect("project created")
        .project_id;

    assert!(!engine
        .can_register(&uid(OFFICER), &overlapping)
        .expect("pre-check answers"));
    match engine.register_officer(&uid(OFFICER), &overlapping) {
        Err(CommandError::Conflict(ConflictError::AlreadyAssigned { project, .. })) => {
            assert_ne!(project, overlapping);
        }
        other => panic!("expected already-assigned error, got {other:?}"),
    }
}

#[test]
fn applicants_on_a_project_cannot_join_its_roster() {
    let (mut engine, _, project) = engine_with_project();
    engine
        .apply(&uid(OFFICER_TWO), &project, FlatCategory::TwoRoom)
        .expect("application accepted");

    match engine.register_officer(&uid(OFFICER_TWO), &project) {
        Err(CommandError::Conflict(ConflictError::ApplicantOnProject { officer, .. })) => {
            assert_eq!(officer, uid(OFFICER_TWO));
        }
        other => panic!("expected applicant-on-project error, got {other:?}"),
    }
}

#[test]
fn approval_requires_roster_membership_and_the_owner() {
    let (mut engine, _, project) = engine_with_project();

    match engine.approve_officer(&uid(MANAGER), &project, &uid(OFFICER_TWO)) {
        Err(CommandError::Validation(ValidationError::NotOnRoster { user, .. })) => {
            assert_eq!(user, uid(OFFICER_TWO));
        }
        other => panic!("expected not-on-roster error, got {other:?}"),
    }

    engine
        .register_officer(&uid(OFFICER_TWO), &project)
        .expect("registration accepted");
    match engine.approve_officer(&uid(MANAGER_TWO), &project, &uid(OFFICER_TWO)) {
        Err(CommandError::Validation(ValidationError::NotProjectManager { .. })) => {}
        other => panic!("expected not-project-manager error, got {other:?}"),
    }
}
