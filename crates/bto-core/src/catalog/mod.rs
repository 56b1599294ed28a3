//! Catalog bootstrap from CSV seed files, plus the JSON snapshot codec.
//!
//! Seeds are the cold-start path: a users file and a projects file produce a
//! fully wired [`Catalog`], with officer assignments approved and each
//! manager's current project pointing at their latest window. Subsequent
//! runs prefer the snapshot written after every command.

mod rows;
pub mod snapshot;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use crate::allocation::{
    ApplicantPost, Catalog, FlatCategory, ManagerPost, MaritalStatus, OfficerPost, OpenWindow,
    Project, ProjectId, Role, User, UserId, UserProfile,
};

pub use snapshot::{read_catalog, write_catalog, SnapshotIoError};

#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("seed row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

fn invalid(row: usize, reason: impl Into<String>) -> CatalogImportError {
    CatalogImportError::InvalidRow {
        row,
        reason: reason.into(),
    }
}

fn marital_status_from_label(value: &str) -> Option<MaritalStatus> {
    match value.trim().to_ascii_lowercase().as_str() {
        "single" => Some(MaritalStatus::Single),
        "married" => Some(MaritalStatus::Married),
        _ => None,
    }
}

fn role_from_label(value: &str) -> Option<Role> {
    match value.trim().to_ascii_lowercase().as_str() {
        "applicant" => Some(Role::Applicant(ApplicantPost::default())),
        "officer" => Some(Role::Officer(OfficerPost::default())),
        "manager" => Some(Role::Manager(ManagerPost::default())),
        _ => None,
    }
}

/// Importer turning the two seed CSVs into a catalog.
pub struct CatalogSeeds;

impl CatalogSeeds {
    pub fn from_paths<U, P>(users: U, projects: P) -> Result<Catalog, CatalogImportError>
    where
        U: AsRef<Path>,
        P: AsRef<Path>,
    {
        let users_file = std::fs::File::open(users)?;
        let projects_file = std::fs::File::open(projects)?;
        Self::from_readers(users_file, projects_file)
    }

    pub fn from_readers<U: Read, P: Read>(
        users: U,
        projects: P,
    ) -> Result<Catalog, CatalogImportError> {
        let user_rows = rows::parse_users(users)?;
        let project_rows = rows::parse_projects(projects)?;

        let mut catalog = Catalog::new();

        for (index, record) in user_rows.into_iter().enumerate() {
            let row = index + 2;
            let user = build_user(row, record)?;
            if catalog.user(user.id()).is_ok() {
                return Err(invalid(row, format!("duplicate national id {}", user.id())));
            }
            catalog.insert_user(user);
        }

        for (index, record) in project_rows.into_iter().enumerate() {
            let row = index + 2;
            insert_project(&mut catalog, row, record)?;
        }

        assign_current_projects(&mut catalog);
        Ok(catalog)
    }
}

fn build_user(row: usize, record: rows::UserRow) -> Result<User, CatalogImportError> {
    let marital_status = marital_status_from_label(&record.marital_status).ok_or_else(|| {
        invalid(
            row,
            format!("unknown marital status {:?}", record.marital_status),
        )
    })?;
    let role = role_from_label(&record.role)
        .ok_or_else(|| invalid(row, format!("unknown role {:?}", record.role)))?;

    Ok(User::new(
        UserProfile {
            user_id: UserId(record.national_id),
            name: record.name,
            age: record.age,
            marital_status,
        },
        role,
    ))
}

fn insert_project(
    catalog: &mut Catalog,
    row: usize,
    record: rows::ProjectRow,
) -> Result<(), CatalogImportError> {
    if catalog.project_by_name(&record.name).is_some() {
        return Err(invalid(
            row,
            format!("duplicate project name {:?}", record.name),
        ));
    }

    let window = OpenWindow::new(record.opens_on, record.closes_on)
        .map_err(|err| invalid(row, err.to_string()))?;

    let mut units: BTreeMap<FlatCategory, u32> = BTreeMap::new();
    for (category, count) in [
        (FlatCategory::TwoRoom, record.two_room_units),
        (FlatCategory::ThreeRoom, record.three_room_units),
    ] {
        if let Some(count) = count.filter(|count| *count > 0) {
            units.insert(category, count);
        }
    }
    if units.is_empty() {
        return Err(invalid(row, "project offers no units in any category"));
    }

    let manager_id = UserId(record.manager.clone());
    let manager = catalog
        .user(&manager_id)
        .map_err(|_| invalid(row, format!("manager {} not in users file", manager_id)))?;
    if manager.manager_post().is_none() {
        return Err(invalid(row, format!("{manager_id} is not a manager")));
    }

    let officer_ids = record.officer_ids();
    if officer_ids.len() > record.officer_slots {
        return Err(invalid(
            row,
            format!(
                "{} officers listed for {} slots",
                officer_ids.len(),
                record.officer_slots
            ),
        ));
    }
    for (position, officer_id) in officer_ids.iter().enumerate() {
        if officer_ids[..position].contains(officer_id) {
            return Err(invalid(row, format!("{officer_id} listed twice")));
        }
        let officer = catalog
            .user(officer_id)
            .map_err(|_| invalid(row, format!("officer {officer_id} not in users file")))?;
        let post = officer
            .officer_post()
            .ok_or_else(|| invalid(row, format!("{officer_id} is not an officer")))?;
        if post.assigned_project.is_some() {
            return Err(invalid(
                row,
                format!("{officer_id} is already assigned to another project"),
            ));
        }
    }

    let project_id = catalog.next_project_id();
    let mut project = Project::new(
        project_id.clone(),
        record.name,
        record.neighborhood,
        window,
        units,
        record.officer_slots,
        manager_id.clone(),
    )
    .map_err(|err| invalid(row, err.to_string()))?;
    project.visible = record.visible.unwrap_or(true);
    project.officers = officer_ids.clone();
    catalog.insert_project(project);

    // Seeded rosters arrive pre-approved.
    for officer_id in &officer_ids {
        if let Some(post) = catalog
            .user_mut(officer_id)
            .ok()
            .and_then(|user| user.officer_post_mut())
        {
            post.assigned_project = Some(project_id.clone());
            post.registration_approved = true;
        }
    }
    if let Some(post) = catalog
        .user_mut(&manager_id)
        .ok()
        .and_then(|user| user.manager_post_mut())
    {
        post.created_projects.push(project_id);
    }

    Ok(())
}

/// Each manager tracks the created project whose window closes last.
fn assign_current_projects(catalog: &mut Catalog) {
    let mut currents: BTreeMap<UserId, (NaiveDate, ProjectId)> = BTreeMap::new();
    for project in catalog.projects() {
        let candidate = (project.window.closes_on, project.project_id.clone());
        currents
            .entry(project.manager.clone())
            .and_modify(|current| {
                if candidate.0 > current.0 {
                    *current = candidate.clone();
                }
            })
            .or_insert(candidate);
    }

    for (manager, (_, project_id)) in currents {
        if let Some(post) = catalog
            .user_mut(&manager)
            .ok()
            .and_then(|user| user.manager_post_mut())
        {
            post.current_project = Some(project_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const USERS_CSV: &str = "National ID,Name,Age,Marital Status,Role\n\
S1234567A,Tan Wei Ming,36,Single,Applicant\n\
T7654321B,Lee Hui Lin,29,Married,Officer\n\
S9876543C,Nur Aisyah,45,Married,Manager\n";

    const PROJECTS_HEADER: &str = "Project Name,Neighborhood,Opens On,Closes On,\
Two Room Units,Three Room Units,Officer Slots,Manager,Officers,Visible\n";

    fn projects_csv(rows: &str) -> String {
        format!("{PROJECTS_HEADER}{rows}")
    }

    fn uid(value: &str) -> UserId {
        UserId(value.to_string())
    }

    fn seed(users: &str, projects: &str) -> Result<Catalog, CatalogImportError> {
        CatalogSeeds::from_readers(
            Cursor::new(users.to_string()),
            Cursor::new(projects.to_string()),
        )
    }

    #[test]
    fn seeds_build_catalog_with_wired_posts() {
        let projects = projects_csv(
            "Acacia Breeze,Yishun,2025-02-15,2025-03-20,2,3,3,S9876543C,T7654321B,true\n",
        );
        let catalog = seed(USERS_CSV, &projects).expect("seed succeeds");

        assert_eq!(catalog.users().count(), 3);
        let project = catalog
            .project_by_name("Acacia Breeze")
            .expect("project present");
        assert_eq!(project.project_id, ProjectId("prj-000001".to_string()));
        assert!(project.visible);
        assert_eq!(project.officers, vec![uid("T7654321B")]);

        let officer = catalog.user(&uid("T7654321B")).expect("officer present");
        let post = officer.officer_post().expect("officer post");
        assert_eq!(post.assigned_project, Some(project.project_id.clone()));
        assert!(post.registration_approved);

        let manager = catalog.user(&uid("S9876543C")).expect("manager present");
        let post = manager.manager_post().expect("manager post");
        assert_eq!(post.created_projects, vec![project.project_id.clone()]);
        assert_eq!(post.current_project, Some(project.project_id.clone()));
    }

    #[test]
    fn duplicate_national_id_is_rejected() {
        let users = "National ID,Name,Age,Marital Status,Role\n\
S1234567A,Tan Wei Ming,36,Single,Applicant\n\
S1234567A,Tan Wei Ming,36,Single,Applicant\n";
        let error = seed(users, PROJECTS_HEADER).expect_err("duplicate id");

        match error {
            CatalogImportError::InvalidRow { row, reason } => {
                assert_eq!(row, 3);
                assert!(reason.contains("duplicate national id"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn unknown_manager_is_rejected() {
        let projects =
            projects_csv("Acacia Breeze,Yishun,2025-02-15,2025-03-20,2,3,3,S0000000X,,true\n");
        let error = seed(USERS_CSV, &projects).expect_err("unknown manager");

        match error {
            CatalogImportError::InvalidRow { reason, .. } => {
                assert!(reason.contains("not in users file"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn officer_list_beyond_slots_is_rejected() {
        let users = "National ID,Name,Age,Marital Status,Role\n\
T7654321B,Lee Hui Lin,29,Married,Officer\n\
T1111111C,Ong Jia Le,31,Married,Officer\n\
S9876543C,Nur Aisyah,45,Married,Manager\n";
        let projects = projects_csv(
            "Acacia Breeze,Yishun,2025-02-15,2025-03-20,2,3,1,S9876543C,T7654321B;T1111111C,true\n",
        );
        let error = seed(users, &projects).expect_err("roster beyond slots");

        match error {
            CatalogImportError::InvalidRow { reason, .. } => {
                assert!(reason.contains("officers listed for"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn inverted_window_is_rejected() {
        let projects =
            projects_csv("Acacia Breeze,Yishun,2025-03-20,2025-02-15,2,3,3,S9876543C,,true\n");
        let error = seed(USERS_CSV, &projects).expect_err("inverted window");

        match error {
            CatalogImportError::InvalidRow { reason, .. } => {
                assert!(reason.contains("closes"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn project_without_units_is_rejected() {
        let projects =
            projects_csv("Acacia Breeze,Yishun,2025-02-15,2025-03-20,0,0,3,S9876543C,,true\n");
        let error = seed(USERS_CSV, &projects).expect_err("no units");

        match error {
            CatalogImportError::InvalidRow { reason, .. } => {
                assert!(reason.contains("offers no units"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn officer_cannot_seed_two_projects() {
        let projects = projects_csv(
            "Acacia Breeze,Yishun,2025-02-15,2025-03-20,2,3,3,S9876543C,T7654321B,true\n\
Bishan Grove,Bishan,2025-06-01,2025-07-01,0,4,3,S9876543C,T7654321B,true\n",
        );
        let error = seed(USERS_CSV, &projects).expect_err("double assignment");

        match error {
            CatalogImportError::InvalidRow { row, reason } => {
                assert_eq!(row, 3);
                assert!(reason.contains("already assigned"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn manager_current_project_tracks_latest_close() {
        let projects = projects_csv(
            "Acacia Breeze,Yishun,2025-02-15,2025-03-20,2,3,3,S9876543C,,true\n\
Bishan Grove,Bishan,2025-06-01,2025-07-01,0,4,3,S9876543C,,true\n",
        );
        let catalog = seed(USERS_CSV, &projects).expect("seed succeeds");

        let later = catalog
            .project_by_name("Bishan Grove")
            .expect("project present")
            .project_id
            .clone();
        let manager = catalog.user(&uid("S9876543C")).expect("manager present");
        assert_eq!(
            manager.manager_post().expect("manager post").current_project,
            Some(later)
        );
    }

    #[test]
    fn visible_column_defaults_to_true_when_empty() {
        let projects =
            projects_csv("Acacia Breeze,Yishun,2025-02-15,2025-03-20,2,3,3,S9876543C,,\n");
        let catalog = seed(USERS_CSV, &projects).expect("seed succeeds");

        assert!(catalog
            .project_by_name("Acacia Breeze")
            .expect("project present")
            .visible);
    }
}
