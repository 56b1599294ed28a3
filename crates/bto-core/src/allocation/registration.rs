//! Officer-registration rules.
//!
//! Registration records the assignment on the officer immediately (pending
//! approval), so the roster-overlap scan mostly guards catalogs restored
//! from a snapshot; it still backs the invariant that no officer sits on
//! two projects with overlapping windows.

use super::domain::{OfficerPost, ProjectId, UserId};
use super::errors::{CommandError, ConflictError};
use super::project::{OpenWindow, Project};

/// Checks every precondition for an officer to bid for a project: no
/// current assignment, no application of their own on that project, and no
/// window overlap with a project already listing them.
pub fn ensure_can_register<'a>(
    officer: &UserId,
    post: &OfficerPost,
    active_application_project: Option<&ProjectId>,
    candidate: &Project,
    existing: impl Iterator<Item = &'a Project>,
) -> Result<(), CommandError> {
    if let Some(assigned) = &post.assigned_project {
        return Err(ConflictError::AlreadyAssigned {
            officer: officer.clone(),
            project: assigned.clone(),
        }
        .into());
    }

    if active_application_project == Some(&candidate.project_id) {
        return Err(ConflictError::ApplicantOnProject {
            officer: officer.clone(),
            project: candidate.project_id.clone(),
        }
        .into());
    }

    for project in existing {
        if project.project_id == candidate.project_id {
            continue;
        }
        if project.has_officer(officer) && project.window.overlaps(&candidate.window) {
            return Err(ConflictError::OverlappingAssignment {
                officer: officer.clone(),
                candidate: candidate.project_id.clone(),
                existing: project.project_id.clone(),
            }
            .into());
        }
    }

    Ok(())
}

/// Boolean form of [`ensure_can_register`] for callers that only need a
/// yes/no answer.
pub fn can_register<'a>(
    officer: &UserId,
    post: &OfficerPost,
    active_application_project: Option<&ProjectId>,
    candidate: &Project,
    existing: impl Iterator<Item = &'a Project>,
) -> bool {
    ensure_can_register(officer, post, active_application_project, candidate, existing).is_ok()
}

/// The roster itself must have room and must not already list the officer.
pub fn ensure_roster_open(candidate: &Project, officer: &UserId) -> Result<(), ConflictError> {
    if candidate.has_officer(officer) {
        return Err(ConflictError::AlreadyOnRoster {
            officer: officer.clone(),
            project: candidate.project_id.clone(),
        });
    }
    if candidate.roster_full() {
        return Err(ConflictError::RosterFull {
            project: candidate.project_id.clone(),
            slots: candidate.max_officer_slots,
        });
    }
    Ok(())
}

/// A manager may not open a project while their current one is still running
/// over the same dates.
pub fn ensure_creation_window_clear(
    current: Option<&Project>,
    window: &OpenWindow,
) -> Result<(), ConflictError> {
    if let Some(project) = current {
        if project.window.overlaps(window) {
            return Err(ConflictError::OverlappingManagedWindow {
                current: project.project_id.clone(),
            });
        }
    }
    Ok(())
}
