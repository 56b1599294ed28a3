//! Failure taxonomy shared by every engine command.
//!
//! Three families, all recoverable: validation (bad input or wrong actor),
//! conflict (the change would violate an invariant), and state (the entity's
//! lifecycle forbids the action). A failed command is always a no-op.

use chrono::NaiveDate;

use super::application::ApplicationStatus;
use super::domain::{ApplicationId, EnquiryId, FlatCategory, ProjectId, UserId};
use super::inventory::InventoryError;

/// Malformed or out-of-range input, including commands issued by an actor
/// whose role does not carry the capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no user {0} in the catalog")]
    UnknownUser(UserId),
    #[error("no project {0} in the catalog")]
    UnknownProject(ProjectId),
    #[error("no application {0} in the catalog")]
    UnknownApplication(ApplicationId),
    #[error("no enquiry {0} in the catalog")]
    UnknownEnquiry(EnquiryId),
    #[error("project {project} does not offer {category} flats")]
    CategoryNotOffered {
        project: ProjectId,
        category: FlatCategory,
    },
    #[error("{user} is not eligible to apply for a {category} flat")]
    Ineligible { user: UserId, category: FlatCategory },
    #[error("booked category {requested} must match the application's selected {selected}")]
    CategoryMismatch {
        selected: FlatCategory,
        requested: FlatCategory,
    },
    #[error("{0} cannot hold applications")]
    CannotHoldApplication(UserId),
    #[error("{0} is not an officer")]
    NotAnOfficer(UserId),
    #[error("{0} is not a manager")]
    NotAManager(UserId),
    #[error("{user} does not manage project {project}")]
    NotProjectManager { user: UserId, project: ProjectId },
    #[error("{user} is not an approved officer for project {project}")]
    OfficerNotAssigned { user: UserId, project: ProjectId },
    #[error("{user} is neither an approved officer on project {project} nor a manager")]
    NotProjectStaff { user: UserId, project: ProjectId },
    #[error("{user} is not registered for project {project}")]
    NotOnRoster { user: UserId, project: ProjectId },
    #[error("{user} did not create enquiry {enquiry}")]
    NotEnquiryCreator { user: UserId, enquiry: EnquiryId },
    #[error("{user} does not own application {application}")]
    NotApplicationOwner {
        user: UserId,
        application: ApplicationId,
    },
    #[error("project window closes ({closes_on}) before it opens ({opens_on})")]
    InvalidWindow {
        opens_on: NaiveDate,
        closes_on: NaiveDate,
    },
    #[error("a project must offer at least one flat category")]
    NoCategoriesOffered,
}

/// The command would violate a cross-entity invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("{user} already holds active application {application}")]
    ActiveApplicationExists {
        user: UserId,
        application: ApplicationId,
    },
    #[error("project name {0:?} is already taken")]
    DuplicateProjectName(String),
    #[error("officer roster for project {project} is full ({slots} slots)")]
    RosterFull { project: ProjectId, slots: usize },
    #[error("{officer} is already registered for project {project}")]
    AlreadyAssigned { officer: UserId, project: ProjectId },
    #[error("{officer} is already on the roster of project {project}")]
    AlreadyOnRoster { officer: UserId, project: ProjectId },
    #[error("{officer} holds an application on project {project}")]
    ApplicantOnProject { officer: UserId, project: ProjectId },
    #[error("project {candidate} overlaps project {existing}, which already lists {officer}")]
    OverlappingAssignment {
        officer: UserId,
        candidate: ProjectId,
        existing: ProjectId,
    },
    #[error("window overlaps the manager's current project {current}")]
    OverlappingManagedWindow { current: ProjectId },
    #[error("no {category} units remaining in project {project}")]
    UnitsExhausted {
        project: ProjectId,
        category: FlatCategory,
    },
    #[error("releasing a {category} unit in project {project} would exceed its total")]
    ReleaseExceedsTotal {
        project: ProjectId,
        category: FlatCategory,
    },
}

/// The entity's current lifecycle state forbids the action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("application {application} is {status}, not pending review")]
    NotPending {
        application: ApplicationId,
        status: ApplicationStatus,
    },
    #[error("application {application} is {status}; only successful applications can be booked")]
    NotSuccessful {
        application: ApplicationId,
        status: ApplicationStatus,
    },
    #[error("application {0} has a withdrawal request pending")]
    WithdrawalPending(ApplicationId),
    #[error("application {0} is already booked")]
    AlreadyBooked(ApplicationId),
    #[error("application {0} already has a withdrawal request")]
    WithdrawalAlreadyRequested(ApplicationId),
    #[error("application {0} has no withdrawal request to approve")]
    NoWithdrawalRequested(ApplicationId),
    #[error("enquiry {0} has been replied to and is locked")]
    EnquiryReplied(EnquiryId),
}

/// Failure result of every engine command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    State(#[from] StateError),
}

impl CommandError {
    /// Attach project context to an inventory failure.
    pub(crate) fn inventory(project: &ProjectId, err: InventoryError) -> Self {
        match err {
            InventoryError::UnknownCategory(category) => ValidationError::CategoryNotOffered {
                project: project.clone(),
                category,
            }
            .into(),
            InventoryError::Exhausted { category } => ConflictError::UnitsExhausted {
                project: project.clone(),
                category,
            }
            .into(),
            InventoryError::ExceedsTotal { category, .. } => ConflictError::ReleaseExceedsTotal {
                project: project.clone(),
                category,
            }
            .into(),
        }
    }
}
