//! Build-to-order flat allocation: entities, invariants, and the engine
//! orchestrating them.
//!
//! Everything mutable flows through [`AllocationEngine`]; the entity modules
//! only expose guarded transitions, so a failed command can never leave a
//! half-applied state behind.

pub mod application;
pub mod domain;
pub mod eligibility;
pub mod enquiry;
pub mod errors;
pub mod inventory;
pub mod project;
pub mod registration;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use application::{Application, ApplicationStatus, ReviewOutcome};
pub use domain::{
    ApplicantPost, ApplicationId, EnquiryId, FlatCategory, ManagerPost, MaritalStatus,
    OfficerPost, ProjectId, Role, User, UserId, UserProfile,
};
pub use enquiry::{Enquiry, EnquiryReply};
pub use errors::{CommandError, ConflictError, StateError, ValidationError};
pub use inventory::{FlatInventory, InventoryError, InventoryRow, UnitCount};
pub use project::{OpenWindow, Project, ProjectDraft};
pub use router::{allocation_router, SharedEngine};
pub use service::{AllocationEngine, ProjectSummary};
pub use store::{Catalog, DiscardSnapshots, IdSequences, SnapshotError, SnapshotSink};
