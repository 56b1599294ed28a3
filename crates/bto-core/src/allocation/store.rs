//! In-memory catalog backing the allocation engine.
//!
//! All entities live in flat arenas keyed by generated ids; projects carry
//! id lists into those arenas rather than embedded objects. The whole
//! catalog serializes in one piece, which is what the snapshot sink
//! persists after every mutating command.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::application::Application;
use super::domain::{ApplicationId, EnquiryId, ProjectId, User, UserId};
use super::enquiry::Enquiry;
use super::errors::ValidationError;
use super::project::Project;

/// Monotonic counters behind the generated id families. They are part of
/// the catalog so a restored snapshot keeps numbering where it left off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSequences {
    project: u64,
    application: u64,
    enquiry: u64,
}

impl Default for IdSequences {
    fn default() -> Self {
        Self {
            project: 1,
            application: 1,
            enquiry: 1,
        }
    }
}

impl IdSequences {
    fn next_project(&mut self) -> ProjectId {
        let id = self.project;
        self.project += 1;
        ProjectId(format!("prj-{id:06}"))
    }

    fn next_application(&mut self) -> ApplicationId {
        let id = self.application;
        self.application += 1;
        ApplicationId(format!("app-{id:06}"))
    }

    fn next_enquiry(&mut self) -> EnquiryId {
        let id = self.enquiry;
        self.enquiry += 1;
        EnquiryId(format!("enq-{id:06}"))
    }

    fn observe_project(&mut self, seen: u64) {
        self.project = self.project.max(seen + 1);
    }

    fn observe_application(&mut self, seen: u64) {
        self.application = self.application.max(seen + 1);
    }

    fn observe_enquiry(&mut self, seen: u64) {
        self.enquiry = self.enquiry.max(seen + 1);
    }
}

fn sequence_floor(id: &str, prefix: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.parse().ok()
}

/// Every user, project, application, and enquiry known to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    users: BTreeMap<UserId, User>,
    projects: BTreeMap<ProjectId, Project>,
    applications: BTreeMap<ApplicationId, Application>,
    enquiries: BTreeMap<EnquiryId, Enquiry>,
    sequences: IdSequences,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_project_id(&mut self) -> ProjectId {
        self.sequences.next_project()
    }

    pub fn next_application_id(&mut self) -> ApplicationId {
        self.sequences.next_application()
    }

    pub fn next_enquiry_id(&mut self) -> EnquiryId {
        self.sequences.next_enquiry()
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id().clone(), user);
    }

    pub fn insert_project(&mut self, project: Project) {
        if let Some(seen) = sequence_floor(&project.project_id.0, "prj-") {
            self.sequences.observe_project(seen);
        }
        self.projects.insert(project.project_id.clone(), project);
    }

    pub fn insert_application(&mut self, application: Application) {
        if let Some(seen) = sequence_floor(&application.application_id.0, "app-") {
            self.sequences.observe_application(seen);
        }
        self.applications
            .insert(application.application_id.clone(), application);
    }

    pub fn insert_enquiry(&mut self, enquiry: Enquiry) {
        if let Some(seen) = sequence_floor(&enquiry.enquiry_id.0, "enq-") {
            self.sequences.observe_enquiry(seen);
        }
        self.enquiries.insert(enquiry.enquiry_id.clone(), enquiry);
    }

    pub fn user(&self, id: &UserId) -> Result<&User, ValidationError> {
        self.users
            .get(id)
            .ok_or_else(|| ValidationError::UnknownUser(id.clone()))
    }

    pub fn user_mut(&mut self, id: &UserId) -> Result<&mut User, ValidationError> {
        self.users
            .get_mut(id)
            .ok_or_else(|| ValidationError::UnknownUser(id.clone()))
    }

    pub fn project(&self, id: &ProjectId) -> Result<&Project, ValidationError> {
        self.projects
            .get(id)
            .ok_or_else(|| ValidationError::UnknownProject(id.clone()))
    }

    pub fn project_mut(&mut self, id: &ProjectId) -> Result<&mut Project, ValidationError> {
        self.projects
            .get_mut(id)
            .ok_or_else(|| ValidationError::UnknownProject(id.clone()))
    }

    pub fn application(&self, id: &ApplicationId) -> Result<&Application, ValidationError> {
        self.applications
            .get(id)
            .ok_or_else(|| ValidationError::UnknownApplication(id.clone()))
    }

    pub fn application_mut(
        &mut self,
        id: &ApplicationId,
    ) -> Result<&mut Application, ValidationError> {
        self.applications
            .get_mut(id)
            .ok_or_else(|| ValidationError::UnknownApplication(id.clone()))
    }

    pub fn enquiry(&self, id: &EnquiryId) -> Result<&Enquiry, ValidationError> {
        self.enquiries
            .get(id)
            .ok_or_else(|| ValidationError::UnknownEnquiry(id.clone()))
    }

    pub fn enquiry_mut(&mut self, id: &EnquiryId) -> Result<&mut Enquiry, ValidationError> {
        self.enquiries
            .get_mut(id)
            .ok_or_else(|| ValidationError::UnknownEnquiry(id.clone()))
    }

    /// Approved withdrawals drop the application from the active set.
    pub fn remove_application(&mut self, id: &ApplicationId) -> Option<Application> {
        self.applications.remove(id)
    }

    pub fn remove_enquiry(&mut self, id: &EnquiryId) -> Option<Enquiry> {
        self.enquiries.remove(id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.applications.values()
    }

    pub fn enquiries(&self) -> impl Iterator<Item = &Enquiry> {
        self.enquiries.values()
    }

    /// Project names are a unique key alongside the generated ids.
    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.values().find(|project| project.name == name)
    }
}

/// Persistence seam: the engine hands the full catalog to the sink after
/// every successful command and the sink decides how to store it.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, catalog: &Catalog) -> Result<(), SnapshotError>;
}

/// Snapshot dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Sink that drops every snapshot; used by the demo runner and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSnapshots;

impl SnapshotSink for DiscardSnapshots {
    fn persist(&self, _catalog: &Catalog) -> Result<(), SnapshotError> {
        Ok(())
    }
}
