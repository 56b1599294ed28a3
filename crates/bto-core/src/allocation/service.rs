//! Allocation engine: the orchestration layer every command goes through.
//!
//! The engine owns the catalog and enforces command preconditions in a
//! fixed shape: validate through shared borrows first, then mutate, then
//! hand the catalog to the snapshot sink. A command that fails leaves the
//! catalog untouched; the only fallible step after validation is the
//! inventory adjustment, which is always performed before any other write.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

use super::application::{Application, ReviewOutcome};
use super::domain::{ApplicationId, EnquiryId, FlatCategory, ProjectId, Role, User, UserId};
use super::eligibility;
use super::enquiry::Enquiry;
use super::errors::{CommandError, ConflictError, ValidationError};
use super::inventory::InventoryRow;
use super::project::{OpenWindow, Project, ProjectDraft};
use super::registration;
use super::store::{Catalog, SnapshotSink};

/// Per-viewer listing of one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project_id: ProjectId,
    pub name: String,
    pub neighborhood: String,
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
    pub visible: bool,
    pub units: Vec<InventoryRow>,
    pub eligible_categories: Vec<FlatCategory>,
    pub officer_slots: usize,
    pub officers_registered: usize,
}

impl ProjectSummary {
    fn for_viewer(viewer: &User, project: &Project) -> Self {
        let eligible_categories = match viewer.applicant_post() {
            Some(_) => project
                .inventory
                .categories()
                .filter(|category| eligibility::can_apply(&viewer.profile, *category))
                .collect(),
            None => Vec::new(),
        };

        Self {
            project_id: project.project_id.clone(),
            name: project.name.clone(),
            neighborhood: project.neighborhood.clone(),
            opens_on: project.window.opens_on,
            closes_on: project.window.closes_on,
            visible: project.visible,
            units: project.inventory.snapshot(),
            eligible_categories,
            officer_slots: project.max_officer_slots,
            officers_registered: project.officers.len(),
        }
    }
}

/// Whether a project shows up in a viewer's listing. Staff see their own
/// projects even when hidden; applicant-capable viewers only see visible
/// projects offering at least one category they qualify for.
fn listed_for(viewer: &User, project: &Project) -> bool {
    if project.manager == *viewer.id() {
        return true;
    }
    if let Some(post) = viewer.officer_post() {
        if post.assigned_project.as_ref() == Some(&project.project_id) {
            return true;
        }
    }
    if !project.visible {
        return false;
    }
    match viewer.applicant_post() {
        Some(_) => project
            .inventory
            .categories()
            .any(|category| eligibility::can_apply(&viewer.profile, category)),
        None => true,
    }
}

/// Engine composing the catalog with a snapshot sink.
pub struct AllocationEngine<P> {
    catalog: Catalog,
    sink: Arc<P>,
}

impl<P> AllocationEngine<P>
where
    P: SnapshotSink,
{
    pub fn new(catalog: Catalog, sink: Arc<P>) -> Self {
        Self { catalog, sink }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Offer the catalog to the sink after a successful command. Snapshot
    /// trouble is reported but never fails the command; the in-memory state
    /// has already moved on.
    fn flush(&self) {
        if let Err(err) = self.sink.persist(&self.catalog) {
            warn!(error = %err, "catalog snapshot failed");
        }
    }

    // --- queries ------------------------------------------------------

    /// Projects the viewer can browse, sorted by name.
    pub fn visible_projects(&self, viewer: &UserId) -> Result<Vec<ProjectSummary>, CommandError> {
        let viewer = self.catalog.user(viewer)?;
        let mut summaries: Vec<ProjectSummary> = self
            .catalog
            .projects()
            .filter(|project| listed_for(viewer, project))
            .map(|project| ProjectSummary::for_viewer(viewer, project))
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    pub fn active_application(&self, user: &UserId) -> Result<Option<Application>, CommandError> {
        let user = self.catalog.user(user)?;
        match user.active_application() {
            Some(id) => Ok(Some(self.catalog.application(id)?.clone())),
            None => Ok(None),
        }
    }

    pub fn project_applications(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<Application>, CommandError> {
        let project = self.catalog.project(project)?;
        Ok(project
            .applications
            .iter()
            .filter_map(|id| self.catalog.application(id).ok())
            .cloned()
            .collect())
    }

    pub fn project_enquiries(&self, project: &ProjectId) -> Result<Vec<Enquiry>, CommandError> {
        let project = self.catalog.project(project)?;
        Ok(project
            .enquiries
            .iter()
            .filter_map(|id| self.catalog.enquiry(id).ok())
            .cloned()
            .collect())
    }

    pub fn remaining_units(&self, project: &ProjectId) -> Result<Vec<InventoryRow>, CommandError> {
        Ok(self.catalog.project(project)?.inventory.snapshot())
    }

    /// Registration pre-check without side effects.
    pub fn can_register(
        &self,
        officer: &UserId,
        project: &ProjectId,
    ) -> Result<bool, CommandError> {
        let user = self.catalog.user(officer)?;
        let post = user
            .officer_post()
            .ok_or_else(|| ValidationError::NotAnOfficer(officer.clone()))?;
        let candidate = self.catalog.project(project)?;
        let active_project = user
            .active_application()
            .and_then(|id| self.catalog.application(id).ok())
            .map(|application| &application.project);
        Ok(registration::can_register(
            officer,
            post,
            active_project,
            candidate,
            self.catalog.projects(),
        ))
    }

    // --- application commands -----------------------------------------

    /// Submit an application for one flat category of one project.
    pub fn apply(
        &mut self,
        applicant: &UserId,
        project: &ProjectId,
        category: FlatCategory,
    ) -> Result<Application, CommandError> {
        {
            let user = self.catalog.user(applicant)?;
            let post = user
                .applicant_post()
                .ok_or_else(|| ValidationError::CannotHoldApplication(applicant.clone()))?;
            if let Some(existing) = &post.active_application {
                return Err(ConflictError::ActiveApplicationExists {
                    user: applicant.clone(),
                    application: existing.clone(),
                }
                .into());
            }
            if !eligibility::can_apply(&user.profile, category) {
                return Err(ValidationError::Ineligible {
                    user: applicant.clone(),
                    category,
                }
                .into());
            }
            let target = self.catalog.project(project)?;
            if !target.inventory.offers(category) {
                return Err(ValidationError::CategoryNotOffered {
                    project: project.clone(),
                    category,
                }
                .into());
            }
        }

        let application_id = self.catalog.next_application_id();
        let application = Application::new(
            application_id.clone(),
            applicant.clone(),
            project.clone(),
            category,
            Utc::now().naive_utc(),
        );
        self.catalog.insert_application(application.clone());
        self.catalog
            .project_mut(project)?
            .applications
            .push(application_id.clone());
        if let Some(post) = self.catalog.user_mut(applicant)?.applicant_post_mut() {
            post.active_application = Some(application_id);
        }

        self.flush();
        Ok(application)
    }

    /// Officer adjudication of a pending application.
    pub fn review_application(
        &mut self,
        officer: &UserId,
        application: &ApplicationId,
        outcome: ReviewOutcome,
    ) -> Result<Application, CommandError> {
        let project = self.catalog.application(application)?.project.clone();
        self.ensure_officer_manages(officer, &project)?;

        let entry = self.catalog.application_mut(application)?;
        entry.review(outcome)?;
        let updated = entry.clone();

        self.flush();
        Ok(updated)
    }

    /// Convert a successful application into a booked unit. The requested
    /// category must be the one fixed at submission; the inventory
    /// decrement happens before the status flip so a failed adjustment
    /// leaves no trace.
    pub fn book(
        &mut self,
        officer: &UserId,
        application: &ApplicationId,
        category: FlatCategory,
    ) -> Result<Application, CommandError> {
        let (project, selected) = {
            let entry = self.catalog.application(application)?;
            (entry.project.clone(), entry.category)
        };
        self.ensure_officer_manages(officer, &project)?;
        if category != selected {
            return Err(ValidationError::CategoryMismatch {
                selected,
                requested: category,
            }
            .into());
        }
        self.catalog.application(application)?.ensure_bookable()?;

        self.catalog
            .project_mut(&project)?
            .inventory
            .book_unit(category)
            .map_err(|err| CommandError::inventory(&project, err))?;

        let entry = self.catalog.application_mut(application)?;
        entry.confirm_booking();
        let updated = entry.clone();

        self.flush();
        Ok(updated)
    }

    /// Applicant asks to cancel; blocked once the application is booked.
    pub fn request_withdrawal(
        &mut self,
        applicant: &UserId,
        application: &ApplicationId,
    ) -> Result<Application, CommandError> {
        self.catalog.user(applicant)?;
        let entry = self.catalog.application(application)?;
        if &entry.applicant != applicant {
            return Err(ValidationError::NotApplicationOwner {
                user: applicant.clone(),
                application: application.clone(),
            }
            .into());
        }

        let entry = self.catalog.application_mut(application)?;
        entry.request_withdrawal()?;
        let updated = entry.clone();

        self.flush();
        Ok(updated)
    }

    /// Project staff grant a requested withdrawal: the application leaves
    /// the active set, and a booked unit goes back into inventory.
    pub fn approve_withdrawal(
        &mut self,
        actor: &UserId,
        application: &ApplicationId,
    ) -> Result<Application, CommandError> {
        let (project, category, applicant, booked) = {
            let entry = self.catalog.application(application)?;
            (
                entry.project.clone(),
                entry.category,
                entry.applicant.clone(),
                entry.is_booked(),
            )
        };
        self.ensure_can_administer(actor, &project)?;
        // The applicant must resolve before any counters move.
        self.catalog.user(&applicant)?;
        self.catalog
            .application(application)?
            .ensure_withdrawal_requested()?;

        if booked {
            self.catalog
                .project_mut(&project)?
                .inventory
                .release_unit(category)
                .map_err(|err| CommandError::inventory(&project, err))?;
        }

        let removed = self
            .catalog
            .remove_application(application)
            .ok_or_else(|| ValidationError::UnknownApplication(application.clone()))?;
        self.catalog
            .project_mut(&project)?
            .detach_application(application);
        if let Some(post) = self.catalog.user_mut(&applicant)?.applicant_post_mut() {
            if post.active_application.as_ref() == Some(application) {
                post.active_application = None;
            }
        }

        self.flush();
        Ok(removed)
    }

    // --- officer commands ---------------------------------------------

    /// Officer bids to administer a project, pending manager approval.
    pub fn register_officer(
        &mut self,
        officer: &UserId,
        project: &ProjectId,
    ) -> Result<Project, CommandError> {
        {
            let user = self.catalog.user(officer)?;
            let post = user
                .officer_post()
                .ok_or_else(|| ValidationError::NotAnOfficer(officer.clone()))?;
            let candidate = self.catalog.project(project)?;
            let active_project = user
                .active_application()
                .and_then(|id| self.catalog.application(id).ok())
                .map(|application| &application.project);
            registration::ensure_can_register(
                officer,
                post,
                active_project,
                candidate,
                self.catalog.projects(),
            )?;
            registration::ensure_roster_open(candidate, officer)?;
        }

        self.catalog
            .project_mut(project)?
            .officers
            .push(officer.clone());
        if let Some(post) = self.catalog.user_mut(officer)?.officer_post_mut() {
            post.assigned_project = Some(project.clone());
            post.registration_approved = false;
        }
        let updated = self.catalog.project(project)?.clone();

        self.flush();
        Ok(updated)
    }

    pub fn approve_officer(
        &mut self,
        manager: &UserId,
        project: &ProjectId,
        officer: &UserId,
    ) -> Result<Project, CommandError> {
        self.ensure_project_manager(manager, project)?;
        if !self.catalog.project(project)?.has_officer(officer) {
            return Err(ValidationError::NotOnRoster {
                user: officer.clone(),
                project: project.clone(),
            }
            .into());
        }
        self.catalog
            .user(officer)?
            .officer_post()
            .ok_or_else(|| ValidationError::NotAnOfficer(officer.clone()))?;

        if let Some(post) = self.catalog.user_mut(officer)?.officer_post_mut() {
            post.registration_approved = true;
        }
        let updated = self.catalog.project(project)?.clone();

        self.flush();
        Ok(updated)
    }

    /// Rejection drops the officer from the roster and clears the pending
    /// assignment; inventory is untouched.
    pub fn reject_officer(
        &mut self,
        manager: &UserId,
        project: &ProjectId,
        officer: &UserId,
    ) -> Result<Project, CommandError> {
        self.ensure_project_manager(manager, project)?;
        if !self.catalog.project(project)?.has_officer(officer) {
            return Err(ValidationError::NotOnRoster {
                user: officer.clone(),
                project: project.clone(),
            }
            .into());
        }
        self.catalog.user(officer)?;

        self.catalog.project_mut(project)?.remove_officer(officer);
        if let Some(post) = self.catalog.user_mut(officer)?.officer_post_mut() {
            post.assigned_project = None;
            post.registration_approved = false;
        }
        let updated = self.catalog.project(project)?.clone();

        self.flush();
        Ok(updated)
    }

    // --- manager commands ---------------------------------------------

    /// Open a new project. It becomes the manager's current project and
    /// starts visible.
    pub fn create_project(
        &mut self,
        manager: &UserId,
        draft: ProjectDraft,
    ) -> Result<Project, CommandError> {
        let window = OpenWindow::new(draft.opens_on, draft.closes_on)?;
        {
            let user = self.catalog.user(manager)?;
            let post = user
                .manager_post()
                .ok_or_else(|| ValidationError::NotAManager(manager.clone()))?;
            if self.catalog.project_by_name(&draft.name).is_some() {
                return Err(ConflictError::DuplicateProjectName(draft.name.clone()).into());
            }
            let current = post
                .current_project
                .as_ref()
                .and_then(|id| self.catalog.project(id).ok());
            registration::ensure_creation_window_clear(current, &window)?;
        }

        let units: BTreeMap<FlatCategory, u32> = draft
            .units
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .collect();
        if units.is_empty() {
            return Err(ValidationError::NoCategoriesOffered.into());
        }

        let project_id = self.catalog.next_project_id();
        let project = Project::new(
            project_id.clone(),
            draft.name,
            draft.neighborhood,
            window,
            units,
            draft.max_officer_slots,
            manager.clone(),
        )?;
        self.catalog.insert_project(project.clone());
        if let Some(post) = self.catalog.user_mut(manager)?.manager_post_mut() {
            post.created_projects.push(project_id.clone());
            post.current_project = Some(project_id);
        }

        self.flush();
        Ok(project)
    }

    pub fn toggle_visibility(
        &mut self,
        manager: &UserId,
        project: &ProjectId,
    ) -> Result<Project, CommandError> {
        self.ensure_project_manager(manager, project)?;

        let entry = self.catalog.project_mut(project)?;
        entry.visible = !entry.visible;
        let updated = entry.clone();

        self.flush();
        Ok(updated)
    }

    // --- enquiry commands ---------------------------------------------

    pub fn create_enquiry(
        &mut self,
        author: &UserId,
        project: &ProjectId,
        content: String,
    ) -> Result<Enquiry, CommandError> {
        self.catalog.user(author)?;
        self.catalog.project(project)?;

        let enquiry_id = self.catalog.next_enquiry_id();
        let enquiry = Enquiry::new(
            enquiry_id.clone(),
            author.clone(),
            project.clone(),
            content,
            Utc::now().naive_utc(),
        );
        self.catalog.insert_enquiry(enquiry.clone());
        self.catalog
            .project_mut(project)?
            .enquiries
            .push(enquiry_id);

        self.flush();
        Ok(enquiry)
    }

    pub fn edit_enquiry(
        &mut self,
        editor: &UserId,
        enquiry: &EnquiryId,
        content: String,
    ) -> Result<Enquiry, CommandError> {
        self.catalog.user(editor)?;

        let entry = self.catalog.enquiry_mut(enquiry)?;
        entry.edit(editor, content)?;
        let updated = entry.clone();

        self.flush();
        Ok(updated)
    }

    pub fn delete_enquiry(
        &mut self,
        user: &UserId,
        enquiry: &EnquiryId,
    ) -> Result<Enquiry, CommandError> {
        self.catalog.user(user)?;
        let entry = self.catalog.enquiry(enquiry)?;
        entry.ensure_deletable_by(user)?;
        let project = entry.project.clone();

        let removed = self
            .catalog
            .remove_enquiry(enquiry)
            .ok_or_else(|| ValidationError::UnknownEnquiry(enquiry.clone()))?;
        self.catalog.project_mut(&project)?.detach_enquiry(enquiry);

        self.flush();
        Ok(removed)
    }

    /// Project staff answer an enquiry; the first reply locks it for good.
    pub fn reply_enquiry(
        &mut self,
        actor: &UserId,
        enquiry: &EnquiryId,
        content: String,
    ) -> Result<Enquiry, CommandError> {
        let project = self.catalog.enquiry(enquiry)?.project.clone();
        self.ensure_can_administer(actor, &project)?;

        let entry = self.catalog.enquiry_mut(enquiry)?;
        entry.reply(actor.clone(), content, Utc::now().naive_utc())?;
        let updated = entry.clone();

        self.flush();
        Ok(updated)
    }

    // --- shared guards ------------------------------------------------

    /// Actor must be the approved officer assigned to this project.
    fn ensure_officer_manages(
        &self,
        officer: &UserId,
        project: &ProjectId,
    ) -> Result<(), CommandError> {
        let user = self.catalog.user(officer)?;
        let post = user
            .officer_post()
            .ok_or_else(|| ValidationError::NotAnOfficer(officer.clone()))?;
        if post.assigned_project.as_ref() != Some(project) || !post.registration_approved {
            return Err(ValidationError::OfficerNotAssigned {
                user: officer.clone(),
                project: project.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Actor must be the project's approved officer or any manager.
    fn ensure_can_administer(
        &self,
        actor: &UserId,
        project: &ProjectId,
    ) -> Result<(), CommandError> {
        let user = self.catalog.user(actor)?;
        let allowed = match &user.role {
            Role::Manager(_) => true,
            Role::Officer(post) => {
                post.registration_approved && post.assigned_project.as_ref() == Some(project)
            }
            Role::Applicant(_) => false,
        };
        if !allowed {
            return Err(ValidationError::NotProjectStaff {
                user: actor.clone(),
                project: project.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Actor must be the manager who opened the project.
    fn ensure_project_manager(
        &self,
        manager: &UserId,
        project: &ProjectId,
    ) -> Result<(), CommandError> {
        let user = self.catalog.user(manager)?;
        user.manager_post()
            .ok_or_else(|| ValidationError::NotAManager(manager.clone()))?;
        let target = self.catalog.project(project)?;
        if &target.manager != manager {
            return Err(ValidationError::NotProjectManager {
                user: manager.clone(),
                project: project.clone(),
            }
            .into());
        }
        Ok(())
    }
}
