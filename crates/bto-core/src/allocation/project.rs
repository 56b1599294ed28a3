use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, EnquiryId, FlatCategory, ProjectId, UserId};
use super::errors::ValidationError;
use super::inventory::FlatInventory;

/// Inclusive application window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenWindow {
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
}

impl OpenWindow {
    pub fn new(opens_on: NaiveDate, closes_on: NaiveDate) -> Result<Self, ValidationError> {
        if closes_on < opens_on {
            return Err(ValidationError::InvalidWindow { opens_on, closes_on });
        }
        Ok(Self { opens_on, closes_on })
    }

    /// Two inclusive windows overlap unless one closes before the other
    /// opens.
    pub fn overlaps(&self, other: &OpenWindow) -> bool {
        self.opens_on <= other.closes_on && other.opens_on <= self.closes_on
    }
}

/// Inbound shape for opening a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub neighborhood: String,
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
    pub units: BTreeMap<FlatCategory, u32>,
    #[serde(default = "default_officer_slots")]
    pub max_officer_slots: usize,
}

const fn default_officer_slots() -> usize {
    10
}

/// A housing development: fixed unit inventory, an application window, and
/// the officer roster administering it. Applications and enquiries are held
/// as id lists into the catalog arenas, never as embedded objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub name: String,
    pub neighborhood: String,
    pub window: OpenWindow,
    pub inventory: FlatInventory,
    pub visible: bool,
    pub manager: UserId,
    pub max_officer_slots: usize,
    pub officers: Vec<UserId>,
    pub applications: Vec<ApplicationId>,
    pub enquiries: Vec<EnquiryId>,
}

impl Project {
    /// New projects start visible with an empty roster and every unit
    /// available.
    pub fn new(
        project_id: ProjectId,
        name: String,
        neighborhood: String,
        window: OpenWindow,
        totals: BTreeMap<FlatCategory, u32>,
        max_officer_slots: usize,
        manager: UserId,
    ) -> Result<Self, ValidationError> {
        if totals.is_empty() {
            return Err(ValidationError::NoCategoriesOffered);
        }

        Ok(Self {
            project_id,
            name,
            neighborhood,
            window,
            inventory: FlatInventory::new(totals),
            visible: true,
            manager,
            max_officer_slots,
            officers: Vec::new(),
            applications: Vec::new(),
            enquiries: Vec::new(),
        })
    }

    pub fn has_officer(&self, officer: &UserId) -> bool {
        self.officers.iter().any(|id| id == officer)
    }

    pub fn roster_full(&self) -> bool {
        self.officers.len() >= self.max_officer_slots
    }

    pub fn remove_officer(&mut self, officer: &UserId) {
        self.officers.retain(|id| id != officer);
    }

    pub fn detach_application(&mut self, application: &ApplicationId) {
        self.applications.retain(|id| id != application);
    }

    pub fn detach_enquiry(&mut self, enquiry: &EnquiryId) {
        self.enquiries.retain(|id| id != enquiry);
    }
}
