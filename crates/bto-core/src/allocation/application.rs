use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::{ApplicationId, FlatCategory, ProjectId, UserId};
use super::errors::StateError;

/// Status lifecycle for a flat application. `Unsuccessful` is terminal;
/// `Booked` holds a unit until an approved withdrawal releases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Successful,
    Unsuccessful,
    Booked,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Successful => "Successful",
            Self::Unsuccessful => "Unsuccessful",
            Self::Booked => "Booked",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Officer adjudication of a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Successful,
    Unsuccessful,
}

/// One applicant's claim against one project for one flat category. The
/// category is chosen at submission and never changes; withdrawal is an
/// orthogonal flag so a request can sit on any non-booked status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub application_id: ApplicationId,
    pub applicant: UserId,
    pub project: ProjectId,
    pub category: FlatCategory,
    pub status: ApplicationStatus,
    pub withdrawal_requested: bool,
    pub submitted_at: NaiveDateTime,
}

impl Application {
    pub fn new(
        application_id: ApplicationId,
        applicant: UserId,
        project: ProjectId,
        category: FlatCategory,
        submitted_at: NaiveDateTime,
    ) -> Self {
        Self {
            application_id,
            applicant,
            project,
            category,
            status: ApplicationStatus::Pending,
            withdrawal_requested: false,
            submitted_at,
        }
    }

    /// Move a pending application to its review outcome.
    pub fn review(&mut self, outcome: ReviewOutcome) -> Result<(), StateError> {
        if self.status != ApplicationStatus::Pending {
            return Err(StateError::NotPending {
                application: self.application_id.clone(),
                status: self.status,
            });
        }

        self.status = match outcome {
            ReviewOutcome::Successful => ApplicationStatus::Successful,
            ReviewOutcome::Unsuccessful => ApplicationStatus::Unsuccessful,
        };
        Ok(())
    }

    /// Booking guard: only a successful application with no withdrawal
    /// request may proceed to a unit.
    pub fn ensure_bookable(&self) -> Result<(), StateError> {
        if self.status != ApplicationStatus::Successful {
            return Err(StateError::NotSuccessful {
                application: self.application_id.clone(),
                status: self.status,
            });
        }
        if self.withdrawal_requested {
            return Err(StateError::WithdrawalPending(self.application_id.clone()));
        }
        Ok(())
    }

    /// Record the booking. Callers must have passed [`Self::ensure_bookable`]
    /// and decremented the project inventory first.
    pub fn confirm_booking(&mut self) {
        self.status = ApplicationStatus::Booked;
    }

    /// Flag a withdrawal request. Booked applications can no longer request
    /// one, and a pending request is not stacked twice.
    pub fn request_withdrawal(&mut self) -> Result<(), StateError> {
        if self.status == ApplicationStatus::Booked {
            return Err(StateError::AlreadyBooked(self.application_id.clone()));
        }
        if self.withdrawal_requested {
            return Err(StateError::WithdrawalAlreadyRequested(
                self.application_id.clone(),
            ));
        }

        self.withdrawal_requested = true;
        Ok(())
    }

    /// Approval guard: a withdrawal must have been requested first. The
    /// status reached in the meantime does not matter.
    pub fn ensure_withdrawal_requested(&self) -> Result<(), StateError> {
        if !self.withdrawal_requested {
            return Err(StateError::NoWithdrawalRequested(
                self.application_id.clone(),
            ));
        }
        Ok(())
    }

    pub fn is_booked(&self) -> bool {
        self.status == ApplicationStatus::Booked
    }
}
