use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for users; carries the national-ID-style string used
/// across the seed files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for enquiries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnquiryId(pub String);

impl fmt::Display for EnquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
}

impl MaritalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Married => "Married",
        }
    }
}

/// Flat categories a project can offer. Ordering matters: the first entry is
/// the smallest unit, which is the only one open to older single applicants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FlatCategory {
    TwoRoom,
    ThreeRoom,
}

impl FlatCategory {
    pub const fn ordered() -> [Self; 2] {
        [Self::TwoRoom, Self::ThreeRoom]
    }

    pub const fn smallest() -> Self {
        Self::TwoRoom
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TwoRoom => "2-Room",
            Self::ThreeRoom => "3-Room",
        }
    }
}

impl fmt::Display for FlatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity shared by every role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    pub age: u8,
    pub marital_status: MaritalStatus,
}

/// Applicant capability: the exclusive claim to at most one active
/// application. Officers embed it because they may apply like anyone else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantPost {
    pub active_application: Option<ApplicationId>,
}

/// Officer capability on top of the applicant one: at most one project
/// assignment at a time, pending until a manager approves it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerPost {
    pub applicant: ApplicantPost,
    pub assigned_project: Option<ProjectId>,
    pub registration_approved: bool,
}

/// Manager capability: the projects this manager opened, plus the one whose
/// window is checked when a new project is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerPost {
    pub created_projects: Vec<ProjectId>,
    pub current_project: Option<ProjectId>,
}

/// Closed set of roles. Role-specific behavior is reached by matching on the
/// variant, never by downcasting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    Applicant(ApplicantPost),
    Officer(OfficerPost),
    Manager(ManagerPost),
}

impl Role {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Applicant(_) => "Applicant",
            Self::Officer(_) => "Officer",
            Self::Manager(_) => "Manager",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub profile: UserProfile,
    pub role: Role,
}

impl User {
    pub fn new(profile: UserProfile, role: Role) -> Self {
        Self { profile, role }
    }

    pub fn id(&self) -> &UserId {
        &self.profile.user_id
    }

    /// The applicant capability, present on applicants and officers.
    pub fn applicant_post(&self) -> Option<&ApplicantPost> {
        match &self.role {
            Role::Applicant(post) => Some(post),
            Role::Officer(post) => Some(&post.applicant),
            Role::Manager(_) => None,
        }
    }

    pub fn applicant_post_mut(&mut self) -> Option<&mut ApplicantPost> {
        match &mut self.role {
            Role::Applicant(post) => Some(post),
            Role::Officer(post) => Some(&mut post.applicant),
            Role::Manager(_) => None,
        }
    }

    pub fn officer_post(&self) -> Option<&OfficerPost> {
        match &self.role {
            Role::Officer(post) => Some(post),
            _ => None,
        }
    }

    pub fn officer_post_mut(&mut self) -> Option<&mut OfficerPost> {
        match &mut self.role {
            Role::Officer(post) => Some(post),
            _ => None,
        }
    }

    pub fn manager_post(&self) -> Option<&ManagerPost> {
        match &self.role {
            Role::Manager(post) => Some(post),
            _ => None,
        }
    }

    pub fn manager_post_mut(&mut self) -> Option<&mut ManagerPost> {
        match &mut self.role {
            Role::Manager(post) => Some(post),
            _ => None,
        }
    }

    pub fn active_application(&self) -> Option<&ApplicationId> {
        self.applicant_post()
            .and_then(|post| post.active_application.as_ref())
    }
}
