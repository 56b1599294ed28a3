use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::domain::{EnquiryId, ProjectId, UserId};
use super::errors::{CommandError, StateError, ValidationError};

/// Write-once reply; its presence locks the enquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnquiryReply {
    pub author: UserId,
    pub content: String,
    pub replied_at: NaiveDateTime,
}

/// A question raised by any user against one project. The creator may edit
/// or delete it freely until the first reply arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enquiry {
    pub enquiry_id: EnquiryId,
    pub author: UserId,
    pub project: ProjectId,
    pub content: String,
    pub reply: Option<EnquiryReply>,
    pub created_at: NaiveDateTime,
}

impl Enquiry {
    pub fn new(
        enquiry_id: EnquiryId,
        author: UserId,
        project: ProjectId,
        content: String,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            enquiry_id,
            author,
            project,
            content,
            reply: None,
            created_at,
        }
    }

    pub fn is_replied(&self) -> bool {
        self.reply.is_some()
    }

    fn ensure_open(&self) -> Result<(), StateError> {
        if self.is_replied() {
            return Err(StateError::EnquiryReplied(self.enquiry_id.clone()));
        }
        Ok(())
    }

    fn ensure_creator(&self, user: &UserId) -> Result<(), ValidationError> {
        if &self.author != user {
            return Err(ValidationError::NotEnquiryCreator {
                user: user.clone(),
                enquiry: self.enquiry_id.clone(),
            });
        }
        Ok(())
    }

    /// Creator rewrites the content; rejected once a reply has locked the
    /// enquiry.
    pub fn edit(&mut self, editor: &UserId, content: String) -> Result<(), CommandError> {
        self.ensure_creator(editor)?;
        self.ensure_open()?;
        self.content = content;
        Ok(())
    }

    /// Deletion guard; the catalog performs the actual removal.
    pub fn ensure_deletable_by(&self, user: &UserId) -> Result<(), CommandError> {
        self.ensure_creator(user)?;
        self.ensure_open()?;
        Ok(())
    }

    /// Attach the single allowed reply. Actor authorization is the engine's
    /// concern; this only enforces write-once.
    pub fn reply(
        &mut self,
        author: UserId,
        content: String,
        replied_at: NaiveDateTime,
    ) -> Result<(), StateError> {
        self.ensure_open()?;
        self.reply = Some(EnquiryReply {
            author,
            content,
            replied_at,
        });
        Ok(())
    }
}
