//! CreationForm - name/email inputs and the create request they submit.

use roster_state::{AuthorityResult, RecordAuthority, RecordDraft};
use tracing::{info, warn};

use crate::error::{ActionResult, ClientError, TransitionError, ValidationError};
use crate::request::Followup;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CreationForm {
    name: String,
    email: String,
    submitting: bool,
}

impl CreationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Inputs and the submit control are disabled while a create is in flight.
    pub fn inputs_enabled(&self) -> bool {
        !self.submitting
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ActionResult<()> {
        self.ensure_idle()?;
        self.name = name.into();
        Ok(())
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> ActionResult<()> {
        self.ensure_idle()?;
        self.email = email.into();
        Ok(())
    }

    /// Empty-string check only. Whitespace-only values are accepted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.name.is_empty(), self.email.is_empty()) {
            (true, true) => Err(ValidationError::BothEmpty),
            (true, false) => Err(ValidationError::NameEmpty),
            (false, true) => Err(ValidationError::EmailEmpty),
            (false, false) => Ok(()),
        }
    }

    /// Validate and enter the submitting state, returning the create payload.
    pub fn begin_submit(&mut self) -> ActionResult<RecordDraft> {
        self.ensure_idle()?;
        self.validate()?;
        self.submitting = true;
        Ok(RecordDraft::new(self.name.clone(), self.email.clone()))
    }

    /// Apply the create result. Success clears the fields and asks for a
    /// refresh; failure keeps what the user typed.
    pub fn finish_submit(&mut self, result: AuthorityResult<()>) -> ActionResult<Followup> {
        if !self.submitting {
            return Err(TransitionError::UnexpectedCompletion("create".into()).into());
        }
        self.submitting = false;
        match result {
            Ok(()) => {
                info!(name = %self.name, "record created");
                self.name.clear();
                self.email.clear();
                Ok(Followup::Refresh)
            }
            Err(err) => {
                warn!(error = %err, "create rejected");
                Err(ClientError::CreateFailure(err).into())
            }
        }
    }

    /// Submit and wait for the authority.
    pub async fn submit(&mut self, authority: &dyn RecordAuthority) -> ActionResult<Followup> {
        let draft = self.begin_submit()?;
        let result = authority.create(&draft).await;
        self.finish_submit(result)
    }

    fn ensure_idle(&self) -> ActionResult<()> {
        if self.submitting {
            return Err(TransitionError::FormSubmitting.into());
        }
        Ok(())
    }
}
