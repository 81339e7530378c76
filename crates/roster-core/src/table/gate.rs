//! Table-wide delete confirmation gate.
//!
//! A single instance serializes deletes across every row: one confirmation
//! dialog at most, and no second delete while one is in flight.

use roster_state::{AuthorityResult, RecordId};
use tracing::{info, warn};

use crate::error::{ActionResult, ClientError, TransitionError, TransitionResult};
use crate::request::Followup;

/// Shown in the confirmation dialog. Names no record content.
pub const CONFIRM_PROMPT: &str =
    "This action cannot be undone. The user will be permanently deleted.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteGate {
    #[default]
    Idle,
    PendingConfirm(RecordId),
    Deleting(RecordId),
}

impl DeleteGate {
    pub fn is_idle(&self) -> bool {
        matches!(self, DeleteGate::Idle)
    }

    /// The confirmation dialog is open while pending and while deleting.
    pub fn is_dialog_open(&self) -> bool {
        !self.is_idle()
    }

    /// Record awaiting confirmation, if any.
    pub fn pending(&self) -> Option<RecordId> {
        match self {
            DeleteGate::PendingConfirm(id) => Some(*id),
            _ => None,
        }
    }

    /// Record whose delete is in flight, if any.
    pub fn deleting(&self) -> Option<RecordId> {
        match self {
            DeleteGate::Deleting(id) => Some(*id),
            _ => None,
        }
    }

    fn busy(&self) -> TransitionError {
        match self {
            DeleteGate::Deleting(_) => TransitionError::DeleteBusy("in flight"),
            _ => TransitionError::DeleteBusy("awaiting confirmation"),
        }
    }

    /// `Idle -> PendingConfirm(id)`
    pub fn request(&mut self, id: RecordId) -> TransitionResult<()> {
        if !self.is_idle() {
            return Err(self.busy());
        }
        *self = DeleteGate::PendingConfirm(id);
        Ok(())
    }

    /// `PendingConfirm -> Idle`
    pub fn cancel(&mut self) -> TransitionResult<()> {
        match self {
            DeleteGate::PendingConfirm(_) => {
                *self = DeleteGate::Idle;
                Ok(())
            }
            DeleteGate::Deleting(_) => Err(self.busy()),
            DeleteGate::Idle => Err(TransitionError::NoPendingDelete),
        }
    }

    /// `PendingConfirm(id) -> Deleting(id)`; the caller issues the request.
    pub fn confirm(&mut self, id: RecordId) -> TransitionResult<()> {
        match *self {
            DeleteGate::PendingConfirm(pending) if pending == id => {
                *self = DeleteGate::Deleting(id);
                Ok(())
            }
            DeleteGate::PendingConfirm(pending) => Err(TransitionError::DeleteMismatch {
                pending,
                requested: id,
            }),
            DeleteGate::Deleting(_) => Err(self.busy()),
            DeleteGate::Idle => Err(TransitionError::NoPendingDelete),
        }
    }

    /// `Deleting(id) -> Idle`, whatever the result.
    pub fn finish(&mut self, id: RecordId, result: AuthorityResult<()>) -> ActionResult<Followup> {
        if self.deleting() != Some(id) {
            return Err(TransitionError::UnexpectedCompletion(format!("delete {id}")).into());
        }
        *self = DeleteGate::Idle;
        match result {
            Ok(()) => {
                info!(%id, "record deleted");
                Ok(Followup::Refresh)
            }
            Err(err) => {
                warn!(%id, error = %err, "delete rejected");
                Err(ClientError::DeleteFailure { id, source: err }.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_state::AuthorityError;

    #[test]
    fn test_request_then_cancel() {
        let mut gate = DeleteGate::default();
        gate.request(RecordId(1)).unwrap();
        assert_eq!(gate.pending(), Some(RecordId(1)));
        assert!(gate.is_dialog_open());
        gate.cancel().unwrap();
        assert!(gate.is_idle());
    }

    #[test]
    fn test_only_one_pending_at_a_time() {
        let mut gate = DeleteGate::default();
        gate.request(RecordId(1)).unwrap();
        assert_eq!(
            gate.request(RecordId(2)),
            Err(TransitionError::DeleteBusy("awaiting confirmation"))
        );
        assert_eq!(gate.pending(), Some(RecordId(1)));
    }

    #[test]
    fn test_confirm_requires_pending_with_same_id() {
        let mut gate = DeleteGate::default();
        assert_eq!(gate.confirm(RecordId(1)), Err(TransitionError::NoPendingDelete));

        gate.request(RecordId(1)).unwrap();
        assert_eq!(
            gate.confirm(RecordId(2)),
            Err(TransitionError::DeleteMismatch {
                pending: RecordId(1),
                requested: RecordId(2),
            })
        );
        gate.confirm(RecordId(1)).unwrap();
        assert_eq!(gate.deleting(), Some(RecordId(1)));
    }

    #[test]
    fn test_in_flight_delete_blocks_everything() {
        let mut gate = DeleteGate::Deleting(RecordId(1));
        assert!(gate.request(RecordId(2)).is_err());
        assert!(gate.cancel().is_err());
        assert!(gate.confirm(RecordId(1)).is_err());
        assert_eq!(gate, DeleteGate::Deleting(RecordId(1)));
    }

    #[test]
    fn test_failure_returns_to_idle() {
        let mut gate = DeleteGate::Deleting(RecordId(1));
        let err = gate
            .finish(RecordId(1), Err(AuthorityError::Transport("reset".into())))
            .unwrap_err();
        assert!(err.client().is_some());
        assert!(gate.is_idle());
    }

    #[test]
    fn test_success_requests_refresh() {
        let mut gate = DeleteGate::Deleting(RecordId(4));
        assert_eq!(gate.finish(RecordId(4), Ok(())), Ok(Followup::Refresh));
        assert!(gate.is_idle());
    }

    #[test]
    fn test_stray_completion_is_rejected() {
        let mut gate = DeleteGate::PendingConfirm(RecordId(4));
        assert!(gate.finish(RecordId(4), Ok(())).is_err());
        assert_eq!(gate, DeleteGate::PendingConfirm(RecordId(4)));
    }
}
