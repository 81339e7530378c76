//! Error types for roster-core

use roster_state::{AuthorityError, RecordId};

/// Errors surfaced to the user by the record client.
///
/// Each variant leaves the client in the state it was in before the failed
/// operation; none are fatal and none are retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Local input check failed; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The collection could not be loaded; the previous snapshot is kept.
    #[error("could not load records: {0}")]
    ConnectionFailure(AuthorityError),

    #[error("could not create record: {0}")]
    CreateFailure(AuthorityError),

    #[error("could not update record {id}: {source}")]
    UpdateFailure {
        id: RecordId,
        source: AuthorityError,
    },

    #[error("could not delete record {id}: {source}")]
    DeleteFailure {
        id: RecordId,
        source: AuthorityError,
    },
}

impl ClientError {
    /// Short title for a user-facing notice.
    pub fn title(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "Missing fields",
            ClientError::ConnectionFailure(_) => "Connection error",
            ClientError::CreateFailure(_) => "Create failed",
            ClientError::UpdateFailure { .. } => "Update failed",
            ClientError::DeleteFailure { .. } => "Delete failed",
        }
    }
}

/// Pre-network validation failure on the creation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name and email are both required")]
    BothEmpty,
    #[error("name is required")]
    NameEmpty,
    #[error("email is required")]
    EmailEmpty,
}

/// A state machine was driven through a transition it does not allow.
///
/// Rejected transitions change nothing and issue no request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("form is submitting; inputs are disabled")]
    FormSubmitting,

    #[error("record {0} is not in the current snapshot")]
    UnknownRecord(RecordId),

    #[error("record {id} is {phase}, expected {expected}")]
    RowPhase {
        id: RecordId,
        phase: &'static str,
        expected: &'static str,
    },

    #[error("record {0} is being deleted")]
    RowDeleting(RecordId),

    #[error("a delete is already {0}")]
    DeleteBusy(&'static str),

    #[error("no delete is awaiting confirmation")]
    NoPendingDelete,

    #[error("delete confirmation is for record {pending}, not {requested}")]
    DeleteMismatch {
        pending: RecordId,
        requested: RecordId,
    },

    #[error("completion for {0} does not match any in-flight request")]
    UnexpectedCompletion(String),
}

/// Result type for record client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Result type for state machine transitions.
pub type TransitionResult<T> = std::result::Result<T, TransitionError>;

/// Anything an action on the client can be refused or fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl From<ValidationError> for ActionError {
    fn from(err: ValidationError) -> Self {
        ActionError::Client(ClientError::Validation(err))
    }
}

impl ActionError {
    /// The user-facing failure, if this was one rather than a refused transition.
    pub fn client(&self) -> Option<&ClientError> {
        match self {
            ActionError::Client(err) => Some(err),
            ActionError::Transition(_) => None,
        }
    }
}

/// Result type for controller and component actions.
pub type ActionResult<T> = std::result::Result<T, ActionError>;
