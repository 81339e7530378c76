//! Requests the state machines hand out, and the completions they take back.
//!
//! A transition that needs the authority returns a [`Request`] instead of
//! awaiting it. Whoever runs the request feeds the matching [`Completion`]
//! back, so no state machine is ever borrowed across an `.await`.

use roster_state::{AuthorityResult, Record, RecordAuthority, RecordDraft, RecordId};

use crate::store::LoadTicket;

/// Work to perform against the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Load(LoadTicket),
    Create(RecordDraft),
    Update(RecordId, RecordDraft),
    Delete(RecordId),
}

/// Result of a [`Request`], tagged so it can be routed back to its machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Loaded(LoadTicket, AuthorityResult<Vec<Record>>),
    Created(AuthorityResult<()>),
    Updated(RecordId, AuthorityResult<()>),
    Deleted(RecordId, AuthorityResult<()>),
}

/// What a finished mutation asks of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Followup {
    /// Reload the collection.
    Refresh,
    Nothing,
}

impl Request {
    /// Run this request and wrap the answer.
    pub async fn execute(self, authority: &dyn RecordAuthority) -> Completion {
        match self {
            Request::Load(ticket) => Completion::Loaded(ticket, authority.list().await),
            Request::Create(draft) => Completion::Created(authority.create(&draft).await),
            Request::Update(id, draft) => {
                Completion::Updated(id, authority.update(id, &draft).await)
            }
            Request::Delete(id) => Completion::Deleted(id, authority.delete(id).await),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Request::Load(ticket) => format!("load #{}", ticket.seq()),
            Request::Create(_) => "create".to_string(),
            Request::Update(id, _) => format!("update {id}"),
            Request::Delete(id) => format!("delete {id}"),
        }
    }
}

impl Completion {
    pub fn describe(&self) -> String {
        match self {
            Completion::Loaded(ticket, _) => format!("load #{}", ticket.seq()),
            Completion::Created(_) => "create".to_string(),
            Completion::Updated(id, _) => format!("update {id}"),
            Completion::Deleted(id, _) => format!("delete {id}"),
        }
    }
}
