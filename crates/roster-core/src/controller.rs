//! Root controller wiring the store, the form and the table together.
//!
//! [`Roster`] takes user [`Action`]s and request [`Completion`]s and returns
//! the [`Request`]s they produce. It is the boundary where every failure is
//! turned into a notice; the returned error is the same failure, already
//! reported, for callers that need to branch on it.

use std::sync::Arc;

use roster_state::{Record, RecordId};
use tracing::{debug, warn};

use crate::error::{ActionError, ActionResult, TransitionError};
use crate::form::CreationForm;
use crate::notify::{Notice, Notifier};
use crate::request::{Completion, Followup, Request};
use crate::store::{LoadOutcome, RecordStore};
use crate::table::{RecordTable, RowView};

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetName(String),
    SetEmail(String),
    Submit,
    StartEdit(RecordId),
    EditName(RecordId, String),
    EditEmail(RecordId, String),
    CancelEdit(RecordId),
    CommitEdit(RecordId),
    RequestDelete(RecordId),
    CancelDelete,
    ConfirmDelete(RecordId),
    Refresh,
}

pub struct Roster {
    store: RecordStore,
    form: CreationForm,
    table: RecordTable,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Roster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Roster")
            .field("store", &self.store)
            .field("form", &self.form)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl Roster {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Roster {
            store: RecordStore::new(),
            form: CreationForm::new(),
            table: RecordTable::new(),
            notifier,
        }
    }

    /// The initial load.
    pub fn start(&mut self) -> Vec<Request> {
        vec![Request::Load(self.store.begin_load())]
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn form(&self) -> &CreationForm {
        &self.form
    }

    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    pub fn rows(&self) -> Vec<RowView> {
        self.table.rows(self.store.records())
    }

    pub fn summary(&self) -> String {
        RecordTable::summary(self.store.records())
    }

    /// Apply a user action.
    pub fn dispatch(&mut self, action: Action) -> ActionResult<Vec<Request>> {
        debug!(?action, "dispatch");
        let result = self.apply(action);
        self.report(result)
    }

    /// Route a finished request back to the machine that issued it.
    pub fn complete(&mut self, completion: Completion) -> ActionResult<Vec<Request>> {
        debug!(completion = %completion.describe(), "complete");
        let result = self.settle(completion);
        self.report(result)
    }

    fn apply(&mut self, action: Action) -> ActionResult<Vec<Request>> {
        let requests = match action {
            Action::SetName(name) => {
                self.form.set_name(name)?;
                vec![]
            }
            Action::SetEmail(email) => {
                self.form.set_email(email)?;
                vec![]
            }
            Action::Submit => vec![Request::Create(self.form.begin_submit()?)],
            Action::StartEdit(id) => {
                let record = self
                    .store
                    .get(id)
                    .ok_or(TransitionError::UnknownRecord(id))?;
                self.table.start_edit(record)?;
                vec![]
            }
            Action::EditName(id, name) => {
                self.table.set_draft_name(id, name)?;
                vec![]
            }
            Action::EditEmail(id, email) => {
                self.table.set_draft_email(id, email)?;
                vec![]
            }
            Action::CancelEdit(id) => {
                self.table.cancel_edit(id)?;
                vec![]
            }
            Action::CommitEdit(id) => {
                let draft = self.table.commit_edit(id)?;
                vec![Request::Update(id, draft)]
            }
            Action::RequestDelete(id) => {
                if !self.store.contains(id) {
                    return Err(TransitionError::UnknownRecord(id).into());
                }
                self.table.request_delete(id)?;
                vec![]
            }
            Action::CancelDelete => {
                self.table.cancel_delete()?;
                vec![]
            }
            Action::ConfirmDelete(id) => {
                self.table.confirm_delete(id)?;
                vec![Request::Delete(id)]
            }
            Action::Refresh => vec![Request::Load(self.store.begin_load())],
        };
        Ok(requests)
    }

    fn settle(&mut self, completion: Completion) -> ActionResult<Vec<Request>> {
        let (followup, notice) = match completion {
            Completion::Loaded(ticket, result) => {
                if let LoadOutcome::Applied { .. } = self.store.finish_load(ticket, result)? {
                    self.table.reconcile(self.store.records());
                }
                return Ok(vec![]);
            }
            Completion::Created(result) => (
                self.form.finish_submit(result)?,
                Notice::success("Created", "User created successfully"),
            ),
            Completion::Updated(id, result) => (
                self.table.finish_edit(id, result)?,
                Notice::success("Updated", format!("User {id} updated successfully")),
            ),
            Completion::Deleted(id, result) => (
                self.table.finish_delete(id, result)?,
                Notice::success("Deleted", format!("User {id} deleted successfully")),
            ),
        };
        self.notifier.notify(notice);
        Ok(match followup {
            Followup::Refresh => vec![Request::Load(self.store.begin_load())],
            Followup::Nothing => vec![],
        })
    }

    /// Surface failures: user-facing ones as notices, refused transitions in
    /// the log only.
    fn report(&self, result: ActionResult<Vec<Request>>) -> ActionResult<Vec<Request>> {
        match &result {
            Err(ActionError::Client(err)) => self.notifier.notify(Notice::from(err)),
            Err(ActionError::Transition(err)) => warn!(error = %err, "transition refused"),
            Ok(_) => {}
        }
        result
    }
}
