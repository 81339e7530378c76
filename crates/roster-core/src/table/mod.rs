//! RecordTable - inline editing and deletion over the current snapshot.
//!
//! Two independent machines are layered over the snapshot:
//!
//! - **Row edit state**: a map from record id to [`RowState`]. Rows are
//!   independent; any number may be editing or saving at once, and a saving
//!   row only locks itself.
//! - **Delete gate**: a single [`DeleteGate`] shared by all rows, so at most
//!   one delete is awaiting confirmation or in flight.
//!
//! The table never holds records itself; it is always rendered against the
//! snapshot it is handed.

pub mod gate;
pub mod row;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use roster_state::{
    AuthorityResult, Record, RecordAuthority, RecordDraft, RecordId, RegisteredAt,
};
use tracing::{debug, info, warn};

use crate::error::{ActionResult, ClientError, TransitionError, TransitionResult};
use crate::request::Followup;

pub use gate::{DeleteGate, CONFIRM_PROMPT};
pub use row::{RowPhase, RowState};

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: RecordId,
    /// The draft value while editing or saving, the record value otherwise.
    pub name: String,
    pub email: String,
    pub registered_at: RegisteredAt,
    pub phase: RowPhase,
    /// False while the row is saving or being deleted.
    pub controls_enabled: bool,
}

impl RowView {
    /// Long-form registration date, e.g. `January 1, 2024`. An unrecognized
    /// value is shown as received.
    pub fn registered_label(&self) -> String {
        match &self.registered_at {
            RegisteredAt::At(ts) => format_registered_at(ts),
            RegisteredAt::Unparsed(raw) => raw.clone(),
            RegisteredAt::Missing => String::new(),
        }
    }
}

pub fn format_registered_at(ts: &DateTime<Utc>) -> String {
    ts.format("%B %-d, %Y").to_string()
}

#[derive(Debug, Default)]
pub struct RecordTable {
    rows: BTreeMap<RecordId, RowState>,
    gate: DeleteGate,
}

static VIEWING: RowState = RowState::Viewing;

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self, id: RecordId) -> &RowState {
        self.rows.get(&id).unwrap_or(&VIEWING)
    }

    pub fn gate(&self) -> DeleteGate {
        self.gate
    }

    /// Row edit transitions are refused while the gate is deleting the row.
    fn expect_phase(&self, id: RecordId, expected: RowPhase) -> TransitionResult<()> {
        if self.gate.deleting() == Some(id) {
            return Err(TransitionError::RowDeleting(id));
        }
        let phase = self.row(id).phase();
        if phase != expected {
            return Err(TransitionError::RowPhase {
                id,
                phase: phase.as_str(),
                expected: expected.as_str(),
            });
        }
        Ok(())
    }

    /// `Viewing -> Editing`, seeding the draft from the record.
    pub fn start_edit(&mut self, record: &Record) -> TransitionResult<()> {
        self.expect_phase(record.id, RowPhase::Viewing)?;
        debug!(id = %record.id, "editing");
        self.rows
            .insert(record.id, RowState::Editing(record.draft()));
        Ok(())
    }

    fn draft_mut(&mut self, id: RecordId) -> TransitionResult<&mut RecordDraft> {
        self.expect_phase(id, RowPhase::Editing)?;
        match self.rows.get_mut(&id) {
            Some(RowState::Editing(draft)) => Ok(draft),
            _ => Err(TransitionError::UnknownRecord(id)),
        }
    }

    pub fn set_draft_name(&mut self, id: RecordId, name: impl Into<String>) -> TransitionResult<()> {
        self.draft_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_draft_email(
        &mut self,
        id: RecordId,
        email: impl Into<String>,
    ) -> TransitionResult<()> {
        self.draft_mut(id)?.email = email.into();
        Ok(())
    }

    /// `Editing -> Viewing`, discarding the draft.
    pub fn cancel_edit(&mut self, id: RecordId) -> TransitionResult<()> {
        self.expect_phase(id, RowPhase::Editing)?;
        self.rows.remove(&id);
        Ok(())
    }

    /// `Editing -> Saving`, returning the update payload.
    pub fn commit_edit(&mut self, id: RecordId) -> TransitionResult<RecordDraft> {
        let draft = self.draft_mut(id)?.clone();
        self.rows.insert(id, RowState::Saving(draft.clone()));
        Ok(draft)
    }

    /// `Saving -> Viewing` on success, `Saving -> Editing` with the draft
    /// intact on failure.
    pub fn finish_edit(&mut self, id: RecordId, result: AuthorityResult<()>) -> ActionResult<Followup> {
        let draft = match self.rows.remove(&id) {
            Some(RowState::Saving(draft)) => draft,
            other => {
                if let Some(state) = other {
                    self.rows.insert(id, state);
                }
                return Err(TransitionError::UnexpectedCompletion(format!("update {id}")).into());
            }
        };
        match result {
            Ok(()) => {
                info!(%id, "record updated");
                Ok(Followup::Refresh)
            }
            Err(err) => {
                warn!(%id, error = %err, "update rejected");
                self.rows.insert(id, RowState::Editing(draft));
                Err(ClientError::UpdateFailure { id, source: err }.into())
            }
        }
    }

    /// Edit, commit and wait for the authority.
    pub async fn save(
        &mut self,
        id: RecordId,
        authority: &dyn RecordAuthority,
    ) -> ActionResult<Followup> {
        let draft = self.commit_edit(id)?;
        let result = authority.update(id, &draft).await;
        self.finish_edit(id, result)
    }

    /// Open the confirmation dialog for `id`. A saving row cannot be deleted.
    pub fn request_delete(&mut self, id: RecordId) -> TransitionResult<()> {
        if self.row(id).is_saving() {
            return Err(TransitionError::RowPhase {
                id,
                phase: RowPhase::Saving.as_str(),
                expected: "not saving",
            });
        }
        self.gate.request(id)
    }

    pub fn cancel_delete(&mut self) -> TransitionResult<()> {
        self.gate.cancel()
    }

    /// `PendingConfirm(id) -> Deleting(id)`; the caller issues the delete.
    pub fn confirm_delete(&mut self, id: RecordId) -> TransitionResult<()> {
        self.gate.confirm(id)
    }

    pub fn finish_delete(&mut self, id: RecordId, result: AuthorityResult<()>) -> ActionResult<Followup> {
        self.gate.finish(id, result)
    }

    /// Confirm and wait for the authority.
    pub async fn delete(
        &mut self,
        id: RecordId,
        authority: &dyn RecordAuthority,
    ) -> ActionResult<Followup> {
        self.confirm_delete(id)?;
        let result = authority.delete(id).await;
        self.finish_delete(id, result)
    }

    /// Drop state for rows that left the snapshot.
    ///
    /// Saving rows and an in-flight delete are kept until their request
    /// resolves; a pending confirmation for a vanished record is closed.
    pub fn reconcile(&mut self, snapshot: &[Record]) {
        let present = |id: &RecordId| snapshot.iter().any(|r| r.id == *id);
        self.rows.retain(|id, state| state.is_saving() || present(id));
        if let Some(id) = self.gate.pending() {
            if !present(&id) {
                debug!(%id, "closing delete confirmation for vanished record");
                self.gate = DeleteGate::Idle;
            }
        }
    }

    /// One view per snapshot record, in snapshot order.
    pub fn rows(&self, snapshot: &[Record]) -> Vec<RowView> {
        snapshot
            .iter()
            .map(|record| {
                let state = self.row(record.id);
                let (name, email) = match state.draft() {
                    Some(draft) => (draft.name.clone(), draft.email.clone()),
                    None => (record.name.clone(), record.email.clone()),
                };
                RowView {
                    id: record.id,
                    name,
                    email,
                    registered_at: record.registered_at.clone(),
                    phase: state.phase(),
                    controls_enabled: !state.is_saving() && self.gate.deleting() != Some(record.id),
                }
            })
            .collect()
    }

    /// Record count line shown above the table.
    pub fn summary(snapshot: &[Record]) -> String {
        match snapshot.len() {
            0 => "No users registered".to_string(),
            1 => "1 user registered".to_string(),
            n => format!("{n} users registered"),
        }
    }
}
