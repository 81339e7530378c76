//! Per-row inline edit state.

use roster_state::RecordDraft;

/// Edit state of a single row.
///
/// `Viewing -> Editing -> Saving -> Viewing | Editing`, and
/// `Editing -> Viewing` on cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RowState {
    #[default]
    Viewing,
    /// Local copies of name/email, not yet sent.
    Editing(RecordDraft),
    /// The draft has been sent as an update; the row is locked.
    Saving(RecordDraft),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPhase {
    Viewing,
    Editing,
    Saving,
}

impl RowPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowPhase::Viewing => "viewing",
            RowPhase::Editing => "editing",
            RowPhase::Saving => "saving",
        }
    }
}

impl std::fmt::Display for RowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RowState {
    pub fn phase(&self) -> RowPhase {
        match self {
            RowState::Viewing => RowPhase::Viewing,
            RowState::Editing(_) => RowPhase::Editing,
            RowState::Saving(_) => RowPhase::Saving,
        }
    }

    pub fn draft(&self) -> Option<&RecordDraft> {
        match self {
            RowState::Viewing => None,
            RowState::Editing(draft) | RowState::Saving(draft) => Some(draft),
        }
    }

    pub fn is_saving(&self) -> bool {
        matches!(self, RowState::Saving(_))
    }
}
