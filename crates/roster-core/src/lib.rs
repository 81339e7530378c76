//! Roster Core
//!
//! Client-side synchronization and editing state for a remote collection of
//! user records:
//!
//! - [`RecordStore`] holds the snapshot, replaced only by the latest load.
//! - [`CreationForm`] validates and submits new records.
//! - [`RecordTable`] runs per-row inline editing and the table-wide delete
//!   gate.
//! - [`Roster`] wires them together and reports outcomes through a
//!   [`Notifier`]; [`Driver`] runs the requests it issues against a
//!   [`RecordAuthority`](roster_state::RecordAuthority).

pub mod controller;
pub mod driver;
pub mod error;
pub mod form;
pub mod notify;
pub mod request;
pub mod store;
pub mod table;
pub mod telemetry;

pub use controller::{Action, Roster};
pub use driver::Driver;
pub use error::{
    ActionError, ActionResult, ClientError, ClientResult, TransitionError, TransitionResult,
    ValidationError,
};
pub use form::CreationForm;
pub use notify::{MemoryNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use request::{Completion, Followup, Request};
pub use store::{LoadOutcome, LoadTicket, RecordStore};
pub use table::{
    format_registered_at, DeleteGate, RecordTable, RowPhase, RowState, RowView, CONFIRM_PROMPT,
};
pub use telemetry::init_tracing;

/// Roster version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
