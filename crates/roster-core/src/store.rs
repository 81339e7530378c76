//! RecordStore - the local snapshot of the remote collection.
//!
//! The snapshot is only ever replaced wholesale by a completed load. Loads are
//! numbered: [`RecordStore::begin_load`] hands out a [`LoadTicket`] and only
//! the result for the most recently issued ticket is applied, so a slow early
//! load can never overwrite the result of a later one.

use roster_state::{AuthorityResult, Record, RecordAuthority, RecordId};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// Identifies one issued load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket {
    seq: u64,
}

impl LoadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What happened to a finished load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result replaced the snapshot.
    Applied { records: usize },
    /// A newer load was issued meanwhile; the result was dropped.
    Superseded,
}

#[derive(Debug, Default)]
pub struct RecordStore {
    snapshot: Vec<Record>,
    issued: u64,
    loading: bool,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, in authority order.
    pub fn records(&self) -> &[Record] {
        &self.snapshot
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.snapshot.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// True while the latest issued load has not finished.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Issue a new load. Any load still in flight becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.loading = true;
        debug!(seq = self.issued, "load issued");
        LoadTicket { seq: self.issued }
    }

    /// Apply the result of the load identified by `ticket`.
    ///
    /// A stale ticket is dropped whatever its result, leaving the snapshot and
    /// the loading flag alone. For the latest ticket, success replaces the
    /// snapshot and failure keeps it, returning `ConnectionFailure`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: AuthorityResult<Vec<Record>>,
    ) -> ClientResult<LoadOutcome> {
        if ticket.seq != self.issued {
            debug!(
                seq = ticket.seq,
                latest = self.issued,
                "dropping superseded load result"
            );
            return Ok(LoadOutcome::Superseded);
        }

        self.loading = false;
        match result {
            Ok(records) => {
                info!(seq = ticket.seq, count = records.len(), "snapshot replaced");
                let count = records.len();
                self.snapshot = records;
                Ok(LoadOutcome::Applied { records: count })
            }
            Err(err) => {
                warn!(seq = ticket.seq, error = %err, "load failed, keeping previous snapshot");
                Err(ClientError::ConnectionFailure(err))
            }
        }
    }

    /// Issue a load and wait for it.
    pub async fn load(&mut self, authority: &dyn RecordAuthority) -> ClientResult<LoadOutcome> {
        let ticket = self.begin_load();
        let result = authority.list().await;
        self.finish_load(ticket, result)
    }
}
