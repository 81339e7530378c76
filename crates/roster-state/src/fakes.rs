//! In-memory fake authority (testing only)
//!
//! `MemoryAuthority` behaves like the usuarios service: it assigns ids and
//! registration timestamps, keeps insertion order, and answers 404 for
//! unknown ids. Failures and latency can be scripted per operation, and every
//! call is recorded so tests can assert that no request was issued.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::authority::{AuthorityResult, RecordAuthority};
use crate::error::AuthorityError;
use crate::record::{Record, RecordDraft, RecordId};

/// The four operations of the usuarios API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

/// A request observed by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(RecordDraft),
    Update(RecordId, RecordDraft),
    Delete(RecordId),
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Call::List => Operation::List,
            Call::Create(_) => Operation::Create,
            Call::Update(..) => Operation::Update,
            Call::Delete(_) => Operation::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<Record>,
    next_id: i64,
    calls: Vec<Call>,
    failures: HashMap<Operation, VecDeque<AuthorityError>>,
    delays: HashMap<Operation, VecDeque<Duration>>,
}

/// In-memory authority backed by a `Vec<Record>` in insertion order.
#[derive(Debug, Default)]
pub struct MemoryAuthority {
    inner: Mutex<Inner>,
}

impl MemoryAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the collection. Ids continue after the largest seeded id.
    pub fn with_records(records: Vec<Record>) -> Self {
        let next_id = records.iter().map(|r| r.id.0).max().unwrap_or(0);
        MemoryAuthority {
            inner: Mutex::new(Inner {
                records,
                next_id,
                ..Inner::default()
            }),
        }
    }

    /// Make the next call to `op` fail with `error`. Queued failures are
    /// consumed in order.
    pub fn fail_next(&self, op: Operation, error: AuthorityError) {
        let mut inner = self.inner.lock().unwrap();
        inner.failures.entry(op).or_default().push_back(error);
    }

    /// Make the next call to `op` answer with the given HTTP status.
    pub fn fail_next_with_status(&self, op: Operation, status: u16) {
        self.fail_next(
            op,
            AuthorityError::Status {
                status,
                body: String::new(),
            },
        );
    }

    /// Delay the next call to `op` by `delay` before it is answered.
    ///
    /// A delayed `list` answers with the collection as it was when the call
    /// arrived; delayed mutations are applied after the delay.
    pub fn delay_next(&self, op: Operation, delay: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.delays.entry(op).or_default().push_back(delay);
    }

    /// Every call observed so far, in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Number of calls observed for `op`.
    pub fn call_count(&self, op: Operation) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.operation() == op)
            .count()
    }

    /// Current authoritative collection.
    pub fn records(&self) -> Vec<Record> {
        self.inner.lock().unwrap().records.clone()
    }

    /// Records the call and returns the scripted delay and failure for it.
    fn begin(&self, call: Call) -> (Option<Duration>, Option<AuthorityError>) {
        let op = call.operation();
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        let delay = inner.delays.get_mut(&op).and_then(VecDeque::pop_front);
        let failure = inner.failures.get_mut(&op).and_then(VecDeque::pop_front);
        (delay, failure)
    }

    async fn settle(&self, call: Call) -> AuthorityResult<()> {
        let (delay, failure) = self.begin(call);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordAuthority for MemoryAuthority {
    async fn list(&self) -> AuthorityResult<Vec<Record>> {
        let (delay, failure) = self.begin(Call::List);
        let records = self.records();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(records),
        }
    }

    async fn create(&self, draft: &RecordDraft) -> AuthorityResult<()> {
        self.settle(Call::Create(draft.clone())).await?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = RecordId(inner.next_id);
        inner.records.push(Record {
            id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            registered_at: Utc::now().into(),
        });
        Ok(())
    }

    async fn update(&self, id: RecordId, draft: &RecordDraft) -> AuthorityResult<()> {
        self.settle(Call::Update(id, draft.clone())).await?;
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AuthorityError::NotFound(id.0))?;
        record.name = draft.name.clone();
        record.email = draft.email.clone();
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> AuthorityResult<()> {
        self.settle(Call::Delete(id)).await?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.records.len();
        inner.records.retain(|r| r.id != id);
        if inner.records.len() == before {
            return Err(AuthorityError::NotFound(id.0));
        }
        Ok(())
    }
}
