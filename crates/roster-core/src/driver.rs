//! Cooperative request driver.
//!
//! Runs the requests a [`Roster`] hands out on the current task, with every
//! in-flight request polled through one `FuturesUnordered`. Completions are
//! fed back in the order they finish, and any requests they produce join the
//! same set. Nothing is spawned; the roster is only touched between polls.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use roster_state::RecordAuthority;
use tracing::debug;

use crate::controller::{Action, Roster};
use crate::error::{ActionError, ActionResult};
use crate::request::Request;

pub struct Driver {
    authority: Arc<dyn RecordAuthority>,
}

impl Driver {
    pub fn new(authority: Arc<dyn RecordAuthority>) -> Self {
        Driver { authority }
    }

    pub fn authority(&self) -> &Arc<dyn RecordAuthority> {
        &self.authority
    }

    /// Run `requests` and everything they lead to until nothing is in flight.
    ///
    /// Returns the failures met along the way, in completion order. Each has
    /// already been reported through the roster's notifier.
    pub async fn run(&self, roster: &mut Roster, requests: Vec<Request>) -> Vec<ActionError> {
        let mut in_flight = FuturesUnordered::new();
        let mut failures = Vec::new();

        for request in requests {
            debug!(request = %request.describe(), "issuing");
            in_flight.push(request.execute(self.authority.as_ref()));
        }

        while let Some(completion) = in_flight.next().await {
            match roster.complete(completion) {
                Ok(next) => {
                    for request in next {
                        debug!(request = %request.describe(), "issuing");
                        in_flight.push(request.execute(self.authority.as_ref()));
                    }
                }
                Err(err) => failures.push(err),
            }
        }

        failures
    }

    /// Dispatch one action and run what it issues to quiescence.
    ///
    /// Returns the first failure, whether the action was refused or one of
    /// its requests failed.
    pub async fn act(&self, roster: &mut Roster, action: Action) -> ActionResult<()> {
        let requests = roster.dispatch(action)?;
        match self.run(roster, requests).await.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Initial load.
    pub async fn start(&self, roster: &mut Roster) -> ActionResult<()> {
        let requests = roster.start();
        match self.run(roster, requests).await.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
