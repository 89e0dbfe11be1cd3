use derive_more::Display;
use thiserror::Error;

use crate::invoker::{EntryError, InvocationClaim, Invoker};
use crate::loader::{LoadError, Loader};
use crate::payload::PayloadSource;
use crate::reporter::{DiagnosticSink, Reporter};

/// Where the bootstrap stands. `Completed` and `Failed` are terminal; the
/// sequence never re-enters `Loading`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unstarted,
    Loading,
    Loaded,
    Invoking,
    Completed,
    Failed,
}

/// The single error path threaded through both stages into the one
/// terminal handler.
#[derive(Debug, Display, Error)]
pub enum BootstrapError {
    Load(#[from] LoadError),
    Entry(#[from] EntryError),
}

/// Terminal result of the whole sequence. Created once per process, never
/// mutated afterwards.
#[derive(Debug)]
pub enum BootstrapOutcome {
    Completed,
    Failed(BootstrapError),
}

/// The ordered load-then-invoke-then-report flow; sole caller of the three
/// components.
pub struct Sequence<'claim, S> {
    claim: &'claim InvocationClaim,
    reporter: Reporter<S>,
    phase: Phase,
}

impl<'claim, S: DiagnosticSink> Sequence<'claim, S> {
    pub fn new(claim: &'claim InvocationClaim, reporter: Reporter<S>) -> Self {
        Self {
            claim,
            reporter,
            phase: Phase::Unstarted,
        }
    }

    /// Drives the bootstrap to its terminal state. The first failure from
    /// either stage goes to the reporter, exactly once, and ends the
    /// sequence; on success the reporter is never touched.
    pub fn run<P>(mut self, source: P, entry_symbol: &str) -> BootstrapOutcome
    where
        P: PayloadSource + Send + 'static,
        P::Module: Send + 'static,
    {
        // A spent claim means a payload already has (or had) control;
        // refuse before spinning up a loader for a handle no one may
        // invoke. The invoker still holds the authoritative check.
        if self.claim.is_taken() {
            return self.fail(EntryError::AlreadyInvoked.into());
        }
        match self.drive(source, entry_symbol) {
            Ok(()) => {
                self.transition(Phase::Completed);
                BootstrapOutcome::Completed
            }
            Err(error) => self.fail(error),
        }
    }

    fn drive<P>(&mut self, source: P, entry_symbol: &str) -> Result<(), BootstrapError>
    where
        P: PayloadSource + Send + 'static,
        P::Module: Send + 'static,
    {
        self.transition(Phase::Loading);
        let handle = Loader::begin(source, entry_symbol).wait()?;
        self.transition(Phase::Loaded);
        self.transition(Phase::Invoking);
        Invoker::new(self.claim).invoke(handle)?;
        Ok(())
    }

    fn fail(mut self, error: BootstrapError) -> BootstrapOutcome {
        self.transition(Phase::Failed);
        self.reporter.report(&error);
        BootstrapOutcome::Failed(error)
    }

    fn transition(&mut self, next: Phase) {
        tracing::debug!(from = %self.phase, to = %next, "bootstrap phase");
        self.phase = next;
    }
}
