use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};

use derive_more::Display;
use thiserror::Error;

use crate::loader::ModuleHandle;
use crate::payload::PayloadModule;

/// One-shot claim behind the exactly-once invocation guarantee. Spent the
/// moment an invoker accepts it; never released.
pub struct InvocationClaim(AtomicBool);

impl InvocationClaim {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// The claim the production sequence runs under, one per process.
    pub fn process() -> &'static Self {
        static CLAIM: InvocationClaim = InvocationClaim::new();
        &CLAIM
    }

    fn take(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn is_taken(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for InvocationClaim {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Invoker<'claim> {
    claim: &'claim InvocationClaim,
}

impl<'claim> Invoker<'claim> {
    pub fn new(claim: &'claim InvocationClaim) -> Self {
        Self { claim }
    }

    /// Transfers control to the payload's designated entry function. The
    /// contract is satisfied once the call is issued; the entry may never
    /// return, and whatever it does return is discarded.
    pub fn invoke<M: PayloadModule>(self, handle: ModuleHandle<M>) -> Result<(), EntryError> {
        if !self.claim.take() {
            return Err(EntryError::AlreadyInvoked);
        }
        tracing::debug!(entry = handle.entry_symbol(), "transferring control to payload");
        match catch_unwind(AssertUnwindSafe(move || handle.call_entry())) {
            Ok(outcome) => outcome,
            Err(panic) => Err(EntryError::Panicked(panic_message(&*panic))),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> Box<str> {
    if let Some(message) = panic.downcast_ref::<&str>() {
        Box::from(*message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        Box::from(message.as_str())
    } else {
        Box::from("opaque panic payload")
    }
}

#[derive(Debug, Display, Error)]
pub enum EntryError {
    Resolve(#[from] libloading::Error),
    #[display("payload entry panicked: {_0}")]
    Panicked(Box<str>),
    #[display("entry function was already invoked in this process")]
    AlreadyInvoked,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::loader::{LoadError, Loader};
    use crate::payload::PayloadSource;

    #[derive(Clone, Default)]
    struct CountingModule {
        calls: Arc<AtomicUsize>,
    }

    impl PayloadModule for CountingModule {
        fn entry(&self, _symbol: &str) -> Result<(), EntryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct CountingSource(CountingModule);

    impl PayloadSource for CountingSource {
        type Module = CountingModule;

        fn instantiate(self, _entry_symbol: &str) -> Result<CountingModule, LoadError> {
            Ok(self.0)
        }
    }

    struct PanickingModule;

    impl PayloadModule for PanickingModule {
        fn entry(&self, _symbol: &str) -> Result<(), EntryError> {
            panic!("invalid initial state");
        }
    }

    struct PanickingSource;

    impl PayloadSource for PanickingSource {
        type Module = PanickingModule;

        fn instantiate(self, _entry_symbol: &str) -> Result<PanickingModule, LoadError> {
            Ok(PanickingModule)
        }
    }

    fn load<S>(source: S) -> ModuleHandle<S::Module>
    where
        S: PayloadSource + Send + 'static,
        S::Module: Send + 'static,
    {
        match Loader::begin(source, "run_web").wait() {
            Ok(handle) => handle,
            Err(error) => panic!("load failed: {error}"),
        }
    }

    #[test]
    fn entry_is_called_exactly_once() {
        let module = CountingModule::default();
        let calls = Arc::clone(&module.calls);
        let claim = InvocationClaim::new();
        let handle = load(CountingSource(module));

        let result = Invoker::new(&claim).invoke(handle);

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(claim.is_taken());
    }

    #[test]
    fn spent_claim_refuses_a_second_invocation() {
        let first = CountingModule::default();
        let second = CountingModule::default();
        let second_calls = Arc::clone(&second.calls);
        let claim = InvocationClaim::new();

        let ok = Invoker::new(&claim).invoke(load(CountingSource(first)));
        let refused = Invoker::new(&claim).invoke(load(CountingSource(second)));

        assert!(ok.is_ok());
        assert!(matches!(refused, Err(EntryError::AlreadyInvoked)));
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn panicking_entry_is_contained_with_its_message() {
        let claim = InvocationClaim::new();
        let result = Invoker::new(&claim).invoke(load(PanickingSource));

        let error = match result {
            Err(error) => error,
            Ok(()) => panic!("entry must fail"),
        };
        assert!(matches!(error, EntryError::Panicked(_)));
        assert!(error.to_string().contains("invalid initial state"));
    }

    #[test]
    fn panic_messages_survive_both_string_shapes() {
        assert_eq!(&*panic_message(&"literal"), "literal");
        assert_eq!(&*panic_message(&String::from("owned")), "owned");
        assert_eq!(&*panic_message(&42_u32), "opaque panic payload");
    }
}
