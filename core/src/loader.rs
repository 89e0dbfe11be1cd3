use std::mem::ManuallyDrop;
use std::thread;

use derive_more::Display;
use thiserror::Error;

use crate::invoker::EntryError;
use crate::payload::{PayloadModule, PayloadSource};

/// Capability produced by a successful load; its existence is what
/// "successfully loaded" means.
pub struct ModuleHandle<M> {
    module: M,
    entry_symbol: Box<str>,
}

impl<M: PayloadModule> ModuleHandle<M> {
    pub fn entry_symbol(&self) -> &str {
        &self.entry_symbol
    }

    pub(crate) fn call_entry(self) -> Result<(), EntryError> {
        let Self {
            module,
            entry_symbol,
        } = self;
        // The instantiated module belongs to the payload from here on;
        // it is never unloaded, whatever the entry call does.
        let module = ManuallyDrop::new(module);
        module.entry(&entry_symbol)
    }
}

pub struct Loader;

impl Loader {
    /// Begins the single-shot asynchronous instantiation of the payload.
    /// The returned handle is the only way to observe the result.
    pub fn begin<S>(source: S, entry_symbol: &str) -> LoadHandle<S::Module>
    where
        S: PayloadSource + Send + 'static,
        S::Module: Send + 'static,
    {
        let symbol = Box::<str>::from(entry_symbol);
        let worker = thread::Builder::new()
            .name("payload-load".into())
            .spawn(move || {
                tracing::debug!(entry = &*symbol, "instantiating payload");
                let module = source.instantiate(&symbol)?;
                Ok(ModuleHandle {
                    module,
                    entry_symbol: symbol,
                })
            })
            .map_err(|_| LoadError::Worker);
        LoadHandle { worker }
    }
}

/// An in-flight load. `wait` suspends the caller until instantiation has
/// succeeded or failed; there is no cancellation and no timeout.
pub struct LoadHandle<M> {
    worker: Result<thread::JoinHandle<Result<ModuleHandle<M>, LoadError>>, LoadError>,
}

impl<M> LoadHandle<M> {
    pub fn wait(self) -> Result<ModuleHandle<M>, LoadError> {
        let worker = self.worker?;
        worker.join().map_err(|_| LoadError::Worker)?
    }
}

#[derive(Debug, Display, Error)]
pub enum LoadError {
    Open(#[from] libloading::Error),
    #[display("payload exports no `{_0}` entry")]
    MissingEntry(Box<str>),
    #[display("payload loader worker died before instantiation completed")]
    Worker,
}
