use std::path::PathBuf;

use handoff_api::EntryFn;
use libloading::Library;

use crate::invoker::EntryError;
use crate::loader::LoadError;

/// An instantiated payload, ready to accept its entry call.
pub trait PayloadModule {
    /// Calls the designated entry function by name. Returns once the call
    /// comes back; an entry that runs forever keeps control instead.
    fn entry(&self, symbol: &str) -> Result<(), EntryError>;
}

/// Where a payload comes from. Instantiation is single-shot and consumes
/// the source.
pub trait PayloadSource {
    type Module: PayloadModule;

    fn instantiate(self, entry_symbol: &str) -> Result<Self::Module, LoadError>;
}

/// The real payload: a compiled shared object on disk.
#[derive(Debug, Clone)]
pub struct SharedObject {
    path: PathBuf,
}

impl SharedObject {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

pub struct SharedObjectModule {
    library: Library,
}

impl PayloadSource for SharedObject {
    type Module = SharedObjectModule;

    fn instantiate(self, entry_symbol: &str) -> Result<SharedObjectModule, LoadError> {
        let library = unsafe { Library::new(&self.path) }?;
        // A module without the designated entry is not a usable payload;
        // that is a failed load, not a failed call.
        unsafe { library.get::<EntryFn>(entry_symbol.as_bytes()) }
            .map_err(|_| LoadError::MissingEntry(entry_symbol.into()))?;
        Ok(SharedObjectModule { library })
    }
}

impl PayloadModule for SharedObjectModule {
    fn entry(&self, symbol: &str) -> Result<(), EntryError> {
        let entry = unsafe { self.library.get::<EntryFn>(symbol.as_bytes()) }?;
        unsafe { entry() };
        Ok(())
    }
}
