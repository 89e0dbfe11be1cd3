use std::error::Error;

/// Operator-visible diagnostic channel. Receives one record per failed
/// bootstrap; never asked to do anything else.
pub trait DiagnosticSink {
    fn record(&self, message: &str);
}

/// Production sink: the process-wide `tracing` subscriber, writing to
/// stderr through the layer the launcher installs.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, message: &str) {
        tracing::error!("{message}");
    }
}

pub struct Reporter<S> {
    sink: S,
}

impl<S: DiagnosticSink> Reporter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Writes one human-readable record containing the error. No recovery,
    /// no re-raise, no exit; the process keeps running.
    pub fn report<E: Error>(&self, error: &E) {
        self.sink.record(&format!("bootstrap failed: {error}"));
    }
}

#[cfg(test)]
pub(crate) use memory::MemorySink;
