use crate::launcher::Launcher;
use crate::reporter::{Reporter, TracingSink};

mod config;
mod invoker;
mod launcher;
mod loader;
mod payload;
mod reporter;
mod sequence;

fn main() {
    // Launch-time failures share the bootstrap diagnostic channel and are
    // never allowed to escape as a crash.
    if let Err(error) = Launcher::from_args().launch() {
        Reporter::new(TracingSink).report(&error);
    }
}
