//! Exercises the entry ABI from outside the crate, the way a real payload
//! cdylib uses it.

use std::panic::catch_unwind;
use std::sync::atomic::{AtomicUsize, Ordering};

use handoff_api::{DEFAULT_ENTRY_SYMBOL, EntryFn, payload_entry};

static HITS: AtomicUsize = AtomicUsize::new(0);

fn count() {
    HITS.fetch_add(1, Ordering::SeqCst);
}

fn refuse() {
    panic!("invalid initial state");
}

payload_entry!(run_web => count);
payload_entry!(broken_entry => refuse);

#[test]
fn exported_symbol_carries_the_default_entry_name() {
    assert_eq!(DEFAULT_ENTRY_SYMBOL, "run_web");
    let entry: EntryFn = run_web;
    unsafe { entry() };
    assert_eq!(HITS.load(Ordering::SeqCst), 1);
}

#[test]
fn panics_unwind_back_across_the_entry_boundary() {
    let entry: EntryFn = broken_entry;
    let result = catch_unwind(|| unsafe { entry() });
    assert!(result.is_err());
}
