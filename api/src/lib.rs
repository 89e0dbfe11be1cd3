//! Contract between the bootstrap harness and a payload module.
//!
//! A payload is a separately compiled cdylib exporting exactly one
//! designated entry function; everything behind that function is the
//! payload's own business.

/// Entry symbol the harness resolves when none is configured.
pub const DEFAULT_ENTRY_SYMBOL: &str = "run_web";

/// Signature of the designated entry function: no arguments, no
/// interpreted return value. `C-unwind`, so a panic in the payload
/// unwinds back into the harness instead of tearing the process down.
pub type EntryFn = unsafe extern "C-unwind" fn();

/// Exports `$symbol` from a payload cdylib with the ABI the harness
/// expects, forwarding to `$body`.
#[macro_export]
macro_rules! payload_entry {
    ($symbol:ident => $body:path) => {
        #[unsafe(no_mangle)]
        pub extern "C-unwind" fn $symbol() {
            $body();
        }
    };
}
