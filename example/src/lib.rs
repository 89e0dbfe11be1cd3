#![allow(clippy::print_stdout, reason = "the payload owns the process once control arrives")]

//! Sample payload for manual end-to-end runs:
//! `cargo build -p handoff-example-payload`, then point the harness at the
//! produced cdylib with `handoff --payload target/debug/libhandoff_example_payload.so`.

use handoff_api::payload_entry;

fn start() {
    println!("payload entry reached; the harness is done");
}

payload_entry!(run_web => start);
// Second exported name for hosts configured with `--entry web`.
payload_entry!(web => start);
