//! Fuzz target: `Command::decode`
//!
//! Feeds arbitrary bytes as a command read and checks that decoding
//! never panics and that only the exact verbs are recognized.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use colorimetry::app::commands::Command;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let command = Command::decode(data);
    match &command {
        Command::Unsupported(_) => {}
        known => assert_eq!(known.as_str().as_bytes(), data),
    }
    // Re-parsing the rendered form is stable.
    assert_eq!(Command::parse(command.as_str()), command);
});
