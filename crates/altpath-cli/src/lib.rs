//! altpath CLI library.
//!
//! Command handlers and output formatting for the `altpath` binary. The
//! binary only parses arguments and dispatches here.

pub mod commands;
pub mod logging;
pub mod output;
