//! Outer adapters used by the command-line binary.

pub mod console;
