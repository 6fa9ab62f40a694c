//! Command implementations for the CLI.

/// Module containing the implementation of the conversion run.
pub mod convert;
