//! Caller-facing adapters: command execution and the CSV replay reader.

pub mod commands;
pub mod csv;
