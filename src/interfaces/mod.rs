//! Input adapters: the JSON-lines batch command format consumed by the
//! binary.

pub mod command_reader;
