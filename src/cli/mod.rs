//! CLI grammar generation and input parsing
//!
//! The command grammar is not written by hand: it is generated from the
//! registered plugins' argument schemas, parsed with clap, and the parsed
//! values are bound back onto the schema keys as a typed
//! [`crate::args::BoundArgs`] map.
//!
//! # Architecture
//!
//! - **generator**: Registry -> `clap::Command` translation
//! - **parser**: Tokenization, module resolution, and value binding
//! - **invocation**: The resolved result handed to the boot sequencer

pub mod generator;
pub mod invocation;
pub mod parser;

pub use generator::generate_command;
pub use invocation::Invocation;
pub use parser::CliParser;
