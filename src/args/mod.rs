//! Argument schema system for Clyjin
//!
//! Modules declare the command-line arguments they accept as an immutable
//! schema: an [`ArgSet`] of named [`ArgSpec`] descriptors. The schema is
//! consumed twice per boot: the grammar generator translates it into the
//! CLI grammar, and the input parser binds parsed values back to the
//! schema keys.
//!
//! Parsed values never live on the schema itself. Each parse produces a
//! fresh [`BoundArgs`] map keyed by argument key, so the declared schema
//! stays shared and untouched across help generation and repeated parses.
//!
//! # Architecture
//!
//! - **types**: Schema-side types (`ArgKind`, `ArgAction`, `Nargs`,
//!   `ArgSpec`, `ArgSet`)
//! - **bound**: Value-side types (`ArgValue`, `BoundArgs`)

mod bound;
mod types;

pub use bound::{ArgValue, BoundArgs};
pub use types::{ArgAction, ArgKind, ArgSet, ArgSpec, ClapExtras, Nargs};
