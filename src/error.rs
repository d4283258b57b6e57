//! Error types for Clyjin
//!
//! This module defines all error types used throughout the Clyjin framework.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.

use thiserror::Error;

use crate::args::ArgKind;

/// The primary error type for Clyjin operations.
#[derive(Error, Debug)]
pub enum ClyjinError {
    /// A plugin declared an empty module list.
    #[error("plugin <{plugin}> defines no modules")]
    NoModules { plugin: String },

    /// A plugin declared more than one root module.
    #[error("cannot add root module <{module}>: plugin <{plugin}> already has a root module")]
    DuplicateRootModule { plugin: String, module: String },

    /// Two plugins were registered under the same name.
    #[error("plugin <{plugin}> is already registered")]
    DuplicatePlugin { plugin: String },

    /// A plugin was addressed with a module it does not own.
    #[error("plugin <{plugin}> does not have module <{module}>")]
    ForeignModule { plugin: String, module: String },

    /// Plugin or module name failed validation at registration time.
    #[error("invalid {entity} name <{name}>: {reason}")]
    InvalidName {
        entity: &'static str,
        name: String,
        reason: String,
    },

    /// A module token carried more than one namespace separator.
    #[error("unsupported module namespace <{token}>: at most one `.` separator is allowed")]
    UnsupportedNamespace { token: String },

    /// No registered plugin matched the requested name.
    #[error("unknown plugin <{name}>")]
    PluginNotFound { name: String },

    /// The plugin matched, but has no module under the requested name.
    #[error("plugin <{plugin}> has no module named <{module}>")]
    ModuleNotFound { plugin: String, module: String },

    /// A positional argument was declared with `required = false`.
    #[error("positional argument <{arg}> cannot be declared non-required")]
    NonRequiredPositional { arg: String },

    /// An argument value was read before being populated by a parse.
    #[error("argument <{key}> has no value set")]
    UnsetValue { key: String },

    /// An argument key is present in a module's schema but unknown to the
    /// generated grammar. This is a framework bug, not a user input error.
    #[error("argument <{key}> is declared in the schema but missing from the parsed matches")]
    SchemaDesync { key: String },

    /// A parsed value does not satisfy the declared argument kind.
    #[error("argument <{key}> expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: ArgKind,
        actual: String,
    },

    /// A module was asked for its argument set but declares none.
    #[error("module <{module}> has no argument set attached")]
    NoArgs { module: String },

    /// Errors raised by the underlying CLI grammar engine (usage, help).
    /// These carry clap's own exit semantics and are finished with
    /// `clap::Error::exit` at the binary boundary.
    #[error(transparent)]
    Cli(#[from] clap::Error),

    /// Configuration-related errors (unresolvable home directory, etc.)
    #[error("configuration error: {0}")]
    Config(String),

    /// A discovery candidate failed to produce a plugin.
    #[error("plugin discovery error: {0}")]
    Discovery(String),

    /// Internal consistency violations that indicate a framework bug.
    #[error("internal consistency error: {0}")]
    Internal(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for Clyjin operations.
pub type Result<T> = std::result::Result<T, ClyjinError>;
