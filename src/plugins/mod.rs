//! Plugin system for Clyjin
//!
//! A plugin is a named, versioned bundle of modules -- the unit of
//! distribution and discovery. Each module is one invocable subcommand
//! described by a data-only [`ModuleSpec`]; its behavior is supplied by
//! the [`ModuleFactory`] the spec carries. Discovery collects the plugins
//! taking part in a boot, and the [`PluginRegistry`] validates them and
//! resolves namespaced module tokens.
//!
//! # Architecture
//!
//! - **types**: Core data structures (`PluginSpec`, `ModuleSpec`,
//!   `ModuleData`) and the `Module`/`ModuleFactory`/`PluginHook` traits
//! - **discovery**: Candidate enumeration and skip-on-error loading
//! - **registry**: Plugin registration with validation and token
//!   resolution

pub mod discovery;
pub mod registry;
pub mod types;

pub use discovery::{
    discover_plugins, CandidateEnumerator, DiscoveryReport, PluginCandidate, SkippedCandidate,
    StaticCandidates, PLUGIN_PACKAGE_PREFIX,
};
pub use registry::{validate_plugin, PluginRegistry};
pub use types::{
    Module, ModuleData, ModuleFactory, ModuleSpec, PluginHook, PluginInitContext, PluginRef,
    PluginSpec, NAMESPACE_SEPARATOR, ROOT_MODULE_NAME, UNVERSIONED,
};
