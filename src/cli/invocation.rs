//! Resolved invocation data.

use std::path::PathBuf;

use crate::args::BoundArgs;
use crate::plugins::{ModuleSpec, PluginSpec};

/// The fully resolved result of one CLI parse, consumed by the boot
/// sequencer and then discarded.
///
/// # Fields
///
/// - `plugin` / `module`: the resolved target pair.
/// - `args`: values bound to the module's schema keys; absent when the
///   module declares no argument schema.
/// - `config_path`: `-c/--config`, unset meaning the conventional
///   location is used.
/// - `verbosity_level`: number of `-v/--verbose` occurrences.
/// - `sysdir`: `--sysdir` override of the system state directory.
#[derive(Debug)]
pub struct Invocation<'r> {
    pub plugin: &'r PluginSpec,
    pub module: &'r ModuleSpec,
    pub args: Option<BoundArgs>,
    pub config_path: Option<PathBuf>,
    pub verbosity_level: u8,
    pub sysdir: Option<PathBuf>,
}
