//! Boot sequencer
//!
//! Central entry unit of application execution. One boot is a single
//! linear pass with no back-edges, terminal on the first unrecovered
//! error or on module completion:
//!
//! discover -> register -> parse -> initialize paths -> instantiate
//! module -> plugin initialize hook -> execute module
//!
//! The module instance is constructed before the plugin hook runs
//! because the hook's bundle carries the not-yet-executed instance.
//! Errors raised by the hook or the module are not caught here; they
//! propagate unmodified to the process boundary.

use tracing::debug;

use crate::cli::CliParser;
use crate::error::Result;
use crate::paths::SysPaths;
use crate::plugins::{
    discover_plugins, CandidateEnumerator, ModuleData, PluginInitContext, PluginRegistry,
    StaticCandidates,
};

/// Orchestrates one application run from discovery to module completion.
pub struct Boot {
    enumerator: Box<dyn CandidateEnumerator>,
}

impl Boot {
    /// Boot with no external plugin candidates; only the built-in plugin
    /// is available.
    pub fn new() -> Self {
        Self {
            enumerator: Box::new(StaticCandidates::default()),
        }
    }

    /// Boot with a custom candidate enumerator, the injection point for
    /// embedders and tests.
    pub fn with_enumerator(enumerator: Box<dyn CandidateEnumerator>) -> Self {
        Self { enumerator }
    }

    /// Run the full boot sequence. `raw_args` replaces the process's own
    /// arguments when given (the binary name is implied).
    pub async fn start(&self, raw_args: Option<Vec<String>>) -> Result<()> {
        let report = discover_plugins(self.enumerator.as_ref());
        debug!(
            plugins = report.plugins.len(),
            skipped = report.skipped.len(),
            "Plugin discovery finished"
        );

        let mut registry = PluginRegistry::new();
        for plugin in report.plugins {
            registry.register(plugin)?;
        }

        let parser = CliParser::new(&registry)?;
        let invocation = match raw_args {
            Some(args) => parser.parse_from(args)?,
            None => parser.parse()?,
        };

        let paths = SysPaths::resolve(
            invocation.plugin.name(),
            invocation.module.name(),
            invocation.sysdir.as_deref(),
            invocation.config_path.as_deref(),
        )?;
        paths.initialize()?;

        let module = invocation.module.instantiate(ModuleData {
            name: invocation.module.name().to_string(),
            description: invocation.module.description().map(str::to_string),
            args: invocation.args,
            // Reserved: config files are located but not parsed yet.
            config: None,
            plugin: invocation.plugin.to_ref(),
            rootdir: paths.rootdir.clone(),
            plugin_common_sysdir: paths.plugin_common_sysdir.clone(),
            module_sysdir: paths.module_sysdir.clone(),
            verbosity_level: invocation.verbosity_level,
        });

        if let Some(hook) = invocation.plugin.hook() {
            debug!(plugin = %invocation.plugin.name(), "Running plugin initialization hook");
            hook.initialize(PluginInitContext {
                root_dir: &paths.rootdir,
                config_path: &paths.config_path,
                module: module.as_ref(),
                plugin_sysdir: &paths.plugin_sysdir,
                plugin_common_sysdir: &paths.plugin_common_sysdir,
                module_sysdir: &paths.module_sysdir,
            })
            .await?;
        }

        module.execute().await
    }
}

impl Default for Boot {
    fn default() -> Self {
        Self::new()
    }
}
