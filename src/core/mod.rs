//! Built-in `core` plugin
//!
//! Seeded unconditionally by discovery so the generated grammar always
//! carries at least one subcommand. Ships two stub modules:
//!
//! - `core.configure` -- placeholder for configuring the system's core.
//!   Config file parsing is not wired up yet, so it only reports that.
//! - `core.register` -- placeholder for registering module classpaths in
//!   the system's storage; it accepts and logs the classpath list.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::args::{ArgKind, ArgSet, ArgSpec, Nargs};
use crate::error::Result;
use crate::plugins::{Module, ModuleData, ModuleFactory, ModuleSpec, PluginSpec};

/// Name of the built-in plugin.
pub const CORE_PLUGIN_NAME: &str = "core";

/// Build the built-in plugin spec. Version tracks the crate version.
pub fn core_plugin() -> PluginSpec {
    PluginSpec::new(
        CORE_PLUGIN_NAME,
        Some(env!("CARGO_PKG_VERSION")),
        vec![configure_spec(), register_spec()],
    )
}

fn configure_spec() -> ModuleSpec {
    ModuleSpec::new("configure", Arc::new(ConfigureFactory))
        .with_description("configure the system's core")
}

struct ConfigureFactory;

impl ModuleFactory for ConfigureFactory {
    fn create(&self, data: ModuleData) -> Box<dyn Module> {
        Box::new(ConfigureModule { data })
    }
}

struct ConfigureModule {
    data: ModuleData,
}

#[async_trait]
impl Module for ConfigureModule {
    async fn execute(&self) -> Result<()> {
        info!(
            module = %self.data.name,
            config = ?self.data.config,
            "Configuration is not wired up yet, nothing to do"
        );
        Ok(())
    }
}

fn register_spec() -> ModuleSpec {
    ModuleSpec::new("register", Arc::new(RegisterFactory))
        .with_description("register new modules in the system")
        .with_args(ArgSet::new().with(
            "module_classpath",
            ArgSpec::new(["module_classpath"], ArgKind::Str)
                .with_nargs(Nargs::OneOrMore)
                .with_parse_kind(ArgKind::Raw)
                .with_help("path to a module's entry in format `path/to/plugin:MyModule`"),
        ))
}

struct RegisterFactory;

impl ModuleFactory for RegisterFactory {
    fn create(&self, data: ModuleData) -> Box<dyn Module> {
        Box::new(RegisterModule { data })
    }
}

struct RegisterModule {
    data: ModuleData,
}

#[async_trait]
impl Module for RegisterModule {
    async fn execute(&self) -> Result<()> {
        let classpaths = self.data.args()?.get("module_classpath")?;
        debug!(classpaths = %classpaths.to_cli_token(), "Requested module registration");
        info!("Module registration storage is not wired up yet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::PluginRegistry;

    #[test]
    fn test_core_plugin_identity() {
        let plugin = core_plugin();
        assert_eq!(plugin.name(), "core");
        assert_eq!(plugin.version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_core_plugin_modules() {
        let plugin = core_plugin();
        let names: Vec<&str> = plugin
            .module_specs()
            .unwrap()
            .iter()
            .map(|module| module.name())
            .collect();
        assert_eq!(names, vec!["configure", "register"]);
    }

    #[test]
    fn test_core_plugin_passes_registration() {
        let mut registry = PluginRegistry::new();
        registry.register(core_plugin()).unwrap();
        assert!(registry.resolve("core.configure").is_ok());
        assert!(registry.resolve("core.register").is_ok());
    }

    #[tokio::test]
    async fn test_configure_module_executes() {
        let plugin = core_plugin();
        let module_spec = plugin.find_module("configure").unwrap();
        let module = module_spec.instantiate(ModuleData {
            name: "configure".to_string(),
            description: None,
            args: None,
            config: None,
            plugin: plugin.to_ref(),
            rootdir: std::env::temp_dir(),
            plugin_common_sysdir: std::env::temp_dir(),
            module_sysdir: std::env::temp_dir(),
            verbosity_level: 0,
        });
        module.execute().await.unwrap();
    }
}
