//! Plugin and module descriptors.
//!
//! Schema and behavior are deliberately split: a [`ModuleSpec`] is a
//! data-only description of one invocable subcommand (name, argument
//! schema, help text), while the behavior lives behind the
//! [`ModuleFactory`] it carries, which builds a [`Module`] instance for
//! one invocation. A [`PluginSpec`] bundles module specs under a common
//! name and version and is the unit of discovery and registration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::args::{ArgSet, BoundArgs};
use crate::error::{ClyjinError, Result};

/// Module name sentinel marking a plugin's root module, invocable by the
/// plugin's bare name.
pub const ROOT_MODULE_NAME: &str = "_root";

/// Version string reported for plugins that declare none.
pub const UNVERSIONED: &str = "unversioned";

/// Separator between plugin and module names in a namespaced subcommand.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Normalize a plugin or module name for matching: trimmed, lowercased.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A runnable module instance, constructed per invocation.
#[async_trait]
pub trait Module: Send + Sync {
    /// Execute the module. The return value is ignored by the boot
    /// sequencer; errors propagate unmodified to the process boundary.
    async fn execute(&self) -> Result<()>;
}

/// Constructs a module instance from its resolved invocation data.
///
/// This is the behavior half of a [`ModuleSpec`]: the explicit registry
/// entry tying a declared schema to executable code.
pub trait ModuleFactory: Send + Sync {
    fn create(&self, data: ModuleData) -> Box<dyn Module>;
}

/// Lightweight owning-plugin reference handed to module instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRef {
    pub name: String,
    pub version: String,
}

/// Everything a module instance receives from the boot sequencer.
#[derive(Debug, Clone)]
pub struct ModuleData {
    /// Resolved module name.
    pub name: String,

    /// Module description, if declared.
    pub description: Option<String>,

    /// Values bound by the parse, absent when the module declares no
    /// argument schema.
    pub args: Option<BoundArgs>,

    /// Parsed module configuration. Reserved: config files are located
    /// but not parsed by this version, so this is always `None`.
    pub config: Option<serde_json::Value>,

    /// The plugin the module belongs to.
    pub plugin: PluginRef,

    /// Directory the invocation was started from.
    pub rootdir: PathBuf,

    /// System directory shared by all modules of the owning plugin.
    pub plugin_common_sysdir: PathBuf,

    /// System directory private to this module. Modules should use only
    /// this directory for long-term file storage.
    pub module_sysdir: PathBuf,

    /// How verbose module output should be.
    pub verbosity_level: u8,
}

impl ModuleData {
    /// The bound argument set, failing when the module declares none.
    pub fn args(&self) -> Result<&BoundArgs> {
        self.args.as_ref().ok_or_else(|| ClyjinError::NoArgs {
            module: self.name.clone(),
        })
    }
}

/// Data-only description of one invocable subcommand.
#[derive(Clone)]
pub struct ModuleSpec {
    name: String,
    description: Option<String>,
    args: Option<ArgSet>,
    config_schema: Option<String>,
    factory: Arc<dyn ModuleFactory>,
}

impl ModuleSpec {
    /// Create a spec for a module under the given name. The name is
    /// normalized immediately; `_root` marks the plugin's root module.
    pub fn new(name: impl Into<String>, factory: Arc<dyn ModuleFactory>) -> Self {
        Self {
            name: normalize_name(&name.into()),
            description: None,
            args: None,
            config_schema: None,
            factory,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_args(mut self, args: ArgSet) -> Self {
        self.args = Some(args);
        self
    }

    /// Reserved: names the config section the module would read once
    /// config parsing lands. Never consulted by this version.
    pub fn with_config_schema(mut self, section: impl Into<String>) -> Self {
        self.config_schema = Some(section.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn args(&self) -> Option<&ArgSet> {
        self.args.as_ref()
    }

    pub fn config_schema(&self) -> Option<&str> {
        self.config_schema.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT_MODULE_NAME
    }

    /// Build the module instance for one invocation.
    pub fn instantiate(&self, data: ModuleData) -> Box<dyn Module> {
        self.factory.create(data)
    }
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("args", &self.args)
            .field("config_schema", &self.config_schema)
            .finish()
    }
}

/// The bundle handed to a plugin's initialization hook, covering
/// everything prepared before the module runs.
pub struct PluginInitContext<'a> {
    pub root_dir: &'a Path,
    pub config_path: &'a Path,
    /// The module instance about to be executed.
    pub module: &'a dyn Module,
    pub plugin_sysdir: &'a Path,
    pub plugin_common_sysdir: &'a Path,
    pub module_sysdir: &'a Path,
}

/// Extension point plugins use to perform setup before their module
/// runs. The default is to not attach a hook at all.
#[async_trait]
pub trait PluginHook: Send + Sync {
    async fn initialize(&self, ctx: PluginInitContext<'_>) -> Result<()>;
}

/// A named, versioned bundle of module specs; the unit of discovery.
#[derive(Clone)]
pub struct PluginSpec {
    name: String,
    version: Option<String>,
    modules: Vec<ModuleSpec>,
    hook: Option<Arc<dyn PluginHook>>,
}

impl PluginSpec {
    pub fn new(
        name: impl Into<String>,
        version: Option<&str>,
        modules: Vec<ModuleSpec>,
    ) -> Self {
        Self {
            name: normalize_name(&name.into()),
            version: version.map(str::to_string),
            modules,
            hook: None,
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn PluginHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared version, or the `unversioned` sentinel.
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(UNVERSIONED)
    }

    pub fn hook(&self) -> Option<&Arc<dyn PluginHook>> {
        self.hook.as_ref()
    }

    pub fn to_ref(&self) -> PluginRef {
        PluginRef {
            name: self.name.clone(),
            version: self.version().to_string(),
        }
    }

    /// The declared module specs, unchanged. An empty list is an error
    /// at the point it is first consulted.
    pub fn module_specs(&self) -> Result<&[ModuleSpec]> {
        if self.modules.is_empty() {
            return Err(ClyjinError::NoModules {
                plugin: self.name.clone(),
            });
        }
        Ok(&self.modules)
    }

    /// Resolve a module of this plugin by normalized name.
    pub fn find_module(&self, name: &str) -> Result<&ModuleSpec> {
        let wanted = normalize_name(name);
        self.module_specs()?
            .iter()
            .find(|module| module.name() == wanted)
            .ok_or_else(|| ClyjinError::ModuleNotFound {
                plugin: self.name.clone(),
                module: wanted,
            })
    }

    /// The subcommand name a module is invoked by: the plugin's bare name
    /// for the root module, `plugin.module` otherwise. The module must be
    /// a member of this plugin.
    pub fn namespaced_module_name(&self, module: &ModuleSpec) -> Result<String> {
        self.check_has_module(module)?;
        if module.is_root() {
            Ok(self.name.clone())
        } else {
            Ok(format!("{}{}{}", self.name, NAMESPACE_SEPARATOR, module.name()))
        }
    }

    fn check_has_module(&self, module: &ModuleSpec) -> Result<()> {
        let is_member = self
            .modules
            .iter()
            .any(|member| std::ptr::eq(member, module));
        if is_member {
            Ok(())
        } else {
            Err(ClyjinError::ForeignModule {
                plugin: self.name.clone(),
                module: module.name().to_string(),
            })
        }
    }
}

impl fmt::Debug for PluginSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSpec")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("modules", &self.modules)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{ArgKind, ArgSpec};

    struct NoopModule;

    #[async_trait]
    impl Module for NoopModule {
        async fn execute(&self) -> Result<()> {
            Ok(())
        }
    }

    struct NoopFactory;

    impl ModuleFactory for NoopFactory {
        fn create(&self, _data: ModuleData) -> Box<dyn Module> {
            Box::new(NoopModule)
        }
    }

    fn module(name: &str) -> ModuleSpec {
        ModuleSpec::new(name, Arc::new(NoopFactory))
    }

    fn plugin(name: &str, modules: Vec<ModuleSpec>) -> PluginSpec {
        PluginSpec::new(name, Some("1.0.0"), modules)
    }

    #[test]
    fn test_module_name_is_normalized() {
        let spec = module("  Configure ");
        assert_eq!(spec.name(), "configure");
    }

    #[test]
    fn test_root_module_detection() {
        assert!(module("_root").is_root());
        assert!(!module("configure").is_root());
    }

    #[test]
    fn test_version_sentinel() {
        let unversioned = PluginSpec::new("demo", None, vec![module("_root")]);
        assert_eq!(unversioned.version(), "unversioned");

        let versioned = plugin("demo", vec![module("_root")]);
        assert_eq!(versioned.version(), "1.0.0");
    }

    #[test]
    fn test_module_specs_rejects_empty_list() {
        let empty = plugin("empty", vec![]);
        let err = empty.module_specs().unwrap_err();
        assert!(matches!(err, ClyjinError::NoModules { plugin } if plugin == "empty"));
    }

    #[test]
    fn test_module_specs_returns_list_unchanged() {
        let spec = plugin("demo", vec![module("a"), module("b")]);
        let modules = spec.module_specs().unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name(), "a");
        assert_eq!(modules[1].name(), "b");
    }

    #[test]
    fn test_namespaced_name_for_root_module() {
        let spec = plugin("demo", vec![module("_root")]);
        let root = &spec.module_specs().unwrap()[0];
        assert_eq!(spec.namespaced_module_name(root).unwrap(), "demo");
    }

    #[test]
    fn test_namespaced_name_for_plain_module() {
        let spec = plugin("demo", vec![module("status")]);
        let status = &spec.module_specs().unwrap()[0];
        assert_eq!(spec.namespaced_module_name(status).unwrap(), "demo.status");
    }

    #[test]
    fn test_foreign_module_rejected() {
        let owner = plugin("owner", vec![module("mine")]);
        let other = plugin("other", vec![module("theirs")]);
        let foreign = &other.module_specs().unwrap()[0];

        let err = owner.namespaced_module_name(foreign).unwrap_err();
        assert!(matches!(
            err,
            ClyjinError::ForeignModule { plugin, module }
                if plugin == "owner" && module == "theirs"
        ));
    }

    #[test]
    fn test_find_module_normalizes_lookup() {
        let spec = plugin("demo", vec![module("status")]);
        assert_eq!(spec.find_module(" Status ").unwrap().name(), "status");
    }

    #[test]
    fn test_find_module_not_found() {
        let spec = plugin("demo", vec![module("status")]);
        let err = spec.find_module("missing").unwrap_err();
        assert!(matches!(
            err,
            ClyjinError::ModuleNotFound { plugin, module }
                if plugin == "demo" && module == "missing"
        ));
    }

    #[test]
    fn test_module_data_args_accessor() {
        let data = ModuleData {
            name: "status".to_string(),
            description: None,
            args: None,
            config: None,
            plugin: PluginRef {
                name: "demo".to_string(),
                version: "1.0.0".to_string(),
            },
            rootdir: PathBuf::from("/tmp"),
            plugin_common_sysdir: PathBuf::from("/tmp/common"),
            module_sysdir: PathBuf::from("/tmp/status"),
            verbosity_level: 0,
        };
        let err = data.args().unwrap_err();
        assert!(matches!(err, ClyjinError::NoArgs { module } if module == "status"));
    }

    #[test]
    fn test_module_spec_with_args() {
        let spec = module("greet").with_args(
            crate::args::ArgSet::new().with("name", ArgSpec::new(["name"], ArgKind::Str)),
        );
        assert_eq!(spec.args().unwrap().len(), 1);
    }
}
