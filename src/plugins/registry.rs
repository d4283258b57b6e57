//! Plugin registry for Clyjin
//!
//! This module provides the `PluginRegistry` struct that holds all plugins
//! taking part in one boot, validates them at registration time, and
//! resolves namespaced module tokens back to `(plugin, module)` pairs.
//! Registration order is preserved: the built-in plugin is always first,
//! discovered plugins follow in discovery order.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::error::{ClyjinError, Result};

use super::types::{ModuleSpec, PluginSpec, NAMESPACE_SEPARATOR, ROOT_MODULE_NAME};

/// Plugin names: 1-64 chars, lowercase alphanumeric plus `_` and `-`,
/// starting alphanumeric. Checked against the normalized name.
static PLUGIN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$").unwrap());

/// Module names additionally admit the `_root` sentinel's leading
/// underscore, but never the namespace separator.
static MODULE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_][a-z0-9_-]{0,63}$").unwrap());

/// Validate a plugin spec for registration.
///
/// Checks, in order:
/// - plugin name charset,
/// - non-empty module list,
/// - module name charset (separator-free),
/// - unique module names within the plugin,
/// - at most one root module (the error fires on the second one and
///   names both the plugin and the module),
/// - unique argument keys within each module's schema.
pub fn validate_plugin(plugin: &PluginSpec) -> Result<()> {
    if !PLUGIN_NAME_RE.is_match(plugin.name()) {
        return Err(ClyjinError::InvalidName {
            entity: "plugin",
            name: plugin.name().to_string(),
            reason: "must be 1-64 lowercase alphanumeric characters, `_` or `-`, \
                     starting with an alphanumeric"
                .to_string(),
        });
    }

    let modules = plugin.module_specs()?;

    let mut seen_names: Vec<&str> = Vec::new();
    let mut has_root = false;
    for module in modules {
        if !MODULE_NAME_RE.is_match(module.name()) {
            return Err(ClyjinError::InvalidName {
                entity: "module",
                name: module.name().to_string(),
                reason: "must be 1-64 lowercase alphanumeric characters, `_` or `-`, \
                         without a namespace separator"
                    .to_string(),
            });
        }

        if seen_names.contains(&module.name()) && module.name() != ROOT_MODULE_NAME {
            return Err(ClyjinError::InvalidName {
                entity: "module",
                name: module.name().to_string(),
                reason: format!("declared twice by plugin <{}>", plugin.name()),
            });
        }

        if module.is_root() {
            if has_root {
                return Err(ClyjinError::DuplicateRootModule {
                    plugin: plugin.name().to_string(),
                    module: module.name().to_string(),
                });
            }
            has_root = true;
        }
        seen_names.push(module.name());

        if let Some(args) = module.args() {
            let mut seen_keys: Vec<&str> = Vec::new();
            for key in args.keys() {
                if seen_keys.contains(&key) {
                    return Err(ClyjinError::InvalidName {
                        entity: "argument",
                        name: key.to_string(),
                        reason: format!("declared twice by module <{}>", module.name()),
                    });
                }
                seen_keys.push(key);
            }
        }
    }

    Ok(())
}

/// Holds every plugin taking part in the current boot.
pub struct PluginRegistry {
    plugins: Vec<PluginSpec>,
}

impl PluginRegistry {
    /// Create a new empty plugin registry.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Register a plugin, validating it first. Registration failures are
    /// definition errors and abort the boot; the registry is unchanged
    /// when an error is returned.
    pub fn register(&mut self, plugin: PluginSpec) -> Result<()> {
        validate_plugin(&plugin)?;

        if self.get_plugin(plugin.name()).is_some() {
            return Err(ClyjinError::DuplicatePlugin {
                plugin: plugin.name().to_string(),
            });
        }

        info!(
            plugin = %plugin.name(),
            version = %plugin.version(),
            modules = plugin.module_specs()?.len(),
            "Registered plugin"
        );

        self.plugins.push(plugin);
        Ok(())
    }

    /// All registered plugins in registration order.
    pub fn plugins(&self) -> &[PluginSpec] {
        &self.plugins
    }

    /// Look up a plugin by name, case-insensitively.
    pub fn get_plugin(&self, name: &str) -> Option<&PluginSpec> {
        let wanted = super::types::normalize_name(name);
        self.plugins.iter().find(|plugin| plugin.name() == wanted)
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Resolve a module token into its `(plugin, module)` pair.
    ///
    /// The token is split on the namespace separator: zero separators
    /// address the plugin's root module, exactly one addresses an
    /// explicit `plugin.module` pair, and anything beyond that is
    /// rejected before any lookup happens. Plugin and module name
    /// matching is case-insensitive.
    pub fn resolve(&self, token: &str) -> Result<(&PluginSpec, &ModuleSpec)> {
        let mut parts = token.split(NAMESPACE_SEPARATOR);
        let plugin_name = parts.next().unwrap_or_default();
        let module_name = parts.next().unwrap_or(ROOT_MODULE_NAME);
        if parts.next().is_some() {
            return Err(ClyjinError::UnsupportedNamespace {
                token: token.to_string(),
            });
        }

        let plugin = self
            .get_plugin(plugin_name)
            .ok_or_else(|| ClyjinError::PluginNotFound {
                name: plugin_name.to_string(),
            })?;
        let module = plugin.find_module(module_name)?;
        Ok((plugin, module))
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
