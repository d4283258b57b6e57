//! Filesystem layout for one invocation.
//!
//! Clyjin keeps per-user state under a single system directory,
//! conventionally `~/.clyjin`, with one subdirectory per plugin and one
//! per module:
//!
//! ```text
//! <sysdir>/plugins/<plugin>/
//! ├── common/       shared by all of the plugin's modules
//! └── <module>/     private to one module
//! ```
//!
//! Directory creation is create-if-missing and safe to re-run; it is the
//! only externally visible side effect before module execution.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{ClyjinError, Result};

/// Directory under the user's home holding all clyjin state.
pub const SYSDIR_DIR_NAME: &str = ".clyjin";

/// Conventional config file name, looked up in the root directory.
pub const CONFIG_FILE_NAME: &str = "clyjin.yml";

const PLUGINS_DIR_NAME: &str = "plugins";
const COMMON_DIR_NAME: &str = "common";

/// All paths computed for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysPaths {
    /// Directory the invocation was started from.
    pub rootdir: PathBuf,

    /// Main configuration file. May not exist; absence means defaults.
    pub config_path: PathBuf,

    /// The system state directory.
    pub sysdir: PathBuf,

    /// State directory of the resolved plugin.
    pub plugin_sysdir: PathBuf,

    /// State shared by all of the plugin's modules.
    pub plugin_common_sysdir: PathBuf,

    /// State private to the resolved module.
    pub module_sysdir: PathBuf,
}

impl SysPaths {
    /// Compute the layout for a resolved `(plugin, module)` pair,
    /// honoring the `--sysdir` and `--config` overrides when given.
    pub fn resolve(
        plugin_name: &str,
        module_name: &str,
        sysdir_override: Option<&Path>,
        config_override: Option<&Path>,
    ) -> Result<Self> {
        let rootdir = std::env::current_dir()?;

        let sysdir = match sysdir_override {
            Some(path) => path.to_path_buf(),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    ClyjinError::Config(
                        "cannot determine the home directory for the default sysdir".to_string(),
                    )
                })?
                .join(SYSDIR_DIR_NAME),
        };

        let plugin_sysdir = sysdir.join(PLUGINS_DIR_NAME).join(plugin_name);
        let plugin_common_sysdir = plugin_sysdir.join(COMMON_DIR_NAME);
        let module_sysdir = plugin_sysdir.join(module_name);

        let config_path = match config_override {
            Some(path) => path.to_path_buf(),
            None => rootdir.join(CONFIG_FILE_NAME),
        };

        Ok(Self {
            rootdir,
            config_path,
            sysdir,
            plugin_sysdir,
            plugin_common_sysdir,
            module_sysdir,
        })
    }

    /// Create the state directories, tolerating pre-existing ones. A
    /// missing config file is reported as a warning, not an error.
    pub fn initialize(&self) -> Result<()> {
        for dir in [
            &self.sysdir,
            &self.plugin_sysdir,
            &self.plugin_common_sysdir,
            &self.module_sysdir,
        ] {
            fs::create_dir_all(dir)?;
        }

        if !self.config_path.exists() {
            warn!(
                path = %self.config_path.display(),
                "Config file not found, using defaults"
            );
        }

        Ok(())
    }
}
