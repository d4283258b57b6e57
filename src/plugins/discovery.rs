//! Plugin discovery for Clyjin
//!
//! Discovery turns the set of installed plugin packages into the plugin
//! list for one boot. The set of candidates comes from an injectable
//! [`CandidateEnumerator`] so embedders can plug in their own packaging
//! story and tests can feed synthetic candidates.
//!
//! Only candidates whose package name carries the `clyjin-` prefix are
//! considered. A candidate that fails to load is logged and skipped with
//! its reason recorded; it never aborts the overall discovery. The
//! built-in `core` plugin is always seeded first, so the resulting list
//! is never empty.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;

use super::types::PluginSpec;

/// Naming-convention prefix marking a package as a plugin provider.
pub const PLUGIN_PACKAGE_PREFIX: &str = "clyjin-";

/// Produces the plugin spec of one candidate package on demand.
pub type PluginLoader = Arc<dyn Fn() -> Result<PluginSpec> + Send + Sync>;

/// One installable package that may provide a plugin.
#[derive(Clone)]
pub struct PluginCandidate {
    package: String,
    loader: PluginLoader,
}

impl PluginCandidate {
    pub fn new(
        package: impl Into<String>,
        loader: impl Fn() -> Result<PluginSpec> + Send + Sync + 'static,
    ) -> Self {
        Self {
            package: package.into(),
            loader: Arc::new(loader),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Load the candidate's plugin spec. Failures cover both a missing
    /// plugin export and an export of the wrong shape.
    pub fn load(&self) -> Result<PluginSpec> {
        (self.loader)()
    }
}

impl fmt::Debug for PluginCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginCandidate")
            .field("package", &self.package)
            .finish()
    }
}

/// Enumerates the plugin-candidate packages visible to this process.
#[cfg_attr(test, mockall::automock)]
pub trait CandidateEnumerator: Send + Sync {
    fn enumerate(&self) -> Vec<PluginCandidate>;
}

/// Enumerator over an explicit candidate list. This is the default
/// mechanism: embedders register the plugins linked into their binary.
#[derive(Debug, Default)]
pub struct StaticCandidates {
    candidates: Vec<PluginCandidate>,
}

impl StaticCandidates {
    pub fn new(candidates: Vec<PluginCandidate>) -> Self {
        Self { candidates }
    }
}

impl CandidateEnumerator for StaticCandidates {
    fn enumerate(&self) -> Vec<PluginCandidate> {
        self.candidates.clone()
    }
}

/// A candidate that was enumerated but yielded no plugin.
#[derive(Debug, Clone)]
pub struct SkippedCandidate {
    pub package: String,
    pub reason: String,
}

/// The outcome of one discovery pass.
#[derive(Debug)]
pub struct DiscoveryReport {
    /// Validated plugins: the built-in plugin first, then discovered
    /// plugins in enumeration order.
    pub plugins: Vec<PluginSpec>,
    /// Candidates skipped with the reason they failed.
    pub skipped: Vec<SkippedCandidate>,
}

/// Discover the plugins for one boot.
///
/// The built-in `core` plugin is seeded unconditionally, so the grammar
/// generated from the result always has at least one subcommand. Loader
/// failures are non-fatal: the candidate is logged, recorded in the
/// report, and discovery continues.
pub fn discover_plugins(enumerator: &dyn CandidateEnumerator) -> DiscoveryReport {
    let mut plugins = vec![crate::core::core_plugin()];
    let mut skipped = Vec::new();

    for candidate in enumerator.enumerate() {
        if !candidate.package().starts_with(PLUGIN_PACKAGE_PREFIX) {
            debug!(
                package = %candidate.package(),
                "Package does not carry the plugin prefix, ignoring"
            );
            continue;
        }

        match candidate.load() {
            Ok(plugin) => {
                info!(
                    package = %candidate.package(),
                    plugin = %plugin.name(),
                    version = %plugin.version(),
                    "Discovered plugin"
                );
                plugins.push(plugin);
            }
            Err(e) => {
                warn!(
                    package = %candidate.package(),
                    error = %e,
                    "Failed to load plugin, skipping"
                );
                skipped.push(SkippedCandidate {
                    package: candidate.package().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    DiscoveryReport { plugins, skipped }
}
