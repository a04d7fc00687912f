//! Runtime Configuration
//!
//! Hosts usually construct [`RuntimeConfig::default`], but the same settings
//! can be shipped alongside an application as JSON:
//!
//! ```rust
//! use lattice_dataflow::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_json(r#"{ "max_scope_depth": 64 }"#).unwrap();
//! assert_eq!(config.max_scope_depth, 64);
//! assert!(config.auto_refresh);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for a [`Runtime`](crate::runtime::Runtime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Maximum nesting of scopes below the root.
    ///
    /// Recursive UI functions (trees, nested lists) deepen the address on
    /// every level. Crossing this limit halts the traversal.
    pub max_scope_depth: usize,

    /// Re-run the traversal after a dispatched action mutated state.
    pub auto_refresh: bool,
}

impl RuntimeConfig {
    pub const DEFAULT_MAX_SCOPE_DEPTH: usize = 256;

    /// Parse a configuration document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_scope_depth: Self::DEFAULT_MAX_SCOPE_DEPTH,
            auto_refresh: true,
        }
    }
}
