//! Resolution options for a [`Container`](crate::Container).

use crate::error::OptionsError;
use serde::{Deserialize, Serialize};

/// Tunables for how a container resolves its dependency graph.
///
/// Absent fields take their defaults, so an empty document is valid:
///
/// ```
/// use fibre_locator::ContainerOptions;
///
/// let options = ContainerOptions::from_yaml_str("max_depth: 32").unwrap();
/// assert!(options.detect_cycles);
/// assert_eq!(options.max_depth, Some(32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerOptions {
  /// Fail with `CircularDependency` when a key is re-entered during its own
  /// resolution. When off, a cycle recurses until something else fails.
  pub detect_cycles: bool,
  /// Maximum number of nested keyed resolutions. `None` means unlimited.
  pub max_depth: Option<usize>,
}

impl Default for ContainerOptions {
  fn default() -> Self {
    Self {
      detect_cycles: true,
      max_depth: None,
    }
  }
}

impl ContainerOptions {
  pub fn from_yaml_str(source: &str) -> Result<Self, OptionsError> {
    // serde_yaml rejects an empty document as a struct, treat it as defaults.
    if source.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(source)?)
  }
}
