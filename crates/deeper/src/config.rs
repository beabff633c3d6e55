//! Engine configuration

use serde::{Deserialize, Serialize};

/// Default recursion depth limit
///
/// Each nesting level costs a few stack frames; 1 000 levels fit a 2 MiB
/// thread stack with room to spare. Raise it only for threads spawned with a
/// larger stack.
pub const DEFAULT_MAX_DEPTH: usize = 1_000;

/// Clone engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClonerConfig {
    /// Maximum recursion depth; `None` disables the guard and leaves very deep
    /// graphs to overflow the stack
    pub max_depth: Option<usize>,
    /// Cloned sequences reserve the capacity of their source
    pub preserve_capacity: bool,
    /// Share opaque objects that have no cloning hook instead of failing
    pub share_opaque: bool,
}

impl ClonerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With recursion depth limit
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// With capacity preservation
    #[inline]
    #[must_use]
    pub fn with_preserve_capacity(mut self, preserve: bool) -> Self {
        self.preserve_capacity = preserve;
        self
    }

    /// With opaque object sharing
    #[inline]
    #[must_use]
    pub fn with_share_opaque(mut self, share: bool) -> Self {
        self.share_opaque = share;
        self
    }
}

impl Default for ClonerConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            preserve_capacity: true,
            share_opaque: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClonerConfig::new();
        assert_eq!(config.max_depth, Some(DEFAULT_MAX_DEPTH));
        assert!(config.preserve_capacity);
        assert!(config.share_opaque);
    }

    #[test]
    fn builder() {
        let config = ClonerConfig::new()
            .with_max_depth(None)
            .with_share_opaque(false);
        assert!(config.max_depth.is_none());
        assert!(!config.share_opaque);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ClonerConfig = serde_json::from_str(r#"{"max_depth": 64}"#).unwrap();
        assert_eq!(config.max_depth, Some(64));
        assert!(config.preserve_capacity);
    }
}
