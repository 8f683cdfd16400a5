/// Recommended maximum resolution depth if not otherwise specified.
///
/// Depth counts nested resolutions: an accessor whose getter reads another
/// attribute of the same instance resolves at depth 2, and so on. A getter that
/// reads its own attribute would otherwise recurse until the stack overflows.
///
/// Lower in debug mode to avoid stack overflow (debug builds use more stack space
/// per call frame).
#[cfg(debug_assertions)]
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 100;

/// Recommended maximum resolution depth if not otherwise specified.
#[cfg(not(debug_assertions))]
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 500;

/// Maximum depth of single-path inheritance chains.
///
/// Checked when a class is built; deeper hierarchies are rejected with
/// `DefinitionError::InheritanceTooDeep`.
pub const MAX_INHERITANCE_DEPTH: usize = 1000;

/// Configuration for resolution limits.
///
/// All limits are optional; `None` falls back to the documented default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResolveLimits {
    /// Maximum nesting of get/set/delete calls made through hooks.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl ResolveLimits {
    /// Creates limits with every value at its default.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_depth: None }
    }

    /// Sets the maximum resolution depth.
    #[must_use]
    pub const fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    /// Returns the effective depth limit.
    #[must_use]
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_RESOLUTION_DEPTH)
    }
}
