use indexmap::IndexMap;

use crate::hook::HookRef;

/// Per-class registry mapping attribute names to hooks.
///
/// Populated at class definition time and immutable afterwards; redefining an
/// attribute means defining a new class, never swapping a hook in place, so hook
/// identity stays stable for the lifetime of the class.
#[derive(Debug, Clone, Default)]
pub struct DescriptorTable {
    entries: IndexMap<String, HookRef>,
}

impl DescriptorTable {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry during class definition. A later entry for the same name
    /// replaces the earlier one, like rebinding a name in a class body.
    pub(crate) fn insert(&mut self, name: String, hook: HookRef) {
        self.entries.insert(name, hook);
    }

    /// Returns this table's own hook for `name`, without consulting base classes.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HookRef> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HookRef)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
