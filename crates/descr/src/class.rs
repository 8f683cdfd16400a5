//! Class objects and their instances.
//!
//! `Class` represents a class definition: a name, ordered bases and a
//! [`DescriptorTable`] of hooks. `Instance` represents an object created from a
//! class; it owns exactly one [`Storage`] whose kind the class decides.
//!
//! # Attribute Lookup
//!
//! - A class looks up hooks in its own table first, then in each base in declared
//!   order (depth-first, first match wins).
//! - There is no C3 linearization: a base reached twice through a diamond is only
//!   consulted the first time.
//!
//! # Storage
//!
//! - Classes that declare slots use a [`SlotStore`] whose layout is the inherited
//!   slots followed by the class's own. Each own slot gets a [`SlotBound`] hook.
//! - All other classes use a [`DynamicStore`](crate::storage::DynamicStore).

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use smallvec::SmallVec;

use crate::{
    exception::{AttrResult, DefinitionError},
    hook::{Hook, HookRef},
    hooks::{PlainValue, SlotBound},
    resolver::Resolver,
    resource::MAX_INHERITANCE_DEPTH,
    storage::{DynamicStore, SlotLayout, SlotStore, Storage},
    table::DescriptorTable,
    tracer::NoopTracer,
    value::Value,
};

/// Source of unique class ids, used to deduplicate diamond ancestors.
static NEXT_CLASS_UID: AtomicU64 = AtomicU64::new(1);

/// A class definition.
///
/// Immutable once built and shared through `Arc`, so the same class can be read
/// from many threads without synchronization.
pub struct Class {
    /// The class name (e.g., "Foo", "MyClass").
    name: String,
    /// Unique ID for this class.
    uid: u64,
    /// Direct base classes, in declared order.
    bases: SmallVec<[Arc<Self>; 2]>,
    /// Every class reachable through `bases`, depth-first in declared order,
    /// without duplicates. Does not include this class.
    ancestors: Vec<Arc<Self>>,
    /// Hooks defined directly on this class.
    table: DescriptorTable,
    /// Slot layout for slot-backed classes, `None` for dynamic storage.
    layout: Option<Arc<SlotLayout>>,
    /// Length of the longest base chain above this class.
    depth: usize,
}

impl Class {
    /// Starts defining a class named `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            bases: SmallVec::new(),
            entries: Vec::new(),
            slots: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn uid(&self) -> u64 {
        self.uid
    }

    #[must_use]
    pub fn bases(&self) -> &[Arc<Self>] {
        &self.bases
    }

    /// Returns the hooks defined directly on this class.
    #[must_use]
    pub fn table(&self) -> &DescriptorTable {
        &self.table
    }

    /// Returns this class followed by its ancestors in lookup order.
    #[must_use]
    pub fn resolution_order(&self) -> Vec<&Self> {
        std::iter::once(self).chain(self.ancestors.iter().map(AsRef::as_ref)).collect()
    }

    /// Finds the hook for `name` on this class or the first base chain providing one.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&HookRef> {
        self.lookup_with_owner(name).map(|(_, hook)| hook)
    }

    /// Like [`lookup`](Self::lookup), but also returns the class whose table held the hook.
    #[must_use]
    pub fn lookup_with_owner(&self, name: &str) -> Option<(&Self, &HookRef)> {
        if let Some(hook) = self.table.get(name) {
            return Some((self, hook));
        }
        self.ancestors
            .iter()
            .find_map(|cls| cls.table.get(name).map(|hook| (cls.as_ref(), hook)))
    }

    /// Returns whether this class is `other` or derives from it.
    #[must_use]
    pub fn is_subclass_of(&self, other: &Self) -> bool {
        self.uid == other.uid || self.ancestors.iter().any(|cls| cls.uid == other.uid)
    }

    /// Returns whether instances use slot storage.
    #[must_use]
    pub fn uses_slots(&self) -> bool {
        self.layout.is_some()
    }

    #[must_use]
    pub fn slot_layout(&self) -> Option<&Arc<SlotLayout>> {
        self.layout.as_ref()
    }

    /// Returns the full slot layout (inherited slots first), empty for dynamic classes.
    #[must_use]
    pub fn slot_names(&self) -> &[String] {
        self.layout.as_deref().map_or(&[][..], SlotLayout::names)
    }

    /// Creates a new instance with empty storage.
    #[must_use]
    pub fn instantiate(self: &Arc<Self>) -> Instance {
        Instance::new(self)
    }

    fn new_storage(&self) -> Storage {
        match &self.layout {
            Some(layout) => Storage::Slots(SlotStore::new(Arc::clone(layout))),
            None => Storage::Dynamic(DynamicStore::new()),
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("uid", &self.uid)
            .field("bases", &self.bases.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("table", &self.table.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .field("slots", &self.slot_names())
            .finish()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.name)
    }
}

/// Builder for [`Class`], collecting bases, hooks and slots before validation.
#[must_use]
pub struct ClassBuilder {
    name: String,
    bases: SmallVec<[Arc<Class>; 2]>,
    entries: Vec<(String, HookRef)>,
    slots: Option<Vec<String>>,
}

impl ClassBuilder {
    /// Appends a base class. Bases are consulted in the order they are added.
    pub fn base(mut self, base: &Arc<Class>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Registers `hook` under `name`.
    pub fn hook(self, name: impl Into<String>, hook: impl Hook + 'static) -> Self {
        self.hook_ref(name, Arc::new(hook))
    }

    /// Registers an already shared hook under `name`.
    pub fn hook_ref(mut self, name: impl Into<String>, hook: HookRef) -> Self {
        self.entries.push((name.into(), hook));
        self
    }

    /// Registers a plain class attribute, e.g. `class_attr = 123`.
    pub fn value(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.hook(name, PlainValue::new(value))
    }

    /// Declares the class slot-backed with the given slot names, in order.
    pub fn slots<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Validates the definition and builds the class.
    pub fn build(self) -> Result<Arc<Class>, DefinitionError> {
        let Self {
            name,
            bases,
            entries,
            slots,
        } = self;

        let depth = bases.iter().map(|b| b.depth + 1).max().unwrap_or(0);
        if depth > MAX_INHERITANCE_DEPTH {
            return Err(DefinitionError::InheritanceTooDeep {
                class: name,
                limit: MAX_INHERITANCE_DEPTH,
            });
        }

        let mut ancestors: Vec<Arc<Class>> = Vec::new();
        for base in &bases {
            for cls in std::iter::once(base).chain(&base.ancestors) {
                if !ancestors.iter().any(|seen| seen.uid == cls.uid) {
                    ancestors.push(Arc::clone(cls));
                }
            }
        }

        let mut table = DescriptorTable::new();
        for (attr, hook) in entries {
            table.insert(attr, hook);
        }

        let layout = match slots {
            Some(own) => Some(build_slot_layout(&name, &bases, &own, &mut table)?),
            None => None,
        };

        Ok(Arc::new(Class {
            name,
            uid: NEXT_CLASS_UID.fetch_add(1, Ordering::Relaxed),
            bases,
            ancestors,
            table,
            layout,
            depth,
        }))
    }
}

/// Computes the slot layout for a slot-backed class and registers a [`SlotBound`]
/// hook for each of its own slots.
fn build_slot_layout(
    name: &str,
    bases: &[Arc<Class>],
    own: &[String],
    table: &mut DescriptorTable,
) -> Result<Arc<SlotLayout>, DefinitionError> {
    let mut inherited: Option<&Arc<SlotLayout>> = None;
    for base in bases {
        let Some(base_layout) = base.slot_layout() else {
            return Err(DefinitionError::DynamicBase {
                class: name.to_owned(),
                base: base.name().to_owned(),
            });
        };
        if base_layout.is_empty() {
            continue;
        }
        if inherited.is_some_and(|seen| seen != base_layout) {
            return Err(DefinitionError::LayoutConflict { class: name.to_owned() });
        }
        inherited = Some(base_layout);
    }

    if let Some(slot) = own.iter().find(|slot| table.contains(slot)) {
        return Err(DefinitionError::SlotConflictsWithAttribute {
            class: name.to_owned(),
            slot: slot.clone(),
        });
    }

    let inherited_names = inherited.map_or(&[][..], |layout| layout.names());
    let layout = SlotLayout::new(name, inherited_names.iter().chain(own).cloned())?;
    for slot in own {
        if let Some(index) = layout.index_of(slot) {
            table.insert(slot.clone(), Arc::new(SlotBound::new(index)));
        }
    }
    Ok(Arc::new(layout))
}

/// An object created from a [`Class`].
///
/// Owns its storage exclusively; the storage is dropped with the instance.
#[derive(Debug, Clone)]
pub struct Instance {
    class: Arc<Class>,
    storage: Storage,
}

impl Instance {
    /// Creates an instance of `class` with empty storage of the class's kind.
    #[must_use]
    pub fn new(class: &Arc<Class>) -> Self {
        Self {
            storage: class.new_storage(),
            class: Arc::clone(class),
        }
    }

    #[must_use]
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Returns the raw storage, bypassing every hook.
    ///
    /// Writing here is the equivalent of assigning to `instance.__dict__[name]`.
    #[must_use]
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Resolves `name` with an untraced, default-limited resolver.
    pub fn get_attr(&mut self, name: &str) -> AttrResult<Value> {
        Resolver::new(&mut NoopTracer).get(self, name)
    }

    /// Assigns `name` with an untraced, default-limited resolver.
    pub fn set_attr(&mut self, name: &str, value: impl Into<Value>) -> AttrResult<()> {
        Resolver::new(&mut NoopTracer).set(self, name, value)
    }

    /// Deletes `name` with an untraced, default-limited resolver.
    pub fn del_attr(&mut self, name: &str) -> AttrResult<()> {
        Resolver::new(&mut NoopTracer).delete(self, name)
    }
}
