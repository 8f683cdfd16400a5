//! Attribute resolution tracing.
//!
//! The [`AttrTracer`] trait defines hook points at the key events of a resolution
//! pass (class-chain lookup, hook dispatch, raw storage access, cache fills).
//! Every method has a default no-op body, so [`NoopTracer`] needs no code at all.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | No-op (default for `Instance::get_attr` and friends) |
//! | [`StderrTracer`] | Human-readable resolution log to stderr |
//! | [`ProfilingTracer`] | Counters for hook dispatch, storage traffic and depth |
//! | [`RecordingTracer`] | Full event recording for post-mortem analysis |
//!
//! # Usage
//!
//! The resolver borrows the tracer for its lifetime:
//!
//! ```ignore
//! let mut tracer = ProfilingTracer::new();
//! let mut resolver = Resolver::new(&mut tracer);
//! resolver.get(&mut instance, "x")?;
//! println!("{}", tracer.report());
//! ```
//!
//! Hooks receive the resolver and so see the same tracer; nested resolutions
//! triggered by accessors are reported with their depth.

use std::collections::HashMap;

use crate::{exception::Operation, hook::HookKind};

/// Trace event emitted during resolution.
///
/// Used by [`RecordingTracer`] to capture the full sequence of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// The class chain was searched for a hook.
    Lookup {
        /// Name of the instance's class.
        class: String,
        /// Attribute name.
        name: String,
        /// Kind of the hook found, `None` if no class in the chain defines one.
        found: Option<HookKind>,
    },
    /// The resolver delegated to a hook.
    Hook {
        op: Operation,
        name: String,
        kind: HookKind,
        /// Resolution depth at the time of dispatch (1 for a top-level call).
        depth: usize,
    },
    /// The resolver accessed instance storage directly.
    Storage { op: Operation, name: String },
    /// A cached hook computed and stored a value.
    CacheFill { name: String },
    /// A resolution was refused because it would exceed the depth limit.
    DepthExceeded { limit: usize },
}

/// Trait for resolution tracing.
///
/// All methods have default no-op implementations. Implementations only override
/// the hooks they care about.
pub trait AttrTracer: std::fmt::Debug {
    /// Called after the class chain has been searched for `name`.
    ///
    /// # Arguments
    /// * `class` - Name of the instance's class (or the class itself for class-level access)
    /// * `name` - Attribute name
    /// * `found` - Kind of the hook found, if any
    #[inline]
    fn on_lookup(&mut self, _class: &str, _name: &str, _found: Option<HookKind>) {}

    /// Called before the resolver delegates `op` to a hook.
    ///
    /// # Arguments
    /// * `op` - The operation being delegated
    /// * `name` - Attribute name
    /// * `kind` - Kind of the hook
    /// * `depth` - Resolution depth (1 for a top-level call)
    #[inline]
    fn on_hook(&mut self, _op: Operation, _name: &str, _kind: HookKind, _depth: usize) {}

    /// Called when the resolver reads, writes or removes an instance storage entry
    /// itself (not when a hook does so on its own behalf).
    #[inline]
    fn on_storage(&mut self, _op: Operation, _name: &str) {}

    /// Called when a cached hook computes a value and writes it to storage.
    #[inline]
    fn on_cache_fill(&mut self, _name: &str) {}

    /// Called when a resolution is refused by the depth guard.
    #[inline]
    fn on_depth_exceeded(&mut self, _limit: usize) {}
}

// ============================================================================
// NoopTracer - default
// ============================================================================

/// A tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl AttrTracer for NoopTracer {}

// ============================================================================
// StderrTracer - human-readable log
// ============================================================================

/// Tracer that prints a human-readable resolution log to stderr.
///
/// Output format:
/// ```text
/// LOOKUP  Person.age             -> typed
///   [1] SET    age               via typed
/// LOOKUP  Person.nickname        -> none
///   STORE  GET    nickname
/// ```
#[derive(Debug, Default)]
pub struct StderrTracer {
    /// Maximum number of lines to print before stopping. None = unlimited.
    limit: Option<usize>,
    /// Number of lines printed so far.
    count: usize,
}

impl StderrTracer {
    /// Creates a new stderr tracer with no line limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new stderr tracer that stops after `limit` lines.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            count: 0,
        }
    }

    /// Returns false once the limit has been reached, printing a marker the first time.
    fn admit(&mut self) -> bool {
        match self.limit {
            Some(limit) if self.count > limit => false,
            Some(limit) if self.count == limit => {
                eprintln!("--- trace limit reached ({limit} lines) ---");
                self.count += 1;
                false
            }
            _ => {
                self.count += 1;
                true
            }
        }
    }
}

impl AttrTracer for StderrTracer {
    fn on_lookup(&mut self, class: &str, name: &str, found: Option<HookKind>) {
        if !self.admit() {
            return;
        }
        let target = format!("{class}.{name}");
        match found {
            Some(kind) => eprintln!("LOOKUP  {target:<22} -> {kind}"),
            None => eprintln!("LOOKUP  {target:<22} -> none"),
        }
    }

    fn on_hook(&mut self, op: Operation, name: &str, kind: HookKind, depth: usize) {
        if !self.admit() {
            return;
        }
        let op = op.to_string().to_uppercase();
        eprintln!("  [{depth}] {op:<6} {name:<18} via {kind}");
    }

    fn on_storage(&mut self, op: Operation, name: &str) {
        if !self.admit() {
            return;
        }
        let op = op.to_string().to_uppercase();
        eprintln!("  STORE  {op:<6} {name}");
    }

    fn on_cache_fill(&mut self, name: &str) {
        if !self.admit() {
            return;
        }
        eprintln!("  +++ CACHE FILL {name}");
    }

    fn on_depth_exceeded(&mut self, limit: usize) {
        if !self.admit() {
            return;
        }
        eprintln!("  !!! DEPTH LIMIT {limit}");
    }
}

// ============================================================================
// ProfilingTracer - counters
// ============================================================================

/// Tracer that collects resolution statistics.
///
/// Retrieve results via [`ProfilingTracer::report`].
#[derive(Debug, Default)]
pub struct ProfilingTracer {
    /// Per-hook-kind dispatch counts.
    hook_counts: HashMap<HookKind, u64>,
    total_lookups: u64,
    /// Lookups that found no hook anywhere in the class chain.
    lookup_misses: u64,
    storage_reads: u64,
    storage_writes: u64,
    storage_removes: u64,
    cache_fills: u64,
    max_depth: usize,
    depth_exceeded: u64,
}

/// Summary report from a profiling trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilingReport {
    /// Per-hook-kind dispatch counts, sorted by frequency (highest first).
    pub hook_counts: Vec<(HookKind, u64)>,
    pub total_lookups: u64,
    pub lookup_misses: u64,
    pub storage_reads: u64,
    pub storage_writes: u64,
    pub storage_removes: u64,
    pub cache_fills: u64,
    /// Deepest nested resolution observed.
    pub max_depth: usize,
    pub depth_exceeded: u64,
}

impl ProfilingTracer {
    /// Creates a new profiling tracer with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a report from the collected data.
    ///
    /// Hook counts are sorted by frequency, ties broken by kind name.
    #[must_use]
    pub fn report(&self) -> ProfilingReport {
        let mut hook_counts: Vec<_> = self.hook_counts.iter().map(|(&k, &v)| (k, v)).collect();
        hook_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.to_string().cmp(&b.0.to_string())));
        ProfilingReport {
            hook_counts,
            total_lookups: self.total_lookups,
            lookup_misses: self.lookup_misses,
            storage_reads: self.storage_reads,
            storage_writes: self.storage_writes,
            storage_removes: self.storage_removes,
            cache_fills: self.cache_fills,
            max_depth: self.max_depth,
            depth_exceeded: self.depth_exceeded,
        }
    }
}

impl AttrTracer for ProfilingTracer {
    #[inline]
    fn on_lookup(&mut self, _class: &str, _name: &str, found: Option<HookKind>) {
        self.total_lookups += 1;
        if found.is_none() {
            self.lookup_misses += 1;
        }
    }

    #[inline]
    fn on_hook(&mut self, _op: Operation, _name: &str, kind: HookKind, depth: usize) {
        *self.hook_counts.entry(kind).or_insert(0) += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    fn on_storage(&mut self, op: Operation, _name: &str) {
        match op {
            Operation::Get => self.storage_reads += 1,
            Operation::Set => self.storage_writes += 1,
            Operation::Delete => self.storage_removes += 1,
        }
    }

    fn on_cache_fill(&mut self, _name: &str) {
        self.cache_fills += 1;
    }

    fn on_depth_exceeded(&mut self, _limit: usize) {
        self.depth_exceeded += 1;
    }
}

impl std::fmt::Display for ProfilingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attribute Resolution Report ===")?;
        writeln!(f, "Lookups:         {}", self.total_lookups)?;
        writeln!(f, "Lookup misses:   {}", self.lookup_misses)?;
        writeln!(f, "Storage reads:   {}", self.storage_reads)?;
        writeln!(f, "Storage writes:  {}", self.storage_writes)?;
        writeln!(f, "Storage removes: {}", self.storage_removes)?;
        writeln!(f, "Cache fills:     {}", self.cache_fills)?;
        writeln!(f, "Max depth:       {}", self.max_depth)?;
        writeln!(f, "Depth exceeded:  {}", self.depth_exceeded)?;
        writeln!(f)?;
        writeln!(f, "--- Hook Dispatch ---")?;
        let total: u64 = self.hook_counts.iter().map(|(_, c)| c).sum();
        for (kind, count) in &self.hook_counts {
            let pct = (*count as f64 / total as f64) * 100.0;
            writeln!(f, "  {:<10} {count:>10}  ({pct:>5.1}%)", kind.to_string())?;
        }
        Ok(())
    }
}

// ============================================================================
// RecordingTracer - full event recording
// ============================================================================

/// Tracer that records all events for post-mortem analysis.
///
/// Allocates per event, so use it for debugging or tests rather than hot paths.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    /// All recorded events in chronological order.
    events: Vec<TraceEvent>,
    /// Optional limit on number of events recorded.
    limit: Option<usize>,
}

impl RecordingTracer {
    /// Creates a new recording tracer with no event limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new recording tracer that stops recording after `limit` events.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: Vec::with_capacity(limit.min(1024)),
            limit: Some(limit),
        }
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Discards recorded events, keeping the limit.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn push(&mut self, event: TraceEvent) {
        if self.limit.is_some_and(|l| self.events.len() >= l) {
            return;
        }
        self.events.push(event);
    }
}

impl AttrTracer for RecordingTracer {
    fn on_lookup(&mut self, class: &str, name: &str, found: Option<HookKind>) {
        self.push(TraceEvent::Lookup {
            class: class.to_owned(),
            name: name.to_owned(),
            found,
        });
    }

    fn on_hook(&mut self, op: Operation, name: &str, kind: HookKind, depth: usize) {
        self.push(TraceEvent::Hook {
            op,
            name: name.to_owned(),
            kind,
            depth,
        });
    }

    fn on_storage(&mut self, op: Operation, name: &str) {
        self.push(TraceEvent::Storage {
            op,
            name: name.to_owned(),
        });
    }

    fn on_cache_fill(&mut self, name: &str) {
        self.push(TraceEvent::CacheFill { name: name.to_owned() });
    }

    fn on_depth_exceeded(&mut self, limit: usize) {
        self.push(TraceEvent::DepthExceeded { limit });
    }
}
