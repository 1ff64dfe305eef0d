//! The key→rule store and its binding surface.
//!
//! A [`Registry`] owns a map from [`TypeKey`] to a binding [`Rule`], an
//! optional diagnostic sink and a verbosity mask. All map access goes through
//! a single mutex held only for the duration of one map operation, never
//! across a resolution or build, because builds recursively re-enter the
//! registry for other keys and holding the lock across them would deadlock.
//!
//! # Examples
//!
//! ```
//! use wirebox::{Injectable, Registry};
//!
//! #[derive(Default)]
//! struct Engine {
//!     name: String,
//! }
//! impl Injectable for Engine {}
//!
//! let registry = Registry::new();
//! registry.bind_instance(Engine { name: "V8".into() });
//!
//! let engine = registry.resolve::<Engine>().unwrap();
//! assert_eq!(engine.name, "V8");
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use crate::build::Injectable;
use crate::event::{DiEvent, LogLevel, LogSink};
use crate::key::TypeKey;
use crate::rule::{BuildFn, Erased, Rule};

/// A key→rule mapping with per-operation locking.
///
/// Rebinding a key atomically replaces the prior rule (last write wins, no
/// merging). Rules are removed only by rebinding their key or dropping the
/// whole registry.
pub struct Registry {
    rules: Mutex<HashMap<TypeKey, Arc<Rule>>>,
    sink: Mutex<Option<Arc<LogSink>>>,
    level: AtomicU8,
}

impl Registry {
    /// Creates an empty registry with the default verbosity mask.
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(HashMap::new()),
            sink: Mutex::new(None),
            level: AtomicU8::new(LogLevel::default_mask().bits()),
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Rule map
    // -------------------------------------------------------------------------------------------------

    /// Binds `rule` under `key`, unconditionally replacing any prior rule.
    pub(crate) fn set_rule(&self, key: TypeKey, rule: Rule) {
        self.emit(&DiEvent::RuleSet {
            key,
            kind: rule.kind(),
        });

        self.rules
            .lock()
            // Poisoning only occurs if a thread panicked while holding the
            // lock; the insert is still safe to perform on recovered state.
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, Arc::new(rule));
    }

    /// Whether any rule is bound under `key`.
    pub fn has_rule(&self, key: TypeKey) -> bool {
        self.rules
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&key)
    }

    /// The rule bound under `key`, if any.
    pub(crate) fn get_rule(&self, key: TypeKey) -> Option<Arc<Rule>> {
        self.rules
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned()
    }

    // -------------------------------------------------------------------------------------------------
    // Binding surface
    // -------------------------------------------------------------------------------------------------

    /// Binds a pre-built value under its own type key.
    ///
    /// Resolving `T` afterwards returns the exact same shared instance every
    /// time.
    pub fn bind_instance<T: Send + Sync + 'static>(&self, value: T) {
        self.bind_instance_arc(Arc::new(value));
    }

    /// Binds an already shared value under its own type key.
    ///
    /// Avoids an extra allocation when the caller already holds an `Arc`.
    pub fn bind_instance_arc<T: Send + Sync + 'static>(&self, value: Arc<T>) {
        self.set_rule(TypeKey::of::<T>(), Rule::Instance(value));
    }

    /// Binds a trait key directly to an instance implementing it.
    ///
    /// The unsizing coercion at the call site is the interface check: code
    /// that passes a value not implementing `I` does not compile.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use wirebox::Registry;
    ///
    /// trait Greeter: Send + Sync {
    ///     fn hello(&self) -> String;
    /// }
    ///
    /// struct English;
    /// impl Greeter for English {
    ///     fn hello(&self) -> String {
    ///         "hello".into()
    ///     }
    /// }
    ///
    /// let registry = Registry::new();
    /// registry.bind_impl::<dyn Greeter>(Arc::new(English));
    /// assert_eq!(registry.resolve_impl::<dyn Greeter>().unwrap().hello(), "hello");
    /// ```
    pub fn bind_impl<I: ?Sized + Send + Sync + 'static>(&self, instance: Arc<I>) {
        self.set_rule(
            TypeKey::of::<I>(),
            Rule::Instance(Arc::new(instance) as Erased),
        );
    }

    /// Binds the trait key `I` to the concrete key `C`.
    ///
    /// `coerce` is the unsizing step from `Arc<C>` to `Arc<I>`; the
    /// [`bind_alias!`](crate::bind_alias) macro supplies it so the call reads
    /// `bind_alias!(registry, dyn Greeter => English)`. If no rule is bound
    /// for `C` yet, a lazy-singleton auto rule is installed for it, so the
    /// alias and direct resolutions of `C` share one instance.
    pub fn bind_alias<I, C>(&self, coerce: fn(Arc<C>) -> Arc<I>)
    where
        I: ?Sized + Send + Sync + 'static,
        C: Injectable,
    {
        let target = TypeKey::of::<C>();
        if !self.has_rule(target) {
            self.bind_auto::<C>();
        }

        let redirect: BuildFn = Box::new(move |registry| {
            let concrete = registry.resolve::<C>()?;
            Ok(Arc::new(coerce(concrete)) as Erased)
        });
        self.set_rule(TypeKey::of::<I>(), Rule::Alias { target, redirect });
    }

    /// Binds a lazy singleton: built by the builder on first resolve, cached
    /// in the rule afterwards.
    pub fn bind_auto<T: Injectable>(&self) {
        let build: BuildFn = Box::new(|registry| Ok(registry.build::<T>()? as Erased));
        self.set_rule(
            TypeKey::of::<T>(),
            Rule::Auto {
                build,
                cached: Mutex::new(None),
            },
        );
    }

    // -------------------------------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------------------------------

    /// Installs a diagnostic sink receiving every event the verbosity mask
    /// lets through.
    pub fn set_log_sink(&self, sink: impl Fn(&DiEvent) + Send + Sync + 'static) {
        let mut guard = self.sink.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(sink));
    }

    /// Removes the diagnostic sink.
    pub fn clear_log_sink(&self) {
        let mut guard = self.sink.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Replaces the verbosity mask.
    pub fn set_log_level(&self, level: LogLevel) {
        self.level.store(level.bits(), Ordering::Relaxed);
    }

    /// Emits `event` to the sink if its severity passes the mask.
    ///
    /// The sink lock is released before the callback runs, so a sink may
    /// itself resolve from this registry.
    pub(crate) fn emit(&self, event: &DiEvent) {
        let mask = LogLevel::from_bits_truncate(self.level.load(Ordering::Relaxed));
        if !mask.intersects(event.level()) {
            return;
        }

        let sink = {
            let guard = self.sink.lock().unwrap_or_else(|p| p.into_inner());
            guard.clone()
        };
        if let Some(sink) = sink {
            sink(event);
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rules = self.rules.lock().unwrap_or_else(|p| p.into_inner());
        f.debug_struct("Registry")
            .field("rule_count", &rules.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Clone, PartialEq, Debug)]
    struct Engine {
        name: String,
    }
    impl Injectable for Engine {}

    #[test]
    fn test_rebinding_replaces_rule() {
        let registry = Registry::new();
        registry.bind_instance(Engine { name: "V6".into() });
        registry.bind_instance(Engine { name: "V8".into() });

        let engine = registry.resolve::<Engine>().unwrap();
        assert_eq!(engine.name, "V8");
    }

    #[test]
    fn test_has_rule() {
        let registry = Registry::new();
        assert!(!registry.has_rule(TypeKey::of::<Engine>()));
        registry.bind_instance(Engine::default());
        assert!(registry.has_rule(TypeKey::of::<Engine>()));
    }

    #[test]
    fn test_bind_instance_arc_shares_allocation() {
        let registry = Registry::new();
        let engine = Arc::new(Engine { name: "V8".into() });
        registry.bind_instance_arc(engine.clone());

        let resolved = registry.resolve::<Engine>().unwrap();
        assert!(Arc::ptr_eq(&engine, &resolved));
    }

    #[test]
    fn test_sink_respects_level_mask() {
        use std::sync::Mutex as StdMutex;

        let registry = Registry::new();
        let events = Arc::new(StdMutex::new(Vec::new()));
        let captured = events.clone();
        registry.set_log_sink(move |event| {
            captured.lock().unwrap().push(event.to_string());
        });

        // RuleSet is TRACE; the default mask filters it out.
        registry.bind_instance(Engine::default());
        assert!(events.lock().unwrap().is_empty());

        registry.set_log_level(LogLevel::ALL);
        registry.bind_instance(Engine::default());
        let recorded = events.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].contains("instance"));
    }

    #[test]
    fn test_clear_log_sink_stops_events() {
        use std::sync::Mutex as StdMutex;

        let registry = Registry::new();
        registry.set_log_level(LogLevel::ALL);

        let events = Arc::new(StdMutex::new(Vec::new()));
        let captured = events.clone();
        registry.set_log_sink(move |event| {
            captured.lock().unwrap().push(event.to_string());
        });

        registry.bind_instance(1u8);
        assert_eq!(events.lock().unwrap().len(), 1);

        registry.clear_log_sink();
        registry.bind_instance(2u8);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_debug_format() {
        let registry = Registry::new();
        registry.bind_instance(Engine::default());
        let rendered = format!("{:?}", registry);
        assert!(rendered.contains("Registry"));
        assert!(rendered.contains("rule_count: 1"));
    }
}
