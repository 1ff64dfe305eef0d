//! Binding rules: the five resolution strategies a key can be bound to.
//!
//! A [`Rule`] is a tagged variant matched explicitly during resolution. The
//! closures inside each variant were created by a typed binding operation, so
//! they capture the static types involved and produce an erased value that is
//! guaranteed to downcast correctly for the key the rule is bound under.

use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::error::DiError;
use crate::event::DiEvent;
use crate::key::TypeKey;
use crate::registry::Registry;

/// A type-erased resolved value.
///
/// For a concrete key `T` this is `Arc<T>` erased; for a trait-object key
/// `dyn I` it is `Arc<Arc<dyn I>>` erased (the inner `Arc<dyn I>` being the
/// value handed out by [`Registry::resolve_impl`](crate::Registry::resolve_impl)).
pub(crate) type Erased = Arc<dyn Any + Send + Sync>;

/// A deferred construction step capturing the types involved at bind time.
pub(crate) type BuildFn = Box<dyn Fn(&Registry) -> Result<Erased, DiError> + Send + Sync>;

/// A resolution strategy bound to one [`TypeKey`].
pub(crate) enum Rule {
    /// A pre-built value, returned unchanged on every resolve.
    Instance(Erased),

    /// A redirect to another key, used to bind a trait key to a concrete key.
    Alias {
        /// The concrete key resolution is redirected to.
        target: TypeKey,
        /// Re-enters the resolver for the target and coerces the result.
        redirect: BuildFn,
    },

    /// A lazy singleton: built on first resolve, cached in the rule itself.
    Auto {
        /// Constructs the value via the builder.
        build: BuildFn,
        /// Rule-local cache slot, populated logically once.
        cached: Mutex<Option<Erased>>,
    },

    /// A constructor invoked afresh on every resolve. Never caches.
    Factory {
        /// Resolves the callback's parameters and invokes it.
        produce: BuildFn,
    },

    /// Factory semantics with the first result cached in the rule.
    Provider {
        /// Resolves the callback's parameters and invokes it.
        produce: BuildFn,
        /// Rule-local cache slot, populated logically once.
        cached: Mutex<Option<Erased>>,
    },
}

impl Rule {
    /// The variant name used in diagnostics.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Rule::Instance(_) => "instance",
            Rule::Alias { .. } => "alias",
            Rule::Auto { .. } => "auto",
            Rule::Factory { .. } => "factory",
            Rule::Provider { .. } => "provider",
        }
    }

    /// Looks up or materializes the value this rule is bound to produce.
    pub(crate) fn resolve(&self, registry: &Registry, key: TypeKey) -> Result<Erased, DiError> {
        match self {
            Rule::Instance(value) => Ok(value.clone()),
            Rule::Alias { target, redirect } => {
                registry.emit(&DiEvent::AliasRedirect {
                    from: key,
                    to: *target,
                });
                redirect(registry)
            }
            Rule::Factory { produce } => produce(registry),
            Rule::Auto { build: produce, cached }
            | Rule::Provider { produce, cached } => {
                Self::cached_resolve(produce, cached, registry, key)
            }
        }
    }

    /// Check-then-set on the rule-local cache slot.
    ///
    /// The slot lock is held only around slot access, never across the
    /// construction itself, since construction recursively re-enters the
    /// registry. Two threads racing past the first check both build; the
    /// slot keeps whichever value lands first and the loser is discarded.
    fn cached_resolve(
        produce: &BuildFn,
        cached: &Mutex<Option<Erased>>,
        registry: &Registry,
        key: TypeKey,
    ) -> Result<Erased, DiError> {
        {
            let slot = cached.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(value) = slot.as_ref() {
                return Ok(value.clone());
            }
        }

        let fresh = produce(registry)?;

        let mut slot = cached.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(existing) = slot.as_ref() {
            let existing = existing.clone();
            drop(slot);
            registry.emit(&DiEvent::DuplicateConstruction { key });
            return Ok(existing);
        }
        *slot = Some(fresh.clone());
        Ok(fresh)
    }
}
