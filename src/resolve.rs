//! The resolver: looks up or materializes a value for a requested type.
//!
//! Resolution for a concrete type follows the build-and-cache strategy: a
//! miss does not fail but constructs the value through the builder and
//! installs it as an implicit instance rule. This means a typo in a binding
//! can silently succeed with a default-constructed value; the resolver emits
//! a NOTICE event whenever it happens so the situation stays observable.
//! Trait objects are never implicitly constructed; resolving an unbound
//! trait key is an error.
//!
//! A thread-local guard tracks the keys currently being resolved on this
//! thread; re-entering one fails fast with
//! [`DiError::CyclicDependency`](crate::DiError::CyclicDependency) instead of
//! recursing without bound.

use std::cell::RefCell;
use std::sync::Arc;

use crate::build::Injectable;
use crate::error::DiError;
use crate::event::DiEvent;
use crate::key::TypeKey;
use crate::registry::Registry;
use crate::rule::Rule;

thread_local! {
    /// Keys currently being resolved on this thread, outermost first.
    static IN_FLIGHT: RefCell<Vec<TypeKey>> = const { RefCell::new(Vec::new()) };
}

/// Marks `key` as in flight for the lifetime of the guard.
struct CycleGuard;

impl CycleGuard {
    fn enter(key: TypeKey) -> Result<Self, DiError> {
        IN_FLIGHT.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&key) {
                let mut chain: Vec<&str> = stack.iter().map(TypeKey::name).collect();
                chain.push(key.name());
                return Err(DiError::CyclicDependency {
                    chain: chain.join(" -> "),
                });
            }
            stack.push(key);
            Ok(CycleGuard)
        })
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        IN_FLIGHT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

impl Registry {
    /// Resolves a shared instance of the concrete type `T`.
    ///
    /// If no rule is bound for `T`, a fresh value is constructed through the
    /// builder and installed as an implicit instance rule before being
    /// returned; a build failure propagates and installs nothing. The
    /// check-build-install sequence is deliberately not atomic: two threads
    /// racing on an unbound key may both build, and whichever installation
    /// lands last provides the surviving singleton.
    pub fn resolve<T: Injectable>(&self) -> Result<Arc<T>, DiError> {
        let key = TypeKey::of::<T>();
        self.emit(&DiEvent::Resolving { key });

        let result = self.resolve_guarded::<T>(key);
        if let Err(error) = &result {
            self.emit(&DiEvent::ResolveFailed {
                key,
                message: error.to_string(),
            });
        }
        result
    }

    fn resolve_guarded<T: Injectable>(&self, key: TypeKey) -> Result<Arc<T>, DiError> {
        let _guard = CycleGuard::enter(key)?;

        if !self.has_rule(key) {
            let built = self.build::<T>()?;
            self.set_rule(key, Rule::Instance(built));
            self.emit(&DiEvent::ImplicitBinding { key });
        }

        let rule = self.get_rule(key).ok_or_else(DiError::not_bound::<T>)?;
        let erased = rule.resolve(self, key)?;
        erased
            .downcast::<T>()
            .map_err(|_| DiError::type_mismatch::<T>())
    }

    /// Resolves a shared trait object bound under the trait key `I`.
    ///
    /// Unlike [`resolve`](Registry::resolve), a missing rule is an error:
    /// trait objects have no zero value to build from and are never
    /// implicitly constructed.
    pub fn resolve_impl<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>, DiError> {
        let key = TypeKey::of::<I>();
        self.emit(&DiEvent::Resolving { key });

        let result = self.resolve_impl_guarded::<I>(key);
        if let Err(error) = &result {
            self.emit(&DiEvent::ResolveFailed {
                key,
                message: error.to_string(),
            });
        }
        result
    }

    fn resolve_impl_guarded<I: ?Sized + Send + Sync + 'static>(
        &self,
        key: TypeKey,
    ) -> Result<Arc<I>, DiError> {
        let _guard = CycleGuard::enter(key)?;

        let rule = self.get_rule(key).ok_or_else(DiError::not_bound::<I>)?;
        let erased = rule.resolve(self, key)?;
        let shared = erased
            .downcast::<Arc<I>>()
            .map_err(|_| DiError::type_mismatch::<I>())?;
        Ok(Arc::clone(&*shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::Recipe;

    #[derive(Default)]
    struct Leaf;
    impl Injectable for Leaf {}

    // Two types depending on each other through their recipes.
    #[derive(Default, Debug)]
    struct Ping {
        pong: Option<Arc<Pong>>,
    }
    impl Injectable for Ping {
        fn recipe() -> Recipe<Self> {
            Recipe::new().shared("pong", |ping: &mut Ping, pong| ping.pong = Some(pong))
        }
    }

    #[derive(Default, Debug)]
    struct Pong {
        ping: Option<Arc<Ping>>,
    }
    impl Injectable for Pong {
        fn recipe() -> Recipe<Self> {
            Recipe::new().shared("ping", |pong: &mut Pong, ping| pong.ping = Some(ping))
        }
    }

    #[test]
    fn test_unbound_concrete_type_builds_implicitly() {
        let registry = Registry::new();
        assert!(!registry.has_rule(TypeKey::of::<Leaf>()));

        registry.resolve::<Leaf>().unwrap();
        assert!(registry.has_rule(TypeKey::of::<Leaf>()));
    }

    #[test]
    fn test_implicit_singleton_is_stable() {
        let registry = Registry::new();
        let first = registry.resolve::<Leaf>().unwrap();
        let second = registry.resolve::<Leaf>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unbound_trait_errors() {
        trait Greeter: Send + Sync {}

        let registry = Registry::new();
        let result = registry.resolve_impl::<dyn Greeter>();
        assert!(matches!(result, Err(DiError::NotBound { .. })));
    }

    #[test]
    fn test_cyclic_graph_fails_fast() {
        let registry = Registry::new();
        let error = registry.resolve::<Ping>().unwrap_err();

        fn innermost(error: &DiError) -> &DiError {
            match error {
                DiError::Field { source, .. } | DiError::Argument { source, .. } => {
                    innermost(source)
                }
                other => other,
            }
        }
        match innermost(&error) {
            DiError::CyclicDependency { chain } => {
                assert!(chain.contains("Ping"));
                assert!(chain.contains("Pong"));
            }
            other => panic!("expected cycle error, got {other}"),
        }
    }

    #[test]
    fn test_guard_unwinds_after_failure() {
        let registry = Registry::new();
        assert!(registry.resolve::<Ping>().is_err());

        // The in-flight stack must be empty again; an unrelated type resolves.
        registry.resolve::<Leaf>().unwrap();
    }
}
