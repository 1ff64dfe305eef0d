//! The invoker: calls plain functions with their parameters resolved from a
//! registry.
//!
//! A constructor is any `Fn(..) -> Result<Out, DiError>` of up to eight
//! parameters where every parameter type states how it wants to be injected:
//!
//! * `Arc<T>` - a shared handle to an injectable type,
//! * [`Owned<T>`] - an independent dereferenced copy,
//! * [`Impl<I>`] - a shared trait object handle.
//!
//! Parameters resolve left to right; the first failure aborts before the
//! function body ever runs.
//!
//! ```
//! use std::sync::Arc;
//! use wirebox::{DiError, Injectable, Registry};
//!
//! #[derive(Default, Clone)]
//! struct Config {
//!     url: String,
//! }
//! impl Injectable for Config {}
//!
//! struct Client {
//!     url: String,
//! }
//!
//! let registry = Registry::new();
//! registry.bind_instance(Config { url: "db://local".into() });
//!
//! let client = registry
//!     .call(|config: Arc<Config>| -> Result<Client, DiError> {
//!         Ok(Client { url: config.url.clone() })
//!     })
//!     .unwrap();
//! assert_eq!(client.url, "db://local");
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use crate::build::Injectable;
use crate::error::DiError;
use crate::key::TypeKey;
use crate::registry::Registry;
use crate::rule::{Erased, Rule};

/// A constructor parameter that knows how to resolve itself.
pub trait Inject: Sized {
    fn inject(registry: &Registry) -> Result<Self, DiError>;
}

impl<T: Injectable> Inject for Arc<T> {
    fn inject(registry: &Registry) -> Result<Self, DiError> {
        registry.resolve::<T>()
    }
}

/// Marks a constructor parameter as an owned copy rather than a shared
/// handle. The resolved value is dereferenced and cloned.
pub struct Owned<T>(pub T);

impl<T> Owned<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Owned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Owned<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: Injectable + Clone> Inject for Owned<T> {
    fn inject(registry: &Registry) -> Result<Self, DiError> {
        let resolved = registry.resolve::<T>()?;
        Ok(Owned((*resolved).clone()))
    }
}

/// Marks a constructor parameter as a trait object handle.
pub struct Impl<I: ?Sized>(pub Arc<I>);

impl<I: ?Sized> Impl<I> {
    pub fn into_inner(self) -> Arc<I> {
        self.0
    }
}

impl<I: ?Sized> Deref for Impl<I> {
    type Target = I;

    fn deref(&self) -> &I {
        &self.0
    }
}

impl<I: ?Sized> Clone for Impl<I> {
    fn clone(&self) -> Self {
        Impl(Arc::clone(&self.0))
    }
}

impl<I: ?Sized + Send + Sync + 'static> Inject for Impl<I> {
    fn inject(registry: &Registry) -> Result<Self, DiError> {
        Ok(Impl(registry.resolve_impl::<I>()?))
    }
}

/// A function the invoker can call with injected parameters.
///
/// Implemented for `Fn` closures and function pointers of up to eight
/// parameters, each implementing [`Inject`].
pub trait Constructor<Args>: Send + Sync + 'static {
    type Constructed: Send + Sync + 'static;

    fn construct(&self, registry: &Registry) -> Result<Self::Constructed, DiError>;
}

fn next_arg<P: Inject>(registry: &Registry, index: &mut usize) -> Result<P, DiError> {
    let position = *index;
    *index += 1;
    P::inject(registry).map_err(|e| DiError::argument::<P>(position, e))
}

macro_rules! impl_constructor {
    ($($param:ident),*) => {
        impl<Out, F, $($param,)*> Constructor<($($param,)*)> for F
        where
            F: Fn($($param),*) -> Result<Out, DiError> + Send + Sync + 'static,
            Out: Send + Sync + 'static,
            $($param: Inject,)*
        {
            type Constructed = Out;

            #[allow(unused_variables, unused_mut)]
            fn construct(&self, registry: &Registry) -> Result<Out, DiError> {
                let mut index = 0usize;
                $(let $param = next_arg::<$param>(registry, &mut index)?;)*
                (self)($($param),*)
            }
        }
    };
}

impl_constructor!();
impl_constructor!(P1);
impl_constructor!(P1, P2);
impl_constructor!(P1, P2, P3);
impl_constructor!(P1, P2, P3, P4);
impl_constructor!(P1, P2, P3, P4, P5);
impl_constructor!(P1, P2, P3, P4, P5, P6);
impl_constructor!(P1, P2, P3, P4, P5, P6, P7);
impl_constructor!(P1, P2, P3, P4, P5, P6, P7, P8);

impl Registry {
    /// Calls `f` with its parameters resolved from this registry and returns
    /// whatever the function returned.
    pub fn call<Args, F>(&self, f: F) -> Result<F::Constructed, DiError>
    where
        F: Constructor<Args>,
    {
        f.construct(self)
    }

    /// Binds `f` as the factory for its constructed type: every resolve of
    /// that type calls `f` again and yields a fresh value.
    pub fn bind_factory<Args, F>(&self, f: F)
    where
        F: Constructor<Args>,
    {
        let key = TypeKey::of::<F::Constructed>();
        self.set_rule(
            key,
            Rule::Factory {
                produce: Box::new(move |registry| {
                    Ok(Arc::new(f.construct(registry)?) as Erased)
                }),
            },
        );
    }

    /// Binds `f` as the factory for the trait object `I`. The function must
    /// construct an `Arc<I>`.
    pub fn bind_factory_impl<I, Args, F>(&self, f: F)
    where
        I: ?Sized + Send + Sync + 'static,
        F: Constructor<Args, Constructed = Arc<I>>,
    {
        let key = TypeKey::of::<I>();
        self.set_rule(
            key,
            Rule::Factory {
                produce: Box::new(move |registry| {
                    Ok(Arc::new(f.construct(registry)?) as Erased)
                }),
            },
        );
    }

    /// Binds `f` as the provider for its constructed type: `f` runs at most
    /// once, on the first resolve, and the result is cached as the
    /// singleton from then on.
    pub fn bind_provider<Args, F>(&self, f: F)
    where
        F: Constructor<Args>,
    {
        let key = TypeKey::of::<F::Constructed>();
        self.set_rule(
            key,
            Rule::Provider {
                produce: Box::new(move |registry| {
                    Ok(Arc::new(f.construct(registry)?) as Erased)
                }),
                cached: Mutex::new(None),
            },
        );
    }

    /// Binds `f` as the provider for the trait object `I`.
    pub fn bind_provider_impl<I, Args, F>(&self, f: F)
    where
        I: ?Sized + Send + Sync + 'static,
        F: Constructor<Args, Constructed = Arc<I>>,
    {
        let key = TypeKey::of::<I>();
        self.set_rule(
            key,
            Rule::Provider {
                produce: Box::new(move |registry| {
                    Ok(Arc::new(f.construct(registry)?) as Erased)
                }),
                cached: Mutex::new(None),
            },
        );
    }
}
