//! The process-wide default registry and the free-function surface over it.
//!
//! Most programs want exactly one registry. This module holds it in a lazy
//! static and mirrors every [`Registry`] operation as a free function, so
//! call sites do not have to thread a handle around:
//!
//! ```
//! use wirebox::Injectable;
//!
//! #[derive(Default, Clone)]
//! struct Config {
//!     port: u16,
//! }
//! impl Injectable for Config {}
//!
//! wirebox::reset();
//! wirebox::bind_instance(Config { port: 8080 });
//! assert_eq!(wirebox::resolve::<Config>().unwrap().port, 8080);
//! ```
//!
//! The free functions snapshot the current default on entry, so a concurrent
//! [`set_default_registry`] never swaps a registry out from under an
//! operation already in flight.

use std::sync::{Arc, LazyLock, Mutex};

use crate::build::Injectable;
use crate::error::DiError;
use crate::event::{DiEvent, LogLevel};
use crate::invoke::Constructor;
use crate::key::TypeKey;
use crate::registry::Registry;

static DEFAULT: LazyLock<Mutex<Arc<Registry>>> =
    LazyLock::new(|| Mutex::new(Arc::new(Registry::new())));

/// Returns a handle to the current default registry.
pub fn default_registry() -> Arc<Registry> {
    let guard = DEFAULT.lock().unwrap_or_else(|p| p.into_inner());
    Arc::clone(&guard)
}

/// Replaces the default registry. Handles obtained earlier keep pointing at
/// the registry they snapshotted.
pub fn set_default_registry(registry: Arc<Registry>) {
    let mut guard = DEFAULT.lock().unwrap_or_else(|p| p.into_inner());
    *guard = registry;
}

/// Swaps the default registry for a fresh empty one. Intended for tests.
pub fn reset() {
    set_default_registry(Arc::new(Registry::new()));
}

// ----------------------------------------------------------------------------
// Binding
// ----------------------------------------------------------------------------

/// See [`Registry::bind_instance`].
pub fn bind_instance<T: Send + Sync + 'static>(value: T) {
    default_registry().bind_instance(value);
}

/// See [`Registry::bind_instance_arc`].
pub fn bind_instance_arc<T: Send + Sync + 'static>(value: Arc<T>) {
    default_registry().bind_instance_arc(value);
}

/// See [`Registry::bind_impl`].
pub fn bind_impl<I: ?Sized + Send + Sync + 'static>(instance: Arc<I>) {
    default_registry().bind_impl::<I>(instance);
}

/// See [`Registry::bind_alias`].
pub fn bind_alias<I, C>(coerce: fn(Arc<C>) -> Arc<I>)
where
    I: ?Sized + Send + Sync + 'static,
    C: Injectable,
{
    default_registry().bind_alias::<I, C>(coerce);
}

/// See [`Registry::bind_auto`].
pub fn bind_auto<T: Injectable>() {
    default_registry().bind_auto::<T>();
}

/// See [`Registry::bind_factory`].
pub fn bind_factory<Args, F: Constructor<Args>>(f: F) {
    default_registry().bind_factory(f);
}

/// See [`Registry::bind_factory_impl`].
pub fn bind_factory_impl<I, Args, F>(f: F)
where
    I: ?Sized + Send + Sync + 'static,
    F: Constructor<Args, Constructed = Arc<I>>,
{
    default_registry().bind_factory_impl::<I, Args, F>(f);
}

/// See [`Registry::bind_provider`].
pub fn bind_provider<Args, F: Constructor<Args>>(f: F) {
    default_registry().bind_provider(f);
}

/// See [`Registry::bind_provider_impl`].
pub fn bind_provider_impl<I, Args, F>(f: F)
where
    I: ?Sized + Send + Sync + 'static,
    F: Constructor<Args, Constructed = Arc<I>>,
{
    default_registry().bind_provider_impl::<I, Args, F>(f);
}

/// See [`Registry::has_rule`].
pub fn has_rule(key: TypeKey) -> bool {
    default_registry().has_rule(key)
}

// ----------------------------------------------------------------------------
// Resolution
// ----------------------------------------------------------------------------

/// See [`Registry::resolve`].
pub fn resolve<T: Injectable>() -> Result<Arc<T>, DiError> {
    default_registry().resolve::<T>()
}

/// See [`Registry::resolve_impl`].
pub fn resolve_impl<I: ?Sized + Send + Sync + 'static>() -> Result<Arc<I>, DiError> {
    default_registry().resolve_impl::<I>()
}

/// See [`Registry::call`].
pub fn call<Args, F: Constructor<Args>>(f: F) -> Result<F::Constructed, DiError> {
    default_registry().call(f)
}

/// Resolves `T` from the default registry, panicking on failure.
///
/// Convenient at composition roots where a missing binding is a programming
/// error; prefer [`resolve`] anywhere the failure should be handled.
pub fn instance<T: Injectable>() -> Arc<T> {
    match resolve::<T>() {
        Ok(value) => value,
        Err(e) => panic!("wirebox: {e}"),
    }
}

/// Resolves the trait object `I` from the default registry, panicking on
/// failure.
pub fn implementation<I: ?Sized + Send + Sync + 'static>() -> Arc<I> {
    match resolve_impl::<I>() {
        Ok(value) => value,
        Err(e) => panic!("wirebox: {e}"),
    }
}

/// Calls `f` with injected parameters, discarding its result and panicking
/// on failure.
pub fn invoke<Args, F: Constructor<Args>>(f: F) {
    if let Err(e) = call(f) {
        panic!("wirebox: {e}");
    }
}

// ----------------------------------------------------------------------------
// Diagnostics
// ----------------------------------------------------------------------------

/// See [`Registry::set_log_sink`].
pub fn set_log_sink(sink: impl Fn(&DiEvent) + Send + Sync + 'static) {
    default_registry().set_log_sink(sink);
}

/// See [`Registry::clear_log_sink`].
pub fn clear_log_sink() {
    default_registry().clear_log_sink();
}

/// See [`Registry::set_log_level`].
pub fn set_log_level(level: LogLevel) {
    default_registry().set_log_level(level);
}
