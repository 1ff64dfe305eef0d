//! # Wirebox
//!
//! A thread-safe dependency injection container for wiring an application's
//! object graph at runtime.
//!
//! A [`Registry`] maps type keys to binding rules. Resolving a key applies
//! its rule: a bound instance is shared as-is, a factory constructs a fresh
//! value per resolve, a provider constructs once and caches, and an alias
//! redirects a trait object key to a concrete type. Concrete types with no
//! rule are built from their [`Injectable`] recipe and cached implicitly, so
//! plain `Default` types resolve with zero ceremony.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebox::{injectable, Registry};
//!
//! #[derive(Default, Clone)]
//! struct Config {
//!     url: String,
//! }
//! injectable!(Config {});
//!
//! #[derive(Default)]
//! struct Service {
//!     config: Option<Arc<Config>>,
//! }
//! injectable!(Service {
//!     config: shared Config,
//! });
//!
//! let registry = Registry::new();
//! registry.bind_instance(Config { url: "db://local".into() });
//!
//! let service = registry.resolve::<Service>().unwrap();
//! assert_eq!(service.config.as_ref().unwrap().url, "db://local");
//! ```
//!
//! ## Features
//!
//! - **Thread-safe**: every registry operation is safe across threads
//! - **Type-safe**: keys are derived from types, never from strings
//! - **Trait wiring**: bind implementations and aliases for `dyn Trait` keys
//! - **Function invocation**: call plain functions with injected parameters
//! - **Diagnostics**: a leveled event sink for observing container activity
//!
//! ## Main Entry Points
//!
//! - [`Registry`] - an isolated container instance
//! - [`default_registry`] and the free functions - the process-wide container
//! - [`Injectable`] / [`Recipe`] - how composite types declare their wiring
//! - [`injectable!`] / [`bind_alias!`] - declarative shorthands

mod api;
mod build;
mod error;
mod event;
mod invoke;
mod key;
#[macro_use]
mod macros;
mod registry;
mod resolve;
mod rule;

pub use api::{
    bind_alias, bind_auto, bind_factory, bind_factory_impl, bind_impl, bind_instance,
    bind_instance_arc, bind_provider, bind_provider_impl, call, clear_log_sink, default_registry,
    has_rule, implementation, instance, invoke, reset, resolve, resolve_impl, set_default_registry,
    set_log_level, set_log_sink,
};
pub use build::{Injectable, Recipe, SKIP_TAG};
pub use error::DiError;
pub use event::{DiEvent, LogLevel, LogSink};
pub use invoke::{Constructor, Impl, Inject, Owned};
pub use key::TypeKey;
pub use registry::Registry;
