//! The builder: constructs a composite value and injects its declared slots.
//!
//! Runtime field reflection has no Rust counterpart, so a buildable type
//! declares a construction plan instead: a [`Recipe`] listing each slot to
//! inject, the key it resolves from and whether the slot shares the resolved
//! handle or owns a dereferenced copy. The recipe lives next to the type, so
//! only slots its author chose to wire are ever touched; everything else is
//! left at its [`Default`] zero value.
//!
//! ```
//! use std::sync::Arc;
//! use wirebox::{Injectable, Recipe, Registry};
//!
//! #[derive(Default, Clone)]
//! struct Engine {
//!     name: String,
//! }
//! impl Injectable for Engine {}
//!
//! #[derive(Default)]
//! struct Car {
//!     engine: Option<Arc<Engine>>,
//!     spare: Engine,
//! }
//!
//! impl Injectable for Car {
//!     fn recipe() -> Recipe<Self> {
//!         Recipe::new()
//!             .shared("engine", |car: &mut Car, engine| car.engine = Some(engine))
//!             .owned("spare", |car: &mut Car, engine| car.spare = engine)
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry.bind_instance(Engine { name: "V8".into() });
//!
//! let car = registry.resolve::<Car>().unwrap();
//! assert_eq!(car.engine.as_ref().unwrap().name, "V8");
//! assert_eq!(car.spare.name, "V8");
//! ```

use std::any::type_name;
use std::sync::Arc;

use crate::error::DiError;
use crate::event::DiEvent;
use crate::key::TypeKey;
use crate::registry::Registry;

/// The slot tag that suppresses injection.
pub const SKIP_TAG: &str = "@none";

/// A type the builder can construct.
///
/// `Default` provides the zero value the builder starts from. The default
/// [`recipe`](Injectable::recipe) is empty, which makes any `Default` type a
/// terminal leaf, handy for scalar and opaque types:
///
/// ```
/// use wirebox::Injectable;
///
/// #[derive(Default)]
/// struct Flags(u32);
/// impl Injectable for Flags {}
/// ```
pub trait Injectable: Default + Send + Sync + Sized + 'static {
    /// The construction plan for this type. Empty by default.
    fn recipe() -> Recipe<Self> {
        Recipe::new()
    }

    /// Post-construction hook, invoked exactly once after every recipe slot
    /// has been applied and before the value is shared. Default: no-op.
    fn initialize(&mut self) {}
}

type Apply<T> = Box<dyn Fn(&mut T, &Registry) -> Result<(), DiError> + Send + Sync>;

struct Slot<T> {
    name: &'static str,
    tag: &'static str,
    apply: Option<Apply<T>>,
}

/// An ordered construction plan: one entry per injected slot.
pub struct Recipe<T> {
    slots: Vec<Slot<T>>,
}

impl<T: Injectable> Recipe<T> {
    /// An empty plan.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// A slot holding a shared handle to `D`.
    ///
    /// The resolved `Arc` is assigned as-is, so the slot aliases whatever
    /// singleton or instance the rule produced; mutations visible through
    /// one holder are visible through all.
    pub fn shared<D, F>(mut self, name: &'static str, assign: F) -> Self
    where
        D: Injectable,
        F: Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    {
        self.slots.push(Slot {
            name,
            tag: "",
            apply: Some(Box::new(move |value, registry| {
                assign(value, registry.resolve::<D>()?);
                Ok(())
            })),
        });
        self
    }

    /// A slot owning an independent copy of `D`.
    ///
    /// The resolved handle is dereferenced and cloned; the slot owns the
    /// copy from that point on.
    pub fn owned<D, F>(mut self, name: &'static str, assign: F) -> Self
    where
        D: Injectable + Clone,
        F: Fn(&mut T, D) + Send + Sync + 'static,
    {
        self.slots.push(Slot {
            name,
            tag: "",
            apply: Some(Box::new(move |value, registry| {
                let resolved = registry.resolve::<D>()?;
                assign(value, (*resolved).clone());
                Ok(())
            })),
        });
        self
    }

    /// A slot holding a shared trait object.
    ///
    /// If no rule is bound for the trait key the slot is skipped silently
    /// and stays at its zero value; trait objects are never implicitly
    /// constructed.
    pub fn implemented<D, F>(mut self, name: &'static str, assign: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<D>) + Send + Sync + 'static,
    {
        self.slots.push(Slot {
            name,
            tag: "",
            apply: Some(Box::new(move |value, registry| {
                if !registry.has_rule(TypeKey::of::<D>()) {
                    registry.emit(&DiEvent::InterfaceUnbound {
                        type_name: type_name::<T>(),
                        field: name,
                    });
                    return Ok(());
                }
                assign(value, registry.resolve_impl::<D>()?);
                Ok(())
            })),
        });
        self
    }

    /// A slot explicitly opted out of injection with the [`SKIP_TAG`] marker.
    pub fn skipped(self, name: &'static str) -> Self {
        self.annotated(name, SKIP_TAG)
    }

    /// A slot carrying a raw annotation value.
    ///
    /// The tag is validated when the type is built: the empty string means
    /// inject (a no-op for a slot declared this way), [`SKIP_TAG`] skips the
    /// slot, and any other value fails the whole build.
    pub fn annotated(mut self, name: &'static str, tag: &'static str) -> Self {
        self.slots.push(Slot {
            name,
            tag,
            apply: None,
        });
        self
    }
}

impl<T: Injectable> Default for Recipe<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Constructs a fresh `T` and injects its recipe slots in declaration
    /// order.
    ///
    /// Any slot failure aborts the whole build: the partially filled value
    /// is dropped and only the error escapes; a half-initialized value is
    /// never observable. After the last slot, the post-construction hook
    /// runs exactly once.
    pub fn build<T: Injectable>(&self) -> Result<Arc<T>, DiError> {
        let key = TypeKey::of::<T>();
        self.emit(&DiEvent::Building { key });

        let mut value = T::default();

        for slot in T::recipe().slots {
            match slot.tag {
                "" => {}
                SKIP_TAG => {
                    self.emit(&DiEvent::FieldSkipped {
                        type_name: type_name::<T>(),
                        field: slot.name,
                    });
                    continue;
                }
                tag => {
                    return Err(DiError::InvalidFieldTag {
                        type_name: type_name::<T>(),
                        field: slot.name,
                        tag,
                    });
                }
            }

            if let Some(apply) = &slot.apply {
                apply(&mut value, self).map_err(|e| DiError::field::<T>(slot.name, e))?;
            }
        }

        value.initialize();
        Ok(Arc::new(value))
    }
}
