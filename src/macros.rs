//! Declarative shorthands for wiring types without writing recipes and
//! coercions by hand.

/// Declares the construction plan for a type in one block.
///
/// Expands to an [`Injectable`](crate::Injectable) impl whose recipe covers
/// the listed fields; anything not listed keeps its `Default` zero value.
/// Four slot kinds are supported:
///
/// * `shared Dep` - the field is `Option<Arc<Dep>>` and receives a shared
///   handle,
/// * `owned Dep` - the field is `Dep` and receives a dereferenced clone,
/// * `implemented dyn Trait` - the field is `Option<Arc<dyn Trait>>` and is
///   left `None` when no implementation is bound,
/// * `skip` - the field is explicitly opted out of injection.
///
/// ```
/// use std::sync::Arc;
/// use wirebox::{injectable, Registry};
///
/// #[derive(Default, Clone)]
/// struct Engine {
///     cylinders: u8,
/// }
/// injectable!(Engine {});
///
/// #[derive(Default)]
/// struct Car {
///     engine: Option<Arc<Engine>>,
///     spare: Engine,
///     vin: String,
/// }
/// injectable!(Car {
///     engine: shared Engine,
///     spare: owned Engine,
///     vin: skip,
/// });
///
/// let registry = Registry::new();
/// registry.bind_instance(Engine { cylinders: 8 });
///
/// let car = registry.resolve::<Car>().unwrap();
/// assert_eq!(car.engine.as_ref().unwrap().cylinders, 8);
/// assert_eq!(car.spare.cylinders, 8);
/// assert_eq!(car.vin, "");
/// ```
///
/// Types needing a post-construction hook implement
/// [`Injectable`](crate::Injectable) by hand instead.
#[macro_export]
macro_rules! injectable {
    // Recipe chain accumulator, one arm per slot kind.
    (@chain $acc:expr, $ty:ty,) => { $acc };
    (@chain $acc:expr, $ty:ty, $field:ident: shared $dep:ty $(, $($rest:tt)*)?) => {
        $crate::injectable!(@chain
            $acc.shared(stringify!($field), |v: &mut $ty, d: ::std::sync::Arc<$dep>| {
                v.$field = Some(d);
            }),
            $ty, $($($rest)*)?)
    };
    (@chain $acc:expr, $ty:ty, $field:ident: owned $dep:ty $(, $($rest:tt)*)?) => {
        $crate::injectable!(@chain
            $acc.owned(stringify!($field), |v: &mut $ty, d: $dep| {
                v.$field = d;
            }),
            $ty, $($($rest)*)?)
    };
    (@chain $acc:expr, $ty:ty, $field:ident: implemented $dep:ty $(, $($rest:tt)*)?) => {
        $crate::injectable!(@chain
            $acc.implemented(stringify!($field), |v: &mut $ty, d: ::std::sync::Arc<$dep>| {
                v.$field = Some(d);
            }),
            $ty, $($($rest)*)?)
    };
    (@chain $acc:expr, $ty:ty, $field:ident: skip $(, $($rest:tt)*)?) => {
        $crate::injectable!(@chain
            $acc.skipped(stringify!($field)),
            $ty, $($($rest)*)?)
    };

    ($ty:ty { $($body:tt)* }) => {
        impl $crate::Injectable for $ty {
            fn recipe() -> $crate::Recipe<Self> {
                $crate::injectable!(@chain $crate::Recipe::new(), $ty, $($body)*)
            }
        }
    };
}

/// Redirects a trait object key to a concrete type.
///
/// Expands to a [`bind_alias`](crate::Registry::bind_alias) call with the
/// unsizing coercion written out, so `Concrete: Trait` is checked at compile
/// time. With a registry expression the alias lands there; without one it
/// lands on the process-wide default registry.
///
/// ```
/// use wirebox::{bind_alias, injectable, Registry};
///
/// trait Logger: Send + Sync {
///     fn tag(&self) -> &'static str;
/// }
///
/// #[derive(Default)]
/// struct ConsoleLogger;
/// injectable!(ConsoleLogger {});
/// impl Logger for ConsoleLogger {
///     fn tag(&self) -> &'static str {
///         "console"
///     }
/// }
///
/// let registry = Registry::new();
/// bind_alias!(registry, dyn Logger => ConsoleLogger);
///
/// let logger = registry.resolve_impl::<dyn Logger>().unwrap();
/// assert_eq!(logger.tag(), "console");
/// ```
#[macro_export]
macro_rules! bind_alias {
    ($iface:ty => $concrete:ty) => {{
        fn __coerce(
            concrete: ::std::sync::Arc<$concrete>,
        ) -> ::std::sync::Arc<$iface> {
            concrete
        }
        $crate::bind_alias::<$iface, $concrete>(__coerce)
    }};
    ($registry:expr, $iface:ty => $concrete:ty) => {{
        fn __coerce(
            concrete: ::std::sync::Arc<$concrete>,
        ) -> ::std::sync::Arc<$iface> {
            concrete
        }
        $registry.bind_alias::<$iface, $concrete>(__coerce)
    }};
}

#[cfg(test)]
mod tests {
    use crate::registry::Registry;
    use std::sync::Arc;

    #[derive(Default, Clone)]
    struct Wheel {
        spokes: u8,
    }
    injectable!(Wheel {});

    #[derive(Default)]
    struct Bicycle {
        front: Option<Arc<Wheel>>,
        rear: Wheel,
        frame_id: String,
    }
    injectable!(Bicycle {
        front: shared Wheel,
        rear: owned Wheel,
        frame_id: skip,
    });

    trait Bell: Send + Sync {
        fn ring(&self) -> &'static str;
    }

    #[derive(Default)]
    struct BrassBell;
    injectable!(BrassBell {});
    impl Bell for BrassBell {
        fn ring(&self) -> &'static str {
            "ding"
        }
    }

    #[derive(Default)]
    struct Handlebar {
        bell: Option<Arc<dyn Bell>>,
    }
    injectable!(Handlebar {
        bell: implemented dyn Bell,
    });

    #[test]
    fn test_injectable_macro_wires_listed_fields() {
        let registry = Registry::new();
        registry.bind_instance(Wheel { spokes: 36 });

        let bike = registry.resolve::<Bicycle>().unwrap();
        assert_eq!(bike.front.as_ref().unwrap().spokes, 36);
        assert_eq!(bike.rear.spokes, 36);
        assert_eq!(bike.frame_id, "");
    }

    #[test]
    fn test_bind_alias_macro_redirects_trait_key() {
        let registry = Registry::new();
        bind_alias!(registry, dyn Bell => BrassBell);

        let bell = registry.resolve_impl::<dyn Bell>().unwrap();
        assert_eq!(bell.ring(), "ding");
    }

    #[test]
    fn test_implemented_slot_through_alias() {
        let registry = Registry::new();
        bind_alias!(registry, dyn Bell => BrassBell);

        let handlebar = registry.resolve::<Handlebar>().unwrap();
        assert_eq!(handlebar.bell.as_ref().unwrap().ring(), "ding");
    }
}
