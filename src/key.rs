//! Canonical type identity used as the registry's map key.
//!
//! A [`TypeKey`] pairs the `TypeId` of a type with its name. Equality and
//! hashing use only the `TypeId`; the name is carried as a stable,
//! human-readable label for diagnostics and error messages.
//!
//! Every binding and resolution operation in this crate is generic over the
//! *pointee* type: a value bound behind `Arc<T>` is keyed by `T`, never by
//! `Arc<T>`. Pointer indirection therefore never leaks into a key, so the
//! identity of `T` and of a shared handle to `T` always collapse to the same
//! key. Trait objects (`dyn Trait`) keep their own identity.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable identifier for a type, usable as a map key and a diagnostic label.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Computes the key of `T`.
    ///
    /// `T` may be unsized, so trait objects get keys of their own:
    ///
    /// ```
    /// use wirebox::TypeKey;
    ///
    /// trait Greeter: Send + Sync {}
    ///
    /// let concrete = TypeKey::of::<String>();
    /// let interface = TypeKey::of::<dyn Greeter>();
    /// assert_ne!(concrete, interface);
    /// ```
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The type name this key was computed from, e.g. `alloc::string::String`.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    trait Marker: Send + Sync {}

    #[derive(Default)]
    struct Widget;

    #[test]
    fn test_same_type_same_key() {
        assert_eq!(TypeKey::of::<Widget>(), TypeKey::of::<Widget>());
    }

    #[test]
    fn test_distinct_types_distinct_keys() {
        assert_ne!(TypeKey::of::<Widget>(), TypeKey::of::<String>());
        assert_ne!(TypeKey::of::<Widget>(), TypeKey::of::<dyn Marker>());
    }

    #[test]
    fn test_shared_handle_has_its_own_type() {
        // `Arc<T>` is a different type than `T`; the crate never keys on it.
        assert_ne!(TypeKey::of::<Arc<Widget>>(), TypeKey::of::<Widget>());
    }

    #[test]
    fn test_display_is_type_name() {
        let key = TypeKey::of::<String>();
        assert_eq!(key.to_string(), "alloc::string::String");
        assert_eq!(key.name(), "alloc::string::String");
    }

    #[test]
    fn test_debug_format() {
        let key = TypeKey::of::<u8>();
        assert_eq!(format!("{:?}", key), "TypeKey(u8)");
    }
}
