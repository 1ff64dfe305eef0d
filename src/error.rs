//! Resolution error type.
//!
//! Configuration mistakes the original runtime-reflection design could only
//! catch while binding (a non-function constructor, a wrong return shape, a
//! concrete type that does not implement the aliased trait) are compile
//! errors in this crate and never reach this enum. What remains are the
//! runtime resolution failures: a missing rule, a failed nested field or
//! argument, a tag validation error, a cyclic graph, or a constructor body
//! reporting a domain error.

use std::any::type_name;

use thiserror::Error;

/// Error returned by every fallible resolution entry point.
///
/// The panicking convenience wrappers ([`instance`](crate::instance),
/// [`implementation`](crate::implementation), [`invoke`](crate::invoke))
/// convert these into a fatal stop for call sites that assume success.
#[derive(Debug, Error)]
pub enum DiError {
    /// No rule is bound for the requested key and the type cannot be (or, for
    /// trait objects, is never) implicitly constructed.
    #[error("no rule bound for {type_name}")]
    NotBound {
        /// The requested type.
        type_name: &'static str,
    },

    /// A rule produced a value whose dynamic type does not match the
    /// statically requested one.
    #[error("value resolved for {type_name} has an unexpected dynamic type")]
    TypeMismatch {
        /// The requested type.
        type_name: &'static str,
    },

    /// A recipe slot carries an inject tag other than `""` or `"@none"`.
    #[error("invalid inject tag {tag:?} on field `{field}` of {type_name}")]
    InvalidFieldTag {
        /// The enclosing composite type.
        type_name: &'static str,
        /// The offending slot.
        field: &'static str,
        /// The rejected tag value.
        tag: &'static str,
    },

    /// Resolution re-entered a key that is already being resolved on this
    /// thread.
    #[error("cyclic dependency: {chain}")]
    CyclicDependency {
        /// The in-flight key chain, e.g. `app::A -> app::B -> app::A`.
        chain: String,
    },

    /// A recipe slot failed to resolve; the whole build was aborted.
    #[error("field `{field}` of {type_name} could not be resolved")]
    Field {
        /// The enclosing composite type.
        type_name: &'static str,
        /// The slot that failed.
        field: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<DiError>,
    },

    /// A callback parameter failed to resolve; the callback was not invoked.
    #[error("argument #{index} ({type_name}) of callback could not be resolved")]
    Argument {
        /// Zero-based parameter position.
        index: usize,
        /// The parameter type.
        type_name: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<DiError>,
    },

    /// A factory or provider callback body returned an error.
    #[error("constructor for {type_name} failed")]
    Constructor {
        /// The constructed type.
        type_name: &'static str,
        /// The error reported by the callback.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DiError {
    /// A missing-rule error for `T`.
    pub fn not_bound<T: ?Sized>() -> Self {
        DiError::NotBound {
            type_name: type_name::<T>(),
        }
    }

    /// A downcast-failure error for `T`.
    pub fn type_mismatch<T: ?Sized>() -> Self {
        DiError::TypeMismatch {
            type_name: type_name::<T>(),
        }
    }

    /// Wraps a failed recipe slot of `T`.
    pub fn field<T: ?Sized>(field: &'static str, source: DiError) -> Self {
        DiError::Field {
            type_name: type_name::<T>(),
            field,
            source: Box::new(source),
        }
    }

    /// Wraps a failed callback parameter of type `P`.
    pub fn argument<P: ?Sized>(index: usize, source: DiError) -> Self {
        DiError::Argument {
            index,
            type_name: type_name::<P>(),
            source: Box::new(source),
        }
    }

    /// Wraps a domain error reported by a constructor callback for `T`.
    pub fn constructor<T: ?Sized>(
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        DiError::Constructor {
            type_name: type_name::<T>(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_bound_display() {
        let err = DiError::not_bound::<String>();
        assert_eq!(err.to_string(), "no rule bound for alloc::string::String");
    }

    #[test]
    fn test_invalid_tag_display_names_field_and_type() {
        let err = DiError::InvalidFieldTag {
            type_name: "demo::Car",
            field: "engine",
            tag: "@wat",
        };
        assert_eq!(
            err.to_string(),
            "invalid inject tag \"@wat\" on field `engine` of demo::Car"
        );
    }

    #[test]
    fn test_field_error_carries_source() {
        struct Car;
        let err = DiError::field::<Car>("engine", DiError::not_bound::<String>());
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "no rule bound for alloc::string::String");
    }

    #[test]
    fn test_constructor_from_string() {
        struct Db;
        let err = DiError::constructor::<Db>("connection refused");
        assert!(err.to_string().contains("Db"));
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "connection refused");
    }
}
