//! Diagnostic events and the verbosity mask.
//!
//! A registry can be given an optional sink callback that receives a
//! [`DiEvent`] for the operations it performs, gated by a [`LogLevel`] bit
//! mask. Events are purely observational and never change behavior.

use std::fmt;

use bitflags::bitflags;

use crate::key::TypeKey;

bitflags! {
    /// Bit mask selecting which event severities reach the sink.
    ///
    /// `LogLevel::empty()` silences everything. The default mask on a new
    /// registry is `ERROR | WARNING | NOTICE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LogLevel: u8 {
        /// Resolution and build failures.
        const ERROR = 1;
        /// Suspicious but non-fatal situations, e.g. a discarded duplicate
        /// construction.
        const WARNING = 2;
        /// Noteworthy state changes, e.g. an implicit binding installed for a
        /// previously unbound type.
        const NOTICE = 4;
        /// Every step of resolution and construction.
        const TRACE = 8;
        /// All of the above.
        const ALL = Self::ERROR.bits()
            | Self::WARNING.bits()
            | Self::NOTICE.bits()
            | Self::TRACE.bits();
    }
}

impl LogLevel {
    /// The mask a fresh registry starts with.
    pub fn default_mask() -> Self {
        LogLevel::ERROR | LogLevel::WARNING | LogLevel::NOTICE
    }
}

/// Events emitted by a registry while binding and resolving.
#[derive(Debug, Clone)]
pub enum DiEvent {
    /// A rule was bound under a key.
    RuleSet {
        /// The key the rule was bound under.
        key: TypeKey,
        /// The rule variant, e.g. `instance` or `factory`.
        kind: &'static str,
    },

    /// A resolution request entered the resolver.
    Resolving {
        /// The requested key.
        key: TypeKey,
    },

    /// The builder started constructing a fresh value.
    Building {
        /// The key being built.
        key: TypeKey,
    },

    /// An alias rule redirected resolution to its target key.
    AliasRedirect {
        /// The trait key the request came in under.
        from: TypeKey,
        /// The concrete key resolution continues with.
        to: TypeKey,
    },

    /// A previously unbound type was built and cached as an implicit
    /// singleton. Useful for spotting typos in binding keys that would
    /// otherwise silently succeed with a default-constructed value.
    ImplicitBinding {
        /// The key the implicit instance rule was installed under.
        key: TypeKey,
    },

    /// A recipe slot was skipped because of its `@none` tag.
    FieldSkipped {
        /// The enclosing composite type.
        type_name: &'static str,
        /// The skipped slot.
        field: &'static str,
    },

    /// A trait-typed slot had no rule bound and was left at its zero value.
    InterfaceUnbound {
        /// The enclosing composite type.
        type_name: &'static str,
        /// The slot left unset.
        field: &'static str,
    },

    /// Two threads raced to populate a rule-local cache; the freshly built
    /// loser was discarded.
    DuplicateConstruction {
        /// The key whose cache was contested.
        key: TypeKey,
    },

    /// A resolution request failed.
    ResolveFailed {
        /// The requested key.
        key: TypeKey,
        /// The rendered error.
        message: String,
    },
}

impl DiEvent {
    /// The severity bit this event is gated by.
    pub fn level(&self) -> LogLevel {
        match self {
            DiEvent::ResolveFailed { .. } => LogLevel::ERROR,
            DiEvent::DuplicateConstruction { .. } => LogLevel::WARNING,
            DiEvent::ImplicitBinding { .. } => LogLevel::NOTICE,
            DiEvent::RuleSet { .. }
            | DiEvent::Resolving { .. }
            | DiEvent::Building { .. }
            | DiEvent::AliasRedirect { .. }
            | DiEvent::FieldSkipped { .. }
            | DiEvent::InterfaceUnbound { .. } => LogLevel::TRACE,
        }
    }
}

impl fmt::Display for DiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiEvent::RuleSet { key, kind } => write!(f, "setting {key} as {kind}"),
            DiEvent::Resolving { key } => write!(f, "resolving {key}"),
            DiEvent::Building { key } => write!(f, "building {key}"),
            DiEvent::AliasRedirect { from, to } => {
                write!(f, "redirecting {from} to {to}")
            }
            DiEvent::ImplicitBinding { key } => {
                write!(f, "no rule for {key}, built and cached implicitly")
            }
            DiEvent::FieldSkipped { type_name, field } => {
                write!(f, "tagged as @none, skipping `{field}` of {type_name}")
            }
            DiEvent::InterfaceUnbound { type_name, field } => {
                write!(
                    f,
                    "`{field}` of {type_name} is an unbound trait slot, leaving zero value"
                )
            }
            DiEvent::DuplicateConstruction { key } => {
                write!(f, "discarding duplicate construction of {key}")
            }
            DiEvent::ResolveFailed { key, message } => {
                write!(f, "failed to resolve {key}: {message}")
            }
        }
    }
}

/// Sink signature accepted by a registry.
///
/// The callback must be thread-safe; a registry may be shared across threads.
/// It must not call back into the same registry's sink configuration methods.
pub type LogSink = dyn Fn(&DiEvent) + Send + Sync;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mask_excludes_trace() {
        let mask = LogLevel::default_mask();
        assert!(mask.contains(LogLevel::ERROR));
        assert!(mask.contains(LogLevel::WARNING));
        assert!(mask.contains(LogLevel::NOTICE));
        assert!(!mask.contains(LogLevel::TRACE));
    }

    #[test]
    fn test_all_covers_every_bit() {
        assert_eq!(LogLevel::ALL.bits(), 15);
        assert!(LogLevel::ALL.contains(LogLevel::TRACE));
    }

    #[test]
    fn test_display_rule_set() {
        let event = DiEvent::RuleSet {
            key: TypeKey::of::<u8>(),
            kind: "instance",
        };
        assert_eq!(event.to_string(), "setting u8 as instance");
    }

    #[test]
    fn test_display_field_skipped() {
        let event = DiEvent::FieldSkipped {
            type_name: "demo::Car",
            field: "cache",
        };
        assert_eq!(
            event.to_string(),
            "tagged as @none, skipping `cache` of demo::Car"
        );
    }

    #[test]
    fn test_levels() {
        let key = TypeKey::of::<u8>();
        assert_eq!(
            DiEvent::ResolveFailed {
                key,
                message: String::new()
            }
            .level(),
            LogLevel::ERROR
        );
        assert_eq!(
            DiEvent::DuplicateConstruction { key }.level(),
            LogLevel::WARNING
        );
        assert_eq!(DiEvent::ImplicitBinding { key }.level(), LogLevel::NOTICE);
        assert_eq!(DiEvent::Resolving { key }.level(), LogLevel::TRACE);
    }
}
