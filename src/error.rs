use thiserror::Error;

use crate::metadata::token::Token;
use crate::model::MemberKind;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure is synchronous and local to the call that triggered it. A call that fails
/// leaves the [`crate::model::TypeModel`] exactly as it was before the call.
///
/// # Error Categories
///
/// ## Preconditions
/// - [`Error::InvalidArgument`] - Empty names, foreign member ids, unsuitable types
/// - [`Error::NotExtensible`] - The candidate type cannot be extended
///
/// ## Structural Invariants
/// - [`Error::SignatureCollision`] - A member with the same name and signature exists
/// - [`Error::InvalidFlags`] - Disallowed modifier combination for the member kind
/// - [`Error::FinalOverride`] - Attempt to override a final method
/// - [`Error::InterfaceAlreadyImplemented`] - Interface added twice
///
/// ## Resolution
/// - [`Error::AmbiguousMatch`] - More than one equally valid candidate
/// - [`Error::InterfaceNotImplemented`] - Strict interface mapping with unmapped methods
///
/// ## Bookkeeping
/// - [`Error::InvalidOperation`] - Double registrations, second type initializer
/// - [`Error::ModelFrozen`] - Mutation after hand-off to the emission backend
///
/// ## Host Universe
/// - [`Error::Malformed`], [`Error::TypeNotFound`], [`Error::TypeInsert`],
///   [`Error::RecursionLimit`]
///
/// # Examples
///
/// ```rust
/// use dotweave::{Error, prelude::*};
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new()?);
/// let sealed = TypeBuilder::new(&registry)
///     .class("Demo", "Locked")
///     .flags(TypeAttributes::PUBLIC | TypeAttributes::SEALED)
///     .default_constructor()
///     .build()?;
///
/// match TypeModel::new(&registry, &sealed) {
///     Err(Error::NotExtensible(name)) => assert_eq!(name, "Demo.Locked"),
///     other => panic!("unexpected result: {:?}", other.map(|_| ())),
/// }
/// # Ok::<(), dotweave::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A precondition on an argument was violated.
    ///
    /// Raised for empty names, member ids that do not belong to the model, types of the
    /// wrong flavor and similar caller mistakes. No state was changed.
    #[error("Invalid argument - {0}")]
    InvalidArgument(String),

    /// The candidate type cannot be extended.
    ///
    /// Sealed types, interfaces, value types, delegates, open generic, array, pointer,
    /// by-reference and generic-parameter types, and types without an accessible
    /// constructor are all rejected with this single error. The associated value is the
    /// full name of the rejected type.
    #[error("Type '{0}' cannot be extended: it must be a non-sealed, non-interface, non-value, non-delegate, closed class type with at least one accessible constructor")]
    NotExtensible(String),

    /// The requested modifier flags are not allowed for this kind of member.
    #[error("Invalid flags - {0}")]
    InvalidFlags(String),

    /// A member of the same kind with an identical name and signature already exists.
    #[error("{kind} with equal name and signature already exists - {name}{signature}")]
    SignatureCollision {
        /// The member kind that collided
        kind: MemberKind,
        /// The member name
        name: String,
        /// The rendered signature of the colliding member
        signature: String,
    },

    /// The method that would be overridden is final.
    #[error("Cannot override final method '{0}'")]
    FinalOverride(String),

    /// More than one candidate matched and no further disambiguator was available.
    #[error("Ambiguous match found for {0}")]
    AmbiguousMatch(String),

    /// Strict interface mapping found interface methods without implementation.
    ///
    /// Every unmapped method is listed, not just the first one.
    #[error("Interface '{interface}' is not fully implemented, missing: {}", methods.join(", "))]
    InterfaceNotImplemented {
        /// Full name of the interface
        interface: String,
        /// Names of all unmapped interface methods
        methods: Vec<String>,
    },

    /// The interface is already implemented by the model (existing or added).
    #[error("Interface '{0}' is already implemented")]
    InterfaceAlreadyImplemented(String),

    /// Internal bookkeeping was asked to do something twice.
    ///
    /// Registering the same explicit base definition twice or a second type initializer are
    /// programming errors of the caller; they are reported instead of silently ignored.
    #[error("Invalid operation - {0}")]
    InvalidOperation(String),

    /// The model was handed to the emission backend and is read-only now.
    #[error("The type model has been frozen and can no longer be modified")]
    ModelFrozen,

    /// A member id does not refer to a member of this model.
    #[error("Member not found - {0}")]
    MemberNotFound(String),

    /// The host type universe contains inconsistent data.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Failed to insert new type into the `TypeRegistry`.
    ///
    /// The associated [`Token`] identifies which type caused the failure.
    #[error("Failed to insert new type into TypeRegistry - {0}")]
    TypeInsert(Token),

    /// Failed to find type in the `TypeRegistry`.
    #[error("Failed to find type in TypeRegistry - {0}")]
    TypeNotFound(Token),

    /// Recursion limit reached.
    ///
    /// Ancestor walks are bounded by [`crate::ModelConfig::max_hierarchy_depth`]; this error
    /// indicates that limit was exceeded.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),
}
