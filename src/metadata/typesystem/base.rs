use std::{sync::Arc, sync::Weak};

use crate::metadata::{
    method::MethodRc,
    token::Token,
    typesystem::{CilType, CilTypeRc},
};

/// A vector that holds `CilTypeRef` instances (weak references)
pub type CilTypeRefList = Vec<CilTypeRef>;

/// A smart reference to a `CilType` that automatically handles weak references
/// to prevent circular reference memory leaks while providing a clean API
#[derive(Clone, Debug)]
pub struct CilTypeRef {
    weak_ref: Weak<CilType>,
}

impl CilTypeRef {
    /// Create a new `CilTypeRef` from a strong reference
    pub fn new(strong_ref: &CilTypeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the type, returning None if the type has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<CilTypeRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced type is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Get the token of the referenced type (if still alive)
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.upgrade().map(|t| t.token)
    }

    /// Get the full name of the referenced type (if still alive)
    #[must_use]
    pub fn fullname(&self) -> Option<String> {
        self.upgrade().map(|t| t.fullname())
    }
}

impl From<CilTypeRc> for CilTypeRef {
    fn from(strong_ref: CilTypeRc) -> Self {
        Self::new(&strong_ref)
    }
}

/// The structural category of a host type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CilFlavor {
    /// Reference type
    #[default]
    Class,
    /// Value type (struct or enum)
    ValueType,
    /// Interface type
    Interface,
    /// Array of the given rank
    Array {
        /// The rank (number of dimensions)
        rank: u32,
    },
    /// Unmanaged pointer
    Pointer,
    /// Managed reference
    ByRef,
    /// Generic parameter placeholder
    GenericParameter {
        /// Index in the generic parameters list
        index: u32,
        /// Whether it's a method parameter (true) or type parameter (false)
        method: bool,
    },
    /// Closed instantiation of a generic type definition
    GenericInstance,
}

impl CilFlavor {
    /// Check if this flavor is derived from another type (array, pointer, by-ref, generic
    /// parameter) rather than being a definition of its own
    #[must_use]
    pub fn is_constructed(&self) -> bool {
        matches!(
            self,
            CilFlavor::Array { .. }
                | CilFlavor::Pointer
                | CilFlavor::ByRef
                | CilFlavor::GenericParameter { .. }
        )
    }

    /// Check if this is a value type
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        matches!(self, CilFlavor::ValueType)
    }

    /// Check if this is a reference type
    #[must_use]
    pub fn is_reference_type(&self) -> bool {
        matches!(
            self,
            CilFlavor::Class | CilFlavor::Array { .. } | CilFlavor::GenericInstance
        )
    }
}

/// An explicit method implementation (`MethodImpl`, §II.22.27): `body` implements
/// `declaration`, which is an interface method or a virtual method of an ancestor
#[derive(Debug, Clone)]
pub struct MethodImpl {
    /// The interface or base method being implemented
    pub declaration: MethodRc,
    /// The method of the declaring type providing the implementation
    pub body: MethodRc,
}
