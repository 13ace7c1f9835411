//! Host methods of the reflection universe.
//!
//! A [`Method`] is an immutable record of a method (or constructor) declared by a
//! [`crate::metadata::typesystem::CilType`]. Methods keep a weak back reference to their
//! declaring type, which is set exactly once when the type is built.
//!
//! # Key Types
//! - [`Method`] / [`MethodRc`]: A host method and its shared handle
//! - [`MethodAttributes`] and the flag groups re-exported from [`types`]

mod types;

use std::sync::{Arc, OnceLock};

pub use types::*;

use crate::{
    metadata::{
        signatures::SignatureMethod,
        token::Token,
        typesystem::{CilTypeRc, CilTypeRef},
    },
    Result,
};

/// Name of instance constructors
pub const CONSTRUCTOR_NAME: &str = ".ctor";
/// Name of the type initializer (static constructor)
pub const TYPE_INITIALIZER_NAME: &str = ".cctor";

/// A reference to a `Method`
pub type MethodRc = Arc<Method>;
/// A vector that holds a list of `Method`
pub type MethodList = Vec<MethodRc>;

/// A method declared by a host type
pub struct Method {
    /// Token
    pub token: Token,
    /// Method name
    pub name: String,
    /// Visibility
    pub flags_access: MethodAccessFlags,
    /// Vtable layout
    pub flags_vtable: MethodVtableFlags,
    /// Remaining modifiers
    pub flags_modifiers: MethodModifiers,
    /// Return type and parameters
    pub signature: SignatureMethod,
    /// The type declaring this method (weak, set once when the type is built)
    declaring_type: OnceLock<CilTypeRef>,
}

impl Method {
    /// Create a new method record
    ///
    /// ## Arguments
    /// * `token`      - Identity of the method
    /// * `name`       - Method name
    /// * `attributes` - Access, vtable and modifier flags
    /// * `signature`  - Return type and parameters
    pub fn new(
        token: Token,
        name: impl Into<String>,
        attributes: MethodAttributes,
        signature: SignatureMethod,
    ) -> Self {
        Method {
            token,
            name: name.into(),
            flags_access: attributes.access,
            flags_vtable: attributes.vtable,
            flags_modifiers: attributes.modifiers,
            signature,
            declaring_type: OnceLock::new(),
        }
    }

    /// All attribute groups of this method
    #[must_use]
    pub fn attributes(&self) -> MethodAttributes {
        MethodAttributes {
            access: self.flags_access,
            vtable: self.flags_vtable,
            modifiers: self.flags_modifiers,
        }
    }

    /// The type declaring this method, if it is still alive
    #[must_use]
    pub fn declaring_type(&self) -> Option<CilTypeRc> {
        self.declaring_type.get().and_then(CilTypeRef::upgrade)
    }

    /// Token of the declaring type, or a null token for a detached method
    #[must_use]
    pub fn declaring_token(&self) -> Token {
        self.declaring_type
            .get()
            .and_then(CilTypeRef::token)
            .unwrap_or_default()
    }

    /// Attach this method to its declaring type
    ///
    /// # Errors
    /// Returns an error if the declaring type was already set.
    pub(crate) fn set_declaring_type(&self, declaring: &CilTypeRc) -> Result<()> {
        self.declaring_type
            .set(CilTypeRef::new(declaring))
            .map_err(|_| malformed_error!("Method '{}' already has a declaring type", self.name))
    }

    /// `Namespace.Type::Name`, falling back to the bare name for detached methods
    #[must_use]
    pub fn fullname(&self) -> String {
        match self.declaring_type() {
            Some(declaring) => format!("{}::{}", declaring.fullname(), self.name),
            None => self.name.clone(),
        }
    }

    /// Method is virtual
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::VIRTUAL)
    }

    /// Method is abstract
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::ABSTRACT)
    }

    /// Method is final (sealed)
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::FINAL)
    }

    /// Method is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::STATIC)
    }

    /// Method is public
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.flags_access.is_public()
    }

    /// Method introduces a new vtable slot
    #[must_use]
    pub fn is_new_slot(&self) -> bool {
        self.flags_vtable.contains(MethodVtableFlags::NEW_SLOT)
    }

    /// Method is an instance constructor or the type initializer
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::RTSPECIAL_NAME)
            && (self.name == CONSTRUCTOR_NAME || self.name == TYPE_INITIALIZER_NAME)
    }

    /// Method is the type initializer
    #[must_use]
    pub fn is_type_initializer(&self) -> bool {
        self.is_constructor() && self.is_static()
    }
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("attributes", &self.attributes())
            .field("signature", &self.signature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::signatures::TypeSignature;

    #[test]
    fn test_detached_method() {
        let method = Method::new(
            Token::new(0x06000001),
            "Run",
            MethodAttributes::public().with_modifiers(MethodModifiers::VIRTUAL),
            SignatureMethod::instance(TypeSignature::Void, vec![]),
        );

        assert!(method.is_virtual());
        assert!(method.is_public());
        assert!(!method.is_constructor());
        assert!(method.declaring_type().is_none());
        assert!(method.declaring_token().is_null());
        assert_eq!(method.fullname(), "Run");
    }

    #[test]
    fn test_constructor_detection() {
        let ctor = Method::new(
            Token::new(0x06000002),
            CONSTRUCTOR_NAME,
            MethodAttributes::public()
                .with_modifiers(MethodModifiers::SPECIAL_NAME | MethodModifiers::RTSPECIAL_NAME),
            SignatureMethod::instance(TypeSignature::Void, vec![]),
        );
        assert!(ctor.is_constructor());
        assert!(!ctor.is_type_initializer());

        // A method merely named .ctor is not a constructor
        let fake = Method::new(
            Token::new(0x06000003),
            CONSTRUCTOR_NAME,
            MethodAttributes::public(),
            SignatureMethod::instance(TypeSignature::Void, vec![]),
        );
        assert!(!fake.is_constructor());
    }
}
