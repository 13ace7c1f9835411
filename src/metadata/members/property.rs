use std::sync::Arc;

use crate::{
    metadata::{
        members::DeclaringType, method::MethodRc, signatures::SignatureProperty, token::Token,
        typesystem::CilTypeRc,
    },
    Result,
};

/// A vector that holds a list of `Property`
pub type PropertyList = Vec<PropertyRc>;
/// A reference to a `Property`
pub type PropertyRc = Arc<Property>;

#[allow(non_snake_case)]
/// All possible flags for `PropertyAttributes`
pub mod PropertyAttributes {
    /// Property is special
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// Runtime (metadata internal APIs) should check name encoding
    pub const RT_SPECIAL_NAME: u32 = 0x0400;
    /// Property has default
    pub const HAS_DEFAULT: u32 = 0x1000;
}

/// A property declared by a host type
pub struct Property {
    /// Token
    pub token: Token,
    /// Property name
    pub name: String,
    /// a 2-byte bitmask of type `PropertyAttributes`, §II.23.1.14
    pub flags: u32,
    /// Property type and index parameters
    pub signature: SignatureProperty,
    /// The `get` accessor
    pub getter: Option<MethodRc>,
    /// The `set` accessor
    pub setter: Option<MethodRc>,
    declaring_type: DeclaringType,
}

impl Property {
    /// Create a new property record
    pub fn new(
        token: Token,
        name: impl Into<String>,
        flags: u32,
        signature: SignatureProperty,
        getter: Option<MethodRc>,
        setter: Option<MethodRc>,
    ) -> Self {
        Property {
            token,
            name: name.into(),
            flags,
            signature,
            getter,
            setter,
            declaring_type: DeclaringType::default(),
        }
    }

    /// The type declaring this property, if it is still alive
    #[must_use]
    pub fn declaring_type(&self) -> Option<CilTypeRc> {
        self.declaring_type.get()
    }

    /// Token of the declaring type
    #[must_use]
    pub fn declaring_token(&self) -> Token {
        self.declaring_type.token()
    }

    pub(crate) fn set_declaring_type(&self, declaring: &CilTypeRc) -> Result<()> {
        self.declaring_type.set(declaring, &self.name)
    }

    /// Iterate the present accessors (getter first)
    pub fn accessors(&self) -> impl Iterator<Item = &MethodRc> {
        self.getter.iter().chain(self.setter.iter())
    }

    /// A property is public if any of its accessors is public
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.accessors().any(|accessor| accessor.is_public())
    }

    /// A property is static if its accessors are
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.accessors().any(|accessor| accessor.is_static())
    }

    /// A property is private if every accessor is private
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.accessors()
            .all(|accessor| accessor.flags_access.is_private())
    }
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("getter", &self.getter.as_ref().map(|m| m.token))
            .field("setter", &self.setter.as_ref().map(|m| m.token))
            .finish()
    }
}
