use std::sync::Arc;

use crate::{
    metadata::{
        members::DeclaringType, signatures::SignatureField, token::Token, typesystem::CilTypeRc,
    },
    Result,
};

/// A vector that holds a list of `Field`
pub type FieldList = Vec<FieldRc>;
/// A reference to a field
pub type FieldRc = Arc<Field>;

#[allow(non_snake_case)]
/// All possible flags for `FieldAttributes`
pub mod FieldAttributes {
    /// These 3 bits contain one of the following values:
    pub const FIELD_ACCESS_MASK: u32 = 0x0007;
    /// Member not referenceable
    pub const COMPILER_CONTROLLED: u32 = 0x0000;
    /// Accessible only by the parent type
    pub const PRIVATE: u32 = 0x0001;
    /// Accessible by sub-types only in this Assembly
    pub const FAM_AND_ASSEM: u32 = 0x0002;
    /// Accessibly by anyone in the Assembly
    pub const ASSEMBLY: u32 = 0x0003;
    /// Accessible only by type and sub-types
    pub const FAMILY: u32 = 0x0004;
    /// Accessibly by sub-types anywhere, plus anyone in assembly
    pub const FAM_OR_ASSEM: u32 = 0x0005;
    /// Accessibly by anyone who has visibility to this scope field contract attributes
    pub const PUBLIC: u32 = 0x0006;
    /// Defined on type, else per instance
    pub const STATIC: u32 = 0x0010;
    /// Field can only be initialized, not written to after init
    pub const INIT_ONLY: u32 = 0x0020;
    /// Value is compile time constant
    pub const LITERAL: u32 = 0x0040;
    /// Reserved (to indicate this field should not be serialized when type is remoted)
    pub const NOT_SERIALIZED: u32 = 0x0080;
    /// Field is special
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// Implementation is forwarded through `PInvoke`
    pub const PINVOKE_IMPL: u32 = 0x2000;
    /// CLI provides 'special' behavior, depending upon the name of the field
    pub const RTSPECIAL_NAME: u32 = 0x0400;
    /// Field has marshalling information
    pub const HAS_FIELD_MARSHAL: u32 = 0x1000;
    /// Field has default
    pub const HAS_DEFAULT: u32 = 0x8000;
    /// Field has RVA
    pub const HAS_FIELD_RVA: u32 = 0x0100;
}

/// A field declared by a host type
pub struct Field {
    /// Token
    pub token: Token,
    /// Field name
    pub name: String,
    /// a 2-byte bitmask of type `FieldAttributes`, §II.23.1.5
    pub flags: u32,
    /// The type of the field
    pub signature: SignatureField,
    declaring_type: DeclaringType,
}

impl Field {
    /// Create a new field record
    pub fn new(token: Token, name: impl Into<String>, flags: u32, signature: SignatureField) -> Self {
        Field {
            token,
            name: name.into(),
            flags,
            signature,
            declaring_type: DeclaringType::default(),
        }
    }

    /// The type declaring this field, if it is still alive
    #[must_use]
    pub fn declaring_type(&self) -> Option<CilTypeRc> {
        self.declaring_type.get()
    }

    /// Token of the declaring type, or a null token for a detached field
    #[must_use]
    pub fn declaring_token(&self) -> Token {
        self.declaring_type.token()
    }

    pub(crate) fn set_declaring_type(&self, declaring: &CilTypeRc) -> Result<()> {
        self.declaring_type.set(declaring, &self.name)
    }

    /// The access bits of `flags`
    #[must_use]
    pub fn access(&self) -> u32 {
        self.flags & FieldAttributes::FIELD_ACCESS_MASK
    }

    /// Field is public
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.access() == FieldAttributes::PUBLIC
    }

    /// Field is private (or not referenceable)
    #[must_use]
    pub fn is_private(&self) -> bool {
        let access = self.access();
        access == FieldAttributes::PRIVATE || access == FieldAttributes::COMPILER_CONTROLLED
    }

    /// Field is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags & FieldAttributes::STATIC != 0
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("flags", &format_args!("{:#06x}", self.flags))
            .field("signature", &self.signature)
            .finish()
    }
}
