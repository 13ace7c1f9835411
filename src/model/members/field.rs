use std::sync::Arc;

use crate::{
    metadata::{
        members::{Field, FieldAttributes, FieldRc},
        signatures::SignatureField,
        token::Token,
    },
    model::{AttributeContainer, MemberInfo, MemberKind, MutableMember},
};

/// A field of a type model
#[derive(Debug)]
pub struct MutableField {
    token: Token,
    name: String,
    flags: u32,
    signature: SignatureField,
    declaring: Token,
    original: Option<FieldRc>,
    pub(crate) custom_attributes: AttributeContainer,
}

impl MutableField {
    /// Wrap a field of the original type
    pub(crate) fn existing(declaring: Token, original: &FieldRc) -> Self {
        MutableField {
            token: original.token,
            name: original.name.clone(),
            flags: original.flags,
            signature: original.signature.clone(),
            declaring,
            original: Some(original.clone()),
            custom_attributes: AttributeContainer::default(),
        }
    }

    /// Describe a new field
    pub(crate) fn added(
        token: Token,
        declaring: Token,
        name: String,
        flags: u32,
        signature: SignatureField,
    ) -> Self {
        MutableField {
            token,
            name,
            flags,
            signature,
            declaring,
            original: None,
            custom_attributes: AttributeContainer::default(),
        }
    }

    /// Raw `FieldAttributes`
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// The field type
    #[must_use]
    pub fn signature(&self) -> &SignatureField {
        &self.signature
    }

    /// Custom attributes staged for this field
    #[must_use]
    pub fn custom_attributes(&self) -> &AttributeContainer {
        &self.custom_attributes
    }
}

impl MemberInfo for MutableField {
    fn token(&self) -> Token {
        self.token
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_token(&self) -> Token {
        self.declaring
    }

    fn is_public(&self) -> bool {
        self.flags & FieldAttributes::FIELD_ACCESS_MASK == FieldAttributes::PUBLIC
    }

    fn is_static(&self) -> bool {
        self.flags & FieldAttributes::STATIC != 0
    }
}

impl MutableMember for MutableField {
    type Original = Field;
    const KIND: MemberKind = MemberKind::Field;

    fn original(&self) -> Option<&Arc<Field>> {
        self.original.as_ref()
    }
}
