use std::sync::Arc;

use crate::{
    metadata::{
        members::{Property, PropertyRc},
        signatures::{SignatureParameter, SignatureProperty},
        token::Token,
    },
    model::{AttributeContainer, MemberInfo, MemberKind, MethodId, MutableMember, Parameterized},
};

/// A property of a type model
///
/// Accessors are methods of the same model, referenced by id.
#[derive(Debug)]
pub struct MutableProperty {
    token: Token,
    name: String,
    flags: u32,
    signature: SignatureProperty,
    declaring: Token,
    original: Option<PropertyRc>,
    getter: Option<MethodId>,
    setter: Option<MethodId>,
    is_public: bool,
    is_static: bool,
    pub(crate) custom_attributes: AttributeContainer,
}

impl MutableProperty {
    pub(crate) fn new(
        token: Token,
        declaring: Token,
        name: String,
        flags: u32,
        signature: SignatureProperty,
        original: Option<PropertyRc>,
        getter: Option<MethodId>,
        setter: Option<MethodId>,
        visibility: (bool, bool),
    ) -> Self {
        let (is_public, is_static) = visibility;
        MutableProperty {
            token,
            name,
            flags,
            signature,
            declaring,
            original,
            getter,
            setter,
            is_public,
            is_static,
            custom_attributes: AttributeContainer::default(),
        }
    }

    /// Raw `PropertyAttributes`
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Property type and index parameters
    #[must_use]
    pub fn signature(&self) -> &SignatureProperty {
        &self.signature
    }

    /// The `get` accessor
    #[must_use]
    pub fn getter(&self) -> Option<MethodId> {
        self.getter
    }

    /// The `set` accessor
    #[must_use]
    pub fn setter(&self) -> Option<MethodId> {
        self.setter
    }

    /// Custom attributes staged for this property
    #[must_use]
    pub fn custom_attributes(&self) -> &AttributeContainer {
        &self.custom_attributes
    }
}

impl MemberInfo for MutableProperty {
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
        self.is_public
    }

    fn is_static(&self) -> bool {
        self.is_static
    }
}

impl Parameterized for MutableProperty {
    fn parameters(&self) -> &[SignatureParameter] {
        &self.signature.params
    }
}

impl MutableMember for MutableProperty {
    type Original = Property;
    const KIND: MemberKind = MemberKind::Property;

    fn original(&self) -> Option<&Arc<Property>> {
        self.original.as_ref()
    }
}
