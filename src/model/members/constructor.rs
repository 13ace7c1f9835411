use std::sync::Arc;

use crate::{
    metadata::{
        method::{Method, MethodAttributes, MethodRc, TYPE_INITIALIZER_NAME},
        signatures::{SignatureMethod, SignatureParameter},
        token::Token,
    },
    model::{
        AttributeContainer, MemberInfo, MemberKind, MethodBody, MutableMember, Parameterized,
    },
};

/// An instance constructor or the type initializer of a type model
#[derive(Debug)]
pub struct MutableConstructor {
    token: Token,
    name: String,
    attributes: MethodAttributes,
    signature: SignatureMethod,
    declaring: Token,
    original: Option<MethodRc>,
    body: MethodBody,
    modified: bool,
    pub(crate) custom_attributes: AttributeContainer,
}

impl MutableConstructor {
    /// Wrap a constructor of the original type
    pub(crate) fn existing(declaring: Token, original: &MethodRc) -> Self {
        MutableConstructor {
            token: original.token,
            name: original.name.clone(),
            attributes: original.attributes(),
            signature: original.signature.clone(),
            declaring,
            original: Some(original.clone()),
            body: MethodBody::Original,
            modified: false,
            custom_attributes: AttributeContainer::default(),
        }
    }

    /// Describe a new constructor
    pub(crate) fn added(
        token: Token,
        declaring: Token,
        name: &str,
        attributes: MethodAttributes,
        signature: SignatureMethod,
        body: MethodBody,
    ) -> Self {
        MutableConstructor {
            token,
            name: name.to_string(),
            attributes,
            signature,
            declaring,
            original: None,
            body,
            modified: false,
            custom_attributes: AttributeContainer::default(),
        }
    }

    /// Access, vtable and modifier flags
    #[must_use]
    pub fn attributes(&self) -> MethodAttributes {
        self.attributes
    }

    /// The constructor signature (always returning void)
    #[must_use]
    pub fn signature(&self) -> &SignatureMethod {
        &self.signature
    }

    /// The current body
    #[must_use]
    pub fn body(&self) -> &MethodBody {
        &self.body
    }

    /// An existing constructor whose body was replaced
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// This is the static type initializer
    #[must_use]
    pub fn is_type_initializer(&self) -> bool {
        self.attributes.is_static() && self.name == TYPE_INITIALIZER_NAME
    }

    /// Custom attributes staged for this constructor
    #[must_use]
    pub fn custom_attributes(&self) -> &AttributeContainer {
        &self.custom_attributes
    }

    pub(crate) fn set_body(&mut self, body: MethodBody) {
        self.body = body;
        if self.original.is_some() {
            self.modified = true;
        }
    }
}

impl MemberInfo for MutableConstructor {
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
        self.attributes.access.is_public()
    }

    fn is_static(&self) -> bool {
        self.attributes.is_static()
    }
}

impl Parameterized for MutableConstructor {
    fn parameters(&self) -> &[SignatureParameter] {
        &self.signature.params
    }
}

impl MutableMember for MutableConstructor {
    type Original = Method;
    const KIND: MemberKind = MemberKind::Constructor;

    fn original(&self) -> Option<&Arc<Method>> {
        self.original.as_ref()
    }
}
