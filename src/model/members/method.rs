use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        method::{Method, MethodAttributes, MethodModifiers, MethodRc},
        signatures::{SignatureMethod, SignatureParameter},
        token::Token,
    },
    model::{AttributeContainer, MemberInfo, MemberKind, MutableMember, Parameterized},
    Error::InvalidOperation,
    Result,
};

/// The implementation of a method or constructor
///
/// Constructing bodies is the business of the emission backend; the model only records what
/// kind of body a member has. `Provided` carries an opaque handle chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodBody {
    /// The unchanged body of an existing member
    Original,
    /// Forward every argument to the given base method and return its result
    CallBase(Token),
    /// A body supplied by the caller
    Provided(String),
}

impl MethodBody {
    /// A caller supplied body
    pub fn provided(handle: impl Into<String>) -> Self {
        MethodBody::Provided(handle.into())
    }
}

impl fmt::Display for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Original => f.write_str("original"),
            MethodBody::CallBase(token) => write!(f, "call base {}", token),
            MethodBody::Provided(handle) => write!(f, "provided '{}'", handle),
        }
    }
}

/// Body of a synthesized property or event accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorBody {
    /// The accessor is abstract
    Abstract,
    /// The accessor has the given body
    Body(MethodBody),
}

impl From<MethodBody> for AccessorBody {
    fn from(body: MethodBody) -> Self {
        AccessorBody::Body(body)
    }
}

impl AccessorBody {
    pub(crate) fn into_body(self) -> Option<MethodBody> {
        match self {
            AccessorBody::Abstract => None,
            AccessorBody::Body(body) => Some(body),
        }
    }
}

/// How a method of a type model came to be
#[derive(Debug, Clone)]
pub enum MethodOrigin {
    /// Declared by the original type
    Existing(MethodRc),
    /// Added through the model
    Added,
    /// Synthesized to override an inherited virtual method
    Override {
        /// The inherited method that was overridden
        base: MethodRc,
    },
    /// Synthesized to implement an interface method
    Implementation {
        /// The interface method being implemented
        interface_method: MethodRc,
    },
}

/// A virtual method (of an ancestor or an interface) a method overrides by name-qualified
/// registration rather than by name and signature
#[derive(Debug, Clone)]
pub struct ExplicitBaseDefinition {
    /// The overridden method
    pub definition: MethodRc,
    /// Token of the root definition of the overridden slot
    pub root: Token,
}

/// A method of a type model
#[derive(Debug)]
pub struct MutableMethod {
    token: Token,
    name: String,
    attributes: MethodAttributes,
    signature: SignatureMethod,
    declaring: Token,
    origin: MethodOrigin,
    body: Option<MethodBody>,
    base_root: Option<MethodRc>,
    explicit_bases: Vec<ExplicitBaseDefinition>,
    modified: bool,
    pub(crate) custom_attributes: AttributeContainer,
}

impl MutableMethod {
    /// Wrap a method of the original type
    ///
    /// `base_root` is the root definition of the inherited slot the method overrides.
    pub(crate) fn existing(
        declaring: Token,
        original: &MethodRc,
        base_root: Option<MethodRc>,
        explicit_bases: Vec<ExplicitBaseDefinition>,
    ) -> Self {
        let attributes = original.attributes();
        MutableMethod {
            token: original.token,
            name: original.name.clone(),
            attributes,
            signature: original.signature.clone(),
            declaring,
            origin: MethodOrigin::Existing(original.clone()),
            body: (!attributes.is_abstract()).then_some(MethodBody::Original),
            base_root,
            explicit_bases,
            modified: false,
            custom_attributes: AttributeContainer::default(),
        }
    }

    /// Describe a new method
    pub(crate) fn added(
        token: Token,
        declaring: Token,
        name: String,
        attributes: MethodAttributes,
        signature: SignatureMethod,
        origin: MethodOrigin,
        body: Option<MethodBody>,
        base_root: Option<MethodRc>,
    ) -> Self {
        MutableMethod {
            token,
            name,
            attributes,
            signature,
            declaring,
            origin,
            body,
            base_root,
            explicit_bases: Vec::new(),
            modified: false,
            custom_attributes: AttributeContainer::default(),
        }
    }

    /// Access, vtable and modifier flags
    #[must_use]
    pub fn attributes(&self) -> MethodAttributes {
        self.attributes
    }

    /// Return type and parameters
    #[must_use]
    pub fn signature(&self) -> &SignatureMethod {
        &self.signature
    }

    /// How the method came to be
    #[must_use]
    pub fn origin(&self) -> &MethodOrigin {
        &self.origin
    }

    /// The body, `None` while the method is abstract
    #[must_use]
    pub fn body(&self) -> Option<&MethodBody> {
        self.body.as_ref()
    }

    /// Root definition of the inherited slot this method overrides by name and signature
    #[must_use]
    pub fn base_root(&self) -> Option<&MethodRc> {
        self.base_root.as_ref()
    }

    /// Methods this method overrides by explicit registration
    #[must_use]
    pub fn explicit_base_definitions(&self) -> &[ExplicitBaseDefinition] {
        &self.explicit_bases
    }

    /// Method is virtual
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.attributes.is_virtual()
    }

    /// Method is abstract
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.attributes.is_abstract()
    }

    /// Method is final
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.attributes.is_final()
    }

    /// Method introduces a new vtable slot
    #[must_use]
    pub fn is_new_slot(&self) -> bool {
        self.attributes.is_new_slot()
    }

    /// An existing method whose body was replaced
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Custom attributes staged for this method
    #[must_use]
    pub fn custom_attributes(&self) -> &AttributeContainer {
        &self.custom_attributes
    }

    /// Check if the method occupies the slot with the given root, implicitly or explicitly
    #[must_use]
    pub fn overrides_root(&self, root: Token) -> bool {
        self.base_root.as_ref().is_some_and(|base| base.token == root)
            || self.explicit_bases.iter().any(|base| base.root == root)
    }

    /// Check if `definition` is registered as an explicit base of this method
    #[must_use]
    pub fn has_explicit_base(&self, definition: Token) -> bool {
        self.explicit_bases
            .iter()
            .any(|base| base.definition.token == definition)
    }

    pub(crate) fn set_body(&mut self, body: MethodBody) {
        self.body = Some(body);
        self.attributes.modifiers.remove(MethodModifiers::ABSTRACT);
        if self.is_existing() {
            self.modified = true;
        }
    }

    pub(crate) fn add_explicit_base(&mut self, base: ExplicitBaseDefinition) -> Result<()> {
        if self.has_explicit_base(base.definition.token) {
            return Err(InvalidOperation(format!(
                "'{}' is already an explicit base definition of '{}'",
                base.definition.fullname(),
                self.name
            )));
        }
        self.explicit_bases.push(base);
        if self.is_existing() {
            self.modified = true;
        }
        Ok(())
    }
}

impl MemberInfo for MutableMethod {
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

impl Parameterized for MutableMethod {
    fn parameters(&self) -> &[SignatureParameter] {
        &self.signature.params
    }
}

impl MutableMember for MutableMethod {
    type Original = Method;
    const KIND: MemberKind = MemberKind::Method;

    fn original(&self) -> Option<&Arc<Method>> {
        match &self.origin {
            MethodOrigin::Existing(original) => Some(original),
            _ => None,
        }
    }
}
