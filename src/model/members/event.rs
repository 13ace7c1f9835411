use std::sync::Arc;

use crate::{
    metadata::{
        members::{Event, EventRc},
        signatures::TypeSignature,
        token::Token,
    },
    model::{AttributeContainer, MemberInfo, MemberKind, MethodId, MutableMember},
};

/// An event of a type model
///
/// Accessors are methods of the same model, referenced by id.
#[derive(Debug)]
pub struct MutableEvent {
    token: Token,
    name: String,
    flags: u32,
    event_type: TypeSignature,
    declaring: Token,
    original: Option<EventRc>,
    adder: MethodId,
    remover: MethodId,
    raiser: Option<MethodId>,
    is_public: bool,
    is_static: bool,
    pub(crate) custom_attributes: AttributeContainer,
}

impl MutableEvent {
    pub(crate) fn new(
        token: Token,
        declaring: Token,
        name: String,
        flags: u32,
        event_type: TypeSignature,
        original: Option<EventRc>,
        accessors: (MethodId, MethodId, Option<MethodId>),
        visibility: (bool, bool),
    ) -> Self {
        let (adder, remover, raiser) = accessors;
        let (is_public, is_static) = visibility;
        MutableEvent {
            token,
            name,
            flags,
            event_type,
            declaring,
            original,
            adder,
            remover,
            raiser,
            is_public,
            is_static,
            custom_attributes: AttributeContainer::default(),
        }
    }

    /// Raw `EventAttributes`
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// The delegate type of the event
    #[must_use]
    pub fn event_type(&self) -> &TypeSignature {
        &self.event_type
    }

    /// The `add` accessor
    #[must_use]
    pub fn adder(&self) -> MethodId {
        self.adder
    }

    /// The `remove` accessor
    #[must_use]
    pub fn remover(&self) -> MethodId {
        self.remover
    }

    /// The `raise` accessor
    #[must_use]
    pub fn raiser(&self) -> Option<MethodId> {
        self.raiser
    }

    /// Custom attributes staged for this event
    #[must_use]
    pub fn custom_attributes(&self) -> &AttributeContainer {
        &self.custom_attributes
    }
}

impl MemberInfo for MutableEvent {
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

impl MutableMember for MutableEvent {
    type Original = Event;
    const KIND: MemberKind = MemberKind::Event;

    fn original(&self) -> Option<&Arc<Event>> {
        self.original.as_ref()
    }
}
