use std::sync::Arc;

use crate::{
    metadata::{
        members::DeclaringType, method::MethodRc, signatures::TypeSignature, token::Token,
        typesystem::CilTypeRc,
    },
    Result,
};

/// A vector that holds a list of `Event`
pub type EventList = Vec<EventRc>;
/// A reference to an `Event`
pub type EventRc = Arc<Event>;

#[allow(non_snake_case)]
/// All possible flags for `EventAttributes`
pub mod EventAttributes {
    /// Event is special
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// CLI provides 'special' behavior, depending upon the name of the event
    pub const RTSPECIAL_NAME: u32 = 0x0400;
}

/// An event declared by a host type
pub struct Event {
    /// Token
    pub token: Token,
    /// Event name
    pub name: String,
    /// a 2-byte bitmask of type `EventAttributes`, §II.23.1.4
    pub flags: u32,
    /// The delegate type of the event
    pub event_type: TypeSignature,
    /// The `add` accessor
    pub adder: MethodRc,
    /// The `remove` accessor
    pub remover: MethodRc,
    /// The optional `raise` accessor
    pub raiser: Option<MethodRc>,
    declaring_type: DeclaringType,
}

impl Event {
    /// Create a new event record
    pub fn new(
        token: Token,
        name: impl Into<String>,
        flags: u32,
        event_type: TypeSignature,
        adder: MethodRc,
        remover: MethodRc,
        raiser: Option<MethodRc>,
    ) -> Self {
        Event {
            token,
            name: name.into(),
            flags,
            event_type,
            adder,
            remover,
            raiser,
            declaring_type: DeclaringType::default(),
        }
    }

    /// The type declaring this event, if it is still alive
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

    /// An event is public if its `add` accessor is
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.adder.is_public()
    }

    /// An event is static if its accessors are
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.adder.is_static()
    }

    /// An event is private if its `add` accessor is
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.adder.flags_access.is_private()
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("event_type", &self.event_type)
            .field("adder", &self.adder.token)
            .field("remover", &self.remover.token)
            .finish_non_exhaustive()
    }
}
