//! Mutable member descriptors of a type model.
//!
//! Every member of a [`crate::model::TypeModel`] is a plain record of one of five kinds:
//! [`MutableField`], [`MutableConstructor`], [`MutableMethod`], [`MutableProperty`] and
//! [`MutableEvent`]. A descriptor either wraps a member of the original type (keeping the
//! original token) or describes a member that does not exist yet. Name and signature of a
//! descriptor never change after creation; flags, staged attributes, the body and the explicit
//! base definitions of a method may.
//!
//! The [`MemberInfo`] trait is the common view the member selector works on, implemented by
//! the host records of [`crate::metadata`] and by the descriptors alike.

mod constructor;
mod event;
mod field;
mod method;
mod property;

use std::{fmt, hash::Hash, marker::PhantomData, sync::Arc};

pub use constructor::MutableConstructor;
pub use event::MutableEvent;
pub use field::MutableField;
pub use method::{AccessorBody, ExplicitBaseDefinition, MethodBody, MethodOrigin, MutableMethod};
pub use property::MutableProperty;

use crate::{
    metadata::{
        members::{Event, Field, Property},
        method::Method,
        signatures::SignatureParameter,
        token::Token,
    },
    model::MemberKind,
};

/// The reflection-level view of any member, real or modeled
pub trait MemberInfo {
    /// Identity of the member
    fn token(&self) -> Token;
    /// Member name
    fn name(&self) -> &str;
    /// Token of the type declaring the member
    fn declaring_token(&self) -> Token;
    /// Member is visible to everyone
    fn is_public(&self) -> bool;
    /// Member belongs to the type rather than to instances
    fn is_static(&self) -> bool;
}

/// Members with a parameter list that overload resolution can look at
pub trait Parameterized {
    /// The parameter types, in order
    fn parameters(&self) -> &[SignatureParameter];
}

/// A descriptor stored in a [`crate::model::MemberCollection`]
pub trait MutableMember: MemberInfo {
    /// The host record an existing member wraps
    type Original: MemberInfo;
    /// Kind tag used in error messages
    const KIND: MemberKind;

    /// The wrapped original member, `None` for added members
    fn original(&self) -> Option<&Arc<Self::Original>>;

    /// Member wraps a member of the original type
    fn is_existing(&self) -> bool {
        self.original().is_some()
    }
}

/// Stable handle of a member inside one type model
///
/// Ids are only meaningful for the model that handed them out; passing an id to another model
/// fails with [`crate::Error::MemberNotFound`].
pub struct MemberId<M> {
    owner: Token,
    index: u32,
    _kind: PhantomData<fn() -> M>,
}

impl<M> MemberId<M> {
    pub(crate) fn new(owner: Token, index: usize) -> Self {
        MemberId {
            owner,
            index: index as u32,
            _kind: PhantomData,
        }
    }

    /// Token of the model that owns the member
    #[must_use]
    pub fn owner(&self) -> Token {
        self.owner
    }

    /// Position of the member in its collection (existing members first)
    #[must_use]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl<M> Clone for MemberId<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for MemberId<M> {}

impl<M> PartialEq for MemberId<M> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.index == other.index
    }
}

impl<M> Eq for MemberId<M> {}

impl<M> Hash for MemberId<M> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.index.hash(state);
    }
}

impl<M> fmt::Debug for MemberId<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberId({}#{})", self.owner, self.index)
    }
}

/// Id of a [`MutableField`]
pub type FieldId = MemberId<MutableField>;
/// Id of a [`MutableConstructor`]
pub type ConstructorId = MemberId<MutableConstructor>;
/// Id of a [`MutableMethod`]
pub type MethodId = MemberId<MutableMethod>;
/// Id of a [`MutableProperty`]
pub type PropertyId = MemberId<MutableProperty>;
/// Id of a [`MutableEvent`]
pub type EventId = MemberId<MutableEvent>;

/// A member returned by a type model query: either declared by the model (existing or added)
/// or inherited from an ancestor of the original type
pub enum MemberEntry<'a, M, H> {
    /// Declared by the model
    Declared(MemberId<M>, &'a M),
    /// Inherited, not overridden by the model
    Inherited(&'a Arc<H>),
}

impl<M, H> Clone for MemberEntry<'_, M, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, H> Copy for MemberEntry<'_, M, H> {}

impl<'a, M, H> MemberEntry<'a, M, H> {
    /// The id of a declared member
    #[must_use]
    pub fn declared_id(&self) -> Option<MemberId<M>> {
        match self {
            MemberEntry::Declared(id, _) => Some(*id),
            MemberEntry::Inherited(_) => None,
        }
    }

    /// The descriptor of a declared member
    #[must_use]
    pub fn as_declared(&self) -> Option<&'a M> {
        match self {
            MemberEntry::Declared(_, member) => Some(member),
            MemberEntry::Inherited(_) => None,
        }
    }

    /// The host record of an inherited member
    #[must_use]
    pub fn as_inherited(&self) -> Option<&'a Arc<H>> {
        match self {
            MemberEntry::Declared(..) => None,
            MemberEntry::Inherited(member) => Some(member),
        }
    }
}

impl<M: MemberInfo, H: MemberInfo> MemberInfo for MemberEntry<'_, M, H> {
    fn token(&self) -> Token {
        match self {
            MemberEntry::Declared(_, member) => member.token(),
            MemberEntry::Inherited(member) => member.token(),
        }
    }

    fn name(&self) -> &str {
        match self {
            MemberEntry::Declared(_, member) => member.name(),
            MemberEntry::Inherited(member) => member.name(),
        }
    }

    fn declaring_token(&self) -> Token {
        match self {
            MemberEntry::Declared(_, member) => member.declaring_token(),
            MemberEntry::Inherited(member) => member.declaring_token(),
        }
    }

    fn is_public(&self) -> bool {
        match self {
            MemberEntry::Declared(_, member) => member.is_public(),
            MemberEntry::Inherited(member) => member.is_public(),
        }
    }

    fn is_static(&self) -> bool {
        match self {
            MemberEntry::Declared(_, member) => member.is_static(),
            MemberEntry::Inherited(member) => member.is_static(),
        }
    }
}

impl<M: Parameterized, H: Parameterized> Parameterized for MemberEntry<'_, M, H> {
    fn parameters(&self) -> &[SignatureParameter] {
        match self {
            MemberEntry::Declared(_, member) => member.parameters(),
            MemberEntry::Inherited(member) => member.parameters(),
        }
    }
}

impl<M: fmt::Debug, H: MemberInfo> fmt::Debug for MemberEntry<'_, M, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberEntry::Declared(id, member) => {
                f.debug_tuple("Declared").field(id).field(member).finish()
            }
            MemberEntry::Inherited(member) => f
                .debug_tuple("Inherited")
                .field(&member.name())
                .field(&member.token())
                .finish(),
        }
    }
}

impl<T: MemberInfo + ?Sized> MemberInfo for &T {
    fn token(&self) -> Token {
        (**self).token()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn declaring_token(&self) -> Token {
        (**self).declaring_token()
    }

    fn is_public(&self) -> bool {
        (**self).is_public()
    }

    fn is_static(&self) -> bool {
        (**self).is_static()
    }
}

impl<T: MemberInfo + ?Sized> MemberInfo for Arc<T> {
    fn token(&self) -> Token {
        (**self).token()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn declaring_token(&self) -> Token {
        (**self).declaring_token()
    }

    fn is_public(&self) -> bool {
        (**self).is_public()
    }

    fn is_static(&self) -> bool {
        (**self).is_static()
    }
}

impl<T: Parameterized + ?Sized> Parameterized for &T {
    fn parameters(&self) -> &[SignatureParameter] {
        (**self).parameters()
    }
}

impl<T: Parameterized + ?Sized> Parameterized for Arc<T> {
    fn parameters(&self) -> &[SignatureParameter] {
        (**self).parameters()
    }
}

impl MemberInfo for Method {
    fn token(&self) -> Token {
        self.token
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_token(&self) -> Token {
        Method::declaring_token(self)
    }

    fn is_public(&self) -> bool {
        Method::is_public(self)
    }

    fn is_static(&self) -> bool {
        Method::is_static(self)
    }
}

impl Parameterized for Method {
    fn parameters(&self) -> &[SignatureParameter] {
        &self.signature.params
    }
}

impl MemberInfo for Field {
    fn token(&self) -> Token {
        self.token
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_token(&self) -> Token {
        Field::declaring_token(self)
    }

    fn is_public(&self) -> bool {
        Field::is_public(self)
    }

    fn is_static(&self) -> bool {
        Field::is_static(self)
    }
}

impl MemberInfo for Property {
    fn token(&self) -> Token {
        self.token
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_token(&self) -> Token {
        Property::declaring_token(self)
    }

    fn is_public(&self) -> bool {
        Property::is_public(self)
    }

    fn is_static(&self) -> bool {
        Property::is_static(self)
    }
}

impl Parameterized for Property {
    fn parameters(&self) -> &[SignatureParameter] {
        &self.signature.params
    }
}

impl MemberInfo for Event {
    fn token(&self) -> Token {
        self.token
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_token(&self) -> Token {
        Event::declaring_token(self)
    }

    fn is_public(&self) -> bool {
        Event::is_public(self)
    }

    fn is_static(&self) -> bool {
        Event::is_static(self)
    }
}
