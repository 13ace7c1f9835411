//! The deferred type model.
//!
//! A [`TypeModel`] describes how an existing type is going to be extended before any code is
//! emitted. It captures the existing type once ([`TypeSnapshot`]), partitions its members into
//! existing-declared, inherited and added ones ([`MemberCollection`]), answers
//! reflection-style queries ([`BindingFlags`]) and enforces the structural rules of the CLR
//! whenever something is added, overridden or implemented.
//!
//! # Key Components
//!
//! - [`TypeModel`]: The aggregate and its public mutation API
//! - [`TypeSnapshot`]: Validated, immutable capture of the existing type
//! - [`selector`]: Flag-based member filtering and ambiguity detection
//! - [`RelatedMethodFinder`]: Root definitions and most-derived virtual slots
//! - [`MemberCollection`]: Existing, inherited and added members of one kind
//! - [`InterfaceMapping`]: Interface methods and the members implementing them
//! - [`TypeEmitter`]: The hand-off to an emission backend
//!
//! # Examples
//!
//! ```rust
//! use dotweave::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let widget = TypeBuilder::new(&registry)
//!     .class("Demo", "Widget")
//!     .default_constructor()
//!     .build()?;
//!
//! let mut model = TypeModel::new(&registry, &widget)?;
//! let foo = SignatureMethod::instance(TypeSignature::Void, vec![TypeSignature::I4]);
//! model.add_method("Foo", MethodAttributes::public(), foo.clone(), Some(MethodBody::provided("foo")))?;
//!
//! // The same name and signature cannot be added twice
//! assert!(matches!(
//!     model.add_method("Foo", MethodAttributes::public(), foo, Some(MethodBody::provided("foo"))),
//!     Err(Error::SignatureCollision { .. })
//! ));
//! # Ok::<(), dotweave::Error>(())
//! ```

mod attributes;
mod collection;
mod emit;
mod factory;
mod interfacemap;
mod members;
mod related;
pub mod selector;
mod snapshot;
mod typemodel;

pub use attributes::{AttributeContainer, AttributeTarget, CustomAttributeDeclaration};
pub use collection::MemberCollection;
pub use emit::TypeEmitter;
pub use interfacemap::{InterfaceMapping, InterfaceMappingEntry, MethodTarget};
pub use members::{
    AccessorBody, ConstructorId, EventId, ExplicitBaseDefinition, FieldId, MemberEntry, MemberId,
    MemberInfo, MethodBody, MethodId, MethodOrigin, MutableConstructor, MutableEvent,
    MutableField, MutableMember, MutableMethod, MutableProperty, Parameterized, PropertyId,
};
pub use related::RelatedMethodFinder;
pub use selector::{BindingFlags, ExactSignatureResolver, OverloadResolver};
pub use snapshot::TypeSnapshot;
pub use typemodel::{
    ConstructorEntry, EventEntry, FieldEntry, Initialization, MethodEntry, NestedTypeDeclaration,
    PropertyEntry, TypeModel,
};

/// The kinds of members a type model holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum MemberKind {
    /// A field
    Field,
    /// An instance constructor or the type initializer
    Constructor,
    /// A method
    Method,
    /// A property
    Property,
    /// An event
    Event,
    /// A nested type
    #[strum(to_string = "Nested type")]
    NestedType,
}
