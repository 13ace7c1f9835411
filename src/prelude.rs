//! # dotweave Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotweave library. Import this module to get quick access to the host type
//! universe and the deferred type model.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotweave operations
pub use crate::Error;

/// The result type used throughout dotweave
pub use crate::Result;

/// Configuration and injectable collaborators
pub use crate::{MemberFilter, ModelConfig, ModelOptions, VisibilityMemberFilter};

// ================================================================================================
// Host Type Universe
// ================================================================================================

/// Metadata token type identifying types and members
pub use crate::metadata::token::{Token, TokenTable};

/// Host types, the registry and builders
pub use crate::metadata::typesystem::{
    CilFlavor, CilType, CilTypeList, CilTypeRc, HostInterfaceMapProvider, InterfaceMapProvider,
    MethodBuilder, TypeAttributes, TypeBuilder, TypeRegistry,
};

/// Host methods and their attribute groups
pub use crate::metadata::method::{
    Method, MethodAccessFlags, MethodAttributes, MethodList, MethodModifiers, MethodRc,
    MethodVtableFlags,
};

/// Host fields, properties and events
pub use crate::metadata::members::{
    Event, EventRc, Field, FieldAttributes, FieldRc, Property, PropertyRc,
};

/// Signatures
pub use crate::metadata::signatures::{
    SignatureField, SignatureMethod, SignatureParameter, SignatureProperty, TypeSignature,
};

/// Custom attribute values
pub use crate::metadata::customattributes::{CustomAttributeArgument, CustomAttributeValue};

// ================================================================================================
// Deferred Type Model
// ================================================================================================

/// The aggregate and its query results
pub use crate::model::{
    ConstructorEntry, EventEntry, FieldEntry, Initialization, MethodEntry, PropertyEntry,
    TypeModel, TypeSnapshot,
};

/// Member descriptors and their ids
pub use crate::model::{
    AccessorBody, ConstructorId, EventId, FieldId, MemberEntry, MemberInfo, MethodBody, MethodId,
    MethodOrigin, MutableConstructor, MutableEvent, MutableField, MutableMember, MutableMethod,
    MutableProperty, PropertyId,
};

/// Queries, interface mappings, attributes and emission
pub use crate::model::{
    AttributeTarget, BindingFlags, CustomAttributeDeclaration, InterfaceMapping, MethodTarget,
    OverloadResolver, TypeEmitter,
};
