//! The host type universe.
//!
//! Read-only descriptions of the types a model extends: tokens, signatures, methods, the
//! other member records, custom attributes and the registry that owns every type.
//!
//! # Key Components
//!
//! - [`typesystem`] - `CilType`, the `TypeRegistry` and the `TypeBuilder` used to populate it
//! - [`method`] - Method records and their attribute flags
//! - [`members`] - Field, property and event records
//! - [`signatures`] - Type, method, field and property signatures
//! - [`token`] - Metadata tokens identifying every type and member

/// Implementation of custom attribute values
pub mod customattributes;
/// Implementation of fields, properties and events declared by host types
pub mod members;
/// Implementation of host methods and their flags
pub mod method;
/// Implementation of method and type signatures
pub mod signatures;
/// Implementation of metadata tokens
pub mod token;
/// Implementation of the host type system
pub mod typesystem;
