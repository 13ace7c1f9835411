//! Structural signatures for methods, fields and properties.
//!
//! Signatures describe the shape of a member independently of its name. The deferred type
//! model compares members by "name + signature", which always means exact structural
//! equality of these records: no conversions, no variance, no overload ranking.
//!
//! # Signature Types
//!
//! - **Method Signatures** - Parameter types and return type ([`SignatureMethod`])
//! - **Field Signatures** - Field type ([`SignatureField`])
//! - **Property Signatures** - Property type and index parameters ([`SignatureProperty`])
//!
//! # Examples
//!
//! ```rust
//! use dotweave::metadata::signatures::{SignatureMethod, TypeSignature};
//!
//! let a = SignatureMethod::instance(TypeSignature::Void, vec![TypeSignature::I4]);
//! let b = SignatureMethod::instance(TypeSignature::Void, vec![TypeSignature::I4]);
//! let c = SignatureMethod::instance(TypeSignature::Void, vec![TypeSignature::String]);
//!
//! assert!(a.matches(&b));
//! assert!(!a.matches(&c));
//! assert_eq!(a.to_string(), "(int32)");
//! ```

mod types;

pub use types::*;
