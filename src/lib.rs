// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # dotweave
//!
//! A deferred, mutable type model that lets a caller describe how an existing .NET type
//! should be extended or changed, before any code is generated. New fields, constructors,
//! methods, properties and events, overrides of inherited virtual members and interface
//! implementations are all represented as a queryable model which mimics the semantics of
//! CLR reflection closely enough to stand in for a real type.
//!
//! ## Features
//!
//! - **📸 Snapshot capture** - Validates that a type can be extended and captures its shape once
//! - **🧩 Partitioned members** - Existing-declared, existing-inherited and added members per kind
//! - **🔍 Reflection-style queries** - `BindingFlags` filtering and ambiguity detection
//! - **🔗 Override resolution** - Root definitions, most-derived slots, explicit overrides
//! - **🗺️ Interface mapping** - Explicit, implicit and inherited satisfaction with partial maps
//! - **🛡️ Structural invariants** - Signature collisions, flag rules and final overrides rejected
//!
//! ## Quick Start
//!
//! ```rust
//! use dotweave::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let base = TypeBuilder::new(&registry)
//!     .class("Demo", "Shape")
//!     .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT)
//!     .default_constructor()
//!     .method(|m| m.name("Area").public().abstract_virtual().returns(TypeSignature::R8))
//!     .build()?;
//!
//! let mut model = TypeModel::new(&registry, &base)?;
//! assert!(model.is_abstract());
//!
//! let area = base.method_by_name("Area").unwrap();
//! let override_id = model.get_or_add_override(&area)?;
//! model.set_method_body(override_id, MethodBody::provided("return 42.0"))?;
//! assert!(!model.is_abstract());
//! # Ok::<(), dotweave::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - The host reflection universe: tokens, signatures, host types and members,
//!   the [`metadata::typesystem::TypeRegistry`] and its builders
//! - [`model`] - The deferred type model: snapshot capture, member selection, related-method
//!   lookup, member collections, interface mapping, the member factory and the
//!   [`model::TypeModel`] aggregate
//! - [`ModelConfig`] / [`ModelOptions`] - Configuration and injected collaborators
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate emits structured [`tracing`](https://docs.rs/tracing) events (`debug` for
//! structural mutations, `trace` for resolution details). No subscriber is installed.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotweave::prelude::*;
///
/// let registry = TypeRegistry::new()?;
/// assert_eq!(registry.object().fullname(), "System.Object");
/// # Ok::<(), dotweave::Error>(())
/// ```
pub mod prelude;

/// Configuration presets, member filters and injectable collaborators.
pub mod config;

/// The host reflection universe that existing types are captured from.
///
/// # Key Components
///
/// - [`metadata::token`] - Identity of types and members
/// - [`metadata::signatures`] - Method, field and property signatures
/// - [`metadata::method`] - Host methods and their attribute flags
/// - [`metadata::members`] - Host fields, properties and events
/// - [`metadata::customattributes`] - Custom attribute values
/// - [`metadata::typesystem`] - Host types, the registry and builders
pub mod metadata;

/// The deferred type model.
///
/// See [`model::TypeModel`] for the public mutation API.
pub mod model;

/// `dotweave` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotweave` Error type
///
/// See [`error::Error`](crate::Error) for the individual failure classes.
pub use error::Error;

pub use config::{MemberFilter, ModelConfig, ModelOptions, VisibilityMemberFilter};
