//! The host type system that existing types are captured from.
//!
//! This module provides an in-memory representation of .NET types: classes, interfaces,
//! value types and the constructed flavors (arrays, pointers, generic parameters). It plays
//! the part of the platform's reflection system for the deferred type model: snapshots are
//! captured from [`CilType`] instances, and the original interface mappings of a type are
//! computed by the [`HostInterfaceMapProvider`].
//!
//! # Key Components
//!
//! - [`CilType`]: An immutable host type with its declared members
//! - [`TypeRegistry`]: Central registry for all types, pre-populated with the core types
//! - [`TypeBuilder`] / [`MethodBuilder`]: Builder pattern for constructing host types
//! - [`InterfaceMapProvider`] / [`HostInterfaceMapProvider`]: Interface mappings of host types
//! - [`TypeAttributes`]: Raw type flag constants
//!
//! # Examples
//!
//! ```rust
//! use dotweave::metadata::typesystem::{TypeBuilder, TypeRegistry};
//!
//! let registry = TypeRegistry::new()?;
//! let widget = TypeBuilder::new(&registry)
//!     .class("Demo", "Widget")
//!     .default_constructor()
//!     .build()?;
//!
//! assert_eq!(widget.fullname(), "Demo.Widget");
//! assert_eq!(widget.base().map(|b| b.fullname()).as_deref(), Some("System.Object"));
//! assert!(registry.get_by_fullname("Demo.Widget").is_some());
//! # Ok::<(), dotweave::Error>(())
//! ```

mod base;
mod builder;
mod interfacemap;
mod registry;

use std::sync::Arc;

use rustc_hash::FxHashSet;

pub use base::{CilFlavor, CilTypeRef, CilTypeRefList, MethodImpl};
pub use builder::{MethodBuilder, TypeBuilder};
pub use interfacemap::{HostInterfaceMapProvider, InterfaceMapProvider, InterfaceMethodMapping};
pub use registry::TypeRegistry;

use crate::{
    metadata::{
        customattributes::CustomAttributeValueList,
        members::{FieldList, PropertyList, EventList},
        method::{MethodList, MethodRc},
        token::Token,
    },
    Error::RecursionLimit,
    Result,
};

/// A vector that holds a list of `CilType`
pub type CilTypeList = Vec<CilTypeRc>;
/// Reference to a `CilType`
pub type CilTypeRc = Arc<CilType>;

/// Full name of the root of every class hierarchy
pub const SYSTEM_OBJECT: &str = "System.Object";
/// Full name of the base of all value types
pub const SYSTEM_VALUE_TYPE: &str = "System.ValueType";
/// Full name of the base of all enumerations
pub const SYSTEM_ENUM: &str = "System.Enum";
/// Full name of the base of all delegates
pub const SYSTEM_DELEGATE: &str = "System.Delegate";
/// Full name of the base of all multicast delegates
pub const SYSTEM_MULTICAST_DELEGATE: &str = "System.MulticastDelegate";

#[allow(non_snake_case)]
/// All possible flags for `TypeAttributes`
pub mod TypeAttributes {
    /// Use this mask to retrieve visibility information
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Class has no public scope
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Class has public scope
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Class is nested with public visibility
    pub const NESTED_PUBLIC: u32 = 0x0000_0002;
    /// Class is nested with private visibility
    pub const NESTED_PRIVATE: u32 = 0x0000_0003;
    /// Class is nested with family visibility
    pub const NESTED_FAMILY: u32 = 0x0000_0004;
    /// Class is nested with assembly visibility
    pub const NESTED_ASSEMBLY: u32 = 0x0000_0005;
    /// Class is nested with family and assembly visibility
    pub const NESTED_FAM_AND_ASSEM: u32 = 0x0000_0006;
    /// Class is nested with family or assembly visibility
    pub const NESTED_FAM_OR_ASSEM: u32 = 0x0000_0007;
    /// Class fields are laid out sequentially
    pub const SEQUENTIAL_LAYOUT: u32 = 0x0000_0008;
    /// Layout is supplied explicitly
    pub const EXPLICIT_LAYOUT: u32 = 0x0000_0010;
    /// Type is an interface
    pub const INTERFACE: u32 = 0x0000_0020;
    /// Class is abstract
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// Class cannot be extended
    pub const SEALED: u32 = 0x0000_0100;
    /// Class name is special
    pub const SPECIAL_NAME: u32 = 0x0000_0400;
    /// Class is serializable
    pub const SERIALIZABLE: u32 = 0x0000_2000;
    /// Initialize the class before first static field access
    pub const BEFORE_FIELD_INIT: u32 = 0x0010_0000;
    /// CLI provides 'special' behavior, depending upon the name of the Type
    pub const RTSPECIAL_NAME: u32 = 0x0000_0800;
}

/// Represents a 'Type' of the host universe: its identity, shape and declared members.
///
/// A `CilType` is immutable once built. The base type and the implemented interfaces are strong
/// references, so a type keeps its ancestors alive; members point back to their declaring type
/// through weak references.
pub struct CilType {
    /// Token
    pub token: Token,
    /// `TypeNamespace` (can be empty)
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// The `TypeFlavor`
    pub flavor: CilFlavor,
    /// Flags (a 4-byte bitmask of type `TypeAttributes`, §II.23.1.15)
    pub flags: u32,
    /// This types base aka 'extends'
    base: Option<CilTypeRc>,
    /// All interfaces this type declares to implement directly
    pub interfaces: CilTypeList,
    /// All fields this type declares
    pub fields: FieldList,
    /// All methods this type declares, constructors included
    pub methods: MethodList,
    /// All properties this type declares
    pub properties: PropertyList,
    /// All events this type declares
    pub events: EventList,
    /// Explicit method implementations of this type
    pub overrides: Vec<MethodImpl>,
    /// Number of generic parameters of the type definition
    pub generic_param_count: u32,
    /// All custom attributes this type has
    pub custom_attributes: CustomAttributeValueList,
}

impl CilType {
    /// Create a new instance of a `CilType` without members
    pub fn new(
        token: Token,
        namespace: impl Into<String>,
        name: impl Into<String>,
        flavor: CilFlavor,
        flags: u32,
        base: Option<CilTypeRc>,
    ) -> Self {
        CilType {
            token,
            namespace: namespace.into(),
            name: name.into(),
            flavor,
            flags,
            base,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            overrides: Vec::new(),
            generic_param_count: 0,
            custom_attributes: Vec::new(),
        }
    }

    /// Access the base type of this type, if it exists
    #[must_use]
    pub fn base(&self) -> Option<CilTypeRc> {
        self.base.clone()
    }

    /// Returns the full name (Namespace.Name) of the entity
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// Iterate over all ancestors, nearest first (the type itself is not included)
    pub fn ancestors(&self) -> impl Iterator<Item = CilTypeRc> {
        std::iter::successors(self.base(), |ty| ty.base())
    }

    /// The type itself followed by all its ancestors, nearest first
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the chain is longer than `max_depth`.
    pub fn hierarchy(self: &Arc<Self>, max_depth: usize) -> Result<CilTypeList> {
        let mut chain = vec![self.clone()];
        for ancestor in self.ancestors() {
            if chain.len() >= max_depth {
                return Err(RecursionLimit(max_depth));
            }
            chain.push(ancestor);
        }
        Ok(chain)
    }

    /// Type is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flavor == CilFlavor::Interface || self.flags & TypeAttributes::INTERFACE != 0
    }

    /// Type is sealed
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.flags & TypeAttributes::SEALED != 0
    }

    /// Type is declared abstract
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags & TypeAttributes::ABSTRACT != 0
    }

    /// Type is a value type: a struct or enum deriving from `System.ValueType`.
    /// `System.ValueType` and `System.Enum` themselves are classes.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        if self.flavor.is_value_type() {
            return true;
        }
        let name = self.fullname();
        if name == SYSTEM_ENUM {
            return false;
        }
        self.ancestors()
            .any(|ancestor| ancestor.fullname() == SYSTEM_VALUE_TYPE)
    }

    /// Type is a concrete delegate type deriving from `System.Delegate`
    #[must_use]
    pub fn is_delegate(&self) -> bool {
        let name = self.fullname();
        if name == SYSTEM_MULTICAST_DELEGATE {
            return false;
        }
        self.ancestors()
            .any(|ancestor| ancestor.fullname() == SYSTEM_DELEGATE)
    }

    /// Type is a generic type definition with unbound parameters
    #[must_use]
    pub fn is_generic_definition(&self) -> bool {
        self.generic_param_count > 0 && self.flavor != CilFlavor::GenericInstance
    }

    /// Check if this type derives (directly or indirectly) from `other`
    #[must_use]
    pub fn is_subclass_of(&self, other: &CilType) -> bool {
        self.ancestors().any(|ancestor| ancestor.token == other.token)
    }

    /// All interfaces implemented by this type: the declared ones, those inherited from
    /// ancestors and those extended by other interfaces. Each interface appears once, in
    /// discovery order starting with the type's own declarations.
    #[must_use]
    pub fn all_interfaces(&self) -> CilTypeList {
        let mut seen = FxHashSet::default();
        let mut result = Vec::new();

        let mut pending: Vec<CilTypeRc> = Vec::new();
        let levels = std::iter::once(self.interfaces.clone())
            .chain(self.ancestors().map(|ancestor| ancestor.interfaces.clone()));
        for declared in levels {
            pending.extend(declared.into_iter().rev());
            while let Some(interface) = pending.pop() {
                if seen.insert(interface.token) {
                    pending.extend(interface.interfaces.iter().rev().cloned());
                    result.push(interface);
                }
            }
        }

        result
    }

    /// Check if the type implements the given interface (directly or inherited)
    #[must_use]
    pub fn implements(&self, interface: &CilType) -> bool {
        self.all_interfaces()
            .iter()
            .any(|candidate| candidate.token == interface.token)
    }

    /// The first method declared by this type with the given name
    #[must_use]
    pub fn method_by_name(&self, name: &str) -> Option<MethodRc> {
        self.methods.iter().find(|method| method.name == name).cloned()
    }

    /// All instance constructors declared by this type
    pub fn constructors(&self) -> impl Iterator<Item = &MethodRc> {
        self.methods
            .iter()
            .filter(|method| method.is_constructor() && !method.is_static())
    }
}

impl std::fmt::Debug for CilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CilType")
            .field("token", &self.token)
            .field("fullname", &self.fullname())
            .field("flavor", &self.flavor)
            .field("flags", &format_args!("0x{:08x}", self.flags))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestUniverse;

    #[test]
    fn test_core_type_classification() {
        let universe = TestUniverse::new();
        let registry = &universe.registry;

        let value_type = registry.get_by_fullname(SYSTEM_VALUE_TYPE).unwrap();
        let enum_type = registry.get_by_fullname(SYSTEM_ENUM).unwrap();
        let delegate = registry.get_by_fullname(SYSTEM_DELEGATE).unwrap();
        let multicast = registry.get_by_fullname(SYSTEM_MULTICAST_DELEGATE).unwrap();

        assert!(!value_type.is_value_type());
        assert!(!enum_type.is_value_type());
        assert!(!delegate.is_delegate());
        assert!(!multicast.is_delegate());

        assert!(universe.point.is_value_type());
        assert!(universe.handler.is_delegate());
        assert!(!universe.shape.is_value_type());
        assert!(!universe.shape.is_delegate());
    }

    #[test]
    fn test_hierarchy() {
        let universe = TestUniverse::new();
        let chain = universe.circle.hierarchy(16).unwrap();
        let names: Vec<_> = chain.iter().map(|t| t.fullname()).collect();
        assert_eq!(names, vec!["Demo.Circle", "Demo.Shape", "System.Object"]);

        assert!(matches!(
            universe.circle.hierarchy(2),
            Err(crate::Error::RecursionLimit(2))
        ));
        assert!(universe.circle.is_subclass_of(&universe.shape));
        assert!(!universe.shape.is_subclass_of(&universe.circle));
    }

    #[test]
    fn test_all_interfaces_inherited() {
        let universe = TestUniverse::new();
        // Resource implements IDisposable; ManagedResource inherits it
        let interfaces = universe.managed_resource.all_interfaces();
        assert_eq!(interfaces.len(), 1);
        assert!(universe.managed_resource.implements(&universe.disposable));
        assert!(!universe.shape.implements(&universe.disposable));
    }

    #[test]
    fn test_constructors() {
        let universe = TestUniverse::new();
        assert_eq!(universe.shape.constructors().count(), 1);
        assert!(universe.shape.method_by_name("Area").is_some());
        assert!(universe.shape.method_by_name("Missing").is_none());
    }
}
