//! Builder for host types.
//!
//! This module provides the [`TypeBuilder`] struct, which offers a fluent API for constructing
//! classes, interfaces, value types and delegates together with their members, and registering
//! them in a [`TypeRegistry`]. Methods are described through a [`MethodBuilder`].
//!
//! # Example
//!
//! ```rust
//! use dotweave::metadata::{
//!     signatures::TypeSignature,
//!     typesystem::{TypeBuilder, TypeRegistry},
//! };
//!
//! let registry = TypeRegistry::new()?;
//! let disposable = TypeBuilder::new(&registry)
//!     .interface("System", "IDisposable")
//!     .method(|m| m.name("Dispose").public().abstract_virtual())
//!     .build()?;
//!
//! let resource = TypeBuilder::new(&registry)
//!     .class("Demo", "Resource")
//!     .implements(&disposable)
//!     .default_constructor()
//!     .method(|m| m.name("Dispose").public().virtual_method())
//!     .property("Handle", TypeSignature::I, Some("get_Handle"), None)
//!     .method(|m| m.name("get_Handle").public().special_name().returns(TypeSignature::I))
//!     .build()?;
//!
//! assert!(resource.implements(&disposable));
//! assert_eq!(resource.properties.len(), 1);
//! # Ok::<(), dotweave::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    metadata::{
        customattributes::CustomAttributeValue,
        members::{Event, Field, Property},
        method::{
            Method, MethodAccessFlags, MethodAttributes, MethodModifiers, MethodRc,
            MethodVtableFlags, CONSTRUCTOR_NAME, TYPE_INITIALIZER_NAME,
        },
        signatures::{SignatureField, SignatureMethod, SignatureProperty, TypeSignature},
        token::TokenTable,
        typesystem::{CilFlavor, CilType, CilTypeRc, MethodImpl, TypeAttributes, TypeRegistry},
    },
    Result,
};

/// Fluent description of a single host method
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: String,
    attributes: MethodAttributes,
    return_type: TypeSignature,
    params: Vec<TypeSignature>,
}

impl Default for MethodBuilder {
    fn default() -> Self {
        MethodBuilder {
            name: String::new(),
            attributes: MethodAttributes::public(),
            return_type: TypeSignature::Void,
            params: Vec::new(),
        }
    }
}

impl MethodBuilder {
    /// A public, non-virtual instance method returning void
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the visibility
    #[must_use]
    pub fn access(mut self, access: MethodAccessFlags) -> Self {
        self.attributes.access = access;
        self
    }

    /// Make the method public
    #[must_use]
    pub fn public(self) -> Self {
        self.access(MethodAccessFlags::PUBLIC)
    }

    /// Make the method private
    #[must_use]
    pub fn private(self) -> Self {
        self.access(MethodAccessFlags::PRIVATE)
    }

    /// Make the method protected
    #[must_use]
    pub fn family(self) -> Self {
        self.access(MethodAccessFlags::FAMILY)
    }

    /// Make the method internal
    #[must_use]
    pub fn assembly(self) -> Self {
        self.access(MethodAccessFlags::ASSEM)
    }

    /// Add raw modifiers
    #[must_use]
    pub fn modifiers(mut self, modifiers: MethodModifiers) -> Self {
        self.attributes.modifiers |= modifiers;
        self
    }

    /// Introduce a new virtual slot (C# `virtual`)
    #[must_use]
    pub fn virtual_method(mut self) -> Self {
        self.attributes.vtable = MethodVtableFlags::NEW_SLOT;
        self.modifiers(MethodModifiers::VIRTUAL)
    }

    /// Introduce a new abstract slot (C# `abstract`, or an interface method)
    #[must_use]
    pub fn abstract_virtual(self) -> Self {
        self.virtual_method().modifiers(MethodModifiers::ABSTRACT)
    }

    /// Override an inherited slot (C# `override`)
    #[must_use]
    pub fn override_method(mut self) -> Self {
        self.attributes.vtable = MethodVtableFlags::REUSE_SLOT;
        self.modifiers(MethodModifiers::VIRTUAL)
    }

    /// Forbid further overrides (C# `sealed`)
    #[must_use]
    pub fn sealed(self) -> Self {
        self.modifiers(MethodModifiers::FINAL)
    }

    /// Make the method static
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.attributes.modifiers.remove(MethodModifiers::VIRTUAL);
        self.modifiers(MethodModifiers::STATIC)
    }

    /// Mark the method as special name (property and event accessors)
    #[must_use]
    pub fn special_name(self) -> Self {
        self.modifiers(MethodModifiers::SPECIAL_NAME)
    }

    /// Set the return type
    #[must_use]
    pub fn returns(mut self, return_type: TypeSignature) -> Self {
        self.return_type = return_type;
        self
    }

    /// Append a parameter
    #[must_use]
    pub fn param(mut self, param: TypeSignature) -> Self {
        self.params.push(param);
        self
    }

    /// Replace the parameter list
    #[must_use]
    pub fn params(mut self, params: Vec<TypeSignature>) -> Self {
        self.params = params;
        self
    }

    fn signature(&self) -> SignatureMethod {
        if self.attributes.is_static() {
            SignatureMethod::new_static(self.return_type.clone(), self.params.clone())
        } else {
            SignatureMethod::instance(self.return_type.clone(), self.params.clone())
        }
    }
}

struct PropertyDecl {
    name: String,
    property_type: TypeSignature,
    getter: Option<String>,
    setter: Option<String>,
}

struct EventDecl {
    name: String,
    handler: TypeSignature,
    adder: String,
    remover: String,
}

/// Provides a fluent API for building and registering host types
pub struct TypeBuilder<'a> {
    /// Type registry for storing the types
    registry: &'a TypeRegistry,
    namespace: String,
    name: String,
    flavor: CilFlavor,
    flags: u32,
    base: Option<CilTypeRc>,
    interfaces: Vec<CilTypeRc>,
    fields: Vec<(String, u32, TypeSignature)>,
    methods: Vec<MethodBuilder>,
    properties: Vec<PropertyDecl>,
    events: Vec<EventDecl>,
    method_impls: Vec<(MethodRc, String)>,
    generic_param_count: u32,
    custom_attributes: Vec<CustomAttributeValue>,
}

impl<'a> TypeBuilder<'a> {
    /// Create a new builder with the given registry
    ///
    /// ## Arguments
    /// * 'registry' - The type registry to use
    pub fn new(registry: &'a TypeRegistry) -> Self {
        TypeBuilder {
            registry,
            namespace: String::new(),
            name: String::new(),
            flavor: CilFlavor::Class,
            flags: TypeAttributes::PUBLIC,
            base: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            method_impls: Vec::new(),
            generic_param_count: 0,
            custom_attributes: Vec::new(),
        }
    }

    /// Start building a public class deriving from `System.Object`
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace for a class type
    /// * 'name'      - Name for a class type
    #[must_use]
    pub fn class(mut self, namespace: &str, name: &str) -> Self {
        self.namespace = namespace.to_string();
        self.name = name.to_string();
        self.flavor = CilFlavor::Class;
        self.flags = TypeAttributes::PUBLIC;
        self
    }

    /// Start building a public sealed struct deriving from `System.ValueType`
    #[must_use]
    pub fn value_type(mut self, namespace: &str, name: &str) -> Self {
        self.namespace = namespace.to_string();
        self.name = name.to_string();
        self.flavor = CilFlavor::ValueType;
        self.flags = TypeAttributes::PUBLIC | TypeAttributes::SEALED;
        self.base = self.registry.value_type();
        self
    }

    /// Start building a public interface
    #[must_use]
    pub fn interface(mut self, namespace: &str, name: &str) -> Self {
        self.namespace = namespace.to_string();
        self.name = name.to_string();
        self.flavor = CilFlavor::Interface;
        self.flags = TypeAttributes::PUBLIC | TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT;
        self
    }

    /// Start building a public sealed delegate type deriving from `System.MulticastDelegate`
    #[must_use]
    pub fn delegate(mut self, namespace: &str, name: &str) -> Self {
        self.namespace = namespace.to_string();
        self.name = name.to_string();
        self.flavor = CilFlavor::Class;
        self.flags = TypeAttributes::PUBLIC | TypeAttributes::SEALED;
        self.base = self.registry.multicast_delegate();
        self
    }

    /// Replace the flavor (arrays, pointers, generic parameters and instances)
    #[must_use]
    pub fn flavor(mut self, flavor: CilFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Replace the `TypeAttributes` flags
    #[must_use]
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Set the base type
    #[must_use]
    pub fn extends(mut self, base: &CilTypeRc) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Declare an implemented interface
    #[must_use]
    pub fn implements(mut self, interface: &CilTypeRc) -> Self {
        self.interfaces.push(interface.clone());
        self
    }

    /// Declare the number of generic parameters of a type definition
    #[must_use]
    pub fn generic_params(mut self, count: u32) -> Self {
        self.generic_param_count = count;
        self
    }

    /// Add a public parameterless instance constructor
    #[must_use]
    pub fn default_constructor(self) -> Self {
        self.constructor(MethodAccessFlags::PUBLIC, vec![])
    }

    /// Add an instance constructor
    #[must_use]
    pub fn constructor(self, access: MethodAccessFlags, params: Vec<TypeSignature>) -> Self {
        self.method(|m| {
            m.name(CONSTRUCTOR_NAME)
                .access(access)
                .modifiers(MethodModifiers::SPECIAL_NAME | MethodModifiers::RTSPECIAL_NAME)
                .params(params)
        })
    }

    /// Add a type initializer
    #[must_use]
    pub fn type_initializer(self) -> Self {
        self.method(|m| {
            m.name(TYPE_INITIALIZER_NAME)
                .private()
                .static_method()
                .modifiers(MethodModifiers::SPECIAL_NAME | MethodModifiers::RTSPECIAL_NAME)
        })
    }

    /// Add a method described by the closure
    #[must_use]
    pub fn method(mut self, describe: impl FnOnce(MethodBuilder) -> MethodBuilder) -> Self {
        self.methods.push(describe(MethodBuilder::new()));
        self
    }

    /// Add a field
    #[must_use]
    pub fn field(mut self, name: &str, flags: u32, field_type: TypeSignature) -> Self {
        self.fields.push((name.to_string(), flags, field_type));
        self
    }

    /// Add a property whose accessors are methods of this builder, referenced by name
    #[must_use]
    pub fn property(
        mut self,
        name: &str,
        property_type: TypeSignature,
        getter: Option<&str>,
        setter: Option<&str>,
    ) -> Self {
        self.properties.push(PropertyDecl {
            name: name.to_string(),
            property_type,
            getter: getter.map(str::to_string),
            setter: setter.map(str::to_string),
        });
        self
    }

    /// Add an event whose accessors are methods of this builder, referenced by name
    #[must_use]
    pub fn event(mut self, name: &str, handler: TypeSignature, adder: &str, remover: &str) -> Self {
        self.events.push(EventDecl {
            name: name.to_string(),
            handler,
            adder: adder.to_string(),
            remover: remover.to_string(),
        });
        self
    }

    /// Declare that the method named `body` explicitly implements `declaration`
    #[must_use]
    pub fn method_impl(mut self, declaration: &MethodRc, body: &str) -> Self {
        self.method_impls.push((declaration.clone(), body.to_string()));
        self
    }

    /// Attach a custom attribute
    #[must_use]
    pub fn custom_attribute(mut self, value: CustomAttributeValue) -> Self {
        self.custom_attributes.push(value);
        self
    }

    /// Build the type, attach all members and register it
    ///
    /// # Errors
    /// Returns an error if an accessor or method impl references an unknown method, or if the
    /// type cannot be registered.
    pub fn build(self) -> Result<CilTypeRc> {
        if self.name.is_empty() {
            return Err(malformed_error!("Type without a name cannot be built"));
        }

        let base = match (&self.base, &self.flavor) {
            (Some(base), _) => Some(base.clone()),
            (None, CilFlavor::Interface) => None,
            (None, _) => Some(self.registry.object()),
        };

        let mut new_type = CilType::new(
            self.registry.allocate_token(TokenTable::TYPE_DEF),
            self.namespace.clone(),
            self.name.clone(),
            self.flavor.clone(),
            self.flags,
            base,
        );
        new_type.interfaces = self.interfaces.clone();
        new_type.generic_param_count = self.generic_param_count;
        new_type.custom_attributes = self.custom_attributes.into_iter().map(Arc::new).collect();

        new_type.methods = self
            .methods
            .iter()
            .map(|method| {
                Arc::new(Method::new(
                    self.registry.allocate_token(TokenTable::METHOD_DEF),
                    method.name.clone(),
                    method.attributes,
                    method.signature(),
                ))
            })
            .collect();

        new_type.fields = self
            .fields
            .iter()
            .map(|(name, flags, field_type)| {
                Arc::new(Field::new(
                    self.registry.allocate_token(TokenTable::FIELD),
                    name.clone(),
                    *flags,
                    SignatureField::new(field_type.clone()),
                ))
            })
            .collect();

        let find = |name: &str| -> Result<MethodRc> {
            new_type
                .methods
                .iter()
                .find(|method| method.name == name)
                .cloned()
                .ok_or_else(|| {
                    malformed_error!("Method '{}' is not declared by '{}'", name, self.name)
                })
        };

        let mut properties = Vec::with_capacity(self.properties.len());
        for decl in &self.properties {
            let getter = decl.getter.as_deref().map(&find).transpose()?;
            let setter = decl.setter.as_deref().map(&find).transpose()?;
            let has_this = getter
                .iter()
                .chain(setter.iter())
                .all(|accessor| !accessor.is_static());
            properties.push(Arc::new(Property::new(
                self.registry.allocate_token(TokenTable::PROPERTY),
                decl.name.clone(),
                0,
                SignatureProperty {
                    has_this,
                    base: decl.property_type.clone(),
                    params: Vec::new(),
                },
                getter,
                setter,
            )));
        }

        let mut events = Vec::with_capacity(self.events.len());
        for decl in &self.events {
            events.push(Arc::new(Event::new(
                self.registry.allocate_token(TokenTable::EVENT),
                decl.name.clone(),
                0,
                decl.handler.clone(),
                find(&decl.adder)?,
                find(&decl.remover)?,
                None,
            )));
        }

        let mut overrides = Vec::with_capacity(self.method_impls.len());
        for (declaration, body) in &self.method_impls {
            overrides.push(MethodImpl {
                declaration: declaration.clone(),
                body: find(body)?,
            });
        }

        new_type.properties = properties;
        new_type.events = events;
        new_type.overrides = overrides;

        let new_type = Arc::new(new_type);
        for method in &new_type.methods {
            method.set_declaring_type(&new_type)?;
        }
        for field in &new_type.fields {
            field.set_declaring_type(&new_type)?;
        }
        for property in &new_type.properties {
            property.set_declaring_type(&new_type)?;
        }
        for event in &new_type.events {
            event.set_declaring_type(&new_type)?;
        }

        self.registry.insert(&new_type)?;
        Ok(new_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::members::FieldAttributes;

    #[test]
    fn test_build_class() {
        let registry = TypeRegistry::new().unwrap();
        let widget = TypeBuilder::new(&registry)
            .class("Demo", "Widget")
            .default_constructor()
            .field("count", FieldAttributes::PRIVATE, TypeSignature::I4)
            .method(|m| m.name("Draw").public().virtual_method().param(TypeSignature::I4))
            .build()
            .unwrap();

        assert_eq!(widget.base().unwrap().fullname(), "System.Object");
        assert_eq!(widget.methods.len(), 2);
        assert_eq!(widget.fields[0].declaring_token(), widget.token);

        let draw = widget.method_by_name("Draw").unwrap();
        assert!(draw.is_virtual());
        assert!(draw.is_new_slot());
        assert_eq!(draw.signature.to_string(), "(int32)");
        assert_eq!(draw.declaring_token(), widget.token);
    }

    #[test]
    fn test_build_interface_has_no_base() {
        let registry = TypeRegistry::new().unwrap();
        let runnable = TypeBuilder::new(&registry)
            .interface("Demo", "IRunnable")
            .method(|m| m.name("Run").public().abstract_virtual())
            .build()
            .unwrap();

        assert!(runnable.is_interface());
        assert!(runnable.base().is_none());
        assert!(runnable.methods[0].is_abstract());
    }

    #[test]
    fn test_unknown_accessor() {
        let registry = TypeRegistry::new().unwrap();
        let result = TypeBuilder::new(&registry)
            .class("Demo", "Broken")
            .property("Value", TypeSignature::I4, Some("get_Value"), None)
            .build();

        assert!(matches!(result, Err(crate::Error::Malformed { .. })));
        assert!(registry.get_by_fullname("Demo.Broken").is_none());
    }

    #[test]
    fn test_static_method() {
        let registry = TypeRegistry::new().unwrap();
        let utility = TypeBuilder::new(&registry)
            .class("Demo", "Utility")
            .type_initializer()
            .method(|m| m.name("Create").public().static_method())
            .build()
            .unwrap();

        assert!(utility.method_by_name(".cctor").unwrap().is_type_initializer());
        let create = utility.method_by_name("Create").unwrap();
        assert!(create.is_static());
        assert!(!create.signature.has_this);
        assert_eq!(utility.constructors().count(), 0);
    }
}
