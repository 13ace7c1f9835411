//! Immutable capture of an existing type.
//!
//! A [`TypeSnapshot`] is taken exactly once, when a [`crate::model::TypeModel`] is created. The
//! capture validates that the type can be extended and records its base type, flags,
//! interfaces and the declared members the injected [`MemberFilter`] lets through. Custom
//! attributes are only read when first asked for.

use std::sync::OnceLock;

use tracing::debug;

use crate::{
    config::MemberFilter,
    metadata::{
        customattributes::CustomAttributeValueList,
        members::{EventList, FieldList, PropertyList},
        method::{MethodList, MethodRc},
        token::Token,
        typesystem::{
            CilFlavor, CilTypeList, CilTypeRc, SYSTEM_DELEGATE, SYSTEM_ENUM,
            SYSTEM_MULTICAST_DELEGATE, SYSTEM_VALUE_TYPE,
        },
    },
    Error::NotExtensible,
    Result,
};

/// The pre-mutation shape of an existing type
pub struct TypeSnapshot {
    original: CilTypeRc,
    base: Option<CilTypeRc>,
    flags: u32,
    interfaces: CilTypeList,
    fields: FieldList,
    constructors: MethodList,
    type_initializer: Option<MethodRc>,
    methods: MethodList,
    properties: PropertyList,
    events: EventList,
    custom_attributes: OnceLock<CustomAttributeValueList>,
}

impl TypeSnapshot {
    /// Validate that `ty` can be extended and capture its shape
    ///
    /// # Errors
    /// Returns [`crate::Error::NotExtensible`] for sealed types, interfaces, value types,
    /// delegates, generic definitions, constructed types (arrays, pointers, by-reference and
    /// generic parameters) and types without an accessible instance constructor.
    pub fn capture(ty: &CilTypeRc, filter: &dyn MemberFilter) -> Result<Self> {
        if !Self::is_extensible(ty) {
            return Err(NotExtensible(ty.fullname()));
        }

        let constructors: MethodList = ty
            .constructors()
            .filter(|ctor| filter.include_method(ctor))
            .cloned()
            .collect();
        if !constructors
            .iter()
            .any(|ctor| !ctor.flags_access.is_private())
        {
            return Err(NotExtensible(ty.fullname()));
        }

        let methods: MethodList = ty
            .methods
            .iter()
            .filter(|method| !method.is_constructor() && filter.include_method(method))
            .cloned()
            .collect();
        let captured = |method: &MethodRc| methods.iter().any(|m| m.token == method.token);

        let properties = ty
            .properties
            .iter()
            .filter(|property| {
                filter.include_property(property) && property.accessors().any(&captured)
            })
            .cloned()
            .collect();
        let events = ty
            .events
            .iter()
            .filter(|event| {
                filter.include_event(event) && captured(&event.adder) && captured(&event.remover)
            })
            .cloned()
            .collect();

        let snapshot = TypeSnapshot {
            original: ty.clone(),
            base: ty.base(),
            flags: ty.flags,
            interfaces: ty.all_interfaces(),
            fields: ty
                .fields
                .iter()
                .filter(|field| filter.include_field(field))
                .cloned()
                .collect(),
            constructors,
            type_initializer: ty
                .methods
                .iter()
                .find(|method| method.is_type_initializer())
                .cloned(),
            methods,
            properties,
            events,
            custom_attributes: OnceLock::new(),
        };

        debug!(
            type_name = %ty.fullname(),
            token = %ty.token,
            fields = snapshot.fields.len(),
            constructors = snapshot.constructors.len(),
            methods = snapshot.methods.len(),
            interfaces = snapshot.interfaces.len(),
            "captured type snapshot"
        );
        Ok(snapshot)
    }

    fn is_extensible(ty: &CilTypeRc) -> bool {
        let closed_class = matches!(ty.flavor, CilFlavor::Class | CilFlavor::GenericInstance);
        let special = matches!(
            ty.fullname().as_str(),
            SYSTEM_VALUE_TYPE | SYSTEM_ENUM | SYSTEM_DELEGATE | SYSTEM_MULTICAST_DELEGATE
        );

        closed_class
            && !special
            && !ty.is_sealed()
            && !ty.is_interface()
            && !ty.is_value_type()
            && !ty.is_delegate()
            && !ty.is_generic_definition()
    }

    /// The captured type
    #[must_use]
    pub fn original(&self) -> &CilTypeRc {
        &self.original
    }

    /// Token of the captured type
    #[must_use]
    pub fn token(&self) -> Token {
        self.original.token
    }

    /// Full name of the captured type
    #[must_use]
    pub fn fullname(&self) -> String {
        self.original.fullname()
    }

    /// The base type
    #[must_use]
    pub fn base(&self) -> Option<&CilTypeRc> {
        self.base.as_ref()
    }

    /// Raw `TypeAttributes`
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Every interface the type implements, inherited ones included
    #[must_use]
    pub fn interfaces(&self) -> &CilTypeList {
        &self.interfaces
    }

    /// Check if the type implements `interface`
    #[must_use]
    pub fn implements(&self, interface: Token) -> bool {
        self.interfaces.iter().any(|i| i.token == interface)
    }

    /// Captured declared fields
    #[must_use]
    pub fn fields(&self) -> &FieldList {
        &self.fields
    }

    /// Captured instance constructors
    #[must_use]
    pub fn constructors(&self) -> &MethodList {
        &self.constructors
    }

    /// The type initializer, if the type has one
    #[must_use]
    pub fn type_initializer(&self) -> Option<&MethodRc> {
        self.type_initializer.as_ref()
    }

    /// Captured declared methods, constructors excluded
    #[must_use]
    pub fn methods(&self) -> &MethodList {
        &self.methods
    }

    /// Captured declared properties
    #[must_use]
    pub fn properties(&self) -> &PropertyList {
        &self.properties
    }

    /// Captured declared events
    #[must_use]
    pub fn events(&self) -> &EventList {
        &self.events
    }

    /// Custom attributes of the type, read on first access
    pub fn custom_attributes(&self) -> &CustomAttributeValueList {
        self.custom_attributes
            .get_or_init(|| self.original.custom_attributes.clone())
    }
}

impl std::fmt::Debug for TypeSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeSnapshot")
            .field("type", &self.original.fullname())
            .field("flags", &format_args!("0x{:08x}", self.flags))
            .field("fields", &self.fields.len())
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .finish_non_exhaustive()
    }
}
