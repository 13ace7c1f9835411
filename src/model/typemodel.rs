//! The type model aggregate.
//!
//! [`TypeModel`] is the mutable, queryable stand-in for an existing type that is being
//! extended. It owns the snapshot of the existing type and one [`MemberCollection`] per member
//! kind, and exposes the whole mutation API. Every structural mutation goes through the member
//! factory, which validates the request before anything is registered; a failing call leaves
//! the model exactly as it was.
//!
//! Derived state (the overridden slots and whether the type is abstract) is computed lazily
//! and dropped by every structural mutation.

use std::{cell::OnceCell, sync::Arc};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::{
    config::ModelOptions,
    metadata::{
        customattributes::CustomAttributeValueList,
        members::{Event, Field, FieldRc, Property, PropertyRc, EventRc},
        method::{Method, MethodAttributes, MethodRc, CONSTRUCTOR_NAME},
        signatures::{SignatureMethod, SignatureParameter, TypeSignature},
        token::{Token, TokenTable},
        typesystem::{CilTypeList, CilTypeRc, TypeAttributes, TypeRegistry},
    },
    model::{
        collection::{
            collect_inherited_events, collect_inherited_fields, collect_inherited_methods,
            collect_inherited_properties, collect_uncaptured_abstract_roots,
        },
        factory::MutableMemberFactory,
        interfacemap::compute_mapping,
        selector::{self, resolve_overload, select_members},
        AccessorBody, AttributeContainer, AttributeTarget, BindingFlags, ConstructorId,
        CustomAttributeDeclaration, EventId, ExplicitBaseDefinition, FieldId, InterfaceMapping,
        MemberCollection, MemberEntry, MemberInfo, MethodBody, MethodId, MutableConstructor,
        MutableEvent, MutableField, MutableMember, MutableMethod, MutableProperty, PropertyId,
        RelatedMethodFinder, TypeEmitter, TypeSnapshot,
    },
    Error::{InterfaceAlreadyImplemented, InvalidArgument, ModelFrozen},
    Result,
};

/// A field of a type model query
pub type FieldEntry<'a> = MemberEntry<'a, MutableField, Field>;
/// A constructor of a type model query
pub type ConstructorEntry<'a> = MemberEntry<'a, MutableConstructor, Method>;
/// A method of a type model query
pub type MethodEntry<'a> = MemberEntry<'a, MutableMethod, Method>;
/// A property of a type model query
pub type PropertyEntry<'a> = MemberEntry<'a, MutableProperty, Property>;
/// An event of a type model query
pub type EventEntry<'a> = MemberEntry<'a, MutableEvent, Event>;

/// Opaque handle of an initialization expression, built by the emission backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initialization(pub String);

/// A nested type declared through the model
#[derive(Debug, Clone)]
pub struct NestedTypeDeclaration {
    /// Token allocated for the nested type
    pub token: Token,
    /// Simple name of the nested type
    pub name: String,
    /// Raw `TypeAttributes`, with a nested visibility
    pub flags: u32,
    /// Base type, `None` for `System.Object`
    pub base: Option<CilTypeRc>,
}

#[derive(Debug, Default)]
pub(super) struct DerivedState {
    /// Root definitions of every slot a declared method overrides
    pub(super) overridden_roots: FxHashSet<Token>,
    /// Name and signature of added methods hiding inherited ones
    pub(super) hidden: FxHashSet<(String, SignatureMethod)>,
}

/// The mutable model of a type under construction
///
/// # Examples
///
/// ```rust
/// use dotweave::prelude::*;
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new()?);
/// let disposable = TypeBuilder::new(&registry)
///     .interface("System", "IDisposable")
///     .method(|m| m.name("Dispose").public().abstract_virtual())
///     .build()?;
/// let widget = TypeBuilder::new(&registry)
///     .class("Demo", "Widget")
///     .default_constructor()
///     .build()?;
///
/// let mut model = TypeModel::new(&registry, &widget)?;
/// model.add_interface(&disposable)?;
///
/// // Nothing implements Dispose yet
/// let partial = model.get_interface_map_partial(&disposable)?;
/// assert_eq!(partial.unmapped().count(), 1);
/// assert!(model.get_interface_map(&disposable).is_err());
///
/// let dispose = disposable.method_by_name("Dispose").unwrap();
/// let id = model.get_or_add_implementation(&dispose)?;
/// model.set_method_body(id, MethodBody::provided("dispose"))?;
/// assert!(model.get_interface_map(&disposable)?.is_complete());
/// # Ok::<(), dotweave::Error>(())
/// ```
pub struct TypeModel {
    pub(super) registry: Arc<TypeRegistry>,
    pub(super) token: Token,
    pub(super) snapshot: TypeSnapshot,
    pub(super) options: ModelOptions,
    pub(super) finder: RelatedMethodFinder,
    pub(super) added_interfaces: CilTypeList,
    pub(super) fields: MemberCollection<MutableField>,
    pub(super) constructors: MemberCollection<MutableConstructor>,
    pub(super) methods: MemberCollection<MutableMethod>,
    pub(super) properties: MemberCollection<MutableProperty>,
    pub(super) events: MemberCollection<MutableEvent>,
    pub(super) nested_types: Vec<NestedTypeDeclaration>,
    pub(super) custom_attributes: AttributeContainer,
    pub(super) instance_initializations: Vec<Initialization>,
    pub(super) type_initializations: Vec<Initialization>,
    pub(super) inherited_method_roots: FxHashMap<Token, Token>,
    uncaptured_abstract_roots: Vec<Token>,
    derived: OnceCell<DerivedState>,
    is_abstract: OnceCell<bool>,
    frozen: bool,
}

impl TypeModel {
    /// Start modeling an extension of `ty` with the default options
    ///
    /// # Errors
    /// Returns [`crate::Error::NotExtensible`] if `ty` cannot be extended, or a host-universe
    /// error if its hierarchy is inconsistent.
    pub fn new(registry: &Arc<TypeRegistry>, ty: &CilTypeRc) -> Result<Self> {
        Self::with_options(registry, ty, ModelOptions::default())
    }

    /// Start modeling an extension of `ty`
    ///
    /// # Errors
    /// Returns [`crate::Error::NotExtensible`] if `ty` cannot be extended, or a host-universe
    /// error if its hierarchy is inconsistent.
    pub fn with_options(
        registry: &Arc<TypeRegistry>,
        ty: &CilTypeRc,
        options: ModelOptions,
    ) -> Result<Self> {
        let snapshot = TypeSnapshot::capture(ty, options.member_filter.as_ref())?;
        let token = registry.allocate_token(TokenTable::TYPE_DEF);
        let max_depth = options.config.max_hierarchy_depth;
        let finder = RelatedMethodFinder::new(max_depth);
        let filter = options.member_filter.as_ref();

        let mut existing_methods = Vec::with_capacity(snapshot.methods().len());
        let mut declared_roots = Vec::new();
        for method in snapshot.methods() {
            let base_root = finder.get_root_definition(method)?;
            let mut explicit_bases = Vec::new();
            for imp in ty.overrides.iter().filter(|imp| imp.body.token == method.token) {
                explicit_bases.push(ExplicitBaseDefinition {
                    definition: imp.declaration.clone(),
                    root: finder.root_or_self(&imp.declaration)?.token,
                });
            }

            declared_roots.extend(base_root.as_ref().map(|root| root.token));
            declared_roots.extend(explicit_bases.iter().map(|base| base.root));
            existing_methods.push(MutableMethod::existing(
                token,
                method,
                base_root,
                explicit_bases,
            ));
        }
        let (inherited_methods, inherited_method_roots) =
            collect_inherited_methods(&snapshot, filter, &finder, declared_roots, max_depth)?;
        let captured: FxHashSet<Token> = snapshot
            .methods()
            .iter()
            .chain(&inherited_methods)
            .map(|method| method.token)
            .collect();
        let uncaptured_abstract_roots =
            collect_uncaptured_abstract_roots(&snapshot, &captured, &finder, max_depth)?;
        let methods = MemberCollection::new(token, existing_methods, inherited_methods);

        let constructors = MemberCollection::new(
            token,
            snapshot
                .constructors()
                .iter()
                .chain(snapshot.type_initializer())
                .map(|ctor| MutableConstructor::existing(token, ctor))
                .collect(),
            Vec::new(),
        );

        let fields = MemberCollection::new(
            token,
            snapshot
                .fields()
                .iter()
                .map(|field| MutableField::existing(token, field))
                .collect(),
            collect_inherited_fields(&snapshot, filter, max_depth)?,
        );

        let accessor = |method: &MethodRc| methods.id_of_original(method.token);
        let existing_properties = snapshot
            .properties()
            .iter()
            .map(|property| {
                MutableProperty::new(
                    property.token,
                    token,
                    property.name.clone(),
                    property.flags,
                    property.signature.clone(),
                    Some(property.clone()),
                    property.getter.as_ref().and_then(accessor),
                    property.setter.as_ref().and_then(accessor),
                    (property.is_public(), property.is_static()),
                )
            })
            .collect();
        let properties = MemberCollection::new(
            token,
            existing_properties,
            collect_inherited_properties(&snapshot, filter, max_depth)?,
        );

        let mut existing_events = Vec::with_capacity(snapshot.events().len());
        for event in snapshot.events() {
            let (Some(adder), Some(remover)) = (accessor(&event.adder), accessor(&event.remover))
            else {
                return Err(malformed_error!(
                    "Accessors of event '{}' were not captured",
                    event.name
                ));
            };
            existing_events.push(MutableEvent::new(
                event.token,
                token,
                event.name.clone(),
                event.flags,
                event.event_type.clone(),
                Some(event.clone()),
                (adder, remover, event.raiser.as_ref().and_then(accessor)),
                (event.is_public(), event.is_static()),
            ));
        }
        let events = MemberCollection::new(
            token,
            existing_events,
            collect_inherited_events(&snapshot, filter, max_depth)?,
        );

        debug!(
            type_name = %snapshot.fullname(),
            token = %token,
            inherited_methods = methods.inherited().len(),
            "created type model"
        );

        Ok(TypeModel {
            registry: registry.clone(),
            token,
            snapshot,
            options,
            finder,
            added_interfaces: Vec::new(),
            fields,
            constructors,
            methods,
            properties,
            events,
            nested_types: Vec::new(),
            custom_attributes: AttributeContainer::default(),
            instance_initializations: Vec::new(),
            type_initializations: Vec::new(),
            inherited_method_roots,
            uncaptured_abstract_roots,
            derived: OnceCell::new(),
            is_abstract: OnceCell::new(),
            frozen: false,
        })
    }

    fn factory(&mut self) -> Result<MutableMemberFactory<'_>> {
        self.ensure_mutable()?;
        Ok(MutableMemberFactory::new(self))
    }

    pub(super) fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            Err(ModelFrozen)
        } else {
            Ok(())
        }
    }

    /// Drop the cached derived state; called by every structural mutation
    pub(super) fn invalidate_derived_state(&mut self) {
        self.derived.take();
        if self.is_abstract.take().is_some() {
            trace!(token = %self.token, "abstractness invalidated");
        }
    }

    pub(super) fn derived(&self) -> &DerivedState {
        self.derived.get_or_init(|| {
            let mut state = DerivedState::default();
            for (_, method) in self.methods.declared() {
                state
                    .overridden_roots
                    .extend(method.base_root().map(|root| root.token));
                state.overridden_roots.extend(
                    method
                        .explicit_base_definitions()
                        .iter()
                        .map(|base| base.root),
                );
            }
            for (_, method) in self.methods.added() {
                if !method.is_virtual() || method.is_new_slot() {
                    state
                        .hidden
                        .insert((method.name().to_string(), method.signature().clone()));
                }
            }
            state
        })
    }

    /// The slot of the inherited method `method` is overridden by a declared method
    pub(super) fn is_slot_overridden(&self, method: &MethodRc) -> bool {
        self.inherited_method_roots
            .get(&method.token)
            .is_some_and(|root| self.derived().overridden_roots.contains(root))
    }

    fn keep_inherited_method(&self, method: &MethodRc) -> bool {
        !self.is_slot_overridden(method)
            && !self
                .derived()
                .hidden
                .contains(&(method.name.clone(), method.signature.clone()))
    }

    /// The declared method occupying the slot with root definition `root`
    pub(super) fn declared_override(&self, root: Token) -> Option<MethodId> {
        self.methods
            .declared()
            .find(|(_, method)| method.overrides_root(root))
            .map(|(id, _)| id)
    }

    /// Token allocated for the modeled type
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Full name of the modeled type (the name of the existing type)
    #[must_use]
    pub fn fullname(&self) -> String {
        self.snapshot.fullname()
    }

    /// The captured existing type
    #[must_use]
    pub fn snapshot(&self) -> &TypeSnapshot {
        &self.snapshot
    }

    /// The registry the model allocates tokens from
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Options the model was created with
    #[must_use]
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// The base type of the modeled type
    #[must_use]
    pub fn base(&self) -> Option<&CilTypeRc> {
        self.snapshot.base()
    }

    /// Raw `TypeAttributes`, with [`TypeAttributes::ABSTRACT`] reflecting [`Self::is_abstract`]
    #[must_use]
    pub fn flags(&self) -> u32 {
        let flags = self.snapshot.flags() & !TypeAttributes::ABSTRACT;
        if self.is_abstract() {
            flags | TypeAttributes::ABSTRACT
        } else {
            flags
        }
    }

    /// The type has at least one abstract method that is neither implemented nor overridden
    ///
    /// Computed on first access after a structural mutation.
    pub fn is_abstract(&self) -> bool {
        *self.is_abstract.get_or_init(|| {
            let declared = self.methods.declared().any(|(_, method)| method.is_abstract());
            let inherited = self
                .methods
                .inherited()
                .iter()
                .any(|method| method.is_abstract() && !self.is_slot_overridden(method));
            let uncaptured = self
                .uncaptured_abstract_roots
                .iter()
                .any(|root| !self.derived().overridden_roots.contains(root));
            trace!(token = %self.token, declared, inherited, uncaptured, "abstractness recomputed");
            declared || inherited || uncaptured
        })
    }

    /// The model was handed to an emission backend and is read-only
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Make the model read-only
    pub fn freeze(&mut self) {
        if !self.frozen {
            self.frozen = true;
            debug!(type_name = %self.fullname(), "type model frozen");
        }
    }

    /// All fields
    #[must_use]
    pub fn fields(&self) -> &MemberCollection<MutableField> {
        &self.fields
    }

    /// All constructors, the type initializer included
    #[must_use]
    pub fn constructors(&self) -> &MemberCollection<MutableConstructor> {
        &self.constructors
    }

    /// All methods
    #[must_use]
    pub fn methods(&self) -> &MemberCollection<MutableMethod> {
        &self.methods
    }

    /// All properties
    #[must_use]
    pub fn properties(&self) -> &MemberCollection<MutableProperty> {
        &self.properties
    }

    /// All events
    #[must_use]
    pub fn events(&self) -> &MemberCollection<MutableEvent> {
        &self.events
    }

    /// The method with the given id
    ///
    /// # Errors
    /// Returns [`crate::Error::MemberNotFound`] if the id does not belong to this model.
    pub fn method(&self, id: MethodId) -> Result<&MutableMethod> {
        self.methods.get(id)
    }

    /// Nested types declared through the model
    #[must_use]
    pub fn nested_types(&self) -> &[NestedTypeDeclaration] {
        &self.nested_types
    }

    /// Custom attributes staged for the type itself
    #[must_use]
    pub fn custom_attributes(&self) -> &AttributeContainer {
        &self.custom_attributes
    }

    /// Custom attributes the existing type already carries
    #[must_use]
    pub fn existing_custom_attributes(&self) -> &CustomAttributeValueList {
        self.snapshot.custom_attributes()
    }

    /// Instance initializations, in order of addition
    #[must_use]
    pub fn instance_initializations(&self) -> &[Initialization] {
        &self.instance_initializations
    }

    /// Type initializations, in order of addition
    #[must_use]
    pub fn type_initializations(&self) -> &[Initialization] {
        &self.type_initializations
    }

    /// Interfaces added through the model
    #[must_use]
    pub fn added_interfaces(&self) -> &CilTypeList {
        &self.added_interfaces
    }

    /// Every interface the modeled type implements: existing ones first, then the added ones
    /// together with the interfaces they extend
    #[must_use]
    pub fn get_interfaces(&self) -> CilTypeList {
        let mut result = self.snapshot.interfaces().clone();
        let mut seen: FxHashSet<Token> = result.iter().map(|i| i.token).collect();
        for interface in &self.added_interfaces {
            for candidate in std::iter::once(interface.clone()).chain(interface.all_interfaces()) {
                if seen.insert(candidate.token) {
                    result.push(candidate);
                }
            }
        }
        result
    }

    /// Check if the modeled type implements `interface`, existing or added
    #[must_use]
    pub fn implements(&self, interface: &CilTypeRc) -> bool {
        self.get_interfaces()
            .iter()
            .any(|candidate| candidate.token == interface.token)
    }

    /// Add an interface to implement
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `interface` is not an interface and
    /// [`crate::Error::InterfaceAlreadyImplemented`] if it is implemented already.
    pub fn add_interface(&mut self, interface: &CilTypeRc) -> Result<()> {
        self.ensure_mutable()?;
        if !interface.is_interface() {
            return Err(InvalidArgument(format!(
                "'{}' is not an interface",
                interface.fullname()
            )));
        }
        if self.implements(interface) {
            return Err(InterfaceAlreadyImplemented(interface.fullname()));
        }

        self.added_interfaces.push(interface.clone());
        self.invalidate_derived_state();
        debug!(type_name = %self.fullname(), interface = %interface.fullname(), "added interface");
        Ok(())
    }

    /// Add a field
    ///
    /// # Errors
    /// Fails for an empty name, invalid flags or a field with the same name and type.
    pub fn add_field(&mut self, name: &str, flags: u32, field_type: TypeSignature) -> Result<FieldId> {
        self.factory()?.create_field(name, flags, field_type)
    }

    /// Add an instance constructor
    ///
    /// # Errors
    /// Fails for method-only flags or a constructor with the same parameters.
    pub fn add_constructor(
        &mut self,
        attributes: MethodAttributes,
        params: Vec<TypeSignature>,
        body: MethodBody,
    ) -> Result<ConstructorId> {
        self.factory()?.create_constructor(attributes, params, body)
    }

    /// Add the type initializer (static constructor)
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOperation`] if the type has one already.
    pub fn add_type_initializer(&mut self, body: MethodBody) -> Result<ConstructorId> {
        self.factory()?.create_type_initializer(body)
    }

    /// Add a method; abstract methods have no body, all others need one
    ///
    /// # Errors
    /// Fails for an empty name, invalid flags, a method with the same name and signature or an
    /// implicit override of a final method.
    pub fn add_method(
        &mut self,
        name: &str,
        attributes: MethodAttributes,
        signature: SignatureMethod,
        body: Option<MethodBody>,
    ) -> Result<MethodId> {
        self.factory()?
            .create_method(name, attributes, signature, body)
    }

    /// Add a property whose accessors are methods of this model
    ///
    /// # Errors
    /// Fails if the accessors do not describe a consistent property or a property with the
    /// same name and signature exists.
    pub fn add_property(
        &mut self,
        name: &str,
        flags: u32,
        getter: Option<MethodId>,
        setter: Option<MethodId>,
    ) -> Result<PropertyId> {
        self.factory()?.create_property(name, flags, getter, setter)
    }

    /// Add a property together with `get_`/`set_` accessors
    ///
    /// Either every member is added or none is.
    ///
    /// # Errors
    /// Fails like [`Self::add_method`] and [`Self::add_property`].
    pub fn add_property_with_accessors(
        &mut self,
        name: &str,
        property_type: TypeSignature,
        attributes: MethodAttributes,
        getter: Option<AccessorBody>,
        setter: Option<AccessorBody>,
    ) -> Result<PropertyId> {
        self.factory()?
            .create_property_with_accessors(name, property_type, attributes, getter, setter)
    }

    /// Add an event whose accessors are methods of this model
    ///
    /// # Errors
    /// Fails if the accessors do not describe a consistent event or an event with the same
    /// name exists.
    pub fn add_event(
        &mut self,
        name: &str,
        flags: u32,
        adder: MethodId,
        remover: MethodId,
        raiser: Option<MethodId>,
    ) -> Result<EventId> {
        self.factory()?
            .create_event(name, flags, adder, remover, raiser)
    }

    /// Add an event together with `add_`/`remove_` accessors
    ///
    /// Either every member is added or none is.
    ///
    /// # Errors
    /// Fails like [`Self::add_method`] and [`Self::add_event`].
    pub fn add_event_with_accessors(
        &mut self,
        name: &str,
        handler: TypeSignature,
        attributes: MethodAttributes,
        adder: AccessorBody,
        remover: AccessorBody,
    ) -> Result<EventId> {
        self.factory()?
            .create_event_with_accessors(name, handler, attributes, adder, remover)
    }

    /// Declare a nested type
    ///
    /// # Errors
    /// Fails for an empty or duplicate name, a non-nested visibility or an unsuitable base.
    pub fn add_nested_type(
        &mut self,
        name: &str,
        flags: u32,
        base: Option<&CilTypeRc>,
    ) -> Result<Token> {
        self.factory()?.create_nested_type(name, flags, base)
    }

    /// Stage a custom attribute on the type or one of its members
    ///
    /// # Errors
    /// Fails if the target is not a member of this model or the attribute type is applied
    /// already and does not allow multiple usages.
    pub fn add_custom_attribute(
        &mut self,
        target: AttributeTarget,
        declaration: CustomAttributeDeclaration,
    ) -> Result<()> {
        self.ensure_mutable()?;
        let none = CustomAttributeValueList::new();
        match target {
            AttributeTarget::Type => self
                .custom_attributes
                .add(declaration.clone(), self.snapshot.custom_attributes())?,
            AttributeTarget::Field(id) => self
                .fields
                .get_mut(id)?
                .custom_attributes
                .add(declaration.clone(), &none)?,
            AttributeTarget::Constructor(id) => self
                .constructors
                .get_mut(id)?
                .custom_attributes
                .add(declaration.clone(), &none)?,
            AttributeTarget::Method(id) => self
                .methods
                .get_mut(id)?
                .custom_attributes
                .add(declaration.clone(), &none)?,
            AttributeTarget::Property(id) => self
                .properties
                .get_mut(id)?
                .custom_attributes
                .add(declaration.clone(), &none)?,
            AttributeTarget::Event(id) => self
                .events
                .get_mut(id)?
                .custom_attributes
                .add(declaration.clone(), &none)?,
        }

        debug!(
            attribute = %declaration.attribute_type.fullname(),
            target = ?target,
            "staged custom attribute"
        );
        Ok(())
    }

    /// Append an instance initialization
    ///
    /// # Errors
    /// Returns [`crate::Error::ModelFrozen`] after hand-off.
    pub fn add_initialization(&mut self, initialization: Initialization) -> Result<()> {
        self.ensure_mutable()?;
        self.instance_initializations.push(initialization);
        Ok(())
    }

    /// Append a type initialization
    ///
    /// # Errors
    /// Returns [`crate::Error::ModelFrozen`] after hand-off.
    pub fn add_type_initialization(&mut self, initialization: Initialization) -> Result<()> {
        self.ensure_mutable()?;
        self.type_initializations.push(initialization);
        Ok(())
    }

    /// Replace the body of a method; an abstract method stops being abstract
    ///
    /// # Errors
    /// Fails for foreign ids and for [`MethodBody::Original`] on a method without one.
    pub fn set_method_body(&mut self, id: MethodId, body: MethodBody) -> Result<()> {
        self.ensure_mutable()?;
        let method = self.methods.get_mut(id)?;
        if body == MethodBody::Original && !method.is_existing() {
            return Err(InvalidArgument(format!(
                "'{}' has no original body",
                method.name()
            )));
        }
        method.set_body(body);
        debug!(method = %method.name(), token = %method.token(), "method body set");
        self.invalidate_derived_state();
        Ok(())
    }

    /// Replace the body of a constructor
    ///
    /// # Errors
    /// Fails for foreign ids and for [`MethodBody::Original`] on a constructor without one.
    pub fn set_constructor_body(&mut self, id: ConstructorId, body: MethodBody) -> Result<()> {
        self.ensure_mutable()?;
        let ctor = self.constructors.get_mut(id)?;
        if body == MethodBody::Original && !ctor.is_existing() {
            return Err(InvalidArgument(format!(
                "'{}' has no original body",
                ctor.name()
            )));
        }
        ctor.set_body(body);
        Ok(())
    }

    /// Register `base` as explicitly overridden (or implemented) by the method `id`
    ///
    /// # Errors
    /// Fails if either method is not virtual, `base` is final, the signatures differ, `base`
    /// belongs neither to an ancestor nor to an implemented interface, or it is registered
    /// already.
    pub fn add_explicit_base_definition(&mut self, id: MethodId, base: &MethodRc) -> Result<()> {
        self.factory()?.add_explicit_base_definition(id, base)
    }

    /// The declared method overriding the slot of `base`, created if necessary
    ///
    /// Calling this twice for methods of the same slot returns the same id.
    ///
    /// # Errors
    /// Fails if `base` is not an overridable method of an ancestor or the slot is final.
    pub fn get_or_add_override(&mut self, base: &MethodRc) -> Result<MethodId> {
        self.factory()?.get_or_create_override(base)
    }

    /// The declared method implementing `interface_method`, created if necessary
    ///
    /// Calling this twice for the same interface method returns the same id.
    ///
    /// # Errors
    /// Fails if the interface is not implemented by the model or the inherited
    /// implementation is final.
    pub fn get_or_add_implementation(&mut self, interface_method: &MethodRc) -> Result<MethodId> {
        self.factory()?.get_or_create_implementation(interface_method)
    }

    /// The complete mapping of `interface` to the members implementing it
    ///
    /// # Errors
    /// Returns [`crate::Error::InterfaceNotImplemented`] naming every unmapped method.
    pub fn get_interface_map(&self, interface: &CilTypeRc) -> Result<InterfaceMapping> {
        compute_mapping(self, self.options.interface_maps.as_ref(), interface, false)
    }

    /// The mapping of `interface`, unmapped methods allowed
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `interface` is not implemented.
    pub fn get_interface_map_partial(&self, interface: &CilTypeRc) -> Result<InterfaceMapping> {
        compute_mapping(self, self.options.interface_maps.as_ref(), interface, true)
    }

    fn declared_only(&self, flags: BindingFlags) -> Option<Token> {
        flags
            .contains(BindingFlags::DECLARED_ONLY)
            .then_some(self.token)
    }

    fn field_entries(&self) -> Vec<FieldEntry<'_>> {
        self.fields.entries(|_| true)
    }

    fn method_entries(&self) -> Vec<MethodEntry<'_>> {
        self.methods
            .entries(|method| self.keep_inherited_method(method))
    }

    fn property_entries(&self) -> Vec<PropertyEntry<'_>> {
        self.properties.entries(|inherited: &PropertyRc| {
            !self.properties.declared().any(|(_, property)| {
                property.name() == inherited.name
                    && property.signature().matches(&inherited.signature)
            })
        })
    }

    fn event_entries(&self) -> Vec<EventEntry<'_>> {
        self.events.entries(|inherited: &EventRc| {
            !self
                .events
                .declared()
                .any(|(_, event)| event.name() == inherited.name)
        })
    }

    /// Fields matching `flags`: existing, added, then inherited
    #[must_use]
    pub fn get_fields(&self, flags: BindingFlags) -> Vec<FieldEntry<'_>> {
        select_members(self.field_entries(), flags, self.declared_only(flags))
    }

    /// The field named `name` matching `flags`
    ///
    /// # Errors
    /// Returns [`crate::Error::AmbiguousMatch`] if several fields match.
    pub fn get_field(&self, name: &str, flags: BindingFlags) -> Result<Option<FieldEntry<'_>>> {
        selector::select_single(name, self.field_entries(), flags, self.declared_only(flags))
    }

    /// Constructors matching `flags`
    #[must_use]
    pub fn get_constructors(&self, flags: BindingFlags) -> Vec<ConstructorEntry<'_>> {
        select_members(self.constructors.entries(|_| false), flags, Some(self.token))
    }

    /// The constructor matching `flags` whose parameters fit `params`
    ///
    /// # Errors
    /// Propagates the failures of the injected overload resolver.
    pub fn get_constructor(
        &self,
        flags: BindingFlags,
        params: &[SignatureParameter],
    ) -> Result<Option<ConstructorEntry<'_>>> {
        resolve_overload(
            CONSTRUCTOR_NAME,
            self.get_constructors(flags),
            params,
            self.options.overload_resolver.as_ref(),
        )
    }

    /// Methods matching `flags`: existing, added, then inherited ones whose slot is not
    /// overridden
    #[must_use]
    pub fn get_methods(&self, flags: BindingFlags) -> Vec<MethodEntry<'_>> {
        select_members(self.method_entries(), flags, self.declared_only(flags))
    }

    /// The method named `name` matching `flags`
    ///
    /// # Errors
    /// Returns [`crate::Error::AmbiguousMatch`] if several methods match.
    pub fn get_method(&self, name: &str, flags: BindingFlags) -> Result<Option<MethodEntry<'_>>> {
        selector::select_single(name, self.method_entries(), flags, self.declared_only(flags))
    }

    /// The method named `name` matching `flags` whose parameters fit `params`
    ///
    /// # Errors
    /// Propagates the failures of the injected overload resolver.
    pub fn get_method_with_params(
        &self,
        name: &str,
        flags: BindingFlags,
        params: &[SignatureParameter],
    ) -> Result<Option<MethodEntry<'_>>> {
        selector::select_single_with_params(
            name,
            self.method_entries(),
            flags,
            self.declared_only(flags),
            params,
            self.options.overload_resolver.as_ref(),
        )
    }

    /// Properties matching `flags`
    #[must_use]
    pub fn get_properties(&self, flags: BindingFlags) -> Vec<PropertyEntry<'_>> {
        select_members(self.property_entries(), flags, self.declared_only(flags))
    }

    /// The property named `name` matching `flags`
    ///
    /// # Errors
    /// Returns [`crate::Error::AmbiguousMatch`] if several properties match.
    pub fn get_property(
        &self,
        name: &str,
        flags: BindingFlags,
    ) -> Result<Option<PropertyEntry<'_>>> {
        selector::select_single(name, self.property_entries(), flags, self.declared_only(flags))
    }

    /// Events matching `flags`
    #[must_use]
    pub fn get_events(&self, flags: BindingFlags) -> Vec<EventEntry<'_>> {
        select_members(self.event_entries(), flags, self.declared_only(flags))
    }

    /// The event named `name` matching `flags`
    ///
    /// # Errors
    /// Returns [`crate::Error::AmbiguousMatch`] if several events match.
    pub fn get_event(&self, name: &str, flags: BindingFlags) -> Result<Option<EventEntry<'_>>> {
        selector::select_single(name, self.event_entries(), flags, self.declared_only(flags))
    }

    /// The descriptor wrapping the existing field `original`
    #[must_use]
    pub fn get_mutable_field(&self, original: &FieldRc) -> Option<FieldId> {
        self.fields.id_of_original(original.token)
    }

    /// The descriptor wrapping the existing constructor `original`
    #[must_use]
    pub fn get_mutable_constructor(&self, original: &MethodRc) -> Option<ConstructorId> {
        self.constructors.id_of_original(original.token)
    }

    /// The descriptor wrapping the existing method `original`
    #[must_use]
    pub fn get_mutable_method(&self, original: &MethodRc) -> Option<MethodId> {
        self.methods.id_of_original(original.token)
    }

    /// The descriptor wrapping the existing property `original`
    #[must_use]
    pub fn get_mutable_property(&self, original: &PropertyRc) -> Option<PropertyId> {
        self.properties.id_of_original(original.token)
    }

    /// The descriptor wrapping the existing event `original`
    #[must_use]
    pub fn get_mutable_event(&self, original: &EventRc) -> Option<EventId> {
        self.events.id_of_original(original.token)
    }

    /// Hand the model to an emission backend
    ///
    /// All interface mappings must be complete. The model is frozen before the first hook is
    /// called and stays read-only afterwards.
    ///
    /// # Errors
    /// Returns [`crate::Error::InterfaceNotImplemented`] for an incomplete interface (the
    /// model is not frozen then) and propagates the failures of the emitter.
    pub fn emit(&mut self, emitter: &mut dyn TypeEmitter) -> Result<()> {
        let mappings = self
            .get_interfaces()
            .iter()
            .map(|interface| self.get_interface_map(interface))
            .collect::<Result<Vec<_>>>()?;
        self.freeze();

        let model: &TypeModel = self;
        emitter.begin_type(model)?;
        for mapping in &mappings {
            emitter.emit_interface(model, mapping)?;
        }
        for (id, field) in model.fields.declared() {
            emitter.emit_field(model, id, field)?;
        }
        for (id, ctor) in model.constructors.declared() {
            emitter.emit_constructor(model, id, ctor)?;
        }
        for (id, method) in model.methods.declared() {
            emitter.emit_method(model, id, method)?;
        }
        for (id, property) in model.properties.declared() {
            emitter.emit_property(model, id, property)?;
        }
        for (id, event) in model.events.declared() {
            emitter.emit_event(model, id, event)?;
        }
        for nested in &model.nested_types {
            emitter.emit_nested_type(model, nested)?;
        }
        emitter.end_type(model)
    }
}

impl std::fmt::Debug for TypeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeModel")
            .field("token", &self.token)
            .field("type", &self.fullname())
            .field("fields", &self.fields.len())
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .field("properties", &self.properties.len())
            .field("events", &self.events.len())
            .field("frozen", &self.frozen)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            customattributes::CustomAttributeArgument,
            members::FieldAttributes,
            method::{MethodAccessFlags, MethodModifiers, MethodVtableFlags},
            typesystem::TypeBuilder,
        },
        model::MethodTarget,
        test::TestUniverse,
        Error,
    };

    fn void(params: Vec<TypeSignature>) -> SignatureMethod {
        SignatureMethod::instance(TypeSignature::Void, params)
    }

    fn body() -> Option<MethodBody> {
        Some(MethodBody::provided("body"))
    }

    #[test]
    fn test_existing_members_are_wrapped() {
        let universe = TestUniverse::new();
        let model = TypeModel::new(&universe.registry, &universe.shape).unwrap();

        assert_ne!(model.token(), universe.shape.token);
        assert_eq!(model.fullname(), "Demo.Shape");
        assert_eq!(model.constructors().existing().count(), 1);
        assert_eq!(model.methods().existing().count(), 1);
        assert_eq!(model.methods().added_len(), 0);

        let area = universe.shape.method_by_name("Area").unwrap();
        let id = model.get_mutable_method(&area).unwrap();
        let wrapper = model.method(id).unwrap();
        assert_eq!(wrapper.token(), area.token);
        assert_eq!(wrapper.declaring_token(), model.token());
        assert!(wrapper.is_existing());
        assert!(wrapper.body().is_none());
    }

    #[test]
    fn test_abstractness_follows_bodies() {
        let universe = TestUniverse::new();
        let mut model = TypeModel::new(&universe.registry, &universe.shape).unwrap();
        assert!(model.is_abstract());
        assert_ne!(model.flags() & TypeAttributes::ABSTRACT, 0);

        let area = universe.shape.method_by_name("Area").unwrap();
        let id = model.get_or_add_override(&area).unwrap();
        model.set_method_body(id, MethodBody::provided("pi r^2")).unwrap();

        assert!(!model.is_abstract());
        assert_eq!(model.flags() & TypeAttributes::ABSTRACT, 0);
        assert!(model.method(id).unwrap().is_modified());
    }

    #[test]
    fn test_inherited_abstract_method_makes_type_abstract() {
        let universe = TestUniverse::new();
        let registry = &universe.registry;
        let partial = TypeBuilder::new(registry)
            .class("Demo", "Polygon")
            .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT)
            .extends(&universe.shape)
            .default_constructor()
            .build()
            .unwrap();

        let mut model = TypeModel::new(registry, &partial).unwrap();
        assert!(model.is_abstract());

        let area = universe.shape.method_by_name("Area").unwrap();
        let id = model.get_or_add_override(&area).unwrap();
        // The override of an abstract slot has nothing to call
        assert!(model.method(id).unwrap().is_abstract());
        assert!(model.is_abstract());

        model.set_method_body(id, MethodBody::provided("area")).unwrap();
        assert!(!model.is_abstract());
        // The inherited slot is hidden by the override now
        let methods = model.get_methods(BindingFlags::PUBLIC | BindingFlags::INSTANCE);
        assert_eq!(
            methods.iter().filter(|m| m.name() == "Area").count(),
            1
        );
    }

    #[test]
    fn test_filtered_abstract_slot_keeps_type_abstract() {
        let universe = TestUniverse::new();
        let registry = &universe.registry;
        let base = TypeBuilder::new(registry)
            .class("Demo", "Job")
            .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT)
            .default_constructor()
            .method(|m| m.name("Run").assembly().abstract_virtual())
            .build()
            .unwrap();
        let mid = TypeBuilder::new(registry)
            .class("Demo", "PendingJob")
            .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT)
            .extends(&base)
            .default_constructor()
            .build()
            .unwrap();

        let options = ModelOptions::default().with_config(crate::ModelConfig::public_only());
        let mut model = TypeModel::with_options(registry, &mid, options).unwrap();
        let flags = BindingFlags::ALL;
        assert!(model.get_method("Run", flags).unwrap().is_none());
        assert!(model.is_abstract());
        assert_ne!(model.flags() & TypeAttributes::ABSTRACT, 0);

        let run = base.method_by_name("Run").unwrap();
        let id = model.get_or_add_override(&run).unwrap();
        assert!(model.is_abstract());
        model.set_method_body(id, MethodBody::provided("run")).unwrap();
        assert!(!model.is_abstract());
        assert_eq!(model.flags() & TypeAttributes::ABSTRACT, 0);
    }

    #[test]
    fn test_filtered_override_closes_abstract_slot() {
        let universe = TestUniverse::new();
        let registry = &universe.registry;
        // Polygon leaves Area abstract, Hexagon closes it with an internal override
        let polygon = TypeBuilder::new(registry)
            .class("Demo", "Polygon")
            .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT)
            .extends(&universe.shape)
            .default_constructor()
            .build()
            .unwrap();
        let hexagon = TypeBuilder::new(registry)
            .class("Demo", "Hexagon")
            .extends(&polygon)
            .default_constructor()
            .method(|m| {
                m.name("Area")
                    .assembly()
                    .override_method()
                    .returns(TypeSignature::R8)
            })
            .build()
            .unwrap();
        let derived = TypeBuilder::new(registry)
            .class("Demo", "BigHexagon")
            .extends(&hexagon)
            .default_constructor()
            .build()
            .unwrap();

        let options = ModelOptions::default().with_config(crate::ModelConfig::public_only());
        let model = TypeModel::with_options(registry, &derived, options.clone()).unwrap();
        assert!(!model.is_abstract());
        let model = TypeModel::with_options(registry, &hexagon, options).unwrap();
        assert!(!model.is_abstract());
    }

    #[test]
    fn test_query_flags_and_declared_only() {
        let universe = TestUniverse::new();
        let mut model = TypeModel::new(&universe.registry, &universe.circle).unwrap();
        model
            .add_method("Scale", MethodAttributes::public(), void(vec![TypeSignature::R8]), body())
            .unwrap();
        model
            .add_method(
                "Create",
                MethodAttributes::public().with_modifiers(MethodModifiers::STATIC),
                SignatureMethod::new_static(TypeSignature::Object, vec![]),
                body(),
            )
            .unwrap();

        let public_instance = model.get_methods(BindingFlags::PUBLIC | BindingFlags::INSTANCE);
        let names: Vec<_> = public_instance.iter().map(|m| m.name()).collect();
        assert!(names.contains(&"Scale"));
        assert!(names.contains(&"Area"));
        assert!(names.contains(&"ToString"));
        assert!(!names.contains(&"Create"));
        assert!(!names.contains(&"Finalize"));

        let declared = model.get_methods(
            BindingFlags::PUBLIC | BindingFlags::INSTANCE | BindingFlags::DECLARED_ONLY,
        );
        assert!(declared.iter().all(|m| m.as_declared().is_some()));

        let statics = model.get_methods(BindingFlags::PUBLIC | BindingFlags::STATIC);
        assert_eq!(statics.len(), 1);
        assert!(model.get_methods(BindingFlags::PUBLIC).is_empty());

        let finalize = model
            .get_method("Finalize", BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE)
            .unwrap()
            .unwrap();
        assert!(finalize.as_inherited().is_some());
    }

    #[test]
    fn test_get_method_with_params() {
        let universe = TestUniverse::new();
        let mut model = TypeModel::new(&universe.registry, &universe.circle).unwrap();
        model
            .add_method("Foo", MethodAttributes::public(), void(vec![TypeSignature::I4]), body())
            .unwrap();
        let by_string = model
            .add_method("Foo", MethodAttributes::public(), void(vec![TypeSignature::String]), body())
            .unwrap();

        assert!(matches!(
            model.get_method("Foo", BindingFlags::DEFAULT),
            Err(Error::AmbiguousMatch(name)) if name == "Foo"
        ));
        let found = model
            .get_method_with_params(
                "Foo",
                BindingFlags::DEFAULT,
                &[SignatureParameter::new(TypeSignature::String)],
            )
            .unwrap()
            .unwrap();
        assert_eq!(found.declared_id(), Some(by_string));
    }

    #[test]
    fn test_constructors_query() {
        let universe = TestUniverse::new();
        let mut model = TypeModel::new(&universe.registry, &universe.circle).unwrap();
        let ctor = model
            .add_constructor(
                MethodAttributes::public(),
                vec![TypeSignature::R8],
                MethodBody::provided("init"),
            )
            .unwrap();

        assert_eq!(model.get_constructors(BindingFlags::PUBLIC | BindingFlags::INSTANCE).len(), 2);
        let found = model
            .get_constructor(
                BindingFlags::PUBLIC | BindingFlags::INSTANCE,
                &[SignatureParameter::new(TypeSignature::R8)],
            )
            .unwrap()
            .unwrap();
        assert_eq!(found.declared_id(), Some(ctor));
    }

    #[test]
    fn test_fields_and_properties_queries() {
        let universe = TestUniverse::new();
        let mut model = TypeModel::new(&universe.registry, &universe.circle).unwrap();
        model
            .add_field("radius", FieldAttributes::PRIVATE, TypeSignature::R8)
            .unwrap();
        model
            .add_property_with_accessors(
                "Radius",
                TypeSignature::R8,
                MethodAttributes::public(),
                Some(MethodBody::provided("get").into()),
                Some(MethodBody::provided("set").into()),
            )
            .unwrap();

        assert!(model
            .get_field("radius", BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE)
            .unwrap()
            .is_some());
        assert!(model
            .get_field("radius", BindingFlags::PUBLIC | BindingFlags::INSTANCE)
            .unwrap()
            .is_none());
        let radius = model
            .get_property("Radius", BindingFlags::PUBLIC | BindingFlags::INSTANCE)
            .unwrap()
            .unwrap();
        assert_eq!(radius.name(), "Radius");
        assert!(model
            .get_method("get_Radius", BindingFlags::PUBLIC | BindingFlags::INSTANCE)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_add_interface_rules() {
        let universe = TestUniverse::new();
        let mut model = TypeModel::new(&universe.registry, &universe.managed_resource).unwrap();

        assert!(matches!(
            model.add_interface(&universe.disposable),
            Err(Error::InterfaceAlreadyImplemented(name)) if name == "System.IDisposable"
        ));
        assert!(matches!(
            model.add_interface(&universe.shape),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(model.get_interfaces().len(), 1);
    }

    #[test]
    fn test_existing_interface_mapping_is_repointed() {
        let universe = TestUniverse::new();
        let mut model = TypeModel::new(&universe.registry, &universe.managed_resource).unwrap();

        let mapping = model.get_interface_map(&universe.disposable).unwrap();
        let dispose = universe.disposable.method_by_name("Dispose").unwrap();
        let existing = universe.managed_resource.method_by_name("Dispose").unwrap();
        let wrapper = model.get_mutable_method(&existing).unwrap();
        assert_eq!(
            mapping.target_of(&dispose),
            Some(&MethodTarget::Declared(wrapper))
        );

        model.set_method_body(wrapper, MethodBody::provided("dispose twice")).unwrap();
        let mapping = model.get_interface_map(&universe.disposable).unwrap();
        assert_eq!(mapping.target_of(&dispose), Some(&MethodTarget::Declared(wrapper)));
    }

    #[test]
    fn test_nested_types() {
        let universe = TestUniverse::new();
        let mut model = TypeModel::new(&universe.registry, &universe.circle).unwrap();

        model
            .add_nested_type("Cache", TypeAttributes::NESTED_PRIVATE, None)
            .unwrap();
        assert!(matches!(
            model.add_nested_type("Cache", TypeAttributes::NESTED_PUBLIC, None),
            Err(Error::SignatureCollision { .. })
        ));
        assert!(matches!(
            model.add_nested_type("Other", TypeAttributes::PUBLIC, None),
            Err(Error::InvalidFlags(_))
        ));
        assert_eq!(model.nested_types().len(), 1);
    }

    #[test]
    fn test_custom_attributes_and_initializations() {
        let universe = TestUniverse::new();
        let registry = &universe.registry;
        let serializable = TypeBuilder::new(registry)
            .class("System", "SerializableAttribute")
            .default_constructor()
            .build()
            .unwrap();

        let mut model = TypeModel::new(registry, &universe.circle).unwrap();
        let field = model
            .add_field("cache", FieldAttributes::PRIVATE, TypeSignature::Object)
            .unwrap();
        model
            .add_custom_attribute(AttributeTarget::Type, CustomAttributeDeclaration::new(&serializable))
            .unwrap();
        assert!(model
            .add_custom_attribute(AttributeTarget::Type, CustomAttributeDeclaration::new(&serializable))
            .is_err());
        model
            .add_custom_attribute(
                AttributeTarget::Field(field),
                CustomAttributeDeclaration::new(&serializable)
                    .with_arg(CustomAttributeArgument::Bool(true)),
            )
            .unwrap();
        assert_eq!(model.custom_attributes().len(), 1);
        assert_eq!(model.fields().get(field).unwrap().custom_attributes().len(), 1);

        model
            .add_initialization(Initialization("cache = new()".into()))
            .unwrap();
        model
            .add_type_initialization(Initialization("Counter = 0".into()))
            .unwrap();
        assert_eq!(model.instance_initializations().len(), 1);
        assert_eq!(model.type_initializations().len(), 1);
    }

    #[test]
    fn test_frozen_model_rejects_mutation() {
        let universe = TestUniverse::new();
        let mut model = TypeModel::new(&universe.registry, &universe.circle).unwrap();
        model.freeze();

        assert!(matches!(
            model.add_field("late", FieldAttributes::PUBLIC, TypeSignature::I4),
            Err(Error::ModelFrozen)
        ));
        assert!(matches!(
            model.add_initialization(Initialization("x".into())),
            Err(Error::ModelFrozen)
        ));
        // Queries keep working
        assert!(!model.get_methods(BindingFlags::ALL).is_empty());
    }

    #[test]
    fn test_set_original_body_on_added_method() {
        let universe = TestUniverse::new();
        let mut model = TypeModel::new(&universe.registry, &universe.circle).unwrap();
        let id = model
            .add_method(
                "Reset",
                MethodAttributes::public()
                    .with_modifiers(MethodModifiers::VIRTUAL)
                    .with_vtable(MethodVtableFlags::NEW_SLOT),
                void(vec![]),
                body(),
            )
            .unwrap();
        assert!(matches!(
            model.set_method_body(id, MethodBody::Original),
            Err(Error::InvalidArgument(_))
        ));

        let private = MethodAttributes::new(MethodAccessFlags::PRIVATE);
        let hidden = model.add_method("Hidden", private, void(vec![]), body()).unwrap();
        assert!(model
            .get_method("Hidden", BindingFlags::PUBLIC | BindingFlags::INSTANCE)
            .unwrap()
            .is_none());
        assert_eq!(
            model
                .get_method("Hidden", BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE)
                .unwrap()
                .and_then(|m| m.declared_id()),
            Some(hidden)
        );
    }
}
