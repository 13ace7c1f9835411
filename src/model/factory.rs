//! Validation and creation of members.
//!
//! Every structural mutation of a [`TypeModel`] ends up here. Each operation checks the
//! complete request first (names, flag combinations, signature collisions, the override
//! rules of the hierarchy) and only then registers anything, so a failing call leaves the
//! model untouched. Operations registering several members roll back on failure.

use tracing::debug;

use crate::{
    metadata::{
        members::FieldAttributes,
        method::{
            MethodAccessFlags, MethodAttributes, MethodModifiers, MethodRc, MethodVtableFlags,
            CONSTRUCTOR_NAME, TYPE_INITIALIZER_NAME,
        },
        signatures::{SignatureField, SignatureMethod, SignatureProperty, TypeSignature},
        token::{Token, TokenTable},
        typesystem::{CilTypeList, CilTypeRc, TypeAttributes},
    },
    model::{
        collection::{ancestor_levels, is_ancestor_member},
        typemodel::NestedTypeDeclaration,
        AccessorBody, ConstructorId, EventId, ExplicitBaseDefinition, FieldId, MemberInfo,
        MemberKind, MethodBody, MethodId, MethodOrigin, MethodTarget, MutableConstructor,
        MutableEvent, MutableField, MutableMethod, MutableProperty, PropertyId, TypeModel,
    },
    Error::{FinalOverride, InvalidArgument, InvalidFlags, InvalidOperation, SignatureCollision},
    Result,
};

const FIELD_ACCESS_RESERVED: u32 = 0x0007;

/// Creates validated members for one [`TypeModel`]
pub(crate) struct MutableMemberFactory<'m> {
    model: &'m mut TypeModel,
}

impl<'m> MutableMemberFactory<'m> {
    pub(crate) fn new(model: &'m mut TypeModel) -> Self {
        MutableMemberFactory { model }
    }

    fn allocate(&self, table: u8) -> Token {
        self.model.registry.allocate_token(table)
    }

    fn levels(&self) -> Result<CilTypeList> {
        ancestor_levels(
            &self.model.snapshot,
            self.model.options.config.max_hierarchy_depth,
        )
    }

    fn has_method(&self, name: &str, signature: &SignatureMethod) -> bool {
        self.model
            .methods
            .declared()
            .any(|(_, method)| method.name() == name && method.signature().matches(signature))
    }

    fn push_method(&mut self, method: MutableMethod) -> MethodId {
        let id = self.model.methods.add(method);
        self.model.invalidate_derived_state();
        id
    }

    pub(crate) fn create_field(
        &mut self,
        name: &str,
        flags: u32,
        field_type: TypeSignature,
    ) -> Result<FieldId> {
        if name.is_empty() {
            return Err(InvalidArgument("Field name must not be empty".to_string()));
        }
        if flags & FieldAttributes::FIELD_ACCESS_MASK == FIELD_ACCESS_RESERVED {
            return Err(InvalidFlags(format!(
                "Field '{}' uses the reserved access value 7",
                name
            )));
        }
        if flags & FieldAttributes::LITERAL != 0 {
            if flags & FieldAttributes::STATIC == 0 {
                return Err(InvalidFlags(format!("Literal field '{}' must be static", name)));
            }
            if flags & FieldAttributes::INIT_ONLY != 0 {
                return Err(InvalidFlags(format!(
                    "Literal field '{}' cannot be init-only",
                    name
                )));
            }
        }

        let signature = SignatureField::new(field_type);
        if self
            .model
            .fields
            .declared()
            .any(|(_, field)| field.name() == name && field.signature() == &signature)
        {
            return Err(SignatureCollision {
                kind: MemberKind::Field,
                name: name.to_string(),
                signature: signature.to_string(),
            });
        }

        let token = self.allocate(TokenTable::FIELD);
        let id = self.model.fields.add(MutableField::added(
            token,
            self.model.token,
            name.to_string(),
            flags,
            signature,
        ));
        self.model.invalidate_derived_state();

        debug!(field = name, token = %token, "added field");
        Ok(id)
    }

    pub(crate) fn create_constructor(
        &mut self,
        attributes: MethodAttributes,
        params: Vec<TypeSignature>,
        body: MethodBody,
    ) -> Result<ConstructorId> {
        if attributes.is_virtual()
            || attributes.is_abstract()
            || attributes.is_final()
            || attributes.is_new_slot()
        {
            return Err(InvalidFlags(format!(
                "Constructors cannot be virtual, abstract, final or new slots ({})",
                attributes
            )));
        }
        if attributes.is_static() {
            return Err(InvalidFlags(
                "Static constructors are added as type initializers".to_string(),
            ));
        }
        if body == MethodBody::Original {
            return Err(InvalidArgument(
                "An added constructor has no original body".to_string(),
            ));
        }

        let signature = SignatureMethod::instance(TypeSignature::Void, params);
        if self
            .model
            .constructors
            .declared()
            .any(|(_, ctor)| !ctor.is_type_initializer() && ctor.signature().matches(&signature))
        {
            return Err(SignatureCollision {
                kind: MemberKind::Constructor,
                name: CONSTRUCTOR_NAME.to_string(),
                signature: signature.to_string(),
            });
        }

        let token = self.allocate(TokenTable::METHOD_DEF);
        let id = self.model.constructors.add(MutableConstructor::added(
            token,
            self.model.token,
            CONSTRUCTOR_NAME,
            attributes
                .with_modifiers(MethodModifiers::SPECIAL_NAME | MethodModifiers::RTSPECIAL_NAME),
            signature,
            body,
        ));
        self.model.invalidate_derived_state();

        debug!(token = %token, "added constructor");
        Ok(id)
    }

    pub(crate) fn create_type_initializer(&mut self, body: MethodBody) -> Result<ConstructorId> {
        if self
            .model
            .constructors
            .declared()
            .any(|(_, ctor)| ctor.is_type_initializer())
        {
            return Err(InvalidOperation(format!(
                "'{}' already has a type initializer",
                self.model.fullname()
            )));
        }
        if body == MethodBody::Original {
            return Err(InvalidArgument(
                "An added type initializer has no original body".to_string(),
            ));
        }

        let token = self.allocate(TokenTable::METHOD_DEF);
        let id = self.model.constructors.add(MutableConstructor::added(
            token,
            self.model.token,
            TYPE_INITIALIZER_NAME,
            MethodAttributes::new(MethodAccessFlags::PRIVATE).with_modifiers(
                MethodModifiers::STATIC
                    | MethodModifiers::SPECIAL_NAME
                    | MethodModifiers::RTSPECIAL_NAME,
            ),
            SignatureMethod::new_static(TypeSignature::Void, vec![]),
            body,
        ));
        self.model.invalidate_derived_state();

        debug!(token = %token, "added type initializer");
        Ok(id)
    }

    fn validate_method(
        name: &str,
        attributes: MethodAttributes,
        body: Option<&MethodBody>,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(InvalidArgument("Method name must not be empty".to_string()));
        }
        if name == CONSTRUCTOR_NAME || name == TYPE_INITIALIZER_NAME {
            return Err(InvalidArgument(format!(
                "'{}' is reserved for constructors",
                name
            )));
        }
        if attributes.modifiers.contains(MethodModifiers::RTSPECIAL_NAME) {
            return Err(InvalidFlags(format!(
                "'{}' cannot be runtime special name",
                name
            )));
        }
        if !attributes.is_virtual()
            && (attributes.is_abstract() || attributes.is_new_slot() || attributes.is_final())
        {
            return Err(InvalidFlags(format!(
                "'{}' is abstract, final or a new slot without being virtual",
                name
            )));
        }
        if attributes.is_static() && attributes.is_virtual() {
            return Err(InvalidFlags(format!("'{}' cannot be static and virtual", name)));
        }

        match body {
            Some(_) if attributes.is_abstract() => Err(InvalidFlags(format!(
                "Abstract method '{}' cannot have a body",
                name
            ))),
            Some(MethodBody::Original) => Err(InvalidArgument(format!(
                "Added method '{}' has no original body",
                name
            ))),
            None if !attributes.is_abstract() => Err(InvalidArgument(format!(
                "Method '{}' needs a body",
                name
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn create_method(
        &mut self,
        name: &str,
        attributes: MethodAttributes,
        mut signature: SignatureMethod,
        body: Option<MethodBody>,
    ) -> Result<MethodId> {
        Self::validate_method(name, attributes, body.as_ref())?;
        signature.has_this = !attributes.is_static();

        if self.has_method(name, &signature) {
            return Err(SignatureCollision {
                kind: MemberKind::Method,
                name: name.to_string(),
                signature: signature.to_string(),
            });
        }

        // A virtual method reusing a slot binds to the most-derived inherited one
        let mut base_root = None;
        if attributes.is_virtual() && !attributes.is_new_slot() {
            if let Some(base) = self.model.snapshot.base() {
                let slot = self
                    .model
                    .finder
                    .get_most_derived_virtual_method(name, &signature, base)?;
                if let Some(slot) = slot.filter(|slot| !slot.flags_access.is_private()) {
                    if slot.is_final() {
                        return Err(FinalOverride(slot.fullname()));
                    }
                    base_root = Some(self.model.finder.root_or_self(&slot)?);
                }
            }
        }
        if let Some(root) = &base_root {
            if let Some(other) = self.model.declared_override(root.token) {
                return Err(InvalidOperation(format!(
                    "'{}' would override '{}', which '{}' already overrides",
                    name,
                    root.fullname(),
                    self.model.methods.get(other)?.name()
                )));
            }
        }

        let token = self.allocate(TokenTable::METHOD_DEF);
        let id = self.push_method(MutableMethod::added(
            token,
            self.model.token,
            name.to_string(),
            attributes,
            signature,
            MethodOrigin::Added,
            body,
            base_root,
        ));

        debug!(method = name, token = %token, attributes = %attributes, "added method");
        Ok(id)
    }

    pub(crate) fn create_property(
        &mut self,
        name: &str,
        flags: u32,
        getter: Option<MethodId>,
        setter: Option<MethodId>,
    ) -> Result<PropertyId> {
        if name.is_empty() {
            return Err(InvalidArgument("Property name must not be empty".to_string()));
        }

        let methods = &self.model.methods;
        let getter_method = getter.map(|id| methods.get(id)).transpose()?;
        let setter_method = setter.map(|id| methods.get(id)).transpose()?;

        let (property_type, params) = match (getter_method, setter_method) {
            (None, None) => {
                return Err(InvalidArgument(format!(
                    "Property '{}' needs at least one accessor",
                    name
                )))
            }
            (Some(get), _) => {
                if get.signature().return_type.base.is_void() {
                    return Err(InvalidArgument(format!(
                        "Getter '{}' of property '{}' returns void",
                        get.name(),
                        name
                    )));
                }
                (
                    get.signature().return_type.base.clone(),
                    get.signature().params.clone(),
                )
            }
            (None, Some(set)) => {
                let Some((value, index)) = set.signature().params.split_last() else {
                    return Err(InvalidArgument(format!(
                        "Setter '{}' of property '{}' takes no value",
                        set.name(),
                        name
                    )));
                };
                (value.base.clone(), index.to_vec())
            }
        };

        if let Some(set) = setter_method {
            let signature = set.signature();
            let fits = signature.return_type.base.is_void()
                && signature.params.split_last().is_some_and(|(value, index)| {
                    value.base == property_type && index == params.as_slice()
                });
            if !fits {
                return Err(InvalidArgument(format!(
                    "Setter '{}' does not match the type of property '{}'",
                    set.name(),
                    name
                )));
            }
        }

        let accessors = [getter_method, setter_method];
        let mut present = accessors.iter().flatten();
        let is_static = present.next().is_some_and(|first| first.is_static());
        if accessors.iter().flatten().any(|m| m.is_static() != is_static) {
            return Err(InvalidArgument(format!(
                "Accessors of property '{}' mix static and instance methods",
                name
            )));
        }
        let is_public = accessors.iter().flatten().any(|m| m.is_public());

        let signature = SignatureProperty {
            has_this: !is_static,
            base: property_type,
            params,
        };
        if self
            .model
            .properties
            .declared()
            .any(|(_, property)| property.name() == name && property.signature().matches(&signature))
        {
            return Err(SignatureCollision {
                kind: MemberKind::Property,
                name: name.to_string(),
                signature: signature.to_string(),
            });
        }

        let token = self.allocate(TokenTable::PROPERTY);
        let id = self.model.properties.add(MutableProperty::new(
            token,
            self.model.token,
            name.to_string(),
            flags,
            signature,
            None,
            getter,
            setter,
            (is_public, is_static),
        ));
        self.model.invalidate_derived_state();

        debug!(property = name, token = %token, "added property");
        Ok(id)
    }

    fn accessor(
        &mut self,
        name: String,
        attributes: MethodAttributes,
        signature: SignatureMethod,
        body: AccessorBody,
    ) -> Result<MethodId> {
        let attributes = match body {
            AccessorBody::Abstract => attributes.with_modifiers(MethodModifiers::ABSTRACT),
            AccessorBody::Body(_) => attributes,
        }
        .with_modifiers(MethodModifiers::SPECIAL_NAME);
        self.create_method(&name, attributes, signature, body.into_body())
    }

    /// Run `build`, dropping every method it registered if it fails
    fn with_rollback<T>(&mut self, build: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let checkpoint = self.model.methods.len();
        let result = build(self);
        if result.is_err() {
            self.model.methods.truncate(checkpoint);
            self.model.invalidate_derived_state();
        }
        result
    }

    pub(crate) fn create_property_with_accessors(
        &mut self,
        name: &str,
        property_type: TypeSignature,
        attributes: MethodAttributes,
        getter: Option<AccessorBody>,
        setter: Option<AccessorBody>,
    ) -> Result<PropertyId> {
        if getter.is_none() && setter.is_none() {
            return Err(InvalidArgument(format!(
                "Property '{}' needs at least one accessor",
                name
            )));
        }

        self.with_rollback(|factory| {
            let getter = getter
                .map(|body| {
                    factory.accessor(
                        format!("get_{}", name),
                        attributes,
                        SignatureMethod::instance(property_type.clone(), vec![]),
                        body,
                    )
                })
                .transpose()?;
            let setter = setter
                .map(|body| {
                    factory.accessor(
                        format!("set_{}", name),
                        attributes,
                        SignatureMethod::instance(
                            TypeSignature::Void,
                            vec![property_type.clone()],
                        ),
                        body,
                    )
                })
                .transpose()?;
            factory.create_property(name, 0, getter, setter)
        })
    }

    pub(crate) fn create_event(
        &mut self,
        name: &str,
        flags: u32,
        adder: MethodId,
        remover: MethodId,
        raiser: Option<MethodId>,
    ) -> Result<EventId> {
        if name.is_empty() {
            return Err(InvalidArgument("Event name must not be empty".to_string()));
        }

        let methods = &self.model.methods;
        let add = methods.get(adder)?;
        let remove = methods.get(remover)?;
        if let Some(raiser) = raiser {
            methods.get(raiser)?;
        }

        let handler = |method: &MutableMethod| match method.signature().params.as_slice() {
            [handler] if method.signature().return_type.base.is_void() => {
                Some(handler.base.clone())
            }
            _ => None,
        };
        let event_type = match (handler(add), handler(remove)) {
            (Some(add_type), Some(remove_type)) if add_type == remove_type => add_type,
            _ => {
                return Err(InvalidArgument(format!(
                    "Accessors of event '{}' must take one handler of the same type",
                    name
                )))
            }
        };
        if add.is_static() != remove.is_static() {
            return Err(InvalidArgument(format!(
                "Accessors of event '{}' mix static and instance methods",
                name
            )));
        }
        let visibility = (add.is_public() || remove.is_public(), add.is_static());

        if self
            .model
            .events
            .declared()
            .any(|(_, event)| event.name() == name)
        {
            return Err(SignatureCollision {
                kind: MemberKind::Event,
                name: name.to_string(),
                signature: format!(" : {}", event_type),
            });
        }

        let token = self.allocate(TokenTable::EVENT);
        let id = self.model.events.add(MutableEvent::new(
            token,
            self.model.token,
            name.to_string(),
            flags,
            event_type,
            None,
            (adder, remover, raiser),
            visibility,
        ));
        self.model.invalidate_derived_state();

        debug!(event = name, token = %token, "added event");
        Ok(id)
    }

    pub(crate) fn create_event_with_accessors(
        &mut self,
        name: &str,
        handler: TypeSignature,
        attributes: MethodAttributes,
        adder: AccessorBody,
        remover: AccessorBody,
    ) -> Result<EventId> {
        self.with_rollback(|factory| {
            let accessor_signature = SignatureMethod::instance(TypeSignature::Void, vec![handler]);
            let add = factory.accessor(
                format!("add_{}", name),
                attributes,
                accessor_signature.clone(),
                adder,
            )?;
            let remove = factory.accessor(
                format!("remove_{}", name),
                attributes,
                accessor_signature,
                remover,
            )?;
            factory.create_event(name, 0, add, remove, None)
        })
    }

    pub(crate) fn create_nested_type(
        &mut self,
        name: &str,
        flags: u32,
        base: Option<&CilTypeRc>,
    ) -> Result<Token> {
        if name.is_empty() {
            return Err(InvalidArgument("Nested type name must not be empty".to_string()));
        }
        let visibility = flags & TypeAttributes::VISIBILITY_MASK;
        if !(TypeAttributes::NESTED_PUBLIC..=TypeAttributes::NESTED_FAM_OR_ASSEM)
            .contains(&visibility)
        {
            return Err(InvalidFlags(format!(
                "Nested type '{}' needs a nested visibility, got 0x{:x}",
                name, visibility
            )));
        }
        if let Some(base) = base {
            if base.is_interface() || base.is_sealed() {
                return Err(InvalidArgument(format!(
                    "'{}' cannot be the base type of nested type '{}'",
                    base.fullname(),
                    name
                )));
            }
        }
        if self
            .model
            .nested_types
            .iter()
            .any(|nested| nested.name == name)
        {
            return Err(SignatureCollision {
                kind: MemberKind::NestedType,
                name: name.to_string(),
                signature: String::new(),
            });
        }

        let token = self.allocate(TokenTable::TYPE_DEF);
        self.model.nested_types.push(NestedTypeDeclaration {
            token,
            name: name.to_string(),
            flags,
            base: base.cloned(),
        });
        self.model.invalidate_derived_state();

        debug!(nested_type = name, token = %token, "added nested type");
        Ok(token)
    }

    /// Root definition of `base`, if `base` is an overridable method of an ancestor or an
    /// interface method of an implemented interface
    fn explicit_root(&self, base: &MethodRc) -> Result<Token> {
        let Some(declaring) = base.declaring_type() else {
            return Err(InvalidArgument(format!(
                "'{}' has no declaring type",
                base.name
            )));
        };

        if declaring.is_interface() {
            if !self.model.implements(&declaring) {
                return Err(InvalidArgument(format!(
                    "Interface '{}' is not implemented by '{}'",
                    declaring.fullname(),
                    self.model.fullname()
                )));
            }
            return Ok(base.token);
        }

        if !is_ancestor_member(&self.levels()?, declaring.token) {
            return Err(InvalidArgument(format!(
                "'{}' is not a member of a base type of '{}'",
                base.fullname(),
                self.model.fullname()
            )));
        }
        if base.flags_access.is_private() {
            return Err(InvalidArgument(format!(
                "'{}' is private and cannot be overridden",
                base.fullname()
            )));
        }
        Ok(self.model.finder.root_or_self(base)?.token)
    }

    pub(crate) fn add_explicit_base_definition(
        &mut self,
        id: MethodId,
        base: &MethodRc,
    ) -> Result<()> {
        let method = self.model.methods.get(id)?;
        if !method.is_virtual() {
            return Err(InvalidArgument(format!(
                "'{}' is not virtual and cannot override '{}'",
                method.name(),
                base.fullname()
            )));
        }
        if !base.is_virtual() || base.is_static() {
            return Err(InvalidArgument(format!(
                "'{}' is not a virtual instance method",
                base.fullname()
            )));
        }
        if base.is_final() {
            return Err(FinalOverride(base.fullname()));
        }
        if !base.signature.matches(method.signature()) {
            return Err(InvalidArgument(format!(
                "Signature of '{}' does not match '{}'",
                method.name(),
                base.fullname()
            )));
        }

        let root = self.explicit_root(base)?;
        if let Some(other) = self.model.declared_override(root).filter(|&other| other != id) {
            return Err(InvalidOperation(format!(
                "'{}' is already overridden by '{}'",
                base.fullname(),
                self.model.methods.get(other)?.name()
            )));
        }
        self.model
            .methods
            .get_mut(id)?
            .add_explicit_base(ExplicitBaseDefinition {
                definition: base.clone(),
                root,
            })?;
        self.model.invalidate_derived_state();

        debug!(base = %base.fullname(), root = %root, "registered explicit base definition");
        Ok(())
    }

    /// The method a virtual call through the slot `root` dispatches to in the base type
    fn most_derived_implementation(
        &self,
        levels: &[CilTypeRc],
        base: &MethodRc,
        root: Token,
    ) -> Result<MethodRc> {
        let finder = &self.model.finder;
        for level in levels {
            for imp in &level.overrides {
                if finder.root_or_self(&imp.declaration)?.token == root {
                    return Ok(imp.body.clone());
                }
            }
            for method in &level.methods {
                if method.is_virtual()
                    && method.name == base.name
                    && method.signature.matches(&base.signature)
                    && finder.root_or_self(method)?.token == root
                {
                    return Ok(method.clone());
                }
            }
        }
        Ok(base.clone())
    }

    pub(crate) fn get_or_create_override(&mut self, base: &MethodRc) -> Result<MethodId> {
        if let Some(id) = self.model.methods.id_of_original(base.token) {
            return Ok(id);
        }

        let levels = self.levels()?;
        if !is_ancestor_member(&levels, base.declaring_token()) {
            return Err(InvalidArgument(format!(
                "'{}' is not a member of a base type of '{}'",
                base.fullname(),
                self.model.fullname()
            )));
        }
        if !base.is_virtual() || base.is_static() {
            return Err(InvalidArgument(format!(
                "'{}' is not a virtual instance method",
                base.fullname()
            )));
        }
        if base.flags_access.is_private() {
            return Err(InvalidArgument(format!(
                "'{}' is private and cannot be overridden",
                base.fullname()
            )));
        }

        let root = self.model.finder.root_or_self(base)?;
        if let Some(id) = self.model.declared_override(root.token) {
            return Ok(id);
        }

        let most_derived = self.most_derived_implementation(&levels, base, root.token)?;
        if most_derived.is_final() {
            return Err(FinalOverride(most_derived.fullname()));
        }

        // An implicit override binds by name and signature; fall back to an explicit one if
        // that binding would land on another slot or the name is taken
        let implicit_binding = match self.model.snapshot.base() {
            Some(start) => self
                .model
                .finder
                .get_most_derived_virtual_method(&base.name, &base.signature, start)?,
            None => None,
        };
        let implicit_root = implicit_binding
            .map(|slot| self.model.finder.root_or_self(&slot))
            .transpose()?;
        let explicit = implicit_root.map_or(true, |slot_root| slot_root.token != root.token)
            || self.has_method(&base.name, &base.signature);

        let is_abstract = most_derived.is_abstract();
        let body = (!is_abstract).then(|| MethodBody::CallBase(most_derived.token));
        let mut signature = base.signature.clone();
        signature.has_this = true;

        let declaring = base.declaring_type().map_or_else(String::new, |ty| ty.fullname());
        let (name, attributes, base_root) = if explicit {
            let mut attributes = MethodAttributes::new(MethodAccessFlags::PRIVATE)
                .with_modifiers(
                    MethodModifiers::VIRTUAL | MethodModifiers::FINAL | MethodModifiers::HIDE_BY_SIG,
                )
                .with_vtable(MethodVtableFlags::NEW_SLOT);
            if is_abstract {
                attributes.access = base.flags_access;
                attributes.modifiers.remove(MethodModifiers::FINAL);
                attributes.modifiers |= MethodModifiers::ABSTRACT;
            }
            (format!("{}.{}", declaring, base.name), attributes, None)
        } else {
            let mut attributes = MethodAttributes::new(base.flags_access)
                .with_modifiers(MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG);
            if is_abstract {
                attributes.modifiers |= MethodModifiers::ABSTRACT;
            }
            (base.name.clone(), attributes, Some(root.clone()))
        };

        if self.has_method(&name, &signature) {
            return Err(SignatureCollision {
                kind: MemberKind::Method,
                name,
                signature: signature.to_string(),
            });
        }

        let mut method = MutableMethod::added(
            self.allocate(TokenTable::METHOD_DEF),
            self.model.token,
            name,
            attributes,
            signature,
            MethodOrigin::Override { base: base.clone() },
            body,
            base_root,
        );
        if explicit {
            method.add_explicit_base(ExplicitBaseDefinition {
                definition: base.clone(),
                root: root.token,
            })?;
        }

        debug!(
            base = %base.fullname(),
            method = %method.name(),
            explicit,
            calls = %most_derived.fullname(),
            "created override"
        );
        Ok(self.push_method(method))
    }

    pub(crate) fn get_or_create_implementation(
        &mut self,
        interface_method: &MethodRc,
    ) -> Result<MethodId> {
        let Some(interface) = interface_method.declaring_type() else {
            return Err(InvalidArgument(format!(
                "'{}' has no declaring type",
                interface_method.name
            )));
        };
        if !interface.is_interface() {
            return Err(InvalidArgument(format!(
                "'{}' is not an interface method",
                interface_method.fullname()
            )));
        }

        let mapping = self.model.get_interface_map_partial(&interface)?;
        let explicit_base = ExplicitBaseDefinition {
            definition: interface_method.clone(),
            root: interface_method.token,
        };

        match mapping.target_of(interface_method) {
            Some(MethodTarget::Declared(id)) => Ok(*id),
            Some(MethodTarget::Uncaptured(target)) => Err(InvalidOperation(format!(
                "'{}' is implemented by '{}', which the member filter did not capture",
                interface_method.fullname(),
                target.fullname()
            ))),
            Some(MethodTarget::Inherited(target)) if target.is_final() => {
                Err(FinalOverride(target.fullname()))
            }
            Some(MethodTarget::Inherited(target)) if target.is_virtual() => {
                let id = self.get_or_create_override(target)?;
                let method = self.model.methods.get_mut(id)?;
                if !method.has_explicit_base(interface_method.token) {
                    method.add_explicit_base(explicit_base)?;
                    self.model.invalidate_derived_state();
                }
                debug!(
                    interface_method = %interface_method.fullname(),
                    "interface implementation redirected to override"
                );
                Ok(id)
            }
            Some(MethodTarget::Inherited(target)) => {
                // A non-virtual inherited implementation is wrapped by a sealed forwarder
                let attributes = MethodAttributes::public()
                    .with_modifiers(MethodModifiers::VIRTUAL | MethodModifiers::FINAL)
                    .with_vtable(MethodVtableFlags::NEW_SLOT);
                let body = Some(MethodBody::CallBase(target.token));
                self.create_implementation(interface_method, &interface, attributes, body, explicit_base)
            }
            None => {
                let attributes = MethodAttributes::public()
                    .with_modifiers(MethodModifiers::VIRTUAL | MethodModifiers::ABSTRACT)
                    .with_vtable(MethodVtableFlags::NEW_SLOT);
                self.create_implementation(interface_method, &interface, attributes, None, explicit_base)
            }
        }
    }

    fn create_implementation(
        &mut self,
        interface_method: &MethodRc,
        interface: &CilTypeRc,
        attributes: MethodAttributes,
        body: Option<MethodBody>,
        explicit_base: ExplicitBaseDefinition,
    ) -> Result<MethodId> {
        let mut signature = interface_method.signature.clone();
        signature.has_this = true;

        let mut name = interface_method.name.clone();
        if self.has_method(&name, &signature) {
            name = format!("{}.{}", interface.fullname(), interface_method.name);
            if self.has_method(&name, &signature) {
                return Err(SignatureCollision {
                    kind: MemberKind::Method,
                    name,
                    signature: signature.to_string(),
                });
            }
        }

        let mut method = MutableMethod::added(
            self.allocate(TokenTable::METHOD_DEF),
            self.model.token,
            name,
            attributes,
            signature,
            MethodOrigin::Implementation {
                interface_method: interface_method.clone(),
            },
            body,
            None,
        );
        method.add_explicit_base(explicit_base)?;

        debug!(
            interface_method = %interface_method.fullname(),
            method = %method.name(),
            "created interface implementation"
        );
        Ok(self.push_method(method))
    }
}
