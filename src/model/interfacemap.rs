//! Interface mappings of a type model.
//!
//! Each method of an implemented interface is mapped to the member that implements it,
//! with these rules applied in order:
//!
//! 1. A declared method registering the interface method as explicit base definition.
//! 2. For interfaces the original type does not implement: the first public instance method
//!    with the same name and signature (existing, then added, then inherited).
//! 3. For interfaces the original type implements: the original mapping, re-pointed to the
//!    declared member that now occupies the implementing slot.

use tracing::trace;

use crate::{
    metadata::{
        method::MethodRc,
        typesystem::{CilTypeRc, InterfaceMapProvider},
    },
    model::{BindingFlags, MemberEntry, MemberInfo, MethodId, TypeModel},
    Error::{InterfaceNotImplemented, InvalidArgument},
    Result,
};

/// The member implementing an interface method
#[derive(Debug, Clone)]
pub enum MethodTarget {
    /// A method declared by the model, existing or added
    Declared(MethodId),
    /// A method inherited from an ancestor
    Inherited(MethodRc),
    /// A method of the original type the member filter did not capture
    Uncaptured(MethodRc),
}

impl PartialEq for MethodTarget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MethodTarget::Declared(a), MethodTarget::Declared(b)) => a == b,
            (MethodTarget::Inherited(a), MethodTarget::Inherited(b))
            | (MethodTarget::Uncaptured(a), MethodTarget::Uncaptured(b)) => a.token == b.token,
            _ => false,
        }
    }
}

impl Eq for MethodTarget {}

/// One interface method and its implementation
#[derive(Debug, Clone)]
pub struct InterfaceMappingEntry {
    /// The method declared by the interface
    pub interface_method: MethodRc,
    /// The implementing member, `None` if unmapped
    pub target: Option<MethodTarget>,
}

/// The mapping of one interface
#[derive(Debug, Clone)]
pub struct InterfaceMapping {
    interface: CilTypeRc,
    entries: Vec<InterfaceMappingEntry>,
}

impl InterfaceMapping {
    /// The mapped interface
    #[must_use]
    pub fn interface(&self) -> &CilTypeRc {
        &self.interface
    }

    /// Entries in declaration order of the interface methods
    #[must_use]
    pub fn entries(&self) -> &[InterfaceMappingEntry] {
        &self.entries
    }

    /// Every interface method has an implementation
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|entry| entry.target.is_some())
    }

    /// The implementation of `interface_method`
    #[must_use]
    pub fn target_of(&self, interface_method: &MethodRc) -> Option<&MethodTarget> {
        self.entries
            .iter()
            .find(|entry| entry.interface_method.token == interface_method.token)
            .and_then(|entry| entry.target.as_ref())
    }

    /// Interface methods without implementation
    pub fn unmapped(&self) -> impl Iterator<Item = &MethodRc> {
        self.entries
            .iter()
            .filter(|entry| entry.target.is_none())
            .map(|entry| &entry.interface_method)
    }
}

fn by_signature(model: &TypeModel, interface_method: &MethodRc) -> Option<MethodTarget> {
    model
        .get_methods(BindingFlags::PUBLIC | BindingFlags::INSTANCE)
        .into_iter()
        .find(|entry| {
            let (name, signature) = match entry {
                MemberEntry::Declared(_, method) => (method.name(), method.signature()),
                MemberEntry::Inherited(method) => (method.name.as_str(), &method.signature),
            };
            name == interface_method.name && signature.matches(&interface_method.signature)
        })
        .map(|entry| match entry {
            MemberEntry::Declared(id, _) => MethodTarget::Declared(id),
            MemberEntry::Inherited(method) => MethodTarget::Inherited(method.clone()),
        })
}

fn repoint(model: &TypeModel, target: &MethodRc) -> Result<MethodTarget> {
    if let Some(id) = model.methods.id_of_original(target.token) {
        return Ok(MethodTarget::Declared(id));
    }
    if target.declaring_token() == model.snapshot.token() {
        return Ok(MethodTarget::Uncaptured(target.clone()));
    }
    if target.is_virtual() {
        let root = match model.inherited_method_roots.get(&target.token) {
            Some(root) => *root,
            None => model.finder.root_or_self(target)?.token,
        };
        if let Some(id) = model.declared_override(root) {
            return Ok(MethodTarget::Declared(id));
        }
    }
    Ok(MethodTarget::Inherited(target.clone()))
}

/// Map every instance method of `interface` for `model`
pub(super) fn compute_mapping(
    model: &TypeModel,
    provider: &dyn InterfaceMapProvider,
    interface: &CilTypeRc,
    allow_partial: bool,
) -> Result<InterfaceMapping> {
    if !interface.is_interface() {
        return Err(InvalidArgument(format!(
            "'{}' is not an interface",
            interface.fullname()
        )));
    }
    if !model.implements(interface) {
        return Err(InvalidArgument(format!(
            "'{}' does not implement '{}'",
            model.fullname(),
            interface.fullname()
        )));
    }

    let inherited_mapping = model.snapshot.implements(interface.token);
    let original = if inherited_mapping {
        provider.interface_map(model.snapshot.original(), interface)?
    } else {
        Vec::new()
    };

    let mut entries = Vec::with_capacity(interface.methods.len());
    for interface_method in interface.methods.iter().filter(|m| !m.is_static()) {
        let explicit = model
            .methods
            .declared()
            .find(|(_, method)| method.has_explicit_base(interface_method.token))
            .map(|(id, _)| MethodTarget::Declared(id));

        let target = match explicit {
            Some(target) => Some(target),
            None if !inherited_mapping => by_signature(model, interface_method),
            None => original
                .iter()
                .find(|mapping| mapping.interface_method.token == interface_method.token)
                .and_then(|mapping| mapping.target_method.as_ref())
                .map(|target| repoint(model, target))
                .transpose()?,
        };

        trace!(
            interface_method = %interface_method.fullname(),
            target = ?target,
            "interface mapping"
        );
        entries.push(InterfaceMappingEntry {
            interface_method: interface_method.clone(),
            target,
        });
    }

    let mapping = InterfaceMapping {
        interface: interface.clone(),
        entries,
    };
    if !allow_partial && !mapping.is_complete() {
        return Err(InterfaceNotImplemented {
            interface: interface.fullname(),
            methods: mapping.unmapped().map(|m| m.name.clone()).collect(),
        });
    }
    Ok(mapping)
}
