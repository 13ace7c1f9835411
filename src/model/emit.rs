//! Hand-off of a finished model to an emission backend.
//!
//! [`TypeModel::emit`] freezes the model and walks it in a fixed order, calling one
//! [`TypeEmitter`] hook per element. Every hook has an empty default, so a backend only
//! implements what it cares about.

use crate::{
    model::{
        ConstructorId, EventId, FieldId, InterfaceMapping, MethodId, MutableConstructor,
        MutableEvent, MutableField, MutableMethod, MutableProperty, NestedTypeDeclaration,
        PropertyId, TypeModel,
    },
    Result,
};

/// Receives the elements of a frozen [`TypeModel`]
///
/// The order of calls is: `begin_type`, one `emit_interface` per implemented interface, the
/// declared fields, constructors, methods, properties, events and nested types (existing
/// members before added ones), then `end_type`. An error returned by any hook aborts the walk.
///
/// # Examples
///
/// ```rust
/// use dotweave::prelude::*;
/// use dotweave::model::{MethodId, MutableMethod, TypeEmitter};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct MethodNames(Vec<String>);
///
/// impl TypeEmitter for MethodNames {
///     fn emit_method(&mut self, _: &TypeModel, _: MethodId, method: &MutableMethod) -> Result<()> {
///         self.0.push(method.name().to_string());
///         Ok(())
///     }
/// }
///
/// let registry = Arc::new(TypeRegistry::new()?);
/// let widget = TypeBuilder::new(&registry)
///     .class("Demo", "Widget")
///     .default_constructor()
///     .build()?;
///
/// let mut model = TypeModel::new(&registry, &widget)?;
/// let sig = SignatureMethod::instance(TypeSignature::Void, vec![]);
/// model.add_method("Run", MethodAttributes::public(), sig, Some(MethodBody::provided("run")))?;
///
/// let mut names = MethodNames::default();
/// model.emit(&mut names)?;
/// assert_eq!(names.0, vec!["Run"]);
/// assert!(model.is_frozen());
/// # Ok::<(), dotweave::Error>(())
/// ```
#[allow(unused_variables)]
pub trait TypeEmitter {
    /// Called first
    fn begin_type(&mut self, model: &TypeModel) -> Result<()> {
        Ok(())
    }

    /// Called once per implemented interface with its complete mapping
    fn emit_interface(&mut self, model: &TypeModel, mapping: &InterfaceMapping) -> Result<()> {
        Ok(())
    }

    /// Called for every declared field
    fn emit_field(&mut self, model: &TypeModel, id: FieldId, field: &MutableField) -> Result<()> {
        Ok(())
    }

    /// Called for every declared constructor, the type initializer included
    fn emit_constructor(
        &mut self,
        model: &TypeModel,
        id: ConstructorId,
        ctor: &MutableConstructor,
    ) -> Result<()> {
        Ok(())
    }

    /// Called for every declared method
    fn emit_method(&mut self, model: &TypeModel, id: MethodId, method: &MutableMethod) -> Result<()> {
        Ok(())
    }

    /// Called for every declared property
    fn emit_property(
        &mut self,
        model: &TypeModel,
        id: PropertyId,
        property: &MutableProperty,
    ) -> Result<()> {
        Ok(())
    }

    /// Called for every declared event
    fn emit_event(&mut self, model: &TypeModel, id: EventId, event: &MutableEvent) -> Result<()> {
        Ok(())
    }

    /// Called for every nested type declared through the model
    fn emit_nested_type(
        &mut self,
        model: &TypeModel,
        nested: &NestedTypeDeclaration,
    ) -> Result<()> {
        Ok(())
    }

    /// Called last
    fn end_type(&mut self, model: &TypeModel) -> Result<()> {
        Ok(())
    }
}
