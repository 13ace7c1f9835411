//! Integration tests for overrides, interface implementations and abstractness.

use std::sync::Arc;

use dotweave::{metadata::method::MethodVtableFlags, prelude::*};

struct Hierarchy {
    registry: Arc<TypeRegistry>,
    shape: CilTypeRc,
    polygon: CilTypeRc,
    circle: CilTypeRc,
    disposable: CilTypeRc,
    resource: CilTypeRc,
    closer: CilTypeRc,
}

/// Shape (abstract Area) <- Polygon (abstract, no override) and <- Circle (overrides Area),
/// IDisposable <- Resource (virtual Dispose), Closer (non-virtual Dispose)
fn hierarchy() -> Result<Hierarchy> {
    let registry = Arc::new(TypeRegistry::new()?);
    let shape = TypeBuilder::new(&registry)
        .class("Demo", "Shape")
        .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT)
        .default_constructor()
        .method(|m| m.name("Area").public().abstract_virtual().returns(TypeSignature::R8))
        .build()?;
    let polygon = TypeBuilder::new(&registry)
        .class("Demo", "Polygon")
        .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT)
        .extends(&shape)
        .default_constructor()
        .build()?;
    let circle = TypeBuilder::new(&registry)
        .class("Demo", "Circle")
        .extends(&shape)
        .default_constructor()
        .method(|m| m.name("Area").public().override_method().returns(TypeSignature::R8))
        .build()?;
    let disposable = TypeBuilder::new(&registry)
        .interface("System", "IDisposable")
        .method(|m| m.name("Dispose").public().abstract_virtual())
        .build()?;
    let resource = TypeBuilder::new(&registry)
        .class("Demo", "Resource")
        .implements(&disposable)
        .default_constructor()
        .method(|m| m.name("Dispose").public().virtual_method())
        .build()?;
    let closer = TypeBuilder::new(&registry)
        .class("Demo", "Closer")
        .default_constructor()
        .method(|m| m.name("Dispose").public())
        .build()?;

    Ok(Hierarchy {
        registry,
        shape,
        polygon,
        circle,
        disposable,
        resource,
        closer,
    })
}

fn derived(hierarchy: &Hierarchy, name: &str, base: &CilTypeRc) -> Result<CilTypeRc> {
    TypeBuilder::new(&hierarchy.registry)
        .class("Demo", name)
        .extends(base)
        .default_constructor()
        .build()
}

fn area() -> SignatureMethod {
    SignatureMethod::instance(TypeSignature::R8, vec![])
}

#[test]
fn test_abstractness_follows_members() -> Result<()> {
    let hierarchy = hierarchy()?;
    let mut model = TypeModel::new(&hierarchy.registry, &hierarchy.polygon)?;
    assert!(model.is_abstract());
    assert_ne!(model.flags() & TypeAttributes::ABSTRACT, 0);

    // An override of an abstract slot stays abstract
    let base = hierarchy.shape.method_by_name("Area").expect("Shape declares Area");
    let placeholder = model.get_or_add_override(&base)?;
    assert!(model.method(placeholder)?.is_abstract());
    assert!(model.is_abstract());

    // A concrete method in another slot does not change that
    model.add_method(
        "Perimeter",
        MethodAttributes::public(),
        area(),
        Some(MethodBody::provided("perimeter")),
    )?;
    assert!(model.is_abstract());

    // Giving the override a body makes the type concrete
    model.set_method_body(placeholder, MethodBody::provided("area"))?;
    assert!(!model.is_abstract());
    assert_eq!(model.get_or_add_override(&base)?, placeholder);
    Ok(())
}

#[test]
fn test_implicit_override_clears_abstractness() -> Result<()> {
    let hierarchy = hierarchy()?;
    let mut model = TypeModel::new(&hierarchy.registry, &hierarchy.polygon)?;

    let attributes = MethodAttributes::public().with_modifiers(MethodModifiers::VIRTUAL);
    let id = model.add_method("Area", attributes, area(), Some(MethodBody::provided("area")))?;
    let base = hierarchy.shape.method_by_name("Area").expect("Shape declares Area");
    assert_eq!(
        model.method(id)?.base_root().map(|root| root.token),
        Some(base.token)
    );
    assert!(!model.is_abstract());
    assert_eq!(model.flags() & TypeAttributes::ABSTRACT, 0);

    // The inherited abstract method is no longer visible
    let flags = BindingFlags::PUBLIC | BindingFlags::INSTANCE;
    let found = model.get_method("Area", flags)?.and_then(|entry| entry.declared_id());
    assert_eq!(found, Some(id));
    Ok(())
}

#[test]
fn test_override_is_idempotent() -> Result<()> {
    let hierarchy = hierarchy()?;
    let widget = derived(&hierarchy, "Widget", &hierarchy.registry.object())?;
    let mut model = TypeModel::new(&hierarchy.registry, &widget)?;
    let to_string = hierarchy
        .registry
        .object()
        .method_by_name("ToString")
        .expect("System.Object declares ToString");

    let first = model.get_or_add_override(&to_string)?;
    let second = model.get_or_add_override(&to_string)?;
    assert_eq!(first, second);
    assert_eq!(model.methods().added().count(), 1);

    let method = model.method(first)?;
    assert_eq!(method.name(), "ToString");
    assert!(method.is_virtual());
    assert!(!method.is_new_slot());
    assert_eq!(method.body(), Some(&MethodBody::CallBase(to_string.token)));

    let flags = BindingFlags::PUBLIC | BindingFlags::INSTANCE;
    let named = model
        .get_methods(flags)
        .into_iter()
        .filter(|entry| entry.name() == "ToString")
        .count();
    assert_eq!(named, 1);
    Ok(())
}

#[test]
fn test_existing_override_is_reused() -> Result<()> {
    let hierarchy = hierarchy()?;
    let mut model = TypeModel::new(&hierarchy.registry, &hierarchy.circle)?;
    let base = hierarchy.shape.method_by_name("Area").expect("Shape declares Area");
    let existing = hierarchy.circle.method_by_name("Area").expect("Circle declares Area");

    let id = model.get_or_add_override(&base)?;
    assert_eq!(Some(id), model.get_mutable_method(&existing));
    assert_eq!(model.methods().added().count(), 0);
    assert!(!model.is_abstract());
    Ok(())
}

#[test]
fn test_override_falls_back_to_explicit_form() -> Result<()> {
    let hierarchy = hierarchy()?;
    let widget = derived(&hierarchy, "Widget", &hierarchy.registry.object())?;
    let mut model = TypeModel::new(&hierarchy.registry, &widget)?;

    // A new slot with the same name and signature takes the implicit binding
    model.add_method(
        "ToString",
        MethodAttributes::public()
            .with_modifiers(MethodModifiers::VIRTUAL)
            .with_vtable(MethodVtableFlags::NEW_SLOT),
        SignatureMethod::instance(TypeSignature::String, vec![]),
        Some(MethodBody::provided("describe")),
    )?;

    let to_string = hierarchy
        .registry
        .object()
        .method_by_name("ToString")
        .expect("System.Object declares ToString");
    let id = model.get_or_add_override(&to_string)?;
    let method = model.method(id)?;
    assert_eq!(method.name(), "System.Object.ToString");
    assert!(method.has_explicit_base(to_string.token));
    assert!(method.is_final());
    Ok(())
}

#[test]
fn test_interface_mapping_strict_and_partial() -> Result<()> {
    let hierarchy = hierarchy()?;
    let mut model = TypeModel::new(&hierarchy.registry, &hierarchy.circle)?;
    model.add_interface(&hierarchy.disposable)?;

    match model.get_interface_map(&hierarchy.disposable) {
        Err(Error::InterfaceNotImplemented { interface, methods }) => {
            assert_eq!(interface, "System.IDisposable");
            assert_eq!(methods, vec!["Dispose".to_string()]);
        }
        other => panic!("expected an incomplete mapping, got {:?}", other),
    }

    let partial = model.get_interface_map_partial(&hierarchy.disposable)?;
    assert!(!partial.is_complete());
    let unmapped: Vec<_> = partial.unmapped().map(|m| m.name.clone()).collect();
    assert_eq!(unmapped, vec!["Dispose".to_string()]);

    // Without a candidate the implementation is an abstract placeholder
    let dispose = hierarchy
        .disposable
        .method_by_name("Dispose")
        .expect("IDisposable declares Dispose");
    let id = model.get_or_add_implementation(&dispose)?;
    assert!(model.method(id)?.is_abstract());
    assert!(model.is_abstract());

    model.set_method_body(id, MethodBody::provided("dispose"))?;
    assert!(!model.is_abstract());

    let mapping = model.get_interface_map(&hierarchy.disposable)?;
    assert_eq!(mapping.target_of(&dispose), Some(&MethodTarget::Declared(id)));
    Ok(())
}

#[test]
fn test_explicit_base_wins_over_signature_match() -> Result<()> {
    let hierarchy = hierarchy()?;
    let managed = derived(&hierarchy, "Managed", &hierarchy.resource)?;
    let mut model = TypeModel::new(&hierarchy.registry, &managed)?;
    let dispose = hierarchy
        .disposable
        .method_by_name("Dispose")
        .expect("IDisposable declares Dispose");

    // Resource.Dispose implements the interface until an explicit implementation exists
    let inherited = hierarchy.resource.method_by_name("Dispose").expect("Resource declares Dispose");
    let mapping = model.get_interface_map(&hierarchy.disposable)?;
    assert_eq!(
        mapping.target_of(&dispose),
        Some(&MethodTarget::Inherited(inherited))
    );

    let cleanup = model.add_method(
        "Cleanup",
        MethodAttributes::public()
            .with_modifiers(MethodModifiers::VIRTUAL | MethodModifiers::FINAL)
            .with_vtable(MethodVtableFlags::NEW_SLOT),
        SignatureMethod::instance(TypeSignature::Void, vec![]),
        Some(MethodBody::provided("cleanup")),
    )?;
    model.add_explicit_base_definition(cleanup, &dispose)?;

    let mapping = model.get_interface_map(&hierarchy.disposable)?;
    assert_eq!(
        mapping.target_of(&dispose),
        Some(&MethodTarget::Declared(cleanup))
    );
    assert_eq!(model.get_or_add_implementation(&dispose)?, cleanup);
    Ok(())
}

#[test]
fn test_inherited_virtual_implementation_is_overridden() -> Result<()> {
    let hierarchy = hierarchy()?;
    let managed = derived(&hierarchy, "Managed", &hierarchy.resource)?;
    let mut model = TypeModel::new(&hierarchy.registry, &managed)?;
    let dispose = hierarchy
        .disposable
        .method_by_name("Dispose")
        .expect("IDisposable declares Dispose");
    let inherited = hierarchy.resource.method_by_name("Dispose").expect("Resource declares Dispose");

    let id = model.get_or_add_implementation(&dispose)?;
    let method = model.method(id)?;
    assert_eq!(method.name(), "Dispose");
    assert_eq!(method.body(), Some(&MethodBody::CallBase(inherited.token)));
    assert!(method.has_explicit_base(dispose.token));

    // Asking again yields the same member
    assert_eq!(model.get_or_add_implementation(&dispose)?, id);
    assert_eq!(model.get_or_add_override(&inherited)?, id);
    Ok(())
}

#[test]
fn test_non_virtual_implementation_gets_forwarder() -> Result<()> {
    let hierarchy = hierarchy()?;
    let derived_closer = derived(&hierarchy, "DerivedCloser", &hierarchy.closer)?;
    let mut model = TypeModel::new(&hierarchy.registry, &derived_closer)?;
    model.add_interface(&hierarchy.disposable)?;

    let dispose = hierarchy
        .disposable
        .method_by_name("Dispose")
        .expect("IDisposable declares Dispose");
    let inherited = hierarchy.closer.method_by_name("Dispose").expect("Closer declares Dispose");

    let id = model.get_or_add_implementation(&dispose)?;
    let method = model.method(id)?;
    assert!(method.is_virtual());
    assert!(method.is_final());
    assert!(method.is_new_slot());
    assert_eq!(method.body(), Some(&MethodBody::CallBase(inherited.token)));

    let mapping = model.get_interface_map(&hierarchy.disposable)?;
    assert_eq!(mapping.target_of(&dispose), Some(&MethodTarget::Declared(id)));
    Ok(())
}

#[test]
fn test_override_of_unrelated_method_fails() -> Result<()> {
    let hierarchy = hierarchy()?;
    let model_type = derived(&hierarchy, "Widget", &hierarchy.registry.object())?;
    let mut model = TypeModel::new(&hierarchy.registry, &model_type)?;
    let dispose = hierarchy.resource.method_by_name("Dispose").expect("Resource declares Dispose");

    assert!(matches!(
        model.get_or_add_override(&dispose),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        model.get_or_add_implementation(&dispose),
        Err(Error::InvalidArgument(_))
    ));
    Ok(())
}

fn foo_interface(hierarchy: &Hierarchy) -> Result<CilTypeRc> {
    TypeBuilder::new(&hierarchy.registry)
        .interface("Demo", "IFoo")
        .method(|m| m.name("A").public().abstract_virtual())
        .method(|m| m.name("B").public().abstract_virtual())
        .build()
}

fn virtual_new_slot() -> MethodAttributes {
    MethodAttributes::public()
        .with_modifiers(MethodModifiers::VIRTUAL)
        .with_vtable(MethodVtableFlags::NEW_SLOT)
}

#[test]
fn test_partial_mapping_of_multi_method_interface() -> Result<()> {
    let hierarchy = hierarchy()?;
    let foo = foo_interface(&hierarchy)?;
    let a = foo.method_by_name("A").expect("IFoo declares A");
    let b = foo.method_by_name("B").expect("IFoo declares B");
    let mut model = TypeModel::new(&hierarchy.registry, &hierarchy.circle)?;
    model.add_interface(&foo)?;

    let implementation = model.add_method(
        "A",
        virtual_new_slot(),
        SignatureMethod::instance(TypeSignature::Void, vec![]),
        Some(MethodBody::provided("a")),
    )?;

    let partial = model.get_interface_map_partial(&foo)?;
    assert_eq!(partial.entries().len(), 2);
    assert_eq!(partial.target_of(&a), Some(&MethodTarget::Declared(implementation)));
    assert!(partial.target_of(&b).is_none());
    let unmapped: Vec<_> = partial.unmapped().map(|m| m.name.clone()).collect();
    assert_eq!(unmapped, vec!["B".to_string()]);

    match model.get_interface_map(&foo) {
        Err(Error::InterfaceNotImplemented { methods, .. }) => {
            assert_eq!(methods, vec!["B".to_string()]);
        }
        other => panic!("expected an incomplete mapping, got {:?}", other),
    }

    let placeholder = model.get_or_add_implementation(&b)?;
    model.set_method_body(placeholder, MethodBody::provided("b"))?;

    let mapping = model.get_interface_map(&foo)?;
    assert!(mapping.is_complete());
    assert_eq!(mapping.target_of(&a), Some(&MethodTarget::Declared(implementation)));
    assert_eq!(mapping.target_of(&b), Some(&MethodTarget::Declared(placeholder)));
    let keys: Vec<_> = mapping
        .entries()
        .iter()
        .map(|entry| entry.interface_method.token)
        .collect();
    assert_eq!(keys, vec![a.token, b.token]);
    Ok(())
}

#[test]
fn test_explicit_base_wins_over_name_match_on_added_interface() -> Result<()> {
    let hierarchy = hierarchy()?;
    let foo = foo_interface(&hierarchy)?;
    let a = foo.method_by_name("A").expect("IFoo declares A");
    let b = foo.method_by_name("B").expect("IFoo declares B");
    let mut model = TypeModel::new(&hierarchy.registry, &hierarchy.circle)?;
    model.add_interface(&foo)?;

    // A public A() that happens to match IFoo.A by name and signature
    let accidental = model.add_method(
        "A",
        virtual_new_slot(),
        SignatureMethod::instance(TypeSignature::Void, vec![]),
        Some(MethodBody::provided("a")),
    )?;
    let mapping = model.get_interface_map_partial(&foo)?;
    assert_eq!(mapping.target_of(&a), Some(&MethodTarget::Declared(accidental)));

    let explicit = model.add_method(
        "Demo.IFoo.A",
        MethodAttributes::new(MethodAccessFlags::PRIVATE)
            .with_modifiers(MethodModifiers::VIRTUAL | MethodModifiers::FINAL)
            .with_vtable(MethodVtableFlags::NEW_SLOT),
        SignatureMethod::instance(TypeSignature::Void, vec![]),
        Some(MethodBody::provided("explicit_a")),
    )?;
    model.add_explicit_base_definition(explicit, &a)?;

    let mapping = model.get_interface_map_partial(&foo)?;
    assert_eq!(mapping.target_of(&a), Some(&MethodTarget::Declared(explicit)));
    assert!(mapping.target_of(&b).is_none());
    assert_eq!(model.get_or_add_implementation(&a)?, explicit);

    // The slot is taken now
    assert!(matches!(
        model.add_explicit_base_definition(accidental, &a),
        Err(Error::InvalidOperation(_))
    ));
    Ok(())
}
