//! A small host universe shared by the unit tests.

use std::sync::Arc;

use crate::metadata::{
    members::FieldAttributes,
    signatures::TypeSignature,
    token::TokenTable,
    typesystem::{CilFlavor, CilType, CilTypeRc, TypeAttributes, TypeBuilder, TypeRegistry},
};

/// Registry plus a handful of types covering the interesting shapes
///
/// - `Demo.Shape`: abstract class, public default constructor, abstract `double Area()`
/// - `Demo.Circle : Shape`: overrides `Area`
/// - `Demo.Point`: value type with fields `x` and `y`
/// - `Demo.Handler`: delegate
/// - `System.IDisposable`: interface with `void Dispose()`
/// - `Demo.Resource : IDisposable`: public virtual `Dispose`
/// - `Demo.ManagedResource : Resource`: overrides `Dispose`
/// - `Demo.ExplicitResource : IDisposable`: private explicit `System.IDisposable.Dispose`
pub struct TestUniverse {
    pub registry: Arc<TypeRegistry>,
    pub shape: CilTypeRc,
    pub circle: CilTypeRc,
    pub point: CilTypeRc,
    pub handler: CilTypeRc,
    pub disposable: CilTypeRc,
    pub resource: CilTypeRc,
    pub managed_resource: CilTypeRc,
    pub explicit_resource: CilTypeRc,
}

impl TestUniverse {
    pub fn new() -> Self {
        let registry = Arc::new(TypeRegistry::new().unwrap());

        let shape = TypeBuilder::new(&registry)
            .class("Demo", "Shape")
            .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT)
            .default_constructor()
            .method(|m| {
                m.name("Area")
                    .public()
                    .abstract_virtual()
                    .returns(TypeSignature::R8)
            })
            .build()
            .unwrap();

        let circle = TypeBuilder::new(&registry)
            .class("Demo", "Circle")
            .extends(&shape)
            .default_constructor()
            .method(|m| {
                m.name("Area")
                    .public()
                    .override_method()
                    .returns(TypeSignature::R8)
            })
            .build()
            .unwrap();

        let point = TypeBuilder::new(&registry)
            .value_type("Demo", "Point")
            .field("x", FieldAttributes::PUBLIC, TypeSignature::I4)
            .field("y", FieldAttributes::PUBLIC, TypeSignature::I4)
            .build()
            .unwrap();

        let handler = TypeBuilder::new(&registry)
            .delegate("Demo", "Handler")
            .build()
            .unwrap();

        let disposable = TypeBuilder::new(&registry)
            .interface("System", "IDisposable")
            .method(|m| m.name("Dispose").public().abstract_virtual())
            .build()
            .unwrap();

        let resource = TypeBuilder::new(&registry)
            .class("Demo", "Resource")
            .implements(&disposable)
            .default_constructor()
            .method(|m| m.name("Dispose").public().virtual_method())
            .build()
            .unwrap();

        let managed_resource = TypeBuilder::new(&registry)
            .class("Demo", "ManagedResource")
            .extends(&resource)
            .default_constructor()
            .method(|m| m.name("Dispose").public().override_method())
            .build()
            .unwrap();

        let dispose = disposable.method_by_name("Dispose").unwrap();
        let explicit_resource = TypeBuilder::new(&registry)
            .class("Demo", "ExplicitResource")
            .implements(&disposable)
            .default_constructor()
            .method(|m| {
                m.name("System.IDisposable.Dispose")
                    .private()
                    .virtual_method()
                    .sealed()
            })
            .method_impl(&dispose, "System.IDisposable.Dispose")
            .build()
            .unwrap();

        TestUniverse {
            registry,
            shape,
            circle,
            point,
            handler,
            disposable,
            resource,
            managed_resource,
            explicit_resource,
        }
    }

    /// A class that is not registered; dropping the last handle invalidates weak references
    pub fn detached_class(&self, name: &str) -> CilTypeRc {
        Arc::new(CilType::new(
            self.registry.allocate_token(TokenTable::TYPE_DEF),
            "Demo",
            name,
            CilFlavor::Class,
            TypeAttributes::PUBLIC,
            Some(self.registry.object()),
        ))
    }
}
