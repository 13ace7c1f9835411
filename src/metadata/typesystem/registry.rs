//! Central type registry of the host universe.
//!
//! The `TypeRegistry` owns every host type and hands out the tokens for new types and
//! members. It is created pre-populated with the core types every hierarchy is rooted in:
//! `System.Object`, `System.ValueType`, `System.Enum`, `System.Delegate` and
//! `System.MulticastDelegate`.
//!
//! # Registry Architecture
//!
//! - **Token-based lookup**: Primary index using metadata tokens (`SkipMap`)
//! - **Name-based lookup**: Secondary index for full names (`DashMap`)
//! - **Token allocation**: A single atomic row counter shared by all tables, so every token
//!   handed out by a registry is unique
//!
//! # Thread Safety
//!
//! Lookups and insertions are lock-free and may happen concurrently. The deferred type model
//! only ever reads from the registry and allocates tokens for new members.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use tracing::debug;

use crate::{
    metadata::{
        method::{
            Method, MethodAccessFlags, MethodAttributes, MethodModifiers, MethodVtableFlags,
            CONSTRUCTOR_NAME,
        },
        signatures::{SignatureMethod, TypeSignature},
        token::{Token, TokenTable},
        typesystem::{
            CilFlavor, CilType, CilTypeRc, TypeAttributes, TypeBuilder, SYSTEM_DELEGATE,
            SYSTEM_ENUM, SYSTEM_MULTICAST_DELEGATE, SYSTEM_OBJECT, SYSTEM_VALUE_TYPE,
        },
    },
    Error::{TypeInsert, TypeNotFound},
    Result,
};

/// Central registry owning all host types.
///
/// # Examples
///
/// ```rust
/// use dotweave::metadata::{token::TokenTable, typesystem::TypeRegistry};
///
/// let registry = TypeRegistry::new()?;
/// let object = registry.object();
/// assert!(object.base().is_none());
/// assert!(object.method_by_name("ToString").is_some());
///
/// let first = registry.allocate_token(TokenTable::FIELD);
/// let second = registry.allocate_token(TokenTable::FIELD);
/// assert_ne!(first, second);
/// assert_eq!(first.table(), TokenTable::FIELD);
/// # Ok::<(), dotweave::Error>(())
/// ```
pub struct TypeRegistry {
    /// Primary type storage indexed by token
    types: SkipMap<Token, CilTypeRc>,
    /// Full name index
    types_by_fullname: DashMap<String, Token>,
    /// Next row handed out by `allocate_token`
    next_row: AtomicU32,
    /// `System.Object`
    object: CilTypeRc,
}

impl TypeRegistry {
    /// Create a new registry containing the core types
    ///
    /// # Errors
    /// Returns an error if the core types cannot be registered.
    pub fn new() -> Result<Self> {
        let next_row = AtomicU32::new(1);
        let object = Self::create_object(&next_row)?;

        let registry = TypeRegistry {
            types: SkipMap::new(),
            types_by_fullname: DashMap::new(),
            next_row,
            object: object.clone(),
        };
        registry.insert(&object)?;
        registry.register_core_types()?;

        debug!(types = registry.len(), "type registry initialized");
        Ok(registry)
    }

    /// `System.Object` is built by hand, every other type is built on top of it
    fn create_object(next_row: &AtomicU32) -> Result<CilTypeRc> {
        let token = |table: u8| Token::from_parts(table, next_row.fetch_add(1, Ordering::Relaxed));

        let virtual_new_slot = MethodAttributes::public()
            .with_modifiers(MethodModifiers::VIRTUAL)
            .with_vtable(MethodVtableFlags::NEW_SLOT);

        let mut object = CilType::new(
            token(TokenTable::TYPE_DEF),
            "System",
            "Object",
            CilFlavor::Class,
            TypeAttributes::PUBLIC | TypeAttributes::SERIALIZABLE,
            None,
        );
        object.methods = vec![
            Arc::new(Method::new(
                token(TokenTable::METHOD_DEF),
                CONSTRUCTOR_NAME,
                MethodAttributes::public()
                    .with_modifiers(MethodModifiers::SPECIAL_NAME | MethodModifiers::RTSPECIAL_NAME),
                SignatureMethod::instance(TypeSignature::Void, vec![]),
            )),
            Arc::new(Method::new(
                token(TokenTable::METHOD_DEF),
                "ToString",
                virtual_new_slot,
                SignatureMethod::instance(TypeSignature::String, vec![]),
            )),
            Arc::new(Method::new(
                token(TokenTable::METHOD_DEF),
                "Equals",
                virtual_new_slot,
                SignatureMethod::instance(TypeSignature::Boolean, vec![TypeSignature::Object]),
            )),
            Arc::new(Method::new(
                token(TokenTable::METHOD_DEF),
                "GetHashCode",
                virtual_new_slot,
                SignatureMethod::instance(TypeSignature::I4, vec![]),
            )),
            Arc::new(Method::new(
                token(TokenTable::METHOD_DEF),
                "Finalize",
                MethodAttributes::new(MethodAccessFlags::FAMILY)
                    .with_modifiers(MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG)
                    .with_vtable(MethodVtableFlags::NEW_SLOT),
                SignatureMethod::instance(TypeSignature::Void, vec![]),
            )),
        ];

        let object = Arc::new(object);
        for method in &object.methods {
            method.set_declaring_type(&object)?;
        }
        Ok(object)
    }

    fn register_core_types(&self) -> Result<()> {
        let value_type = TypeBuilder::new(self)
            .class("System", "ValueType")
            .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT | TypeAttributes::SERIALIZABLE)
            .constructor(MethodAccessFlags::FAMILY, vec![])
            .build()?;

        TypeBuilder::new(self)
            .class("System", "Enum")
            .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT | TypeAttributes::SERIALIZABLE)
            .extends(&value_type)
            .constructor(MethodAccessFlags::FAMILY, vec![])
            .build()?;

        let delegate = TypeBuilder::new(self)
            .class("System", "Delegate")
            .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT | TypeAttributes::SERIALIZABLE)
            .constructor(
                MethodAccessFlags::FAMILY,
                vec![TypeSignature::Object, TypeSignature::String],
            )
            .build()?;

        TypeBuilder::new(self)
            .class("System", "MulticastDelegate")
            .flags(TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT | TypeAttributes::SERIALIZABLE)
            .extends(&delegate)
            .constructor(
                MethodAccessFlags::FAMILY,
                vec![TypeSignature::Object, TypeSignature::String],
            )
            .build()?;

        Ok(())
    }

    /// Hand out a fresh token for the given table
    pub fn allocate_token(&self, table: u8) -> Token {
        Token::from_parts(table, self.next_row.fetch_add(1, Ordering::Relaxed))
    }

    /// Insert a `CilType` into the registry
    ///
    /// ## Arguments
    /// * '`new_type`' - The type to register
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeInsert`] if a type with the same token or full name exists.
    pub fn insert(&self, new_type: &CilTypeRc) -> Result<()> {
        if self.types.contains_key(&new_type.token) {
            return Err(TypeInsert(new_type.token));
        }

        match self.types_by_fullname.entry(new_type.fullname()) {
            dashmap::mapref::entry::Entry::Occupied(_) => return Err(TypeInsert(new_type.token)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(new_type.token);
            }
        }

        self.types.insert(new_type.token, new_type.clone());
        debug!(token = %new_type.token, name = %new_type.fullname(), "registered type");
        Ok(())
    }

    /// Look up a type by its token
    pub fn get(&self, token: &Token) -> Option<CilTypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Look up a type by its token, failing if it is unknown
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if no type has this token.
    pub fn resolve(&self, token: &Token) -> Result<CilTypeRc> {
        self.get(token).ok_or(TypeNotFound(*token))
    }

    /// Look up a type by its full name (`Namespace.Name`)
    pub fn get_by_fullname(&self, fullname: &str) -> Option<CilTypeRc> {
        self.types_by_fullname
            .get(fullname)
            .and_then(|token| self.get(token.value()))
    }

    /// `System.Object`, the root of every class hierarchy
    #[must_use]
    pub fn object(&self) -> CilTypeRc {
        self.object.clone()
    }

    /// `System.ValueType`
    #[must_use]
    pub fn value_type(&self) -> Option<CilTypeRc> {
        self.get_by_fullname(SYSTEM_VALUE_TYPE)
    }

    /// `System.Enum`
    #[must_use]
    pub fn enum_type(&self) -> Option<CilTypeRc> {
        self.get_by_fullname(SYSTEM_ENUM)
    }

    /// `System.MulticastDelegate`, the base of every delegate type
    #[must_use]
    pub fn multicast_delegate(&self) -> Option<CilTypeRc> {
        self.get_by_fullname(SYSTEM_MULTICAST_DELEGATE)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All registered types in token order
    pub fn types(&self) -> Vec<CilTypeRc> {
        self.types.iter().map(|entry| entry.value().clone()).collect()
    }
}
