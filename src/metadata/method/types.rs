//! Method attribute flags for host methods and modeled methods.
//!
//! The raw 16-bit `MethodAttributes` value of ECMA-335 (§II.23.1.10) is split into three
//! logical groups, each with its own bitflags type, plus the [`MethodAttributes`] aggregate
//! which carries all three groups together.
//!
//! # Key Types
//! - [`MethodAccessFlags`]: Visibility (an enumeration packed into the low three bits)
//! - [`MethodVtableFlags`]: Slot reuse versus new slot
//! - [`MethodModifiers`]: Static, final, virtual, abstract and friends
//! - [`MethodAttributes`]: All three groups together

use std::fmt;

use bitflags::bitflags;

/// Bitmask for `ACCESS` state extraction
pub const METHOD_ACCESS_MASK: u32 = 0x0007;
/// Bitmask for `VTABLE_LAYOUT` information extraction
pub const METHOD_VTABLE_LAYOUT_MASK: u32 = 0x0100;

// Method attributes split into logical groups
bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method access flags
    ///
    /// The access values form an enumeration rather than independent bits; compare them with
    /// `==`, never with `contains`.
    pub struct MethodAccessFlags: u32 {
        /// Member not referenceable
        const COMPILER_CONTROLLED = 0x0000;
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this Assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessibly by anyone in the Assembly
        const ASSEM = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessibly by sub-types anywhere, plus anyone in assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
    }
}

impl MethodAccessFlags {
    /// Extract access flags from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        let access = flags & METHOD_ACCESS_MASK;
        Self::from_bits_truncate(access)
    }

    /// Accessible to everyone
    #[must_use]
    pub fn is_public(self) -> bool {
        self == Self::PUBLIC
    }

    /// Only accessible from within the declaring type (or not referenceable at all)
    #[must_use]
    pub fn is_private(self) -> bool {
        self == Self::PRIVATE || self == Self::COMPILER_CONTROLLED
    }

    /// Accessible from a derived type living in another assembly
    #[must_use]
    pub fn is_accessible_to_subclass(self) -> bool {
        self == Self::PUBLIC || self == Self::FAMILY || self == Self::FAM_OR_ASSEM
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method vtable layout flags
    pub struct MethodVtableFlags: u32 {
        /// Method reuses existing slot in vtable
        const REUSE_SLOT = 0x0000;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
    }
}

impl MethodVtableFlags {
    /// Extract vtable layout flags from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        let vtable = flags & METHOD_VTABLE_LAYOUT_MASK;
        Self::from_bits_truncate(vtable)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method modifiers and properties
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method can only be overriden if also accessible
        const STRICT = 0x0200;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, dpending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
        /// Implementation is forwarded through PInvoke
        const PINVOKE_IMPL = 0x2000;
        /// Method has security associate with it
        const HAS_SECURITY = 0x4000;
        /// Method calls another method containing security code
        const REQUIRE_SEC_OBJECT = 0x8000;
        /// Reserved: shall be zero for conforming implementations
        const UNMANAGED_EXPORT = 0x0008;
    }
}

impl MethodModifiers {
    /// Extract method modifiers from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        let modifiers = flags & !METHOD_ACCESS_MASK & !METHOD_VTABLE_LAYOUT_MASK;
        Self::from_bits_truncate(modifiers)
    }
}

/// The complete attribute set of a method: access, vtable layout and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodAttributes {
    /// Visibility of the method
    pub access: MethodAccessFlags,
    /// Slot layout of the method
    pub vtable: MethodVtableFlags,
    /// Remaining modifiers
    pub modifiers: MethodModifiers,
}

impl MethodAttributes {
    /// Attributes with the given access, reusing slots and without modifiers
    #[must_use]
    pub fn new(access: MethodAccessFlags) -> Self {
        MethodAttributes {
            access,
            vtable: MethodVtableFlags::REUSE_SLOT,
            modifiers: MethodModifiers::empty(),
        }
    }

    /// Public, non-virtual, hide-by-sig instance method
    #[must_use]
    pub fn public() -> Self {
        Self::new(MethodAccessFlags::PUBLIC).with_modifiers(MethodModifiers::HIDE_BY_SIG)
    }

    /// Split a raw 16-bit attribute value into its groups
    #[must_use]
    pub fn from_bits(flags: u32) -> Self {
        MethodAttributes {
            access: MethodAccessFlags::from_method_flags(flags),
            vtable: MethodVtableFlags::from_method_flags(flags),
            modifiers: MethodModifiers::from_method_flags(flags),
        }
    }

    /// Recombine the groups into the raw attribute value
    #[must_use]
    pub fn bits(&self) -> u32 {
        self.access.bits() | self.vtable.bits() | self.modifiers.bits()
    }

    /// Add modifiers
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: MethodModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// Replace the vtable layout
    #[must_use]
    pub fn with_vtable(mut self, vtable: MethodVtableFlags) -> Self {
        self.vtable = vtable;
        self
    }

    /// Method is virtual
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.modifiers.contains(MethodModifiers::VIRTUAL)
    }

    /// Method is abstract
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(MethodModifiers::ABSTRACT)
    }

    /// Method is final
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.modifiers.contains(MethodModifiers::FINAL)
    }

    /// Method is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(MethodModifiers::STATIC)
    }

    /// Method always gets a new vtable slot
    #[must_use]
    pub fn is_new_slot(&self) -> bool {
        self.vtable.contains(MethodVtableFlags::NEW_SLOT)
    }
}

impl Default for MethodAttributes {
    fn default() -> Self {
        Self::public()
    }
}

impl fmt::Display for MethodAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = match self.access {
            a if a == MethodAccessFlags::PUBLIC => "public",
            a if a == MethodAccessFlags::FAMILY => "family",
            a if a == MethodAccessFlags::FAM_OR_ASSEM => "famorassem",
            a if a == MethodAccessFlags::FAM_AND_ASSEM => "famandassem",
            a if a == MethodAccessFlags::ASSEM => "assembly",
            a if a == MethodAccessFlags::PRIVATE => "private",
            _ => "compilercontrolled",
        };
        f.write_str(access)?;
        if self.is_new_slot() {
            f.write_str(" newslot")?;
        }
        for (name, _) in self.modifiers.iter_names() {
            write!(f, " {}", name.to_ascii_lowercase())?;
        }
        Ok(())
    }
}
