//! Interface mappings of host types.
//!
//! The deferred type model needs to know how the *original* type already satisfies the
//! interfaces it inherits. That knowledge comes from an [`InterfaceMapProvider`]; the
//! [`HostInterfaceMapProvider`] computes it for [`CilType`] hierarchies with CLR semantics:
//!
//! 1. At each level of the hierarchy, nearest first, an explicit `MethodImpl` for the interface
//!    method wins over a public virtual method with the same name and signature.
//! 2. The method found that way is then re-pointed to the most-derived override of its slot, as
//!    a virtual call through the interface would dispatch to it.

use tracing::trace;

use crate::{
    config::ModelConfig,
    metadata::{
        method::MethodRc,
        typesystem::{CilType, CilTypeRc},
    },
    Error::InvalidArgument,
    Result,
};

/// One interface method and the host method implementing it
#[derive(Debug, Clone)]
pub struct InterfaceMethodMapping {
    /// The method declared by the interface
    pub interface_method: MethodRc,
    /// The implementing method, `None` if the host type leaves it unimplemented
    pub target_method: Option<MethodRc>,
}

/// Supplies the original interface mapping of an existing type
pub trait InterfaceMapProvider: Send + Sync {
    /// Map every method of `interface` to its implementation in `ty`
    ///
    /// # Errors
    /// Fails if `ty` does not implement `interface`.
    fn interface_map(
        &self,
        ty: &CilTypeRc,
        interface: &CilTypeRc,
    ) -> Result<Vec<InterfaceMethodMapping>>;
}

/// Computes interface mappings from the host type hierarchy
#[derive(Debug, Clone, Copy)]
pub struct HostInterfaceMapProvider {
    max_depth: usize,
}

impl HostInterfaceMapProvider {
    /// Create a provider bounding hierarchy walks to `max_depth` levels
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        HostInterfaceMapProvider { max_depth }
    }

    fn find_at_level(level: &CilType, interface_method: &MethodRc) -> Option<MethodRc> {
        if let Some(explicit) = level
            .overrides
            .iter()
            .find(|imp| imp.declaration.token == interface_method.token)
        {
            return Some(explicit.body.clone());
        }

        level
            .methods
            .iter()
            .find(|method| {
                method.is_public()
                    && method.is_virtual()
                    && !method.is_static()
                    && method.name == interface_method.name
                    && method.signature.matches(&interface_method.signature)
            })
            .cloned()
    }

    /// Follow the slot of `method` down to `levels[0]` (the most-derived type)
    fn most_derived(levels: &[CilTypeRc], method: MethodRc) -> MethodRc {
        let Some(origin) = levels
            .iter()
            .position(|level| level.token == method.declaring_token())
        else {
            return method;
        };

        let mut current = method;
        for level in levels[..origin].iter().rev() {
            if current.is_final() {
                break;
            }

            if let Some(explicit) = level
                .overrides
                .iter()
                .find(|imp| imp.declaration.token == current.token)
            {
                current = explicit.body.clone();
                continue;
            }

            let Some(candidate) = level.methods.iter().find(|candidate| {
                candidate.is_virtual()
                    && !candidate.is_static()
                    && candidate.name == current.name
                    && candidate.signature.matches(&current.signature)
            }) else {
                continue;
            };

            if candidate.is_new_slot() {
                // a new slot hides the one we follow, deeper overrides bind to it instead
                break;
            }
            current = candidate.clone();
        }
        current
    }
}

impl Default for HostInterfaceMapProvider {
    fn default() -> Self {
        Self::new(ModelConfig::default().max_hierarchy_depth)
    }
}

impl InterfaceMapProvider for HostInterfaceMapProvider {
    fn interface_map(
        &self,
        ty: &CilTypeRc,
        interface: &CilTypeRc,
    ) -> Result<Vec<InterfaceMethodMapping>> {
        if !interface.is_interface() {
            return Err(InvalidArgument(format!(
                "'{}' is not an interface",
                interface.fullname()
            )));
        }
        if !ty.implements(interface) {
            return Err(InvalidArgument(format!(
                "'{}' does not implement '{}'",
                ty.fullname(),
                interface.fullname()
            )));
        }

        let levels = ty.hierarchy(self.max_depth)?;
        let mapping = interface
            .methods
            .iter()
            .filter(|method| !method.is_static())
            .map(|interface_method| {
                let target_method = levels
                    .iter()
                    .find_map(|level| Self::find_at_level(level, interface_method))
                    .map(|found| Self::most_derived(&levels, found));

                trace!(
                    interface_method = %interface_method.fullname(),
                    target = ?target_method.as_ref().map(|t| t.fullname()),
                    "host interface mapping"
                );

                InterfaceMethodMapping {
                    interface_method: interface_method.clone(),
                    target_method,
                }
            })
            .collect();

        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestUniverse;

    #[test]
    fn test_implicit_mapping_through_inheritance() {
        let universe = TestUniverse::new();
        let provider = HostInterfaceMapProvider::default();

        let map = provider
            .interface_map(&universe.managed_resource, &universe.disposable)
            .unwrap();
        assert_eq!(map.len(), 1);

        // Resource.Dispose is virtual, ManagedResource overrides it
        let target = map[0].target_method.as_ref().unwrap();
        assert_eq!(target.declaring_token(), universe.managed_resource.token);
        assert_eq!(target.name, "Dispose");
    }

    #[test]
    fn test_explicit_mapping_wins() {
        let universe = TestUniverse::new();
        let provider = HostInterfaceMapProvider::default();

        let map = provider
            .interface_map(&universe.explicit_resource, &universe.disposable)
            .unwrap();
        let target = map[0].target_method.as_ref().unwrap();
        assert_eq!(target.name, "System.IDisposable.Dispose");
    }

    #[test]
    fn test_not_implemented() {
        let universe = TestUniverse::new();
        let provider = HostInterfaceMapProvider::default();

        assert!(matches!(
            provider.interface_map(&universe.shape, &universe.disposable),
            Err(crate::Error::InvalidArgument(_))
        ));
        assert!(matches!(
            provider.interface_map(&universe.managed_resource, &universe.shape),
            Err(crate::Error::InvalidArgument(_))
        ));
    }
}
