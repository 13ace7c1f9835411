//! Override-chain resolution over host type hierarchies.
//!
//! Matching is exact name plus exact signature at every level; since a type cannot declare
//! two methods with the same name and signature, at most one candidate exists per level and
//! the nearest ancestor always wins.

use tracing::trace;

use crate::{
    metadata::{method::MethodRc, signatures::SignatureMethod, typesystem::CilTypeRc},
    Error::RecursionLimit,
    Result,
};

/// Finds the slots virtual methods bind to
#[derive(Debug, Clone, Copy)]
pub struct RelatedMethodFinder {
    max_depth: usize,
}

impl RelatedMethodFinder {
    /// Create a finder bounding hierarchy walks to `max_depth` levels
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        RelatedMethodFinder { max_depth }
    }

    /// The first virtual method named `name` with signature `signature`, declared by `start`
    /// or the nearest of its ancestors
    ///
    /// This is the existing slot an implicitly declared override in a type deriving from
    /// `start` would bind to.
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the hierarchy is deeper than allowed.
    pub fn get_most_derived_virtual_method(
        &self,
        name: &str,
        signature: &SignatureMethod,
        start: &CilTypeRc,
    ) -> Result<Option<MethodRc>> {
        for level in start.hierarchy(self.max_depth)? {
            if let Some(found) = level.methods.iter().find(|method| {
                method.is_virtual() && method.name == name && method.signature.matches(signature)
            }) {
                trace!(method = name, slot = %found.fullname(), "most derived virtual method");
                return Ok(Some(found.clone()));
            }
        }
        Ok(None)
    }

    /// The top-most method of the override chain `method` belongs to
    ///
    /// Returns `None` if `method` is itself the root: non-virtual methods, new slots and
    /// virtual methods without a matching ancestor method.
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the hierarchy is deeper than allowed.
    pub fn get_root_definition(&self, method: &MethodRc) -> Result<Option<MethodRc>> {
        let mut root = None;
        let mut current = method.clone();

        for _ in 0..self.max_depth {
            if !current.is_virtual() || current.is_new_slot() {
                return Ok(root);
            }
            let Some(base) = current.declaring_type().and_then(|declaring| declaring.base())
            else {
                return Ok(root);
            };
            match self.get_most_derived_virtual_method(&current.name, &current.signature, &base)? {
                Some(found) => {
                    root = Some(found.clone());
                    current = found;
                }
                None => return Ok(root),
            }
        }

        Err(RecursionLimit(self.max_depth))
    }

    /// The root definition of `method`, or `method` itself if it is the root
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the hierarchy is deeper than allowed.
    pub fn root_or_self(&self, method: &MethodRc) -> Result<MethodRc> {
        Ok(self
            .get_root_definition(method)?
            .unwrap_or_else(|| method.clone()))
    }
}
