//! Host fields, properties and events.
//!
//! Like [`crate::metadata::method::Method`], these records are immutable once their declaring
//! type has been built, and hold a weak back reference to that type.

mod event;
mod field;
mod property;

pub use event::*;
pub use field::*;
pub use property::*;

use std::sync::OnceLock;

use crate::{
    metadata::{
        token::Token,
        typesystem::{CilTypeRc, CilTypeRef},
    },
    Result,
};

/// Write-once weak link from a member to the type declaring it
#[derive(Default)]
pub(crate) struct DeclaringType(OnceLock<CilTypeRef>);

impl DeclaringType {
    pub(crate) fn set(&self, declaring: &CilTypeRc, member: &str) -> Result<()> {
        self.0
            .set(CilTypeRef::new(declaring))
            .map_err(|_| malformed_error!("Member '{}' already has a declaring type", member))
    }

    pub(crate) fn get(&self) -> Option<CilTypeRc> {
        self.0.get().and_then(CilTypeRef::upgrade)
    }

    pub(crate) fn token(&self) -> Token {
        self.0.get().and_then(CilTypeRef::token).unwrap_or_default()
    }
}
