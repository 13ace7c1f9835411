//! Reflection-style member selection.
//!
//! The functions in this module filter any sequence of [`MemberInfo`] values by
//! [`BindingFlags`], name and (optionally) parameter types. They neither know nor care whether
//! a member is a host record or a descriptor of a type model.
//!
//! # Matching Rules
//!
//! - Visibility: public members require [`BindingFlags::PUBLIC`], all others
//!   [`BindingFlags::NON_PUBLIC`].
//! - Instance/static: a query requesting neither [`BindingFlags::INSTANCE`] nor
//!   [`BindingFlags::STATIC`] never matches; otherwise the member's own kind must be requested.
//! - A single-member query matching more than one candidate fails with
//!   [`crate::Error::AmbiguousMatch`] unless an explicit parameter list lets the injected
//!   [`OverloadResolver`] decide.
//!
//! # Examples
//!
//! ```rust
//! use dotweave::model::BindingFlags;
//! use dotweave::model::selector::has_right_flags;
//!
//! let query = BindingFlags::PUBLIC | BindingFlags::INSTANCE;
//! assert!(has_right_flags(true, false, query));
//! assert!(!has_right_flags(true, true, query));
//! assert!(!has_right_flags(false, false, query));
//! assert!(!has_right_flags(true, false, BindingFlags::PUBLIC));
//! ```

use bitflags::bitflags;
use tracing::trace;

use crate::{
    metadata::{signatures::SignatureParameter, token::Token},
    model::{MemberInfo, Parameterized},
    Error::AmbiguousMatch,
    Result,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Query flags of member lookups, with the values of `System.Reflection.BindingFlags`
    pub struct BindingFlags: u32 {
        /// Only members declared by the queried type itself
        const DECLARED_ONLY = 0x0002;
        /// Instance members
        const INSTANCE = 0x0004;
        /// Static members
        const STATIC = 0x0008;
        /// Public members
        const PUBLIC = 0x0010;
        /// Non-public members
        const NON_PUBLIC = 0x0020;
    }
}

impl BindingFlags {
    /// Public instance and static members, the reflection default
    pub const DEFAULT: Self = Self::PUBLIC.union(Self::INSTANCE).union(Self::STATIC);
    /// Every member, whatever its visibility or kind
    pub const ALL: Self = Self::DEFAULT.union(Self::NON_PUBLIC);
}

impl Default for BindingFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Final disambiguation of single-member queries carrying an explicit parameter list
pub trait OverloadResolver: Send + Sync {
    /// Choose among `candidates` (the parameter lists of flag- and name-filtered members)
    ///
    /// Returns the index of the chosen candidate, or `None` if none fits.
    ///
    /// # Errors
    /// Returns [`crate::Error::AmbiguousMatch`] if several candidates fit equally well.
    fn select(
        &self,
        name: &str,
        candidates: &[&[SignatureParameter]],
        params: &[SignatureParameter],
    ) -> Result<Option<usize>>;
}

/// The built-in [`OverloadResolver`]: exact parameter-type equality, no conversions
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSignatureResolver;

impl OverloadResolver for ExactSignatureResolver {
    fn select(
        &self,
        name: &str,
        candidates: &[&[SignatureParameter]],
        params: &[SignatureParameter],
    ) -> Result<Option<usize>> {
        let mut found = None;
        for (index, candidate) in candidates.iter().enumerate() {
            if *candidate != params {
                continue;
            }
            if found.is_some() {
                return Err(AmbiguousMatch(name.to_string()));
            }
            found = Some(index);
        }
        Ok(found)
    }
}

/// Check the visibility and instance/static kind of a member against a query
#[must_use]
pub fn has_right_flags(is_public: bool, is_static: bool, query: BindingFlags) -> bool {
    let visibility = if is_public {
        BindingFlags::PUBLIC
    } else {
        BindingFlags::NON_PUBLIC
    };
    let kind = if is_static {
        BindingFlags::STATIC
    } else {
        BindingFlags::INSTANCE
    };
    query.contains(visibility) && query.contains(kind)
}

/// Filter `candidates` by `query`
///
/// With [`BindingFlags::DECLARED_ONLY`] and a `declaring` token, only members declared by that
/// type survive.
pub fn select_members<T: MemberInfo>(
    candidates: impl IntoIterator<Item = T>,
    query: BindingFlags,
    declaring: Option<Token>,
) -> Vec<T> {
    let declared_only = if query.contains(BindingFlags::DECLARED_ONLY) {
        declaring
    } else {
        None
    };

    candidates
        .into_iter()
        .filter(|member| has_right_flags(member.is_public(), member.is_static(), query))
        .filter(|member| declared_only.map_or(true, |token| member.declaring_token() == token))
        .collect()
}

/// Select the single member named `name` matching `query`
///
/// # Errors
/// Returns [`crate::Error::AmbiguousMatch`] if more than one candidate matches.
pub fn select_single<T: MemberInfo>(
    name: &str,
    candidates: impl IntoIterator<Item = T>,
    query: BindingFlags,
    declaring: Option<Token>,
) -> Result<Option<T>> {
    let mut matches = select_members(
        candidates.into_iter().filter(|member| member.name() == name),
        query,
        declaring,
    );

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        count => {
            trace!(member = name, count, "ambiguous member query");
            Err(AmbiguousMatch(name.to_string()))
        }
    }
}

/// Select the member named `name` matching `query` whose parameters fit `params`, as decided
/// by `resolver`
///
/// # Errors
/// Propagates the failures of the resolver, typically [`crate::Error::AmbiguousMatch`].
pub fn select_single_with_params<T: MemberInfo + Parameterized>(
    name: &str,
    candidates: impl IntoIterator<Item = T>,
    query: BindingFlags,
    declaring: Option<Token>,
    params: &[SignatureParameter],
    resolver: &dyn OverloadResolver,
) -> Result<Option<T>> {
    let matches = select_members(
        candidates.into_iter().filter(|member| member.name() == name),
        query,
        declaring,
    );
    resolve_overload(name, matches, params, resolver)
}

/// Let `resolver` pick the member of `matches` whose parameters fit `params`
///
/// # Errors
/// Propagates the failures of the resolver, typically [`crate::Error::AmbiguousMatch`].
pub fn resolve_overload<T: Parameterized>(
    name: &str,
    mut matches: Vec<T>,
    params: &[SignatureParameter],
    resolver: &dyn OverloadResolver,
) -> Result<Option<T>> {
    if matches.is_empty() {
        return Ok(None);
    }

    let chosen = {
        let lists: Vec<&[SignatureParameter]> =
            matches.iter().map(Parameterized::parameters).collect();
        resolver.select(name, &lists, params)?
    };

    Ok(chosen
        .filter(|&index| index < matches.len())
        .map(|index| matches.swap_remove(index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        method::{Method, MethodAccessFlags, MethodAttributes, MethodModifiers},
        signatures::{SignatureMethod, TypeSignature},
    };

    fn method(name: &str, attributes: MethodAttributes, params: Vec<TypeSignature>) -> Method {
        Method::new(
            Token::new(0x0600_0001),
            name,
            attributes,
            SignatureMethod::instance(TypeSignature::Void, params),
        )
    }

    #[test]
    fn test_flags_require_instance_or_static() {
        assert!(!has_right_flags(true, false, BindingFlags::PUBLIC));
        assert!(!has_right_flags(true, true, BindingFlags::PUBLIC));
        assert!(!has_right_flags(false, false, BindingFlags::INSTANCE));
        assert!(has_right_flags(false, true, BindingFlags::NON_PUBLIC | BindingFlags::STATIC));
        assert!(has_right_flags(true, false, BindingFlags::ALL));
    }

    #[test]
    fn test_select_members_by_visibility() {
        let public = method("A", MethodAttributes::public(), vec![]);
        let private = method("B", MethodAttributes::new(MethodAccessFlags::PRIVATE), vec![]);
        let stat = method(
            "C",
            MethodAttributes::public().with_modifiers(MethodModifiers::STATIC),
            vec![],
        );
        let candidates = [&public, &private, &stat];

        let found = select_members(
            candidates,
            BindingFlags::PUBLIC | BindingFlags::INSTANCE,
            None,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "A");

        let found = select_members(candidates, BindingFlags::ALL, None);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_select_single_ambiguous() {
        let first = method("Bar", MethodAttributes::public(), vec![]);
        let second = method("Bar", MethodAttributes::public(), vec![]);

        let result = select_single("Bar", [&first, &second], BindingFlags::DEFAULT, None);
        match result {
            Err(crate::Error::AmbiguousMatch(name)) => assert_eq!(name, "Bar"),
            other => panic!("unexpected result: {:?}", other),
        }

        // Visibility filtering happens before the ambiguity check
        let hidden = method("Bar", MethodAttributes::new(MethodAccessFlags::PRIVATE), vec![]);
        let found = select_single("Bar", [&first, &hidden], BindingFlags::DEFAULT, None).unwrap();
        assert!(found.is_some());
        assert!(select_single("Baz", [&first], BindingFlags::DEFAULT, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_select_single_with_params() {
        let by_int = method("Foo", MethodAttributes::public(), vec![TypeSignature::I4]);
        let by_string = method("Foo", MethodAttributes::public(), vec![TypeSignature::String]);

        let found = select_single_with_params(
            "Foo",
            [&by_int, &by_string],
            BindingFlags::DEFAULT,
            None,
            &[SignatureParameter::new(TypeSignature::String)],
            &ExactSignatureResolver,
        )
        .unwrap()
        .unwrap();
        assert_eq!(found.signature.params[0].base, TypeSignature::String);

        let missing = select_single_with_params(
            "Foo",
            [&by_int, &by_string],
            BindingFlags::DEFAULT,
            None,
            &[],
            &ExactSignatureResolver,
        )
        .unwrap();
        assert!(missing.is_none());
    }
}
