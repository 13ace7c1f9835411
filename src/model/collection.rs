//! Partitioned member storage of a type model.
//!
//! A [`MemberCollection`] holds every member of one kind in three disjoint partitions:
//!
//! - **existing-declared**: descriptors wrapping the captured members of the original type,
//!   keyed by the token of the wrapped member,
//! - **added**: descriptors created through the model, in order of creation,
//! - **existing-inherited**: host records of accessible ancestor members. Slots overridden by
//!   a declared member are filtered out when the collection is queried.
//!
//! Descriptors live in a single arena (existing first, added after) and are addressed by
//! [`MemberId`]s, so identity never depends on where a value happens to live.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    config::MemberFilter,
    metadata::{
        members::{EventRc, FieldRc, PropertyRc},
        method::MethodRc,
        signatures::{SignatureMethod, SignatureProperty},
        token::Token,
        typesystem::{CilTypeList, CilTypeRc},
    },
    model::{MemberEntry, MemberId, MemberInfo, MutableMember, RelatedMethodFinder, TypeSnapshot},
    Error::MemberNotFound,
    Result,
};

/// All members of one kind of a type model
#[derive(Debug)]
pub struct MemberCollection<M: MutableMember> {
    owner: Token,
    members: Vec<M>,
    existing_count: usize,
    by_original: FxHashMap<Token, u32>,
    inherited: Vec<Arc<M::Original>>,
}

impl<M: MutableMember> MemberCollection<M> {
    /// Build a collection from the wrapped existing members and the inherited host members
    pub(crate) fn new(owner: Token, existing: Vec<M>, inherited: Vec<Arc<M::Original>>) -> Self {
        let by_original = existing
            .iter()
            .enumerate()
            .filter_map(|(index, member)| {
                member
                    .original()
                    .map(|original| (original.token(), index as u32))
            })
            .collect();

        MemberCollection {
            owner,
            existing_count: existing.len(),
            members: existing,
            by_original,
            inherited,
        }
    }

    fn check(&self, id: MemberId<M>) -> Result<usize> {
        if id.owner() != self.owner || id.index() >= self.members.len() {
            return Err(MemberNotFound(format!("{} {:?}", M::KIND, id)));
        }
        Ok(id.index())
    }

    /// The descriptor with the given id
    ///
    /// # Errors
    /// Returns [`crate::Error::MemberNotFound`] for ids of other models or unknown indices.
    pub fn get(&self, id: MemberId<M>) -> Result<&M> {
        let index = self.check(id)?;
        Ok(&self.members[index])
    }

    pub(crate) fn get_mut(&mut self, id: MemberId<M>) -> Result<&mut M> {
        let index = self.check(id)?;
        Ok(&mut self.members[index])
    }

    fn with_ids(
        &self,
        range: std::ops::Range<usize>,
    ) -> impl Iterator<Item = (MemberId<M>, &M)> {
        let owner = self.owner;
        let start = range.start;
        self.members[range]
            .iter()
            .enumerate()
            .map(move |(offset, member)| (MemberId::new(owner, start + offset), member))
    }

    /// Descriptors wrapping members of the original type
    pub fn existing(&self) -> impl Iterator<Item = (MemberId<M>, &M)> {
        self.with_ids(0..self.existing_count)
    }

    /// Descriptors created through the model, in order of creation
    pub fn added(&self) -> impl Iterator<Item = (MemberId<M>, &M)> {
        self.with_ids(self.existing_count..self.members.len())
    }

    /// Existing descriptors followed by added ones
    pub fn declared(&self) -> impl Iterator<Item = (MemberId<M>, &M)> {
        self.with_ids(0..self.members.len())
    }

    /// Inherited host members, before filtering out overridden slots
    #[must_use]
    pub fn inherited(&self) -> &[Arc<M::Original>] {
        &self.inherited
    }

    /// The id of the descriptor wrapping the original member `original`
    #[must_use]
    pub fn id_of_original(&self, original: Token) -> Option<MemberId<M>> {
        self.by_original
            .get(&original)
            .map(|&index| MemberId::new(self.owner, index as usize))
    }

    /// The descriptor wrapping the original member `original`
    #[must_use]
    pub fn mutable_member(&self, original: Token) -> Option<&M> {
        self.by_original
            .get(&original)
            .map(|&index| &self.members[index as usize])
    }

    /// Number of declared descriptors
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Neither existing nor added descriptors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of added descriptors
    #[must_use]
    pub fn added_len(&self) -> usize {
        self.members.len() - self.existing_count
    }

    pub(crate) fn add(&mut self, member: M) -> MemberId<M> {
        self.members.push(member);
        MemberId::new(self.owner, self.members.len() - 1)
    }

    /// Drop added descriptors beyond `len` declared ones
    pub(crate) fn truncate(&mut self, len: usize) {
        self.members.truncate(len.max(self.existing_count));
    }

    /// Every member: existing, added, then the inherited ones `keep_inherited` accepts
    pub fn entries<'a>(
        &'a self,
        keep_inherited: impl Fn(&Arc<M::Original>) -> bool,
    ) -> Vec<MemberEntry<'a, M, M::Original>> {
        self.declared()
            .map(|(id, member)| MemberEntry::Declared(id, member))
            .chain(
                self.inherited
                    .iter()
                    .filter(|member| keep_inherited(member))
                    .map(MemberEntry::Inherited),
            )
            .collect()
    }
}

/// The hierarchy above the captured type, nearest level first
pub(crate) fn ancestor_levels(snapshot: &TypeSnapshot, max_depth: usize) -> Result<CilTypeList> {
    match snapshot.base() {
        Some(base) => base.hierarchy(max_depth),
        None => Ok(Vec::new()),
    }
}

/// Accessible instance methods of the ancestors, each slot and each name+signature only once,
/// nearest level first. Also returns the root definition of every inherited method.
pub(crate) fn collect_inherited_methods(
    snapshot: &TypeSnapshot,
    filter: &dyn MemberFilter,
    finder: &RelatedMethodFinder,
    declared_roots: impl IntoIterator<Item = Token>,
    max_depth: usize,
) -> Result<(Vec<MethodRc>, FxHashMap<Token, Token>)> {
    let mut seen_roots: FxHashSet<Token> = declared_roots.into_iter().collect();
    let mut seen_signatures: FxHashSet<(String, SignatureMethod)> = snapshot
        .methods()
        .iter()
        .map(|method| (method.name.clone(), method.signature.clone()))
        .collect();

    // Slots the original type occupies with members the filter dropped are still occupied
    let original = snapshot.original();
    for method in original.methods.iter().filter(|m| m.is_virtual() && !m.is_static()) {
        seen_roots.insert(finder.root_or_self(method)?.token);
    }
    for imp in &original.overrides {
        seen_roots.insert(finder.root_or_self(&imp.declaration)?.token);
    }

    let mut inherited = Vec::new();
    let mut roots = FxHashMap::default();
    for level in ancestor_levels(snapshot, max_depth)? {
        for method in &level.methods {
            if method.is_constructor() || method.is_static() {
                continue;
            }

            let visible = !method.flags_access.is_private() && filter.include_method(method);
            let key = (method.name.clone(), method.signature.clone());
            if visible && seen_signatures.contains(&key) {
                continue;
            }
            if method.is_virtual() {
                let root = finder.root_or_self(method)?.token;
                if !seen_roots.insert(root) || !visible {
                    continue;
                }
                roots.insert(method.token, root);
            } else if !visible {
                continue;
            }
            seen_signatures.insert(key);
            inherited.push(method.clone());
        }
    }
    Ok((inherited, roots))
}

/// Roots of the abstract slots left open by the original type and its ancestors that no
/// captured method stands for
///
/// The walk ignores the member filter. `captured` holds the tokens of the captured declared
/// and inherited methods; their abstractness is tracked through the model itself.
pub(crate) fn collect_uncaptured_abstract_roots(
    snapshot: &TypeSnapshot,
    captured: &FxHashSet<Token>,
    finder: &RelatedMethodFinder,
    max_depth: usize,
) -> Result<Vec<Token>> {
    let mut levels = vec![snapshot.original().clone()];
    levels.extend(ancestor_levels(snapshot, max_depth)?);

    let mut seen_roots = FxHashSet::default();
    let mut open = Vec::new();
    for level in &levels {
        for imp in level.overrides.iter().filter(|imp| !imp.body.is_abstract()) {
            seen_roots.insert(finder.root_or_self(&imp.declaration)?.token);
        }
        for method in level.methods.iter().filter(|m| m.is_virtual() && !m.is_static()) {
            let root = finder.root_or_self(method)?.token;
            if seen_roots.insert(root) && method.is_abstract() && !captured.contains(&method.token)
            {
                open.push(root);
            }
        }
    }
    Ok(open)
}

/// Accessible instance fields of the ancestors
pub(crate) fn collect_inherited_fields(
    snapshot: &TypeSnapshot,
    filter: &dyn MemberFilter,
    max_depth: usize,
) -> Result<Vec<FieldRc>> {
    let mut inherited = Vec::new();
    for level in ancestor_levels(snapshot, max_depth)? {
        inherited.extend(
            level
                .fields
                .iter()
                .filter(|field| {
                    !field.is_private() && !field.is_static() && filter.include_field(field)
                })
                .cloned(),
        );
    }
    Ok(inherited)
}

/// Accessible instance properties of the ancestors, each name+signature only once
pub(crate) fn collect_inherited_properties(
    snapshot: &TypeSnapshot,
    filter: &dyn MemberFilter,
    max_depth: usize,
) -> Result<Vec<PropertyRc>> {
    let mut seen: FxHashSet<(String, SignatureProperty)> = snapshot
        .properties()
        .iter()
        .map(|property| (property.name.clone(), property.signature.clone()))
        .collect();

    let mut inherited = Vec::new();
    for level in ancestor_levels(snapshot, max_depth)? {
        for property in &level.properties {
            if property.is_private() || property.is_static() || !filter.include_property(property)
            {
                continue;
            }
            if seen.insert((property.name.clone(), property.signature.clone())) {
                inherited.push(property.clone());
            }
        }
    }
    Ok(inherited)
}

/// Accessible instance events of the ancestors, each name only once
pub(crate) fn collect_inherited_events(
    snapshot: &TypeSnapshot,
    filter: &dyn MemberFilter,
    max_depth: usize,
) -> Result<Vec<EventRc>> {
    let mut seen: FxHashSet<String> = snapshot
        .events()
        .iter()
        .map(|event| event.name.clone())
        .collect();

    let mut inherited = Vec::new();
    for level in ancestor_levels(snapshot, max_depth)? {
        for event in &level.events {
            if event.is_private() || event.is_static() || !filter.include_event(event) {
                continue;
            }
            if seen.insert(event.name.clone()) {
                inherited.push(event.clone());
            }
        }
    }
    Ok(inherited)
}

/// Check if `declaring` is the token of one of `levels`
pub(crate) fn is_ancestor_member(levels: &[CilTypeRc], declaring: Token) -> bool {
    levels.iter().any(|level| level.token == declaring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::VisibilityMemberFilter,
        model::{MemberEntry, MutableField},
        test::TestUniverse,
    };

    #[test]
    fn test_inherited_methods_skip_overridden_slots() {
        let universe = TestUniverse::new();
        let filter = VisibilityMemberFilter::default();
        let finder = RelatedMethodFinder::new(64);

        // ManagedResource overrides Dispose; its base Resource declares it
        let snapshot = TypeSnapshot::capture(&universe.managed_resource, &filter).unwrap();
        let declared_roots = snapshot
            .methods()
            .iter()
            .map(|method| finder.root_or_self(method).unwrap().token)
            .collect::<Vec<_>>();
        let (inherited, roots) =
            collect_inherited_methods(&snapshot, &filter, &finder, declared_roots, 64).unwrap();

        let names: Vec<_> = inherited.iter().map(|m| m.name.as_str()).collect();
        assert!(!names.contains(&"Dispose"));
        assert!(names.contains(&"ToString"));
        assert!(names.contains(&"GetHashCode"));
        // protected members are inherited, constructors never
        assert!(names.contains(&"Finalize"));
        assert!(!names.contains(&".ctor"));
        assert_eq!(roots.len(), inherited.iter().filter(|m| m.is_virtual()).count());
    }

    #[test]
    fn test_collection_partitions() {
        let universe = TestUniverse::new();
        let owner = Token::new(0x0200_1000);
        let field = universe.point.fields[0].clone();

        let mut collection: MemberCollection<MutableField> = MemberCollection::new(
            owner,
            vec![MutableField::existing(owner, &field)],
            Vec::new(),
        );
        assert_eq!(collection.existing().count(), 1);
        assert_eq!(collection.added().count(), 0);

        let added = collection.add(MutableField::added(
            Token::new(0x0400_1000),
            owner,
            "extra".to_string(),
            0,
            field.signature.clone(),
        ));
        assert_eq!(added.index(), 1);
        assert_eq!(collection.added_len(), 1);
        assert!(collection.id_of_original(field.token).is_some());
        assert_eq!(
            collection.mutable_member(field.token).unwrap().name(),
            field.name
        );

        let entries = collection.entries(|_| true);
        assert!(matches!(entries[0], MemberEntry::Declared(..)));
        assert_eq!(entries.len(), 2);

        // Ids of another model are rejected
        let foreign = MemberId::<MutableField>::new(Token::new(0x0200_2000), 0);
        assert!(matches!(
            collection.get(foreign),
            Err(crate::Error::MemberNotFound(_))
        ));

        collection.truncate(1);
        assert_eq!(collection.added_len(), 0);
        assert!(collection.get(added).is_err());
    }
}
