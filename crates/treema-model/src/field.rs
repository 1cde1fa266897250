use crate::{key::KeyTuple, scalar::Scalar, value::Value};
use std::collections::HashMap;
use thiserror::Error as ThisError;

///
/// SetInsertError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SetInsertError {
    #[error("duplicate key in set")]
    DuplicateKey,

    #[error("set members require a non-empty key")]
    EmptyKey,
}

///
/// AuxList
///
/// Side-channel metadata attached to a field slot, keyed by aux name.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuxList(Vec<(String, Scalar)>);

impl AuxList {
    pub fn push(&mut self, name: impl Into<String>, value: Scalar) {
        self.0.push((name.into(), value));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[must_use]
    pub const fn entries(&self) -> &Vec<(String, Scalar)> {
        &self.0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

///
/// SingleField
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SingleField {
    pub value: Option<Value>,
    pub aux: AuxList,
}

///
/// ListField
///
/// Ordered values; always an explicit collection, never null.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListField {
    pub values: Vec<Value>,
    pub aux: AuxList,
}

///
/// SetMember
///
/// A set element together with the flattened key tuple that placed it.
/// The tuple is retained so identity stays stable post-construction.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SetMember {
    pub key: KeyTuple,
    pub value: Value,
}

///
/// SetField
///
/// Insertion-ordered members, de-duplicated by key-tuple equality.
/// Lookup goes through an xxh3 index with full tuple confirmation.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetField {
    members: Vec<SetMember>,
    #[doc(hidden)]
    index: HashMap<u64, Vec<usize>>,
    pub aux: AuxList,
}

impl SetField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &KeyTuple) -> bool {
        self.find(key).is_some()
    }

    #[must_use]
    pub fn get(&self, key: &KeyTuple) -> Option<&Value> {
        self.find(key).map(|idx| &self.members[idx].value)
    }

    /// Insert a member under its flattened key tuple.
    ///
    /// Rejects empty tuples and key duplicates; insertion order is
    /// preserved for accepted members.
    pub fn insert(&mut self, key: KeyTuple, value: Value) -> Result<(), SetInsertError> {
        if key.is_empty() {
            return Err(SetInsertError::EmptyKey);
        }
        if self.find(&key).is_some() {
            return Err(SetInsertError::DuplicateKey);
        }

        let hash = key.hash();
        let idx = self.members.len();
        self.members.push(SetMember { key, value });
        self.index.entry(hash).or_default().push(idx);

        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SetMember> {
        self.members.iter()
    }

    fn find(&self, key: &KeyTuple) -> Option<usize> {
        let bucket = self.index.get(&key.hash())?;

        bucket
            .iter()
            .copied()
            .find(|&idx| self.members[idx].key == *key)
    }
}

impl<'a> IntoIterator for &'a SetField {
    type Item = &'a SetMember;
    type IntoIter = std::slice::Iter<'a, SetMember>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

///
/// Field
///
/// One slot of an entity: single value, ordered list, or keyed set.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    Single(SingleField),
    List(ListField),
    Set(SetField),
}

impl Field {
    #[must_use]
    pub fn single(value: Value) -> Self {
        Self::Single(SingleField {
            value: Some(value),
            aux: AuxList::default(),
        })
    }

    #[must_use]
    pub fn empty_single() -> Self {
        Self::Single(SingleField::default())
    }

    #[must_use]
    pub fn list(values: Vec<Value>) -> Self {
        Self::List(ListField {
            values,
            aux: AuxList::default(),
        })
    }

    #[must_use]
    pub fn set(set: SetField) -> Self {
        Self::Set(set)
    }

    #[must_use]
    pub const fn as_single(&self) -> Option<&SingleField> {
        if let Self::Single(f) = self { Some(f) } else { None }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&ListField> {
        if let Self::List(f) = self { Some(f) } else { None }
    }

    #[must_use]
    pub const fn as_set(&self) -> Option<&SetField> {
        if let Self::Set(f) = self { Some(f) } else { None }
    }

    /// The single value, when this is a populated single slot.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Single(f) => f.value.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn aux(&self) -> &AuxList {
        match self {
            Self::Single(f) => &f.aux,
            Self::List(f) => &f.aux,
            Self::Set(f) => &f.aux,
        }
    }

    pub const fn aux_mut(&mut self) -> &mut AuxList {
        match self {
            Self::Single(f) => &mut f.aux,
            Self::List(f) => &mut f.aux,
            Self::Set(f) => &mut f.aux,
        }
    }
}

///
/// TESTS
///
