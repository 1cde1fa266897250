use crate::{
    field::Field,
    key::{KeySource, KeyTuple},
};

///
/// FieldMap
///
/// Insertion-ordered name → field map. Entities carry few fields, so
/// lookup is a linear scan over a flat vec.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMap(Vec<(String, Field)>);

impl FieldMap {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.0.iter_mut().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Insert or replace a field, returning the old one if present.
    pub fn insert(&mut self, name: impl Into<String>, field: Field) -> Option<Field> {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, field)),
            None => {
                self.0.push((name, field));
                None
            }
        }
    }

    /// Fetch a field, creating it with `default` when absent.
    pub fn get_or_insert_with(
        &mut self,
        name: &str,
        default: impl FnOnce() -> Field,
    ) -> &mut Field {
        let idx = match self.0.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                self.0.push((name.to_string(), default()));
                self.0.len() - 1
            }
        };

        &mut self.0[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.0.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

///
/// Entity
///
/// A reflective record instance. Its shape is dictated entirely by the
/// meta-model entity named by `path`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    path: String,
    fields: FieldMap,
}

impl Entity {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fields: FieldMap::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub const fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    pub fn set(&mut self, name: impl Into<String>, field: Field) {
        self.fields.insert(name, field);
    }

    /// Reset for reuse: same shape, no contents.
    pub fn reset(&mut self, path: impl Into<String>) {
        self.path = path.into();
        self.fields.clear();
    }

    /// Key-by-key structural match; non-key fields are ignored.
    pub fn matches(&self, other: &Self, keys: &dyn KeySource) -> Result<bool, crate::key::KeyError> {
        Ok(KeyTuple::of(self, keys)? == KeyTuple::of(other, keys)?)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scalar::Scalar, value::Value};
    use std::collections::BTreeMap;

    struct MapSource(BTreeMap<String, Vec<String>>);

    impl KeySource for MapSource {
        fn key_fields(&self, entity_path: &str) -> Option<&[String]> {
            self.0.get(entity_path).map(Vec::as_slice)
        }
    }

    fn person(id: u32, name: &str) -> Entity {
        let mut e = Entity::new("/app/person");
        e.set("id", Field::single(Value::Scalar(Scalar::Nat32(id))));
        e.set(
            "name",
            Field::single(Value::Scalar(Scalar::Text(name.to_string()))),
        );

        e
    }

    #[test]
    fn field_map_keeps_declaration_order() {
        let e = person(1, "ada");
        let names: Vec<_> = e.fields().iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn matching_ignores_non_key_fields() {
        let keys = MapSource(
            [("/app/person".to_string(), vec!["id".to_string()])]
                .into_iter()
                .collect(),
        );

        let a = person(1, "ada");
        let b = person(1, "grace");
        let c = person(2, "ada");

        assert!(a.matches(&b, &keys).unwrap());
        assert!(!a.matches(&c, &keys).unwrap());
    }
}
