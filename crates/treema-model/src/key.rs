use crate::{entity::Entity, field::Field, scalar::Scalar, value::Value};
use thiserror::Error as ThisError;
use xxhash_rust::xxh3::xxh3_64;

///
/// KeyError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KeyError {
    #[error("entity '{path}' has no key order")]
    UnknownEntity { path: String },

    #[error("entity '{path}' is missing key field '{field}'")]
    MissingKeyField { path: String, field: String },

    #[error("key field '{field}' of '{path}' holds a value that cannot be part of a key")]
    NonKeyableValue { path: String, field: String },
}

///
/// KeySource
///
/// Key-order lookup seam. The resolved meta-model implements this; the
/// model crate itself never depends on the schema layer.
///

pub trait KeySource {
    /// Key field names for the entity type at `path`, sorted by field
    /// number. `None` when the path is unknown to the source.
    fn key_fields(&self, entity_path: &str) -> Option<&[String]>;
}

///
/// KeyTuple
///
/// Flattened, ordered key values of one entity. Identity for set
/// membership and entity matching.
///

#[derive(Clone, Debug, Default)]
pub struct KeyTuple(Vec<Scalar>);

impl KeyTuple {
    /// Flatten an entity's identity in resolved key order.
    ///
    /// Composition-valued keys recurse into the child entity's own key
    /// order, so nested identities collapse into one flat tuple.
    pub fn of(entity: &Entity, keys: &dyn KeySource) -> Result<Self, KeyError> {
        let mut scalars = Vec::new();
        Self::flatten(entity, keys, &mut scalars)?;

        Ok(Self(scalars))
    }

    fn flatten(
        entity: &Entity,
        keys: &dyn KeySource,
        out: &mut Vec<Scalar>,
    ) -> Result<(), KeyError> {
        let fields = keys
            .key_fields(entity.path())
            .ok_or_else(|| KeyError::UnknownEntity {
                path: entity.path().to_string(),
            })?;

        for name in fields {
            let missing = || KeyError::MissingKeyField {
                path: entity.path().to_string(),
                field: name.clone(),
            };

            let value = match entity.field(name) {
                Some(Field::Single(single)) => single.value.as_ref().ok_or_else(missing)?,
                _ => return Err(missing()),
            };

            match value {
                Value::Scalar(scalar) => out.push(scalar.clone()),
                // enum identity is its declared variant name
                Value::Enum(e) => out.push(Scalar::Text(e.variant.clone())),
                Value::Entity(child) => Self::flatten(child, keys, out)?,
                Value::Reference(_) | Value::Password1way(_) | Value::Password2way(_) => {
                    return Err(KeyError::NonKeyableValue {
                        path: entity.path().to_string(),
                        field: name.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Build a tuple from already-flattened scalars.
    #[must_use]
    pub const fn from_scalars(scalars: Vec<Scalar>) -> Self {
        Self(scalars)
    }

    #[must_use]
    pub const fn scalars(&self) -> &Vec<Scalar> {
        &self.0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for scalar in &self.0 {
            scalar.write_key_bytes(&mut buf);
        }

        buf
    }

    /// xxh3 hash of the canonical encoding; set membership index key.
    #[must_use]
    pub fn hash(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

impl PartialEq for KeyTuple {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bytes() == other.canonical_bytes()
    }
}

impl Eq for KeyTuple {}

///
/// TESTS
///
