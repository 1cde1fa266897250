use crate::types::{FieldKind, Granularity, Multiplicity};
use regex::Regex;
use std::{collections::BTreeMap, fmt, sync::Arc};
use thiserror::Error as ThisError;
use treema_model::{
    key::KeySource,
    password::{Cipher, Hasher},
};

///
/// SchemaError
///
/// Internal-consistency faults. Asking the resolved layer for state it
/// never computed is a programmer error, not a data error; it is fatal
/// and never folded into diagnostics.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("no resolved entity at '{path}'")]
    MissingResolvedEntity { path: String },

    #[error("no resolved enumeration at '{path}'")]
    MissingResolvedEnum { path: String },
}

///
/// Services
///
/// Injected hashing/ciphering policy; supplied once at validation time
/// and wired only into password fields.
///

#[derive(Clone, Default)]
pub struct Services {
    pub hasher: Option<Arc<dyn Hasher>>,
    pub cipher: Option<Arc<dyn Cipher>>,
}

///
/// ExistsIf
///
/// Validated boolean clause over sibling fields.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExistsIf {
    Equals { field: String, literal: String },
    And(Box<ExistsIf>, Box<ExistsIf>),
    Or(Box<ExistsIf>, Box<ExistsIf>),
    Not(Box<ExistsIf>),
}

///
/// Unique
///
/// Named group of single-valued, non-composition field references.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Unique {
    pub name: String,
    pub fields: Vec<String>,
}

///
/// ResolvedField
///

#[derive(Clone)]
pub struct ResolvedField {
    pub path: String,
    pub name: String,
    pub number: u32,
    pub kind: FieldKind,
    pub multiplicity: Multiplicity,
    pub is_key: bool,

    /// Full path of the enumeration/association/composition target.
    pub target: Option<String>,

    /// For associations: entity paths of the composition steps from the
    /// schema root down to the target, target included.
    pub association_steps: Vec<String>,

    pub exists_if: Option<ExistsIf>,
    pub min_size: Option<u32>,
    pub max_size: Option<u32>,
    pub regex: Option<Regex>,
    pub granularity: Option<Granularity>,

    pub hasher: Option<Arc<dyn Hasher>>,
    pub cipher: Option<Arc<dyn Cipher>>,
}

impl ResolvedField {
    #[must_use]
    pub(crate) fn new(path: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            number: 0,
            kind,
            multiplicity: Multiplicity::default(),
            is_key: false,
            target: None,
            association_steps: Vec::new(),
            exists_if: None,
            min_size: None,
            max_size: None,
            regex: None,
            granularity: None,
            hasher: None,
            cipher: None,
        }
    }
}

impl fmt::Debug for ResolvedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedField")
            .field("path", &self.path)
            .field("number", &self.number)
            .field("kind", &self.kind)
            .field("multiplicity", &self.multiplicity)
            .field("is_key", &self.is_key)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

///
/// ResolvedEntity
///

#[derive(Clone, Debug, Default)]
pub struct ResolvedEntity {
    pub path: String,
    pub name: String,
    fields: Vec<ResolvedField>,

    /// Key field names, sorted by field number.
    pub keys: Vec<String>,

    /// Full paths of composition fields that target this entity.
    pub back_refs: Vec<String>,

    /// Entity reaches itself through composition edges.
    pub recursive_composition: bool,

    /// Entity reaches itself through association edges.
    pub recursive_association: bool,

    /// Field-existence side table: names with `is_key` or a validated
    /// `exists_if` clause.
    pub existence: Vec<String>,

    pub uniques: Vec<Unique>,
}

impl ResolvedEntity {
    #[must_use]
    pub(crate) fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut ResolvedField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub(crate) fn push_field(&mut self, field: ResolvedField) {
        self.fields.push(field);
    }

    /// Recompute the number-sorted key order from the current fields.
    pub(crate) fn rebuild_keys(&mut self) {
        let mut keyed: Vec<(u32, String)> = self
            .fields
            .iter()
            .filter(|f| f.is_key)
            .map(|f| (f.number, f.name.clone()))
            .collect();
        keyed.sort_by_key(|(number, _)| *number);

        self.keys = keyed.into_iter().map(|(_, name)| name).collect();
    }

    #[must_use]
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    /// All declared keys are primitive-kind fields.
    #[must_use]
    pub fn has_only_primitive_keys(&self) -> bool {
        self.has_keys()
            && self.keys.iter().all(|name| {
                self.field(name)
                    .is_some_and(|f| f.kind.is_primitive())
            })
    }
}

///
/// ResolvedEnum
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResolvedEnum {
    pub path: String,
    pub name: String,
    pub values: Vec<(String, u32)>,
}

impl ResolvedEnum {
    #[must_use]
    pub fn ordinal(&self, variant: &str) -> Option<u32> {
        self.values
            .iter()
            .find(|(name, _)| name == variant)
            .map(|(_, number)| *number)
    }

    #[must_use]
    pub fn has_variant(&self, variant: &str) -> bool {
        self.ordinal(variant).is_some()
    }
}

///
/// ResolvedModel
///
/// The immutable resolution layer: derived facts keyed by full path,
/// threaded alongside the raw meta-model rather than written into it.
/// Computed once; safe for unlimited concurrent readers afterwards.
///

#[derive(Clone, Debug, Default)]
pub struct ResolvedModel {
    root: String,
    entities: BTreeMap<String, ResolvedEntity>,
    enums: BTreeMap<String, ResolvedEnum>,
}

impl ResolvedModel {
    #[must_use]
    pub(crate) fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            entities: BTreeMap::new(),
            enums: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn entity(&self, path: &str) -> Result<&ResolvedEntity, SchemaError> {
        self.entities
            .get(path)
            .ok_or_else(|| SchemaError::MissingResolvedEntity {
                path: path.to_string(),
            })
    }

    pub fn enumeration(&self, path: &str) -> Result<&ResolvedEnum, SchemaError> {
        self.enums
            .get(path)
            .ok_or_else(|| SchemaError::MissingResolvedEnum {
                path: path.to_string(),
            })
    }

    #[must_use]
    pub fn get_entity(&self, path: &str) -> Option<&ResolvedEntity> {
        self.entities.get(path)
    }

    #[must_use]
    pub fn get_enum(&self, path: &str) -> Option<&ResolvedEnum> {
        self.enums.get(path)
    }

    pub fn entities(&self) -> impl Iterator<Item = &ResolvedEntity> {
        self.entities.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &ResolvedEnum> {
        self.enums.values()
    }

    pub(crate) fn insert_entity(&mut self, entity: ResolvedEntity) {
        self.entities.insert(entity.path.clone(), entity);
    }

    pub(crate) fn insert_enum(&mut self, enumeration: ResolvedEnum) {
        self.enums.insert(enumeration.path.clone(), enumeration);
    }

    pub(crate) fn entity_mut(&mut self, path: &str) -> Option<&mut ResolvedEntity> {
        self.entities.get_mut(path)
    }
}

impl KeySource for ResolvedModel {
    fn key_fields(&self, entity_path: &str) -> Option<&[String]> {
        self.entities.get(entity_path).map(|e| e.keys.as_slice())
    }
}
