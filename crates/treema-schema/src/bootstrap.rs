//! The hand-built meta-meta-model.
//!
//! The meta-model document is itself an instance of the runtime model,
//! so decoding one needs a resolved schema describing its shape. That
//! schema cannot come through the decoder without a bootstrap cycle;
//! it is built here as a fixed constant graph instead. Every
//! user-supplied meta-model then travels the ordinary decode/resolve
//! pipeline.

use crate::{
    resolved::{ResolvedEntity, ResolvedField, ResolvedModel},
    types::{FieldKind, Multiplicity},
};
use treema_model::primitive::Primitive;

fn text(entity: &str, name: &str, number: u32) -> ResolvedField {
    let mut field = ResolvedField::new(
        format!("{entity}/{name}"),
        name,
        FieldKind::Primitive(Primitive::Text),
    );
    field.number = number;

    field
}

fn nat32(entity: &str, name: &str, number: u32) -> ResolvedField {
    let mut field = ResolvedField::new(
        format!("{entity}/{name}"),
        name,
        FieldKind::Primitive(Primitive::Nat32),
    );
    field.number = number;

    field
}

fn boolean(entity: &str, name: &str, number: u32) -> ResolvedField {
    let mut field = ResolvedField::new(
        format!("{entity}/{name}"),
        name,
        FieldKind::Primitive(Primitive::Bool),
    );
    field.number = number;

    field
}

fn composition(entity: &str, name: &str, number: u32, target: &str) -> ResolvedField {
    let mut field =
        ResolvedField::new(format!("{entity}/{name}"), name, FieldKind::Composition);
    field.number = number;
    field.target = Some(target.to_string());

    field
}

fn composition_list(entity: &str, name: &str, number: u32, target: &str) -> ResolvedField {
    let mut field = composition(entity, name, number, target);
    field.multiplicity = Multiplicity::List;

    field
}

fn entity(path: &str, fields: Vec<ResolvedField>) -> ResolvedEntity {
    let name = path.rsplit_once('/').map(|(_, n)| n).unwrap_or(path);
    let mut entity = ResolvedEntity::new(path, name);
    for field in fields {
        entity.push_field(field);
    }

    entity
}

/// The resolved schema of the meta-model document shape itself.
#[must_use]
pub fn meta_schema() -> ResolvedModel {
    let mut model = ResolvedModel::new("/meta/schema");

    model.insert_entity(entity(
        "/meta/schema",
        vec![
            text("/meta/schema", "name", 1),
            text("/meta/schema", "package", 2),
            composition("/meta/schema", "version", 3, "/meta/version"),
            composition("/meta/schema", "root", 4, "/meta/root"),
            composition_list("/meta/schema", "packages", 5, "/meta/package"),
        ],
    ));

    model.insert_entity(entity(
        "/meta/version",
        vec![
            text("/meta/version", "semantic", 1),
            text("/meta/version", "name", 2),
        ],
    ));

    model.insert_entity(entity(
        "/meta/root",
        vec![
            text("/meta/root", "package", 1),
            text("/meta/root", "name", 2),
        ],
    ));

    model.insert_entity(entity(
        "/meta/package",
        vec![
            text("/meta/package", "name", 1),
            composition_list("/meta/package", "enumerations", 2, "/meta/enumeration"),
            composition_list("/meta/package", "entities", 3, "/meta/entity"),
        ],
    ));

    model.insert_entity(entity(
        "/meta/enumeration",
        vec![
            text("/meta/enumeration", "name", 1),
            composition_list("/meta/enumeration", "values", 2, "/meta/enumeration_value"),
        ],
    ));

    model.insert_entity(entity(
        "/meta/enumeration_value",
        vec![
            text("/meta/enumeration_value", "name", 1),
            nat32("/meta/enumeration_value", "number", 2),
        ],
    ));

    model.insert_entity(entity(
        "/meta/entity",
        vec![
            text("/meta/entity", "name", 1),
            composition_list("/meta/entity", "fields", 2, "/meta/field"),
            composition_list("/meta/entity", "uniques", 3, "/meta/unique"),
        ],
    ));

    model.insert_entity(entity(
        "/meta/field",
        vec![
            text("/meta/field", "name", 1),
            nat32("/meta/field", "number", 2),
            text("/meta/field", "type", 3),
            text("/meta/field", "multiplicity", 4),
            boolean("/meta/field", "is_key", 5),
            composition("/meta/field", "enumeration", 6, "/meta/target"),
            composition("/meta/field", "association", 7, "/meta/target"),
            composition("/meta/field", "composition", 8, "/meta/target"),
            composition("/meta/field", "exists_if", 9, "/meta/exists_if"),
            nat32("/meta/field", "min_size", 10),
            nat32("/meta/field", "max_size", 11),
            text("/meta/field", "regex", 12),
            text("/meta/field", "granularity", 13),
        ],
    ));

    model.insert_entity(entity(
        "/meta/target",
        vec![
            text("/meta/target", "package", 1),
            text("/meta/target", "name", 2),
        ],
    ));

    let mut exists_if = entity(
        "/meta/exists_if",
        vec![
            text("/meta/exists_if", "operator", 1),
            text("/meta/exists_if", "field", 2),
            text("/meta/exists_if", "value", 3),
            composition("/meta/exists_if", "arg1", 4, "/meta/exists_if"),
            composition("/meta/exists_if", "arg2", 5, "/meta/exists_if"),
        ],
    );
    exists_if.recursive_composition = true;
    model.insert_entity(exists_if);

    model.insert_entity(entity(
        "/meta/unique",
        vec![
            text("/meta/unique", "name", 1),
            text("/meta/unique", "type", 2),
            composition_list("/meta/unique", "fields", 3, "/meta/unique_field"),
        ],
    ));

    model.insert_entity(entity(
        "/meta/unique_field",
        vec![text("/meta/unique_field", "value", 1)],
    ));

    model
}

///
/// TESTS
///
