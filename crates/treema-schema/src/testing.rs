//! Hand-built raw meta-model trees for resolver tests.

use treema_model::{entity::Entity, field::Field, scalar::Scalar, value::Value};

fn text(entity: &mut Entity, name: &str, value: &str) {
    entity.set(
        name,
        Field::single(Value::Scalar(Scalar::Text(value.to_string()))),
    );
}

fn nat32(entity: &mut Entity, name: &str, value: u32) {
    entity.set(name, Field::single(Value::Scalar(Scalar::Nat32(value))));
}

fn children(entity: &mut Entity, name: &str, items: Vec<Entity>) {
    entity.set(
        name,
        Field::list(items.into_iter().map(Value::from).collect()),
    );
}

/// A well-formed document skeleton around the given packages.
pub(crate) fn doc(root_package: &str, root_name: &str, packages: Vec<Entity>) -> Entity {
    let mut doc = Entity::new("/meta/schema");
    text(&mut doc, "name", "fixture");
    text(&mut doc, "package", "test");

    let mut version = Entity::new("/meta/version");
    text(&mut version, "semantic", "1.0.0");
    doc.set("version", Field::single(Value::from(version)));

    let mut root = Entity::new("/meta/root");
    text(&mut root, "package", root_package);
    text(&mut root, "name", root_name);
    doc.set("root", Field::single(Value::from(root)));

    children(&mut doc, "packages", packages);

    doc
}

pub(crate) fn package(name: &str, entities: Vec<Entity>) -> Entity {
    package_full(name, Vec::new(), entities)
}

pub(crate) fn package_full(
    name: &str,
    enumerations: Vec<Entity>,
    entities: Vec<Entity>,
) -> Entity {
    let mut pkg = Entity::new("/meta/package");
    text(&mut pkg, "name", name);
    children(&mut pkg, "enumerations", enumerations);
    children(&mut pkg, "entities", entities);

    pkg
}

pub(crate) fn enumeration(name: &str, values: &[(&str, u32)]) -> Entity {
    let mut e = Entity::new("/meta/enumeration");
    text(&mut e, "name", name);

    let values = values
        .iter()
        .map(|(value_name, number)| {
            let mut v = Entity::new("/meta/enumeration_value");
            text(&mut v, "name", value_name);
            nat32(&mut v, "number", *number);
            v
        })
        .collect();
    children(&mut e, "values", values);

    e
}

pub(crate) fn entity(name: &str, fields: Vec<Entity>) -> Entity {
    let mut e = Entity::new("/meta/entity");
    text(&mut e, "name", name);
    children(&mut e, "fields", fields);

    e
}

pub(crate) fn with_unique(mut entity: Entity, name: &str, fields: &[&str]) -> Entity {
    let unique = {
        let mut u = Entity::new("/meta/unique");
        text(&mut u, "name", name);

        let refs = fields
            .iter()
            .map(|field_name| {
                let mut r = Entity::new("/meta/unique_field");
                text(&mut r, "value", field_name);
                r
            })
            .collect();
        children(&mut u, "fields", refs);

        u
    };

    match entity.field_mut("uniques") {
        Some(Field::List(list)) => list.values.push(Value::from(unique)),
        _ => children(&mut entity, "uniques", vec![unique]),
    }

    entity
}

pub(crate) fn field(name: &str, number: u32, field_type: &str) -> Entity {
    let mut f = Entity::new("/meta/field");
    text(&mut f, "name", name);
    nat32(&mut f, "number", number);
    text(&mut f, "type", field_type);

    f
}

pub(crate) fn field_unnumbered(name: &str, field_type: &str) -> Entity {
    let mut f = Entity::new("/meta/field");
    text(&mut f, "name", name);
    text(&mut f, "type", field_type);

    f
}

pub(crate) fn with_unnumbered_value(mut enumeration: Entity, name: &str) -> Entity {
    let mut v = Entity::new("/meta/enumeration_value");
    text(&mut v, "name", name);

    match enumeration.field_mut("values") {
        Some(Field::List(list)) => list.values.push(Value::from(v)),
        _ => children(&mut enumeration, "values", vec![v]),
    }

    enumeration
}

pub(crate) fn with_target(mut field: Entity, slot: &str, package: &str, name: &str) -> Entity {
    let mut target = Entity::new("/meta/target");
    text(&mut target, "package", package);
    text(&mut target, "name", name);
    field.set(slot, Field::single(Value::from(target)));

    field
}

pub(crate) fn with_multiplicity(mut field: Entity, multiplicity: &str) -> Entity {
    text(&mut field, "multiplicity", multiplicity);

    field
}

pub(crate) fn with_key(mut field: Entity) -> Entity {
    field.set("is_key", Field::single(Value::Scalar(Scalar::Bool(true))));

    field
}

pub(crate) fn with_exists_if(mut field: Entity, clause: Entity) -> Entity {
    field.set("exists_if", Field::single(Value::from(clause)));

    field
}

pub(crate) fn equals(sibling: &str, literal: &str) -> Entity {
    let mut clause = Entity::new("/meta/exists_if");
    text(&mut clause, "operator", "equals");
    text(&mut clause, "field", sibling);
    text(&mut clause, "value", literal);

    clause
}

pub(crate) fn and(arg1: Entity, arg2: Entity) -> Entity {
    let mut clause = Entity::new("/meta/exists_if");
    text(&mut clause, "operator", "and");
    clause.set("arg1", Field::single(Value::from(arg1)));
    clause.set("arg2", Field::single(Value::from(arg2)));

    clause
}

pub(crate) fn not(arg1: Entity) -> Entity {
    let mut clause = Entity::new("/meta/exists_if");
    text(&mut clause, "operator", "not");
    clause.set("arg1", Field::single(Value::from(arg1)));

    clause
}
