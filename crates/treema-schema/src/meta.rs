//! Typed accessors over the raw (generic) meta-model tree.

use treema_model::{entity::Entity, field::Field, scalar::Scalar, value::Value};

pub(crate) fn text<'a>(entity: &'a Entity, name: &str) -> Option<&'a str> {
    match entity.field(name)?.value()? {
        Value::Scalar(Scalar::Text(s)) => Some(s.as_str()),
        _ => None,
    }
}

pub(crate) fn nat32(entity: &Entity, name: &str) -> Option<u32> {
    match entity.field(name)?.value()? {
        Value::Scalar(s) => s.as_nat32(),
        _ => None,
    }
}

pub(crate) fn boolean(entity: &Entity, name: &str) -> Option<bool> {
    match entity.field(name)?.value()? {
        Value::Scalar(s) => s.as_bool(),
        _ => None,
    }
}

pub(crate) fn child<'a>(entity: &'a Entity, name: &str) -> Option<&'a Entity> {
    entity.field(name)?.value()?.as_entity()
}

/// Composition-list items; absent or non-list slots iterate empty.
pub(crate) fn items<'a>(entity: &'a Entity, name: &str) -> impl Iterator<Item = &'a Entity> {
    let values = match entity.field(name) {
        Some(Field::List(list)) => list.values.as_slice(),
        _ => &[],
    };

    values.iter().filter_map(Value::as_entity)
}

pub(crate) fn has(entity: &Entity, name: &str) -> bool {
    entity.field(name).is_some()
}

pub(crate) fn has_list(entity: &Entity, name: &str) -> bool {
    matches!(entity.field(name), Some(Field::List(_)))
}
