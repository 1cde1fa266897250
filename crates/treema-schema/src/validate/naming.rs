use crate::{
    diag,
    diag::Diagnostics,
    meta::{items, text},
    validate::NameIndex,
};
use regex::Regex;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};
use treema_model::entity::Entity;

// Package names may be dotted; element names may not.
static PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z][a-z0-9_.]*$").expect("literal pattern"));
static ELEMENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z][a-z0-9_]*$").expect("literal pattern"));

/// Phase 2: depth-first walk assigning full path names, validating each
/// local name against its per-level character class and rejecting
/// duplicate full paths. The returned index is the path table every
/// later phase relies on.
pub(crate) fn validate<'a>(doc: &'a Entity, diags: &mut Diagnostics) -> NameIndex<'a> {
    let mut index = NameIndex {
        entity_order: Vec::new(),
        enum_order: Vec::new(),
        entities: BTreeMap::new(),
        enums: BTreeMap::new(),
    };
    let mut seen: BTreeSet<String> = BTreeSet::new();

    if let Some(name) = text(doc, "name")
        && !ELEMENT_NAME.is_match(name)
    {
        diag!(diags, "schema name '{name}' is invalid");
    }
    if let Some(package) = text(doc, "package")
        && !PACKAGE_NAME.is_match(package)
    {
        diag!(diags, "schema package '{package}' is invalid");
    }

    for pkg in items(doc, "packages") {
        let Some(pkg_name) = text(pkg, "name") else {
            continue;
        };

        if !PACKAGE_NAME.is_match(pkg_name) {
            diag!(diags, "package name '{pkg_name}' is invalid");
        }

        let pkg_path = format!("/{pkg_name}");
        if !seen.insert(pkg_path.clone()) {
            diag!(diags, "duplicate name '{pkg_path}'");
        }

        for enumeration in items(pkg, "enumerations") {
            let Some(path) =
                named_element(&pkg_path, enumeration, "enumeration", &mut seen, diags)
            else {
                continue;
            };

            for value in items(enumeration, "values") {
                named_element(&path, value, "enumeration value", &mut seen, diags);
            }

            index.enum_order.push((path.clone(), enumeration));
            index.enums.entry(path).or_insert(enumeration);
        }

        for entity in items(pkg, "entities") {
            let Some(path) = named_element(&pkg_path, entity, "entity", &mut seen, diags) else {
                continue;
            };

            for field in items(entity, "fields") {
                named_element(&path, field, "field", &mut seen, diags);
            }

            // unique groups live in their own namespace per entity
            let mut unique_names: BTreeSet<&str> = BTreeSet::new();
            for unique in items(entity, "uniques") {
                let Some(name) = text(unique, "name") else {
                    continue;
                };
                if !ELEMENT_NAME.is_match(name) {
                    diag!(diags, "unique name '{path}/{name}' is invalid");
                }
                if !unique_names.insert(name) {
                    diag!(diags, "duplicate unique '{path}/{name}'");
                }
            }

            index.entity_order.push((path.clone(), entity));
            index.entities.entry(path).or_insert(entity);
        }
    }

    index
}

// Validate one named child and claim its full path.
fn named_element(
    parent_path: &str,
    node: &Entity,
    level: &str,
    seen: &mut BTreeSet<String>,
    diags: &mut Diagnostics,
) -> Option<String> {
    let name = text(node, "name")?;
    let path = format!("{parent_path}/{name}");

    if !ELEMENT_NAME.is_match(name) {
        diag!(diags, "{level} name '{path}' is invalid");
    }
    if !seen.insert(path.clone()) {
        diag!(diags, "duplicate name '{path}'");
    }

    Some(path)
}
