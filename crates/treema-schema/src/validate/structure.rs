use crate::{
    diag,
    diag::Diagnostics,
    meta::{child, has_list, items, text},
};
use treema_model::entity::Entity;

/// Phase 1: presence and shape of required sub-trees.
///
/// Failure here halts validation; every later phase assumes this held.
pub(crate) fn validate(doc: &Entity, diags: &mut Diagnostics) {
    if text(doc, "name").is_none() {
        diag!(diags, "schema is missing required 'name'");
    }
    if text(doc, "package").is_none() {
        diag!(diags, "schema is missing required 'package'");
    }

    match child(doc, "version") {
        Some(version) if text(version, "semantic").is_some() => {}
        Some(_) => diag!(diags, "schema version is missing required 'semantic'"),
        None => diag!(diags, "schema is missing required 'version'"),
    }

    match child(doc, "root") {
        Some(root) => {
            if text(root, "package").is_none() || text(root, "name").is_none() {
                diag!(diags, "schema root must name a 'package' and a 'name'");
            }
        }
        None => diag!(diags, "schema is missing required 'root'"),
    }

    if !has_list(doc, "packages") {
        diag!(diags, "schema is missing required 'packages'");
        return;
    }

    for (pkg_index, pkg) in items(doc, "packages").enumerate() {
        let Some(pkg_name) = text(pkg, "name") else {
            diag!(diags, "package at index {pkg_index} is missing required 'name'");
            continue;
        };

        validate_enumerations(pkg, pkg_name, diags);
        validate_entities(pkg, pkg_name, diags);
    }
}

fn validate_enumerations(pkg: &Entity, pkg_name: &str, diags: &mut Diagnostics) {
    for enumeration in items(pkg, "enumerations") {
        let Some(name) = text(enumeration, "name") else {
            diag!(diags, "enumeration in package '{pkg_name}' is missing required 'name'");
            continue;
        };

        // independent of the first-number rule; see the numbering phase
        if items(enumeration, "values").next().is_none() {
            diag!(
                diags,
                "enumeration '{pkg_name}/{name}' must declare at least one value"
            );
        }

        for value in items(enumeration, "values") {
            if text(value, "name").is_none() {
                diag!(
                    diags,
                    "value in enumeration '{pkg_name}/{name}' is missing required 'name'"
                );
            }
        }
    }
}

fn validate_entities(pkg: &Entity, pkg_name: &str, diags: &mut Diagnostics) {
    if !has_list(pkg, "entities") {
        diag!(diags, "package '{pkg_name}' is missing required 'entities'");
        return;
    }

    for entity in items(pkg, "entities") {
        let Some(name) = text(entity, "name") else {
            diag!(diags, "entity in package '{pkg_name}' is missing required 'name'");
            continue;
        };

        if !has_list(entity, "fields") {
            diag!(diags, "entity '{pkg_name}/{name}' is missing required 'fields'");
            continue;
        }

        for field in items(entity, "fields") {
            let Some(field_name) = text(field, "name") else {
                diag!(
                    diags,
                    "field in entity '{pkg_name}/{name}' is missing required 'name'"
                );
                continue;
            };

            if text(field, "type").is_none() {
                diag!(
                    diags,
                    "field '{pkg_name}/{name}/{field_name}' is missing required 'type'"
                );
            }
        }

        for unique in items(entity, "uniques") {
            let Some(unique_name) = text(unique, "name") else {
                diag!(
                    diags,
                    "unique in entity '{pkg_name}/{name}' is missing required 'name'"
                );
                continue;
            };

            if items(unique, "fields").next().is_none() {
                diag!(
                    diags,
                    "unique '{pkg_name}/{name}/{unique_name}' must reference at least one field"
                );
            }
        }
    }
}
