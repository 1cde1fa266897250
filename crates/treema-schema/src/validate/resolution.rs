use crate::{
    diag,
    diag::Diagnostics,
    meta::{boolean, child, items, nat32, text},
    resolved::{ResolvedEntity, ResolvedEnum, ResolvedField, ResolvedModel, Services, Unique},
    types::{FieldKind, Granularity, Multiplicity},
    validate::NameIndex,
};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use treema_model::entity::Entity;

/// Phase 4: non-primitive type resolution and the derived layer.
///
/// Entities and enumerations may be referenced before they are declared
/// and across packages, so the naming phase's full-path table is the
/// lookup used here; declaration order never matters. Resolving a
/// composition also registers a back-reference on the target, and the
/// key/set-target constraints are checked once every target is known.
pub(crate) fn validate(
    doc: &Entity,
    index: &NameIndex<'_>,
    services: Services,
    diags: &mut Diagnostics,
) -> ResolvedModel {
    let mut model = ResolvedModel::new(root_path(doc, index, diags));

    for (path, enumeration) in &index.enum_order {
        model.insert_enum(resolve_enum(path, enumeration));
    }

    // field paths of composing fields, keyed by target entity path
    let mut back_refs: Vec<(String, String)> = Vec::new();

    for (path, entity) in &index.entity_order {
        model.insert_entity(resolve_entity(
            path,
            entity,
            index,
            &services,
            &mut back_refs,
            diags,
        ));
    }

    for (target, field_path) in back_refs {
        if let Some(entity) = model.entity_mut(&target) {
            entity.back_refs.push(field_path);
        }
    }

    for (path, _) in &index.entity_order {
        if let Some(entity) = model.entity_mut(path) {
            entity.back_refs.sort();
            entity.rebuild_keys();
        }
    }

    check_key_constraints(&model, diags);
    link_association_steps(&mut model, diags);
    flag_recursion(&mut model);

    model
}

fn root_path(doc: &Entity, index: &NameIndex<'_>, diags: &mut Diagnostics) -> String {
    let Some(root) = child(doc, "root") else {
        return String::new();
    };
    let (Some(package), Some(name)) = (text(root, "package"), text(root, "name")) else {
        return String::new();
    };

    let path = format!("/{package}/{name}");
    if !index.entities.contains_key(&path) {
        diag!(diags, "schema root references unknown entity '{path}'");
    }

    path
}

fn resolve_enum(path: &str, enumeration: &Entity) -> ResolvedEnum {
    let mut resolved = ResolvedEnum {
        path: path.to_string(),
        name: text(enumeration, "name").unwrap_or_default().to_string(),
        values: Vec::new(),
    };

    for value in items(enumeration, "values") {
        if let (Some(name), Some(number)) = (text(value, "name"), nat32(value, "number")) {
            resolved.values.push((name.to_string(), number));
        }
    }

    resolved
}

fn resolve_entity(
    path: &str,
    entity: &Entity,
    index: &NameIndex<'_>,
    services: &Services,
    back_refs: &mut Vec<(String, String)>,
    diags: &mut Diagnostics,
) -> ResolvedEntity {
    let mut resolved = ResolvedEntity::new(path, text(entity, "name").unwrap_or_default());

    for field in items(entity, "fields") {
        let Some(name) = text(field, "name") else {
            continue;
        };

        if let Some(resolved_field) =
            resolve_field(path, name, field, index, services, back_refs, diags)
        {
            resolved.push_field(resolved_field);
        }
    }

    resolved.uniques = resolve_uniques(path, entity, &resolved, diags);

    resolved
}

fn resolve_field(
    entity_path: &str,
    name: &str,
    field: &Entity,
    index: &NameIndex<'_>,
    services: &Services,
    back_refs: &mut Vec<(String, String)>,
    diags: &mut Diagnostics,
) -> Option<ResolvedField> {
    let path = format!("{entity_path}/{name}");

    let type_literal = text(field, "type")?;
    let Some(kind) = FieldKind::parse(type_literal) else {
        diag!(diags, "field '{path}' has unknown type '{type_literal}'");
        return None;
    };

    let mut resolved = ResolvedField::new(&path, name, kind);
    resolved.number = nat32(field, "number").unwrap_or_default();
    resolved.is_key = boolean(field, "is_key").unwrap_or_default();
    resolved.min_size = nat32(field, "min_size");
    resolved.max_size = nat32(field, "max_size");

    if let Some(literal) = text(field, "multiplicity") {
        match literal.parse::<Multiplicity>() {
            Ok(multiplicity) => resolved.multiplicity = multiplicity,
            Err(_) => diag!(diags, "field '{path}' has unknown multiplicity '{literal}'"),
        }
    }

    if let Some(literal) = text(field, "granularity") {
        match literal.parse::<Granularity>() {
            Ok(granularity) => resolved.granularity = Some(granularity),
            Err(_) => diag!(diags, "field '{path}' has unknown granularity '{literal}'"),
        }
    }

    if let Some(literal) = text(field, "regex") {
        match Regex::new(literal) {
            Ok(regex) => resolved.regex = Some(regex),
            Err(_) => diag!(diags, "field '{path}' regex '{literal}' does not compile"),
        }
    }

    if let Some(slot) = kind.target_slot() {
        resolved.target = resolve_target(&path, field, slot, kind, index, diags);

        if kind == FieldKind::Composition
            && let Some(target) = &resolved.target
        {
            back_refs.push((target.clone(), path.clone()));
        }
    }

    match kind {
        FieldKind::Password1way => resolved.hasher = services.hasher.clone(),
        FieldKind::Password2way => resolved.cipher = services.cipher.clone(),
        _ => {}
    }

    Some(resolved)
}

// Resolve a `{package, name}` target against the full-path table.
fn resolve_target(
    field_path: &str,
    field: &Entity,
    slot: &'static str,
    kind: FieldKind,
    index: &NameIndex<'_>,
    diags: &mut Diagnostics,
) -> Option<String> {
    let Some(target) = child(field, slot) else {
        diag!(diags, "field '{field_path}' is missing required '{slot}'");
        return None;
    };
    let (Some(package), Some(name)) = (text(target, "package"), text(target, "name")) else {
        diag!(diags, "field '{field_path}' {slot} must name a 'package' and a 'name'");
        return None;
    };

    let target_path = format!("/{package}/{name}");
    let resolvable = if kind == FieldKind::Enumeration {
        index.enums.contains_key(&target_path)
    } else {
        index.entities.contains_key(&target_path)
    };

    if !resolvable {
        diag!(
            diags,
            "field '{field_path}' references unresolvable {slot} '{target_path}'"
        );
        return None;
    }

    Some(target_path)
}

fn resolve_uniques(
    entity_path: &str,
    entity: &Entity,
    resolved: &ResolvedEntity,
    diags: &mut Diagnostics,
) -> Vec<Unique> {
    let mut uniques = Vec::new();

    for unique in items(entity, "uniques") {
        let Some(name) = text(unique, "name") else {
            continue;
        };

        let mut fields = Vec::new();
        for reference in items(unique, "fields") {
            let Some(field_name) = text(reference, "value") else {
                continue;
            };

            let Some(field) = resolved.field(field_name) else {
                diag!(
                    diags,
                    "unique '{entity_path}/{name}' references unknown field '{field_name}'"
                );
                continue;
            };

            if field.multiplicity.is_collection() {
                diag!(
                    diags,
                    "unique '{entity_path}/{name}' field '{field_name}' must be single-valued"
                );
                continue;
            }
            if field.kind == FieldKind::Composition {
                diag!(
                    diags,
                    "unique '{entity_path}/{name}' field '{field_name}' must not be a composition"
                );
                continue;
            }

            fields.push(field_name.to_string());
        }

        uniques.push(Unique {
            name: name.to_string(),
            fields,
        });
    }

    uniques
}

// Constraints over resolved targets; runs once every target is known.
fn check_key_constraints(model: &ResolvedModel, diags: &mut Diagnostics) {
    for entity in model.entities() {
        for field in entity.fields() {
            if field.is_key {
                if matches!(field.kind, FieldKind::Association) || field.kind.is_password() {
                    diag!(diags, "field '{}' of kind {} can never be a key", field.path, field.kind);
                }
                if !field.multiplicity.is_single() {
                    diag!(diags, "key field '{}' must be single-valued", field.path);
                }

                if field.kind == FieldKind::Composition
                    && let Some(target) = field.target.as_deref()
                    && let Some(target_entity) = model.get_entity(target)
                    && !target_entity.has_only_primitive_keys()
                {
                    diag!(
                        diags,
                        "key field '{}' target '{target}' does not have only primitive keys",
                        field.path
                    );
                }
            }

            if field.multiplicity == Multiplicity::Set {
                if field.kind != FieldKind::Composition {
                    diag!(
                        diags,
                        "field '{}' has set multiplicity but is not a composition",
                        field.path
                    );
                } else if let Some(target) = field.target.as_deref()
                    && let Some(target_entity) = model.get_entity(target)
                    && !target_entity.has_keys()
                {
                    diag!(
                        diags,
                        "field '{}' target '{target}' does not have keys",
                        field.path
                    );
                }
            }
        }
    }
}

// Walk each association target up its (sorted) back-references to the
// schema root, recording the entity path at every composition step.
fn link_association_steps(model: &mut ResolvedModel, diags: &mut Diagnostics) {
    let root = model.root().to_string();
    let mut updates: Vec<(String, String, Vec<String>)> = Vec::new();

    for entity in model.entities() {
        for field in entity.fields() {
            if field.kind != FieldKind::Association {
                continue;
            }
            let Some(target) = field.target.as_deref() else {
                continue;
            };

            let Some(steps) = steps_to_root(model, &root, target) else {
                diag!(
                    diags,
                    "field '{}' target '{target}' is not reachable from root '{root}'",
                    field.path
                );
                continue;
            };

            if field.multiplicity == Multiplicity::List
                && !steps.iter().any(|step| {
                    model.get_entity(step).is_some_and(ResolvedEntity::has_keys)
                })
            {
                diag!(
                    diags,
                    "field '{}' is a list association but no step to '{target}' has keys",
                    field.path
                );
            }

            updates.push((entity.path.clone(), field.name.clone(), steps));
        }
    }

    for (entity_path, field_name, steps) in updates {
        if let Some(field) = model
            .entity_mut(&entity_path)
            .and_then(|e| e.field_mut(&field_name))
        {
            field.association_steps = steps;
        }
    }
}

// Root-first entity paths down to `target`, target included.
fn steps_to_root(model: &ResolvedModel, root: &str, target: &str) -> Option<Vec<String>> {
    let mut steps = vec![target.to_string()];
    let mut visited: BTreeSet<String> = BTreeSet::new();
    visited.insert(target.to_string());

    let mut current = target.to_string();
    while current != root {
        let entity = model.get_entity(&current)?;

        let mut next = None;
        for back_ref in &entity.back_refs {
            let (owner, _) = back_ref.rsplit_once('/')?;
            if visited.insert(owner.to_string()) {
                next = Some(owner.to_string());
                break;
            }
        }

        current = next?;
        steps.push(current.clone());
    }

    steps.reverse();
    Some(steps)
}

// Composition/association closures that reach their own starting point.
fn flag_recursion(model: &mut ResolvedModel) {
    let mut compositions: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut associations: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for entity in model.entities() {
        for field in entity.fields() {
            let Some(target) = field.target.clone() else {
                continue;
            };
            match field.kind {
                FieldKind::Composition => {
                    compositions.entry(entity.path.clone()).or_default().push(target);
                }
                FieldKind::Association => {
                    associations.entry(entity.path.clone()).or_default().push(target);
                }
                _ => {}
            }
        }
    }

    let paths: Vec<String> = model.entities().map(|e| e.path.clone()).collect();
    for path in paths {
        let recursive_composition = reaches_self(&compositions, &path);
        let recursive_association = reaches_self(&associations, &path);

        if let Some(entity) = model.entity_mut(&path) {
            entity.recursive_composition = recursive_composition;
            entity.recursive_association = recursive_association;
        }
    }
}

fn reaches_self(edges: &BTreeMap<String, Vec<String>>, start: &str) -> bool {
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut stack: Vec<&str> = edges.get(start).map(|targets| {
        targets.iter().map(String::as_str).collect()
    }).unwrap_or_default();

    while let Some(current) = stack.pop() {
        if current == start {
            return true;
        }
        if visited.insert(current)
            && let Some(targets) = edges.get(current)
        {
            stack.extend(targets.iter().map(String::as_str));
        }
    }

    false
}
