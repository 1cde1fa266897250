use crate::{
    diag,
    diag::Diagnostics,
    meta::{child, has, items, text},
    resolved::{ExistsIf, ResolvedEntity, ResolvedModel},
    types::{ExistsIfOp, FieldKind},
    validate::NameIndex,
};
use treema_model::entity::Entity;

/// Phase 5: the `exists_if` boolean clause language.
///
/// Clauses are validated recursively against the already-resolved
/// sibling fields: `equals` must name a single-valued primitive or
/// enumeration sibling and a literal assignable to it, `and`/`or` take
/// exactly two sub-clauses, `not` exactly one. Fields carrying either
/// `is_key` or a validated clause are then recorded into the per-entity
/// existence table.
pub(crate) fn validate(index: &NameIndex<'_>, model: &mut ResolvedModel, diags: &mut Diagnostics) {
    let mut clauses: Vec<(String, String, ExistsIf)> = Vec::new();

    for (entity_path, entity) in &index.entity_order {
        let Some(resolved) = model.get_entity(entity_path) else {
            continue;
        };

        for field in items(entity, "fields") {
            let Some(name) = text(field, "name") else {
                continue;
            };
            let Some(raw) = child(field, "exists_if") else {
                continue;
            };

            let field_path = format!("{entity_path}/{name}");
            if let Some(clause) = validate_clause(&field_path, name, raw, resolved, model, diags) {
                clauses.push((entity_path.clone(), name.to_string(), clause));
            }
        }
    }

    for (entity_path, field_name, clause) in clauses {
        if let Some(field) = model
            .entity_mut(&entity_path)
            .and_then(|e| e.field_mut(&field_name))
        {
            field.exists_if = Some(clause);
        }
    }

    rebuild_existence(model);
}

fn validate_clause(
    field_path: &str,
    field_name: &str,
    raw: &Entity,
    entity: &ResolvedEntity,
    model: &ResolvedModel,
    diags: &mut Diagnostics,
) -> Option<ExistsIf> {
    let Some(literal) = text(raw, "operator") else {
        diag!(diags, "exists_if on '{field_path}' is missing required 'operator'");
        return None;
    };
    let Ok(operator) = literal.parse::<ExistsIfOp>() else {
        diag!(diags, "exists_if on '{field_path}' has unknown operator '{literal}'");
        return None;
    };

    match operator {
        ExistsIfOp::Equals => {
            if has(raw, "arg1") || has(raw, "arg2") {
                diag!(diags, "exists_if equals on '{field_path}' must not carry sub-clauses");
                return None;
            }
            let (Some(sibling), Some(value)) = (text(raw, "field"), text(raw, "value")) else {
                diag!(
                    diags,
                    "exists_if equals on '{field_path}' requires a 'field' and a 'value'"
                );
                return None;
            };

            validate_equals(field_path, field_name, sibling, value, entity, model, diags)
        }
        ExistsIfOp::And | ExistsIfOp::Or => {
            if has(raw, "field") || has(raw, "value") {
                diag!(
                    diags,
                    "exists_if '{literal}' on '{field_path}' must not carry 'field' or 'value'"
                );
                return None;
            }
            let (Some(arg1), Some(arg2)) = (child(raw, "arg1"), child(raw, "arg2")) else {
                diag!(
                    diags,
                    "exists_if '{literal}' on '{field_path}' requires exactly two sub-clauses"
                );
                return None;
            };

            let left = validate_clause(field_path, field_name, arg1, entity, model, diags)?;
            let right = validate_clause(field_path, field_name, arg2, entity, model, diags)?;

            Some(match operator {
                ExistsIfOp::And => ExistsIf::And(Box::new(left), Box::new(right)),
                _ => ExistsIf::Or(Box::new(left), Box::new(right)),
            })
        }
        ExistsIfOp::Not => {
            if has(raw, "field") || has(raw, "value") || has(raw, "arg2") {
                diag!(
                    diags,
                    "exists_if not on '{field_path}' takes exactly one sub-clause"
                );
                return None;
            }
            let Some(arg1) = child(raw, "arg1") else {
                diag!(
                    diags,
                    "exists_if not on '{field_path}' requires a sub-clause"
                );
                return None;
            };

            let inner = validate_clause(field_path, field_name, arg1, entity, model, diags)?;

            Some(ExistsIf::Not(Box::new(inner)))
        }
    }
}

// The referenced sibling must be a single-valued primitive or
// enumeration field, and the literal must coerce to its type with the
// same routine the decoder uses.
fn validate_equals(
    field_path: &str,
    field_name: &str,
    sibling: &str,
    literal: &str,
    entity: &ResolvedEntity,
    model: &ResolvedModel,
    diags: &mut Diagnostics,
) -> Option<ExistsIf> {
    if sibling == field_name {
        diag!(diags, "exists_if on '{field_path}' must not reference itself");
        return None;
    }
    let Some(target) = entity.field(sibling) else {
        diag!(
            diags,
            "exists_if on '{field_path}' references unknown field '{sibling}'"
        );
        return None;
    };
    if !target.multiplicity.is_single() {
        diag!(
            diags,
            "exists_if on '{field_path}' field '{sibling}' must be single-valued"
        );
        return None;
    }

    let assignable = match target.kind {
        FieldKind::Primitive(primitive) => primitive.coerce_text(literal).is_ok(),
        FieldKind::Enumeration => target
            .target
            .as_deref()
            .and_then(|path| model.get_enum(path))
            .is_some_and(|e| e.has_variant(literal)),
        _ => {
            diag!(
                diags,
                "exists_if on '{field_path}' field '{sibling}' must be a primitive or enumeration"
            );
            return None;
        }
    };

    if !assignable {
        diag!(
            diags,
            "exists_if on '{field_path}' literal '{literal}' is not assignable to '{sibling}'"
        );
        return None;
    }

    Some(ExistsIf::Equals {
        field: sibling.to_string(),
        literal: literal.to_string(),
    })
}

fn rebuild_existence(model: &mut ResolvedModel) {
    let paths: Vec<String> = model.entities().map(|e| e.path.clone()).collect();

    for path in paths {
        if let Some(entity) = model.entity_mut(&path) {
            entity.existence = entity
                .fields()
                .iter()
                .filter(|f| f.is_key || f.exists_if.is_some())
                .map(|f| f.name.clone())
                .collect();
        }
    }
}
