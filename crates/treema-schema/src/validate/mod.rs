//! Meta-model validation and resolution, staged in a deterministic
//! order. Later phases assume earlier phases held.

mod exists_if;
mod naming;
mod numbering;
mod resolution;
mod structure;

#[cfg(test)]
mod tests;

use crate::{
    diag::Diagnostics,
    resolved::{ResolvedModel, Services},
};
use log::debug;
use std::collections::BTreeMap;
use treema_model::entity::Entity;

///
/// NameIndex
///
/// The immutable path table produced by the naming phase: every entity
/// and enumeration across all packages, keyed by full path, plus the
/// original declaration order for deterministic diagnostics.
///

pub(crate) struct NameIndex<'a> {
    pub entity_order: Vec<(String, &'a Entity)>,
    pub enum_order: Vec<(String, &'a Entity)>,
    pub entities: BTreeMap<String, &'a Entity>,
    pub enums: BTreeMap<String, &'a Entity>,
}

/// Validate a raw meta-model tree and compute its resolution layer.
///
/// Phases run strictly in sequence: structure, naming, numbering,
/// reference resolution, `exists_if`. All issues accumulate as plain
/// diagnostic strings; a structural failure aborts the later phases
/// because they assume a well-shaped tree.
pub fn resolve(doc: &Entity, services: Services) -> Result<ResolvedModel, Diagnostics> {
    let mut diags = Diagnostics::new();

    structure::validate(doc, &mut diags);
    if !diags.is_empty() {
        return Err(diags);
    }

    let index = naming::validate(doc, &mut diags);
    debug!(
        "naming phase indexed {} entities, {} enumerations",
        index.entity_order.len(),
        index.enum_order.len()
    );

    numbering::validate(&index, &mut diags);

    let mut model = resolution::validate(doc, &index, services, &mut diags);

    exists_if::validate(&index, &mut model, &mut diags);

    debug!("resolution finished with {} diagnostics", diags.len());
    if diags.is_empty() { Ok(model) } else { Err(diags) }
}
