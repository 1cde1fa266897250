use crate::{
    FIELD_NUMBER_MAX, FIELD_NUMBER_MIN, RESERVED_NUMBER_MAX, RESERVED_NUMBER_MIN, diag,
    diag::Diagnostics,
    meta::{items, nat32, text},
    validate::NameIndex,
};
use std::collections::BTreeMap;

/// Phase 3: field and enumeration-value numbering.
///
/// Field numbers must sit inside the declarable range, avoid the
/// reserved band, and be unique per entity. Enumeration value numbers
/// are unique per enumeration and the first declared value must be
/// numbered zero. This runs independently of the non-empty structural
/// check so an empty enumeration reports both problems.
pub(crate) fn validate(index: &NameIndex<'_>, diags: &mut Diagnostics) {
    for (path, entity) in &index.entity_order {
        let mut claimed: BTreeMap<u32, String> = BTreeMap::new();

        for field in items(entity, "fields") {
            let Some(name) = text(field, "name") else {
                continue;
            };

            let Some(number) = nat32(field, "number") else {
                diag!(diags, "field '{path}/{name}' is missing required 'number'");
                continue;
            };

            if !(FIELD_NUMBER_MIN..=FIELD_NUMBER_MAX).contains(&number) {
                diag!(
                    diags,
                    "field '{path}/{name}' number {number} is outside {FIELD_NUMBER_MIN}..={FIELD_NUMBER_MAX}"
                );
            } else if (RESERVED_NUMBER_MIN..=RESERVED_NUMBER_MAX).contains(&number) {
                diag!(
                    diags,
                    "field '{path}/{name}' number {number} falls in the reserved range {RESERVED_NUMBER_MIN}..={RESERVED_NUMBER_MAX}"
                );
            }

            if let Some(holder) = claimed.get(&number) {
                diag!(
                    diags,
                    "field '{path}/{name}' reuses number {number} already held by '{holder}'"
                );
            } else {
                claimed.insert(number, name.to_string());
            }
        }
    }

    for (path, enumeration) in &index.enum_order {
        let mut claimed: BTreeMap<u32, String> = BTreeMap::new();

        for (value_index, value) in items(enumeration, "values").enumerate() {
            let Some(name) = text(value, "name") else {
                continue;
            };

            let Some(number) = nat32(value, "number") else {
                diag!(diags, "value '{path}/{name}' is missing required 'number'");
                continue;
            };

            if value_index == 0 && number != 0 {
                diag!(
                    diags,
                    "enumeration '{path}' must number its first value zero, found {number}"
                );
            }

            if let Some(holder) = claimed.get(&number) {
                diag!(
                    diags,
                    "value '{path}/{name}' reuses number {number} already held by '{holder}'"
                );
            } else {
                claimed.insert(number, name.to_string());
            }
        }
    }
}
