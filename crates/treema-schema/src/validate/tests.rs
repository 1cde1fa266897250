use crate::{
    prelude::*,
    testing::{
        and, doc, entity, enumeration, equals, field, field_unnumbered, not, package, package_full,
        with_exists_if, with_key, with_multiplicity, with_target, with_unique,
        with_unnumbered_value,
    },
};

fn resolve_ok(doc: treema_model::entity::Entity) -> ResolvedModel {
    match resolve(&doc, Services::default()) {
        Ok(model) => model,
        Err(diags) => panic!("expected clean resolution, got:\n{diags}"),
    }
}

fn resolve_err(doc: treema_model::entity::Entity) -> Diagnostics {
    match resolve(&doc, Services::default()) {
        Ok(_) => panic!("expected diagnostics"),
        Err(diags) => diags,
    }
}

fn person() -> treema_model::entity::Entity {
    entity(
        "person",
        vec![
            with_key(field("id", 2, "nat32")),
            field("name", 1, "text"),
        ],
    )
}

#[test]
fn resolves_a_minimal_schema() {
    let model = resolve_ok(doc("app", "person", vec![package("app", vec![person()])]));

    assert_eq!(model.root(), "/app/person");

    let person = model.entity("/app/person").unwrap();
    assert_eq!(person.keys, vec!["id"]);
    assert!(person.has_only_primitive_keys());
    assert_eq!(person.existence, vec!["id"]);

    let name = person.field("name").unwrap();
    assert_eq!(name.number, 1);
    assert_eq!(name.kind, FieldKind::Primitive(Primitive::Text));
    assert!(!name.is_key);
}

#[test]
fn key_order_follows_field_numbers_not_declaration() {
    let e = entity(
        "pair",
        vec![
            with_key(field("second", 9, "nat32")),
            with_key(field("first", 3, "nat32")),
        ],
    );
    let model = resolve_ok(doc("app", "pair", vec![package("app", vec![e])]));

    assert_eq!(model.entity("/app/pair").unwrap().keys, vec!["first", "second"]);
}

#[test]
fn structural_failure_halts_later_phases() {
    let mut broken = doc("app", "person", vec![package("app", vec![person()])]);
    broken.set("name", treema_model::field::Field::empty_single());

    let diags = resolve_err(broken);
    assert!(diags.any_contains("schema is missing required 'name'"));
    // naming would also have complained about this root, but never ran
    assert_eq!(diags.len(), 1);
}

#[test]
fn rejects_invalid_and_duplicate_names() {
    let diags = resolve_err(doc(
        "app",
        "person",
        vec![package(
            "app",
            vec![person(), entity("Person", vec![field("id", 1, "nat32")]), person()],
        )],
    ));

    assert!(diags.any_contains("entity name '/app/Person' is invalid"));
    assert!(diags.any_contains("duplicate name '/app/person'"));
}

#[test]
fn entities_and_enumerations_share_a_package_namespace() {
    let diags = resolve_err(doc(
        "app",
        "person",
        vec![package_full(
            "app",
            vec![enumeration("person", &[("unknown", 0)])],
            vec![person()],
        )],
    ));

    assert!(diags.any_contains("duplicate name '/app/person'"));
}

#[test]
fn rejects_bad_field_numbers() {
    let e = entity(
        "bad",
        vec![
            field("zero", 0, "text"),
            field("reserved", 19_500, "text"),
            field("huge", 536_870_912, "text"),
            field("taken", 7, "text"),
            field("again", 7, "text"),
        ],
    );
    let diags = resolve_err(doc("app", "bad", vec![package("app", vec![e])]));

    assert!(diags.any_contains("'/app/bad/zero' number 0 is outside"));
    assert!(diags.any_contains("'/app/bad/reserved' number 19500 falls in the reserved range"));
    assert!(diags.any_contains("'/app/bad/huge' number 536870912 is outside"));
    assert!(diags.any_contains("'/app/bad/again' reuses number 7 already held by 'taken'"));
}

#[test]
fn missing_numbers_are_reported() {
    let e = entity(
        "person",
        vec![
            with_key(field("id", 1, "nat32")),
            field_unnumbered("name", "text"),
        ],
    );
    let status = with_unnumbered_value(enumeration("status", &[("active", 0)]), "late");

    let diags = resolve_err(doc(
        "app",
        "person",
        vec![package_full("app", vec![status], vec![e])],
    ));

    assert!(diags.any_contains("field '/app/person/name' is missing required 'number'"));
    assert!(diags.any_contains("value '/app/status/late' is missing required 'number'"));
}

#[test]
fn enumeration_first_value_must_be_zero() {
    let diags = resolve_err(doc(
        "app",
        "person",
        vec![package_full(
            "app",
            vec![enumeration("status", &[("active", 1), ("retired", 1)])],
            vec![person()],
        )],
    ));

    assert!(diags.any_contains("'/app/status' must number its first value zero, found 1"));
    assert!(diags.any_contains("'/app/status/retired' reuses number 1"));
}

#[test]
fn empty_enumeration_fails_the_structural_check() {
    let diags = resolve_err(doc(
        "app",
        "person",
        vec![package_full("app", vec![enumeration("status", &[])], vec![person()])],
    ));

    assert!(diags.any_contains("'app/status' must declare at least one value"));
}

#[test]
fn reports_unresolvable_targets() {
    let e = entity(
        "order",
        vec![
            with_key(field("id", 1, "nat32")),
            with_target(field("status", 2, "enumeration"), "enumeration", "app", "missing"),
        ],
    );
    let diags = resolve_err(doc("app", "order", vec![package("app", vec![e])]));

    assert!(diags.any_contains(
        "field '/app/order/status' references unresolvable enumeration '/app/missing'"
    ));
}

#[test]
fn forward_cross_package_references_resolve() {
    // package a is declared after package b, which references into it
    let holder = entity(
        "holder",
        vec![
            with_key(with_target(
                field("part", 1, "composition"),
                "composition",
                "a",
                "part",
            )),
            field("note", 2, "text"),
        ],
    );
    let part = entity("part", vec![with_key(field("serial", 1, "nat32"))]);

    let model = resolve_ok(doc(
        "b",
        "holder",
        vec![package("b", vec![holder]), package("a", vec![part])],
    ));

    let part = model.entity("/a/part").unwrap();
    assert_eq!(part.back_refs, vec!["/b/holder/part"]);

    let holder = model.entity("/b/holder").unwrap();
    assert_eq!(
        holder.field("part").unwrap().target.as_deref(),
        Some("/a/part")
    );
}

#[test]
fn key_composition_requires_primitive_keys_on_target() {
    let inner = entity("inner", vec![with_key(field("id", 1, "nat32"))]);
    let middle = entity(
        "middle",
        vec![with_key(with_target(
            field("inner", 1, "composition"),
            "composition",
            "app",
            "inner",
        ))],
    );
    let outer = entity(
        "outer",
        vec![with_key(with_target(
            field("middle", 1, "composition"),
            "composition",
            "app",
            "middle",
        ))],
    );

    let diags = resolve_err(doc(
        "app",
        "outer",
        vec![package("app", vec![outer, middle, inner])],
    ));

    assert!(diags.any_contains(
        "key field '/app/outer/middle' target '/app/middle' does not have only primitive keys"
    ));
}

#[test]
fn set_composition_requires_keys_on_target() {
    let keyless = entity("line", vec![field("note", 1, "text")]);
    let order = entity(
        "order",
        vec![
            with_key(field("id", 1, "nat32")),
            with_multiplicity(
                with_target(field("lines", 2, "composition"), "composition", "app", "line"),
                "set",
            ),
        ],
    );

    let diags = resolve_err(doc("app", "order", vec![package("app", vec![order, keyless])]));

    assert!(diags.any_contains("field '/app/order/lines' target '/app/line' does not have keys"));
}

#[test]
fn associations_and_passwords_can_never_be_keys() {
    let person = person();
    let e = entity(
        "account",
        vec![
            with_key(with_target(
                field("owner", 1, "association"),
                "association",
                "app",
                "person",
            )),
            with_key(field("secret", 2, "password1way")),
        ],
    );

    let diags = resolve_err(doc("app", "account", vec![package("app", vec![e, person])]));

    assert!(diags.any_contains("'/app/account/owner' of kind association can never be a key"));
    assert!(diags.any_contains("'/app/account/secret' of kind password1way can never be a key"));
}

#[test]
fn uniques_reject_collections_and_compositions() {
    let line = entity("line", vec![with_key(field("id", 1, "nat32"))]);
    let order = with_unique(
        with_unique(
            entity(
                "order",
                vec![
                    with_key(field("id", 1, "nat32")),
                    field("note", 2, "text"),
                    with_multiplicity(field("tags", 3, "text"), "list"),
                    with_target(field("line", 4, "composition"), "composition", "app", "line"),
                ],
            ),
            "by_note",
            &["note"],
        ),
        "broken",
        &["tags", "line", "ghost"],
    );

    let diags = resolve_err(doc("app", "order", vec![package("app", vec![order, line])]));

    assert!(diags.any_contains("unique '/app/order/broken' field 'tags' must be single-valued"));
    assert!(diags.any_contains("unique '/app/order/broken' field 'line' must not be a composition"));
    assert!(diags.any_contains("unique '/app/order/broken' references unknown field 'ghost'"));
}

#[test]
fn valid_uniques_survive_into_the_model() {
    let order = with_unique(
        entity(
            "order",
            vec![with_key(field("id", 1, "nat32")), field("note", 2, "text")],
        ),
        "by_note",
        &["note"],
    );

    let model = resolve_ok(doc("app", "order", vec![package("app", vec![order])]));

    let uniques = &model.entity("/app/order").unwrap().uniques;
    assert_eq!(uniques.len(), 1);
    assert_eq!(uniques[0].name, "by_note");
    assert_eq!(uniques[0].fields, vec!["note"]);
}

#[test]
fn exists_if_equals_accepts_enum_value_names_only() {
    let status = enumeration("status", &[("active", 0), ("retired", 1)]);
    let good = entity(
        "person",
        vec![
            with_key(field("id", 1, "nat32")),
            with_target(field("status", 2, "enumeration"), "enumeration", "app", "status"),
            with_exists_if(field("pension", 3, "text"), equals("status", "retired")),
        ],
    );

    let model = resolve_ok(doc(
        "app",
        "person",
        vec![package_full("app", vec![status.clone()], vec![good])],
    ));
    let person = model.entity("/app/person").unwrap();
    assert_eq!(
        person.field("pension").unwrap().exists_if,
        Some(ExistsIf::Equals {
            field: "status".to_string(),
            literal: "retired".to_string(),
        })
    );
    assert_eq!(person.existence, vec!["id", "pension"]);

    let bad = entity(
        "person",
        vec![
            with_key(field("id", 1, "nat32")),
            with_target(field("status", 2, "enumeration"), "enumeration", "app", "status"),
            with_exists_if(field("pension", 3, "text"), equals("status", "dormant")),
        ],
    );
    let diags = resolve_err(doc(
        "app",
        "person",
        vec![package_full("app", vec![status], vec![bad])],
    ));

    assert!(diags.any_contains(
        "literal 'dormant' is not assignable to 'status'"
    ));
}

#[test]
fn exists_if_literal_must_coerce_to_the_sibling_type() {
    let e = entity(
        "sensor",
        vec![
            with_key(field("id", 1, "nat32")),
            field("level", 2, "int32"),
            with_exists_if(field("detail", 3, "text"), equals("level", "often")),
        ],
    );
    let diags = resolve_err(doc("app", "sensor", vec![package("app", vec![e])]));

    assert!(diags.any_contains("literal 'often' is not assignable to 'level'"));
}

#[test]
fn exists_if_rejects_self_and_non_scalar_siblings() {
    let line = entity("line", vec![with_key(field("id", 1, "nat32"))]);
    let e = entity(
        "order",
        vec![
            with_key(field("id", 1, "nat32")),
            with_target(field("line", 2, "composition"), "composition", "app", "line"),
            with_exists_if(field("selfish", 3, "text"), equals("selfish", "x")),
            with_exists_if(field("nested", 4, "text"), equals("line", "x")),
        ],
    );
    let diags = resolve_err(doc("app", "order", vec![package("app", vec![e, line])]));

    assert!(diags.any_contains("exists_if on '/app/order/selfish' must not reference itself"));
    assert!(diags.any_contains("field 'line' must be a primitive or enumeration"));
}

#[test]
fn exists_if_connectives_check_their_arity() {
    let e = entity(
        "config",
        vec![
            with_key(field("id", 1, "nat32")),
            field("mode", 2, "text"),
            with_exists_if(
                field("extra", 3, "text"),
                and(equals("mode", "a"), equals("mode", "b")),
            ),
            with_exists_if(field("lonely", 4, "text"), not(equals("missing", "x"))),
        ],
    );
    let diags = resolve_err(doc("app", "config", vec![package("app", vec![e])]));

    // the `and` clause is fine; only the inner equals of `not` fails
    assert_eq!(diags.len(), 1);
    assert!(diags.any_contains(
        "exists_if on '/app/config/lonely' references unknown field 'missing'"
    ));
}

#[test]
fn flags_recursive_compositions() {
    let node = entity(
        "node",
        vec![
            with_key(field("id", 1, "nat32")),
            with_multiplicity(
                with_target(field("children", 2, "composition"), "composition", "app", "node"),
                "set",
            ),
        ],
    );
    let leaf = entity("leaf", vec![with_key(field("id", 1, "nat32"))]);

    let model = resolve_ok(doc("app", "node", vec![package("app", vec![node, leaf])]));

    assert!(model.entity("/app/node").unwrap().recursive_composition);
    assert!(!model.entity("/app/leaf").unwrap().recursive_composition);
}

#[test]
fn flags_recursive_associations() {
    let person = entity(
        "person",
        vec![
            with_key(field("id", 1, "nat32")),
            with_target(field("friend", 2, "association"), "association", "app", "person"),
        ],
    );
    let badge = entity("badge", vec![with_key(field("id", 1, "nat32"))]);

    let model = resolve_ok(doc("app", "person", vec![package("app", vec![person, badge])]));

    let person = model.entity("/app/person").unwrap();
    assert!(person.recursive_association);
    assert!(!person.recursive_composition);
    assert!(!model.entity("/app/badge").unwrap().recursive_association);
}

#[test]
fn association_steps_run_from_the_root() {
    let part = entity("part", vec![with_key(field("serial", 1, "nat32"))]);
    let machine = entity(
        "machine",
        vec![
            with_key(field("id", 1, "nat32")),
            with_multiplicity(
                with_target(field("parts", 2, "composition"), "composition", "app", "part"),
                "set",
            ),
        ],
    );
    let plant = entity(
        "plant",
        vec![
            with_key(field("id", 1, "nat32")),
            with_multiplicity(
                with_target(field("machines", 2, "composition"), "composition", "app", "machine"),
                "set",
            ),
            with_target(field("flagship", 3, "association"), "association", "app", "part"),
        ],
    );

    let model = resolve_ok(doc(
        "app",
        "plant",
        vec![package("app", vec![plant, machine, part])],
    ));

    let flagship = model.entity("/app/plant").unwrap().field("flagship").unwrap();
    assert_eq!(
        flagship.association_steps,
        vec!["/app/plant", "/app/machine", "/app/part"]
    );
}

#[test]
fn list_associations_need_a_keyed_step() {
    // the whole composition chain is keyless, so a list association
    // has no tuple to address elements by
    let note = entity("note", vec![field("body", 1, "text")]);
    let journal = entity(
        "journal",
        vec![
            field("title", 1, "text"),
            with_multiplicity(
                with_target(field("notes", 2, "composition"), "composition", "app", "note"),
                "list",
            ),
            with_multiplicity(
                with_target(field("pinned", 3, "association"), "association", "app", "note"),
                "list",
            ),
        ],
    );

    let diags = resolve_err(doc("app", "journal", vec![package("app", vec![journal, note])]));

    assert!(diags.any_contains(
        "field '/app/journal/pinned' is a list association but no step to '/app/note' has keys"
    ));
}
