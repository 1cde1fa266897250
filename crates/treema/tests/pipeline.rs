//! End-to-end pipeline: decode a meta-model document against the
//! bootstrap schema, resolve it, then decode data against the result.

use serde_json::{Value as Json, json};
use treema::prelude::*;
use treema_model::{
    entity::Entity, field::Field, key::KeyTuple, scalar::Scalar, value::Value,
};

/// Drive a `TokenSink` from a JSON value. Numbers travel as text, the
/// way any precision-preserving tokenizer would send them.
fn feed(sink: &mut impl TokenSink, value: &Json) -> Result<(), DecodeError> {
    match value {
        Json::Null => sink.null_value(),
        Json::Bool(b) => sink.boolean_value(*b),
        Json::Number(n) => sink.number_value(&n.to_string()),
        Json::String(s) => sink.string_value(s),
        Json::Array(items) => {
            sink.list_start()?;
            for item in items {
                feed(sink, item)?;
            }
            sink.list_end()
        }
        Json::Object(entries) => {
            sink.object_start()?;
            for (key, item) in entries {
                sink.key(key)?;
                feed(sink, item)?;
            }
            sink.object_end()
        }
    }
}

fn decode(model: &ResolvedModel, options: DecodeOptions, doc: &Json) -> Decoded {
    let mut decoder = Decoder::new(model, options).expect("decoder starts");
    feed(&mut decoder, doc).expect("token stream accepted");

    decoder.finish()
}

fn resolve_json(doc: &Json) -> ResolvedModel {
    let decoded = decode(&meta_schema(), DecodeOptions::default(), doc);
    assert!(decoded.is_clean(), "meta decode issues: {}", decoded.diagnostics);

    match resolve(&decoded.root.unwrap(), Services::default()) {
        Ok(model) => model,
        Err(diags) => panic!("resolution issues:\n{diags}"),
    }
}

fn shop_meta() -> Json {
    json!({
        "name": "demo",
        "package": "shop",
        "version": { "semantic": "1.0.0" },
        "root": { "package": "shop", "name": "order" },
        "packages": [{
            "name": "shop",
            "enumerations": [{
                "name": "status",
                "values": [
                    { "name": "open", "number": 0 },
                    { "name": "shipped", "number": 1 }
                ]
            }],
            "entities": [{
                "name": "order",
                "fields": [
                    { "name": "id", "number": 1, "type": "nat32", "is_key": true },
                    {
                        "name": "status", "number": 2, "type": "enumeration",
                        "enumeration": { "package": "shop", "name": "status" }
                    },
                    {
                        "name": "lines", "number": 3, "type": "composition",
                        "multiplicity": "set",
                        "composition": { "package": "shop", "name": "line" }
                    }
                ]
            }, {
                "name": "line",
                "fields": [
                    { "name": "sku", "number": 1, "type": "text", "is_key": true },
                    { "name": "qty", "number": 2, "type": "nat32" }
                ]
            }]
        }]
    })
}

fn scalar<'a>(entity: &'a Entity, name: &str) -> &'a Scalar {
    entity
        .field(name)
        .and_then(Field::value)
        .and_then(Value::as_scalar)
        .expect("scalar field")
}

#[test]
fn meta_documents_travel_the_ordinary_pipeline() {
    let model = resolve_json(&shop_meta());

    assert_eq!(model.root(), "/shop/order");
    let order = model.entity("/shop/order").unwrap();
    assert_eq!(order.keys, vec!["id"]);
    assert_eq!(
        order.field("lines").unwrap().target.as_deref(),
        Some("/shop/line")
    );
    assert_eq!(
        model.entity("/shop/line").unwrap().back_refs,
        vec!["/shop/order/lines"]
    );
}

#[test]
fn data_decodes_against_a_resolved_meta_model() {
    let model = resolve_json(&shop_meta());

    let decoded = decode(
        &model,
        DecodeOptions::default(),
        &json!({
            "id": 5,
            "status": "open",
            "lines": [
                { "sku": "a1", "qty": 2 },
                { "sku": "b2", "qty": 1 }
            ]
        }),
    );
    assert!(decoded.is_clean(), "decode issues: {}", decoded.diagnostics);

    let order = decoded.root.unwrap();
    assert_eq!(scalar(&order, "id"), &Scalar::Nat32(5));

    let status = order.field("status").unwrap().value().unwrap();
    assert_eq!(status.as_enum().unwrap().ordinal, 0);

    let lines = order.field("lines").unwrap().as_set().unwrap();
    assert_eq!(lines.len(), 2);

    let key = KeyTuple::from_scalars(vec![Scalar::Text("a1".to_string())]);
    let line = lines.get(&key).unwrap().as_entity().unwrap();
    assert_eq!(scalar(line, "qty"), &Scalar::Nat32(2));
}

#[test]
fn duplicate_elements_surface_once_under_lenient_policy() {
    let model = resolve_json(&shop_meta());

    let decoded = decode(
        &model,
        DecodeOptions::lenient(),
        &json!({
            "id": 5,
            "lines": [
                { "sku": "a1", "qty": 2 },
                { "sku": "a1", "qty": 9 }
            ]
        }),
    );

    let order = decoded.root.unwrap();
    assert_eq!(order.field("lines").unwrap().as_set().unwrap().len(), 1);
    assert_eq!(decoded.diagnostics.len(), 1);
    assert!(decoded.diagnostics.any_contains("duplicate key tuple"));
}

#[test]
fn forward_cross_package_references_resolve_end_to_end() {
    // package "a" arrives after package "b", which references into it
    let model = resolve_json(&json!({
        "name": "forward",
        "package": "b",
        "version": { "semantic": "1.0.0" },
        "root": { "package": "b", "name": "holder" },
        "packages": [{
            "name": "b",
            "entities": [{
                "name": "holder",
                "fields": [{
                    "name": "part", "number": 1, "type": "composition",
                    "is_key": true,
                    "composition": { "package": "a", "name": "part" }
                }]
            }]
        }, {
            "name": "a",
            "entities": [{
                "name": "part",
                "fields": [
                    { "name": "serial", "number": 1, "type": "nat32", "is_key": true }
                ]
            }]
        }]
    }));

    assert_eq!(
        model.entity("/b/holder").unwrap().field("part").unwrap().target.as_deref(),
        Some("/a/part")
    );
    assert_eq!(model.entity("/a/part").unwrap().back_refs, vec!["/b/holder/part"]);

    // nested keys flatten through the composition
    let decoded = decode(
        &model,
        DecodeOptions::default(),
        &json!({ "part": { "serial": 9 } }),
    );
    assert!(decoded.is_clean());

    let holder = decoded.root.unwrap();
    let tuple = KeyTuple::of(&holder, &model).unwrap();
    assert_eq!(tuple.scalars(), &vec![Scalar::Nat32(9)]);
}
