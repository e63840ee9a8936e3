//! End-to-end: build a schema graph, generate codec procedures, parse them,
//! and execute encode/decode against real values.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use weft_emit::StringSink;
use weft_gen::{
    generate_codec_pair, DefaultIdentifiers, GenContext, StaticBindings, WireLocation,
};
use weft_rt::{Codec, FixedTokens, Program, RuntimeError, Value, WireValue};
use weft_schema::{
    EnumValue, GraphBuilder, Member, PrimitiveKind, SchemaGraph, ShapeKind, TimestampFormat,
};

const IDENTIFIERS: DefaultIdentifiers = DefaultIdentifiers;

/// Generate codec pairs for every struct and union in the graph into one
/// program, so delegated calls resolve.
fn program_for(graph: &SchemaGraph, bindings: &StaticBindings) -> Program {
    let ctx = GenContext::new(bindings, &IDENTIFIERS);
    let mut sink = StringSink::new();
    for (id, node) in graph.iter() {
        if matches!(node.kind, ShapeKind::Struct { .. } | ShapeKind::Union { .. }) {
            generate_codec_pair(graph, &ctx, id, &mut sink).unwrap();
        }
    }
    Program::parse(sink.as_str()).unwrap()
}

fn order_graph() -> SchemaGraph {
    let mut builder = GraphBuilder::new();
    let string = builder.primitive(PrimitiveKind::String);
    let integer = builder.primitive(PrimitiveKind::Integer);
    let placed_at = builder.add("OrderDate", ShapeKind::Timestamp { format: None });
    let item = builder.add(
        "Item",
        ShapeKind::Struct {
            members: vec![
                Member::new("sku", string).required(),
                Member::new("quantity", integer),
            ],
        },
    );
    let items = builder.add(
        "ItemList",
        ShapeKind::List {
            element: item,
            sparse: false,
        },
    );
    builder.add(
        "Order",
        ShapeKind::Struct {
            members: vec![
                Member::new("id", string).required(),
                Member::new("items", items),
                Member::new("placedAt", placed_at),
            ],
        },
    );
    builder.finish().unwrap()
}

#[test]
fn order_codec_round_trips() {
    let graph = order_graph();
    let bindings = StaticBindings::default();
    let program = program_for(&graph, &bindings);
    let tokens = FixedTokens("tok".to_owned());
    let codec = Codec::new(&program, &tokens);

    let order = Value::struct_of(
        "Order",
        [
            ("id", Value::str("42")),
            (
                "items",
                Value::List(vec![Value::struct_of(
                    "Item",
                    [("sku", Value::str("sku1")), ("quantity", Value::Int(2))],
                )]),
            ),
            ("placedAt", Value::timestamp_epoch(1000)),
        ],
    );

    let wire = codec.encode("encode_Order", &order).unwrap();
    assert_eq!(
        wire,
        WireValue::object([
            ("id".to_owned(), WireValue::str("42")),
            (
                "items".to_owned(),
                WireValue::Array(vec![WireValue::object([
                    ("quantity".to_owned(), WireValue::Int(2)),
                    ("sku".to_owned(), WireValue::str("sku1")),
                ])])
            ),
            ("placedAt".to_owned(), WireValue::Int(1000)),
        ])
    );

    let decoded = codec.decode("decode_Order", &wire).unwrap();
    assert_eq!(decoded, order);
}

#[test]
fn sparse_list_keeps_holes_dense_list_drops_them() {
    let mut builder = GraphBuilder::new();
    let integer = builder.primitive(PrimitiveKind::Integer);
    let sparse = builder.add(
        "SparseInts",
        ShapeKind::List {
            element: integer,
            sparse: true,
        },
    );
    let dense = builder.add(
        "DenseInts",
        ShapeKind::List {
            element: integer,
            sparse: false,
        },
    );
    builder.add(
        "Readings",
        ShapeKind::Struct {
            members: vec![Member::new("raw", sparse), Member::new("clean", dense)],
        },
    );
    let graph = builder.finish().unwrap();
    let bindings = StaticBindings::default();
    let program = program_for(&graph, &bindings);
    let tokens = FixedTokens("tok".to_owned());
    let codec = Codec::new(&program, &tokens);

    let holes = Value::List(vec![Value::Int(1), Value::Null, Value::Int(3)]);
    let input = Value::struct_of("Readings", [("raw", holes.clone()), ("clean", holes)]);

    let wire = codec.encode("encode_Readings", &input).unwrap();
    assert_eq!(
        wire,
        WireValue::object([
            (
                "clean".to_owned(),
                WireValue::Array(vec![WireValue::Int(1), WireValue::Int(3)])
            ),
            (
                "raw".to_owned(),
                WireValue::Array(vec![WireValue::Int(1), WireValue::Null, WireValue::Int(3)])
            ),
        ])
    );

    let decoded = codec.decode("decode_Readings", &wire).unwrap();
    assert_eq!(
        decoded,
        Value::struct_of(
            "Readings",
            [
                (
                    "raw",
                    Value::List(vec![Value::Int(1), Value::Null, Value::Int(3)])
                ),
                ("clean", Value::List(vec![Value::Int(1), Value::Int(3)])),
            ]
        )
    );
}

#[test]
fn sparse_map_keeps_null_values() {
    let mut builder = GraphBuilder::new();
    let string = builder.primitive(PrimitiveKind::String);
    let integer = builder.primitive(PrimitiveKind::Integer);
    let map = builder.add(
        "Tally",
        ShapeKind::Map {
            key: string,
            value: integer,
            sparse: true,
        },
    );
    builder.add(
        "Counts",
        ShapeKind::Struct {
            members: vec![Member::new("tally", map)],
        },
    );
    let graph = builder.finish().unwrap();
    let bindings = StaticBindings::default();
    let program = program_for(&graph, &bindings);
    let tokens = FixedTokens("tok".to_owned());
    let codec = Codec::new(&program, &tokens);

    let input = Value::struct_of(
        "Counts",
        [(
            "tally",
            Value::map_of([("a", Value::Int(1)), ("b", Value::Null)]),
        )],
    );
    let wire = codec.encode("encode_Counts", &input).unwrap();
    assert_eq!(
        wire,
        WireValue::object([(
            "tally".to_owned(),
            WireValue::object([
                ("a".to_owned(), WireValue::Int(1)),
                ("b".to_owned(), WireValue::Null),
            ])
        )])
    );

    let decoded = codec.decode("decode_Counts", &wire).unwrap();
    assert_eq!(decoded, input);
}

#[test]
fn dense_decode_drops_null_wire_positions() {
    let mut builder = GraphBuilder::new();
    let string = builder.primitive(PrimitiveKind::String);
    let integer = builder.primitive(PrimitiveKind::Integer);
    let nums = builder.add(
        "Nums",
        ShapeKind::List {
            element: integer,
            sparse: false,
        },
    );
    let tally = builder.add(
        "DenseTally",
        ShapeKind::Map {
            key: string,
            value: integer,
            sparse: false,
        },
    );
    builder.add(
        "Snapshot",
        ShapeKind::Struct {
            members: vec![Member::new("nums", nums), Member::new("tally", tally)],
        },
    );
    let graph = builder.finish().unwrap();
    let bindings = StaticBindings::default();
    let program = program_for(&graph, &bindings);
    let tokens = FixedTokens("tok".to_owned());
    let codec = Codec::new(&program, &tokens);

    // Nulls arriving on the wire: a dense list drops the position, a dense
    // map drops the whole entry.
    let wire = WireValue::object([
        (
            "nums".to_owned(),
            WireValue::Array(vec![WireValue::Int(1), WireValue::Null, WireValue::Int(3)]),
        ),
        (
            "tally".to_owned(),
            WireValue::object([
                ("a".to_owned(), WireValue::Int(1)),
                ("b".to_owned(), WireValue::Null),
            ]),
        ),
    ]);
    let decoded = codec.decode("decode_Snapshot", &wire).unwrap();
    assert_eq!(
        decoded,
        Value::struct_of(
            "Snapshot",
            [
                ("nums", Value::List(vec![Value::Int(1), Value::Int(3)])),
                ("tally", Value::map_of([("a", Value::Int(1))])),
            ]
        )
    );
}

#[test]
fn unrecognized_enum_value_survives_round_trip() {
    let mut builder = GraphBuilder::new();
    let status = builder.add(
        "Status",
        ShapeKind::Enum {
            values: vec![
                EnumValue::new("Active", "active"),
                EnumValue::new("Idle", "idle"),
            ],
        },
    );
    builder.add(
        "Task",
        ShapeKind::Struct {
            members: vec![Member::new("status", status)],
        },
    );
    let graph = builder.finish().unwrap();
    let bindings = StaticBindings::default();
    let program = program_for(&graph, &bindings);
    let tokens = FixedTokens("tok".to_owned());
    let codec = Codec::new(&program, &tokens);

    let known = Value::struct_of("Task", [("status", Value::enum_variant("Active", "active"))]);
    let wire = codec.encode("encode_Task", &known).unwrap();
    assert_eq!(
        wire,
        WireValue::object([("status".to_owned(), WireValue::str("active"))])
    );
    assert_eq!(codec.decode("decode_Task", &wire).unwrap(), known);

    // A raw value outside the schema's table keeps its string through both
    // directions instead of failing.
    let unknown = Value::struct_of("Task", [("status", Value::enum_unrecognized("archived"))]);
    let wire = codec.encode("encode_Task", &unknown).unwrap();
    assert_eq!(
        wire,
        WireValue::object([("status".to_owned(), WireValue::str("archived"))])
    );
    assert_eq!(codec.decode("decode_Task", &wire).unwrap(), unknown);
}

#[test]
fn union_round_trips_and_rejects_unknown_tags() {
    let mut builder = GraphBuilder::new();
    let string = builder.primitive(PrimitiveKind::String);
    let integer = builder.primitive(PrimitiveKind::Integer);
    builder.add(
        "Either",
        ShapeKind::Union {
            members: vec![
                Member::new("count", integer),
                Member::new("label", string),
            ],
        },
    );
    let graph = builder.finish().unwrap();
    let bindings = StaticBindings::default();
    let program = program_for(&graph, &bindings);
    let tokens = FixedTokens("tok".to_owned());
    let codec = Codec::new(&program, &tokens);

    let input = Value::union_of("Either", "count", Value::Int(7));
    let wire = codec.encode("encode_Either", &input).unwrap();
    assert_eq!(
        wire,
        WireValue::object([("count".to_owned(), WireValue::Int(7))])
    );
    assert_eq!(codec.decode("decode_Either", &wire).unwrap(), input);

    let unknown = WireValue::object([("mystery".to_owned(), WireValue::Int(1))]);
    let err = codec.decode("decode_Either", &unknown).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnknownUnionVariant {
            shape: "Either".to_owned(),
            tag: "mystery".to_owned(),
        }
    );
}

#[test]
fn header_bound_timestamp_uses_http_date_on_the_wire() {
    let mut builder = GraphBuilder::new();
    let modified = builder.add(
        "ModifiedAt",
        ShapeKind::Timestamp {
            format: Some(TimestampFormat::EpochSeconds),
        },
    );
    builder.add(
        "Asset",
        ShapeKind::Struct {
            members: vec![Member::new("modifiedAt", modified)],
        },
    );
    let graph = builder.finish().unwrap();
    // The header binding overrides the shape-level epoch-seconds trait.
    let bindings = StaticBindings::default().with_location(
        "Asset",
        "modifiedAt",
        WireLocation::Header,
    );
    let program = program_for(&graph, &bindings);
    let tokens = FixedTokens("tok".to_owned());
    let codec = Codec::new(&program, &tokens);

    let input = Value::struct_of("Asset", [("modifiedAt", Value::timestamp_epoch(1_700_000_000))]);
    let wire = codec.encode("encode_Asset", &input).unwrap();
    let WireValue::Object(fields) = &wire else {
        panic!("struct must encode as an object");
    };
    let WireValue::Str(rendered) = &fields["modifiedAt"] else {
        panic!("header-bound timestamp must encode as a string");
    };
    assert!(rendered.starts_with("Tue, 14 Nov 2023"));

    assert_eq!(codec.decode("decode_Asset", &wire).unwrap(), input);
}

#[test]
fn idempotency_token_is_filled_when_absent() {
    let mut builder = GraphBuilder::new();
    let string = builder.primitive(PrimitiveKind::String);
    builder.add(
        "Request",
        ShapeKind::Struct {
            members: vec![Member::new("clientToken", string).idempotency_token()],
        },
    );
    let graph = builder.finish().unwrap();
    let bindings = StaticBindings::default();
    let program = program_for(&graph, &bindings);
    let tokens = FixedTokens("fixed-0".to_owned());
    let codec = Codec::new(&program, &tokens);

    let wire = codec.encode("encode_Request", &Value::struct_of("Request", [])).unwrap();
    assert_eq!(
        wire,
        WireValue::object([("clientToken".to_owned(), WireValue::str("fixed-0"))])
    );

    // A caller-supplied token is never overwritten.
    let supplied = Value::struct_of("Request", [("clientToken", Value::str("mine"))]);
    let wire = codec.encode("encode_Request", &supplied).unwrap();
    assert_eq!(
        wire,
        WireValue::object([("clientToken".to_owned(), WireValue::str("mine"))])
    );
}

fn profile_graph() -> SchemaGraph {
    let mut builder = GraphBuilder::new();
    let string = builder.primitive(PrimitiveKind::String);
    let integer = builder.primitive(PrimitiveKind::Integer);
    let tags = builder.add(
        "TagList",
        ShapeKind::List {
            element: string,
            sparse: false,
        },
    );
    let scores = builder.add(
        "ScoreMap",
        ShapeKind::Map {
            key: string,
            value: integer,
            sparse: true,
        },
    );
    builder.add(
        "Profile",
        ShapeKind::Struct {
            members: vec![
                Member::new("name", string).required(),
                Member::new("tags", tags),
                Member::new("scores", scores),
            ],
        },
    );
    builder.finish().unwrap()
}

proptest! {
    #[test]
    fn profile_values_round_trip(
        name in "[a-z]{1,8}",
        tags in proptest::collection::vec("[a-z]{0,6}", 0..5),
        scores in proptest::collection::btree_map(
            "[a-z]{1,5}",
            proptest::option::of(any::<i64>()),
            0..5,
        ),
    ) {
        let graph = profile_graph();
        let bindings = StaticBindings::default();
        let program = program_for(&graph, &bindings);
        let tokens = FixedTokens("tok".to_owned());
        let codec = Codec::new(&program, &tokens);

        let input = Value::Struct {
            shape: "Profile".to_owned(),
            fields: [
                ("name".to_owned(), Value::Str(name)),
                (
                    "tags".to_owned(),
                    Value::List(tags.into_iter().map(Value::Str).collect()),
                ),
                (
                    "scores".to_owned(),
                    Value::Map(
                        scores
                            .into_iter()
                            .map(|(key, value)| {
                                (key, value.map_or(Value::Null, Value::Int))
                            })
                            .collect(),
                    ),
                ),
            ]
            .into_iter()
            .collect(),
        };

        let wire = codec.encode("encode_Profile", &input).unwrap();
        let decoded = codec.decode("decode_Profile", &wire).unwrap();
        prop_assert_eq!(decoded, input);
    }
}
