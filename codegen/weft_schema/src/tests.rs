#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use crate::{
    GraphBuilder, GraphError, Member, PrimitiveKind, ShapeKind, TimestampFormat,
};

#[test]
fn build_simple_struct() {
    let mut builder = GraphBuilder::new();
    let string = builder.primitive(PrimitiveKind::String);
    let order = builder.add(
        "Order",
        ShapeKind::Struct {
            members: vec![Member::new("id", string).required()],
        },
    );

    let graph = match builder.finish() {
        Ok(graph) => graph,
        Err(err) => panic!("unexpected build error: {err}"),
    };
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.lookup("Order"), Some(order));
    let node = graph.shape(order).unwrap_or_else(|| panic!("missing shape"));
    assert_eq!(node.name, "Order");
    assert_eq!(node.kind.members().map(<[Member]>::len), Some(1));
}

#[test]
fn primitive_shapes_are_interned() {
    let mut builder = GraphBuilder::new();
    let a = builder.primitive(PrimitiveKind::Integer);
    let b = builder.primitive(PrimitiveKind::Integer);
    assert_eq!(a, b);
}

#[test]
fn self_reference_via_declare_define() {
    let mut builder = GraphBuilder::new();
    let node = builder.declare("Node");
    builder.define(
        node,
        ShapeKind::Struct {
            members: vec![Member::new("next", node)],
        },
    );
    assert!(builder.finish().is_ok());
}

#[test]
fn undefined_shape_is_rejected() {
    let mut builder = GraphBuilder::new();
    builder.declare("Ghost");
    assert_eq!(
        builder.finish().unwrap_err(),
        GraphError::Undefined("Ghost".into())
    );
}

#[test]
fn duplicate_name_is_rejected() {
    let mut builder = GraphBuilder::new();
    builder.add("A", ShapeKind::Document);
    builder.add("A", ShapeKind::Document);
    assert_eq!(
        builder.finish().unwrap_err(),
        GraphError::DuplicateName("A".into())
    );
}

#[test]
fn timestamp_format_tokens_round_trip() {
    for format in [
        TimestampFormat::EpochSeconds,
        TimestampFormat::DateTime,
        TimestampFormat::HttpDate,
    ] {
        assert_eq!(TimestampFormat::from_token(format.token()), Some(format));
    }
    assert_eq!(TimestampFormat::from_token("unknown"), None);
}

#[test]
fn member_trait_builders() {
    let mut builder = GraphBuilder::new();
    let ts = builder.add("When", ShapeKind::Timestamp { format: None });
    let member = Member::new("placedAt", ts)
        .wire_name("placed_at")
        .timestamp_format(TimestampFormat::HttpDate)
        .sensitive();
    assert_eq!(member.wire_name.as_deref(), Some("placed_at"));
    assert_eq!(member.timestamp_format, Some(TimestampFormat::HttpDate));
    assert!(member.sensitive);
    assert!(!member.idempotency_token);
}
