//! Weft schema IR - immutable schema graph types
//!
//! This crate contains the data model the codec generator walks:
//! - `ShapeId` for stable shape identity
//! - `ShapeKind` as a closed variant hierarchy (exhaustive matching enforced
//!   by the compiler, so an unhandled new kind fails to build)
//! - `Member` bindings with their wire-relevant traits
//! - `SchemaGraph`, a flat arena of shapes fixed once building completes
//!
//! # Design Philosophy
//!
//! - **Flatten everything**: shapes reference each other through `ShapeId`
//!   indices into one arena, never through boxed recursion. This is what
//!   makes self-referential schemas representable without cycles in the
//!   ownership graph.
//! - **Immutable after build**: `GraphBuilder` is the only writer; the graph
//!   handed to the generator is read-only.

mod graph;
mod member;
mod shape;
mod shape_id;
mod timestamp;

pub use graph::{GraphBuilder, GraphError, SchemaGraph};
pub use member::Member;
pub use shape::{EnumValue, PrimitiveKind, ShapeKind, ShapeNode};
pub use shape_id::ShapeId;
pub use timestamp::TimestampFormat;

#[cfg(test)]
mod tests;
