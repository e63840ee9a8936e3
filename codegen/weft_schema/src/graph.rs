use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{PrimitiveKind, ShapeId, ShapeKind, ShapeNode};

/// Structural errors surfaced when a builder is finished.
///
/// These are builder misuse, not generation errors; the generator only ever
/// sees a well-formed [`SchemaGraph`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("shape `{0}` was declared but never defined")]
    Undefined(String),
    #[error("shape name `{0}` is declared twice")]
    DuplicateName(String),
    #[error("{shape} references {target}, which is not in the graph")]
    DanglingReference { shape: ShapeId, target: ShapeId },
}

/// Immutable, fully-resolved schema graph.
///
/// A flat arena of [`ShapeNode`]s indexed by [`ShapeId`], plus a name
/// lookup. Never mutated after [`GraphBuilder::finish`].
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    shapes: Vec<ShapeNode>,
    by_name: FxHashMap<String, ShapeId>,
}

impl SchemaGraph {
    /// Look up a shape node by id.
    pub fn shape(&self, id: ShapeId) -> Option<&ShapeNode> {
        self.shapes.get(id.index())
    }

    /// Resolve a shape name to its id.
    pub fn lookup(&self, name: &str) -> Option<ShapeId> {
        self.by_name.get(name).copied()
    }

    /// Iterate all shapes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &ShapeNode)> {
        self.shapes
            .iter()
            .enumerate()
            .map(|(i, node)| (ShapeId::from_index(i), node))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Builder for [`SchemaGraph`].
///
/// Supports forward and self references through declare-then-define:
/// `declare` reserves an id, `define` fills in the kind later. The
/// convenience adders declare and define in one step.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    names: Vec<String>,
    kinds: Vec<Option<ShapeKind>>,
    by_name: FxHashMap<String, ShapeId>,
    duplicate: Option<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id for `name` without defining its kind yet.
    pub fn declare(&mut self, name: impl Into<String>) -> ShapeId {
        let name = name.into();
        if self.by_name.contains_key(&name) && self.duplicate.is_none() {
            self.duplicate = Some(name.clone());
        }
        let id = ShapeId::from_index(self.names.len());
        self.by_name.insert(name.clone(), id);
        self.names.push(name);
        self.kinds.push(None);
        id
    }

    /// Define (or redefine) the kind of a previously declared shape.
    pub fn define(&mut self, id: ShapeId, kind: ShapeKind) {
        if let Some(slot) = self.kinds.get_mut(id.index()) {
            *slot = Some(kind);
        }
    }

    /// Declare and define in one step.
    pub fn add(&mut self, name: impl Into<String>, kind: ShapeKind) -> ShapeId {
        let id = self.declare(name);
        self.define(id, kind);
        id
    }

    /// Add a primitive shape named after its kind.
    pub fn primitive(&mut self, kind: PrimitiveKind) -> ShapeId {
        let name = format!("weft.{kind:?}");
        if let Some(id) = self.by_name.get(&name) {
            return *id;
        }
        self.add(name, ShapeKind::Primitive(kind))
    }

    /// Seal the graph. Fails on declared-but-undefined shapes, duplicate
    /// names, or container/member references outside the arena.
    pub fn finish(self) -> Result<SchemaGraph, GraphError> {
        if let Some(name) = self.duplicate {
            return Err(GraphError::DuplicateName(name));
        }
        let mut shapes = Vec::with_capacity(self.kinds.len());
        for (name, kind) in self.names.into_iter().zip(self.kinds) {
            let Some(kind) = kind else {
                return Err(GraphError::Undefined(name));
            };
            shapes.push(ShapeNode { name, kind });
        }

        let graph = SchemaGraph {
            shapes,
            by_name: self.by_name,
        };
        graph.check_references()?;
        Ok(graph)
    }
}

impl SchemaGraph {
    fn check_references(&self) -> Result<(), GraphError> {
        let in_range = |id: ShapeId| id.index() < self.shapes.len();
        for (id, node) in self.iter() {
            let targets: Vec<ShapeId> = match &node.kind {
                ShapeKind::List { element, .. } | ShapeKind::Set { element } => vec![*element],
                ShapeKind::Map { key, value, .. } => vec![*key, *value],
                ShapeKind::Struct { members } | ShapeKind::Union { members } => {
                    members.iter().map(|m| m.target).collect()
                }
                ShapeKind::Primitive(_)
                | ShapeKind::Timestamp { .. }
                | ShapeKind::Blob { .. }
                | ShapeKind::Enum { .. }
                | ShapeKind::Document => Vec::new(),
            };
            if let Some(target) = targets.into_iter().find(|t| !in_range(*t)) {
                return Err(GraphError::DanglingReference { shape: id, target });
            }
        }
        Ok(())
    }
}
