//! Shape classifier and dispatcher.
//!
//! Classifies a shape at its current position and routes it to the leaf
//! resolver, the container recursion engine, or struct/union delegation.
//! Every variant of [`ShapeKind`] is matched explicitly; an unsupported
//! position (a streaming blob in the inline path) is a fatal error, never a
//! silent skip.

use weft_diag::{CodegenError, Result};
use weft_emit::Sink;
use weft_schema::{Member, SchemaGraph, ShapeId, ShapeKind, ShapeNode};

use crate::context::GenContext;
use crate::descriptor::Descriptor;
use crate::frame::NestingFrame;
use crate::policy::SparsityPolicy;
use crate::Mode;

/// State for one shape's generation pass.
///
/// Borrows the immutable schema graph and collaborator context; owns
/// nothing but the cached procedure symbol. All output goes through the
/// caller's sink.
pub(crate) struct Generator<'a> {
    pub(crate) graph: &'a SchemaGraph,
    pub(crate) ctx: &'a GenContext<'a>,
    pub(crate) sink: &'a mut dyn Sink,
    pub(crate) shape: ShapeId,
    /// Raw shape name, for diagnostics and binding lookups.
    pub(crate) shape_name: String,
    /// Sanitized shape name, for the procedure symbol.
    pub(crate) proc_symbol: String,
}

impl<'a> Generator<'a> {
    pub(crate) fn new(
        graph: &'a SchemaGraph,
        ctx: &'a GenContext<'a>,
        shape: ShapeId,
        sink: &'a mut dyn Sink,
    ) -> Result<Self> {
        let node = graph
            .shape(shape)
            .ok_or(CodegenError::UnknownShape(shape))?;
        let proc_symbol =
            ctx.identifiers
                .sanitize(&node.name)
                .ok_or_else(|| CodegenError::InvalidIdentifier {
                    shape: node.name.clone(),
                    name: node.name.clone(),
                })?;
        Ok(Self {
            graph,
            ctx,
            sink,
            shape,
            shape_name: node.name.clone(),
            proc_symbol,
        })
    }

    pub(crate) fn node(&self, id: ShapeId) -> Result<&'a ShapeNode> {
        self.graph.shape(id).ok_or(CodegenError::UnknownShape(id))
    }

    /// Emit the full procedure for this generator's shape.
    pub(crate) fn run(&mut self, mode: Mode) -> Result<()> {
        let node = self.node(self.shape)?;
        let param = match mode {
            Mode::Encode => "input",
            Mode::Decode => "wire",
        };
        self.sink.open_block(&format!(
            "proc {}_{}({param}):",
            mode.prefix(),
            self.proc_symbol
        ));

        // Sensitive members are flagged in the procedure header; redaction
        // itself is a runtime concern.
        if let Some(members) = node.kind.members() {
            for member in members.iter().filter(|m| m.sensitive) {
                self.sink.write_line(&format!("# sensitive: {}", member.name));
            }
        }

        match &node.kind {
            ShapeKind::Struct { members } => self.emit_struct_body(members, mode)?,
            ShapeKind::Union { members } => self.emit_union_body(members, mode)?,
            _ => {
                let frame = NestingFrame::root(param);
                self.dispatch(self.shape, None, None, mode, &frame)?;
            }
        }

        self.sink.close_block();
        Ok(())
    }

    /// Route one shape at one position.
    ///
    /// `binding` and `descriptor` are present for depth-0 member positions
    /// and absent for nested calls, where containers fall back to synthetic
    /// per-level descriptors.
    pub(crate) fn dispatch(
        &mut self,
        id: ShapeId,
        binding: Option<&Member>,
        descriptor: Option<&Descriptor>,
        mode: Mode,
        frame: &NestingFrame,
    ) -> Result<()> {
        let node = self.node(id)?;
        match &node.kind {
            ShapeKind::Primitive(kind) => {
                self.emit_primitive(*kind, mode, frame);
                Ok(())
            }
            ShapeKind::Timestamp { format } => {
                self.emit_timestamp(*format, binding, mode, frame);
                Ok(())
            }
            ShapeKind::Blob { streaming: true } => Err(CodegenError::Unsupported {
                shape: node.name.clone(),
                detail: "streaming blob reached the inline codec path".to_owned(),
            }),
            ShapeKind::Blob { streaming: false } => {
                self.emit_blob(mode, frame);
                Ok(())
            }
            ShapeKind::Enum { values } => self.emit_enum(&node.name, values, mode, frame),
            ShapeKind::Document => {
                self.emit_document(mode, frame);
                Ok(())
            }
            ShapeKind::List { element, sparse } => self.emit_list(
                *element,
                SparsityPolicy::from_sparse(*sparse),
                descriptor,
                mode,
                frame,
            ),
            ShapeKind::Set { element } => {
                // Sets are dense lists on the wire; uniqueness is a model
                // constraint, not a codec one.
                self.emit_list(*element, SparsityPolicy::Dense, descriptor, mode, frame)
            }
            ShapeKind::Map { key, value, sparse } => self.emit_map(
                *key,
                *value,
                SparsityPolicy::from_sparse(*sparse),
                descriptor,
                mode,
                frame,
            ),
            ShapeKind::Struct { .. } | ShapeKind::Union { .. } => {
                self.emit_delegate_call(&node.name, mode, frame)
            }
        }
    }
}
