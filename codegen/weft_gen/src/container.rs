//! Container recursion engine.
//!
//! Lists, sets, and maps open a container scope tagged by the member's
//! descriptor at depth 0 or a synthetic per-level descriptor below, then
//! recurse through the dispatcher for the element/value shape one level
//! deeper, with the loop variable as the new accessor. Decode allocates one
//! fresh accumulator per call and applies the container's sparsity policy;
//! the list-element and map-entry null paths are deliberately separate code
//! paths with their own semantics (an absent dense list element is dropped
//! from the sequence, an absent dense map value drops the whole entry).

use weft_diag::{CodegenError, Result};
use weft_schema::{PrimitiveKind, ShapeId, ShapeKind};

use crate::descriptor::Descriptor;
use crate::dispatch::Generator;
use crate::frame::{NestingFrame, Role};
use crate::policy::SparsityPolicy;
use crate::Mode;

impl Generator<'_> {
    /// Scope tag for a container at this position: the member descriptor at
    /// depth 0, a synthetic per-level descriptor anywhere deeper.
    fn scope_tag(
        descriptor: Option<&Descriptor>,
        role: Role,
        frame: &NestingFrame,
    ) -> String {
        match descriptor {
            Some(d) if frame.depth() == 0 => d.wire_name.clone(),
            _ => Descriptor::synthetic(role, frame.depth() + 1).wire_name,
        }
    }

    pub(crate) fn emit_list(
        &mut self,
        element: ShapeId,
        policy: SparsityPolicy,
        descriptor: Option<&Descriptor>,
        mode: Mode,
        frame: &NestingFrame,
    ) -> Result<()> {
        let tag = Self::scope_tag(descriptor, Role::Collection, frame);
        match mode {
            Mode::Encode => self.emit_list_encode(element, policy, &tag, frame),
            Mode::Decode => self.emit_list_decode(element, policy, &tag, frame),
        }
    }

    fn emit_list_encode(
        &mut self,
        element: ShapeId,
        policy: SparsityPolicy,
        tag: &str,
        frame: &NestingFrame,
    ) -> Result<()> {
        let child = frame.child(Role::Element);
        self.sink.open_block(&format!("arr.put \"{tag}\":"));
        self.sink.open_block(&format!(
            "for {} in {}:",
            child.accessor(),
            frame.accessor()
        ));
        self.sink.open_block(&format!(
            "elem {} {}:",
            policy.token(),
            child.accessor()
        ));
        self.dispatch(element, None, None, Mode::Encode, &child)?;
        self.sink.close_block();
        self.sink.close_block();
        self.sink.close_block();
        Ok(())
    }

    fn emit_list_decode(
        &mut self,
        element: ShapeId,
        policy: SparsityPolicy,
        tag: &str,
        frame: &NestingFrame,
    ) -> Result<()> {
        let child = frame.child(Role::Element);
        self.sink.open_block(&format!(
            "arr.take {} \"{tag}\":",
            frame.accumulator()
        ));
        // Null element: sparse inserts a placeholder, dense skips the
        // position and keeps accumulating.
        self.sink.open_block(&format!("each {}:", policy.token()));
        self.dispatch(element, None, None, Mode::Decode, &child)?;
        self.sink.close_block();
        self.sink.close_block();
        Ok(())
    }

    pub(crate) fn emit_map(
        &mut self,
        key: ShapeId,
        value: ShapeId,
        policy: SparsityPolicy,
        descriptor: Option<&Descriptor>,
        mode: Mode,
        frame: &NestingFrame,
    ) -> Result<()> {
        self.check_map_key(key)?;
        let tag = Self::scope_tag(descriptor, Role::Map, frame);
        match mode {
            Mode::Encode => self.emit_map_encode(value, policy, &tag, frame),
            Mode::Decode => self.emit_map_decode(value, policy, &tag, frame),
        }
    }

    /// Map keys must carry a string wire form.
    fn check_map_key(&self, key: ShapeId) -> Result<()> {
        let node = self.node(key)?;
        match &node.kind {
            ShapeKind::Primitive(PrimitiveKind::String) | ShapeKind::Enum { .. } => Ok(()),
            other => Err(CodegenError::Unsupported {
                shape: self.shape_name.clone(),
                detail: format!("map key of kind `{}` has no string wire form", other.kind_name()),
            }),
        }
    }

    fn emit_map_encode(
        &mut self,
        value: ShapeId,
        policy: SparsityPolicy,
        tag: &str,
        frame: &NestingFrame,
    ) -> Result<()> {
        let key_child = frame.child(Role::Key);
        let value_child = frame.child(Role::Value);
        self.sink.open_block(&format!("map.put \"{tag}\":"));
        self.sink.open_block(&format!(
            "for {} {} in {}:",
            key_child.accessor(),
            value_child.accessor(),
            frame.accessor()
        ));
        self.sink.open_block(&format!(
            "entry {} {} {}:",
            policy.token(),
            key_child.accessor(),
            value_child.accessor()
        ));
        self.dispatch(value, None, None, Mode::Encode, &value_child)?;
        self.sink.close_block();
        self.sink.close_block();
        self.sink.close_block();
        Ok(())
    }

    fn emit_map_decode(
        &mut self,
        value: ShapeId,
        policy: SparsityPolicy,
        tag: &str,
        frame: &NestingFrame,
    ) -> Result<()> {
        let value_child = frame.child(Role::Value);
        self.sink.open_block(&format!(
            "map.take {} \"{tag}\":",
            frame.accumulator()
        ));
        // Null value: sparse keeps the key with a null placeholder, dense
        // drops the entire entry and continues with the next one.
        self.sink.open_block(&format!("each {}:", policy.token()));
        self.dispatch(value, None, None, Mode::Decode, &value_child)?;
        self.sink.close_block();
        self.sink.close_block();
        Ok(())
    }
}
