//! Struct/union procedure bodies and delegation.
//!
//! A nested struct or union position never inlines member logic; it emits a
//! call to that shape's own separately generated procedure. Generation is
//! therefore a call graph keyed by shape id, and every cycle edge in the
//! schema is a call edge, which bounds the emitted code independent of
//! schema depth.

use weft_diag::{CodegenError, Result};
use weft_schema::Member;

use crate::descriptor::DescriptorTable;
use crate::dispatch::Generator;
use crate::frame::NestingFrame;
use crate::Mode;

impl Generator<'_> {
    /// Emit the call-site form for a nested struct/union target.
    pub(crate) fn emit_delegate_call(
        &mut self,
        target_name: &str,
        mode: Mode,
        frame: &NestingFrame,
    ) -> Result<()> {
        let symbol = self.ctx.identifiers.sanitize(target_name).ok_or_else(|| {
            CodegenError::InvalidIdentifier {
                shape: target_name.to_owned(),
                name: target_name.to_owned(),
            }
        })?;
        match mode {
            Mode::Encode => self.sink.write_line(&format!(
                "call encode_{symbol} {}",
                frame.accessor()
            )),
            Mode::Decode => self.sink.write_line(&format!("call decode_{symbol}")),
        }
        Ok(())
    }

    /// Emit the member-by-member body of this generator's own struct shape.
    pub(crate) fn emit_struct_body(&mut self, members: &[Member], mode: Mode) -> Result<()> {
        let table = DescriptorTable::allocate(&self.shape_name, members, self.ctx)?;
        match mode {
            Mode::Encode => {
                self.sink.open_block("obj.put:");
                let root = NestingFrame::root("input");
                for (descriptor, member_index) in table.iter() {
                    let member = &members[member_index];
                    let var = format!("f{}", descriptor.index + 1);
                    self.sink
                        .write_line(&format!("let {var} = input.{}", descriptor.member));
                    if member.idempotency_token {
                        // Absent tokens are synthesized, never omitted.
                        self.sink.write_line(&format!("token.default {var}"));
                    }
                    self.sink.open_block(&format!("ifset {var}:"));
                    self.sink
                        .open_block(&format!("field \"{}\":", descriptor.wire_name));
                    let frame = root.rebind(var);
                    self.dispatch(member.target, Some(member), Some(descriptor), Mode::Encode, &frame)?;
                    self.sink.close_block();
                    self.sink.close_block();
                }
                self.sink.close_block();
            }
            Mode::Decode => {
                self.sink
                    .open_block(&format!("obj.take {}:", self.proc_symbol));
                for (descriptor, member_index) in table.iter() {
                    let member = &members[member_index];
                    self.sink.open_block(&format!(
                        "field \"{}\" {}:",
                        descriptor.wire_name, descriptor.member
                    ));
                    let frame = NestingFrame::root("wire");
                    self.dispatch(member.target, Some(member), Some(descriptor), Mode::Decode, &frame)?;
                    self.sink.close_block();
                }
                // Unknown wire fields take this branch at runtime and are
                // skipped, per the forward-compatibility contract.
                self.sink.write_line("default skip");
                self.sink.close_block();
            }
        }
        Ok(())
    }

    /// Emit the variant-by-variant body of this generator's own union shape.
    pub(crate) fn emit_union_body(&mut self, members: &[Member], mode: Mode) -> Result<()> {
        let table = DescriptorTable::allocate(&self.shape_name, members, self.ctx)?;
        match mode {
            Mode::Encode => {
                self.sink.open_block("union.put input:");
                for (descriptor, member_index) in table.iter() {
                    let member = &members[member_index];
                    let payload = format!("p{}", descriptor.index + 1);
                    self.sink.open_block(&format!(
                        "case {} \"{}\" {payload}:",
                        descriptor.member, descriptor.wire_name
                    ));
                    let frame = NestingFrame::root(payload.as_str());
                    self.dispatch(member.target, Some(member), Some(descriptor), Mode::Encode, &frame)?;
                    self.sink.close_block();
                }
                self.sink.close_block();
            }
            Mode::Decode => {
                self.sink
                    .open_block(&format!("union.take {}:", self.proc_symbol));
                for (descriptor, member_index) in table.iter() {
                    let member = &members[member_index];
                    self.sink.open_block(&format!(
                        "case \"{}\" {}:",
                        descriptor.wire_name, descriptor.member
                    ));
                    let frame = NestingFrame::root("wire");
                    self.dispatch(member.target, Some(member), Some(descriptor), Mode::Decode, &frame)?;
                    self.sink.close_block();
                }
                self.sink.close_block();
            }
        }
        Ok(())
    }
}
