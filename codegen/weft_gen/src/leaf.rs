//! Primitive leaf codec resolution.
//!
//! Maps each scalar position to its wire instruction and value transform:
//! numerics and booleans directly, blobs through base64, timestamps through
//! the format-precedence chain, enums through raw-value extraction on
//! encode and a value-to-variant table with an unrecognized catch-all on
//! decode.

use weft_diag::{CodegenError, Result};
use weft_schema::{EnumValue, Member, PrimitiveKind, TimestampFormat};

use crate::frame::NestingFrame;
use crate::policy::resolve_timestamp_format;
use crate::{context::WireLocation, dispatch::Generator, Mode};

impl Generator<'_> {
    pub(crate) fn emit_primitive(
        &mut self,
        kind: PrimitiveKind,
        mode: Mode,
        frame: &NestingFrame,
    ) {
        let op = kind.leaf_op();
        match mode {
            Mode::Encode => self
                .sink
                .write_line(&format!("{op}.put {}", frame.accessor())),
            Mode::Decode => self.sink.write_line(&format!("{op}.take")),
        }
    }

    pub(crate) fn emit_blob(&mut self, mode: Mode, frame: &NestingFrame) {
        // base64 on the way out, base64 on the way in; streaming blobs never
        // reach this path (the dispatcher rejects them earlier).
        match mode {
            Mode::Encode => self
                .sink
                .write_line(&format!("blob.put {}", frame.accessor())),
            Mode::Decode => self.sink.write_line("blob.take"),
        }
    }

    pub(crate) fn emit_document(&mut self, mode: Mode, frame: &NestingFrame) {
        // Structural pass-through; the document travels as-is.
        match mode {
            Mode::Encode => self
                .sink
                .write_line(&format!("doc.put {}", frame.accessor())),
            Mode::Decode => self.sink.write_line("doc.take"),
        }
    }

    pub(crate) fn emit_timestamp(
        &mut self,
        shape_format: Option<TimestampFormat>,
        binding: Option<&Member>,
        mode: Mode,
        frame: &NestingFrame,
    ) {
        // Nested timestamp positions have no member binding and are always
        // body-located; only depth-0 members can be header/query bound.
        let location = binding.map_or(WireLocation::Body, |member| {
            self.ctx
                .bindings
                .member_location(&self.shape_name, &member.name)
        });
        let format = resolve_timestamp_format(
            binding,
            shape_format,
            location,
            self.ctx.bindings.default_timestamp_format(),
        );
        match mode {
            Mode::Encode => self.sink.write_line(&format!(
                "time.put {} {}",
                frame.accessor(),
                format.token()
            )),
            Mode::Decode => self
                .sink
                .write_line(&format!("time.take {}", format.token())),
        }
    }

    pub(crate) fn emit_enum(
        &mut self,
        shape_name: &str,
        values: &[EnumValue],
        mode: Mode,
        frame: &NestingFrame,
    ) -> Result<()> {
        match mode {
            // Encode extracts the underlying raw value; no table needed.
            Mode::Encode => {
                self.sink
                    .write_line(&format!("enum.put {}", frame.accessor()));
                Ok(())
            }
            // Decode reconstructs via value → variant lookup. Raw values
            // missing from the table fall through to the unrecognized
            // catch-all at runtime, which preserves the raw string.
            Mode::Decode => {
                let mut seen = rustc_hash::FxHashSet::default();
                self.sink.open_block("enum.take:");
                for value in values {
                    let ident = self.ctx.identifiers.sanitize(&value.name).ok_or_else(|| {
                        CodegenError::InvalidIdentifier {
                            shape: shape_name.to_owned(),
                            name: value.name.clone(),
                        }
                    })?;
                    if !seen.insert(ident.clone()) {
                        return Err(CodegenError::DuplicateIdentifier {
                            shape: shape_name.to_owned(),
                            ident,
                        });
                    }
                    self.sink
                        .write_line(&format!("variant \"{}\" {ident}", value.value));
                }
                self.sink.close_block();
                Ok(())
            }
        }
    }
}
