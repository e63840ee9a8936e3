//! Codec synthesis engine.
//!
//! Walks an immutable [`SchemaGraph`] and emits, for every requested shape,
//! a pair of procedures in the weft instruction language: one that encodes
//! values of that shape to the structured wire representation and one that
//! decodes them back. The walk is a pure, synchronous recursive descent:
//!
//! - scalar leaves resolve to `put`/`take` instructions ([`leaf`]),
//! - list/set/map shapes recurse one nesting level deeper with a fresh
//!   by-value [`NestingFrame`] ([`container`]),
//! - nested structs and unions bottom out at a `call` to their own
//!   procedure instead of inlining, which is what makes self-referential
//!   schemas terminate ([`delegate`]).
//!
//! Everything the engine reads is borrowed immutably; the only output is
//! instruction text written to the caller's [`Sink`]. Independent shapes can
//! therefore be generated in parallel by callers, each with its own sink.

mod container;
mod context;
mod delegate;
mod descriptor;
mod dispatch;
mod frame;
mod leaf;
mod policy;

pub use context::{
    BindingResolver, DefaultIdentifiers, GenContext, IdentifierPolicy, StaticBindings,
    WireLocation,
};
pub use descriptor::Descriptor;
pub use frame::{NestingFrame, Role};
pub use policy::SparsityPolicy;

use weft_diag::Result;
use weft_emit::Sink;
use weft_schema::{SchemaGraph, ShapeId};

use dispatch::Generator;

/// Which of the two procedures to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

impl Mode {
    pub(crate) fn prefix(self) -> &'static str {
        match self {
            Self::Encode => "encode",
            Self::Decode => "decode",
        }
    }
}

/// Generate the encode procedure followed by the decode procedure for one
/// shape.
///
/// The two procedures share one descriptor allocation, so their dispatch
/// tags always agree.
pub fn generate_codec_pair(
    graph: &SchemaGraph,
    ctx: &GenContext<'_>,
    shape: ShapeId,
    sink: &mut dyn Sink,
) -> Result<()> {
    generate_shape_codec(graph, ctx, shape, Mode::Encode, sink)?;
    generate_shape_codec(graph, ctx, shape, Mode::Decode, sink)
}

/// Generate one procedure (encode or decode) for one shape.
#[tracing::instrument(level = "debug", skip(graph, ctx, sink))]
pub fn generate_shape_codec(
    graph: &SchemaGraph,
    ctx: &GenContext<'_>,
    shape: ShapeId,
    mode: Mode,
    sink: &mut dyn Sink,
) -> Result<()> {
    let mut generator = Generator::new(graph, ctx, shape, sink)?;
    generator.run(mode)?;
    tracing::debug!(%shape, ?mode, "generated shape codec");
    Ok(())
}
