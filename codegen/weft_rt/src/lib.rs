//! Weft codec runtime.
//!
//! The generator emits procedures in a small line-oriented instruction
//! language; this crate is the other half of the contract. It provides:
//!
//! - [`WireValue`]: the structured wire representation codecs read/write
//! - [`Value`]: the runtime value model codecs produce/consume
//! - [`Program`]: parsed form of emitted procedure text
//! - [`Codec`]: the interpreter executing encode/decode procedures,
//!   including delegated calls between shapes' procedures
//!
//! The runtime policy split from the generator matters here: generation
//! errors are fatal and live in `weft_diag`; this crate's [`RuntimeError`]
//! covers only genuine wire-shape mismatches. Unknown wire fields are not
//! an error — procedures carry a `default skip` branch and the interpreter
//! honors it.

mod errors;
mod exec;
mod program;
mod value;
mod wire;

pub use errors::RuntimeError;
pub use exec::{Codec, FixedTokens, SequenceTokens, TokenSource};
pub use program::{Node, Proc, Program};
pub use value::Value;
pub use wire::WireValue;
