//! Generation-time error reporting.
//!
//! Every error here is fatal and unrecoverable for the shape being
//! generated: generation over an immutable schema is deterministic, so a
//! failed shape fails identically on retry and retry is never attempted.
//! Each variant carries the shape (and member, where one exists) for
//! localization.
//!
//! Runtime leniency — skipping unknown wire fields during decode — is a
//! property of the *generated* procedures, not of the generator, and has no
//! representation here.

use thiserror::Error;
use weft_schema::ShapeId;

/// Fatal codec-generation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("{0} is not defined in the schema graph")]
    UnknownShape(ShapeId),

    #[error("shape `{shape}`: {detail}")]
    Unsupported { shape: String, detail: String },

    #[error("shape `{shape}`: member `{member}` collides with reserved field `{member}`")]
    ReservedMember { shape: String, member: String },

    #[error("shape `{shape}`: name `{name}` is not a valid identifier after sanitization")]
    InvalidIdentifier { shape: String, name: String },

    #[error("shape `{shape}`: member `{member}` wire name {wire_name:?} contains quote or control characters")]
    InvalidWireName {
        shape: String,
        member: String,
        wire_name: String,
    },

    #[error("shape `{shape}`: members `{first}` and `{second}` share wire name `{wire_name}`")]
    DuplicateDescriptor {
        shape: String,
        first: String,
        second: String,
        wire_name: String,
    },

    #[error("shape `{shape}`: synthesized identifier `{ident}` collides with an existing one")]
    DuplicateIdentifier { shape: String, ident: String },
}

pub type Result<T> = std::result::Result<T, CodegenError>;
