use crate::{Member, ShapeId, TimestampFormat};

/// Scalar kinds with direct wire representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
}

impl PrimitiveKind {
    /// Instruction-language leaf prefix for this kind.
    ///
    /// All integral kinds share one wire representation; width checking is a
    /// schema-validation concern and out of scope here.
    pub fn leaf_op(self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Byte | Self::Short | Self::Integer | Self::Long => "int",
            Self::Float | Self::Double => "float",
            Self::String => "str",
        }
    }
}

/// One declared value of an enum shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Variant symbol in the generated type (pre-sanitization).
    pub name: String,
    /// Raw wire value.
    pub value: String,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Closed variant hierarchy of schema shapes.
///
/// The generator matches exhaustively on this enum; adding a kind without
/// teaching every dispatch site about it is a compile error, never a silent
/// fall-through.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Primitive(PrimitiveKind),
    Timestamp {
        /// Shape-level format override. Member-level traits take precedence.
        format: Option<TimestampFormat>,
    },
    Blob {
        /// Streaming blobs are bound upstream and never pass through the
        /// inline leaf path.
        streaming: bool,
    },
    Enum {
        values: Vec<EnumValue>,
    },
    Struct {
        members: Vec<Member>,
    },
    Union {
        members: Vec<Member>,
    },
    List {
        element: ShapeId,
        sparse: bool,
    },
    Set {
        element: ShapeId,
    },
    Map {
        key: ShapeId,
        value: ShapeId,
        sparse: bool,
    },
    /// Open structural pass-through; carried as-is on both sides.
    Document,
}

impl ShapeKind {
    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Timestamp { .. } => "timestamp",
            Self::Blob { .. } => "blob",
            Self::Enum { .. } => "enum",
            Self::Struct { .. } => "structure",
            Self::Union { .. } => "union",
            Self::List { .. } => "list",
            Self::Set { .. } => "set",
            Self::Map { .. } => "map",
            Self::Document => "document",
        }
    }

    /// Members of a struct or union shape, if any.
    pub fn members(&self) -> Option<&[Member]> {
        match self {
            Self::Struct { members } | Self::Union { members } => Some(members),
            _ => None,
        }
    }
}

/// A named schema node. Content is fixed once the graph is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeNode {
    pub name: String,
    pub kind: ShapeKind,
}
