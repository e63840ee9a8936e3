use indexmap::IndexMap;

/// Structured wire representation.
///
/// The codec programs read and write this document form; rendering it to a
/// concrete interchange syntax is outside the codec contract. Object field
/// order is preserved as written, but equality is order-insensitive
/// (`IndexMap` semantics).
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<WireValue>),
    Object(IndexMap<String, WireValue>),
}

impl WireValue {
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    pub fn object(fields: impl IntoIterator<Item = (String, WireValue)>) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    /// Short kind name for mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}
