use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::WireValue;

/// Runtime value model the codec programs operate on.
///
/// `Null` doubles as "absent": reading a missing struct field yields
/// `Null`, and encode-side presence guards (`ifset`) treat the two
/// identically.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Second precision; all three wire forms carry whole seconds.
    Timestamp(DateTime<Utc>),
    /// `variant` is `None` for raw values not in the schema's table — the
    /// unrecognized catch-all. The raw string is preserved either way, so
    /// unrecognized values survive a round trip.
    Enum {
        variant: Option<String>,
        raw: String,
    },
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Struct {
        shape: String,
        fields: IndexMap<String, Value>,
    },
    Union {
        shape: String,
        variant: String,
        value: Box<Value>,
    },
    /// Open content carried structurally, without interpretation.
    Document(WireValue),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Timestamp from whole seconds since the Unix epoch.
    pub fn timestamp_epoch(secs: i64) -> Self {
        Self::Timestamp(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }

    /// A recognized enum value.
    pub fn enum_variant(variant: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Enum {
            variant: Some(variant.into()),
            raw: raw.into(),
        }
    }

    /// A raw enum value outside the schema's table.
    pub fn enum_unrecognized(raw: impl Into<String>) -> Self {
        Self::Enum {
            variant: None,
            raw: raw.into(),
        }
    }

    pub fn struct_of(
        shape: impl Into<String>,
        fields: impl IntoIterator<Item = (&'static str, Value)>,
    ) -> Self {
        Self::Struct {
            shape: shape.into(),
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.to_owned(), value))
                .collect(),
        }
    }

    pub fn union_of(
        shape: impl Into<String>,
        variant: impl Into<String>,
        value: Value,
    ) -> Self {
        Self::Union {
            shape: shape.into(),
            variant: variant.into(),
            value: Box::new(value),
        }
    }

    pub fn map_of(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short kind name for mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Timestamp(_) => "timestamp",
            Self::Enum { .. } => "enum",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Struct { .. } => "structure",
            Self::Union { .. } => "union",
            Self::Document(_) => "document",
        }
    }
}
