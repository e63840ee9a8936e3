use crate::{ShapeId, TimestampFormat};

/// Binding of a name within a parent struct or union to a target shape,
/// together with the traits the codec generator reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub target: ShapeId,
    /// Required members still get a presence guard in the generated encode
    /// procedure; requiredness enforcement is schema validation, out of
    /// scope for generation.
    pub required: bool,
    /// Custom wire name. Defaults to the member name.
    pub wire_name: Option<String>,
    /// Member-level timestamp format, highest precedence in resolution.
    pub timestamp_format: Option<TimestampFormat>,
    /// Absent values are filled from an external token generator at encode
    /// time instead of being omitted.
    pub idempotency_token: bool,
    /// Marked in the emitted procedure header; redaction is a runtime
    /// concern.
    pub sensitive: bool,
    pub media_type: Option<String>,
}

impl Member {
    pub fn new(name: impl Into<String>, target: ShapeId) -> Self {
        Self {
            name: name.into(),
            target,
            required: false,
            wire_name: None,
            timestamp_format: None,
            idempotency_token: false,
            sensitive: false,
            media_type: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = Some(wire_name.into());
        self
    }

    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = Some(format);
        self
    }

    pub fn idempotency_token(mut self) -> Self {
        self.idempotency_token = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}
