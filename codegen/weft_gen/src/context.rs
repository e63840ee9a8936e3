//! External collaborators consumed by the engine.
//!
//! Wire-location binding, ambient timestamp format, and identifier
//! sanitization all live behind narrow traits; the engine consumes them and
//! never reimplements them. The provided implementations are enough for
//! tests and for protocols without custom binding tables.

use rustc_hash::FxHashMap;
use weft_schema::TimestampFormat;

/// Where a member is bound in the wire message.
///
/// Header and query bindings force timestamps into string forms regardless
/// of the format the trait chain selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireLocation {
    Body,
    Header,
    Query,
}

/// Per-member wire location and the context default timestamp format.
pub trait BindingResolver {
    fn member_location(&self, shape: &str, member: &str) -> WireLocation;

    fn default_timestamp_format(&self) -> TimestampFormat;
}

/// Table-driven [`BindingResolver`]: everything is body-bound unless
/// registered otherwise.
#[derive(Debug)]
pub struct StaticBindings {
    default_format: TimestampFormat,
    locations: FxHashMap<(String, String), WireLocation>,
}

impl StaticBindings {
    pub fn new(default_format: TimestampFormat) -> Self {
        Self {
            default_format,
            locations: FxHashMap::default(),
        }
    }

    pub fn with_location(
        mut self,
        shape: impl Into<String>,
        member: impl Into<String>,
        location: WireLocation,
    ) -> Self {
        self.locations
            .insert((shape.into(), member.into()), location);
        self
    }
}

impl Default for StaticBindings {
    fn default() -> Self {
        Self::new(TimestampFormat::EpochSeconds)
    }
}

impl BindingResolver for StaticBindings {
    fn member_location(&self, shape: &str, member: &str) -> WireLocation {
        self.locations
            .get(&(shape.to_owned(), member.to_owned()))
            .copied()
            .unwrap_or(WireLocation::Body)
    }

    fn default_timestamp_format(&self) -> TimestampFormat {
        self.default_format
    }
}

/// Collision-free identifier supply.
///
/// `sanitize` returns `None` when nothing identifier-like survives; the
/// engine turns that into a fatal `InvalidIdentifier` error with the shape
/// attached.
pub trait IdentifierPolicy {
    fn sanitize(&self, raw: &str) -> Option<String>;

    /// Reserved fields on the shared base type; member names colliding with
    /// these are fatal.
    fn is_reserved(&self, ident: &str) -> bool;
}

/// Default sanitizer: keeps `[A-Za-z0-9_]`, maps separators to `_`, and
/// rejects names with no identifier content.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultIdentifiers;

const RESERVED: &[&str] = &["input", "wire", "proc", "let", "call"];

impl IdentifierPolicy for DefaultIdentifiers {
    fn sanitize(&self, raw: &str) -> Option<String> {
        let mut out = String::with_capacity(raw.len());
        for ch in raw.chars() {
            match ch {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => out.push(ch),
                '-' | ' ' | '.' | ':' => out.push('_'),
                _ => {}
            }
        }
        if out.is_empty() || out.chars().all(|c| c == '_') {
            return None;
        }
        if out.starts_with(|c: char| c.is_ascii_digit()) {
            out.insert(0, '_');
        }
        Some(out)
    }

    fn is_reserved(&self, ident: &str) -> bool {
        RESERVED.contains(&ident)
    }
}

/// Immutable bundle of collaborators threaded through one generation pass.
pub struct GenContext<'a> {
    pub bindings: &'a dyn BindingResolver,
    pub identifiers: &'a dyn IdentifierPolicy,
}

impl<'a> GenContext<'a> {
    pub fn new(
        bindings: &'a dyn BindingResolver,
        identifiers: &'a dyn IdentifierPolicy,
    ) -> Self {
        Self {
            bindings,
            identifiers,
        }
    }
}
