//! Sparsity and timestamp-format policy.

use weft_schema::{Member, TimestampFormat};

use crate::context::WireLocation;

/// Null handling for a container's elements or entries.
///
/// Fixed per container instance and applied identically by the encode and
/// decode procedures: sparse containers keep null positions on the wire and
/// reinsert them on decode; dense containers drop them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparsityPolicy {
    Sparse,
    Dense,
}

impl SparsityPolicy {
    pub fn from_sparse(sparse: bool) -> Self {
        if sparse {
            Self::Sparse
        } else {
            Self::Dense
        }
    }

    /// Token spelled into `elem`/`entry`/`each` instructions.
    pub fn token(self) -> &'static str {
        match self {
            Self::Sparse => "sparse",
            Self::Dense => "dense",
        }
    }
}

/// Select the effective wire format for one timestamp position.
///
/// Precedence: member trait, then shape-level trait, then the context
/// default. Header and query bindings coerce to a string form regardless of
/// what that chain selects, since those locations cannot carry structured
/// numbers.
pub(crate) fn resolve_timestamp_format(
    member: Option<&Member>,
    shape_format: Option<TimestampFormat>,
    location: WireLocation,
    context_default: TimestampFormat,
) -> TimestampFormat {
    match location {
        WireLocation::Header => TimestampFormat::HttpDate,
        WireLocation::Query => TimestampFormat::DateTime,
        WireLocation::Body => member
            .and_then(|m| m.timestamp_format)
            .or(shape_format)
            .unwrap_or(context_default),
    }
}

#[cfg(test)]
mod tests {
    use weft_schema::{Member, ShapeId, TimestampFormat};

    use super::{resolve_timestamp_format, SparsityPolicy, WireLocation};

    fn member_with_format(format: TimestampFormat) -> Member {
        // The target id is irrelevant for format resolution.
        let mut builder = weft_schema::GraphBuilder::new();
        let id: ShapeId = builder.add("T", weft_schema::ShapeKind::Timestamp { format: None });
        Member::new("at", id).timestamp_format(format)
    }

    #[test]
    fn member_trait_beats_context_default() {
        let member = member_with_format(TimestampFormat::DateTime);
        let resolved = resolve_timestamp_format(
            Some(&member),
            None,
            WireLocation::Body,
            TimestampFormat::EpochSeconds,
        );
        assert_eq!(resolved, TimestampFormat::DateTime);
    }

    #[test]
    fn shape_trait_beats_context_default() {
        let resolved = resolve_timestamp_format(
            None,
            Some(TimestampFormat::HttpDate),
            WireLocation::Body,
            TimestampFormat::EpochSeconds,
        );
        assert_eq!(resolved, TimestampFormat::HttpDate);
    }

    #[test]
    fn header_coerces_over_member_trait() {
        let member = member_with_format(TimestampFormat::EpochSeconds);
        let resolved = resolve_timestamp_format(
            Some(&member),
            None,
            WireLocation::Header,
            TimestampFormat::EpochSeconds,
        );
        assert_eq!(resolved, TimestampFormat::HttpDate);
    }

    #[test]
    fn query_coerces_to_date_time() {
        let resolved = resolve_timestamp_format(
            None,
            None,
            WireLocation::Query,
            TimestampFormat::EpochSeconds,
        );
        assert_eq!(resolved, TimestampFormat::DateTime);
    }

    #[test]
    fn sparsity_tokens() {
        assert_eq!(SparsityPolicy::from_sparse(true).token(), "sparse");
        assert_eq!(SparsityPolicy::from_sparse(false).token(), "dense");
    }
}
