use std::fmt;

/// Stable identity of a shape in the schema graph.
///
/// An index into the graph's shape arena. Identity is assigned at
/// declaration time and never changes, so generated call graphs keyed by
/// `ShapeId` stay valid across the whole generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u32);

impl ShapeId {
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        #[allow(clippy::cast_possible_truncation)]
        Self(index as u32)
    }

    /// The arena index of this shape.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}
