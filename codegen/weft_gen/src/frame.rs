//! Generation-time nesting state.
//!
//! The recursion carries a [`NestingFrame`] by value instead of a hidden
//! global counter: depth, the role of the current position, and the textual
//! accessor that reaches the current value. Frames are cloned downward and
//! never shared, so every synthesized identifier is a pure function of the
//! path that produced it. That is the whole uniqueness argument: two
//! identifiers at the same depth within one procedure come from different
//! roles, and the same role never occurs twice at one depth on one path.

/// Role of the value a frame points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Procedure parameter or a struct/union member binding.
    Root,
    /// A list/set container scope.
    Collection,
    /// A map container scope.
    Map,
    /// A list/set element.
    Element,
    /// A map key.
    Key,
    /// A map value.
    Value,
}

/// By-value recursion state for one nesting level.
///
/// Exists only during a single generation pass; it is not a runtime
/// artifact.
#[derive(Debug, Clone)]
pub struct NestingFrame {
    depth: u32,
    role: Role,
    accessor: String,
}

impl NestingFrame {
    /// Frame for a procedure entry point: depth 0, accessing the parameter.
    pub fn root(accessor: impl Into<String>) -> Self {
        Self {
            depth: 0,
            role: Role::Root,
            accessor: accessor.into(),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Accessor expression for the current value: a bound field variable at
    /// depth 0, a loop variable below.
    pub fn accessor(&self) -> &str {
        &self.accessor
    }

    /// Same depth, different accessor. Used when a struct member is bound to
    /// a local before encoding.
    pub fn rebind(&self, accessor: impl Into<String>) -> Self {
        Self {
            depth: self.depth,
            role: self.role,
            accessor: accessor.into(),
        }
    }

    /// Descend one nesting level in `role`, synthesizing the loop variable
    /// for that role at the new depth.
    pub fn child(&self, role: Role) -> Self {
        let depth = self.depth + 1;
        let accessor = match role {
            Role::Element => format!("e{depth}"),
            Role::Key => format!("k{depth}"),
            Role::Value => format!("v{depth}"),
            Role::Root | Role::Collection | Role::Map => self.accessor.clone(),
        };
        Self {
            depth,
            role,
            accessor,
        }
    }

    /// Name of the fresh decode-side accumulator allocated for a container
    /// at this position.
    pub fn accumulator(&self) -> String {
        format!("acc{}", self.depth + 1)
    }
}
