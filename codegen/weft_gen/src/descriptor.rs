//! Descriptor allocation.
//!
//! One stable tag per member, allocated in deterministic member-name order
//! so the encode and decode procedures of a shape agree on the same tag set.
//! Containers below depth 0 have no member of their own; they get synthetic
//! per-level descriptors carrying the level's element/entry wire metadata.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use weft_diag::{CodegenError, Result};
use weft_schema::Member;

use crate::context::GenContext;
use crate::frame::Role;

/// Dispatch tag for one member (or one synthetic container level).
///
/// Allocated once and shared by both procedures of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Sanitized member identifier.
    pub member: String,
    /// Name carried on the wire; custom wire-name trait or the member name.
    pub wire_name: String,
    /// Position in descriptor order (member-name order).
    pub index: usize,
    /// True for per-level container tags, which have no explicit member.
    pub synthetic: bool,
}

impl Descriptor {
    /// Synthetic per-level tag for a container at `depth`.
    ///
    /// Carries the level's wire metadata (element or entry name) distinct
    /// from any member-level tag.
    pub fn synthetic(role: Role, depth: u32) -> Self {
        let wire_name = match role {
            Role::Element | Role::Collection => "member",
            Role::Map => "entry",
            Role::Key => "key",
            Role::Value => "value",
            Role::Root => "item",
        };
        Self {
            member: format!("{wire_name}_{depth}"),
            wire_name: wire_name.to_owned(),
            index: depth as usize,
            synthetic: true,
        }
    }
}

/// Descriptor set for one struct or union, in allocation order.
///
/// Each entry keeps the index of the member it was allocated for, so
/// callers can walk descriptors and members together.
#[derive(Debug)]
pub(crate) struct DescriptorTable {
    entries: SmallVec<[(Descriptor, usize); 8]>,
}

impl DescriptorTable {
    /// Allocate descriptors for every member of `shape`.
    ///
    /// Fatal on: member names colliding with reserved base-type fields,
    /// names with no identifier content after sanitization, two sanitized
    /// identifiers colliding, two members sharing a wire name, or a wire
    /// name that cannot be carried in a quoted instruction token.
    pub(crate) fn allocate(
        shape: &str,
        members: &[Member],
        ctx: &GenContext<'_>,
    ) -> Result<Self> {
        let mut order: Vec<usize> = (0..members.len()).collect();
        order.sort_by(|a, b| members[*a].name.cmp(&members[*b].name));

        let mut entries = SmallVec::new();
        let mut idents: FxHashSet<String> = FxHashSet::default();
        let mut wire_names: FxHashMap<String, String> = FxHashMap::default();

        for (index, member_index) in order.into_iter().enumerate() {
            let member = &members[member_index];
            if ctx.identifiers.is_reserved(&member.name) {
                return Err(CodegenError::ReservedMember {
                    shape: shape.to_owned(),
                    member: member.name.clone(),
                });
            }
            let ident = ctx.identifiers.sanitize(&member.name).ok_or_else(|| {
                CodegenError::InvalidIdentifier {
                    shape: shape.to_owned(),
                    name: member.name.clone(),
                }
            })?;
            if !idents.insert(ident.clone()) {
                return Err(CodegenError::DuplicateIdentifier {
                    shape: shape.to_owned(),
                    ident,
                });
            }
            let wire_name = member
                .wire_name
                .clone()
                .unwrap_or_else(|| member.name.clone());
            // Wire names are interpolated into quoted instruction tokens; an
            // embedded quote or control character would corrupt the emitted
            // program instead of failing here.
            if wire_name.chars().any(|c| c == '"' || c.is_control()) {
                return Err(CodegenError::InvalidWireName {
                    shape: shape.to_owned(),
                    member: member.name.clone(),
                    wire_name,
                });
            }
            if let Some(first) = wire_names.insert(wire_name.clone(), member.name.clone()) {
                return Err(CodegenError::DuplicateDescriptor {
                    shape: shape.to_owned(),
                    first,
                    second: member.name.clone(),
                    wire_name,
                });
            }
            entries.push((
                Descriptor {
                    member: ident,
                    wire_name,
                    index,
                    synthetic: false,
                },
                member_index,
            ));
        }

        Ok(Self { entries })
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Descriptor, usize)> {
        self.entries.iter().map(|(d, i)| (d, *i))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
