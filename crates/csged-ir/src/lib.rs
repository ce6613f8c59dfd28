//! Document model for the csged CSG editor.
//!
//! This crate defines the modeling tree: primitive solids (boxes and
//! spheres) and boolean operations over them, held in a flat id→node
//! registry. Operation nodes reference their operands by [`NodeId`]; the
//! registry is the single source of truth, so a transform edit on a child is
//! visible through every operation that references it. The inline (by-value)
//! nesting of operands exists only in the JSON exchange format produced by
//! [`wire`].
//!
//! Evaluation (meshing) is handled separately; this crate is purely the
//! declarative model.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod document;
pub mod transform;
pub mod wire;

pub use document::Document;
pub use transform::Transform;
pub use wire::{format_node_id, parse_node_id, DocumentError};

/// Unique identifier for a node in the registry.
///
/// Allocated from a single monotonically increasing counter starting at 1.
/// Ids are never reused; the counter resets only when a document is fully
/// reinitialized or replaced by an import. The wire form is `node_<n>`.
pub type NodeId = u64;

/// A boolean operator combining two solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoolOp {
    /// Left ∪ right.
    Union,
    /// Left − right.
    Subtract,
    /// Left ∩ right.
    Intersect,
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BoolOp::Union => "UNION",
            BoolOp::Subtract => "SUBTRACT",
            BoolOp::Intersect => "INTERSECT",
        };
        f.write_str(s)
    }
}

/// A primitive solid with its parameters inline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Axis-aligned box centered at origin.
    Box {
        /// Size along X.
        width: f64,
        /// Size along Y.
        height: f64,
        /// Size along Z.
        depth: f64,
    },
    /// Sphere centered at origin.
    Sphere {
        /// Radius of the sphere.
        radius: f64,
    },
}

impl Primitive {
    /// Display name used when auto-naming nodes (`Box_<n>`, `Sphere_<n>`).
    pub fn display_name(&self) -> &'static str {
        match self {
            Primitive::Box { .. } => "Box",
            Primitive::Sphere { .. } => "Sphere",
        }
    }

    /// Wire geometry tag (`box` or `sphere`).
    pub fn geometry(&self) -> &'static str {
        match self {
            Primitive::Box { .. } => "box",
            Primitive::Sphere { .. } => "sphere",
        }
    }
}

/// What a node is: the closed sum over the two node shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A leaf solid.
    Primitive(Primitive),
    /// A boolean combination of two registry nodes.
    Operation {
        /// The operator.
        op: BoolOp,
        /// Left operand, by registry reference.
        left: NodeId,
        /// Right operand, by registry reference.
        right: NodeId,
    },
}

/// A node in the modeling tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Human-readable name (`Box_1`, `UNION_3`, …).
    pub name: String,
    /// Affine placement of this node's result.
    pub transform: Transform,
    /// True exactly when this node is an independent top-level shape.
    ///
    /// Forming an operation consumes its operands as roots: both operands'
    /// flags are cleared and the operation node becomes the root.
    pub is_root: bool,
    /// Primitive or operation payload.
    pub kind: NodeKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_op_display_matches_wire_form() {
        assert_eq!(BoolOp::Union.to_string(), "UNION");
        assert_eq!(BoolOp::Subtract.to_string(), "SUBTRACT");
        assert_eq!(BoolOp::Intersect.to_string(), "INTERSECT");
    }

    #[test]
    fn bool_op_serde_uppercase() {
        let json = serde_json::to_string(&BoolOp::Intersect).unwrap();
        assert_eq!(json, r#""INTERSECT""#);
        let back: BoolOp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BoolOp::Intersect);
    }

    #[test]
    fn primitive_tags() {
        let b = Primitive::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        };
        assert_eq!(b.display_name(), "Box");
        assert_eq!(b.geometry(), "box");
        let s = Primitive::Sphere { radius: 0.5 };
        assert_eq!(s.display_name(), "Sphere");
        assert_eq!(s.geometry(), "sphere");
    }
}
