//! JSON exchange format.
//!
//! The persisted form is an array of root nodes, each fully expanded:
//! operation nodes nest their operands by value. In memory operands are
//! registry references, so the expansion happens here and only here:
//! exporting copies the current registry state inline, importing folds the
//! inline copies back into registry entries.
//!
//! Field names are stable: `id` (string `node_<n>`), `type`, `geometry`,
//! `params`, `op`, `left`/`right`, `transform` (16-number array), `name`,
//! `isRoot`.

use crate::{BoolOp, Document, Node, NodeId, NodeKind, Primitive, Transform};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced at the exchange boundary.
///
/// Any error rejects the whole import; the caller's document is never
/// touched because parsing builds a fresh [`Document`] first.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The text is not valid JSON for the exchange schema.
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A node id is not of the form `node_<n>`.
    #[error("invalid node id {id:?} (expected \"node_<n>\")")]
    BadNodeId {
        /// The offending id string.
        id: String,
    },
    /// A node's `geometry` tag disagrees with the shape of its `params`.
    #[error("geometry \"{geometry}\" does not match the params of {id}")]
    GeometryMismatch {
        /// The offending node's id string.
        id: String,
        /// The declared geometry tag.
        geometry: String,
    },
    /// An operation references an id missing from the registry (export).
    #[error("operation node_{parent} references missing node_{child}")]
    MissingChild {
        /// The operation node.
        parent: NodeId,
        /// The dangling operand reference.
        child: NodeId,
    },
}

/// Wire form of a [`NodeId`]: `node_<n>`.
pub fn format_node_id(id: NodeId) -> String {
    format!("node_{id}")
}

/// Parse a `node_<n>` string back into a [`NodeId`].
pub fn parse_node_id(s: &str) -> Option<NodeId> {
    s.strip_prefix("node_")?.parse().ok()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireNode {
    Primitive {
        id: String,
        geometry: WireGeometry,
        params: WireParams,
        transform: Transform,
        name: String,
        #[serde(rename = "isRoot")]
        is_root: bool,
    },
    Operation {
        id: String,
        op: BoolOp,
        left: Box<WireNode>,
        right: Box<WireNode>,
        transform: Transform,
        name: String,
        #[serde(rename = "isRoot")]
        is_root: bool,
    },
}

impl WireNode {
    fn id(&self) -> &str {
        match self {
            WireNode::Primitive { id, .. } | WireNode::Operation { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireGeometry {
    Box,
    Sphere,
}

impl WireGeometry {
    fn of(primitive: &Primitive) -> Self {
        match primitive {
            Primitive::Box { .. } => WireGeometry::Box,
            Primitive::Sphere { .. } => WireGeometry::Sphere,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            WireGeometry::Box => "box",
            WireGeometry::Sphere => "sphere",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum WireParams {
    Box { width: f64, height: f64, depth: f64 },
    Sphere { radius: f64 },
}

impl WireParams {
    fn of(primitive: &Primitive) -> Self {
        match *primitive {
            Primitive::Box {
                width,
                height,
                depth,
            } => WireParams::Box {
                width,
                height,
                depth,
            },
            Primitive::Sphere { radius } => WireParams::Sphere { radius },
        }
    }

    fn to_primitive(&self) -> Primitive {
        match *self {
            WireParams::Box {
                width,
                height,
                depth,
            } => Primitive::Box {
                width,
                height,
                depth,
            },
            WireParams::Sphere { radius } => Primitive::Sphere { radius },
        }
    }
}

/// Serialize the document's root forest, fully expanded, pretty-printed.
pub fn to_json(doc: &Document) -> Result<String, DocumentError> {
    let mut roots = Vec::new();
    for node in doc.roots() {
        roots.push(expand(doc, node)?);
    }
    Ok(serde_json::to_string_pretty(&roots)?)
}

fn expand(doc: &Document, node: &Node) -> Result<WireNode, DocumentError> {
    match &node.kind {
        NodeKind::Primitive(primitive) => Ok(WireNode::Primitive {
            id: format_node_id(node.id),
            geometry: WireGeometry::of(primitive),
            params: WireParams::of(primitive),
            transform: node.transform,
            name: node.name.clone(),
            is_root: node.is_root,
        }),
        NodeKind::Operation { op, left, right } => {
            let resolve = |child: NodeId| {
                doc.get(child).ok_or(DocumentError::MissingChild {
                    parent: node.id,
                    child,
                })
            };
            let left_node = resolve(*left)?;
            let right_node = resolve(*right)?;
            Ok(WireNode::Operation {
                id: format_node_id(node.id),
                op: *op,
                left: Box::new(expand(doc, left_node)?),
                right: Box::new(expand(doc, right_node)?),
                transform: node.transform,
                name: node.name.clone(),
                is_root: node.is_root,
            })
        }
    }
}

/// Parse an exported forest into a fresh document.
///
/// Walks each root depth-first (parent, then left, then right), folding
/// inline operands back into registry references, and leaves the id counter
/// one past the highest numeric suffix seen. Top-level entries are roots by
/// definition, whatever their stored flag says.
pub fn from_json(text: &str) -> Result<Document, DocumentError> {
    let roots: Vec<WireNode> = serde_json::from_str(text)?;
    let mut doc = Document::new();
    for root in &roots {
        register(&mut doc, root, true)?;
    }
    Ok(doc)
}

fn register(doc: &mut Document, wire: &WireNode, force_root: bool) -> Result<NodeId, DocumentError> {
    let id = parse_node_id(wire.id()).ok_or_else(|| DocumentError::BadNodeId {
        id: wire.id().to_string(),
    })?;

    match wire {
        WireNode::Primitive {
            geometry,
            params,
            transform,
            name,
            is_root,
            ..
        } => {
            let primitive = params.to_primitive();
            if WireGeometry::of(&primitive) != *geometry {
                return Err(DocumentError::GeometryMismatch {
                    id: wire.id().to_string(),
                    geometry: geometry.tag().to_string(),
                });
            }
            doc.register(Node {
                id,
                name: name.clone(),
                transform: *transform,
                is_root: force_root || *is_root,
                kind: NodeKind::Primitive(primitive),
            });
        }
        WireNode::Operation {
            op,
            left,
            right,
            transform,
            name,
            is_root,
            ..
        } => {
            let left_id = parse_node_id(left.id()).ok_or_else(|| DocumentError::BadNodeId {
                id: left.id().to_string(),
            })?;
            let right_id = parse_node_id(right.id()).ok_or_else(|| DocumentError::BadNodeId {
                id: right.id().to_string(),
            })?;
            doc.register(Node {
                id,
                name: name.clone(),
                transform: *transform,
                is_root: force_root || *is_root,
                kind: NodeKind::Operation {
                    op: *op,
                    left: left_id,
                    right: right_id,
                },
            });
            register(doc, left, false)?;
            register(doc, right, false)?;
        }
    }
    Ok(id)
}
