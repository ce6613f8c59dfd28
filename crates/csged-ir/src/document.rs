//! The flat node registry and its mutation operations.

use crate::{BoolOp, Node, NodeId, NodeKind, Primitive, Transform};
use std::collections::HashMap;

/// A modeling document: every node ever created, keyed by id, plus the
/// registration order that makes root iteration deterministic.
///
/// The registry is the single source of truth. Operation nodes hold
/// [`NodeId`] references into it, so mutating a node (a transform drag, say)
/// is immediately visible to every operation that combines it.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
    next_id: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document. The id counter starts at 1.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a primitive as a new root with an identity transform.
    ///
    /// The node is named `Box_<n>` / `Sphere_<n>` after its numeric id.
    /// Pure allocation; this cannot fail.
    pub fn add_primitive(&mut self, primitive: Primitive) -> NodeId {
        let id = self.alloc_id();
        let node = Node {
            id,
            name: format!("{}_{}", primitive.display_name(), id),
            transform: Transform::identity(),
            is_root: true,
            kind: NodeKind::Primitive(primitive),
        };
        self.nodes.insert(id, node);
        self.order.push(id);
        id
    }

    /// Combine two existing nodes under a boolean operation.
    ///
    /// Returns `None` without mutating anything if either id is absent.
    /// Otherwise the operands stop being roots and the new operation node,
    /// named `<OP>_<n>`, takes their place as the root.
    pub fn apply_operation(&mut self, a: NodeId, b: NodeId, op: BoolOp) -> Option<NodeId> {
        if !self.nodes.contains_key(&a) || !self.nodes.contains_key(&b) {
            return None;
        }

        let id = self.alloc_id();
        let node = Node {
            id,
            name: format!("{}_{}", op, id),
            transform: Transform::identity(),
            is_root: true,
            kind: NodeKind::Operation { op, left: a, right: b },
        };

        if let Some(left) = self.nodes.get_mut(&a) {
            left.is_root = false;
        }
        if let Some(right) = self.nodes.get_mut(&b) {
            right.is_root = false;
        }

        self.nodes.insert(id, node);
        self.order.push(id);
        Some(id)
    }

    /// Look up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Look up a node by id, mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Whether the registry holds `id`.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Replace a node's transform. Returns false if the id is absent.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.transform = transform;
                true
            }
            None => false,
        }
    }

    /// All nodes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Root nodes in registration order: exactly the set that renders.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.iter().filter(|n| n.is_root)
    }

    /// Number of nodes in the registry.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The id the next allocation will use.
    pub fn next_id(&self) -> NodeId {
        self.next_id
    }

    /// Full reinitialization: empty registry, counter back to 1.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.order.clear();
        self.next_id = 1;
    }

    /// Register a node carrying an externally assigned id (import path).
    ///
    /// Keeps the counter ahead of every id seen so future allocations never
    /// collide. A duplicate id replaces the earlier entry, keeping its
    /// original position in the registration order.
    pub(crate) fn register(&mut self, node: Node) {
        let id = node.id;
        if self.nodes.insert(id, node).is_none() {
            self.order.push(id);
        }
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Primitive {
        Primitive::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut doc = Document::new();
        let a = doc.add_primitive(unit_box());
        let b = doc.add_primitive(Primitive::Sphere { radius: 0.5 });
        let c = doc.apply_operation(a, b, BoolOp::Union).unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(doc.next_id(), 4);
    }

    #[test]
    fn add_primitive_defaults() {
        let mut doc = Document::new();
        let id = doc.add_primitive(unit_box());
        let node = doc.get(id).unwrap();
        assert_eq!(node.name, "Box_1");
        assert!(node.is_root);
        assert_eq!(node.transform, Transform::identity());
        match &node.kind {
            NodeKind::Primitive(Primitive::Box { width, .. }) => assert_eq!(*width, 1.0),
            other => panic!("expected box primitive, got {other:?}"),
        }
    }

    #[test]
    fn apply_operation_consumes_roots() {
        let mut doc = Document::new();
        let a = doc.add_primitive(unit_box());
        let b = doc.add_primitive(Primitive::Sphere { radius: 0.5 });

        let op = doc.apply_operation(a, b, BoolOp::Subtract).unwrap();

        assert!(!doc.get(a).unwrap().is_root);
        assert!(!doc.get(b).unwrap().is_root);
        let node = doc.get(op).unwrap();
        assert!(node.is_root);
        assert_eq!(node.name, "SUBTRACT_3");
        assert_eq!(
            node.kind,
            NodeKind::Operation {
                op: BoolOp::Subtract,
                left: a,
                right: b
            }
        );
        let roots: Vec<NodeId> = doc.roots().map(|n| n.id).collect();
        assert_eq!(roots, vec![op]);
    }

    #[test]
    fn apply_operation_missing_id_is_refused() {
        let mut doc = Document::new();
        let a = doc.add_primitive(unit_box());
        assert_eq!(doc.apply_operation(a, 99, BoolOp::Union), None);
        // No mutation: a is still a root and no id was burned.
        assert!(doc.get(a).unwrap().is_root);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.next_id(), 2);
    }

    #[test]
    fn roots_follow_registration_order() {
        let mut doc = Document::new();
        let a = doc.add_primitive(unit_box());
        let b = doc.add_primitive(unit_box());
        let c = doc.add_primitive(unit_box());
        doc.apply_operation(a, b, BoolOp::Union).unwrap();

        let roots: Vec<&str> = doc.roots().map(|n| n.name.as_str()).collect();
        assert_eq!(roots, vec!["Box_3", "UNION_4"]);
        assert_eq!(doc.get(c).unwrap().id, 3);
    }

    #[test]
    fn transform_edit_is_seen_through_operations() {
        let mut doc = Document::new();
        let a = doc.add_primitive(unit_box());
        let b = doc.add_primitive(Primitive::Sphere { radius: 0.5 });
        let op = doc.apply_operation(a, b, BoolOp::Intersect).unwrap();

        assert!(doc.set_transform(a, Transform::from_translation(2.0, 0.0, 0.0)));

        // The operation references the registry entry, not a frozen copy.
        match doc.get(op).unwrap().kind {
            NodeKind::Operation { left, .. } => {
                assert_eq!(doc.get(left).unwrap().transform.translation().0, 2.0);
            }
            _ => panic!("expected operation"),
        }
    }

    #[test]
    fn clear_resets_counter() {
        let mut doc = Document::new();
        doc.add_primitive(unit_box());
        doc.add_primitive(unit_box());
        doc.clear();
        assert!(doc.is_empty());
        assert_eq!(doc.next_id(), 1);
        assert_eq!(doc.add_primitive(unit_box()), 1);
    }
}
