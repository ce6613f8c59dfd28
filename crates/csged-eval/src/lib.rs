//! Recursive tree evaluation for the csged document model.
//!
//! Turns the registry's root forest into a flat list of composited meshes
//! for an external renderer. The actual geometry work (building primitive
//! meshes, carrying out boolean mesh arithmetic) is delegated to an
//! external collaborator behind the [`MeshEvaluator`] trait; this crate owns
//! only the walk, the operator mapping, and transform application.
//!
//! There is no result cache: every [`rebuild`] recomputes the whole forest
//! from scratch, which is sufficient for the document sizes involved.

use csged_ir::{BoolOp, Document, NodeId, NodeKind};

pub mod mesh;

pub use mesh::TriangleMesh;

/// Operator tags understood by the external boolean-mesh evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsgOperation {
    /// Merge both operands.
    Addition,
    /// Remove the right operand from the left.
    Subtraction,
    /// Keep only the overlap.
    Intersection,
}

impl From<BoolOp> for CsgOperation {
    fn from(op: BoolOp) -> Self {
        match op {
            BoolOp::Union => CsgOperation::Addition,
            BoolOp::Subtract => CsgOperation::Subtraction,
            BoolOp::Intersect => CsgOperation::Intersection,
        }
    }
}

/// The external geometry/boolean-mesh collaborator.
///
/// `None` means the collaborator declined the request (unsupported or
/// malformed input); the failure propagates and the affected root simply
/// produces no composite.
pub trait MeshEvaluator {
    /// Build the untransformed mesh for a primitive.
    fn primitive(&self, primitive: &csged_ir::Primitive) -> Option<TriangleMesh>;

    /// Combine two evaluated meshes under a boolean operator.
    fn boolean(
        &self,
        left: &TriangleMesh,
        right: &TriangleMesh,
        op: CsgOperation,
    ) -> Option<TriangleMesh>;
}

/// A fully evaluated root, tagged for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeMesh {
    /// The root node this mesh was evaluated from.
    pub node_id: NodeId,
    /// The composited geometry.
    pub mesh: TriangleMesh,
}

/// Recursively evaluate one node of the tree.
///
/// Primitives are requested from the evaluator and placed by the node
/// transform. Operations evaluate both operands first; a missing registry
/// reference or a declined child propagates `None`. The combined result is
/// then placed by the operation node's own transform.
pub fn evaluate(
    doc: &Document,
    id: NodeId,
    evaluator: &impl MeshEvaluator,
) -> Option<TriangleMesh> {
    let node = doc.get(id)?;
    match &node.kind {
        NodeKind::Primitive(primitive) => {
            let mut mesh = evaluator.primitive(primitive)?;
            mesh.apply_transform(&node.transform);
            Some(mesh)
        }
        NodeKind::Operation { op, left, right } => {
            let left_mesh = evaluate(doc, *left, evaluator)?;
            let right_mesh = evaluate(doc, *right, evaluator)?;
            let mut mesh = evaluator.boolean(&left_mesh, &right_mesh, (*op).into())?;
            mesh.apply_transform(&node.transform);
            Some(mesh)
        }
    }
}

/// Evaluate every root in registration order and collect the composites.
pub fn rebuild(doc: &Document, evaluator: &impl MeshEvaluator) -> Vec<CompositeMesh> {
    doc.roots()
        .filter_map(|root| {
            evaluate(doc, root.id, evaluator).map(|mesh| CompositeMesh {
                node_id: root.id,
                mesh,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use csged_ir::{Primitive, Transform};
    use std::cell::RefCell;

    /// Canned-geometry evaluator: one triangle per primitive, boolean is
    /// mesh concatenation, every boolean call recorded.
    #[derive(Default)]
    struct StubEvaluator {
        decline_spheres: bool,
        ops: RefCell<Vec<CsgOperation>>,
    }

    impl MeshEvaluator for StubEvaluator {
        fn primitive(&self, primitive: &Primitive) -> Option<TriangleMesh> {
            match primitive {
                Primitive::Box { .. } => Some(TriangleMesh::new(
                    vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                    vec![0, 1, 2],
                )),
                Primitive::Sphere { radius } => {
                    if self.decline_spheres {
                        None
                    } else {
                        let r = *radius as f32;
                        Some(TriangleMesh::new(
                            vec![r, 0.0, 0.0, 0.0, r, 0.0, 0.0, 0.0, r],
                            vec![0, 1, 2],
                        ))
                    }
                }
            }
        }

        fn boolean(
            &self,
            left: &TriangleMesh,
            right: &TriangleMesh,
            op: CsgOperation,
        ) -> Option<TriangleMesh> {
            self.ops.borrow_mut().push(op);
            let mut vertices = left.vertices.clone();
            vertices.extend_from_slice(&right.vertices);
            let offset = left.num_vertices() as u32;
            let mut indices = left.indices.clone();
            indices.extend(right.indices.iter().map(|i| i + offset));
            Some(TriangleMesh::new(vertices, indices))
        }
    }

    fn unit_box() -> Primitive {
        Primitive::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
    }

    #[test]
    fn two_independent_roots_yield_two_composites() {
        let mut doc = Document::new();
        let a = doc.add_primitive(unit_box());
        let b = doc.add_primitive(Primitive::Sphere { radius: 0.5 });

        let composites = rebuild(&doc, &StubEvaluator::default());
        let ids: Vec<NodeId> = composites.iter().map(|c| c.node_id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn subtract_tree_yields_one_composite_tagged_with_op_id() {
        let mut doc = Document::new();
        let a = doc.add_primitive(unit_box());
        let b = doc.add_primitive(Primitive::Sphere { radius: 0.5 });
        let op = doc.apply_operation(a, b, BoolOp::Subtract).unwrap();

        let stub = StubEvaluator::default();
        let composites = rebuild(&doc, &stub);
        assert_eq!(composites.len(), 1);
        assert_eq!(composites[0].node_id, op);
        assert_eq!(composites[0].mesh.num_triangles(), 2);
        assert_eq!(*stub.ops.borrow(), vec![CsgOperation::Subtraction]);
    }

    #[test]
    fn operator_mapping() {
        assert_eq!(CsgOperation::from(BoolOp::Union), CsgOperation::Addition);
        assert_eq!(CsgOperation::from(BoolOp::Subtract), CsgOperation::Subtraction);
        assert_eq!(
            CsgOperation::from(BoolOp::Intersect),
            CsgOperation::Intersection
        );
    }

    #[test]
    fn declined_child_propagates() {
        let mut doc = Document::new();
        let a = doc.add_primitive(unit_box());
        let b = doc.add_primitive(Primitive::Sphere { radius: 0.5 });
        doc.apply_operation(a, b, BoolOp::Union).unwrap();

        let stub = StubEvaluator {
            decline_spheres: true,
            ..Default::default()
        };
        // The sphere operand fails, so the whole root fails; the boolean
        // evaluator is never consulted.
        assert!(rebuild(&doc, &stub).is_empty());
        assert!(stub.ops.borrow().is_empty());
    }

    #[test]
    fn unknown_id_evaluates_to_none() {
        let doc = Document::new();
        assert!(evaluate(&doc, 42, &StubEvaluator::default()).is_none());
    }

    #[test]
    fn node_transform_is_applied_to_the_result() {
        let mut doc = Document::new();
        let a = doc.add_primitive(unit_box());
        doc.set_transform(a, Transform::from_translation(10.0, 0.0, -2.0));

        let mesh = evaluate(&doc, a, &StubEvaluator::default()).unwrap();
        assert_relative_eq!(mesh.vertices[0], 10.0);
        assert_relative_eq!(mesh.vertices[2], -2.0);
    }

    #[test]
    fn nested_operations_combine_bottom_up() {
        let mut doc = Document::new();
        let a = doc.add_primitive(unit_box());
        let b = doc.add_primitive(unit_box());
        let inner = doc.apply_operation(a, b, BoolOp::Union).unwrap();
        let c = doc.add_primitive(Primitive::Sphere { radius: 1.0 });
        let outer = doc.apply_operation(inner, c, BoolOp::Intersect).unwrap();

        let stub = StubEvaluator::default();
        let composites = rebuild(&doc, &stub);
        assert_eq!(composites.len(), 1);
        assert_eq!(composites[0].node_id, outer);
        assert_eq!(composites[0].mesh.num_triangles(), 3);
        assert_eq!(
            *stub.ops.borrow(),
            vec![CsgOperation::Addition, CsgOperation::Intersection]
        );
    }
}
