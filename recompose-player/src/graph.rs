//! Variable dependency graph
//!
//! Built once when a document attaches. Every operation with
//! [`VariableSupport`](recompose_wire::VariableSupport) becomes a node. An
//! edge runs from each operation that produces a variable to each operation
//! that listens to it, and the update pass walks the nodes in a topological
//! order of those edges.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use recompose_wire::{DependencyRegistrar, Document, VariableId};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::{PlayerError, Result};

type OperationList = SmallVec<[usize; 4]>;

#[derive(Debug, Clone, Default)]
struct Node {
    operation: usize,
    listens: SmallVec<[VariableId; 4]>,
    produces: SmallVec<[VariableId; 1]>,
}

impl DependencyRegistrar for Node {
    fn listens_to(&mut self, id: VariableId) {
        if !self.listens.contains(&id) {
            self.listens.push(id);
        }
    }

    fn produces(&mut self, id: VariableId) {
        if !self.produces.contains(&id) {
            self.produces.push(id);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    /// Variable id -> operation indices publishing it
    producers: AHashMap<VariableId, OperationList>,
    /// Variable id -> operation indices reading it
    consumers: AHashMap<VariableId, OperationList>,
    /// Operation indices in update order
    order: Vec<usize>,
    edge_count: usize,
}

impl DependencyGraph {
    /// Register every variable-supporting operation and order the graph
    pub fn build(document: &Document) -> Result<Self> {
        let mut graph = DependencyGraph::default();
        for (operation, op) in document.iter().enumerate() {
            let Some(support) = op.variable_support() else {
                continue;
            };
            let mut node = Node {
                operation,
                ..Node::default()
            };
            support.register_listening(&mut node);
            for id in &node.listens {
                graph.consumers.entry(*id).or_default().push(operation);
            }
            for id in &node.produces {
                graph.producers.entry(*id).or_default().push(operation);
            }
            graph.nodes.push(node);
        }
        graph.order = graph.topological_order()?;
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edge_count,
            variables = graph.producers.len(),
            "dependency graph built"
        );
        Ok(graph)
    }

    /// Kahn's algorithm; among ready nodes the earliest in the document goes first
    fn topological_order(&mut self) -> Result<Vec<usize>> {
        let position: AHashMap<usize, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.operation, position))
            .collect();

        let mut successors: Vec<OperationList> = vec![OperationList::new(); self.nodes.len()];
        let mut in_degree = vec![0usize; self.nodes.len()];
        for (consumer, node) in self.nodes.iter().enumerate() {
            for id in &node.listens {
                let Some(producers) = self.producers.get(id) else {
                    continue;
                };
                for operation in producers {
                    let producer = position[operation];
                    successors[producer].push(consumer);
                    in_degree[consumer] += 1;
                    self.edge_count += 1;
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(position, _)| Reverse(position))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse(position)) = ready.pop() {
            order.push(self.nodes[position].operation);
            for &next in &successors[position] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() < self.nodes.len() {
            let operations = in_degree
                .iter()
                .enumerate()
                .filter(|(_, degree)| **degree > 0)
                .map(|(position, _)| self.nodes[position].operation)
                .collect();
            return Err(PlayerError::DependencyCycle { operations });
        }
        Ok(order)
    }

    /// Operation indices in update order
    pub fn update_order(&self) -> &[usize] {
        &self.order
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of producer → consumer edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn producers_of(&self, id: VariableId) -> &[usize] {
        self.producers.get(&id).map_or(&[], |list| list.as_slice())
    }

    pub fn consumers_of(&self, id: VariableId) -> &[usize] {
        self.consumers.get(&id).map_or(&[], |list| list.as_slice())
    }

    /// Whether the operation at `index` publishes a variable
    pub fn is_producer(&self, index: usize) -> bool {
        self.nodes
            .binary_search_by_key(&index, |node| node.operation)
            .is_ok_and(|position| !self.nodes[position].produces.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recompose_wire::core::variables::{float_ref, system};
    use recompose_wire::operations::*;
    use recompose_wire::Operation;

    fn document(ops: Vec<Box<dyn Operation>>) -> Document {
        Document::new(ops)
    }

    fn add(a: f32, b: f32, id: VariableId) -> Box<dyn Operation> {
        Box::new(FloatExpression::new(id, vec![a, b, MathOperator::Add.as_float()]).unwrap())
    }

    #[test]
    fn test_producer_ordered_before_consumer_declared_earlier() {
        let graph = DependencyGraph::build(&document(vec![
            Box::new(DrawCircle::new(0.0, 0.0, float_ref(43))),
            add(float_ref(42), 1.0, 43),
            Box::new(FloatConstant::new(42, 2.0)),
        ]))
        .unwrap();
        assert_eq!(graph.update_order(), &[2, 1, 0]);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.is_producer(1));
        assert!(!graph.is_producer(0));
    }

    #[test]
    fn test_independent_nodes_keep_document_order() {
        let graph = DependencyGraph::build(&document(vec![
            Box::new(DrawLine::new(0.0, 0.0, 1.0, 1.0)),
            Box::new(MatrixSave::new()),
            Box::new(DrawRect::new(float_ref(system::WINDOW_WIDTH), 0.0, 1.0, 1.0)),
            Box::new(FloatConstant::new(42, 1.0)),
        ]))
        .unwrap();
        assert_eq!(graph.update_order(), &[0, 2, 3]);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.consumers_of(system::WINDOW_WIDTH), &[2]);
        assert!(graph.producers_of(system::WINDOW_WIDTH).is_empty());
    }

    #[test]
    fn test_fan_out_consumers() {
        let graph = DependencyGraph::build(&document(vec![
            Box::new(FloatConstant::new(42, 5.0)),
            Box::new(DrawCircle::new(0.0, 0.0, float_ref(42))),
            Box::new(DrawLine::new(float_ref(42), 0.0, 1.0, 1.0)),
        ]))
        .unwrap();
        assert_eq!(graph.consumers_of(42), &[1, 2]);
        assert_eq!(graph.producers_of(42), &[0]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let err = DependencyGraph::build(&document(vec![
            Box::new(FloatConstant::new(40, 1.0)),
            add(float_ref(43), 1.0, 42),
            add(float_ref(42), 1.0, 43),
            Box::new(DrawCircle::new(0.0, 0.0, float_ref(42))),
        ]))
        .unwrap_err();
        match err {
            PlayerError::DependencyCycle { operations } => assert_eq!(operations, vec![1, 2, 3]),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let err = DependencyGraph::build(&document(vec![add(float_ref(42), 1.0, 42)])).unwrap_err();
        assert!(matches!(err, PlayerError::DependencyCycle { .. }));
    }
}
