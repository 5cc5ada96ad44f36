use std::collections::{HashMap, HashSet};

use crate::doc::model::{GraphDoc, NodeRecord, PlanDoc};

#[derive(Clone, Debug, Default)]
pub struct GraphIndex {
    node_by_id: HashMap<String, usize>,
    outgoing_by_source: HashMap<String, Vec<usize>>,
}

impl GraphIndex {
    pub fn build(graph: &GraphDoc) -> Self {
        let mut node_by_id = HashMap::with_capacity(graph.nodes.len());
        for (index, node) in graph.nodes.iter().enumerate() {
            node_by_id.insert(node.id.clone(), index);
        }

        let mut outgoing_by_source: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, edge) in graph.edges.iter().enumerate() {
            outgoing_by_source
                .entry(edge.source.clone())
                .or_default()
                .push(index);
        }

        Self {
            node_by_id,
            outgoing_by_source,
        }
    }

    pub fn node<'graph>(&self, graph: &'graph GraphDoc, id: &str) -> Option<&'graph NodeRecord> {
        self.node_by_id
            .get(id)
            .and_then(|&index| graph.nodes.get(index))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_by_id.contains_key(id)
    }

    pub fn outgoing_edges(&self, source: &str) -> &[usize] {
        self.outgoing_by_source
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Clone, Debug, Default)]
pub struct PlanIndex {
    deletes: HashSet<String>,
    moves: HashSet<String>,
}

impl PlanIndex {
    pub fn build(plan: &PlanDoc) -> Self {
        Self {
            deletes: plan.deletes.iter().map(|entry| entry.id.clone()).collect(),
            moves: plan.moves.iter().map(|entry| entry.id.clone()).collect(),
        }
    }

    pub fn is_delete(&self, id: &str) -> bool {
        self.deletes.contains(id)
    }

    pub fn is_move(&self, id: &str) -> bool {
        self.moves.contains(id)
    }
}
