use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::graph::edge::Edge;
use crate::graph::node::{Node, NodeGroup};

/// Indexed store for the workflow graph.
///
/// Nodes are keyed by id; edges by a monotonically increasing counter so
/// that insertion order is preserved and ids are never reused, even after
/// removals. The store itself is purely local state; keeping it in sync
/// with the backend is the controller's job.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: HashMap<String, Node>,
    edges: BTreeMap<u64, Edge>,
    next_edge_id: u64,
}

impl GraphStore {
    pub fn new() -> GraphStore {
        GraphStore { nodes: HashMap::new(), edges: BTreeMap::new(), next_edge_id: 0 }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Snapshot of all nodes, for handing to a rendering surface.
    pub fn node_list(&self) -> Vec<Node> {
        self.nodes.values().cloned().collect()
    }

    /// Snapshot of all edges in insertion order.
    pub fn edge_list(&self) -> Vec<Edge> {
        self.edges.values().cloned().collect()
    }

    /// Inserts a node. A node with the same id is replaced; the backend is
    /// authoritative, so a replacement means it re-announced the node.
    pub fn add_node(&mut self, node: Node) {
        if let Some(previous) = self.nodes.insert(node.id.clone(), node) {
            log::warn!("Node '{}' was already present and has been replaced.", previous.id);
        }
    }

    /// Inserts a directed edge `from -> to` and returns its id.
    ///
    /// Both endpoints must already be present; a dangling edge would break
    /// the removal sweep, so this is rejected rather than deferred.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<u64> {
        if !self.nodes.contains_key(from) {
            return Err(Error::UnknownNode(from.to_string()));
        }
        if !self.nodes.contains_key(to) {
            return Err(Error::UnknownNode(to.to_string()));
        }

        let id = self.next_edge_id;
        self.next_edge_id += 1;
        self.edges.insert(id, Edge { id, from: from.to_string(), to: to.to_string() });
        Ok(id)
    }

    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        self.nodes.remove(id)
    }

    pub fn remove_edge(&mut self, id: u64) -> Option<Edge> {
        self.edges.remove(&id)
    }

    /// Ids of all edges leaving `from`. Duplicates by endpoint pair are
    /// possible and must all be returned.
    pub fn edges_from(&self, from: &str) -> Vec<u64> {
        self.edges.values().filter(|e| e.from == from).map(|e| e.id).collect()
    }

    /// Ids of all edges arriving at `to`.
    pub fn edges_to(&self, to: &str) -> Vec<u64> {
        self.edges.values().filter(|e| e.to == to).map(|e| e.id).collect()
    }

    /// Distinct artifact types among the given node ids, sorted for a
    /// stable query key. Nodes without a type tag (jobs) contribute
    /// nothing; an unknown id is an error rather than a silent skip.
    pub fn artifact_types(&self, selection: &[String]) -> Result<Vec<String>> {
        let mut types = Vec::new();
        for id in selection {
            let node = self.nodes.get(id).ok_or_else(|| Error::UnknownNode(id.clone()))?;
            if let Some(ref t) = node.artifact_type {
                if !types.contains(t) {
                    types.push(t.clone());
                }
            }
        }
        types.sort();
        Ok(types)
    }

    pub fn nodes_in_group(&self, group: NodeGroup) -> Vec<&Node> {
        self.nodes.values().filter(|n| n.group == group).collect()
    }

    /// Removes `root` together with everything reachable from it.
    ///
    /// Two passes, matching the behavior users observe in the editor:
    ///
    /// 1. Forward sweep: starting from `root`, every outgoing edge of a
    ///    visited node is deleted and its target enqueued, then the node
    ///    itself is deleted. This takes down the job's output placeholders
    ///    and every downstream consumer chained off them.
    /// 2. Cleanup: edges still pointing *into* `root` (from surviving
    ///    upstream producers) are deleted, since their target is gone.
    ///
    /// Upstream producers themselves are left untouched. Returns the ids
    /// of all removed nodes.
    pub fn remove_cascade(&mut self, root: &str) -> Vec<String> {
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut enqueued: HashSet<String> = HashSet::new();
        let mut removed: Vec<String> = Vec::new();

        queue.push_back(root.to_string());
        enqueued.insert(root.to_string());

        while let Some(current) = queue.pop_front() {
            for edge_id in self.edges_from(&current) {
                if let Some(edge) = self.remove_edge(edge_id) {
                    if enqueued.insert(edge.to.clone()) {
                        queue.push_back(edge.to);
                    }
                }
            }
            if self.remove_node(&current).is_some() {
                removed.push(current);
            }
        }

        // Inbound edges from surviving upstream nodes still reference the
        // removed root; drop them as well.
        for edge_id in self.edges_to(root) {
            self.remove_edge(edge_id);
        }

        removed
    }
}
