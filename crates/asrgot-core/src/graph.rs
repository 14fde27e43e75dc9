//! # Graph Store
//!
//! In-memory storage of the research reasoning graph.
//!
//! All data structures use `BTreeMap`/`BTreeSet` so iteration order is
//! stable. The five layers are seeded at construction and after every
//! [`ResearchGraph::clear`].

use crate::{AsrGotError, Edge, EdgeId, Hyperedge, Layer, LayerId, Node, NodeId, NodeKind};
use std::collections::{BTreeMap, BTreeSet};

/// The graph: nodes, edges, hyperedges, layers and observed node kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchGraph {
    /// Node storage: NodeId -> Node
    nodes: BTreeMap<NodeId, Node>,

    /// Edge storage: EdgeId -> Edge
    edges: BTreeMap<EdgeId, Edge>,

    /// Adjacency list: source -> targets
    outgoing: BTreeMap<NodeId, BTreeSet<NodeId>>,

    /// Reverse adjacency: target -> sources
    incoming: BTreeMap<NodeId, BTreeSet<NodeId>>,

    /// Unused by the current operations.
    hyperedges: BTreeMap<String, Hyperedge>,

    layers: BTreeMap<LayerId, Layer>,

    node_kinds: BTreeSet<NodeKind>,
}

impl Default for ResearchGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ResearchGraph {
    /// Create an empty graph with the five layers seeded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            outgoing: BTreeMap::new(),
            incoming: BTreeMap::new(),
            hyperedges: BTreeMap::new(),
            layers: LayerId::ALL.iter().map(|id| (*id, Layer::new(*id))).collect(),
            node_kinds: BTreeSet::new(),
        }
    }

    /// Drop every element and reseed the layers.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// True when the graph holds no nodes, edges or hyperedges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.hyperedges.is_empty()
    }

    /// True when the graph is indistinguishable from a new one.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.is_empty()
            && self.node_kinds.is_empty()
            && self.layers.len() == LayerId::ALL.len()
            && self.layers.values().all(Layer::is_empty)
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Insert a node and register it in its layer.
    pub fn insert_node(&mut self, node: Node) -> Result<(), AsrGotError> {
        if self.nodes.contains_key(&node.id) {
            return Err(AsrGotError::DuplicateNode(node.id.to_string()));
        }
        if let Some(layer) = node.layer()
            && let Some(members) = self.layers.get_mut(&layer)
        {
            members.nodes.insert(node.id.clone());
        }
        self.node_kinds.insert(node.kind);
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Insert an edge between two existing nodes.
    ///
    /// The edge joins the layer of its target node.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<(), AsrGotError> {
        if self.edges.contains_key(&edge.id) {
            return Err(AsrGotError::DuplicateEdge(edge.id.to_string()));
        }
        if !self.nodes.contains_key(&edge.source) {
            return Err(AsrGotError::NodeNotFound(edge.source.to_string()));
        }
        let Some(target) = self.nodes.get(&edge.target) else {
            return Err(AsrGotError::NodeNotFound(edge.target.to_string()));
        };

        if let Some(layer) = target.layer()
            && let Some(members) = self.layers.get_mut(&layer)
        {
            members.edges.insert(edge.id.clone());
        }
        self.outgoing
            .entry(edge.source.clone())
            .or_default()
            .insert(edge.target.clone());
        self.incoming
            .entry(edge.target.clone())
            .or_default()
            .insert(edge.source.clone());
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// Lookup a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Lookup an edge by id.
    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Check if an edge id is taken.
    #[must_use]
    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    /// Iterate nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterate edges in id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Iterate hyperedges in id order.
    pub fn hyperedges(&self) -> impl Iterator<Item = &Hyperedge> {
        self.hyperedges.values()
    }

    /// Iterate layers in seeding order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// Lookup a layer.
    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Node kinds present in the graph.
    #[must_use]
    pub fn node_kinds(&self) -> &BTreeSet<NodeKind> {
        &self.node_kinds
    }

    /// Iterate nodes of one kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.kind == kind)
    }

    /// Ids of every node of one kind.
    #[must_use]
    pub fn ids_of_kind(&self, kind: NodeKind) -> BTreeSet<NodeId> {
        self.nodes_of_kind(kind).map(|n| n.id.clone()).collect()
    }

    /// Get the total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get the total number of hyperedges.
    #[must_use]
    pub fn hyperedge_count(&self) -> usize {
        self.hyperedges.len()
    }

    /// Get the total number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    // =========================================================================
    // ADJACENCY
    // =========================================================================

    /// Targets of edges leaving `id`.
    pub fn children(&self, id: &NodeId) -> impl Iterator<Item = &NodeId> {
        self.outgoing.get(id).into_iter().flatten()
    }

    /// Number of edges touching `id`, in either direction.
    #[must_use]
    pub fn degree(&self, id: &NodeId) -> usize {
        let out = self.outgoing.get(id).map_or(0, BTreeSet::len);
        let inc = self.incoming.get(id).map_or(0, BTreeSet::len);
        out + inc
    }

    /// Neighbours of `id` ignoring edge direction.
    #[must_use]
    pub fn neighbors(&self, id: &NodeId) -> BTreeSet<&NodeId> {
        self.outgoing
            .get(id)
            .into_iter()
            .chain(self.incoming.get(id))
            .flatten()
            .filter(|n| *n != id)
            .collect()
    }

    /// Check whether `a` and `b` are joined by an edge in either direction.
    #[must_use]
    pub fn adjacent(&self, a: &NodeId, b: &NodeId) -> bool {
        let has = |from: &NodeId, to: &NodeId| self.outgoing.get(from).is_some_and(|t| t.contains(to));
        has(a, b) || has(b, a)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Warnings;
    use crate::metadata::{
        EdgeMetadataBase, NodeMetadataBase, build_edge_metadata, build_node_metadata,
    };

    fn node(id: NodeId, kind: NodeKind, layer: LayerId) -> Node {
        let mut warnings = Warnings::new();
        let metadata = build_node_metadata(
            NodeMetadataBase {
                layer: Some(layer),
                ..NodeMetadataBase::default()
            },
            &mut warnings,
        );
        Node::new(id, "label", kind, "content", metadata)
    }

    fn edge(source: NodeId, target: NodeId) -> Edge {
        let mut warnings = Warnings::new();
        Edge::new(
            source,
            target,
            build_edge_metadata(EdgeMetadataBase::typed("Decomposition"), &mut warnings),
        )
    }

    #[test]
    fn new_graph_is_pristine_with_five_layers() {
        let graph = ResearchGraph::new();
        assert!(graph.is_pristine());
        assert_eq!(graph.layer_count(), 5);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn insert_registers_layers_and_kinds() {
        let mut graph = ResearchGraph::new();
        graph
            .insert_node(node(NodeId::root(), NodeKind::Root, LayerId::Base))
            .expect("root");
        graph
            .insert_node(node(NodeId::dimension(1), NodeKind::Dimension, LayerId::Empirical))
            .expect("dimension");
        graph
            .insert_edge(edge(NodeId::root(), NodeId::dimension(1)))
            .expect("edge");

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let empirical = graph.layer(LayerId::Empirical).expect("layer");
        assert!(empirical.nodes.contains("2.1"));
        assert!(empirical.edges.contains("e_n0_2.1"));
        assert!(graph.node_kinds().contains(&NodeKind::Dimension));
        assert_eq!(graph.degree(&NodeId::root()), 1);
        assert!(graph.adjacent(&NodeId::dimension(1), &NodeId::root()));
        assert_eq!(graph.children(&NodeId::root()).count(), 1);
        assert!(!graph.is_pristine());
    }

    #[test]
    fn duplicates_and_dangling_edges_rejected() {
        let mut graph = ResearchGraph::new();
        graph
            .insert_node(node(NodeId::root(), NodeKind::Root, LayerId::Base))
            .expect("root");
        assert!(matches!(
            graph.insert_node(node(NodeId::root(), NodeKind::Root, LayerId::Base)),
            Err(AsrGotError::DuplicateNode(_))
        ));
        assert!(matches!(
            graph.insert_edge(edge(NodeId::root(), NodeId::dimension(4))),
            Err(AsrGotError::NodeNotFound(_))
        ));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn clear_restores_pristine_state() {
        let mut graph = ResearchGraph::new();
        graph
            .insert_node(node(NodeId::root(), NodeKind::Root, LayerId::Base))
            .expect("root");
        graph.clear();
        assert!(graph.is_pristine());
        assert_eq!(graph, ResearchGraph::new());
    }
}
