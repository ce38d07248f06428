//! Pairwise graph store with bounded neighborhood sampling.
//!
//! Nodes and edges are indexed once at construction. Edges name their
//! endpoints by node label; an edge whose endpoint label is unknown is
//! dropped with a warning, so every stored edge references stored nodes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::extract::{Record, TextFn};
use crate::highlight::CenterSet;
use crate::ident::{content_id, insert_by_content};
use crate::types::*;
use ontoview_core::{Error, Result};

/// In-memory graph index built from node and edge records.
pub struct GraphStorage {
    nodes: IndexMap<String, NodeElement>,
    edges: IndexMap<String, EdgeElement>,
    label_to_id: HashMap<String, String>,
    /// Incident edge count per node, self-loops excluded.
    degree: HashMap<String, usize>,
    adjacency: HashMap<String, HashSet<String>>,
    incident_edges: HashMap<String, Vec<String>>,
    /// Nodes with at least one non-loop edge, in insertion order.
    connected: Vec<String>,
    node_label: TextFn,
    edge_label: TextFn,
    stats: GraphStats,
    rng: Mutex<StdRng>,
}

impl GraphStorage {
    /// Build the index. Extractor failures abort construction; edges with
    /// unresolved endpoints are skipped.
    pub fn new<NL, EL, EP>(
        nodes: &[Record],
        edges: &[Record],
        node_label: NL,
        edge_label: EL,
        endpoints: EP,
    ) -> Result<Self>
    where
        NL: Fn(&Record) -> Result<String> + Send + Sync + 'static,
        EL: Fn(&Record) -> Result<String> + Send + Sync + 'static,
        EP: Fn(&Record) -> Result<(String, String)>,
    {
        Self::with_rng(
            nodes,
            edges,
            node_label,
            edge_label,
            endpoints,
            StdRng::from_entropy(),
        )
    }

    /// Same as [`GraphStorage::new`] with an explicit random source for
    /// default-center selection.
    pub fn with_rng<NL, EL, EP>(
        nodes: &[Record],
        edges: &[Record],
        node_label: NL,
        edge_label: EL,
        endpoints: EP,
        rng: StdRng,
    ) -> Result<Self>
    where
        NL: Fn(&Record) -> Result<String> + Send + Sync + 'static,
        EL: Fn(&Record) -> Result<String> + Send + Sync + 'static,
        EP: Fn(&Record) -> Result<(String, String)>,
    {
        let mut store = Self {
            nodes: IndexMap::with_capacity(nodes.len()),
            edges: IndexMap::with_capacity(edges.len()),
            label_to_id: HashMap::with_capacity(nodes.len()),
            degree: HashMap::with_capacity(nodes.len()),
            adjacency: HashMap::with_capacity(nodes.len()),
            incident_edges: HashMap::with_capacity(nodes.len()),
            connected: Vec::new(),
            node_label: Arc::new(node_label),
            edge_label: Arc::new(edge_label),
            stats: GraphStats {
                total_nodes: 0,
                total_edges: 0,
                avg_degree: 0.0,
            },
            rng: Mutex::new(rng),
        };

        let mut pending_nodes: IndexMap<String, (String, &Record)> = IndexMap::with_capacity(nodes.len());
        for (index, record) in nodes.iter().enumerate() {
            let label = (store.node_label)(record).map_err(|e| Error::extractor("node", index, e))?;
            insert_by_content(&mut pending_nodes, content_id(record), (label, record), |n| n.1, "node");
        }
        for (id, (label, record)) in pending_nodes {
            store.insert_node(id, label, record);
        }

        let mut pending_edges: IndexMap<String, (String, String, String, &Record)> =
            IndexMap::with_capacity(edges.len());
        for (index, record) in edges.iter().enumerate() {
            let label = (store.edge_label)(record).map_err(|e| Error::extractor("edge", index, e))?;
            let (source_label, target_label) =
                endpoints(record).map_err(|e| Error::extractor("edge", index, e))?;
            insert_by_content(
                &mut pending_edges,
                content_id(record),
                (label, source_label, target_label, record),
                |e| e.3,
                "edge",
            );
        }
        for (id, (label, source_label, target_label, record)) in pending_edges {
            store.insert_edge(id, label, &source_label, &target_label, record);
        }

        store.connected = store
            .nodes
            .keys()
            .filter(|id| store.degree.get(*id).copied().unwrap_or(0) > 0)
            .cloned()
            .collect();
        store.stats = store.compute_stats();
        info!(
            "GraphStorage initialized: {} nodes, {} edges",
            store.nodes.len(),
            store.edges.len()
        );
        Ok(store)
    }

    fn insert_node(&mut self, id: String, label: String, record: &Record) {
        if let Some(previous) = self.label_to_id.insert(label.clone(), id.clone()) {
            warn!(
                "Node label {:?} is shared by {} and {}; edges will resolve to {}",
                label, previous, id, id
            );
        }
        self.degree.insert(id.clone(), 0);
        self.adjacency.insert(id.clone(), HashSet::new());
        self.incident_edges.insert(id.clone(), Vec::new());
        self.nodes.insert(
            id.clone(),
            NodeElement {
                id,
                data: ElementData {
                    label,
                    raw: record.clone(),
                },
                highlighted: None,
            },
        );
    }

    fn insert_edge(&mut self, id: String, label: String, source_label: &str, target_label: &str, record: &Record) {
        let (Some(source), Some(target)) = (
            self.label_to_id.get(source_label).cloned(),
            self.label_to_id.get(target_label).cloned(),
        ) else {
            warn!(
                "Edge references missing nodes: {} -> {}",
                source_label, target_label
            );
            return;
        };

        if source != target {
            *self.degree.entry(source.clone()).or_default() += 1;
            *self.degree.entry(target.clone()).or_default() += 1;
            self.incident_edges.entry(target.clone()).or_default().push(id.clone());
        }
        self.adjacency.entry(source.clone()).or_default().insert(target.clone());
        self.adjacency.entry(target.clone()).or_default().insert(source.clone());
        self.incident_edges.entry(source.clone()).or_default().push(id.clone());

        self.edges.insert(
            id.clone(),
            EdgeElement {
                id,
                source,
                target,
                data: ElementData {
                    label,
                    raw: record.clone(),
                },
                highlighted: None,
            },
        );
    }

    fn compute_stats(&self) -> GraphStats {
        GraphStats {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            avg_degree: mean(self.degree.values().sum(), self.nodes.len()),
        }
    }

    pub fn get_element(&self, element_id: &str) -> Option<Element> {
        if let Some(node) = self.nodes.get(element_id) {
            return Some(Element::Node(node.clone()));
        }
        self.edges
            .get(element_id)
            .map(|edge| Element::Edge(edge.clone()))
    }

    pub fn get_details(&self, element_id: &str) -> Option<Element> {
        self.get_element(element_id)
    }

    pub fn get_stats(&self) -> &GraphStats {
        &self.stats
    }

    /// Id of the node registered under `label`.
    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        self.label_to_id.get(label).map(String::as_str)
    }

    pub fn degree(&self, node_id: &str) -> Option<usize> {
        self.degree.get(node_id).copied()
    }

    /// Distinct nodes sharing an edge with `node_id`, in no particular order.
    /// A node with a self-loop lists itself.
    pub fn neighbors(&self, node_id: &str) -> Option<Vec<&str>> {
        self.adjacency
            .get(node_id)
            .map(|set| set.iter().map(String::as_str).collect())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeElement> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeElement> {
        self.edges.values()
    }

    /// Subgraph within `hops` edges of the given node or edge ids.
    ///
    /// With no ids, one non-isolated node is picked at random as the center
    /// and nothing is highlighted. Edge ids contribute both endpoints and
    /// the edge itself. Unknown ids are ignored.
    pub fn get_sample(&self, center_ids: &[String], hops: usize, highlight_center: bool) -> GraphSample {
        let seeds = if center_ids.is_empty() {
            match self.random_center() {
                Some(id) => vec![id],
                None => return GraphSample::default(),
            }
        } else {
            center_ids.to_vec()
        };
        let centers = CenterSet::new(center_ids.iter().cloned(), highlight_center);

        let mut visited_nodes: IndexSet<&str> = IndexSet::new();
        let mut visited_edges: IndexSet<&str> = IndexSet::new();

        for id in &seeds {
            if let Some(node) = self.nodes.get(id.as_str()) {
                visited_nodes.insert(&node.id);
            } else if let Some(edge) = self.edges.get(id.as_str()) {
                visited_edges.insert(&edge.id);
                visited_nodes.insert(&edge.source);
                visited_nodes.insert(&edge.target);
            } else {
                debug!("Center id {} not in graph", id);
            }
        }

        if visited_nodes.is_empty() {
            return GraphSample::default();
        }

        let mut frontier: Vec<&str> = visited_nodes.iter().copied().collect();
        for _ in 0..hops {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for node_id in frontier {
                for edge_id in self.incident_edges.get(node_id).into_iter().flatten() {
                    let Some(edge) = self.edges.get(edge_id.as_str()) else {
                        continue;
                    };
                    if !visited_edges.insert(&edge.id) {
                        continue;
                    }
                    let other = if edge.source == node_id {
                        edge.target.as_str()
                    } else {
                        edge.source.as_str()
                    };
                    if visited_nodes.insert(other) {
                        next.push(other);
                    }
                }
            }
            frontier = next;
        }

        let nodes: Vec<NodeElement> = visited_nodes
            .iter()
            .filter_map(|id| self.nodes.get(*id))
            .map(|node| centers.render(node))
            .collect();
        let edges: Vec<EdgeElement> = visited_edges
            .iter()
            .filter_map(|id| self.edges.get(*id))
            .map(|edge| centers.render(edge))
            .collect();

        info!("[GraphStorage] get_sample: {} nodes, {} edges", nodes.len(), edges.len());
        GraphSample { nodes, edges }
    }

    /// Sample around raw node and edge records, e.g. search results.
    ///
    /// Each record's id is re-derived from its content; records not in the
    /// store are logged and skipped.
    pub fn get_sample_from_data(
        &self,
        nodes: &[Record],
        edges: &[Record],
        hops: usize,
        highlight_center: bool,
    ) -> GraphSample {
        let mut ids = Vec::with_capacity(nodes.len() + edges.len());

        for record in nodes {
            let id = content_id(record);
            if self.nodes.contains_key(&id) {
                ids.push(id);
            } else {
                warn!("Node {} not found in graph", describe(&self.node_label, record, &id));
            }
        }
        for record in edges {
            let id = content_id(record);
            if self.edges.contains_key(&id) {
                ids.push(id);
            } else {
                warn!("Edge {} not found in graph", describe(&self.edge_label, record, &id));
            }
        }

        if ids.is_empty() {
            return GraphSample::default();
        }
        self.get_sample(&ids, hops, highlight_center)
    }

    pub fn get_all_nodes_paginated(&self, page: usize, page_size: usize) -> Page<PageEntry> {
        paginate(self.nodes.values(), self.nodes.len(), page, page_size, |n| {
            PageEntry::new(Element::Node(n.clone()), "node")
        })
    }

    pub fn get_all_edges_paginated(&self, page: usize, page_size: usize) -> Page<PageEntry> {
        paginate(self.edges.values(), self.edges.len(), page, page_size, |e| {
            PageEntry::new(Element::Edge(e.clone()), "edge")
        })
    }

    fn random_center(&self) -> Option<String> {
        self.connected.choose(&mut *self.rng.lock()).cloned()
    }
}

/// Label of a record for log messages, falling back to its id.
pub(crate) fn describe(label: &TextFn, record: &Record, id: &str) -> String {
    match label(record) {
        Ok(label) => format!("{:?} ({})", label, id),
        Err(_) => id.to_string(),
    }
}
