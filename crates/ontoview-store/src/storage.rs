//! A single handle over whichever store a visualization session holds.

use serde::{Deserialize, Serialize};

use crate::extract::Record;
use crate::types::*;
use crate::{GraphStorage, HypergraphStorage, ListStorage, NodeStorage};
use ontoview_core::{Error, Result, SampleDefaults};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Graph,
    Hypergraph,
    List,
    Nodes,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graph => write!(f, "graph"),
            Self::Hypergraph => write!(f, "hypergraph"),
            Self::List => write!(f, "list"),
            Self::Nodes => write!(f, "nodes"),
        }
    }
}

/// Sample of any store, serialized as that store's own shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Sample {
    Graph(GraphSample),
    Hypergraph(HypergraphSample),
    List(ListSample),
    Nodes(NodeSample),
}

impl Sample {
    /// Number of primary elements (nodes or items) in the sample.
    pub fn len(&self) -> usize {
        match self {
            Self::Graph(s) => s.nodes.len(),
            Self::Hypergraph(s) => s.nodes.len(),
            Self::List(s) => s.items.len(),
            Self::Nodes(s) => s.nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Stats {
    Graph(GraphStats),
    Hypergraph(HypergraphStats),
    List(ListStats),
    Nodes(NodeStats),
}

/// Raw records returned by a search or chat handler.
///
/// `records` are nodes (or list items); `relations` are edges or
/// hyperedges and are ignored by stores without relations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matches {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub relations: Vec<Record>,
}

impl Matches {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.relations.is_empty()
    }
}

pub enum Storage {
    Graph(GraphStorage),
    Hypergraph(HypergraphStorage),
    List(ListStorage),
    Nodes(NodeStorage),
}

impl Storage {
    pub fn kind(&self) -> StorageKind {
        match self {
            Self::Graph(_) => StorageKind::Graph,
            Self::Hypergraph(_) => StorageKind::Hypergraph,
            Self::List(_) => StorageKind::List,
            Self::Nodes(_) => StorageKind::Nodes,
        }
    }

    pub fn get_element(&self, element_id: &str) -> Option<Element> {
        match self {
            Self::Graph(s) => s.get_element(element_id),
            Self::Hypergraph(s) => s.get_element(element_id),
            Self::List(s) => s.get_element(element_id),
            Self::Nodes(s) => s.get_element(element_id),
        }
    }

    pub fn get_details(&self, element_id: &str) -> Option<Element> {
        match self {
            Self::Graph(s) => s.get_details(element_id),
            Self::Hypergraph(s) => s.get_details(element_id),
            Self::List(s) => s.get_details(element_id),
            Self::Nodes(s) => s.get_details(element_id),
        }
    }

    pub fn get_stats(&self) -> Stats {
        match self {
            Self::Graph(s) => Stats::Graph(s.get_stats().clone()),
            Self::Hypergraph(s) => Stats::Hypergraph(s.get_stats().clone()),
            Self::List(s) => Stats::List(s.get_stats().clone()),
            Self::Nodes(s) => Stats::Nodes(s.get_stats().clone()),
        }
    }

    /// Sample around ids. `defaults.hops` applies to graph and hypergraph
    /// stores, `defaults.node_sample_size` to node-only stores.
    pub fn get_sample(&self, center_ids: &[String], defaults: &SampleDefaults, highlight_center: bool) -> Sample {
        let hops = defaults.hops;
        match self {
            Self::Graph(s) => Sample::Graph(s.get_sample(center_ids, hops, highlight_center)),
            Self::Hypergraph(s) => Sample::Hypergraph(s.get_sample(center_ids, hops, highlight_center)),
            Self::List(s) => Sample::List(s.get_sample(center_ids, highlight_center)),
            Self::Nodes(s) => Sample::Nodes(s.get_sample(
                center_ids,
                defaults.node_sample_size,
                highlight_center,
            )),
        }
    }

    /// Sample around raw records, e.g. the output of a search handler.
    /// Fails only when a node-only store cannot extract an id.
    pub fn get_sample_from_data(
        &self,
        matches: &Matches,
        defaults: &SampleDefaults,
        highlight_center: bool,
    ) -> Result<Sample> {
        let hops = defaults.hops;
        let sample = match self {
            Self::Graph(s) => Sample::Graph(s.get_sample_from_data(
                &matches.records,
                &matches.relations,
                hops,
                highlight_center,
            )),
            Self::Hypergraph(s) => Sample::Hypergraph(s.get_sample_from_data(
                &matches.records,
                &matches.relations,
                hops,
                highlight_center,
            )),
            Self::List(s) => Sample::List(s.get_sample_from_data(&matches.records, highlight_center)),
            Self::Nodes(s) => Sample::Nodes(s.get_sample_from_data(
                &matches.records,
                defaults.node_sample_size,
                highlight_center,
            )?),
        };
        Ok(sample)
    }

    pub fn nodes_page(&self, page: usize, page_size: usize) -> Result<Page<PageEntry>> {
        match self {
            Self::Graph(s) => Ok(s.get_all_nodes_paginated(page, page_size)),
            Self::Hypergraph(s) => Ok(s.get_all_nodes_paginated(page, page_size)),
            Self::Nodes(s) => Ok(s.get_all_nodes_paginated(page, page_size)),
            Self::List(_) => Err(self.unsupported("nodes")),
        }
    }

    pub fn edges_page(&self, page: usize, page_size: usize) -> Result<Page<PageEntry>> {
        match self {
            Self::Graph(s) => Ok(s.get_all_edges_paginated(page, page_size)),
            _ => Err(self.unsupported("edges")),
        }
    }

    pub fn hyperedges_page(&self, page: usize, page_size: usize) -> Result<Page<PageEntry>> {
        match self {
            Self::Hypergraph(s) => Ok(s.get_all_hyperedges_paginated(page, page_size)),
            _ => Err(self.unsupported("hyperedges")),
        }
    }

    pub fn items_page(&self, page: usize, page_size: usize) -> Result<Page<PageEntry>> {
        match self {
            Self::List(s) => Ok(s.get_all_items_paginated(page, page_size)),
            _ => Err(self.unsupported("items")),
        }
    }

    /// Raw records whose label contains `needle` (case-insensitive), at
    /// most `limit` of each kind. Backs the built-in label search.
    pub fn find_by_label(&self, needle: &str, limit: usize) -> Matches {
        let needle = needle.to_lowercase();
        let hit = |label: &str| label.to_lowercase().contains(&needle);

        fn collect<'a, I>(iter: I, hit: &dyn Fn(&str) -> bool, limit: usize) -> Vec<Record>
        where
            I: Iterator<Item = &'a ElementData>,
        {
            iter.filter(|d| hit(&d.label))
                .take(limit)
                .map(|d| d.raw.clone())
                .collect()
        }

        match self {
            Self::Graph(s) => Matches {
                records: collect(s.nodes().map(|n| &n.data), &hit, limit),
                relations: collect(s.edges().map(|e| &e.data), &hit, limit),
            },
            Self::Hypergraph(s) => Matches {
                records: collect(s.nodes().map(|n| &n.data), &hit, limit),
                relations: collect(s.hyperedges().map(|h| &h.data), &hit, limit),
            },
            Self::List(s) => Matches {
                records: collect(s.items().map(|i| &i.data), &hit, limit),
                relations: Vec::new(),
            },
            Self::Nodes(s) => Matches {
                records: collect(s.nodes().map(|n| &n.data), &hit, limit),
                relations: Vec::new(),
            },
        }
    }

    fn unsupported(&self, what: &str) -> Error {
        Error::Unsupported(format!("{} listing on a {} visualization", what, self.kind()))
    }
}

impl From<GraphStorage> for Storage {
    fn from(s: GraphStorage) -> Self {
        Self::Graph(s)
    }
}

impl From<HypergraphStorage> for Storage {
    fn from(s: HypergraphStorage) -> Self {
        Self::Hypergraph(s)
    }
}

impl From<ListStorage> for Storage {
    fn from(s: ListStorage) -> Self {
        Self::List(s)
    }
}

impl From<NodeStorage> for Storage {
    fn from(s: NodeStorage) -> Self {
        Self::Nodes(s)
    }
}
