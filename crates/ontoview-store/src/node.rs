//! Node-only store: unrelated entities with caller-supplied ids.
//!
//! There is no structure to expand along, so a sample is the requested
//! nodes padded with random others up to a target size.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::extract::{default_label, Record, TextFn};
use crate::highlight::CenterSet;
use crate::types::*;
use ontoview_core::{Error, Result};

pub struct NodeStorage {
    nodes: IndexMap<String, NodeElement>,
    node_id: TextFn,
    stats: NodeStats,
    rng: Mutex<StdRng>,
}

impl NodeStorage {
    /// Build from records. Without a label extractor the label is derived
    /// from the id (`red_wine` → `Red Wine`).
    pub fn new<I>(nodes: &[Record], node_id: I, node_label: Option<TextFn>) -> Result<Self>
    where
        I: Fn(&Record) -> Result<String> + Send + Sync + 'static,
    {
        Self::with_rng(nodes, node_id, node_label, StdRng::from_entropy())
    }

    pub fn with_rng<I>(nodes: &[Record], node_id: I, node_label: Option<TextFn>, rng: StdRng) -> Result<Self>
    where
        I: Fn(&Record) -> Result<String> + Send + Sync + 'static,
    {
        let node_id: TextFn = Arc::new(node_id);
        let mut map = IndexMap::with_capacity(nodes.len());

        for (index, record) in nodes.iter().enumerate() {
            let id = node_id(record).map_err(|e| Error::extractor("node", index, e))?;
            let label = match &node_label {
                Some(extract) => extract(record).map_err(|e| Error::extractor("node", index, e))?,
                None => default_label(&id),
            };
            let element = NodeElement {
                id: id.clone(),
                data: ElementData {
                    label,
                    raw: record.clone(),
                },
                highlighted: None,
            };
            if map.insert(id.clone(), element).is_some() {
                warn!("Node id {} supplied more than once; keeping the last record", id);
            }
        }

        info!("NodeStorage initialized: {} nodes", map.len());
        Ok(Self {
            stats: NodeStats {
                total_nodes: map.len(),
            },
            nodes: map,
            node_id,
            rng: Mutex::new(rng),
        })
    }

    pub fn get_element(&self, element_id: &str) -> Option<Element> {
        self.nodes.get(element_id).map(|n| Element::Node(n.clone()))
    }

    pub fn get_details(&self, element_id: &str) -> Option<Element> {
        self.get_element(element_id)
    }

    pub fn get_stats(&self) -> &NodeStats {
        &self.stats
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeElement> {
        self.nodes.values()
    }

    /// Valid `center_ids` first (in given order), then random other nodes
    /// until `n_nodes` is reached or the store runs out. Centers are always
    /// kept, even when there are more than `n_nodes` of them.
    pub fn get_sample(&self, center_ids: &[String], n_nodes: usize, highlight_center: bool) -> NodeSample {
        let centers = CenterSet::new(center_ids.iter().cloned(), highlight_center);

        let chosen: IndexSet<usize> = center_ids
            .iter()
            .filter_map(|id| self.nodes.get_index_of(id.as_str()))
            .collect();

        let mut picked: Vec<usize> = chosen.iter().copied().collect();
        let wanted = n_nodes.saturating_sub(picked.len());
        if wanted > 0 {
            let pool: Vec<usize> = (0..self.nodes.len()).filter(|i| !chosen.contains(i)).collect();
            let take = wanted.min(pool.len());
            let mut rng = self.rng.lock();
            picked.extend(index::sample(&mut *rng, pool.len(), take).into_iter().map(|i| pool[i]));
        }

        let nodes: Vec<NodeElement> = picked
            .into_iter()
            .filter_map(|i| self.nodes.get_index(i))
            .map(|(_, node)| centers.render(node))
            .collect();

        info!("[NodeStorage] get_sample: {} nodes", nodes.len());
        NodeSample { nodes }
    }

    /// Sample anchored on raw records, resolved through the id extractor.
    /// Unknown ids are skipped; an extractor failure is an error.
    pub fn get_sample_from_data(
        &self,
        records: &[Record],
        n_nodes: usize,
        highlight_center: bool,
    ) -> Result<NodeSample> {
        let mut ids = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let id = (self.node_id)(record).map_err(|e| Error::extractor("node", index, e))?;
            if self.nodes.contains_key(&id) {
                ids.push(id);
            } else {
                warn!("Node {} not found in node set", id);
            }
        }

        if ids.is_empty() {
            return Ok(NodeSample::default());
        }
        Ok(self.get_sample(&ids, n_nodes, highlight_center))
    }

    pub fn get_all_nodes_paginated(&self, page: usize, page_size: usize) -> Page<PageEntry> {
        paginate(self.nodes.values(), self.nodes.len(), page, page_size, |n| {
            PageEntry::new(Element::Node(n.clone()), "node")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::field;
    use serde_json::json;
    use std::collections::HashSet;

    fn pantry(n: usize) -> NodeStorage {
        let nodes: Vec<Record> = (0..n)
            .map(|i| json!({"key": format!("x{i}"), "name": format!("Spice {i}")}))
            .collect();
        NodeStorage::with_rng(
            &nodes,
            field("key"),
            Some(Arc::new(field("name"))),
            StdRng::seed_from_u64(3),
        )
        .unwrap()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pool_exhausted_returns_everything() {
        let store = pantry(3);
        let sample = store.get_sample(&ids(&["x1"]), 10, true);
        assert_eq!(sample.nodes.len(), 3);
        assert_eq!(sample.nodes[0].id, "x1");
        for node in &sample.nodes {
            assert_eq!(node.highlighted == Some(true), node.id == "x1");
        }
    }

    #[test]
    fn test_fill_to_target_without_duplicates() {
        let store = pantry(40);
        let sample = store.get_sample(&ids(&["x5", "missing", "x7", "x5"]), 10, false);
        assert_eq!(sample.nodes.len(), 10);
        assert_eq!(sample.nodes[0].id, "x5");
        assert_eq!(sample.nodes[1].id, "x7");
        let unique: HashSet<&str> = sample.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(unique.len(), 10);
        assert!(sample.nodes.iter().all(|n| n.highlighted.is_none()));
    }

    #[test]
    fn test_centers_kept_beyond_target() {
        let store = pantry(10);
        let sample = store.get_sample(&ids(&["x1", "x2", "x3"]), 2, true);
        assert_eq!(sample.nodes.len(), 3);
    }

    #[test]
    fn test_default_labels_from_id() {
        let nodes = vec![json!({"key": "smoked_paprika"})];
        let store = NodeStorage::new(&nodes, field("key"), None).unwrap();
        let Some(Element::Node(node)) = store.get_element("smoked_paprika") else {
            panic!("node missing");
        };
        assert_eq!(node.data.label, "Smoked Paprika");
    }

    #[test]
    fn test_sample_from_data() {
        let store = pantry(5);
        let hits = vec![json!({"key": "x4"}), json!({"key": "x99"})];
        let sample = store.get_sample_from_data(&hits, 1, true).unwrap();
        assert_eq!(sample.nodes.len(), 1);
        assert_eq!(sample.nodes[0].id, "x4");
        assert_eq!(sample.nodes[0].highlighted, Some(true));

        let none = store.get_sample_from_data(&[json!({"key": "x99"})], 3, true).unwrap();
        assert!(none.nodes.is_empty());
    }

    #[test]
    fn test_sample_from_data_extractor_failure() {
        let store = pantry(5);
        let hits = vec![json!({"key": "x1"}), json!({"wrong": 1})];
        let err = store.get_sample_from_data(&hits, 10, true).unwrap_err();
        assert!(matches!(err, Error::Extractor { kind: "node", index: 1, .. }));
    }

    #[test]
    fn test_pagination_and_stats() {
        let store = pantry(5);
        assert_eq!(store.get_stats().total_nodes, 5);
        let page = store.get_all_nodes_paginated(1, 2);
        let ids: Vec<&str> = page.items.iter().map(|e| e.element.id()).collect();
        assert_eq!(ids, vec!["x2", "x3"]);
        assert!(page.has_next);
    }
}
