//! Hypergraph store: hyperedges join any number of nodes.
//!
//! Expansion goes node → every hyperedge containing it → every member of
//! that hyperedge, so one hop reveals all co-members at once. Samples also
//! carry layout edges: each hyperedge is drawn as a star from its
//! lowest-degree member, since renderers only draw binary edges.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::extract::{Record, TextFn};
use crate::graph::describe;
use crate::highlight::CenterSet;
use crate::ident::{content_id, insert_by_content};
use crate::types::*;
use ontoview_core::{Error, Result};

pub struct HypergraphStorage {
    nodes: IndexMap<String, NodeElement>,
    hyperedges: IndexMap<String, HyperedgeElement>,
    label_to_id: HashMap<String, String>,
    /// Number of hyperedges containing each node.
    degree: HashMap<String, usize>,
    memberships: HashMap<String, HashSet<String>>,
    /// Nodes in at least one hyperedge, in insertion order.
    connected: Vec<String>,
    node_label: TextFn,
    hyperedge_label: TextFn,
    stats: HypergraphStats,
    rng: Mutex<StdRng>,
}

impl HypergraphStorage {
    pub fn new<NL, HL, HM>(
        nodes: &[Record],
        hyperedges: &[Record],
        node_label: NL,
        hyperedge_label: HL,
        members: HM,
    ) -> Result<Self>
    where
        NL: Fn(&Record) -> Result<String> + Send + Sync + 'static,
        HL: Fn(&Record) -> Result<String> + Send + Sync + 'static,
        HM: Fn(&Record) -> Result<Vec<String>>,
    {
        Self::with_rng(
            nodes,
            hyperedges,
            node_label,
            hyperedge_label,
            members,
            StdRng::from_entropy(),
        )
    }

    pub fn with_rng<NL, HL, HM>(
        nodes: &[Record],
        hyperedges: &[Record],
        node_label: NL,
        hyperedge_label: HL,
        members: HM,
        rng: StdRng,
    ) -> Result<Self>
    where
        NL: Fn(&Record) -> Result<String> + Send + Sync + 'static,
        HL: Fn(&Record) -> Result<String> + Send + Sync + 'static,
        HM: Fn(&Record) -> Result<Vec<String>>,
    {
        let mut store = Self {
            nodes: IndexMap::with_capacity(nodes.len()),
            hyperedges: IndexMap::with_capacity(hyperedges.len()),
            label_to_id: HashMap::with_capacity(nodes.len()),
            degree: HashMap::with_capacity(nodes.len()),
            memberships: HashMap::with_capacity(nodes.len()),
            connected: Vec::new(),
            node_label: Arc::new(node_label),
            hyperedge_label: Arc::new(hyperedge_label),
            stats: HypergraphStats {
                total_nodes: 0,
                total_hyperedges: 0,
                avg_node_degree: 0.0,
                avg_hyperedge_degree: 0.0,
            },
            rng: Mutex::new(rng),
        };

        let mut pending_nodes: IndexMap<String, (String, &Record)> = IndexMap::with_capacity(nodes.len());
        for (index, record) in nodes.iter().enumerate() {
            let label = (store.node_label)(record).map_err(|e| Error::extractor("node", index, e))?;
            insert_by_content(&mut pending_nodes, content_id(record), (label, record), |n| n.1, "node");
        }
        for (id, (label, record)) in pending_nodes {
            if let Some(previous) = store.label_to_id.insert(label.clone(), id.clone()) {
                warn!("Node label {:?} is shared by {} and {}", label, previous, id);
            }
            store.degree.insert(id.clone(), 0);
            store.memberships.insert(id.clone(), HashSet::new());
            store.nodes.insert(
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

        let mut pending_hyperedges: IndexMap<String, (String, Vec<String>, &Record)> =
            IndexMap::with_capacity(hyperedges.len());
        for (index, record) in hyperedges.iter().enumerate() {
            let label = (store.hyperedge_label)(record)
                .map_err(|e| Error::extractor("hyperedge", index, e))?;
            let member_labels = members(record).map_err(|e| Error::extractor("hyperedge", index, e))?;
            insert_by_content(
                &mut pending_hyperedges,
                content_id(record),
                (label, member_labels, record),
                |h| h.2,
                "hyperedge",
            );
        }
        for (id, (label, member_labels, record)) in pending_hyperedges {
            store.insert_hyperedge(id, label, &member_labels, record);
        }

        store.connected = store
            .nodes
            .keys()
            .filter(|id| store.degree.get(*id).copied().unwrap_or(0) > 0)
            .cloned()
            .collect();
        store.stats = store.compute_stats();
        info!(
            "HypergraphStorage initialized: {} nodes, {} hyperedges",
            store.nodes.len(),
            store.hyperedges.len()
        );
        Ok(store)
    }

    fn insert_hyperedge(&mut self, id: String, label: String, member_labels: &[String], record: &Record) {
        let mut linked: IndexSet<String> = IndexSet::with_capacity(member_labels.len());
        for member in member_labels {
            match self.label_to_id.get(member) {
                Some(node_id) => {
                    linked.insert(node_id.clone());
                }
                None => warn!("Hyperedge {:?} references missing node {:?}", label, member),
            }
        }
        if linked.is_empty() {
            warn!("Hyperedge has no valid nodes: {}", label);
            return;
        }

        for node_id in &linked {
            *self.degree.entry(node_id.clone()).or_default() += 1;
            self.memberships
                .entry(node_id.clone())
                .or_default()
                .insert(id.clone());
        }

        self.hyperedges.insert(
            id.clone(),
            HyperedgeElement {
                id,
                linked_nodes: linked.into_iter().collect(),
                data: ElementData {
                    label,
                    raw: record.clone(),
                },
                highlighted: None,
            },
        );
    }

    fn compute_stats(&self) -> HypergraphStats {
        let member_total = self.hyperedges.values().map(|h| h.linked_nodes.len()).sum();
        HypergraphStats {
            total_nodes: self.nodes.len(),
            total_hyperedges: self.hyperedges.len(),
            avg_node_degree: mean(self.degree.values().sum(), self.nodes.len()),
            avg_hyperedge_degree: mean(member_total, self.hyperedges.len()),
        }
    }

    pub fn get_element(&self, element_id: &str) -> Option<Element> {
        if let Some(node) = self.nodes.get(element_id) {
            return Some(Element::Node(node.clone()));
        }
        self.hyperedges
            .get(element_id)
            .map(|he| Element::Hyperedge(he.clone()))
    }

    pub fn get_details(&self, element_id: &str) -> Option<Element> {
        self.get_element(element_id)
    }

    pub fn get_stats(&self) -> &HypergraphStats {
        &self.stats
    }

    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        self.label_to_id.get(label).map(String::as_str)
    }

    pub fn degree(&self, node_id: &str) -> Option<usize> {
        self.degree.get(node_id).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeElement> {
        self.nodes.values()
    }

    pub fn hyperedges(&self) -> impl Iterator<Item = &HyperedgeElement> {
        self.hyperedges.values()
    }

    /// Sub-hypergraph within `hops` hyperedge steps of the given node or
    /// hyperedge ids, plus layout edges for every returned hyperedge.
    pub fn get_sample(&self, center_ids: &[String], hops: usize, highlight_center: bool) -> HypergraphSample {
        let seeds = if center_ids.is_empty() {
            match self.random_center() {
                Some(id) => vec![id],
                None => return HypergraphSample::default(),
            }
        } else {
            center_ids.to_vec()
        };
        let centers = CenterSet::new(center_ids.iter().cloned(), highlight_center);

        let mut visited_nodes: IndexSet<&str> = IndexSet::new();
        let mut visited_hyperedges: IndexSet<&str> = IndexSet::new();

        for id in &seeds {
            if let Some(node) = self.nodes.get(id.as_str()) {
                visited_nodes.insert(&node.id);
            } else if let Some(he) = self.hyperedges.get(id.as_str()) {
                visited_hyperedges.insert(&he.id);
                visited_nodes.extend(he.linked_nodes.iter().map(String::as_str));
            } else {
                debug!("Center id {} not in hypergraph", id);
            }
        }

        if visited_nodes.is_empty() {
            return HypergraphSample::default();
        }

        let mut frontier: Vec<&str> = visited_nodes.iter().copied().collect();
        for _ in 0..hops {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for node_id in frontier {
                let Some(containing) = self.memberships.get(node_id) else {
                    continue;
                };
                // Sets iterate in arbitrary order; follow insertion order instead.
                let mut containing: Vec<(usize, &HyperedgeElement)> = containing
                    .iter()
                    .filter_map(|he_id| self.hyperedges.get_full(he_id.as_str()))
                    .map(|(pos, _, he)| (pos, he))
                    .collect();
                containing.sort_unstable_by_key(|(pos, _)| *pos);

                for (_, he) in containing {
                    if !visited_hyperedges.insert(&he.id) {
                        continue;
                    }
                    for member in &he.linked_nodes {
                        if visited_nodes.insert(member) {
                            next.push(member.as_str());
                        }
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
        let hyperedges: Vec<HyperedgeElement> = visited_hyperedges
            .iter()
            .filter_map(|id| self.hyperedges.get(*id))
            .map(|he| centers.render(he))
            .collect();
        let edges = self.layout_edges(&hyperedges);

        info!(
            "[HypergraphStorage] get_sample: {} nodes, {} hyperedges, {} layout edges",
            nodes.len(),
            hyperedges.len(),
            edges.len()
        );
        HypergraphSample {
            nodes,
            edges,
            hyperedges,
        }
    }

    /// Star edges from each hyperedge's lowest-degree member (first one on
    /// ties) to every other member. Rebuilt on every call.
    pub fn layout_edges(&self, hyperedges: &[HyperedgeElement]) -> Vec<LayoutEdge> {
        let mut edges = Vec::new();
        for he in hyperedges {
            let Some(hub) = he
                .linked_nodes
                .iter()
                .min_by_key(|id| self.degree.get(id.as_str()).copied().unwrap_or(0))
            else {
                continue;
            };
            for member in he.linked_nodes.iter().filter(|m| *m != hub) {
                edges.push(LayoutEdge {
                    id: format!("{}:{}-{}", he.id, hub, member),
                    source: hub.clone(),
                    target: member.clone(),
                });
            }
        }
        edges
    }

    /// Sample around raw node and hyperedge records.
    pub fn get_sample_from_data(
        &self,
        nodes: &[Record],
        hyperedges: &[Record],
        hops: usize,
        highlight_center: bool,
    ) -> HypergraphSample {
        let mut ids = Vec::with_capacity(nodes.len() + hyperedges.len());

        for record in nodes {
            let id = content_id(record);
            if self.nodes.contains_key(&id) {
                ids.push(id);
            } else {
                warn!("Node {} not found in hypergraph", describe(&self.node_label, record, &id));
            }
        }
        for record in hyperedges {
            let id = content_id(record);
            if self.hyperedges.contains_key(&id) {
                ids.push(id);
            } else {
                warn!(
                    "Hyperedge {} not found in hypergraph",
                    describe(&self.hyperedge_label, record, &id)
                );
            }
        }

        if ids.is_empty() {
            return HypergraphSample::default();
        }
        self.get_sample(&ids, hops, highlight_center)
    }

    pub fn get_all_nodes_paginated(&self, page: usize, page_size: usize) -> Page<PageEntry> {
        paginate(self.nodes.values(), self.nodes.len(), page, page_size, |n| {
            PageEntry::new(Element::Node(n.clone()), "node")
        })
    }

    pub fn get_all_hyperedges_paginated(&self, page: usize, page_size: usize) -> Page<PageEntry> {
        paginate(self.hyperedges.values(), self.hyperedges.len(), page, page_size, |h| {
            PageEntry::new(Element::Hyperedge(h.clone()), "hyperedge")
        })
    }

    fn random_center(&self) -> Option<String> {
        self.connected.choose(&mut *self.rng.lock()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{field, members};
    use serde_json::json;

    fn build(nodes: &[&str], hyperedges: Vec<Record>) -> HypergraphStorage {
        let nodes: Vec<Record> = nodes.iter().map(|n| json!({"name": n})).collect();
        HypergraphStorage::with_rng(
            &nodes,
            &hyperedges,
            field("name"),
            field("title"),
            members("members"),
            StdRng::seed_from_u64(11),
        )
        .unwrap()
    }

    fn two_groups() -> HypergraphStorage {
        build(
            &["A", "B", "C", "D"],
            vec![
                json!({"title": "abc", "members": ["A", "B", "C"]}),
                json!({"title": "cd", "members": ["C", "D"]}),
            ],
        )
    }

    fn labels(sample: &HypergraphSample) -> Vec<String> {
        let mut out: Vec<String> = sample.nodes.iter().map(|n| n.data.label.clone()).collect();
        out.sort();
        out
    }

    fn id(store: &HypergraphStorage, label: &str) -> String {
        store.id_for_label(label).unwrap().to_string()
    }

    #[test]
    fn test_hop_reaches_all_co_members() {
        let store = two_groups();
        let a = vec![id(&store, "A")];

        let one = store.get_sample(&a, 1, false);
        assert_eq!(labels(&one), vec!["A", "B", "C"]);
        assert_eq!(one.hyperedges.len(), 1);

        let two = store.get_sample(&a, 2, false);
        assert_eq!(labels(&two), vec!["A", "B", "C", "D"]);
        assert_eq!(two.hyperedges.len(), 2);
    }

    #[test]
    fn test_membership_degree_and_stats() {
        let store = two_groups();
        assert_eq!(store.degree(&id(&store, "C")), Some(2));
        assert_eq!(store.degree(&id(&store, "A")), Some(1));

        let stats = store.get_stats();
        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.total_hyperedges, 2);
        assert!((stats.avg_node_degree - 1.25).abs() < 1e-9);
        assert!((stats.avg_hyperedge_degree - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_layout_edges_star_from_lowest_degree() {
        let store = two_groups();
        let sample = store.get_sample(&[id(&store, "A")], 2, false);
        let (a, c, d) = (id(&store, "A"), id(&store, "C"), id(&store, "D"));

        // abc: A and B have degree 1, C has 2 → hub is A (first minimum).
        // cd: D has degree 1 → hub is D.
        assert_eq!(sample.edges.len(), 3);
        assert!(sample.edges.iter().any(|e| e.source == a && e.target == c));
        assert!(sample.edges.iter().any(|e| e.source == d && e.target == c));
        assert!(sample.edges.iter().all(|e| e.source != e.target));

        let again = store.get_sample(&[id(&store, "A")], 2, false);
        assert_eq!(sample.edges, again.edges);
    }

    #[test]
    fn test_hyperedge_center_and_highlight() {
        let store = two_groups();
        let cd = store
            .hyperedges()
            .find(|h| h.data.label == "cd")
            .unwrap()
            .id
            .clone();
        let sample = store.get_sample(&[cd], 0, true);
        assert_eq!(labels(&sample), vec!["C", "D"]);
        assert_eq!(sample.hyperedges.len(), 1);
        assert_eq!(sample.hyperedges[0].highlighted, Some(true));
        assert!(sample.nodes.iter().all(|n| n.highlighted.is_none()));
    }

    #[test]
    fn test_unresolved_members_are_dropped() {
        let store = build(
            &["A", "B"],
            vec![
                json!({"title": "partial", "members": ["A", "ghost", "A"]}),
                json!({"title": "empty", "members": ["ghost", "phantom"]}),
            ],
        );
        assert_eq!(store.get_stats().total_hyperedges, 1);
        let partial = store.hyperedges().next().unwrap();
        assert_eq!(partial.linked_nodes, vec![id(&store, "A")]);
        assert_eq!(store.degree(&id(&store, "A")), Some(1));
    }

    #[test]
    fn test_default_center_and_empty_store() {
        let store = two_groups();
        let sample = store.get_sample(&[], 1, true);
        assert!(!sample.nodes.is_empty());
        assert!(sample.nodes.iter().all(|n| n.highlighted.is_none()));

        let empty = build(&[], vec![]);
        assert_eq!(empty.get_sample(&[], 2, false), HypergraphSample::default());
    }

    #[test]
    fn test_sample_from_data() {
        let store = two_groups();
        let sample = store.get_sample_from_data(
            &[json!({"name": "D"})],
            &[json!({"title": "missing", "members": []})],
            1,
            true,
        );
        assert_eq!(labels(&sample), vec!["C", "D"]);
        let d = sample.nodes.iter().find(|n| n.data.label == "D").unwrap();
        assert_eq!(d.highlighted, Some(true));
    }

    #[test]
    fn test_hyperedge_pagination() {
        let store = two_groups();
        let page = store.get_all_hyperedges_paginated(0, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].kind, "hyperedge");
        assert_eq!(page.items[0].label, "abc");
        assert!(page.has_next);
        assert!(!store.get_all_hyperedges_paginated(1, 1).has_next);
        assert_eq!(store.get_all_nodes_paginated(0, 30).total, 4);
    }

    #[test]
    fn test_zero_hops_node_center_is_alone() {
        let store = two_groups();
        let c = id(&store, "C");
        let sample = store.get_sample(&[c.clone()], 0, true);
        assert_eq!(sample.nodes.len(), 1);
        assert_eq!(sample.nodes[0].id, c);
        assert_eq!(sample.nodes[0].highlighted, Some(true));
        assert!(sample.hyperedges.is_empty());
        assert!(sample.edges.is_empty());
    }

    #[test]
    fn test_extractor_failure_propagates() {
        let nodes = vec![json!({"name": "A"}), json!({"name": "B"})];
        let hyperedges = vec![
            json!({"title": "ok", "members": ["A", "B"]}),
            json!({"title": "broken", "members": "A"}),
        ];
        let err = HypergraphStorage::new(
            &nodes,
            &hyperedges,
            field("name"),
            field("title"),
            members("members"),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::Extractor { kind: "hyperedge", index: 1, .. }));

        let unnamed = vec![json!({"name": "A"}), json!({"label": "B"})];
        let err = HypergraphStorage::new(
            &unnamed,
            &[],
            field("name"),
            field("title"),
            members("members"),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::Extractor { kind: "node", index: 1, .. }));
    }

    #[test]
    fn test_hyperedge_pages_reproduce_collection() {
        let names = ["A", "B", "C", "D", "E", "F"];
        let hyperedges: Vec<Record> = (0..5)
            .map(|i| {
                let (from, to) = (names[i], names[i + 1]);
                json!({"title": format!("h{i}"), "members": [from, to]})
            })
            .collect();
        let store = build(&names, hyperedges);

        let mut paged = Vec::new();
        for page in 0..3 {
            let p = store.get_all_hyperedges_paginated(page, 2);
            assert_eq!(p.total, 5);
            assert_eq!(p.has_next, page < 2);
            paged.extend(p.items.into_iter().map(|e| e.element.id().to_string()));
        }
        let stored: Vec<String> = store.hyperedges().map(|h| h.id.clone()).collect();
        assert_eq!(paged, stored);
        assert!(store.get_all_hyperedges_paginated(3, 2).items.is_empty());
    }

    #[test]
    fn test_colliding_ids_keep_last_record() {
        let first = json!({"name": "n47225"});
        let second = json!({"name": "n130938"});

        let store = build(
            &["n47225", "n130938", "Z"],
            vec![json!({"title": "t", "members": ["n130938", "Z"]})],
        );
        assert_eq!(store.get_stats().total_nodes, 2);
        assert!(store.id_for_label("n47225").is_none());
        let kept = store.id_for_label("n130938").unwrap();
        assert_eq!(store.degree(kept), Some(1));

        let nodes = vec![json!({"name": "A"}), json!({"name": "B"})];
        let all = |_: &Record| -> Result<Vec<String>> { Ok(vec!["A".into(), "B".into()]) };
        let hyperedges = vec![first, second.clone()];
        let store =
            HypergraphStorage::new(&nodes, &hyperedges, field("name"), field("name"), all).unwrap();
        assert_eq!(store.get_stats().total_hyperedges, 1);
        let he = store.hyperedges().next().unwrap();
        assert_eq!(he.data.raw, second);
        assert_eq!(store.degree(&id(&store, "A")), Some(1));
    }
}
