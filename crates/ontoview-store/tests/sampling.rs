//! End-to-end sampling behavior through the `Storage` handle.

use std::collections::{HashMap, HashSet, VecDeque};

use ontoview_core::SampleDefaults;
use ontoview_store::extract::{endpoints, field, members};
use ontoview_store::{
    GraphStorage, HypergraphStorage, ListStorage, Matches, NodeStorage, Sample, Storage, StorageKind,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

fn hops(n: usize) -> SampleDefaults {
    SampleDefaults {
        hops: n,
        ..SampleDefaults::default()
    }
}

/// A ring of 12 planets with a few chords and one isolated planet.
fn trade_routes() -> GraphStorage {
    let nodes: Vec<Value> = (0..13).map(|i| json!({"planet": format!("p{i}")})).collect();
    let mut edges: Vec<Value> = (0..12)
        .map(|i| json!({"from": format!("p{i}"), "to": format!("p{}", (i + 1) % 12), "cargo": format!("ring{i}")}))
        .collect();
    edges.push(json!({"from": "p0", "to": "p6", "cargo": "chord-a"}));
    edges.push(json!({"from": "p3", "to": "p9", "cargo": "chord-b"}));
    GraphStorage::with_rng(
        &nodes,
        &edges,
        field("planet"),
        field("cargo"),
        endpoints("from", "to"),
        StdRng::seed_from_u64(42),
    )
    .unwrap()
}

/// Hop distance from `start` over stored edges.
fn distances(store: &GraphStorage, start: &str) -> HashMap<String, usize> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in store.edges() {
        adjacency.entry(&edge.source).or_default().push(&edge.target);
        adjacency.entry(&edge.target).or_default().push(&edge.source);
    }
    let mut dist = HashMap::from([(start.to_string(), 0)]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let d = dist[node];
        for next in adjacency.get(node).into_iter().flatten() {
            if !dist.contains_key(*next) {
                dist.insert(next.to_string(), d + 1);
                queue.push_back(*next);
            }
        }
    }
    dist
}

#[test]
fn graph_samples_stay_within_radius() {
    let graph = trade_routes();
    let p0 = graph.id_for_label("p0").unwrap().to_string();
    let dist = distances(&graph, &p0);
    let storage = Storage::from(graph);

    for k in 0..4 {
        let Sample::Graph(sample) = storage.get_sample(&[p0.clone()], &hops(k), false) else {
            panic!("expected a graph sample");
        };
        assert!(!sample.nodes.is_empty());
        for node in &sample.nodes {
            assert!(dist[&node.id] <= k, "{} is {} hops away", node.data.label, dist[&node.id]);
        }
        let ids: HashSet<&str> = sample.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &sample.edges {
            assert!(ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str()));
        }
        if k == 0 {
            assert_eq!(sample.nodes.len(), 1);
        }
    }
}

#[test]
fn graph_highlight_and_requery() {
    let storage = Storage::from(trade_routes());
    let Storage::Graph(graph) = &storage else {
        unreachable!()
    };
    let centers = vec![
        graph.id_for_label("p4").unwrap().to_string(),
        graph.edges().find(|e| e.data.label == "chord-b").unwrap().id.clone(),
    ];

    let first = storage.get_sample(&centers, &hops(1), true);
    let second = storage.get_sample(&centers, &hops(1), true);
    assert_eq!(first, second);

    let value = serde_json::to_value(&first).unwrap();
    for key in ["nodes", "edges"] {
        for element in value[key].as_array().unwrap() {
            let id = element["id"].as_str().unwrap();
            let marked = element.get("highlighted") == Some(&json!(true));
            assert_eq!(marked, centers.iter().any(|c| c == id), "{key} {id}");
        }
    }
}

#[test]
fn graph_default_center_is_seeded() {
    let a = Storage::from(trade_routes());
    let b = Storage::from(trade_routes());
    assert_eq!(a.get_sample(&[], &hops(1), false), b.get_sample(&[], &hops(1), false));
}

#[test]
fn hypergraph_scenario() {
    let nodes: Vec<Value> = ["A", "B", "C", "D"].iter().map(|n| json!({"name": n})).collect();
    let hyperedges = vec![
        json!({"paper": "p1", "authors": ["A", "B", "C"]}),
        json!({"paper": "p2", "authors": ["C", "D"]}),
    ];
    let store = HypergraphStorage::new(&nodes, &hyperedges, field("name"), field("paper"), members("authors"))
        .unwrap();
    let a = store.id_for_label("A").unwrap().to_string();
    let d = store.id_for_label("D").unwrap().to_string();
    let storage = Storage::from(store);
    assert_eq!(storage.kind(), StorageKind::Hypergraph);

    let Sample::Hypergraph(one) = storage.get_sample(&[a.clone()], &hops(1), false) else {
        panic!("expected a hypergraph sample");
    };
    assert_eq!(one.nodes.len(), 3);
    assert!(one.nodes.iter().all(|n| n.id != d));

    let Sample::Hypergraph(two) = storage.get_sample(&[a], &hops(2), false) else {
        panic!("expected a hypergraph sample");
    };
    assert_eq!(two.nodes.len(), 4);
    assert_eq!(two.hyperedges.len(), 2);
    // Stars over 3 and 2 members.
    assert_eq!(two.edges.len(), 3);
}

#[test]
fn list_scenario() {
    let items: Vec<Value> = (0..60).map(|i| json!({"dish": format!("dish {i}")})).collect();
    let storage = Storage::from(ListStorage::new(&items, field("dish")).unwrap());

    let Sample::List(sample) = storage.get_sample(&[], &SampleDefaults::default(), true) else {
        panic!("expected a list sample");
    };
    assert_eq!(sample.items.len(), 50);
    assert_eq!(sample.items[0].data.label, "dish 0");
    assert!(sample.items.iter().all(|i| i.highlighted.is_none()));

    let mut seen = Vec::new();
    let mut page = 0;
    loop {
        let p = storage.items_page(page, 25).unwrap();
        seen.extend(p.items.iter().map(|e| e.label.clone()));
        if !p.has_next {
            break;
        }
        page += 1;
    }
    assert_eq!(seen.len(), 60);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 60);
    assert!(storage.edges_page(0, 10).is_err());
}

#[test]
fn node_scenario() {
    let nodes: Vec<Value> = ["x1", "x2", "x3"].iter().map(|k| json!({"key": k})).collect();
    let storage = Storage::from(NodeStorage::new(&nodes, field("key"), None).unwrap());

    let Sample::Nodes(sample) = storage.get_sample(&["x1".to_string()], &SampleDefaults::default(), true)
    else {
        panic!("expected a node sample");
    };
    assert_eq!(sample.nodes.len(), 3);
    let x1 = sample.nodes.iter().find(|n| n.id == "x1").unwrap();
    assert_eq!(x1.highlighted, Some(true));
    assert!(sample.nodes.iter().filter(|n| n.id != "x1").all(|n| n.highlighted.is_none()));
}

#[test]
fn label_search_feeds_sample_from_data() {
    let storage = Storage::from(trade_routes());
    let matches = storage.find_by_label("chord-A", 5);
    assert!(matches.records.is_empty());
    assert_eq!(matches.relations.len(), 1);

    let sample = storage.get_sample_from_data(&matches, &hops(0), true).unwrap();
    let Sample::Graph(sample) = sample else {
        panic!("expected a graph sample");
    };
    assert_eq!(sample.nodes.len(), 2);
    assert_eq!(sample.edges.len(), 1);
    assert_eq!(sample.edges[0].highlighted, Some(true));

    let nothing = storage.get_sample_from_data(&Matches::default(), &hops(2), true).unwrap();
    assert!(nothing.is_empty());
}
