//! Datasets loaded from JSON files or posted to `/api/visualize`.
//!
//! The `kind` tag selects the store; extractors are field names (or JSON
//! pointers starting with `/`) into each record.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use ontoview_core::{Result, SampleDefaults};
use ontoview_store::extract::{endpoints, field, members, Record, TextFn};
use ontoview_store::{GraphStorage, HypergraphStorage, ListStorage, NodeStorage, Storage};

fn label() -> String {
    "label".into()
}

fn source() -> String {
    "source".into()
}

fn target() -> String {
    "target".into()
}

fn member_list() -> String {
    "nodes".into()
}

fn id() -> String {
    "id".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Dataset {
    Graph {
        nodes: Vec<Record>,
        #[serde(default)]
        edges: Vec<Record>,
        #[serde(default = "label")]
        node_label: String,
        #[serde(default = "label")]
        edge_label: String,
        #[serde(default = "source")]
        source: String,
        #[serde(default = "target")]
        target: String,
    },
    Hypergraph {
        nodes: Vec<Record>,
        #[serde(default)]
        hyperedges: Vec<Record>,
        #[serde(default = "label")]
        node_label: String,
        #[serde(default = "label")]
        hyperedge_label: String,
        #[serde(default = "member_list")]
        members: String,
    },
    List {
        items: Vec<Record>,
        #[serde(default = "label")]
        item_label: String,
    },
    Nodes {
        nodes: Vec<Record>,
        #[serde(default = "id")]
        node_id: String,
        #[serde(default)]
        node_label: Option<String>,
    },
}

impl Dataset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let dataset = serde_json::from_str(&text)?;
        info!("Loaded dataset from {}", path.display());
        Ok(dataset)
    }

    /// Build the store this dataset describes.
    pub fn build(self, defaults: &SampleDefaults) -> Result<Storage> {
        let storage = match self {
            Dataset::Graph {
                nodes,
                edges,
                node_label,
                edge_label,
                source,
                target,
            } => GraphStorage::new(
                &nodes,
                &edges,
                field(node_label),
                field(edge_label),
                endpoints(source, target),
            )?
            .into(),
            Dataset::Hypergraph {
                nodes,
                hyperedges,
                node_label,
                hyperedge_label,
                members: member_field,
            } => HypergraphStorage::new(
                &nodes,
                &hyperedges,
                field(node_label),
                field(hyperedge_label),
                members(member_field),
            )?
            .into(),
            Dataset::List { items, item_label } => ListStorage::new(&items, field(item_label))?
                .with_window(defaults.list_window)
                .into(),
            Dataset::Nodes {
                nodes,
                node_id,
                node_label,
            } => {
                let label = node_label.map(|name| -> TextFn { Arc::new(field(name)) });
                NodeStorage::new(&nodes, field(node_id), label)?.into()
            }
        };
        Ok(storage)
    }
}
