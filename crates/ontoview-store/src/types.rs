//! Element, sample, page and statistics types returned by the stores.
//!
//! These are plain serializable shapes: `id`, `data.label`, `data.raw` and
//! an optional `highlighted` flag. No store-internal structure leaks out.

use serde::{Deserialize, Serialize};

use crate::extract::Record;

/// Display label plus the record the element was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementData {
    pub label: String,
    pub raw: Record,
}

/// A node (also used for list items).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeElement {
    pub id: String,
    pub data: ElementData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<bool>,
}

/// A pairwise edge between two stored nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeElement {
    pub id: String,
    pub source: String,
    pub target: String,
    pub data: ElementData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<bool>,
}

/// An edge joining any number of stored nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperedgeElement {
    pub id: String,
    pub linked_nodes: Vec<String>,
    pub data: ElementData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<bool>,
}

/// Synthetic binary edge derived from a hyperedge for force layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Any stored element, as returned by id lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Element {
    Hyperedge(HyperedgeElement),
    Edge(EdgeElement),
    Node(NodeElement),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Self::Node(n) => &n.id,
            Self::Edge(e) => &e.id,
            Self::Hyperedge(h) => &h.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Node(n) => &n.data.label,
            Self::Edge(e) => &e.data.label,
            Self::Hyperedge(h) => &h.data.label,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSample {
    pub nodes: Vec<NodeElement>,
    pub edges: Vec<EdgeElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HypergraphSample {
    pub nodes: Vec<NodeElement>,
    /// Layout edges only; the semantic relations are in `hyperedges`.
    pub edges: Vec<LayoutEdge>,
    pub hyperedges: Vec<HyperedgeElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSample {
    pub items: Vec<NodeElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSample {
    pub nodes: Vec<NodeElement>,
}

/// One row of a paginated listing: the element plus `label` and `type`
/// at the root for the renderer's table view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageEntry {
    #[serde(flatten)]
    pub element: Element,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl PageEntry {
    pub fn new(element: Element, kind: &'static str) -> Self {
        Self {
            label: element.label().to_string(),
            element,
            kind,
        }
    }
}

/// A page of a stable, insertion-ordered listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub has_next: bool,
}

/// Slice `[page * page_size, page * page_size + page_size)` out of an
/// ordered sequence of `total` elements. Only the sliced elements are
/// passed to `render`.
pub fn paginate<I, S, T, F>(iter: I, total: usize, page: usize, page_size: usize, render: F) -> Page<T>
where
    I: IntoIterator<Item = S>,
    F: FnMut(S) -> T,
{
    let start = page.saturating_mul(page_size);
    let end = start.saturating_add(page_size);
    let items = iter.into_iter().skip(start).take(page_size).map(render).collect();
    Page {
        items,
        page,
        page_size,
        total,
        has_next: end < total,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub avg_degree: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypergraphStats {
    pub total_nodes: usize,
    pub total_hyperedges: usize,
    pub avg_node_degree: f64,
    pub avg_hyperedge_degree: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListStats {
    pub total_items: usize,
    /// Field count of the first item's raw object.
    pub fields: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    pub total_nodes: usize,
}

/// Divide, reporting 0 for an empty denominator.
pub(crate) fn mean(sum: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
