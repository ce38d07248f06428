//! Flat, insertion-ordered item list.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tracing::{info, warn};

use crate::extract::{Record, TextFn};
use crate::graph::describe;
use crate::highlight::CenterSet;
use crate::ident::{content_id, insert_by_content};
use crate::types::*;
use ontoview_core::{Error, Result, SampleDefaults};

pub struct ListStorage {
    /// Items keyed by id; map order is insertion order.
    items: IndexMap<String, NodeElement>,
    name_to_id: HashMap<String, String>,
    item_label: TextFn,
    window: usize,
    stats: ListStats,
}

impl ListStorage {
    pub fn new<L>(items: &[Record], item_label: L) -> Result<Self>
    where
        L: Fn(&Record) -> Result<String> + Send + Sync + 'static,
    {
        let mut store = Self {
            items: IndexMap::with_capacity(items.len()),
            name_to_id: HashMap::with_capacity(items.len()),
            item_label: Arc::new(item_label),
            window: SampleDefaults::LIST_WINDOW,
            stats: ListStats {
                total_items: 0,
                fields: 0,
            },
        };

        let mut pending: IndexMap<String, (String, &Record)> = IndexMap::with_capacity(items.len());
        for (index, record) in items.iter().enumerate() {
            let label = (store.item_label)(record).map_err(|e| Error::extractor("item", index, e))?;
            insert_by_content(&mut pending, content_id(record), (label, record), |i| i.1, "item");
        }
        for (id, (label, record)) in pending {
            if let Some(previous) = store.name_to_id.insert(label.clone(), id.clone()) {
                warn!("Item name {:?} is shared by {} and {}", label, previous, id);
            }
            store.items.insert(
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

        store.stats = ListStats {
            total_items: store.items.len(),
            fields: store
                .items
                .values()
                .next()
                .and_then(|item| item.data.raw.as_object())
                .map_or(0, |obj| obj.len()),
        };
        info!("ListStorage initialized: {} items", store.items.len());
        Ok(store)
    }

    /// Change how many items an unanchored sample returns.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn get_element(&self, element_id: &str) -> Option<Element> {
        self.items.get(element_id).map(|item| Element::Node(item.clone()))
    }

    pub fn get_details(&self, element_id: &str) -> Option<Element> {
        self.get_element(element_id)
    }

    pub fn get_stats(&self) -> &ListStats {
        &self.stats
    }

    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.name_to_id.get(name).map(String::as_str)
    }

    pub fn items(&self) -> impl Iterator<Item = &NodeElement> {
        self.items.values()
    }

    /// Without ids: the first `window` items in insertion order, unmarked.
    /// With ids: exactly those items, in the given order, unknown ids skipped.
    pub fn get_sample(&self, center_ids: &[String], highlight_center: bool) -> ListSample {
        let items: Vec<NodeElement> = if center_ids.is_empty() {
            self.items.values().take(self.window).cloned().collect()
        } else {
            let centers = CenterSet::new(center_ids.iter().cloned(), highlight_center);
            let wanted: IndexSet<&str> = center_ids.iter().map(String::as_str).collect();
            wanted
                .into_iter()
                .filter_map(|id| self.items.get(id))
                .map(|item| centers.render(item))
                .collect()
        };

        info!("[ListStorage] get_sample: {} items", items.len());
        ListSample { items }
    }

    /// Items matching raw records by content id.
    pub fn get_sample_from_data(&self, records: &[Record], highlight_center: bool) -> ListSample {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            let id = content_id(record);
            if self.items.contains_key(&id) {
                ids.push(id);
            } else {
                warn!("Item {} not found in list", describe(&self.item_label, record, &id));
            }
        }

        if ids.is_empty() {
            return ListSample::default();
        }
        self.get_sample(&ids, highlight_center)
    }

    /// Items matching display names, for callers that only kept labels.
    pub fn get_sample_from_names(&self, names: &[String], highlight_center: bool) -> ListSample {
        let ids: Vec<String> = names
            .iter()
            .filter_map(|name| match self.name_to_id.get(name) {
                Some(id) => Some(id.clone()),
                None => {
                    warn!("Item named {:?} not found in list", name);
                    None
                }
            })
            .collect();

        if ids.is_empty() {
            return ListSample::default();
        }
        self.get_sample(&ids, highlight_center)
    }

    pub fn get_all_items_paginated(&self, page: usize, page_size: usize) -> Page<PageEntry> {
        paginate(self.items.values(), self.items.len(), page, page_size, |item| {
            PageEntry::new(Element::Node(item.clone()), "item")
        })
    }
}
