//! Highlighting: marking which returned elements were explicit matches.
//!
//! Stored elements are never touched. Every returned element is a clone,
//! and only clones whose id is in the center set get `highlighted: true`.

use std::collections::HashSet;

use crate::types::{EdgeElement, HyperedgeElement, NodeElement};

/// Elements that can carry the highlight flag.
pub trait Highlight: Clone {
    fn element_id(&self) -> &str;
    fn set_highlighted(&mut self);
}

impl Highlight for NodeElement {
    fn element_id(&self) -> &str {
        &self.id
    }
    fn set_highlighted(&mut self) {
        self.highlighted = Some(true);
    }
}

impl Highlight for EdgeElement {
    fn element_id(&self) -> &str {
        &self.id
    }
    fn set_highlighted(&mut self) {
        self.highlighted = Some(true);
    }
}

impl Highlight for HyperedgeElement {
    fn element_id(&self) -> &str {
        &self.id
    }
    fn set_highlighted(&mut self) {
        self.highlighted = Some(true);
    }
}

/// The seed ids of a sample query, and whether to mark them.
#[derive(Debug, Clone)]
pub struct CenterSet {
    ids: HashSet<String>,
    enabled: bool,
}

impl CenterSet {
    pub fn new<I, S>(ids: I, enabled: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: if enabled {
                ids.into_iter().map(Into::into).collect()
            } else {
                HashSet::new()
            },
            enabled,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.enabled && self.ids.contains(id)
    }

    /// Copy `element`, marking the copy if it is a center.
    pub fn render<T: Highlight>(&self, element: &T) -> T {
        let mut copy = element.clone();
        if self.contains(copy.element_id()) {
            copy.set_highlighted();
        }
        copy
    }
}
