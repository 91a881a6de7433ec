// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

use super::selector::{children, Selector};
use super::Nodes;

/// One step of a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Applies the selectors to each incoming node
    Child(Vec<Selector>),
    /// Applies the selectors to each incoming node and all of its descendants, pre-order
    Descendant(Vec<Selector>),
}

impl Segment {
    pub fn child(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Segment::Child(selectors.into_iter().collect())
    }

    pub fn descendant(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Segment::Descendant(selectors.into_iter().collect())
    }

    pub fn selectors(&self) -> &[Selector] {
        match self {
            Segment::Child(selectors) | Segment::Descendant(selectors) => selectors,
        }
    }

    fn select<'a>(&'a self, node: &'a Value) -> Nodes<'a> {
        let selectors = self.selectors();
        match self {
            Segment::Child(_) => Box::new(selectors.iter().flat_map(move |s| s.select(node))),
            Segment::Descendant(_) => Box::new(
                descendants_and_self(node)
                    .flat_map(move |n| selectors.iter().flat_map(move |s| s.select(n))),
            ),
        }
    }
}

fn descendants_and_self(node: &Value) -> Nodes<'_> {
    Box::new(std::iter::once(node).chain(children(node).flat_map(descendants_and_self)))
}

/// An ordered list of segments applied one after another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Lazily selects every node the path reaches from `root`.
    pub fn select<'a>(&'a self, root: &'a Value) -> Nodes<'a> {
        let mut nodes: Nodes<'a> = Box::new(std::iter::once(root));
        for segment in &self.segments {
            nodes = Box::new(nodes.flat_map(move |node| segment.select(node)));
        }
        nodes
    }
}
