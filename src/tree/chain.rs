// Copyright 2021 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! The [`NodeChain`] structure.

use arrayvec::ArrayVec;

use super::{DomainTree, NodeId};
use crate::name::{Name, NameComparison, MAX_N_LABELS};

/// A record of the path a search took through a
/// [`DomainTree`](super::DomainTree).
///
/// The chain holds one node per level, outermost level first: after a
/// search for `x.d.e.f.` that found the node `x.` below `d.e.f.`, the
/// chain is `[d.e.f., x.]`. It also remembers the node the search
/// compared against last and the outcome of that comparison, which
/// tells a caller where a failed search stopped.
///
/// A chain is filled in by
/// [`DomainTree::search_ext`](super::DomainTree::search_ext) and
/// [`DomainTree::first_node`](super::DomainTree::first_node), and
/// advanced by [`DomainTree::next_node`](super::DomainTree::next_node).
/// A chain passed to a search must be empty.
#[derive(Clone, Debug, Default)]
pub struct NodeChain {
    nodes: ArrayVec<NodeId, MAX_N_LABELS>,
    last_compared: Option<NodeId>,
    last_comparison: Option<NameComparison>,
}

impl NodeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the chain has no levels.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of levels in the chain.
    pub fn level_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the innermost node of the chain.
    pub fn top(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Returns the nodes in the chain, outermost first.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns the node the last search compared against last, if the
    /// search compared against anything.
    pub fn last_compared(&self) -> Option<NodeId> {
        self.last_compared
    }

    /// Returns the outcome of the last comparison of the last search.
    pub fn last_comparison(&self) -> Option<NameComparison> {
        self.last_comparison
    }

    /// Empties the chain so that it can be used for another search.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.last_compared = None;
        self.last_comparison = None;
    }

    /// Builds the absolute name of the innermost node by concatenating
    /// the names along the chain.
    pub fn absolute_name<T>(&self, tree: &DomainTree<T>) -> Option<Name> {
        let (&top, rest) = self.nodes.split_last()?;
        let mut name = tree[top].name().clone();
        for &id in rest.iter().rev() {
            name = name.concat(tree[id].name()).ok()?;
        }
        Some(name)
    }

    pub(super) fn push(&mut self, id: NodeId) {
        // The number of levels cannot exceed the number of labels in a
        // name, which the capacity covers.
        self.nodes.push(id);
    }

    pub(super) fn pop(&mut self) -> Option<NodeId> {
        self.nodes.pop()
    }

    pub(super) fn set_last(&mut self, id: NodeId, comparison: NameComparison) {
        self.last_compared = Some(id);
        self.last_comparison = Some(comparison);
    }
}
