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

//! Implementation of the [`DomainTree`] data structure.
//!
//! A `DomainTree` is a tree of red-black trees. Each red-black tree is
//! a *level* holding names that share the same parent suffix, and each
//! node of a level can own the root of the next level down. For
//! instance, after inserting `a.`, `b.`, `x.d.e.f.` and `z.d.e.f.`,
//! the top level holds `a.`, `b.`, and `d.e.f.`, and the level below
//! `d.e.f.` holds `x.` and `z.`:
//!
//! ```text
//!         b
//!       /   \
//!      a   d.e.f
//!            |
//!            x
//!             \
//!              z
//! ```
//!
//! Nodes are stored in an arena and referred to by [`NodeId`]s, so the
//! parent links within a level do not create ownership cycles.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::{ControlFlow, Index, IndexMut};

use log::{debug, trace};
use slab::Slab;

use crate::name::{Name, NameRelation};

mod chain;
mod error;
mod node;
mod rbtree;
pub use chain::NodeChain;
pub use error::Error;
pub use node::{Color, Node, NodeFlags, NodeId};

/// The number of spaces each level of [`DomainTree::dump`] output is
/// indented by.
const DUMP_INDENT: usize = 5;

////////////////////////////////////////////////////////////////////////
// SEARCH RESULTS                                                     //
////////////////////////////////////////////////////////////////////////

/// The outcome of a [`DomainTree::search`] or
/// [`DomainTree::search_ext`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SearchResult {
    /// The node for the name itself was found.
    ExactMatch(NodeId),

    /// The name is not in the tree, but the given node is its closest
    /// enclosing name.
    PartialMatch(NodeId),

    /// Neither the name nor any of its superdomains is in the tree.
    NotFound,
}

impl SearchResult {
    /// Returns the node found, if any.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::ExactMatch(id) | Self::PartialMatch(id) => Some(id),
            Self::NotFound => None,
        }
    }
}

/// The type of callback accepted by [`DomainTree::search_ext`].
pub type Callback<'a, T> = dyn FnMut(NodeId, &Node<T>) -> bool + 'a;

////////////////////////////////////////////////////////////////////////
// DOMAIN TREE                                                        //
////////////////////////////////////////////////////////////////////////

/// A tree of domain names with data of type `T` attached to them.
///
/// Names without data may exist in the tree as *structural* nodes.
/// They arise when a name is needed only to hold names below it, for
/// instance when `x.d.e.f.` and `z.d.e.f.` are inserted, or when a name
/// with data is removed but names below it remain. Whether structural
/// nodes can be found by searches and traversals is decided by the
/// `return_empty_node` policy given to [`DomainTree::new`].
///
/// The tree performs no synchronization. Searches take `&self` and
/// modifications take `&mut self`; a reader that needs a stable view
/// while a writer rebuilds can work on a [`DomainTree::clone_with`]
/// copy.
#[derive(Clone)]
pub struct DomainTree<T> {
    nodes: Slab<Node<T>>,
    root: Option<NodeId>,
    return_empty_node: bool,
}

impl<T> DomainTree<T> {
    /// Creates a new, empty `DomainTree`. If `return_empty_node` is
    /// false, structural nodes are hidden from searches and traversals.
    pub fn new(return_empty_node: bool) -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
            return_empty_node,
        }
    }

    /// Returns the number of nodes in the tree, including structural
    /// nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn return_empty_node(&self) -> bool {
        self.return_empty_node
    }

    /// Returns the node identified by `id`, if it is in the tree.
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.nodes.get_mut(id.0)
    }

    /// Removes all nodes from the tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Returns whether searches and traversals may report `node`.
    fn is_visible(&self, node: &Node<T>) -> bool {
        self.return_empty_node || !node.is_empty()
    }

    ////////////////////////////////////////////////////////////////////
    // SEARCH                                                         //
    ////////////////////////////////////////////////////////////////////

    /// Looks up `name`. See [`DomainTree::search_ext`].
    pub fn search(&self, name: &Name) -> SearchResult {
        let mut chain = NodeChain::new();
        // A fresh chain is always empty, and subtracting the name of a
        // node the search name is a subdomain of cannot fail, so
        // search_ext has no error to report here.
        self.search_ext(name, &mut chain, None)
            .unwrap_or(SearchResult::NotFound)
    }

    /// Looks up `name`, recording the path taken in `chain`, which must
    /// be empty.
    ///
    /// On an exact match, the chain ends with the node found. Otherwise
    /// it holds the nodes of the levels the search descended through,
    /// the last of which is the partial match, if any. Structural nodes
    /// are never reported as matches unless the tree returns empty
    /// nodes, but they still appear in the chain.
    ///
    /// If a `callback` is given, it is invoked for each node with the
    /// [`NodeFlags::CALLBACK`] flag that the search passes on the way
    /// to a more specific name. If it returns true, the search stops
    /// there and reports that node as a partial match. This can be used
    /// to stop at zone cuts.
    pub fn search_ext(
        &self,
        name: &Name,
        chain: &mut NodeChain,
        mut callback: Option<&mut Callback<T>>,
    ) -> Result<SearchResult, Error> {
        if !chain.is_empty() {
            return Err(Error::InvalidArgument);
        }

        let mut name = Cow::Borrowed(name);
        let mut current = self.root;
        let mut result = SearchResult::NotFound;
        while let Some(id) = current {
            let node = &self[id];
            let comparison = name.compare(&node.name);
            chain.set_last(id, comparison);

            if comparison.relation == NameRelation::Equal {
                if self.is_visible(node) {
                    chain.push(id);
                    result = SearchResult::ExactMatch(id);
                }
                break;
            } else if comparison.common_label_count == 1 && !node.name.is_root() {
                current = match comparison.order {
                    Ordering::Less => node.left,
                    _ => node.right,
                };
            } else if comparison.relation == NameRelation::SubDomain {
                if self.is_visible(node) {
                    result = SearchResult::PartialMatch(id);
                    if node.flag(NodeFlags::CALLBACK) {
                        if let Some(callback) = callback.as_deref_mut() {
                            if callback(id, node) {
                                break;
                            }
                        }
                    }
                }
                chain.push(id);
                name = Cow::Owned(name.subtract(&node.name)?);
                current = node.down;
            } else {
                break;
            }
        }
        Ok(result)
    }

    ////////////////////////////////////////////////////////////////////
    // INSERTION                                                      //
    ////////////////////////////////////////////////////////////////////

    /// Inserts `name` into the tree, returning its node.
    ///
    /// If the name is already in the tree as a structural node, that
    /// node is returned. If it is already in the tree with data,
    /// [`Error::AlreadyExists`] is returned with the existing node.
    ///
    /// Insertion may split an existing node whose name shares more than
    /// the root with `name`: inserting `k.e.f.` next to `d.e.f.` turns
    /// `d.e.f.` into a structural `e.f.` with `d.` and `k.` below it.
    /// The node that held `d.e.f.` keeps its [`NodeId`] but now holds
    /// `e.f.`, while the data and flags move to the new `d.` node.
    pub fn insert(&mut self, name: &Name) -> Result<NodeId, Error> {
        if name.is_root() {
            return self.insert_root();
        }

        let mut name = name.clone();
        let mut upper = None;
        let mut parent = None;
        let mut order = Ordering::Less;
        let mut current = self.root;
        while let Some(id) = current {
            let comparison = name.compare(&self[id].name);
            match comparison.relation {
                NameRelation::Equal => {
                    return if self[id].is_empty() {
                        Ok(id)
                    } else {
                        Err(Error::AlreadyExists(id))
                    };
                }
                NameRelation::SubDomain => {
                    upper = Some(id);
                    parent = None;
                    name = name.subtract(&self[id].name)?;
                    current = self[id].down;
                }
                _ if comparison.common_label_count > 1 => {
                    let common = comparison.common_label_count;
                    let base = name.split(name.label_count() - common, common)?;
                    self.node_fission(id, base)?;
                }
                _ => {
                    parent = Some(id);
                    order = comparison.order;
                    current = match order {
                        Ordering::Less => self[id].left,
                        _ => self[id].right,
                    };
                }
            }
        }

        let mut node = Node::new(name);
        node.parent = parent;
        let id = NodeId(self.nodes.insert(node));
        match parent {
            None => {
                self[id].color = Color::Black;
                match upper {
                    Some(upper) => self[upper].down = Some(id),
                    None => self.root = Some(id),
                }
            }
            Some(parent) if order == Ordering::Less => self[parent].left = Some(id),
            Some(parent) => self[parent].right = Some(id),
        }
        self.insert_rebalance(upper, id)?;
        trace!("Created domain tree node {:?} for {}", id, self[id].name);
        Ok(id)
    }

    /// Inserts `name` and attaches `data` to it. Fails with
    /// [`Error::AlreadyExists`] if the name already has data.
    pub fn insert_data(&mut self, name: &Name, data: T) -> Result<NodeId, Error> {
        let id = self.insert(name)?;
        self[id].data = Some(data);
        Ok(id)
    }

    /// Inserts the root name. The root gets a level of its own above
    /// everything else: the current top level moves below it.
    fn insert_root(&mut self) -> Result<NodeId, Error> {
        if let Some(root) = self.root.filter(|&r| self[r].name.is_root()) {
            return if self[root].is_empty() {
                Ok(root)
            } else {
                Err(Error::AlreadyExists(root))
            };
        }

        let mut node = Node::new(Name::root());
        node.color = Color::Black;
        node.down = self.root;
        let id = NodeId(self.nodes.insert(node));
        self.root = Some(id);
        trace!("Created domain tree root node {:?}", id);
        Ok(id)
    }

    /// Splits the node `id` so that it holds only `base`, a suffix of
    /// its name. A new node for the rest of the name becomes the root
    /// of the level below it and takes over the data, flags, and lower
    /// level of `id`.
    fn node_fission(&mut self, id: NodeId, base: Name) -> Result<(), Error> {
        let old = &mut self[id];
        let mut down = Node::new(old.name.subtract(&base)?);
        down.color = Color::Black;
        down.data = old.data.take();
        down.flags = std::mem::take(&mut old.flags);
        down.down = old.down;
        old.name = base;
        let down_id = NodeId(self.nodes.insert(down));
        self[id].down = Some(down_id);
        trace!(
            "Split domain tree node {:?} into {} above {}",
            id,
            self[id].name,
            self[down_id].name
        );
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////
    // REMOVAL                                                        //
    ////////////////////////////////////////////////////////////////////

    /// Removes the data of `name` from the tree.
    ///
    /// If the name has names below it, its node stays as a structural
    /// node. Otherwise the node is deleted, and so is every node above
    /// it that is left without data and without names below it.
    pub fn remove(&mut self, name: &Name) -> Result<(), Error> {
        let mut chain = NodeChain::new();
        let mut id = match self.search_ext(name, &mut chain, None)? {
            SearchResult::ExactMatch(id) => id,
            _ => return Err(Error::NotFound),
        };

        if self[id].down.is_some() {
            self[id].data = None;
            return Ok(());
        }

        loop {
            chain.pop();
            let upper = chain.top();
            self.unlink(upper, id)?;
            match upper {
                Some(upper) if self[upper].down.is_none() && self[upper].is_empty() => {
                    trace!("Collapsing structural domain tree node {:?}", upper);
                    id = upper;
                }
                _ => break,
            }
        }
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////
    // TRAVERSAL                                                      //
    ////////////////////////////////////////////////////////////////////

    /// Positions `chain`, which must be empty, on the first node of the
    /// tree in hierarchical order and returns that node.
    pub fn first_node(&self, chain: &mut NodeChain) -> Result<Option<NodeId>, Error> {
        if !chain.is_empty() {
            return Err(Error::InvalidArgument);
        }
        Ok(self.root.map(|root| {
            let first = self.leftmost(root);
            chain.push(first);
            first
        }))
    }

    /// Advances `chain` to the next node in hierarchical order and
    /// returns it.
    ///
    /// A name comes before the names below it, and those come before
    /// the next name of the same level. Every node is visited,
    /// including structural nodes. Returns `None` once the end of the
    /// tree is reached, or if `chain` is empty.
    pub fn next_node(&self, chain: &mut NodeChain) -> Option<NodeId> {
        let id = chain.top()?;
        if let Some(down) = self[id].down {
            let next = self.leftmost(down);
            chain.push(next);
            return Some(next);
        }

        chain.pop();
        if let Some(next) = self.successor(id) {
            chain.push(next);
            return Some(next);
        }

        // Move up one level at a time until a level has a successor.
        while let Some(up) = chain.pop() {
            if let Some(next) = self.successor(up) {
                chain.push(next);
                return Some(next);
            }
        }
        None
    }

    /// Returns an iterator over the visible nodes of the tree and their
    /// absolute names, in hierarchical order.
    pub fn iter(&self) -> Iter<T> {
        Iter::new(self)
    }

    /// Walks the subtree rooted at `start` (including the levels below
    /// it), visiting each node before its left subtree, its right
    /// subtree, and its lower level. Only visible nodes are passed to
    /// `visit`.
    fn walk<B, F>(&self, start: Option<NodeId>, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(NodeId, &Node<T>) -> ControlFlow<B>,
    {
        let mut stack: Vec<NodeId> = start.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self[id];
            if self.is_visible(node) {
                visit(id, node)?;
            }
            stack.extend([node.down, node.right, node.left].into_iter().flatten());
        }
        ControlFlow::Continue(())
    }

    /// Calls `f` on every visible node.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(NodeId, &Node<T>),
    {
        self.all(|id, node| {
            f(id, node);
            true
        });
    }

    /// Calls `f` on every visible node along with its absolute name.
    pub fn for_each_with_name<F>(&self, mut f: F) -> Result<(), Error>
    where
        F: FnMut(&Name, NodeId, &Node<T>),
    {
        // Each stack entry refers to the absolute name of the node that
        // owns its level.
        let mut suffixes = vec![Name::root()];
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 0)).into_iter().collect();
        while let Some((id, suffix)) = stack.pop() {
            let node = &self[id];
            let name = node.name.concat(&suffixes[suffix])?;
            if self.is_visible(node) {
                f(&name, id, node);
            }
            if let Some(down) = node.down {
                suffixes.push(name);
                stack.push((down, suffixes.len() - 1));
            }
            stack.extend(
                [node.right, node.left]
                    .into_iter()
                    .flatten()
                    .map(|child| (child, suffix)),
            );
        }
        Ok(())
    }

    /// Returns whether `f` holds for every visible node. Stops at the
    /// first node for which it does not.
    pub fn all<F>(&self, mut f: F) -> bool
    where
        F: FnMut(NodeId, &Node<T>) -> bool,
    {
        self.walk(self.root, |id, node| {
            if f(id, node) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        })
        .is_continue()
    }

    /// Returns whether `f` holds for any visible node. Stops at the
    /// first node for which it does.
    pub fn any<F>(&self, mut f: F) -> bool
    where
        F: FnMut(NodeId, &Node<T>) -> bool,
    {
        self.walk(self.root, |id, node| {
            if f(id, node) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break()
    }

    /// Returns whether any name below the node `id` has data, which
    /// makes the node's name an empty non-terminal or a delegation
    /// point with live names below it.
    pub fn is_node_non_terminal(&self, id: NodeId) -> bool {
        self.walk(self[id].down, |_, node| {
            if node.is_empty() {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        })
        .is_break()
    }

    ////////////////////////////////////////////////////////////////////
    // MAINTENANCE                                                    //
    ////////////////////////////////////////////////////////////////////

    /// Returns whether `node` is a structural node with nothing below
    /// it.
    fn is_empty_leaf(node: &Node<T>) -> bool {
        node.is_empty() && node.down.is_none()
    }

    /// Returns the percentage (rounded down) of nodes that are
    /// structural nodes with no names below them. Such nodes are left
    /// behind when [`DomainTree::insert`] is used without attaching
    /// data.
    pub fn empty_leaf_node_ratio(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let empty_leaves = self
            .nodes
            .iter()
            .filter(|(_, node)| Self::is_empty_leaf(node))
            .count();
        empty_leaves * 100 / self.nodes.len()
    }

    /// Deletes every structural node that has no names below it and
    /// returns how many were deleted.
    ///
    /// A single pass only deletes the nodes that were empty leaves when
    /// it started. Nodes that become empty leaves as a result are left
    /// for the next pass, so compaction calls this repeatedly until it
    /// returns zero.
    pub fn remove_empty_leaf_node(&mut self) -> Result<usize, Error> {
        let mut empty_leaves = Vec::new();
        let mut stack: Vec<(NodeId, Option<NodeId>)> =
            self.root.map(|root| (root, None)).into_iter().collect();
        while let Some((id, upper)) = stack.pop() {
            let node = &self[id];
            if Self::is_empty_leaf(node) {
                empty_leaves.push((id, upper));
            }
            if let Some(down) = node.down {
                stack.push((down, Some(id)));
            }
            stack.extend(
                [node.right, node.left]
                    .into_iter()
                    .flatten()
                    .map(|child| (child, upper)),
            );
        }

        for &(id, upper) in &empty_leaves {
            self.unlink(upper, id)?;
        }
        debug!(
            "Removed {} empty leaf nodes from domain tree; {} remain",
            empty_leaves.len(),
            self.node_count()
        );
        Ok(empty_leaves.len())
    }

    /// Creates a deep copy of the tree, producing the data of each node
    /// of the copy with `f`. Node identifiers are preserved.
    pub fn clone_with<U, F>(&self, mut f: F) -> DomainTree<U>
    where
        F: FnMut(&T) -> U,
    {
        DomainTree {
            nodes: self
                .nodes
                .iter()
                .map(|(key, node)| (key, node.map_data(&mut f)))
                .collect(),
            root: self.root,
            return_empty_node: self.return_empty_node,
        }
    }

    ////////////////////////////////////////////////////////////////////
    // DEBUG OUTPUT                                                   //
    ////////////////////////////////////////////////////////////////////

    /// Writes a rendering of the tree's structure to `out`, indented by
    /// `depth` levels. Each node is shown with its color; structural
    /// nodes are marked `[invisible]`, and missing children as `NULL`.
    pub fn dump<W: fmt::Write>(&self, out: &mut W, depth: usize) -> fmt::Result {
        enum Step {
            Node(Option<NodeId>, usize),
            EndDown(NodeId, usize),
        }

        indent(out, depth)?;
        writeln!(out, "tree has {} node(s)", self.node_count())?;
        let mut stack = vec![Step::Node(self.root, depth)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Node(None, depth) => {
                    indent(out, depth)?;
                    writeln!(out, "NULL")?;
                }
                Step::Node(Some(id), depth) => {
                    let node = &self[id];
                    indent(out, depth)?;
                    write!(out, "{} ({})", node.name, node.color)?;
                    if node.is_empty() {
                        write!(out, " [invisible]")?;
                    }
                    writeln!(out)?;
                    stack.push(Step::Node(node.right, depth + 1));
                    stack.push(Step::Node(node.left, depth + 1));
                    if let Some(down) = node.down {
                        indent(out, depth + 1)?;
                        writeln!(out, "begin down from {}", node.name)?;
                        stack.push(Step::EndDown(id, depth + 1));
                        stack.push(Step::Node(Some(down), depth + 1));
                    }
                }
                Step::EndDown(id, depth) => {
                    indent(out, depth)?;
                    writeln!(out, "end down from {}", self[id].name)?;
                }
            }
        }
        Ok(())
    }
}

fn indent<W: fmt::Write>(out: &mut W, depth: usize) -> fmt::Result {
    write!(out, "{:width$}", "", width = depth * DUMP_INDENT)
}

impl<T> Default for DomainTree<T> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<T> Index<NodeId> for DomainTree<T> {
    type Output = Node<T>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl<T> IndexMut<NodeId> for DomainTree<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.0]
    }
}

impl<T> fmt::Debug for DomainTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.dump(f, 0)
    }
}

impl<'a, T> IntoIterator for &'a DomainTree<T> {
    type Item = (Name, &'a Node<T>);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

////////////////////////////////////////////////////////////////////////
// ITERATION                                                          //
////////////////////////////////////////////////////////////////////////

/// An iterator over the visible nodes of a [`DomainTree`], created by
/// [`DomainTree::iter`].
pub struct Iter<'a, T> {
    tree: &'a DomainTree<T>,
    chain: NodeChain,
    current: Option<NodeId>,
}

impl<'a, T> Iter<'a, T> {
    fn new(tree: &'a DomainTree<T>) -> Self {
        let mut chain = NodeChain::new();
        let current = tree.first_node(&mut chain).ok().flatten();
        Self {
            tree,
            chain,
            current,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Name, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.current {
            let node = &self.tree[id];
            let item = if self.tree.is_visible(node) {
                self.chain.absolute_name(self.tree).map(|name| (name, node))
            } else {
                None
            };
            self.current = self.tree.next_node(&mut self.chain);
            if item.is_some() {
                return item;
            }
        }
        None
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::{NameComparison, MAX_N_LABELS};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    /// The names of the test tree, which looks like this (levels are
    /// joined with `|`):
    ///
    /// ```text
    ///             b
    ///           /   \
    ///          a    d.e.f
    ///              /  |   \
    ///             c   |    g.h
    ///                 |     |
    ///                w.y    i
    ///              /  |  \
    ///             x   |   z
    ///                 |   |
    ///                 p   j
    ///               /   \
    ///              o     q
    /// ```
    const NAMES: [&str; 11] = [
        "c.",
        "b.",
        "a.",
        "x.d.e.f.",
        "z.d.e.f.",
        "g.h.",
        "i.g.h.",
        "o.w.y.d.e.f.",
        "j.z.d.e.f.",
        "p.w.y.d.e.f.",
        "q.w.y.d.e.f.",
    ];

    /// All names of the test tree in hierarchical order, including
    /// structural nodes.
    const ORDERED_NAMES: [&str; 13] = [
        "a.",
        "b.",
        "c.",
        "d.e.f.",
        "x.d.e.f.",
        "w.y.d.e.f.",
        "o.w.y.d.e.f.",
        "p.w.y.d.e.f.",
        "q.w.y.d.e.f.",
        "z.d.e.f.",
        "j.z.d.e.f.",
        "g.h.",
        "i.g.h.",
    ];

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    /// Builds the test tree. The data of each name is its position in
    /// `NAMES`, counting from one.
    fn create_tree(return_empty_node: bool) -> DomainTree<usize> {
        let mut tree = DomainTree::new(return_empty_node);
        for (i, n) in NAMES.iter().enumerate() {
            tree.insert_data(&name(n), i + 1).unwrap();
            check_invariants(&tree);
        }
        tree
    }

    fn find<T>(tree: &DomainTree<T>, n: &str) -> NodeId {
        match tree.search(&name(n)) {
            SearchResult::ExactMatch(id) => id,
            other => panic!("expected an exact match for {}, got {:?}", n, other),
        }
    }

    /// Checks the red-black properties of every level, the parent
    /// links, the in-level ordering, and the node count.
    fn check_invariants<T>(tree: &DomainTree<T>) {
        let mut count = 0;
        check_level(tree, tree.root, &mut count);
        assert_eq!(count, tree.node_count());
    }

    fn check_level<T>(tree: &DomainTree<T>, root: Option<NodeId>, count: &mut usize) {
        if let Some(root) = root {
            assert_eq!(tree[root].color, Color::Black);
            assert_eq!(tree[root].parent, None);
        }
        check_subtree(tree, root, count);
    }

    /// Returns the black height of the subtree rooted at `id`.
    fn check_subtree<T>(tree: &DomainTree<T>, id: Option<NodeId>, count: &mut usize) -> usize {
        let id = match id {
            Some(id) => id,
            None => return 1,
        };
        *count += 1;
        let node = &tree[id];
        for child in [node.left, node.right].into_iter().flatten() {
            assert_eq!(tree[child].parent, Some(id));
            if node.color == Color::Red {
                assert_eq!(tree[child].color, Color::Black);
            }
        }
        if let Some(left) = node.left {
            assert!(tree[left].name < node.name);
        }
        if let Some(right) = node.right {
            assert!(tree[right].name > node.name);
        }
        check_level(tree, node.down, count);
        let left_height = check_subtree(tree, node.left, count);
        let right_height = check_subtree(tree, node.right, count);
        assert_eq!(left_height, right_height);
        left_height + (node.color == Color::Black) as usize
    }

    fn check_comparison(
        chain: &NodeChain,
        order: Ordering,
        common_label_count: usize,
        relation: NameRelation,
    ) {
        assert_eq!(
            chain.last_comparison(),
            Some(NameComparison {
                order,
                common_label_count,
                relation,
            })
        );
    }

    #[test]
    fn node_count_works() {
        assert_eq!(create_tree(false).node_count(), 13);
        assert_eq!(DomainTree::<()>::new(false).node_count(), 0);
    }

    #[test]
    fn insert_works() {
        let mut tree = create_tree(false);
        let c = find(&tree, "c.");
        assert_eq!(tree.insert(&name("c.")), Err(Error::AlreadyExists(c)));

        // Structural nodes are returned as is.
        let id = tree.insert(&name("d.e.f.")).unwrap();
        assert_eq!(tree[id].name(), &name("d.e.f."));
        assert_eq!(tree.node_count(), 13);

        let id = tree.insert(&Name::root()).unwrap();
        assert!(tree[id].name().is_root());
        assert_eq!(tree.node_count(), 14);

        let id = tree.insert_data(&name("example.com."), 12).unwrap();
        assert_eq!(tree.node_count(), 15);
        assert_eq!(
            tree.insert(&name("example.com.")),
            Err(Error::AlreadyExists(id))
        );
        assert_eq!(tree[id].name(), &name("example.com."));
        assert_eq!(tree.node_count(), 15);

        // Splits d.e.f.
        let id = tree.insert(&name("k.e.f.")).unwrap();
        assert_eq!(tree[id].name(), &name("k."));
        assert_eq!(tree.node_count(), 17);

        // Splits g.h.
        let id = tree.insert(&name("h.")).unwrap();
        assert_eq!(tree[id].name(), &name("h."));
        assert_eq!(tree.node_count(), 18);

        let id = tree.insert(&name("m.p.w.y.d.e.f.")).unwrap();
        assert_eq!(tree[id].name(), &name("m."));
        assert_eq!(tree.node_count(), 19);

        let id = tree.insert(&name("n.p.w.y.d.e.f.")).unwrap();
        assert_eq!(tree[id].name(), &name("n."));
        assert_eq!(tree.node_count(), 20);

        let id = tree.insert(&name("l.a.")).unwrap();
        assert_eq!(tree[id].name(), &name("l."));
        assert_eq!(tree.node_count(), 21);

        tree.insert(&name("r.d.e.f.")).unwrap();
        tree.insert(&name("s.d.e.f.")).unwrap();
        assert_eq!(tree.node_count(), 23);
        tree.insert(&name("h.w.y.d.e.f.")).unwrap();

        let f = tree.insert(&name("f.")).unwrap();
        tree[f].set_data(Some(1000));
        assert_eq!(tree.insert(&name("f.")), Err(Error::AlreadyExists(f)));

        for n in ["m.", "nm.", "om.", "k.", "l.", "fe.", "ge.", "i.", "ae.", "n."] {
            tree.insert(&name(n)).unwrap();
        }
        check_invariants(&tree);
    }

    #[test]
    fn fission_moves_data_down() {
        let mut tree = DomainTree::new(true);
        let def = tree.insert_data(&name("d.e.f."), 1).unwrap();
        tree[def].set_flag(NodeFlags::CALLBACK, true);
        tree.insert_data(&name("k.e.f."), 2).unwrap();
        assert_eq!(tree.node_count(), 3);

        // The original node now holds the common suffix.
        assert_eq!(tree[def].name(), &name("e.f."));
        assert!(tree[def].is_empty());
        assert!(!tree[def].flag(NodeFlags::CALLBACK));

        let d = find(&tree, "d.e.f.");
        assert_eq!(tree[d].name(), &name("d."));
        assert_eq!(tree[d].data(), Some(&1));
        assert!(tree[d].flag(NodeFlags::CALLBACK));
        assert_eq!(tree[find(&tree, "k.e.f.")].data(), Some(&2));
        check_invariants(&tree);
    }

    #[test]
    fn insert_root_moves_top_level_down() {
        let mut tree = create_tree(false);
        let root = tree.insert_data(&Name::root(), 0).unwrap();
        assert_eq!(tree.root, Some(root));
        assert_eq!(tree.insert(&Name::root()), Err(Error::AlreadyExists(root)));
        check_invariants(&tree);
        for n in NAMES {
            assert!(matches!(
                tree.search(&name(n)),
                SearchResult::ExactMatch(_)
            ));
        }
    }

    #[test]
    fn search_works() {
        let tree = create_tree(false);
        let a = find(&tree, "a.");
        assert_eq!(tree[a].name(), &name("a."));

        for n in ["d.e.f.", "y.d.e.f.", "x.", "m.n."] {
            assert_eq!(tree.search(&name(n)), SearchResult::NotFound);
        }

        let tree = create_tree(true);
        for n in ["d.e.f.", "w.y.d.e.f."] {
            assert!(matches!(
                tree.search(&name(n)),
                SearchResult::ExactMatch(_)
            ));
        }

        let b = find(&tree, "b.");
        assert_eq!(
            tree.search(&name("m.b.")),
            SearchResult::PartialMatch(b)
        );
        let def = find(&tree, "d.e.f.");
        assert_eq!(
            tree.search(&name("m.d.e.f.")),
            SearchResult::PartialMatch(def)
        );

        let q = find(&tree, "q.w.y.d.e.f.");
        assert_eq!(tree[q].name(), &name("q."));
        assert_eq!(tree[q].data(), Some(&11));
    }

    #[test]
    fn search_is_case_insensitive() {
        let tree = create_tree(false);
        assert_eq!(
            tree.search(&name("Q.W.y.D.e.F.")),
            SearchResult::ExactMatch(find(&tree, "q.w.y.d.e.f."))
        );
    }

    #[test]
    fn search_ext_rejects_non_empty_chain() {
        let tree = create_tree(false);
        let mut chain = NodeChain::new();
        tree.search_ext(&name("a."), &mut chain, None).unwrap();
        assert_eq!(
            tree.search_ext(&name("a."), &mut chain, None),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn flags_work() {
        let mut tree = create_tree(false);
        let id = tree.insert(&name("flags.example.")).unwrap();
        assert!(!tree[id].flag(NodeFlags::CALLBACK));
        tree[id].set_flag(NodeFlags::CALLBACK, true);
        assert!(tree[id].flag(NodeFlags::CALLBACK));
        tree[id].set_flag(NodeFlags::CALLBACK, false);
        assert!(!tree[id].flag(NodeFlags::CALLBACK));
    }

    #[test]
    fn callback_works() {
        let mut tree = create_tree(false);
        let id = tree.insert_data(&name("callback.example."), 1).unwrap();
        tree[id].set_flag(NodeFlags::CALLBACK, true);
        let sub = tree.insert_data(&name("sub.callback.example."), 2).unwrap();

        // Inserting example. splits the callback.example. node; the
        // original node becomes example. and callback. is created below
        // it with the flag.
        let parent = tree.insert(&name("example.")).unwrap();
        assert_eq!(parent, id);
        let callback_node = find(&tree, "callback.example.");
        assert!(tree[callback_node].flag(NodeFlags::CALLBACK));
        assert!(!tree[sub].flag(NodeFlags::CALLBACK));
        assert!(!tree[parent].flag(NodeFlags::CALLBACK));

        let mut called = Vec::new();
        let mut callback = |id: NodeId, _: &Node<usize>| {
            called.push(id);
            false
        };
        let mut chain = NodeChain::new();
        let result = tree
            .search_ext(&name("sub.callback.example."), &mut chain, Some(&mut callback))
            .unwrap();
        assert_eq!(result, SearchResult::ExactMatch(sub));
        assert_eq!(called, [callback_node]);

        // The parent has the flag now but no data, so it is invisible
        // and the callback must not be called for it.
        tree[parent].set_flag(NodeFlags::CALLBACK, true);
        let mut called = false;
        let mut callback = |_: NodeId, _: &Node<usize>| {
            called = true;
            false
        };
        let mut chain = NodeChain::new();
        let result = tree
            .search_ext(&name("callback.example."), &mut chain, Some(&mut callback))
            .unwrap();
        assert_eq!(result, SearchResult::ExactMatch(callback_node));
        assert!(!called);
    }

    #[test]
    fn callback_can_stop_search() {
        let mut tree = create_tree(false);
        let cut = tree.insert_data(&name("example."), 1).unwrap();
        tree[cut].set_flag(NodeFlags::CALLBACK, true);
        tree.insert_data(&name("www.example."), 2).unwrap();

        let mut callback = |id: NodeId, node: &Node<usize>| id == cut && node.data() == Some(&1);
        let mut chain = NodeChain::new();
        let result = tree
            .search_ext(&name("www.example."), &mut chain, Some(&mut callback))
            .unwrap();
        assert_eq!(result, SearchResult::PartialMatch(cut));
        assert_eq!(chain.level_count(), 0);
        assert_eq!(chain.last_compared(), Some(cut));
    }

    #[test]
    fn chain_depth_matches_label_count() {
        let mut chain = NodeChain::new();
        assert_eq!(chain.level_count(), 0);

        let mut tree = DomainTree::<()>::new(true);
        tree.insert(&Name::root()).unwrap();
        assert!(matches!(
            tree.search_ext(&Name::root(), &mut chain, None),
            Ok(SearchResult::ExactMatch(_))
        ));
        assert_eq!(chain.level_count(), 1);

        // Build the deepest possible tree: a chain of levels holding a
        // single a. each, below the root's own level.
        let mut node_name = Name::root();
        for i in 2..=MAX_N_LABELS {
            node_name = name("a.").concat(&node_name).unwrap();
            tree.insert(&node_name).unwrap();

            let mut chain = NodeChain::new();
            assert!(matches!(
                tree.search_ext(&node_name, &mut chain, None),
                Ok(SearchResult::ExactMatch(_))
            ));
            assert_eq!(chain.level_count(), i);
            assert_eq!(chain.absolute_name(&tree), Some(node_name.clone()));
        }
        check_invariants(&tree);
    }

    #[test]
    fn next_node_works() {
        let tree = create_tree(false);
        let mut chain = NodeChain::new();
        let mut current = tree
            .search_ext(&name("a."), &mut chain, None)
            .unwrap()
            .node();
        for expected in ORDERED_NAMES {
            assert!(current.is_some());
            assert_eq!(chain.absolute_name(&tree), Some(name(expected)));
            current = tree.next_node(&mut chain);
        }
        assert_eq!(current, None);
        assert_eq!(tree.next_node(&mut chain), None);
    }

    #[test]
    fn first_node_works() {
        let tree = create_tree(false);
        let mut chain = NodeChain::new();
        let first = tree.first_node(&mut chain).unwrap();
        assert_eq!(first, Some(find(&tree, "a.")));
        assert_eq!(chain.level_count(), 1);
        assert_eq!(tree.first_node(&mut chain), Err(Error::InvalidArgument));

        let mut chain = NodeChain::new();
        assert_eq!(DomainTree::<()>::new(false).first_node(&mut chain), Ok(None));
        assert!(chain.is_empty());
    }

    #[test]
    fn iter_skips_invisible_nodes() {
        let tree = create_tree(false);
        let names: Vec<Name> = tree.iter().map(|(name, _)| name).collect();
        let expected: Vec<Name> = ORDERED_NAMES
            .into_iter()
            .filter(|n| *n != "d.e.f." && *n != "w.y.d.e.f.")
            .map(name)
            .collect();
        assert_eq!(names, expected);
        let data: Vec<usize> = tree.iter().filter_map(|(_, node)| node.data().copied()).collect();
        assert_eq!(data, [3, 2, 1, 4, 8, 10, 11, 5, 9, 6, 7]);

        let tree = create_tree(true);
        let names: Vec<Name> = (&tree).into_iter().map(|(name, _)| name).collect();
        let expected: Vec<Name> = ORDERED_NAMES.into_iter().map(name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn is_node_non_terminal_works() {
        let mut tree = create_tree(true);
        assert!(!tree.is_node_non_terminal(find(&tree, "c.")));
        assert!(tree.is_node_non_terminal(find(&tree, "d.e.f.")));
        assert!(tree.is_node_non_terminal(find(&tree, "w.y.d.e.f.")));
        assert!(!tree.is_node_non_terminal(find(&tree, "p.w.y.d.e.f.")));

        for n in ["o.w.y.d.e.f.", "p.w.y.d.e.f.", "q.w.y.d.e.f."] {
            let id = find(&tree, n);
            tree[id].set_data(None);
        }
        assert!(!tree.is_node_non_terminal(find(&tree, "w.y.d.e.f.")));
        assert!(tree.is_node_non_terminal(find(&tree, "d.e.f.")));
    }

    #[test]
    fn last_comparison_works() {
        let mut chain = NodeChain::new();
        assert_eq!(chain.last_compared(), None);

        let empty = DomainTree::<usize>::new(false);
        assert_eq!(
            empty.search_ext(&name("a."), &mut chain, None),
            Ok(SearchResult::NotFound)
        );
        assert_eq!(chain.last_compared(), None);
        assert_eq!(chain.last_comparison(), None);
        chain.clear();

        let tree = create_tree(true);
        let result = tree.search_ext(&name("x.d.e.f."), &mut chain, None).unwrap();
        assert_eq!(chain.last_compared(), result.node());
        check_comparison(&chain, Ordering::Equal, 2, NameRelation::Equal);
        chain.clear();

        let i = find(&tree, "i.g.h.");
        let result = tree.search_ext(&name("x.i.g.h."), &mut chain, None).unwrap();
        assert_eq!(result, SearchResult::PartialMatch(i));
        assert_eq!(chain.last_compared(), Some(i));
        check_comparison(&chain, Ordering::Greater, 2, NameRelation::SubDomain);
        chain.clear();

        // Partial match; the search stopped below the matching node after
        // following a left branch.
        let x = find(&tree, "x.d.e.f.");
        let def = find(&tree, "d.e.f.");
        let result = tree.search_ext(&name("a.d.e.f."), &mut chain, None).unwrap();
        assert_eq!(result, SearchResult::PartialMatch(def));
        assert_eq!(chain.last_compared(), Some(x));
        check_comparison(&chain, Ordering::Less, 1, NameRelation::CommonAncestor);
        chain.clear();

        // As above, following a right branch.
        let z = find(&tree, "z.d.e.f.");
        let result = tree.search_ext(&name("zz.d.e.f."), &mut chain, None).unwrap();
        assert_eq!(result, SearchResult::PartialMatch(def));
        assert_eq!(chain.last_compared(), Some(z));
        check_comparison(&chain, Ordering::Greater, 1, NameRelation::CommonAncestor);
        chain.clear();

        // Partial match; the search stopped at a node for a superdomain of
        // the name below the matching node.
        let wy = find(&tree, "w.y.d.e.f.");
        let result = tree.search_ext(&name("y.d.e.f."), &mut chain, None).unwrap();
        assert_eq!(result, SearchResult::PartialMatch(def));
        assert_eq!(chain.last_compared(), Some(wy));
        check_comparison(&chain, Ordering::Less, 2, NameRelation::SuperDomain);
        chain.clear();

        // Partial match; the search stopped at a node sharing a common
        // ancestor with the name below the matching node.
        let result = tree.search_ext(&name("z.y.d.e.f."), &mut chain, None).unwrap();
        assert_eq!(result, SearchResult::PartialMatch(def));
        assert_eq!(chain.last_compared(), Some(wy));
        check_comparison(&chain, Ordering::Greater, 2, NameRelation::CommonAncestor);
        chain.clear();

        // The search stopped in the top level after following a left
        // branch.
        let c = find(&tree, "c.");
        let result = tree.search_ext(&name("bb."), &mut chain, None).unwrap();
        assert_eq!(result, SearchResult::NotFound);
        assert_eq!(chain.last_compared(), Some(c));
        check_comparison(&chain, Ordering::Less, 1, NameRelation::CommonAncestor);
        chain.clear();

        // As above, following a right branch.
        let result = tree.search_ext(&name("d."), &mut chain, None).unwrap();
        assert_eq!(result, SearchResult::NotFound);
        assert_eq!(chain.last_compared(), Some(c));
        check_comparison(&chain, Ordering::Greater, 1, NameRelation::CommonAncestor);
    }

    #[test]
    fn root_zone_works() {
        let mut tree = DomainTree::new(false);
        tree.insert_data(&name("cn."), 0).unwrap();
        let root = tree.insert_data(&Name::root(), 1).unwrap();
        check_invariants(&tree);

        assert_eq!(tree.search(&Name::root()), SearchResult::ExactMatch(root));
        assert_eq!(
            tree.search(&name("example.com.")),
            SearchResult::PartialMatch(root)
        );
        assert_eq!(tree[root].data(), Some(&1));

        let com = tree.insert_data(&name("com."), 2).unwrap();
        assert_eq!(
            tree.search(&name("example.com.")),
            SearchResult::PartialMatch(com)
        );
        assert_eq!(tree[com].name(), &name("com."));
        assert_eq!(tree[com].data(), Some(&2));
        check_invariants(&tree);
    }

    #[test]
    fn for_each_works() {
        let tree = create_tree(true);
        let mut count = 0;
        tree.for_each(|_, _| count += 1);
        assert_eq!(count, tree.node_count());

        let tree = create_tree(false);
        let mut count = 0;
        tree.for_each(|_, _| count += 1);
        assert_eq!(count, NAMES.len());
    }

    #[test]
    fn for_each_visits_node_left_right_down() {
        let tree = create_tree(true);
        let mut visited = Vec::new();
        tree.for_each_with_name(|name, _, _| visited.push(name.to_string()))
            .unwrap();
        assert_eq!(
            visited,
            [
                "b.",
                "a.",
                "d.e.f.",
                "c.",
                "g.h.",
                "i.g.h.",
                "w.y.d.e.f.",
                "x.d.e.f.",
                "z.d.e.f.",
                "j.z.d.e.f.",
                "p.w.y.d.e.f.",
                "o.w.y.d.e.f.",
                "q.w.y.d.e.f.",
            ]
        );
    }

    #[test]
    fn for_each_with_name_honors_policy() {
        let tree = create_tree(false);
        let mut visited = Vec::new();
        tree.for_each_with_name(|name, id, node| {
            assert_eq!(tree[id].data(), node.data());
            visited.push(name.clone());
        })
        .unwrap();
        visited.sort();
        let mut expected: Vec<Name> = NAMES.into_iter().map(name).collect();
        expected.sort();
        assert_eq!(visited, expected);
    }

    #[test]
    fn all_and_any_work() {
        let tree = create_tree(false);
        assert!(tree.all(|_, node| !node.is_empty()));
        assert!(!tree.any(|_, node| node.is_empty()));
        assert!(tree.any(|_, node| node.data() == Some(&7)));
        assert!(!tree.all(|_, node| node.data() != Some(&7)));

        let tree = create_tree(true);
        assert!(!tree.all(|_, node| !node.is_empty()));
        assert!(tree.any(|_, node| node.is_empty()));

        let empty = DomainTree::<usize>::new(true);
        assert!(empty.all(|_, _| false));
        assert!(!empty.any(|_, _| true));
    }

    #[test]
    fn remove_works() {
        let mut tree = create_tree(false);
        assert_eq!(tree.remove(&name("nonexistent.")), Err(Error::NotFound));
        assert_eq!(tree.remove(&name("d.e.f.")), Err(Error::NotFound));

        tree.remove(&name("c.")).unwrap();
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 12);
        assert_eq!(tree.search(&name("c.")), SearchResult::NotFound);

        // z. has names below it, so it only loses its data.
        let z = find(&tree, "z.d.e.f.");
        tree.remove(&name("z.d.e.f.")).unwrap();
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 12);
        assert!(tree[z].is_empty());
        assert_eq!(tree.search(&name("z.d.e.f.")), SearchResult::NotFound);

        // Removing j. collapses the now empty z. as well.
        tree.remove(&name("j.z.d.e.f.")).unwrap();
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 10);
    }

    #[test]
    fn remove_collapses_structural_levels() {
        let mut tree = DomainTree::new(false);
        tree.insert_data(&name("x.d.e.f."), 1).unwrap();
        tree.insert_data(&name("z.d.e.f."), 2).unwrap();
        tree.insert_data(&name("a."), 3).unwrap();
        assert_eq!(tree.node_count(), 4);

        tree.remove(&name("x.d.e.f.")).unwrap();
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 3);

        tree.remove(&name("z.d.e.f.")).unwrap();
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 1);
        assert!(matches!(
            tree.search(&name("a.")),
            SearchResult::ExactMatch(_)
        ));
    }

    #[test]
    fn remove_keeps_data_above() {
        let mut tree = DomainTree::new(false);
        let example = tree.insert_data(&name("example."), 1).unwrap();
        tree.insert_data(&name("www.example."), 2).unwrap();
        tree.remove(&name("www.example.")).unwrap();
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree[example].down(), None);
        assert_eq!(tree[example].data(), Some(&1));
    }

    #[test]
    fn insert_then_remove_round_trips() {
        let mut tree = create_tree(false);
        let count = tree.node_count();
        tree.insert_data(&name("new.w.y.d.e.f."), 100).unwrap();
        check_invariants(&tree);
        tree.remove(&name("new.w.y.d.e.f.")).unwrap();
        check_invariants(&tree);
        assert_eq!(tree.node_count(), count);
        assert_eq!(
            tree.search(&name("new.w.y.d.e.f.")),
            SearchResult::NotFound
        );
    }

    #[test]
    fn remove_everything_empties_tree() {
        for reverse in [false, true] {
            let mut tree = create_tree(false);
            let mut names = NAMES;
            if reverse {
                names.reverse();
            }
            for n in names {
                tree.remove(&name(n)).unwrap();
                check_invariants(&tree);
                assert!(!matches!(
                    tree.search(&name(n)),
                    SearchResult::ExactMatch(_)
                ));
            }
            assert_eq!(tree.node_count(), 0);
            assert_eq!(tree.root, None);
        }
    }

    #[test]
    fn shuffled_insert_and_remove_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut names: Vec<Name> = (0..300)
            .map(|i| name(&format!("n{}.l{}.t{}.", i, i % 17, i % 5)))
            .collect();
        names.shuffle(&mut rng);

        let mut tree = DomainTree::new(false);
        for (i, n) in names.iter().enumerate() {
            tree.insert_data(n, i).unwrap();
        }
        check_invariants(&tree);
        for (i, n) in names.iter().enumerate() {
            let id = match tree.search(n) {
                SearchResult::ExactMatch(id) => id,
                other => panic!("{} not found: {:?}", n, other),
            };
            assert_eq!(tree[id].data(), Some(&i));
        }

        names.shuffle(&mut rng);
        let (removed, kept) = names.split_at(names.len() / 2);
        for n in removed {
            tree.remove(n).unwrap();
            check_invariants(&tree);
        }
        for n in removed {
            assert!(!matches!(tree.search(n), SearchResult::ExactMatch(_)));
        }
        for n in kept {
            assert!(matches!(tree.search(n), SearchResult::ExactMatch(_)));
        }
        for n in kept {
            tree.remove(n).unwrap();
        }
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn empty_leaf_nodes_are_removed() {
        let mut tree = DomainTree::new(true);
        tree.insert(&Name::root()).unwrap();
        tree.insert(&name("cn.")).unwrap();
        tree.insert(&name("a.cn.")).unwrap();
        tree.insert_data(&name("com."), 1).unwrap();

        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.empty_leaf_node_ratio(), 25);

        assert_eq!(tree.remove_empty_leaf_node(), Ok(1));
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.remove_empty_leaf_node(), Ok(1));
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.remove_empty_leaf_node(), Ok(0));
        assert_eq!(tree.empty_leaf_node_ratio(), 0);
        assert!(matches!(
            tree.search(&name("com.")),
            SearchResult::ExactMatch(_)
        ));
    }

    #[test]
    fn removing_data_leaves_closest_enclosing_match() {
        let mut tree = create_tree(false);
        let z = find(&tree, "z.d.e.f.");
        tree.remove(&name("j.z.d.e.f.")).unwrap();
        check_invariants(&tree);
        assert_eq!(
            tree.search(&name("j.z.d.e.f.")),
            SearchResult::PartialMatch(z)
        );
    }

    #[test]
    fn empty_leaf_nodes_sharing_a_level_are_removed() {
        let mut tree = DomainTree::new(true);
        for n in ["a.", "b.", "c.", "d.", "e."] {
            tree.insert(&name(n)).unwrap();
        }
        tree.insert_data(&name("x."), 1).unwrap();
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 6);
        assert!(tree
            .nodes
            .iter()
            .any(|(_, node)| node.is_empty() && node.left.is_some() && node.right.is_some()));

        assert_eq!(tree.remove_empty_leaf_node(), Ok(5));
        check_invariants(&tree);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.remove_empty_leaf_node(), Ok(0));
        assert_eq!(tree[find(&tree, "x.")].data(), Some(&1));
    }

    #[test]
    fn search_handles_names_of_maximum_length() {
        let mut long = Name::root();
        for _ in 0..MAX_N_LABELS - 1 {
            long = name("a.").concat(&long).unwrap();
        }
        let suffix = long.split(60, MAX_N_LABELS - 60).unwrap();

        let mut tree = DomainTree::new(false);
        let above = tree.insert_data(&suffix, 1).unwrap();
        let id = tree.insert_data(&long, 2).unwrap();
        check_invariants(&tree);
        assert_eq!(tree.search(&long), SearchResult::ExactMatch(id));
        let between = long.split(30, MAX_N_LABELS - 30).unwrap();
        assert_eq!(tree.search(&between), SearchResult::PartialMatch(above));
    }

    #[test]
    fn empty_leaf_node_ratio_of_empty_tree_is_zero() {
        assert_eq!(DomainTree::<()>::new(false).empty_leaf_node_ratio(), 0);
    }

    #[test]
    fn clone_works() {
        let tree = create_tree(true);
        let copy = tree.clone_with(|data| *data);
        assert_eq!(copy.node_count(), tree.node_count());
        for (i, n) in NAMES.iter().enumerate() {
            assert_eq!(copy[find(&copy, n)].data(), Some(&(i + 1)));
        }
        check_invariants(&copy);
    }

    #[test]
    fn clone_is_independent() {
        let tree = create_tree(false);
        let mut copy = tree.clone_with(|data| data.to_string());
        let c = find(&copy, "c.");
        copy[c].set_data(Some("changed".to_owned()));
        copy.remove(&name("a.")).unwrap();
        assert_eq!(tree[find(&tree, "c.")].data(), Some(&1));
        assert!(matches!(
            tree.search(&name("a.")),
            SearchResult::ExactMatch(_)
        ));

        let mut copy = tree.clone();
        let b = find(&copy, "b.");
        *copy[b].data_mut().unwrap() = 42;
        assert_eq!(tree[find(&tree, "b.")].data(), Some(&2));
    }

    #[test]
    fn clear_works() {
        let mut tree = create_tree(false);
        tree.clear();
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.search(&name("a.")), SearchResult::NotFound);
        tree.insert_data(&name("a."), 1).unwrap();
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn dump_works() {
        let mut tree = DomainTree::new(false);
        tree.insert_data(&name("b."), 1).unwrap();
        tree.insert_data(&name("x.d.e.f."), 2).unwrap();
        tree.insert_data(&name("z.d.e.f."), 3).unwrap();

        let mut out = String::new();
        tree.dump(&mut out, 0).unwrap();
        let expected = "\
tree has 4 node(s)
b. (black)
     NULL
     d.e.f. (red) [invisible]
          begin down from d.e.f.
          x. (black)
               NULL
               z. (red)
                    NULL
                    NULL
          end down from d.e.f.
          NULL
          NULL
";
        assert_eq!(out, expected);
    }
}
