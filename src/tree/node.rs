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

//! The [`Node`] structure and its identifiers.

use std::fmt;

use bitflags::bitflags;

use crate::name::Name;

/// A handle to a [`Node`] in a [`DomainTree`](super::DomainTree).
///
/// A `NodeId` stays valid for as long as the node it refers to is in
/// the tree, including across rebalancing. Once the node is removed,
/// the `NodeId` may be reused for a different node.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(pub(super) usize);

/// The color of a [`Node`] in the red-black tree of its level.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Color {
    Red,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Red => f.write_str("red"),
            Self::Black => f.write_str("black"),
        }
    }
}

bitflags! {
    /// Per-node flags.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct NodeFlags: u32 {
        /// Invoke the search callback when a search passes through this
        /// node on the way to a more specific name.
        const CALLBACK = 1 << 0;
    }
}

/// A node of a [`DomainTree`](super::DomainTree).
///
/// The name of a node is relative to the level it lives in: a node for
/// `x.d.e.f.` placed below the node for `d.e.f.` has the name `x.`.
/// Nodes without data are *structural*. They exist only because names
/// below them needed them.
#[derive(Clone, Debug)]
pub struct Node<T> {
    pub(super) name: Name,
    pub(super) color: Color,
    pub(super) parent: Option<NodeId>,
    pub(super) left: Option<NodeId>,
    pub(super) right: Option<NodeId>,
    pub(super) down: Option<NodeId>,
    pub(super) data: Option<T>,
    pub(super) flags: NodeFlags,
}

impl<T> Node<T> {
    /// Creates a new red, unlinked, structural node.
    pub(super) fn new(name: Name) -> Self {
        Self {
            name,
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
            down: None,
            data: None,
            flags: NodeFlags::empty(),
        }
    }

    /// Returns the level-relative name of the node.
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the root of the level below this node, if there is one.
    pub fn down(&self) -> Option<NodeId> {
        self.down
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    /// Replaces the node's data, returning the old data.
    pub fn set_data(&mut self, data: Option<T>) -> Option<T> {
        std::mem::replace(&mut self.data, data)
    }

    /// Removes the node's data, making it a structural node.
    pub fn take_data(&mut self) -> Option<T> {
        self.data.take()
    }

    /// Returns whether the node is structural, i.e. carries no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Returns whether all of `flag` is set on the node.
    pub fn flag(&self, flag: NodeFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: NodeFlags, on: bool) {
        self.flags.set(flag, on);
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Copies the node, links included, producing its data with `f`.
    pub(super) fn map_data<U, F>(&self, f: F) -> Node<U>
    where
        F: FnOnce(&T) -> U,
    {
        Node {
            name: self.name.clone(),
            color: self.color,
            parent: self.parent,
            left: self.left,
            right: self.right,
            down: self.down,
            data: self.data.as_ref().map(f),
            flags: self.flags,
        }
    }

    /// Returns whether the node is red; a missing node counts as black.
    pub(super) fn is_red(node: Option<&Self>) -> bool {
        matches!(node, Some(n) if n.color == Color::Red)
    }
}
