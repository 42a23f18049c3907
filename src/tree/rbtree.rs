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

//! Red-black tree maintenance within a single level of a
//! [`DomainTree`].
//!
//! Every method here operates on one level. A level is identified by
//! its `upper` node, the node whose `down` link holds the level's root;
//! the top level has no upper node and its root is held by the tree
//! itself. Level roots always have no parent.

use log::error;

use super::{Color, DomainTree, Error, Node, NodeId};

/// Logs and constructs an [`Error::InvariantViolation`].
fn violation(what: &'static str) -> Error {
    error!("Domain tree invariant violated: {}", what);
    Error::InvariantViolation(what)
}

impl<T> DomainTree<T> {
    /// Returns the root of the level below `upper`.
    pub(super) fn level_root(&self, upper: Option<NodeId>) -> Option<NodeId> {
        match upper {
            Some(upper) => self[upper].down,
            None => self.root,
        }
    }

    fn set_level_root(&mut self, upper: Option<NodeId>, root: Option<NodeId>) {
        match upper {
            Some(upper) => self[upper].down = root,
            None => self.root = root,
        }
    }

    fn is_red(&self, id: Option<NodeId>) -> bool {
        Node::is_red(id.map(|id| &self[id]))
    }

    /// Makes `new` take the place of `old` as a child of `parent`, or
    /// as the root of the level if `parent` is `None`.
    fn replace_child(
        &mut self,
        upper: Option<NodeId>,
        parent: Option<NodeId>,
        old: NodeId,
        new: Option<NodeId>,
    ) {
        match parent {
            Some(parent) if self[parent].left == Some(old) => self[parent].left = new,
            Some(parent) => self[parent].right = new,
            None => self.set_level_root(upper, new),
        }
    }

    /// Returns the leftmost node of the subtree rooted at `id`.
    pub(super) fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self[id].left {
            id = left;
        }
        id
    }

    /// Returns the in-level successor of `id`.
    pub(super) fn successor(&self, mut id: NodeId) -> Option<NodeId> {
        if let Some(right) = self[id].right {
            return Some(self.leftmost(right));
        }
        while let Some(parent) = self[id].parent {
            if self[parent].left == Some(id) {
                return Some(parent);
            }
            id = parent;
        }
        None
    }

    fn rotate_left(&mut self, upper: Option<NodeId>, id: NodeId) -> Result<(), Error> {
        let right = self[id]
            .right
            .ok_or_else(|| violation("left rotation without a right child"))?;
        let inner = self[right].left;
        self[id].right = inner;
        if let Some(inner) = inner {
            self[inner].parent = Some(id);
        }
        let parent = self[id].parent;
        self[right].parent = parent;
        self.replace_child(upper, parent, id, Some(right));
        self[right].left = Some(id);
        self[id].parent = Some(right);
        Ok(())
    }

    fn rotate_right(&mut self, upper: Option<NodeId>, id: NodeId) -> Result<(), Error> {
        let left = self[id]
            .left
            .ok_or_else(|| violation("right rotation without a left child"))?;
        let inner = self[left].right;
        self[id].left = inner;
        if let Some(inner) = inner {
            self[inner].parent = Some(id);
        }
        let parent = self[id].parent;
        self[left].parent = parent;
        self.replace_child(upper, parent, id, Some(left));
        self[left].right = Some(id);
        self[id].parent = Some(left);
        Ok(())
    }

    /// Restores the red-black properties of the level below `upper`
    /// after the red node `id` was linked into it.
    pub(super) fn insert_rebalance(
        &mut self,
        upper: Option<NodeId>,
        mut id: NodeId,
    ) -> Result<(), Error> {
        while let Some(parent) = self[id].parent.filter(|&p| self[p].color == Color::Red) {
            let grandparent = self[parent]
                .parent
                .ok_or_else(|| violation("red level root"))?;
            if self[grandparent].left == Some(parent) {
                let uncle = self[grandparent].right;
                if let Some(uncle) = uncle.filter(|&u| self[u].color == Color::Red) {
                    self[parent].color = Color::Black;
                    self[uncle].color = Color::Black;
                    self[grandparent].color = Color::Red;
                    id = grandparent;
                } else {
                    if self[parent].right == Some(id) {
                        id = parent;
                        self.rotate_left(upper, id)?;
                    }
                    let parent = self[id].parent.ok_or_else(|| violation("lost parent"))?;
                    let grandparent = self[parent]
                        .parent
                        .ok_or_else(|| violation("lost grandparent"))?;
                    self[parent].color = Color::Black;
                    self[grandparent].color = Color::Red;
                    self.rotate_right(upper, grandparent)?;
                }
            } else {
                let uncle = self[grandparent].left;
                if let Some(uncle) = uncle.filter(|&u| self[u].color == Color::Red) {
                    self[parent].color = Color::Black;
                    self[uncle].color = Color::Black;
                    self[grandparent].color = Color::Red;
                    id = grandparent;
                } else {
                    if self[parent].left == Some(id) {
                        id = parent;
                        self.rotate_right(upper, id)?;
                    }
                    let parent = self[id].parent.ok_or_else(|| violation("lost parent"))?;
                    let grandparent = self[parent]
                        .parent
                        .ok_or_else(|| violation("lost grandparent"))?;
                    self[parent].color = Color::Black;
                    self[grandparent].color = Color::Red;
                    self.rotate_left(upper, grandparent)?;
                }
            }
        }

        if let Some(root) = self.level_root(upper) {
            self[root].color = Color::Black;
        }
        Ok(())
    }

    /// Swaps the positions of `id` and `lower` within their level.
    /// `lower` must be the rightmost node of the left subtree of `id`.
    /// Node identifiers stay attached to their names and data; only
    /// the links and colors move.
    fn exchange(&mut self, upper: Option<NodeId>, id: NodeId, lower: NodeId) {
        let (id_parent, id_left, id_right, id_color) = {
            let node = &self[id];
            (node.parent, node.left, node.right, node.color)
        };
        let (lower_parent, lower_left, lower_right, lower_color) = {
            let node = &self[lower];
            (node.parent, node.left, node.right, node.color)
        };

        // Link `lower` into the position of `id`.
        self.replace_child(upper, id_parent, id, Some(lower));
        let lower_new_left = if id_left == Some(lower) {
            Some(id)
        } else {
            id_left
        };
        {
            let node = &mut self[lower];
            node.parent = id_parent;
            node.left = lower_new_left;
            node.right = id_right;
            node.color = id_color;
        }

        // Link `id` into the old position of `lower`.
        let id_new_parent = if lower_parent == Some(id) {
            Some(lower)
        } else {
            if let Some(lower_parent) = lower_parent {
                self.replace_child(upper, Some(lower_parent), lower, Some(id));
            }
            lower_parent
        };
        {
            let node = &mut self[id];
            node.parent = id_new_parent;
            node.left = lower_left;
            node.right = lower_right;
            node.color = lower_color;
        }

        for child in [lower_new_left, id_right].into_iter().flatten() {
            self[child].parent = Some(lower);
        }
        for child in [lower_left, lower_right].into_iter().flatten() {
            self[child].parent = Some(id);
        }
    }

    /// Removes `id` from the level below `upper` and frees it, returning
    /// the node. The level is rebalanced; nothing is done about `upper`
    /// becoming a childless structural node.
    pub(super) fn unlink(&mut self, upper: Option<NodeId>, id: NodeId) -> Result<Node<T>, Error> {
        if let (Some(left), Some(_)) = (self[id].left, self[id].right) {
            let mut rightmost = left;
            while let Some(right) = self[rightmost].right {
                rightmost = right;
            }
            self.exchange(upper, id, rightmost);
        }

        let child = self[id].left.or(self[id].right);
        let parent = self[id].parent;
        self.replace_child(upper, parent, id, child);
        if let Some(child) = child {
            self[child].parent = parent;
        }

        if self[id].color == Color::Black {
            match child {
                Some(child) if self[child].color == Color::Red => {
                    self[child].color = Color::Black;
                }
                _ => self.remove_rebalance(upper, child, parent)?,
            }
        }

        Ok(self.nodes.remove(id.0))
    }

    /// Returns the other child of `parent`.
    fn sibling(&self, parent: NodeId, child: Option<NodeId>) -> Result<NodeId, Error> {
        let node = &self[parent];
        let sibling = if node.left == child {
            node.right
        } else {
            node.left
        };
        sibling.ok_or_else(|| violation("black node without a sibling"))
    }

    /// Restores the red-black properties after a black node was removed
    /// from below `parent`, leaving `child` (possibly nothing) in its
    /// place with one black node too few on its paths.
    fn remove_rebalance(
        &mut self,
        upper: Option<NodeId>,
        mut child: Option<NodeId>,
        mut parent: Option<NodeId>,
    ) -> Result<(), Error> {
        while let Some(p) = parent {
            let mut sibling = self.sibling(p, child)?;
            let child_is_left = self[p].left == child;

            // Case 1: red sibling. Rotate it above the parent so the
            // child gets a black sibling.
            if self[sibling].color == Color::Red {
                self[p].color = Color::Red;
                self[sibling].color = Color::Black;
                if child_is_left {
                    self.rotate_left(upper, p)?;
                } else {
                    self.rotate_right(upper, p)?;
                }
                sibling = self.sibling(p, child)?;
            }

            let (near, far) = if child_is_left {
                (self[sibling].left, self[sibling].right)
            } else {
                (self[sibling].right, self[sibling].left)
            };

            // Case 2: black sibling with black children. Push the
            // deficit up to the parent.
            if !self.is_red(near) && !self.is_red(far) {
                self[sibling].color = Color::Red;
                if self[p].color == Color::Black {
                    child = Some(p);
                    parent = self[p].parent;
                    continue;
                }
                self[p].color = Color::Black;
                break;
            }

            // Case 3: only the near nephew is red. Rotate it into the
            // sibling position.
            if !self.is_red(far) {
                self[sibling].color = Color::Red;
                if let Some(near) = near {
                    self[near].color = Color::Black;
                }
                if child_is_left {
                    self.rotate_right(upper, sibling)?;
                } else {
                    self.rotate_left(upper, sibling)?;
                }
                sibling = self.sibling(p, child)?;
            }

            // Case 4: the far nephew is red.
            self[sibling].color = self[p].color;
            self[p].color = Color::Black;
            let far = if child_is_left {
                self[sibling].right
            } else {
                self[sibling].left
            };
            if let Some(far) = far {
                self[far].color = Color::Black;
            }
            if child_is_left {
                self.rotate_left(upper, p)?;
            } else {
                self.rotate_right(upper, p)?;
            }
            break;
        }
        Ok(())
    }
}
