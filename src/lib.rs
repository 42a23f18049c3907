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

//! A hierarchical tree of domain names.
//!
//! The [`DomainTree`] stores each level of the DNS hierarchy as its own
//! red-black tree of relative names, linked to the levels above and
//! below it. Lookups find the exact node for a name or its closest
//! enclosing name, and record the path taken in a [`NodeChain`].
//!
//! ```
//! use domaintree::{DomainTree, SearchResult};
//!
//! let mut tree = DomainTree::new(false);
//! let example = tree.insert_data(&"example.".parse().unwrap(), 1).unwrap();
//! let www = "www.example.".parse().unwrap();
//! assert_eq!(tree.search(&www), SearchResult::PartialMatch(example));
//! ```

pub mod name;
pub mod tree;

pub use name::Name;
pub use tree::{DomainTree, Node, NodeChain, NodeId, SearchResult};
