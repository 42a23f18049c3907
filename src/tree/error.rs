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

//! Implementation of the [`Error`] type for tree operations.

use std::fmt;

use super::NodeId;
use crate::name;

/// An error type for [`DomainTree`](super::DomainTree) operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The name being inserted already has a node with data. The
    /// existing node is provided.
    AlreadyExists(NodeId),

    /// The name is not in the tree.
    NotFound,

    /// A [`NodeChain`](super::NodeChain) that was not empty was passed
    /// to an operation that requires an empty one.
    InvalidArgument,

    /// The red-black structure of a level was found to be corrupt. The
    /// tree should not be used further.
    InvariantViolation(&'static str),

    /// An operation on a domain name failed.
    Name(name::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::AlreadyExists(_) => f.write_str("name already exists"),
            Self::NotFound => f.write_str("name not found"),
            Self::InvalidArgument => f.write_str("node chain is not empty"),
            Self::InvariantViolation(what) => write!(f, "tree invariant violated: {}", what),
            Self::Name(e) => write!(f, "name error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Name(e) => Some(e),
            _ => None,
        }
    }
}

impl From<name::Error> for Error {
    fn from(e: name::Error) -> Self {
        Self::Name(e)
    }
}
