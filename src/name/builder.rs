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

//! Implementation of the [`NameBuilder`] structure.

use arrayvec::ArrayVec;

use super::{Error, Label, Name, MAX_LABEL_LEN, MAX_N_LABELS, MAX_WIRE_LEN};

/// A facility to build [`Name`]s label by label.
///
/// The builder keeps the on-the-wire representation and the label
/// offsets in fixed-size buffers large enough for any valid name, so
/// building requires a single heap allocation when the name is
/// finished.
///
/// A new `NameBuilder` starts with a single null label; finishing it
/// right away yields the root. Octets go into the current label through
/// [`NameBuilder::try_push`] and [`NameBuilder::try_push_slice`],
/// [`NameBuilder::next_label`] closes the current label, and
/// [`NameBuilder::try_push_label`] appends a whole label at once. Since
/// the builder always ends on a fresh (null) label after
/// `next_label`, names built from whole labels are always absolute:
///
/// ```
/// use domaintree::name::{Name, NameBuilder};
/// let mut builder = NameBuilder::new();
/// builder.try_push_slice(b"example").unwrap();
/// builder.next_label().unwrap();
/// builder.try_push_slice(b"test").unwrap();
/// builder.next_label().unwrap();
/// assert_eq!(builder.finish().unwrap(), "example.test.".parse().unwrap());
/// ```
pub struct NameBuilder {
    wire_repr: ArrayVec<u8, MAX_WIRE_LEN>,
    label_offsets: ArrayVec<u8, MAX_N_LABELS>,
    label_start: usize,
    label_len: u8,
}

impl NameBuilder {
    /// Constructs a new `NameBuilder`, which initially contains a
    /// single null label.
    pub fn new() -> Self {
        let mut wire_repr = ArrayVec::new();
        wire_repr.push(0);
        let mut label_offsets = ArrayVec::new();
        label_offsets.push(0);
        Self {
            wire_repr,
            label_offsets,
            label_start: 0,
            label_len: 0,
        }
    }

    /// Determines whether the name currently stored in the builder
    /// ends with the null label.
    pub fn is_fully_qualified(&self) -> bool {
        self.label_len == 0
    }

    /// Tries to add the given octet to the current label. In the error
    /// case, the builder's state remains unchanged.
    pub fn try_push(&mut self, octet: u8) -> Result<(), Error> {
        if self.label_len >= (MAX_LABEL_LEN as u8) {
            Err(Error::LabelTooLong)
        } else if self.wire_repr.try_push(octet).is_ok() {
            self.label_len += 1;
            Ok(())
        } else {
            Err(Error::NameTooLong)
        }
    }

    /// Tries to add the given slice to the current label. In the error
    /// case, the builder's state remains unchanged.
    pub fn try_push_slice(&mut self, octets: &[u8]) -> Result<(), Error> {
        if (self.label_len as usize) + octets.len() > MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else if self.wire_repr.try_extend_from_slice(octets).is_ok() {
            self.label_len += octets.len() as u8;
            Ok(())
        } else {
            Err(Error::NameTooLong)
        }
    }

    /// Appends a complete, non-null label and starts a new one. The
    /// current label must be empty.
    pub fn try_push_label(&mut self, label: &Label) -> Result<(), Error> {
        if !self.is_fully_qualified() || label.is_null() {
            return Err(Error::NullNonTerminal);
        }
        self.try_push_slice(label.octets())?;
        self.next_label()
    }

    /// Finishes the current label and starts a new one. Only the last
    /// label of a domain name may be null, so this fails if the current
    /// label is null; it also fails if the name would become too long.
    /// In the error case, the builder's state remains unchanged.
    pub fn next_label(&mut self) -> Result<(), Error> {
        if self.is_fully_qualified() {
            Err(Error::NullNonTerminal)
        } else if self.wire_repr.is_full() || self.label_offsets.is_full() {
            Err(Error::NameTooLong)
        } else {
            self.wire_repr[self.label_start] = self.label_len;
            self.label_start = self.wire_repr.len();
            self.label_len = 0;
            self.wire_repr.push(0);
            self.label_offsets.push(self.label_start as u8);
            Ok(())
        }
    }

    /// Finishes the construction of the domain name, consuming the
    /// builder. Since the last label of a domain name must be null,
    /// this fails if the current label is not.
    pub fn finish(self) -> Result<Name, Error> {
        if !self.is_fully_qualified() {
            return Err(Error::NonNullTerminal);
        }
        let mut repr = Vec::with_capacity(1 + self.label_offsets.len() + self.wire_repr.len());
        repr.push(self.label_offsets.len() as u8);
        repr.extend_from_slice(&self.label_offsets);
        repr.extend_from_slice(&self.wire_repr);
        Ok(Name::from_repr(repr.into_boxed_slice()))
    }
}

impl Default for NameBuilder {
    fn default() -> Self {
        Self::new()
    }
}
