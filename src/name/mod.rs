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

//! Implementation of domain names and the label arithmetic the
//! [`DomainTree`](crate::tree::DomainTree) relies on.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::ops::Index;
use std::str::FromStr;

mod builder;
mod compare;
mod error;
mod label;
pub use builder::NameBuilder;
pub use compare::{NameComparison, NameRelation};
pub use error::Error;
pub use label::Label;

/// The maximum number of labels in a domain name, counting the null
/// label of the root.
pub const MAX_N_LABELS: usize = 128;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// An absolute domain name.
///
/// Every `Name` ends with the null label of the DNS root, and the root
/// label counts towards [`Name::label_count`]: `example.test.` has three
/// labels and `.` has one. This holds for the results of name arithmetic
/// as well, so [`Name::subtract`] and [`Name::split`] always hand back
/// absolute names. The [`DomainTree`](crate::tree::DomainTree) stores
/// level-relative suffixes in exactly this form (`x.d.e.f.` stored below
/// `d.e.f.` is the name `x.`).
///
/// Internally a `Name` is a single boxed buffer holding, in order:
///
/// * one octet with the number of labels, `n_labels`;
/// * `n_labels` octets giving the offset of each label in the
///   on-the-wire representation; and
/// * the on-the-wire representation itself ([RFC 1035 § 3.1]).
///
/// This follows the representation used by the [NSD] authoritative
/// nameserver and keeps short names within a single allocation.
///
/// `Name`s are constructed through the [`FromStr`] implementation, a
/// [`NameBuilder`], or the arithmetic methods.
///
/// [NSD]: https://www.nlnetlabs.nl/projects/nsd/about/
/// [RFC 1035 § 3.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.1
#[derive(Clone)]
pub struct Name {
    repr: Box<[u8]>,
}

/// Private helpers to access the parts of the representation.
impl Name {
    /// Wraps a representation produced by a [`NameBuilder`].
    fn from_repr(repr: Box<[u8]>) -> Self {
        Self { repr }
    }

    /// Returns the offset of label `n` in the on-the-wire
    /// representation.
    fn label_offset(&self, n: usize) -> usize {
        self.label_offsets()[n] as usize
    }

    /// Returns the offsets of the labels in the on-the-wire
    /// representation.
    fn label_offsets(&self) -> &[u8] {
        &self.repr[1..1 + self.label_count()]
    }
}

////////////////////////////////////////////////////////////////////////
// NAME PUBLIC API                                                    //
////////////////////////////////////////////////////////////////////////

impl Name {
    /// Returns the name of the DNS root, `.`.
    pub fn root() -> Self {
        Self::from_repr(Box::new([1, 0, 0]))
    }

    /// Returns whether the `Name` is the DNS root `.`.
    pub fn is_root(&self) -> bool {
        self.label_count() == 1
    }

    /// Returns the number of labels in this `Name`, including the null
    /// label of the root.
    pub fn label_count(&self) -> usize {
        self.repr[0] as usize
    }

    /// Returns an iterator over the labels in this `Name`, from the
    /// leftmost label to the null label.
    pub fn labels(&self) -> Labels {
        Labels::new(self)
    }

    /// Returns whether this `Name` is equal to or a subdomain of
    /// `other`.
    pub fn eq_or_subdomain_of(&self, other: &Name) -> bool {
        self.label_count() >= other.label_count()
            && self
                .labels()
                .rev()
                .zip(other.labels().rev())
                .all(|(a, b)| a == b)
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// `Name`.
    pub fn wire_repr(&self) -> &[u8] {
        &self.repr[1 + self.label_count()..]
    }

    /// Removes `suffix` from the end of this `Name`. The result is
    /// absolute: `www.example.test.` minus `example.test.` is `www.`,
    /// and a name minus itself is the root.
    pub fn subtract(&self, suffix: &Name) -> Result<Name, Error> {
        if !self.eq_or_subdomain_of(suffix) {
            return Err(Error::NotASuffix);
        }
        self.split(0, self.label_count() - suffix.label_count())
    }

    /// Appends `suffix` to this `Name`, so that `www.` concatenated
    /// with `example.test.` is `www.example.test.`.
    pub fn concat(&self, suffix: &Name) -> Result<Name, Error> {
        let mut builder = NameBuilder::new();
        for label in self.labels().chain(suffix.labels()) {
            if !label.is_null() {
                builder.try_push_label(label)?;
            }
        }
        builder.finish()
    }

    /// Extracts `count` labels starting with label `first`. The null
    /// label is appended if the range does not already end with it, so
    /// `split(0, 1)` of `www.example.test.` is `www.` and `split(1, 3)`
    /// is `example.test.`.
    pub fn split(&self, first: usize, count: usize) -> Result<Name, Error> {
        if first + count > self.label_count() {
            return Err(Error::InvalidRange);
        }
        let mut builder = NameBuilder::new();
        for label in self.labels().skip(first).take(count) {
            if !label.is_null() {
                builder.try_push_label(label)?;
            }
        }
        builder.finish()
    }
}

impl Index<usize> for Name {
    type Output = Label;

    fn index(&self, index: usize) -> &Self::Output {
        let offset = self.label_offset(index);
        let wire = self.wire_repr();
        let len = wire[offset] as usize;
        Label::from_unchecked(&wire[offset + 1..offset + 1 + len])
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        // The null label prints as nothing, which leaves the trailing
        // dot in place.
        let mut labels = self.labels();
        if let Some(first) = labels.next() {
            first.fmt(f)?;
        }
        for label in labels {
            write!(f, ".{}", label)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.label_count() == other.label_count()
            && self.labels().zip(other.labels()).all(|(a, b)| a == b)
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `Name`s are ordered canonically ([RFC 4034 § 6.1]): as strings of
/// labels read from right to left.
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other).order
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.labels() {
            label.hash(state);
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ITERATION OVER A NAME'S LABELS                                     //
////////////////////////////////////////////////////////////////////////

/// An iterator over the [`Label`]s in a [`Name`], created by
/// [`Name::labels`].
#[derive(Clone, Debug)]
pub struct Labels<'a> {
    name: &'a Name,
    front: usize,
    back: usize,
}

impl Labels<'_> {
    fn new(name: &Name) -> Labels {
        Labels {
            name,
            front: 0,
            back: name.label_count(),
        }
    }
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a Label;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.front += 1;
            Some(&self.name[self.front - 1])
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Labels<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back > self.front {
            self.back -= 1;
            Some(&self.name[self.back])
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Labels<'_> {}

impl FusedIterator for Labels<'_> {}

////////////////////////////////////////////////////////////////////////
// PARSING OF NAMES FROM RUST STRINGS                                 //
////////////////////////////////////////////////////////////////////////

/// Parses the textual form of a fully qualified name. The string must
/// be strictly ASCII and end with a dot; escape sequences as defined by
/// [RFC 4343 § 2.1] are supported.
///
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::StrEmpty);
        } else if s == "." {
            return Ok(Name::root());
        }

        let mut remaining_octets: &[u8] = s.as_ref();
        let mut builder = NameBuilder::new();
        while let Some(&octet) = remaining_octets.first() {
            if octet == b'\\' {
                let (value, consumed) = parse_escape(&remaining_octets[1..])?;
                builder.try_push(value)?;
                remaining_octets = &remaining_octets[consumed + 1..];
            } else if octet == b'.' {
                builder.next_label()?;
                remaining_octets = &remaining_octets[1..];
            } else if !octet.is_ascii() {
                return Err(Error::StrNotAscii);
            } else {
                builder.try_push(octet)?;
                remaining_octets = &remaining_octets[1..];
            }
        }
        builder.finish()
    }
}

/// Parses an escape sequence. `remaining_octets` starts with the octet
/// immediately *after* the backslash.
fn parse_escape(remaining_octets: &[u8]) -> Result<(u8, usize), Error> {
    match remaining_octets {
        [] => Err(Error::InvalidEscape),
        [a, b, c, ..] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => {
            let value = [a, b, c]
                .iter()
                .fold(0usize, |acc, digit| 10 * acc + (**digit - b'0') as usize);
            u8::try_from(value)
                .map(|value| (value, 3))
                .map_err(|_| Error::InvalidEscape)
        }
        [first, ..] if first.is_ascii_digit() => Err(Error::InvalidEscape),
        [first, ..] => Ok((*first, 1)),
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
