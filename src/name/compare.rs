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

//! Hierarchical comparison of [`Name`]s.

use std::cmp::Ordering;

use super::Name;

/// How two [`Name`]s relate in the DNS hierarchy.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NameRelation {
    /// The names are equal.
    Equal,

    /// The first name is a proper subdomain of the second.
    SubDomain,

    /// The first name is a proper superdomain of the second.
    SuperDomain,

    /// Neither name contains the other. They share the suffix of
    /// [`NameComparison::common_label_count`] labels, which is at least
    /// the root.
    CommonAncestor,
}

/// The result of [`Name::compare`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NameComparison {
    /// The canonical ordering of the first name relative to the second.
    pub order: Ordering,

    /// The number of labels the names have in common, counted from the
    /// right. The null label of the root counts, so this is always at
    /// least one.
    pub common_label_count: usize,

    /// The hierarchical relation of the first name to the second.
    pub relation: NameRelation,
}

impl Name {
    /// Compares this `Name` with `other`, walking the labels from right
    /// to left. The comparison stops at the first pair of labels that
    /// differ, whose ordering becomes [`NameComparison::order`]. If one
    /// name runs out of labels first, the shorter one orders first.
    pub fn compare(&self, other: &Name) -> NameComparison {
        let mut common_label_count = 0;
        for (ours, theirs) in self.labels().rev().zip(other.labels().rev()) {
            let order = ours.cmp(theirs);
            if order.is_ne() {
                return NameComparison {
                    order,
                    common_label_count,
                    relation: NameRelation::CommonAncestor,
                };
            }
            common_label_count += 1;
        }

        let order = self.label_count().cmp(&other.label_count());
        let relation = match order {
            Ordering::Less => NameRelation::SuperDomain,
            Ordering::Equal => NameRelation::Equal,
            Ordering::Greater => NameRelation::SubDomain,
        };
        NameComparison {
            order,
            common_label_count,
            relation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    #[test]
    fn compare_equal_ignores_case() {
        let cmp = name("www.KNET.cN.").compare(&name("www.knet.cn."));
        assert_eq!(cmp.order, Ordering::Equal);
        assert_eq!(cmp.common_label_count, 4);
        assert_eq!(cmp.relation, NameRelation::Equal);
    }

    #[test]
    fn compare_detects_superdomain_and_subdomain() {
        let cmp = name("baidu.com.").compare(&name("www.baidu.com."));
        assert_eq!(cmp.relation, NameRelation::SuperDomain);
        assert_eq!(cmp.order, Ordering::Less);
        assert_eq!(cmp.common_label_count, 3);

        let cmp = name("www.baidu.com.").compare(&name("baidu.com."));
        assert_eq!(cmp.relation, NameRelation::SubDomain);
        assert_eq!(cmp.order, Ordering::Greater);
        assert_eq!(cmp.common_label_count, 3);
    }

    #[test]
    fn compare_detects_common_ancestor() {
        let cmp = name("baidu.com.").compare(&name("baidu.cn."));
        assert_eq!(cmp.relation, NameRelation::CommonAncestor);
        assert_eq!(cmp.common_label_count, 1);
        assert_eq!(cmp.order, Ordering::Greater);

        let cmp = name("a.example.").compare(&name("b.example."));
        assert_eq!(cmp.relation, NameRelation::CommonAncestor);
        assert_eq!(cmp.common_label_count, 2);
        assert_eq!(cmp.order, Ordering::Less);
    }

    #[test]
    fn compare_with_root() {
        let root = Name::root();
        let cmp = root.compare(&root);
        assert_eq!(cmp.relation, NameRelation::Equal);
        assert_eq!(cmp.common_label_count, 1);

        let cmp = name("com.").compare(&root);
        assert_eq!(cmp.relation, NameRelation::SubDomain);
        assert_eq!(cmp.common_label_count, 1);
    }
}
