// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sets of field (source) names.

use std::{convert::Infallible, fmt::Display, str::FromStr};

use indexmap::IndexSet;
use itertools::Itertools;

/// A deduplicated set of field names, e.g. all of the bandpass calibrators.
///
/// Equality is order independent, but iteration (and therefore
/// [`FieldSet::join`]) follows the order in which fields were first seen, so
/// that the strings handed to the calibration engine are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(IndexSet<String>);

impl FieldSet {
    pub fn new() -> FieldSet {
        FieldSet::default()
    }

    /// Parse a comma-separated list of fields. Whitespace around each field is
    /// trimmed, blank entries are dropped and duplicates are removed.
    pub fn parse_list(text: &str) -> FieldSet {
        text.split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect()
    }

    /// The comma-separated representation of this set. An empty set gives an
    /// empty string.
    pub fn join(&self) -> String {
        self.0.iter().join(",")
    }

    pub fn union(&self, other: &FieldSet) -> FieldSet {
        FieldSet(self.0.union(&other.0).cloned().collect())
    }

    /// All fields in `self` that aren't in `other`.
    pub fn difference(&self, other: &FieldSet) -> FieldSet {
        FieldSet(self.0.difference(&other.0).cloned().collect())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn insert<S: Into<String>>(&mut self, field: S) -> bool {
        self.0.insert(field.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|s| s.as_str())
    }
}

impl FromStr for FieldSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldSet::parse_list(s))
    }
}

impl Display for FieldSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.join())
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FieldSet(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a String;
    type IntoIter = indexmap::set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
