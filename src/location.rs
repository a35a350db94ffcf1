// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Positions inside `.feature` files and Rust sources.
//!
//! A [`Location`] is a file paired with a [`Lines`] specification. Locations
//! are produced by the [`compiler`] out of document positions, by hook
//! registration out of Rust call sites, and by users querying which
//! [`test::Case`]s to run.
//!
//! [`compiler`]: crate::compiler
//! [`test::Case`]: crate::test::Case

use std::{collections::BTreeSet, fmt, panic, str::FromStr};

use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;

/// Lines of a file a [`Location`] points to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Lines {
    /// Single line.
    Exact(usize),

    /// Inclusive range of lines, `first <= last` always holds.
    Range(usize, usize),

    /// Explicit non-empty set of lines.
    Set(BTreeSet<usize>),

    /// Any line of the file.
    Wildcard,
}

impl Lines {
    /// Creates a [`Lines::Range`], normalizing reversed bounds.
    #[must_use]
    pub fn range(a: usize, b: usize) -> Self {
        Self::Range(a.min(b), a.max(b))
    }

    /// Indicates whether the given `line` is covered.
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        match self {
            Self::Exact(n) => *n == line,
            Self::Range(first, last) => (*first..=*last).contains(&line),
            Self::Set(set) => set.contains(&line),
            Self::Wildcard => true,
        }
    }

    /// Indicates whether these [`Lines`] share at least one line with the
    /// `other` ones. [`Lines::Wildcard`] intersects with anything.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Wildcard, _) | (_, Self::Wildcard) => true,
            (Self::Exact(n), o) | (o, Self::Exact(n)) => o.contains(*n),
            (Self::Set(set), o) | (o, Self::Set(set)) => {
                set.iter().any(|n| o.contains(*n))
            }
            (Self::Range(a_first, a_last), Self::Range(b_first, b_last)) => {
                a_first <= b_last && b_first <= a_last
            }
        }
    }
}

impl fmt::Display for Lines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Range(first, last) => write!(f, "{first}..{last}"),
            Self::Set(set) => write!(f, "{}", set.iter().join(":")),
            Self::Wildcard => Ok(()),
        }
    }
}

/// Position inside some file: a `file` with a [`Lines`] specification.
///
/// Equality is structural, so [`Location`]s may be de-duplicated.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    /// Path of the file.
    file: String,

    /// Lines of the `file`.
    lines: Lines,
}

impl Location {
    /// Creates a new [`Location`].
    ///
    /// # Errors
    ///
    /// If the `file` is empty, or the `lines` are an empty [`Lines::Set`].
    pub fn new(
        file: impl Into<String>,
        lines: Lines,
    ) -> Result<Self, InvalidLocation> {
        let file = file.into();
        if file.is_empty() {
            return Err(InvalidLocation::new(file, "file is required"));
        }
        if matches!(&lines, Lines::Set(set) if set.is_empty()) {
            return Err(InvalidLocation::new(file, "empty set of lines"));
        }
        Ok(Self { file, lines })
    }

    /// Creates a [`Location`] pointing to a single `line` of the `file`.
    ///
    /// # Errors
    ///
    /// If the `file` is empty.
    pub fn exact(
        file: impl Into<String>,
        line: usize,
    ) -> Result<Self, InvalidLocation> {
        Self::new(file, Lines::Exact(line))
    }

    /// Creates a [`Location`] matching any line of the `file`.
    ///
    /// # Errors
    ///
    /// If the `file` is empty.
    pub fn wildcard(file: impl Into<String>) -> Result<Self, InvalidLocation> {
        Self::new(file, Lines::Wildcard)
    }

    /// Captures the Rust source line calling this function.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let caller = panic::Location::caller();
        Self {
            // `track_caller` always reports a non-empty file.
            file: caller.file().to_owned(),
            lines: Lines::Exact(caller.line() as usize),
        }
    }

    /// Returns the file of this [`Location`].
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Returns the [`Lines`] of this [`Location`].
    #[must_use]
    pub const fn lines(&self) -> &Lines {
        &self.lines
    }

    /// Returns a new [`Location`] in the same file on the given `lines`.
    ///
    /// # Errors
    ///
    /// If the `lines` are an empty [`Lines::Set`].
    pub fn on_line(&self, lines: Lines) -> Result<Self, InvalidLocation> {
        Self::new(self.file.clone(), lines)
    }

    /// Indicates whether this [`Location`] and the `other` one point to the
    /// same file with intersecting [`Lines`].
    ///
    /// The relation is symmetric.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.file == other.file && self.lines.intersects(&other.lines)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lines {
            Lines::Wildcard => write!(f, "{}", self.file),
            lines => write!(f, "{}:{lines}", self.file),
        }
    }
}

impl FromStr for Location {
    type Err = InvalidLocation;

    /// Parses `file`, `file:12`, `file:3..7` or `file:1:5:9`.
    ///
    /// Windows drive prefixes (`C:\...`) are not treated as line specs, as
    /// only trailing numeric segments are.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut numbers = Vec::new();
        let mut range = None;
        let mut file = s;

        while let Some((head, tail)) = file.rsplit_once(':') {
            if let Some((a, b)) = tail.split_once("..") {
                if range.is_some() || !numbers.is_empty() {
                    return Err(InvalidLocation::new(s, "malformed line range"));
                }
                let (Ok(a), Ok(b)) = (a.parse(), b.parse()) else {
                    return Err(InvalidLocation::new(s, "malformed line range"));
                };
                range = Some(Lines::range(a, b));
            } else if let Ok(n) = tail.parse::<usize>() {
                if range.is_some() {
                    return Err(InvalidLocation::new(s, "malformed line range"));
                }
                numbers.push(n);
            } else {
                break;
            }
            file = head;
        }

        let lines = match (range, numbers.len()) {
            (Some(range), _) => range,
            (None, 0) => Lines::Wildcard,
            (None, 1) => Lines::Exact(numbers[0]),
            (None, _) => Lines::Set(numbers.into_iter().collect()),
        };
        Self::new(file, lines).map_err(|e| InvalidLocation::new(s, e.reason))
    }
}

/// Error of constructing an invalid [`Location`].
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("Invalid location `{input}`: {reason}")]
pub struct InvalidLocation {
    /// Input the [`Location`] was constructed from.
    #[error(not(source))]
    pub input: String,

    /// Reason of the failure.
    #[error(not(source))]
    pub reason: &'static str,
}

impl InvalidLocation {
    /// Creates a new [`InvalidLocation`] error.
    #[must_use]
    pub fn new(input: impl Into<String>, reason: &'static str) -> Self {
        Self {
            input: input.into(),
            reason,
        }
    }
}
