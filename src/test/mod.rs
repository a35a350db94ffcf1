// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compiled, immutable test model.
//!
//! [`Case`]s and [`Step`]s never change once built: binding an [`Action`] or
//! splicing hooks in produces new values keeping the original [`Id`]s.


use std::sync::atomic::{AtomicU64, Ordering};

use derive_more::with_trait::{Deref, Display, From};

#[doc(inline)]
pub use self::{
    action::{Action, Around, Timer},
    case::Case,
    source::{Chain, Node},
    step::Step,
};

/// Process-unique identifier of a compiled [`Case`] or [`Step`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[display("{_0}")]
pub struct Id(u64);

impl Id {
    /// Allocates a fresh [`Id`].
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);

        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Ordered list of [`Case`]s handed to filters and the runner.
#[derive(Clone, Debug, Default, Deref, From)]
pub struct Suite(Vec<Case>);

impl Suite {
    /// Creates an empty [`Suite`].
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a [`Case`] to this [`Suite`].
    pub fn push(&mut self, case: Case) {
        self.0.push(case);
    }

    /// Unwraps this [`Suite`] into its [`Case`]s.
    #[must_use]
    pub fn into_cases(self) -> Vec<Case> {
        self.0
    }
}

impl IntoIterator for Suite {
    type Item = Case;
    type IntoIter = std::vec::IntoIter<Case>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let (a, b) = (Id::next(), Id::next());

        assert_ne!(a, b);
        assert!(b > a);
    }
}
