// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Selection of [`Case`]s by their names.

use regex::Regex;

use crate::test::Case;

use super::Receiver;

/// Stage forwarding [`Case`]s whose name matches any of its [`Regex`]es.
///
/// Having no [`Regex`]es forwards everything.
#[derive(Debug)]
pub struct Name<R> {
    patterns: Vec<Regex>,
    next: R,
}

impl<R> Name<R> {
    /// Creates a new [`Name`] stage forwarding to the `next` [`Receiver`].
    #[must_use]
    pub const fn new(patterns: Vec<Regex>, next: R) -> Self {
        Self { patterns, next }
    }

    fn accepts(&self, case: &Case) -> bool {
        self.patterns.is_empty()
            || self.patterns.iter().any(|re| re.is_match(case.name()))
    }
}

impl<R: Receiver> Receiver for Name<R> {
    fn test_case(&mut self, case: Case) -> crate::Result<()> {
        if self.accepts(&case) {
            self.next.test_case(case)
        } else {
            tracing::debug!(name = case.name(), "filtered out by name");
            Ok(())
        }
    }

    fn done(&mut self) -> crate::Result<()> {
        self.next.done()
    }
}
