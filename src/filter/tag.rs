// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Selection of [`Case`]s by [tag expressions][1], with occurrence limits.
//!
//! [1]: https://cucumber.io/docs/cucumber/api#tag-expressions

use std::collections::HashMap;

use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;
use linked_hash_map::LinkedHashMap;

use crate::{location::Location, tag::Expression, test::Case};

use super::Receiver;

/// Stage forwarding [`Case`]s satisfying every of its [`Expression`]s.
///
/// Independently of matching, it counts every tag occurrence of every seen
/// [`Case`], and fails in [`Receiver::done()`] with a [`TagExcess`] if any
/// [`Limit`] declared by its [`Expression`]s is exceeded.
///
/// [`Limit`]: crate::tag::Limit
#[derive(Debug)]
pub struct Tags<R> {
    expressions: Vec<Expression>,

    /// The tightest limit per tag.
    limits: HashMap<String, usize>,

    /// Occurrences per tag, in order of the first encounter.
    counts: LinkedHashMap<String, Vec<Location>>,

    next: R,
}

impl<R> Tags<R> {
    /// Creates a new [`Tags`] stage forwarding to the `next` [`Receiver`].
    #[must_use]
    pub fn new(expressions: Vec<Expression>, next: R) -> Self {
        let mut limits = HashMap::<String, usize>::new();
        for limit in expressions.iter().flat_map(Expression::limits) {
            limits
                .entry(limit.tag.clone())
                .and_modify(|max| *max = (*max).min(limit.max))
                .or_insert(limit.max);
        }
        Self {
            expressions,
            limits,
            counts: LinkedHashMap::new(),
            next,
        }
    }

    fn count(&mut self, case: &Case) {
        for tag in case.tags() {
            self.counts
                .entry(tag.name.clone())
                .or_insert_with(Vec::new)
                .push(case.location().clone());
        }
    }

    fn accepts(&self, case: &Case) -> bool {
        self.expressions.iter().all(|e| e.eval(case.tag_names()))
    }

    fn breaches(&self) -> Vec<Breach> {
        self.counts
            .iter()
            .filter_map(|(tag, locations)| {
                let limit = *self.limits.get(tag)?;
                (locations.len() > limit).then(|| Breach {
                    tag: tag.clone(),
                    limit,
                    count: locations.len(),
                    locations: locations.clone(),
                })
            })
            .collect()
    }
}

impl<R: Receiver> Receiver for Tags<R> {
    fn test_case(&mut self, case: Case) -> crate::Result<()> {
        self.count(&case);
        if self.accepts(&case) {
            self.next.test_case(case)
        } else {
            tracing::debug!(
                name = case.name(),
                tags = %case.tag_names().join(" "),
                "filtered out by tags",
            );
            Ok(())
        }
    }

    fn done(&mut self) -> crate::Result<()> {
        let breaches = self.breaches();
        if breaches.is_empty() {
            return self.next.done();
        }
        for b in &breaches {
            tracing::warn!(
                tag = %b.tag,
                limit = b.limit,
                count = b.count,
                "tag limit exceeded",
            );
        }
        Err(TagExcess { breaches }.into())
    }
}

/// Single tag occurring more often than allowed.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display(
    "{tag} occurred {count} times, limit is {limit}: {}",
    locations.iter().join(", "),
)]
pub struct Breach {
    /// Name of the tag, including its leading `@`.
    pub tag: String,

    /// Allowed occurrences.
    pub limit: usize,

    /// Observed occurrences.
    pub count: usize,

    /// [`Location`]s of the [`Case`]s carrying the tag, one per occurrence.
    pub locations: Vec<Location>,
}

/// Error of tag occurrence limits being exceeded.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("Tag limits exceeded:\n{}", breaches.iter().join("\n"))]
pub struct TagExcess {
    /// Every exceeded limit, in order of the first tag encounter.
    #[error(not(source))]
    pub breaches: Vec<Breach>,
}
