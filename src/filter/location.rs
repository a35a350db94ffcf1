// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Selection of [`Case`]s by queried [`Location`]s.

use std::str::FromStr;

use crate::{location::Location, test::Case};

use super::Receiver;

/// Ordering of the [`Case`]s forwarded by a [`Locations`] stage.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Order {
    /// Buffer every [`Case`] and forward them in the order of the queried
    /// [`Location`]s.
    #[default]
    Sorted,

    /// Forward matching [`Case`]s as they come.
    Streamed,
}

impl FromStr for Order {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sorted" => Ok(Self::Sorted),
            "streamed" => Ok(Self::Streamed),
            _ => Err("possible options: sorted, streamed"),
        }
    }
}

/// Stage forwarding [`Case`]s matching any of the queried [`Location`]s.
///
/// A [`Case`] matching several [`Location`]s is forwarded once, at the
/// position of the first one it matches. Having no [`Location`]s forwards
/// everything.
#[derive(Debug)]
pub struct Locations<R> {
    queried: Vec<Location>,
    order: Order,
    buffer: Vec<(usize, Case)>,
    next: R,
}

impl<R> Locations<R> {
    /// Creates a new [`Locations`] stage forwarding to the `next`
    /// [`Receiver`].
    #[must_use]
    pub const fn new(queried: Vec<Location>, order: Order, next: R) -> Self {
        Self {
            queried,
            order,
            buffer: Vec::new(),
            next,
        }
    }

    /// Returns the index of the first queried [`Location`] matching the
    /// `case`.
    fn position(&self, case: &Case) -> Option<usize> {
        if self.queried.is_empty() {
            return Some(0);
        }
        self.queried.iter().position(|l| case.matches_location(l))
    }
}

impl<R: Receiver> Receiver for Locations<R> {
    fn test_case(&mut self, case: Case) -> crate::Result<()> {
        let Some(index) = self.position(&case) else {
            tracing::debug!(
                name = case.name(),
                location = %case.location(),
                "filtered out by location",
            );
            return Ok(());
        };
        match self.order {
            Order::Streamed => self.next.test_case(case),
            Order::Sorted => {
                self.buffer.push((index, case));
                Ok(())
            }
        }
    }

    fn done(&mut self) -> crate::Result<()> {
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.sort_by_key(|(index, _)| *index);
        for (_, case) in buffer {
            self.next.test_case(case)?;
        }
        self.next.done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compiler, document::Feature, parser, test::Suite};

    const FEATURE: &str = "\
Feature: Places
  Background:
    Given shared

  Scenario: first
    Given a

  Scenario: second
    Given b

  Rule: grouped
    Scenario: third
      Given c
";

    fn feature() -> Feature {
        parser::parse_str(FEATURE).unwrap()
    }

    fn run(queried: &[&str], order: Order) -> Vec<String> {
        let file = crate::document::gherkin::IN_MEMORY;
        let queried = queried
            .iter()
            .map(|q| format!("{file}{q}").parse().unwrap())
            .collect();
        let mut suite = Suite::new();

        compiler::compile(
            [&feature()],
            Locations::new(queried, order, &mut suite),
        )
        .unwrap();

        suite.iter().map(|c| c.name().to_owned()).collect()
    }

    #[test]
    fn sorts_by_queried_locations() {
        assert_eq!(
            run(&[":8", ":5"], Order::Sorted),
            ["Scenario: second", "Scenario: first"],
        );
    }

    #[test]
    fn streams_in_compiled_order() {
        assert_eq!(
            run(&[":8", ":5"], Order::Streamed),
            ["Scenario: first", "Scenario: second"],
        );
    }

    #[test]
    fn forwards_each_case_once() {
        assert_eq!(
            run(&[":5", ":5..9", ""], Order::Sorted),
            ["Scenario: first", "Scenario: second", "Scenario: third"],
        );
    }

    #[test]
    fn propagates_matches_from_enclosing_nodes() {
        assert_eq!(run(&[":11"], Order::Sorted), ["Scenario: third"]);
        assert_eq!(run(&[":2"], Order::Sorted).len(), 3);
        assert!(run(&[":4"], Order::Sorted).is_empty());
    }

    #[test]
    fn drops_other_files() {
        let mut suite = Suite::new();
        let queried = vec!["other.feature".parse().unwrap()];

        compiler::compile(
            [&feature()],
            Locations::new(queried, Order::Sorted, &mut suite),
        )
        .unwrap();

        assert!(suite.is_empty());
    }
}
