// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Observer aggregating the outcome of a whole run.

use std::{cell::RefCell, fmt, rc::Rc, time::Duration};

use itertools::Itertools as _;
use linked_hash_map::LinkedHashMap;

use crate::{
    event::{Bus, BusError, Carrier, Kind, Lifecycle},
    result::{Cause, Status, Strict, TestResult},
    test::Id,
};

/// Tallies of [`Step`]s (or [`Case`]s) per outcome.
///
/// [`Case`]: crate::test::Case
/// [`Step`]: crate::test::Step
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of passed ones.
    pub passed: usize,

    /// Number of skipped ones.
    pub skipped: usize,

    /// Number of undefined ones.
    pub undefined: usize,

    /// Number of pending ones.
    pub pending: usize,

    /// Number of failed ones.
    pub failed: usize,
}

impl Stats {
    /// Creates empty [`Stats`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            passed: 0,
            skipped: 0,
            undefined: 0,
            pending: 0,
            failed: 0,
        }
    }

    /// Returns the total number of tallied outcomes.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.skipped + self.undefined + self.pending + self.failed
    }

    fn record(&mut self, status: Status) {
        match status {
            Status::Unknown => {}
            Status::Passed => self.passed += 1,
            Status::Skipped => self.skipped += 1,
            Status::Undefined => self.undefined += 1,
            Status::Pending => self.pending += 1,
            Status::Failed => self.failed += 1,
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            (self.passed, "passed"),
            (self.skipped, "skipped"),
            (self.undefined, "undefined"),
            (self.pending, "pending"),
            (self.failed, "failed"),
        ]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, what)| format!("{n} {what}"))
        .join(", ");
        if parts.is_empty() {
            Ok(())
        } else {
            write!(f, " ({parts})")
        }
    }
}

/// Every result a single [`Case`] has finished with.
///
/// [`Case`]: crate::test::Case
#[derive(Clone, Debug)]
struct Record {
    name: String,
    results: Vec<TestResult>,
}

impl Record {
    fn last(&self) -> Option<&TestResult> {
        self.results.last()
    }

    fn is_flaky(&self) -> bool {
        match (self.results.first(), self.results.last()) {
            (Some(first), Some(last)) if self.results.len() > 1 => {
                !first.is_ok(Strict::all()) && last.is_ok(Strict::all())
            }
            _ => false,
        }
    }
}

/// Aggregate of [`Lifecycle`] events of a whole run.
///
/// A [`Case`] finishing several times (re-executed by its [`Around`] hooks)
/// is counted once, by its last result.
///
/// [`Around`]: crate::test::Around
/// [`Case`]: crate::test::Case
#[derive(Clone, Debug, Default)]
pub struct Summary {
    steps: Stats,
    failed_hooks: usize,
    cases: LinkedHashMap<Id, Record>,
    success: Option<bool>,
}

impl Summary {
    /// Creates an empty [`Summary`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a new [`Summary`] to the given `bus`.
    ///
    /// # Errors
    ///
    /// If the needed [`Lifecycle`] kinds are not registered in the `bus`.
    pub fn observe<E: Carrier + 'static>(
        bus: &mut Bus<E>,
    ) -> Result<Rc<RefCell<Self>>, BusError> {
        let summary = Rc::new(RefCell::new(Self::new()));
        for kind in [
            Kind::TestStepFinished,
            Kind::TestCaseFinished,
            Kind::TestRunFinished,
        ] {
            let summary = Rc::clone(&summary);
            bus.on(E::lifecycle_kind(kind), move |ev: &E| {
                if let Some(ev) = ev.lifecycle() {
                    summary.borrow_mut().record(ev);
                }
            })?;
        }
        Ok(summary)
    }

    /// Accounts the given [`Lifecycle`] event.
    pub fn record(&mut self, event: &Lifecycle) {
        match event {
            Lifecycle::TestStepFinished {
                test_step, result, ..
            } => {
                if !test_step.is_hook() {
                    self.steps.record(result.status());
                } else if result.status() == Status::Failed {
                    self.failed_hooks += 1;
                }
            }
            Lifecycle::TestCaseFinished { test_case, result } => {
                self.cases
                    .entry(test_case.id())
                    .or_insert_with(|| Record {
                        name: test_case.name().to_owned(),
                        results: Vec::new(),
                    })
                    .results
                    .push(result.clone());
            }
            Lifecycle::TestRunFinished { success } => {
                self.success = Some(*success);
            }
            Lifecycle::TestRunStarted { .. }
            | Lifecycle::TestCaseStarted { .. }
            | Lifecycle::TestStepStarted { .. } => {}
        }
    }

    /// Returns [`Stats`] of the finished non-hook [`Step`]s.
    ///
    /// [`Step`]: crate::test::Step
    #[must_use]
    pub const fn steps(&self) -> Stats {
        self.steps
    }

    /// Returns [`Stats`] of the finished [`Case`]s, by their last results.
    ///
    /// [`Case`]: crate::test::Case
    #[must_use]
    pub fn cases(&self) -> Stats {
        let mut stats = Stats::new();
        for r in self.cases.values().filter_map(Record::last) {
            stats.record(r.status());
        }
        stats
    }

    /// Returns the number of failed hook [`Step`]s.
    ///
    /// [`Step`]: crate::test::Step
    #[must_use]
    pub const fn failed_hooks(&self) -> usize {
        self.failed_hooks
    }

    /// Iterates over names and [`Cause`]s of the failed [`Case`]s.
    ///
    /// [`Case`]: crate::test::Case
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Cause)> {
        self.cases.values().filter_map(|rec| {
            rec.last()
                .and_then(TestResult::cause)
                .map(|c| (rec.name.as_str(), c))
        })
    }

    /// Iterates over names of the [`Case`]s which have finished more than
    /// once, not passing at first but passing at last.
    ///
    /// [`Case`]: crate::test::Case
    pub fn flaky(&self) -> impl Iterator<Item = &str> {
        self.cases
            .values()
            .filter(|rec| rec.is_flaky())
            .map(|rec| rec.name.as_str())
    }

    /// Returns the total time the finished [`Case`]s have taken.
    ///
    /// [`Case`]: crate::test::Case
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.cases
            .values()
            .filter_map(Record::last)
            .filter_map(TestResult::duration)
            .sum()
    }

    /// Returns the success reported by [`Lifecycle::TestRunFinished`], if
    /// the run has finished.
    #[must_use]
    pub const fn success(&self) -> Option<bool> {
        self.success
    }

    /// Indicates whether every finished [`Case`] is acceptable under the
    /// given [`Strict`] configuration and no hook has failed.
    ///
    /// [`Case`]: crate::test::Case
    #[must_use]
    pub fn ok(&self, strict: Strict) -> bool {
        self.failed_hooks == 0
            && self
                .cases
                .values()
                .filter_map(Record::last)
                .all(|r| r.is_ok(strict))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: usize, what: &str| {
            format!("{n} {what}{}", if n == 1 { "" } else { "s" })
        };
        let cases = self.cases();

        writeln!(f, "[Summary]")?;
        writeln!(f, "{}{cases}", plural(cases.total(), "scenario"))?;
        write!(f, "{}{}", plural(self.steps.total(), "step"), self.steps)?;
        if self.failed_hooks > 0 {
            write!(f, "\n{}", plural(self.failed_hooks, "hook error"))?;
        }

        let millis = u64::try_from(self.duration().as_millis())
            .unwrap_or(u64::MAX);
        write!(
            f,
            "\nFinished in {}",
            humantime::format_duration(Duration::from_millis(millis)),
        )?;

        let failures = self.failures().collect::<Vec<_>>();
        if !failures.is_empty() {
            write!(f, "\nFailures:")?;
            for (name, cause) in failures {
                write!(f, "\n  {name}: {cause}")?;
            }
        }
        let flaky = self.flaky().collect::<Vec<_>>();
        if !flaky.is_empty() {
            write!(f, "\nFlaky:\n  {}", flaky.join("\n  "))?;
        }
        Ok(())
    }
}
