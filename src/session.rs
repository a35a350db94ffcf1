// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Whole test run: compiling, filtering, binding and running [`Case`]s.

use std::rc::Rc;

use crate::{
    compiler,
    config::Configuration,
    document::Feature,
    event::{Bus, Carrier, Lifecycle},
    filter::{self, Bind},
    mapping::Mapper,
    result::TestResult,
    runner::Runner,
    test::{Case, Suite},
};

/// Test run of [`Feature`]s against a [`Mapper`].
#[derive(Debug)]
pub struct Session<'m, M: ?Sized> {
    configuration: Configuration,
    mapper: &'m M,
}

impl<'m, M: Mapper + ?Sized> Session<'m, M> {
    /// Creates a new [`Session`].
    #[must_use]
    pub const fn new(configuration: Configuration, mapper: &'m M) -> Self {
        Self {
            configuration,
            mapper,
        }
    }

    /// Returns the [`Configuration`] of this [`Session`].
    #[must_use]
    pub const fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Compiles the `features` into [`Case`]s selected by the configured
    /// filters, with [`Action`]s and hooks bound.
    ///
    /// # Errors
    ///
    /// If some [`Feature`] cannot be compiled, or tag limits are exceeded.
    ///
    /// [`Action`]: crate::test::Action
    pub fn collect<'f>(
        &self,
        features: impl IntoIterator<Item = &'f Feature>,
    ) -> crate::Result<Vec<Case>> {
        let specs = self.configuration.filter_specs();
        let mut suite = Suite::new();
        compiler::compile(
            features,
            filter::chain(&specs, Bind::new(self.mapper, &mut suite)),
        )?;
        Ok(suite.into_cases())
    }

    /// Runs the `features`, publishing the whole lifecycle into the `bus`.
    ///
    /// The `bus` is started once [`Lifecycle::TestRunStarted`] is broadcast,
    /// so its handlers follow the run as it goes.
    ///
    /// Returns every executed [`Case`] along with its [`TestResult`].
    ///
    /// # Errors
    ///
    /// If the [`Case`]s cannot be [collected][1], or [`Lifecycle`] kinds are
    /// not registered in the `bus`. Nothing is run in the former case.
    ///
    /// [1]: Session::collect
    pub fn run<'f, E: Carrier>(
        &self,
        features: impl IntoIterator<Item = &'f Feature>,
        bus: &mut Bus<E>,
    ) -> crate::Result<Vec<(Rc<Case>, TestResult)>> {
        let cases =
            self.collect(features)?.into_iter().map(Rc::new).collect::<Vec<_>>();
        tracing::info!(count = cases.len(), "running test cases");

        bus.broadcast(E::from(Lifecycle::TestRunStarted {
            test_cases: cases.clone(),
        }))?;
        bus.start();

        let strict = self.configuration.strict();
        let mut runner = Runner::new(bus, self.configuration.mode());
        let mut success = true;
        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            let result = runner.run(&case)?;
            success &= result.is_ok(strict);
            results.push((case, result));
        }

        bus.broadcast(E::from(Lifecycle::TestRunFinished { success }))?;
        tracing::info!(success, "test run finished");

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use regex::Regex;

    use super::*;
    use crate::{event::Kind, mapping::Definitions, parser, result::Status};

    const FEATURE: &str = "\
Feature: Session
  @fast
  Scenario: passing
    Given ok

  @slow
  Scenario: failing
    Given broken

  @fast
  Scenario: undefined
    Given nothing
";

    fn definitions() -> Definitions {
        Definitions::new()
            .step(Regex::new("^ok$").unwrap(), |_| Ok(()))
            .step(Regex::new("^broken$").unwrap(), |_| {
                Err(anyhow::anyhow!("broken"))
            })
    }

    #[test]
    fn runs_selected_cases() {
        let feature = parser::parse_str(FEATURE).unwrap();
        let definitions = definitions();
        let configuration = Configuration {
            tags: vec!["@fast".parse().unwrap()],
            ..Configuration::default()
        };
        let mut bus = Bus::<Lifecycle>::default();

        let results = Session::new(configuration, &definitions)
            .run([&feature], &mut bus)
            .unwrap();

        let statuses = results
            .iter()
            .map(|(c, r)| (c.name().to_owned(), r.status()))
            .collect::<Vec<_>>();
        assert_eq!(
            statuses,
            [
                ("Scenario: passing".to_owned(), Status::Passed),
                ("Scenario: undefined".to_owned(), Status::Undefined),
            ],
        );
        assert!(bus.is_started());
    }

    #[test]
    fn reports_run_success_by_strictness() {
        let feature = parser::parse_str(FEATURE).unwrap();
        let definitions = definitions();

        for (strict, expected) in [(false, true), (true, false)] {
            let configuration = Configuration {
                tags: vec!["@fast".parse().unwrap()],
                strict,
                ..Configuration::default()
            };
            let mut bus = Bus::<Lifecycle>::default();
            let success = Rc::new(RefCell::new(None));
            bus.on(Kind::TestRunFinished, {
                let success = Rc::clone(&success);
                move |ev| {
                    if let Lifecycle::TestRunFinished { success: s } = ev {
                        *success.borrow_mut() = Some(*s);
                    }
                }
            })
            .unwrap();

            _ = Session::new(configuration, &definitions)
                .run([&feature], &mut bus)
                .unwrap();

            assert_eq!(*success.borrow(), Some(expected), "strict: {strict}");
        }
    }

    #[test]
    fn aborts_on_tag_excess_before_running() {
        let feature = parser::parse_str(FEATURE).unwrap();
        let definitions = definitions();
        let configuration = Configuration {
            tags: vec!["@fast:1".parse().unwrap()],
            ..Configuration::default()
        };
        let mut bus = Bus::<Lifecycle>::default();

        let res = Session::new(configuration, &definitions)
            .run([&feature], &mut bus);

        assert!(matches!(res, Err(crate::Error::TagExcess(_))));
        assert_eq!(bus.pending(), 0);
    }
}
