// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.


mod common;

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use anyhow::anyhow;
use cucumber_core::{
    config::Configuration,
    event::{Bus, Kind, Lifecycle},
    mapping::Definitions,
    parser,
    result::Status,
    test::Case,
    Session, Summary,
};
use regex::Regex;

use self::common::init_tracing;

const FEATURE: &str = "\
Feature: Hooks
  Scenario: quiet
    Given a step
    And a step

  @loud
  Scenario: loud
    Given a step
";

/// Records every step event as `status: text`.
fn journal(bus: &mut Bus<Lifecycle>) -> Rc<RefCell<Vec<String>>> {
    let journal = Rc::new(RefCell::new(Vec::new()));
    for kind in [Kind::TestStepStarted, Kind::TestStepFinished] {
        bus.on(kind, {
            let journal = Rc::clone(&journal);
            move |ev| {
                let entry = match ev {
                    Lifecycle::TestStepStarted { test_step, .. } => {
                        format!("start: {}", test_step.text())
                    }
                    Lifecycle::TestStepFinished {
                        test_step, result, ..
                    } => format!("{}: {}", result.status(), test_step.text()),
                    _ => return,
                };
                journal.borrow_mut().push(entry);
            }
        })
        .unwrap();
    }
    journal
}

#[test]
fn failed_before_hook_skips_steps_but_not_after_hooks() {
    init_tracing();
    let feature = parser::parse_str(FEATURE).unwrap();
    let steps = Rc::new(Cell::new(0));
    let after = Rc::new(Cell::new(0));
    let definitions = Definitions::new()
        .step(Regex::new("^a step$").unwrap(), {
            let steps = Rc::clone(&steps);
            move |_| {
                steps.set(steps.get() + 1);
                Ok(())
            }
        })
        .before(Some("@loud".parse().unwrap()), |_| Err(anyhow!("no way")))
        .after(None, {
            let after = Rc::clone(&after);
            move |_| {
                after.set(after.get() + 1);
                Ok(())
            }
        });
    let mut bus = Bus::<Lifecycle>::default();
    let journal = journal(&mut bus);
    let summary = Summary::observe(&mut bus).unwrap();

    let results = Session::new(Configuration::default(), &definitions)
        .run([&feature], &mut bus)
        .unwrap();

    let statuses = results.iter().map(|(_, r)| r.status()).collect::<Vec<_>>();
    assert_eq!(statuses, [Status::Passed, Status::Failed]);
    assert_eq!(steps.get(), 2);
    assert_eq!(after.get(), 2);

    assert_eq!(
        journal.borrow()[6..],
        [
            "start: Before hook",
            "failed: Before hook",
            "start: a step",
            "skipped: a step",
            "start: After hook",
            "passed: After hook",
        ],
    );

    let summary = summary.borrow();
    assert_eq!(summary.failed_hooks(), 1);
    assert_eq!(summary.steps().passed, 2);
    assert_eq!(summary.steps().skipped, 1);
    assert!(summary.to_string().contains("1 hook error"));
}

#[test]
fn after_step_hooks_follow_tagged_steps_only() {
    init_tracing();
    let feature = parser::parse_str(FEATURE).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let definitions = Definitions::new()
        .step(Regex::new("^a step$").unwrap(), |_| Ok(()))
        .after_step(Some("@loud".parse().unwrap()), {
            let seen = Rc::clone(&seen);
            move |step| {
                seen.borrow_mut().push(step.location().to_string());
                Ok(())
            }
        });
    let mut bus = Bus::<Lifecycle>::default();
    let journal = journal(&mut bus);

    _ = Session::new(Configuration::default(), &definitions)
        .run([&feature], &mut bus)
        .unwrap();

    assert_eq!(seen.borrow().len(), 1);
    assert!(seen.borrow()[0].ends_with(":8"), "{:?}", seen.borrow());
    assert_eq!(
        journal.borrow()[4..],
        [
            "start: a step",
            "passed: a step",
            "start: AfterStep hook",
            "passed: AfterStep hook",
        ],
    );
}

#[test]
fn around_hook_retries_flaky_case() {
    init_tracing();
    let feature = parser::parse_str(FEATURE).unwrap();
    let calls = Rc::new(Cell::new(0));
    let definitions = Definitions::new()
        .step(Regex::new("^a step$").unwrap(), {
            let calls = Rc::clone(&calls);
            move |_| {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    Err(anyhow!("warming up"))
                } else {
                    Ok(())
                }
            }
        })
        .around(Some("@loud".parse().unwrap()), |run| {
            run();
            run();
        });
    let configuration = Configuration {
        tags: vec!["@loud".parse().unwrap()],
        ..Configuration::default()
    };
    let mut bus = Bus::<Lifecycle>::default();
    let finished = Rc::new(Cell::new(0));
    bus.on(Kind::TestCaseFinished, {
        let finished = Rc::clone(&finished);
        move |_| finished.set(finished.get() + 1)
    })
    .unwrap();
    let summary = Summary::observe(&mut bus).unwrap();

    let results = Session::new(configuration, &definitions)
        .run([&feature], &mut bus)
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1.status(), Status::Passed);
    assert_eq!(calls.get(), 2);
    assert_eq!(finished.get(), 2);

    let summary = summary.borrow();
    assert_eq!(summary.cases().total(), 1);
    assert_eq!(summary.flaky().collect::<Vec<_>>(), ["Scenario: loud"]);
    assert_eq!(summary.success(), Some(true));
}

#[test]
fn around_hook_may_skip_case() {
    init_tracing();
    let feature = parser::parse_str(FEATURE).unwrap();
    let definitions = Definitions::new()
        .step(Regex::new("^a step$").unwrap(), |_| Ok(()))
        .around(Some("@loud".parse().unwrap()), |_| {});
    let mut bus = Bus::<Lifecycle>::default();
    let started = Rc::new(RefCell::new(Vec::new()));
    bus.on(Kind::TestCaseStarted, {
        let started = Rc::clone(&started);
        move |ev| {
            if let Some(case) = ev.test_case() {
                started.borrow_mut().push(case.name().to_owned());
            }
        }
    })
    .unwrap();

    let results = Session::new(Configuration::default(), &definitions)
        .run([&feature], &mut bus)
        .unwrap();

    let statuses = results.iter().map(|(_, r)| r.status()).collect::<Vec<_>>();
    assert_eq!(statuses, [Status::Passed, Status::Unknown]);
    assert_eq!(*started.borrow(), ["Scenario: quiet"]);
}

#[test]
fn failed_before_hook_skips_later_before_hooks() {
    init_tracing();
    let feature = parser::parse_str(FEATURE).unwrap();
    let second = Rc::new(Cell::new(0));
    let definitions = Definitions::new()
        .step(Regex::new("^a step$").unwrap(), |_| Ok(()))
        .before(Some("@loud".parse().unwrap()), |_| Err(anyhow!("boom")))
        .before(Some("@loud".parse().unwrap()), {
            let second = Rc::clone(&second);
            move |_| {
                second.set(second.get() + 1);
                Ok(())
            }
        });
    let configuration = Configuration {
        tags: vec!["@loud".parse().unwrap()],
        ..Configuration::default()
    };
    let mut bus = Bus::<Lifecycle>::default();
    let journal = journal(&mut bus);

    let results = Session::new(configuration, &definitions)
        .run([&feature], &mut bus)
        .unwrap();

    assert_eq!(results[0].1.status(), Status::Failed);
    assert_eq!(second.get(), 0);
    assert_eq!(
        *journal.borrow(),
        [
            "start: Before hook",
            "failed: Before hook",
            "start: Before hook",
            "skipped: Before hook",
            "start: a step",
            "skipped: a step",
        ],
    );
}

#[test]
fn before_hooks_run_in_registration_order() {
    init_tracing();
    let feature = parser::parse_str(FEATURE).unwrap();
    let order = Rc::new(RefCell::new(Vec::new()));
    let hook = |label: &'static str| {
        let order = Rc::clone(&order);
        move |_: &Case| -> anyhow::Result<()> {
            order.borrow_mut().push(label);
            Ok(())
        }
    };
    let definitions = Definitions::new()
        .step(Regex::new("^a step$").unwrap(), {
            let order = Rc::clone(&order);
            move |_| {
                order.borrow_mut().push("step");
                Ok(())
            }
        })
        .before(None, hook("first"))
        .before(Some("@loud".parse().unwrap()), hook("loud"))
        .before(None, hook("last"));
    let configuration = Configuration {
        tags: vec!["@loud".parse().unwrap()],
        ..Configuration::default()
    };
    let mut bus = Bus::<Lifecycle>::default();

    let results = Session::new(configuration, &definitions)
        .run([&feature], &mut bus)
        .unwrap();

    assert_eq!(results[0].1.status(), Status::Passed);
    assert_eq!(*order.borrow(), ["first", "loud", "last", "step"]);
}
