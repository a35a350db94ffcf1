// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for executing [`Case`]s.
//!
//! # Order guarantees
//!
//! [`Case`]s run one at a time, and so do their [`Step`]s. For every executed
//! [`Case`] the [`Runner`] publishes [`Lifecycle::TestCaseStarted`], then a
//! [`Lifecycle::TestStepStarted`] and [`Lifecycle::TestStepFinished`] pair
//! per [`Step`], then [`Lifecycle::TestCaseFinished`]. [`Around`] hooks wrap
//! this whole sequence, so a hook continuing twice produces two of them.
//!
//! [`Around`]: crate::test::Around
//! [`Step`]: crate::test::Step

pub mod status;

use std::rc::Rc;

use crate::{
    event::{Bus, Carrier, Lifecycle},
    result::TestResult,
    test::{Around, Case, Timer},
};

#[doc(inline)]
pub use self::status::Status;

/// Strategy of resolving [`Step`]s.
///
/// [`Step`]: crate::test::Step
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Steps are executed until the [`Case`] stops passing, then skipped.
    #[default]
    Execute,

    /// Nothing is invoked, neither steps nor hooks. Surfaces undefined steps.
    DryRun,
}

/// Executor of [`Case`]s publishing their lifecycle into a [`Bus`].
#[derive(Debug)]
pub struct Runner<'b, E: Carrier> {
    bus: &'b mut Bus<E>,
    mode: Mode,
}

impl<'b, E: Carrier> Runner<'b, E> {
    /// Creates a new [`Runner`] publishing into the given `bus`.
    #[must_use]
    pub fn new(bus: &'b mut Bus<E>, mode: Mode) -> Self {
        Self { bus, mode }
    }

    /// Returns the [`Mode`] of this [`Runner`].
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Runs the given `case`, nested inside its [`Around`] hooks (unless in
    /// [`Mode::DryRun`]), and returns its aggregate [`TestResult`].
    ///
    /// If an [`Around`] hook re-executes the [`Case`], the [`TestResult`] of
    /// the last execution is returned. If the [`Case`] is never executed,
    /// it's [`TestResult::Unknown`].
    ///
    /// # Errors
    ///
    /// If [`Lifecycle`] kinds are not registered in the [`Bus`].
    pub fn run(&mut self, case: &Rc<Case>) -> crate::Result<TestResult> {
        if self.mode == Mode::DryRun || case.around_hooks().is_empty() {
            return self.execute(case);
        }

        let mut outcome = None;
        Around::wrap(case.around_hooks(), &mut || {
            let res = self.execute(case);
            outcome = match outcome.take() {
                Some(Err(e)) => Some(Err(e)),
                _ => Some(res),
            };
        });
        outcome.unwrap_or_else(|| {
            tracing::debug!(name = case.name(), "never executed by its hooks");
            Ok(TestResult::Unknown)
        })
    }

    /// Executes the [`Step`]s of the `case` once.
    ///
    /// [`Step`]: crate::test::Step
    fn execute(&mut self, case: &Rc<Case>) -> crate::Result<TestResult> {
        let span = tracing::info_span!(
            "test_case",
            id = %case.id(),
            name = case.name(),
        );
        let _entered = span.enter();

        self.publish(Lifecycle::TestCaseStarted {
            test_case: Rc::clone(case),
        })?;

        let timer = Timer::start();
        let mut status = Status::default();
        let mut undefined = None;
        for step in case.steps() {
            self.publish(Lifecycle::TestStepStarted {
                test_case: Rc::clone(case),
                test_step: step.clone(),
            })?;

            let result = match self.mode {
                Mode::DryRun => step.dry_run(),
                Mode::Execute if status.is_running() => step.execute(),
                Mode::Execute => step.skip(),
            };
            let result = match result {
                r @ TestResult::Undefined { message: None, .. } => {
                    r.with_message(format!("Undefined step: \"{}\"", step.text()))
                }
                r => r,
            };
            tracing::debug!(step = step.text(), %result, "step finished");

            match self.mode {
                Mode::Execute => status = status.next(&result),
                Mode::DryRun => {
                    if undefined.is_none()
                        && matches!(result, TestResult::Undefined { .. })
                    {
                        undefined = Some(result.clone());
                    }
                }
            }

            self.publish(Lifecycle::TestStepFinished {
                test_case: Rc::clone(case),
                test_step: step.clone(),
                result,
            })?;
        }

        let duration = timer.elapsed();
        let result = match self.mode {
            Mode::Execute => status.into_result(duration),
            Mode::DryRun if case.steps().is_empty() => TestResult::Unknown,
            Mode::DryRun => undefined
                .unwrap_or_else(TestResult::skipped)
                .with_duration(duration),
        };
        tracing::debug!(%result, "test case finished");

        self.publish(Lifecycle::TestCaseFinished {
            test_case: Rc::clone(case),
            result: result.clone(),
        })?;
        Ok(result)
    }

    fn publish(&mut self, event: Lifecycle) -> crate::Result<()> {
        Ok(self.bus.broadcast(E::from(event))?)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::{
        event::Kind,
        result,
        test::{source::Node, Action, Chain, Step},
        Location,
    };

    fn case(actions: Vec<Action>) -> Case {
        let location = Location::exact("a.feature", 1).unwrap();
        let source = Chain::new(Node::Scenario(crate::test::source::Header {
            keyword: "Scenario".into(),
            name: "run".into(),
            location,
            tags: Vec::new(),
        }));
        let steps = actions
            .into_iter()
            .enumerate()
            .map(|(i, a)| {
                Step::new(format!("step {i}"), None, source.clone())
                    .with_action(a)
            })
            .collect();
        Case::new(source, steps)
    }

    fn recorded(bus: &mut Bus<Lifecycle>) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in Kind::ALL {
            let log = Rc::clone(&log);
            bus.on(kind, move |ev: &Lifecycle| {
                let entry = match ev {
                    Lifecycle::TestStepFinished {
                        test_step, result, ..
                    } => format!("{kind} {} {}", test_step.text(), result.status()),
                    Lifecycle::TestCaseFinished { result, .. } => {
                        format!("{kind} {}", result.status())
                    }
                    _ => kind.to_string(),
                };
                log.borrow_mut().push(entry);
            })
            .unwrap();
        }
        bus.start();
        log
    }

    #[test]
    fn sticks_to_first_failure() {
        let invoked = Rc::new(Cell::new(0));
        let third = {
            let invoked = Rc::clone(&invoked);
            Action::new(move || {
                invoked.set(invoked.get() + 1);
                Ok(())
            })
        };
        let case = Rc::new(case(vec![
            Action::new(|| Ok(())),
            Action::new(|| Err(anyhow::anyhow!("boom"))),
            third,
        ]));
        let mut bus = Bus::<Lifecycle>::default();
        let log = recorded(&mut bus);

        let res = Runner::new(&mut bus, Mode::Execute).run(&case).unwrap();

        assert_eq!(res.status(), result::Status::Failed);
        assert_eq!(invoked.get(), 0);
        assert_eq!(
            *log.borrow(),
            [
                "test_case_started",
                "test_step_started",
                "test_step_finished step 0 passed",
                "test_step_started",
                "test_step_finished step 1 failed",
                "test_step_started",
                "test_step_finished step 2 skipped",
                "test_case_finished failed",
            ],
        );
    }

    #[test]
    fn runs_unskippable_steps_after_failure() {
        let cleaned = Rc::new(Cell::new(false));
        let cleanup = {
            let cleaned = Rc::clone(&cleaned);
            Action::unskippable(move || {
                cleaned.set(true);
                Ok(())
            })
        };
        let case = Rc::new(case(vec![
            Action::new(|| Err(result::pending("later"))),
            cleanup,
        ]));
        let mut bus = Bus::<Lifecycle>::default();

        let res = Runner::new(&mut bus, Mode::Execute).run(&case).unwrap();

        assert_eq!(res.status(), result::Status::Pending);
        assert!(cleaned.get());
    }

    #[test]
    fn reports_undefined_steps() {
        let case = Rc::new(case(vec![Action::Undefined]));
        let mut bus = Bus::<Lifecycle>::default();

        let res = Runner::new(&mut bus, Mode::Execute).run(&case).unwrap();

        assert_eq!(res.status(), result::Status::Undefined);
        assert_eq!(res.message().as_deref(), Some("Undefined step: \"step 0\""));
    }

    #[test]
    fn dry_run_invokes_nothing() {
        let invoked = Rc::new(Cell::new(false));
        let hook_invoked = Rc::new(Cell::new(false));
        let action = {
            let invoked = Rc::clone(&invoked);
            Action::unskippable(move || {
                invoked.set(true);
                Ok(())
            })
        };
        let around = {
            let hook_invoked = Rc::clone(&hook_invoked);
            Around::new(move |next| {
                hook_invoked.set(true);
                next();
            })
        };
        let defined = Rc::new(
            case(vec![action.clone()]).with_around_hooks(vec![around]),
        );
        let undefined = Rc::new(case(vec![action, Action::Undefined]));
        let mut bus = Bus::<Lifecycle>::default();
        let mut runner = Runner::new(&mut bus, Mode::DryRun);

        assert_eq!(runner.run(&defined).unwrap().status(), result::Status::Skipped);
        assert_eq!(runner.run(&undefined).unwrap().status(), result::Status::Undefined);
        assert!(!invoked.get());
        assert!(!hook_invoked.get());
    }

    #[test]
    fn around_hooks_may_repeat_execution() {
        let invoked = Rc::new(Cell::new(0));
        let step = {
            let invoked = Rc::clone(&invoked);
            Action::new(move || {
                invoked.set(invoked.get() + 1);
                Ok(())
            })
        };
        let case = Rc::new(case(vec![step]).with_around_hooks(vec![
            Around::new(|next| {
                next();
                next();
            }),
        ]));
        let mut bus = Bus::<Lifecycle>::default();
        let log = recorded(&mut bus);

        let res = Runner::new(&mut bus, Mode::Execute).run(&case).unwrap();

        assert_eq!(res.status(), result::Status::Passed);
        assert_eq!(invoked.get(), 2);
        let started = log
            .borrow()
            .iter()
            .filter(|e| *e == "test_case_started")
            .count();
        assert_eq!(started, 2);
        assert_eq!(log.borrow().len(), 8);
    }

    #[test]
    fn around_hooks_may_skip_execution() {
        let case = Rc::new(
            case(vec![Action::new(|| Ok(()))])
                .with_around_hooks(vec![Around::new(|_| {})]),
        );
        let mut bus = Bus::<Lifecycle>::default();
        let log = recorded(&mut bus);

        let res = Runner::new(&mut bus, Mode::Execute).run(&case).unwrap();

        assert_eq!(res, TestResult::Unknown);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn fails_on_unregistered_kinds() {
        let case = Rc::new(case(vec![Action::new(|| Ok(()))]));
        let mut bus = Bus::<Lifecycle>::new([Kind::TestCaseStarted]);

        let res = Runner::new(&mut bus, Mode::Execute).run(&case);

        assert!(matches!(res, Err(crate::Error::Bus(_))));
    }
}
