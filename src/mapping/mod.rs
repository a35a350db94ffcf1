// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Binding of [`Action`]s and hooks to compiled [`Case`]s.
//!
//! A [`Mapper`] is asked once per [`Case`] for its hooks and once per [`Step`]
//! for its [`Action`]. [`bind()`] splices the answers into a new [`Case`]:
//!
//! 1. `Before` hooks, in registration order;
//! 2. every [`Step`], each followed by its own `AfterStep` hooks;
//! 3. `After` hooks, in registration order.
//!
//! Only `After` hooks are made unskippable: once a `Before` hook fails, the
//! rest of the `Before` hooks are skipped along with the steps.
//!
//! [`Around`] hooks are not spliced but kept on the [`Case`], to be nested
//! around its execution by the [`Runner`].
//!
//! [`Runner`]: crate::Runner

pub mod definitions;

use crate::test::{source::HookKind, Action, Around, Case, Step};

#[doc(inline)]
pub use self::definitions::{Context, Definitions};

/// Provider of [`Action`]s and hooks for compiled [`Case`]s.
pub trait Mapper {
    /// Registers hooks of the given [`Case`] into the `hooks`.
    ///
    /// Registers nothing by default.
    fn bind_case(&self, case: &Case, hooks: &mut CaseHooks) {
        _ = (case, hooks);
    }

    /// Returns the [`Action`] to bind to the given [`Step`], registering its
    /// own hooks into the `hooks`.
    ///
    /// [`None`] leaves the [`Step`] undefined.
    fn bind_step(&self, step: &Step, hooks: &mut StepHooks) -> Option<Action>;
}

impl<M: Mapper + ?Sized> Mapper for &M {
    fn bind_case(&self, case: &Case, hooks: &mut CaseHooks) {
        (**self).bind_case(case, hooks);
    }

    fn bind_step(&self, step: &Step, hooks: &mut StepHooks) -> Option<Action> {
        (**self).bind_step(step, hooks)
    }
}

/// Hooks registered for a whole [`Case`].
#[derive(Clone, Debug, Default)]
pub struct CaseHooks {
    before: Vec<Action>,
    after: Vec<Action>,
    around: Vec<Around>,
}

impl CaseHooks {
    /// Registers a hook running before every [`Step`].
    pub fn before(&mut self, action: Action) -> &mut Self {
        self.before.push(action);
        self
    }

    /// Registers a hook running after every [`Step`], even once the [`Case`]
    /// is failing.
    pub fn after(&mut self, action: Action) -> &mut Self {
        self.after.push(action);
        self
    }

    /// Registers a hook wrapping the whole execution. The first registered
    /// one is the outermost.
    pub fn around(&mut self, hook: Around) -> &mut Self {
        self.around.push(hook);
        self
    }
}

/// Hooks registered for a single [`Step`].
#[derive(Clone, Debug, Default)]
pub struct StepHooks {
    after: Vec<Action>,
}

impl StepHooks {
    /// Registers a hook running right after the [`Step`].
    pub fn after(&mut self, action: Action) -> &mut Self {
        self.after.push(action);
        self
    }
}

/// Binds [`Action`]s and hooks provided by the `mapper` to the `case`.
///
/// Hook [`Step`]s already present in the `case` are kept as they are.
///
/// The returned [`Case`] keeps the [`Id`]s of the original one and of its
/// [`Step`]s.
///
/// [`Id`]: crate::test::Id
#[must_use]
pub fn bind<M: Mapper + ?Sized>(case: &Case, mapper: &M) -> Case {
    let mut hooks = CaseHooks::default();
    mapper.bind_case(case, &mut hooks);
    let CaseHooks {
        before,
        after,
        around,
    } = hooks;
    let source = case.source();

    let mut steps = before
        .into_iter()
        .map(|a| Step::hook(HookKind::Before, a, source))
        .collect::<Vec<_>>();
    for step in case.steps() {
        if step.is_hook() {
            steps.push(step.clone());
            continue;
        }
        let mut step_hooks = StepHooks::default();
        let action =
            mapper.bind_step(step, &mut step_hooks).unwrap_or_default();
        steps.push(step.with_action(action));
        steps.extend(
            step_hooks
                .after
                .into_iter()
                .map(|a| Step::hook(HookKind::AfterStep, a, source)),
        );
    }
    steps.extend(
        after
            .into_iter()
            .map(|a| Step::hook(HookKind::After, a.into_unskippable(), source)),
    );

    let around_hooks =
        case.around_hooks().iter().cloned().chain(around).collect();
    case.with_steps(steps).with_around_hooks(around_hooks)
}
