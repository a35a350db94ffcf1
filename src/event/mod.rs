// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key occurrences in a lifecycle of a test run.
//!
//! The top-level enum here is [`Lifecycle`]. Hosts needing their own events
//! define an enum wrapping [`Lifecycle`] and implement [`Event`] and
//! [`Carrier`] for it, so the [`Runner`] publishes into the same [`Bus`].
//!
//! [`Runner`]: crate::Runner

pub mod bus;

use std::{fmt, hash::Hash, rc::Rc};

use derive_more::with_trait::Display;

use crate::{
    result::TestResult,
    test::{Case, Step},
};

#[doc(inline)]
pub use self::bus::{Bus, BusError};

/// Event dispatched through a [`Bus`] by its [`Event::Kind`].
pub trait Event {
    /// Closed set of kinds of this [`Event`].
    type Kind: Copy + Eq + Hash + fmt::Debug;

    /// Returns the kind of this [`Event`].
    fn kind(&self) -> Self::Kind;
}

/// [`Event`] able to carry [`Lifecycle`] events.
pub trait Carrier: Event + From<Lifecycle> {
    /// Returns the wrapped [`Lifecycle`] event, if this is one.
    fn lifecycle(&self) -> Option<&Lifecycle>;

    /// Maps a lifecycle [`Kind`] into an [`Event::Kind`] of this [`Carrier`].
    fn lifecycle_kind(kind: Kind) -> Self::Kind;
}

/// Kind of a [`Lifecycle`] event.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Kind {
    /// [`Lifecycle::TestRunStarted`].
    #[display("test_run_started")]
    TestRunStarted,

    /// [`Lifecycle::TestCaseStarted`].
    #[display("test_case_started")]
    TestCaseStarted,

    /// [`Lifecycle::TestStepStarted`].
    #[display("test_step_started")]
    TestStepStarted,

    /// [`Lifecycle::TestStepFinished`].
    #[display("test_step_finished")]
    TestStepFinished,

    /// [`Lifecycle::TestCaseFinished`].
    #[display("test_case_finished")]
    TestCaseFinished,

    /// [`Lifecycle::TestRunFinished`].
    #[display("test_run_finished")]
    TestRunFinished,
}

impl Kind {
    /// Every lifecycle [`Kind`].
    pub const ALL: [Self; 6] = [
        Self::TestRunStarted,
        Self::TestCaseStarted,
        Self::TestStepStarted,
        Self::TestStepFinished,
        Self::TestCaseFinished,
        Self::TestRunFinished,
    ];
}

/// Lifecycle event of a test run.
#[derive(Clone, Debug)]
pub enum Lifecycle {
    /// Filtering is done and the given [`Case`]s are about to run.
    TestRunStarted {
        /// [`Case`]s selected to run, in execution order.
        test_cases: Vec<Rc<Case>>,
    },

    /// [`Case`] started.
    TestCaseStarted {
        /// The started [`Case`].
        test_case: Rc<Case>,
    },

    /// [`Step`] is about to execute.
    TestStepStarted {
        /// [`Case`] owning the [`Step`].
        test_case: Rc<Case>,

        /// The started [`Step`].
        test_step: Step,
    },

    /// [`Step`] finished.
    TestStepFinished {
        /// [`Case`] owning the [`Step`].
        test_case: Rc<Case>,

        /// The finished [`Step`].
        test_step: Step,

        /// Outcome of the [`Step`].
        result: TestResult,
    },

    /// [`Case`] finished.
    TestCaseFinished {
        /// The finished [`Case`].
        test_case: Rc<Case>,

        /// Aggregate outcome of the [`Case`].
        result: TestResult,
    },

    /// Every [`Case`] has run.
    TestRunFinished {
        /// Whether every [`Case`] finished acceptably.
        success: bool,
    },
}

impl Lifecycle {
    /// Returns the [`Case`] this event is about, if any.
    #[must_use]
    pub fn test_case(&self) -> Option<&Case> {
        match self {
            Self::TestCaseStarted { test_case }
            | Self::TestStepStarted { test_case, .. }
            | Self::TestStepFinished { test_case, .. }
            | Self::TestCaseFinished { test_case, .. } => Some(test_case),
            Self::TestRunStarted { .. } | Self::TestRunFinished { .. } => None,
        }
    }

    /// Returns the [`TestResult`] this event reports, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&TestResult> {
        match self {
            Self::TestStepFinished { result, .. }
            | Self::TestCaseFinished { result, .. } => Some(result),
            Self::TestRunStarted { .. }
            | Self::TestCaseStarted { .. }
            | Self::TestStepStarted { .. }
            | Self::TestRunFinished { .. } => None,
        }
    }
}

impl Event for Lifecycle {
    type Kind = Kind;

    fn kind(&self) -> Kind {
        match self {
            Self::TestRunStarted { .. } => Kind::TestRunStarted,
            Self::TestCaseStarted { .. } => Kind::TestCaseStarted,
            Self::TestStepStarted { .. } => Kind::TestStepStarted,
            Self::TestStepFinished { .. } => Kind::TestStepFinished,
            Self::TestCaseFinished { .. } => Kind::TestCaseFinished,
            Self::TestRunFinished { .. } => Kind::TestRunFinished,
        }
    }
}

impl Carrier for Lifecycle {
    fn lifecycle(&self) -> Option<&Lifecycle> {
        Some(self)
    }

    fn lifecycle_kind(kind: Kind) -> Kind {
        kind
    }
}
