// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! State machine of a single executing [`Case`].
//!
//! [`Case`]: crate::test::Case

use std::time::Duration;

use crate::result::TestResult;

/// State of an executing [`Case`].
///
/// Only the first non-passing [`TestResult`] is kept: once it's reached, the
/// state never changes again.
///
/// [`Case`]: crate::test::Case
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Status {
    /// No step has finished yet.
    #[default]
    Unknown,

    /// Every finished step has passed.
    Passing(TestResult),

    /// Some step has failed or is undefined.
    Failing(TestResult),

    /// Some step is pending.
    Pending(TestResult),

    /// Some step has asked to skip the rest of the case.
    Skipping(TestResult),
}

impl Status {
    /// Indicates whether the next steps are to be executed rather than
    /// skipped.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Unknown | Self::Passing(_))
    }

    /// Transitions this [`Status`] by the `result` of a finished step.
    ///
    /// Does nothing once the [`Status`] is not running anymore.
    #[must_use]
    pub fn next(self, result: &TestResult) -> Self {
        if !self.is_running() {
            return self;
        }
        let result = result.clone();
        match result {
            TestResult::Unknown => self,
            TestResult::Passed { .. } => Self::Passing(result),
            TestResult::Failed { .. } | TestResult::Undefined { .. } => {
                Self::Failing(result)
            }
            TestResult::Pending { .. } => Self::Pending(result),
            TestResult::Skipped { .. } => Self::Skipping(result),
        }
    }

    /// Turns this [`Status`] into the aggregate [`TestResult`] of its case,
    /// taking the given total `duration`.
    #[must_use]
    pub fn into_result(self, duration: Duration) -> TestResult {
        match self {
            Self::Unknown => TestResult::Unknown,
            Self::Passing(r)
            | Self::Failing(r)
            | Self::Pending(r)
            | Self::Skipping(r) => r.with_duration(duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Cause, Status as Kind};

    fn failed() -> TestResult {
        TestResult::failed(Duration::ZERO, Cause::new(anyhow::anyhow!("boom")))
    }

    #[test]
    fn keeps_first_non_passing() {
        let status = Status::default()
            .next(&TestResult::passed(Duration::ZERO))
            .next(&failed())
            .next(&TestResult::passed(Duration::ZERO))
            .next(&TestResult::pending("later"));

        assert!(!status.is_running());
        let result = status.into_result(Duration::from_secs(2));
        assert_eq!(result.status(), Kind::Failed);
        assert_eq!(result.duration(), Some(Duration::from_secs(2)));
        assert_eq!(result.message().as_deref(), Some("boom"));
    }

    #[test]
    fn maps_results_to_states() {
        let start = Status::default;

        assert!(matches!(
            start().next(&TestResult::undefined()),
            Status::Failing(_),
        ));
        assert!(matches!(
            start().next(&TestResult::pending("x")),
            Status::Pending(_),
        ));
        assert!(matches!(
            start().next(&TestResult::skipped()),
            Status::Skipping(_),
        ));
        assert!(start()
            .next(&TestResult::passed(Duration::ZERO))
            .is_running());
    }

    #[test]
    fn unknown_stays_unknown() {
        assert_eq!(
            Status::Unknown.into_result(Duration::from_secs(1)),
            TestResult::Unknown,
        );
    }
}
