// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Outcomes of executing [`test::Step`]s and [`test::Case`]s.
//!
//! A [`TestResult`] is never mutated: every transition produces a new value.
//!
//! Bound actions signal non-passing outcomes other than failure by returning
//! one of the control signals of this module ([`Pending`], [`Skipped`],
//! [`Undefined`]) through [`anyhow::Error`].
//!
//! [`test::Case`]: crate::test::Case
//! [`test::Step`]: crate::test::Step

use std::{any::Any, fmt, sync::Arc, time::Duration};

use derive_more::with_trait::{Display, Error};

/// Discriminant of a [`TestResult`].
///
/// Ordered by severity, so the worse of two outcomes is their maximum.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub enum Status {
    /// Nothing has run yet.
    #[display("unknown")]
    Unknown,

    /// Passed.
    #[display("passed")]
    Passed,

    /// Skipped.
    #[display("skipped")]
    Skipped,

    /// No definition matched.
    #[display("undefined")]
    Undefined,

    /// Not implemented yet.
    #[display("pending")]
    Pending,

    /// Failed.
    #[display("failed")]
    Failed,
}

impl Status {
    /// All the [`Status`]es, from the least to the most severe.
    pub const ALL: [Self; 6] = [
        Self::Unknown,
        Self::Passed,
        Self::Skipped,
        Self::Undefined,
        Self::Pending,
        Self::Failed,
    ];
}

/// Cause of a [`TestResult::Failed`].
///
/// Cheaply clonable; equal only to its own clones.
#[derive(Clone, Debug, Display)]
#[display("{_0}")]
pub struct Cause(Arc<anyhow::Error>);

impl Cause {
    /// Wraps the given error into a [`Cause`].
    #[must_use]
    pub fn new(err: anyhow::Error) -> Self {
        Self(Arc::new(err))
    }

    /// Creates a [`Cause`] out of a [`catch_unwind()`] payload.
    ///
    /// [`catch_unwind()`]: std::panic::catch_unwind()
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let msg = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_owned()))
            .unwrap_or_else(|| "opaque panic payload".to_owned());
        Self::new(anyhow::Error::msg(msg))
    }

    /// Returns the underlying error.
    #[must_use]
    pub fn error(&self) -> &anyhow::Error {
        &self.0
    }

    /// Attempts to downcast the underlying error to a concrete type.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref()
    }
}

impl PartialEq for Cause {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Outcome of a [`test::Step`] or a whole [`test::Case`].
///
/// [`test::Case`]: crate::test::Case
/// [`test::Step`]: crate::test::Step
#[derive(Clone, Debug, PartialEq)]
pub enum TestResult {
    /// Nothing has run yet.
    Unknown,

    /// Passed.
    Passed {
        /// Time the execution took.
        duration: Duration,
    },

    /// Failed with some [`Cause`].
    Failed {
        /// Time the execution took.
        duration: Duration,

        /// What has caused the failure.
        cause: Cause,
    },

    /// No definition matched the step text.
    Undefined {
        /// Time spent, once known.
        duration: Option<Duration>,

        /// Human-readable explanation, if any.
        message: Option<String>,
    },

    /// Skipped, either by a signal or because an earlier step did not pass.
    Skipped {
        /// Time spent, once known.
        duration: Option<Duration>,

        /// Human-readable explanation, if any.
        message: Option<String>,
    },

    /// The step is not implemented yet.
    Pending {
        /// What is still pending.
        message: String,

        /// Time spent, once known.
        duration: Option<Duration>,
    },
}

impl TestResult {
    /// Creates a [`TestResult::Passed`].
    #[must_use]
    pub const fn passed(duration: Duration) -> Self {
        Self::Passed { duration }
    }

    /// Creates a [`TestResult::Failed`].
    #[must_use]
    pub const fn failed(duration: Duration, cause: Cause) -> Self {
        Self::Failed { duration, cause }
    }

    /// Creates a [`TestResult::Undefined`] with unknown duration.
    #[must_use]
    pub const fn undefined() -> Self {
        Self::Undefined {
            duration: None,
            message: None,
        }
    }

    /// Creates a [`TestResult::Skipped`] with unknown duration.
    #[must_use]
    pub const fn skipped() -> Self {
        Self::Skipped {
            duration: None,
            message: None,
        }
    }

    /// Creates a [`TestResult::Pending`] with unknown duration.
    #[must_use]
    pub fn pending(message: impl Into<String>) -> Self {
        Self::Pending {
            message: message.into(),
            duration: None,
        }
    }

    /// Returns the [`Status`] of this [`TestResult`].
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Unknown => Status::Unknown,
            Self::Passed { .. } => Status::Passed,
            Self::Failed { .. } => Status::Failed,
            Self::Undefined { .. } => Status::Undefined,
            Self::Skipped { .. } => Status::Skipped,
            Self::Pending { .. } => Status::Pending,
        }
    }

    /// Returns the duration of this [`TestResult`], if known.
    #[must_use]
    pub const fn duration(&self) -> Option<Duration> {
        match self {
            Self::Unknown => None,
            Self::Passed { duration } | Self::Failed { duration, .. } => {
                Some(*duration)
            }
            Self::Undefined { duration, .. }
            | Self::Skipped { duration, .. }
            | Self::Pending { duration, .. } => *duration,
        }
    }

    /// Returns the message of this [`TestResult`], if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Unknown | Self::Passed { .. } => None,
            Self::Failed { cause, .. } => Some(cause.to_string()),
            Self::Undefined { message, .. } | Self::Skipped { message, .. } => {
                message.clone()
            }
            Self::Pending { message, .. } => Some(message.clone()),
        }
    }

    /// Returns the [`Cause`] of a [`TestResult::Failed`].
    #[must_use]
    pub const fn cause(&self) -> Option<&Cause> {
        match self {
            Self::Failed { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Returns a copy of this [`TestResult`] with the given `duration`.
    ///
    /// [`TestResult::Unknown`] carries no duration and stays as is.
    #[must_use]
    pub fn with_duration(self, duration: Duration) -> Self {
        match self {
            Self::Unknown => Self::Unknown,
            Self::Passed { .. } => Self::Passed { duration },
            Self::Failed { cause, .. } => Self::Failed { duration, cause },
            Self::Undefined { message, .. } => Self::Undefined {
                duration: Some(duration),
                message,
            },
            Self::Skipped { message, .. } => Self::Skipped {
                duration: Some(duration),
                message,
            },
            Self::Pending { message, .. } => Self::Pending {
                message,
                duration: Some(duration),
            },
        }
    }

    /// Returns a copy of this [`TestResult`] with the given `message`.
    ///
    /// Only [`TestResult::Undefined`], [`TestResult::Skipped`] and
    /// [`TestResult::Pending`] carry messages, others stay as is.
    #[must_use]
    pub fn with_message(self, message: impl Into<String>) -> Self {
        match self {
            Self::Undefined { duration, .. } => Self::Undefined {
                duration,
                message: Some(message.into()),
            },
            Self::Skipped { duration, .. } => Self::Skipped {
                duration,
                message: Some(message.into()),
            },
            Self::Pending { duration, .. } => Self::Pending {
                message: message.into(),
                duration,
            },
            other => other,
        }
    }

    /// Merges the `next` outcome into this one, keeping the worse of both.
    ///
    /// A [`TestResult::Failed`] is sticky: nothing is merged into it, and
    /// outcomes of equal severity keep the current one.
    #[must_use]
    pub fn merge(self, next: Self) -> Self {
        if matches!(self, Self::Failed { .. }) {
            return self;
        }
        if next.status() > self.status() {
            next
        } else {
            self
        }
    }

    /// Indicates whether this outcome stops the rest of its case from being
    /// executed ([`TestResult::Failed`] or [`TestResult::Pending`]).
    #[must_use]
    pub const fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Pending { .. })
    }

    /// Indicates whether this outcome is acceptable under the given [`Strict`]
    /// configuration.
    #[must_use]
    pub const fn is_ok(&self, strict: Strict) -> bool {
        match self {
            Self::Unknown | Self::Passed { .. } | Self::Skipped { .. } => true,
            Self::Failed { .. } => false,
            Self::Undefined { .. } => !strict.undefined,
            Self::Pending { .. } => !strict.pending,
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status())?;
        if let Some(msg) = self.message() {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

/// Which non-passing outcomes count as failures of the whole run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Strict {
    /// Undefined steps fail the run.
    pub undefined: bool,

    /// Pending steps fail the run.
    pub pending: bool,
}

impl Strict {
    /// Treats every non-passing outcome as a failure.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            undefined: true,
            pending: true,
        }
    }
}

/// Signal of an action not being implemented yet.
#[derive(Clone, Debug, Display, Error)]
#[display("TODO: {message}")]
pub struct Pending {
    /// What is still pending.
    #[error(not(source))]
    pub message: String,
}

/// Signal of an action choosing to skip the rest of its case.
#[derive(Clone, Debug, Default, Display, Error)]
#[display("skipped{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Skipped {
    /// Why the step has been skipped.
    #[error(not(source))]
    pub message: Option<String>,
}

/// Signal of an action having no real implementation behind it.
#[derive(Clone, Copy, Debug, Default, Display, Error)]
#[display("undefined step")]
pub struct Undefined;

/// Failure of a step text matching several definitions at once.
#[derive(Clone, Debug, Display, Error)]
#[display("Ambiguous step `{step}` matches {} definitions", locations.len())]
pub struct Ambiguous {
    /// Text of the ambiguous step.
    #[error(not(source))]
    pub step: String,

    /// Locations of every matching definition.
    #[error(not(source))]
    pub locations: Vec<String>,
}

/// Creates an error signalling the calling action being [`Pending`].
#[must_use]
pub fn pending(message: impl Into<String>) -> anyhow::Error {
    anyhow::Error::new(Pending {
        message: message.into(),
    })
}

/// Creates an error signalling the calling action being [`Skipped`].
#[must_use]
pub fn skipped(message: impl Into<String>) -> anyhow::Error {
    anyhow::Error::new(Skipped {
        message: Some(message.into()),
    })
}

/// Converts an error returned by an action into the matching [`TestResult`].
#[must_use]
pub fn from_error(err: anyhow::Error, duration: Duration) -> TestResult {
    if let Some(Pending { message }) = err.downcast_ref::<Pending>() {
        return TestResult::Pending {
            message: message.clone(),
            duration: Some(duration),
        };
    }
    if let Some(Skipped { message }) = err.downcast_ref::<Skipped>() {
        return TestResult::Skipped {
            duration: Some(duration),
            message: message.clone(),
        };
    }
    if err.downcast_ref::<Undefined>().is_some() {
        return TestResult::Undefined {
            duration: Some(duration),
            message: None,
        };
    }
    TestResult::failed(duration, Cause::new(err))
}
