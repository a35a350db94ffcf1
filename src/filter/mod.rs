// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pipeline stages selecting, ordering and transforming [`Case`]s.
//!
//! Every stage is a [`Receiver`] forwarding zero or one (possibly
//! transformed) [`Case`] to the next [`Receiver`] per received one, and
//! propagating [`Receiver::done()`] once it has nothing more to forward.

pub mod bind;
pub mod location;
pub mod name;
pub mod tag;

use regex::Regex;

use crate::{
    location::Location,
    tag::Expression,
    test::{Case, Suite},
};

#[doc(inline)]
pub use self::{
    bind::Bind,
    location::{Locations, Order},
    name::Name,
    tag::{Breach, TagExcess, Tags},
};

/// Consumer of compiled [`Case`]s.
pub trait Receiver {
    /// Receives the next [`Case`].
    ///
    /// # Errors
    ///
    /// If the [`Case`] cannot be handled.
    fn test_case(&mut self, case: Case) -> crate::Result<()>;

    /// Signals that no more [`Case`]s will be received.
    ///
    /// # Errors
    ///
    /// If the received [`Case`]s as a whole violate some policy.
    fn done(&mut self) -> crate::Result<()>;
}

impl<R: Receiver + ?Sized> Receiver for &mut R {
    fn test_case(&mut self, case: Case) -> crate::Result<()> {
        (**self).test_case(case)
    }

    fn done(&mut self) -> crate::Result<()> {
        (**self).done()
    }
}

impl<R: Receiver + ?Sized> Receiver for Box<R> {
    fn test_case(&mut self, case: Case) -> crate::Result<()> {
        (**self).test_case(case)
    }

    fn done(&mut self) -> crate::Result<()> {
        (**self).done()
    }
}

impl Receiver for Suite {
    fn test_case(&mut self, case: Case) -> crate::Result<()> {
        self.push(case);
        Ok(())
    }

    fn done(&mut self) -> crate::Result<()> {
        Ok(())
    }
}

/// Specification of a single filter stage.
#[derive(Clone, Debug)]
pub enum Spec {
    /// [`Name`] stage.
    Names(Vec<Regex>),

    /// [`Locations`] stage.
    Locations {
        /// Queried [`Location`]s.
        locations: Vec<Location>,

        /// How matching [`Case`]s are ordered.
        order: Order,
    },

    /// [`Tags`] stage, all the [`Expression`]s have to hold.
    Tags(Vec<Expression>),
}

/// Builds a chain of filter stages out of the given `specs`, the first one
/// receiving [`Case`]s first, with the `sink` as the last [`Receiver`].
#[must_use]
pub fn chain<'a>(
    specs: &[Spec],
    sink: impl Receiver + 'a,
) -> Box<dyn Receiver + 'a> {
    let mut next: Box<dyn Receiver + 'a> = Box::new(sink);
    for spec in specs.iter().rev() {
        next = match spec {
            Spec::Names(patterns) => {
                Box::new(Name::new(patterns.clone(), next))
            }
            Spec::Locations { locations, order } => {
                Box::new(Locations::new(locations.clone(), *order, next))
            }
            Spec::Tags(expressions) => {
                Box::new(Tags::new(expressions.clone(), next))
            }
        };
    }
    next
}
