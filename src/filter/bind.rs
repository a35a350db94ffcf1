// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stage binding [`Action`]s and hooks to [`Case`]s.
//!
//! [`Action`]: crate::test::Action

use crate::{
    mapping::{self, Mapper},
    test::Case,
};

use super::Receiver;

/// Stage forwarding every [`Case`] with [`Action`]s and hooks of its
/// [`Mapper`] bound.
///
/// [`Action`]: crate::test::Action
#[derive(Debug)]
pub struct Bind<'m, M: ?Sized, R> {
    mapper: &'m M,
    next: R,
}

impl<'m, M: ?Sized, R> Bind<'m, M, R> {
    /// Creates a new [`Bind`] stage forwarding to the `next` [`Receiver`].
    #[must_use]
    pub const fn new(mapper: &'m M, next: R) -> Self {
        Self { mapper, next }
    }
}

impl<M: Mapper + ?Sized, R: Receiver> Receiver for Bind<'_, M, R> {
    fn test_case(&mut self, case: Case) -> crate::Result<()> {
        self.next.test_case(mapping::bind(&case, self.mapper))
    }

    fn done(&mut self) -> crate::Result<()> {
        self.next.done()
    }
}
