// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Crate-level [`Error`] joining every error family.
//!
//! Failures of bound actions are not errors here: they are reported as
//! [`TestResult`]s. An [`Error`] always aborts the run.
//!
//! [`TestResult`]: crate::TestResult

use derive_more::{Display, Error, From};

use crate::{
    compiler, document, event::BusError, filter::TagExcess,
    location::InvalidLocation, parser, tag::ExpressionError,
};

/// Alias of a [`std::result::Result`] with an [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error aborting a test run.
#[derive(Clone, Debug, Display, Error, From)]
pub enum Error {
    /// Malformed [`Location`].
    ///
    /// [`Location`]: crate::Location
    #[display("{_0}")]
    Location(InvalidLocation),

    /// Malformed feature document.
    #[display("{_0}")]
    Document(document::Error),

    /// Feature document cannot be compiled.
    #[display("{_0}")]
    Compile(compiler::Error),

    /// Malformed tag expression.
    #[display("{_0}")]
    Expression(ExpressionError),

    /// Tag occurrence limits are exceeded.
    #[display("{_0}")]
    TagExcess(TagExcess),

    /// Event [`Bus`] misuse.
    ///
    /// [`Bus`]: crate::event::Bus
    #[display("{_0}")]
    Bus(BusError),

    /// Features cannot be loaded.
    #[display("{_0}")]
    Parse(parser::Error),
}
