// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [Tags][1] and [tag expressions][2].
//!
//! [1]: https://cucumber.io/docs/cucumber/api#tags
//! [2]: https://cucumber.io/docs/cucumber/api#tag-expressions

pub mod expression;

use derive_more::with_trait::Display;

use crate::location::Location;

#[doc(inline)]
pub use self::expression::{Expression, ExpressionError, Limit};

/// Tag attached to a document node, like `@wip`.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display("{name}")]
pub struct Tag {
    /// Name of this [`Tag`], including its leading `@`.
    pub name: String,

    /// Where this [`Tag`] is written.
    pub location: Location,
}

impl Tag {
    /// Creates a new [`Tag`], prefixing the `name` with `@` if it lacks one.
    #[must_use]
    pub fn new(name: impl AsRef<str>, location: Location) -> Self {
        let name = name.as_ref();
        let name = if name.starts_with('@') {
            name.to_owned()
        } else {
            format!("@{name}")
        };
        Self { name, location }
    }
}
