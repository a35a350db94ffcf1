// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution core of [Cucumber] test runs.
//!
//! Parsed [Gherkin] features are [compiled][1] into immutable [`test::Case`]s,
//! passed through [filters][2] selecting them by name, [`Location`] or tags,
//! bound to user [`Action`]s and hooks by a [`Mapper`], and executed one by
//! one by a [`Runner`] publishing their [`Lifecycle`] into an [`event::Bus`].
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//!
//! use cucumber_core::{
//!     config::Configuration, event, mapping::Definitions, parser, Session,
//!     Summary,
//! };
//! use regex::Regex;
//!
//! let feature = parser::parse_str(
//!     "Feature: Basket\n\
//!      \x20 Scenario: eating\n\
//!      \x20   Given 5 cucumbers\n",
//! )?;
//! let eaten = Rc::new(RefCell::new(0));
//! let definitions = Definitions::new().step(
//!     Regex::new(r"^(\d+) cucumbers$")?,
//!     {
//!         let eaten = Rc::clone(&eaten);
//!         move |ctx| {
//!             *eaten.borrow_mut() += ctx.capture(1).unwrap_or("0").parse::<u32>()?;
//!             Ok(())
//!         }
//!     },
//! );
//!
//! let mut bus = event::Bus::<event::Lifecycle>::default();
//! let summary = Summary::observe(&mut bus)?;
//! Session::new(Configuration::default(), &definitions)
//!     .run([&feature], &mut bus)?;
//!
//! assert_eq!(*eaten.borrow(), 5);
//! assert_eq!(summary.borrow().cases().passed, 1);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! [1]: compiler
//! [2]: filter
//! [`Action`]: test::Action
//! [`Lifecycle`]: event::Lifecycle
//! [Cucumber]: https://cucumber.io
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

pub mod compiler;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod filter;
pub mod location;
pub mod mapping;
pub mod parser;
pub mod result;
pub mod runner;
pub mod session;
pub mod summary;
pub mod tag;
pub mod test;

pub use gherkin;

#[doc(inline)]
pub use self::{
    error::{Error, Result},
    event::Event,
    location::Location,
    mapping::Mapper,
    result::TestResult,
    runner::Runner,
    session::Session,
    summary::Summary,
};
