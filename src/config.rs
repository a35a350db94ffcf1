// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Run [`Configuration`], parsable from CLI arguments.
//!
//! [`Configuration`] is a [`clap::Args`], so it may be flattened into a host
//! [`clap::Parser`]:
//!
//! ```rust
//! use clap::Parser as _;
//! use cucumber_core::config::Configuration;
//!
//! #[derive(clap::Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     run: Configuration,
//! }
//!
//! let cli = Cli::parse_from(["test", "--tags", "@fast", "--dry-run"]);
//! assert!(cli.run.dry_run);
//! assert_eq!(cli.run.filter_specs().len(), 1);
//! ```

use regex::Regex;
use smart_default::SmartDefault;

use crate::{
    filter::{Order, Spec},
    location::Location,
    result::Strict,
    runner::Mode,
    tag::Expression,
};

/// Options of a test run.
#[derive(Clone, Debug, SmartDefault, clap::Args)]
#[group(skip)]
pub struct Configuration {
    /// Regex to filter scenarios by their names. Repeatable, any has to
    /// match.
    #[arg(
        id = "name",
        long = "name",
        short = 'n',
        value_name = "regex",
        global = true
    )]
    pub names: Vec<Regex>,

    /// Tag expression to filter scenarios by. Repeatable, all have to hold.
    ///
    /// A `@tag:N` literal also limits the tag to `N` occurrences across the
    /// whole run.
    #[arg(
        id = "tags",
        long = "tags",
        short = 't',
        value_name = "tagexpr",
        global = true
    )]
    pub tags: Vec<Expression>,

    /// Location to run scenarios at, like `a.feature:12` or `a.feature:3..9`.
    /// Repeatable, any has to match.
    #[arg(
        id = "location",
        long = "location",
        short = 'l',
        value_name = "file[:lines]",
        global = true
    )]
    pub locations: Vec<Location>,

    /// Order of scenarios selected by locations.
    #[arg(
        long,
        value_name = "sorted|streamed",
        default_value = "sorted",
        global = true
    )]
    #[default(Order::Sorted)]
    pub location_order: Order,

    /// Resolve steps without running anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Fail the run on undefined and pending steps.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Fail the run on undefined steps.
    #[arg(long, global = true)]
    pub strict_undefined: bool,

    /// Fail the run on pending steps.
    #[arg(long, global = true)]
    pub strict_pending: bool,
}

impl Configuration {
    /// Returns the filter [`Spec`]s of this [`Configuration`]: locations,
    /// then tags, then names, only those configured.
    #[must_use]
    pub fn filter_specs(&self) -> Vec<Spec> {
        let mut specs = Vec::new();
        if !self.locations.is_empty() {
            specs.push(Spec::Locations {
                locations: self.locations.clone(),
                order: self.location_order,
            });
        }
        if !self.tags.is_empty() {
            specs.push(Spec::Tags(self.tags.clone()));
        }
        if !self.names.is_empty() {
            specs.push(Spec::Names(self.names.clone()));
        }
        specs
    }

    /// Returns the [`Strict`]ness of this [`Configuration`].
    #[must_use]
    pub const fn strict(&self) -> Strict {
        Strict {
            undefined: self.strict || self.strict_undefined,
            pending: self.strict || self.strict_pending,
        }
    }

    /// Returns the [`Mode`] to run [`Case`]s in.
    ///
    /// [`Case`]: crate::test::Case
    #[must_use]
    pub const fn mode(&self) -> Mode {
        if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Execute
        }
    }
}
