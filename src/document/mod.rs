// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Feature-document tree consumed by the [`compiler`].
//!
//! The tree is plain data: whatever parses the [Gherkin] text builds it, and
//! the [`compiler`] only walks it. The [`gherkin`](self::gherkin) submodule
//! adapts the trees produced by the [`gherkin`](::gherkin) crate.
//!
//! [`compiler`]: crate::compiler
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

pub mod gherkin;

use std::{cell::OnceCell, collections::HashMap};

use derive_more::{Display, Error, From};

use crate::{
    location::{InvalidLocation, Location},
    tag::Tag,
};

/// Root of a single `.feature` document.
#[derive(Clone, Debug)]
pub struct Feature {
    /// Keyword, like `Feature` or a localized one.
    pub keyword: String,

    /// Title of this [`Feature`].
    pub name: String,

    /// Where this [`Feature`] is declared.
    pub location: Location,

    /// [`Tag`]s of this [`Feature`].
    pub tags: Vec<Tag>,

    /// Steps shared by every scenario of this [`Feature`].
    pub background: Option<Background>,

    /// Scenarios, outlines and rules in document order.
    pub children: Vec<Child>,
}

/// Direct child of a [`Feature`].
#[derive(Clone, Debug, From)]
pub enum Child {
    /// [`Scenario`] or [`Outline`].
    Definition(Definition),

    /// [`Rule`] grouping definitions.
    Rule(Rule),
}

/// [`Scenario`] or [`Outline`], the nodes test cases are compiled from.
#[derive(Clone, Debug, From)]
pub enum Definition {
    /// Plain [`Scenario`].
    Scenario(Scenario),

    /// Parameterized [`Outline`].
    Outline(Outline),
}

/// Business rule grouping definitions under an optional own [`Background`].
#[derive(Clone, Debug)]
pub struct Rule {
    /// Keyword, like `Rule`.
    pub keyword: String,

    /// Title of this [`Rule`].
    pub name: String,

    /// Where this [`Rule`] is declared.
    pub location: Location,

    /// [`Tag`]s of this [`Rule`].
    pub tags: Vec<Tag>,

    /// Steps shared by every scenario of this [`Rule`], run after the
    /// [`Feature`]'s ones.
    pub background: Option<Background>,

    /// Definitions in document order.
    pub children: Vec<Definition>,
}

/// Steps run before every scenario of the enclosing [`Feature`] or [`Rule`].
#[derive(Clone, Debug)]
pub struct Background {
    /// Keyword, like `Background`.
    pub keyword: String,

    /// Title of this [`Background`], usually empty.
    pub name: String,

    /// Where this [`Background`] is declared.
    pub location: Location,

    /// Steps of this [`Background`].
    pub steps: Vec<Step>,
}

/// Concrete scenario.
#[derive(Clone, Debug)]
pub struct Scenario {
    /// Keyword, like `Scenario` or `Example`.
    pub keyword: String,

    /// Title of this [`Scenario`].
    pub name: String,

    /// Where this [`Scenario`] is declared.
    pub location: Location,

    /// [`Tag`]s of this [`Scenario`].
    pub tags: Vec<Tag>,

    /// Steps of this [`Scenario`].
    pub steps: Vec<Step>,
}

/// Scenario template expanded once per [`Examples`] row.
#[derive(Clone, Debug)]
pub struct Outline {
    /// Keyword, like `Scenario Outline`.
    pub keyword: String,

    /// Title of this [`Outline`].
    pub name: String,

    /// Where this [`Outline`] is declared.
    pub location: Location,

    /// [`Tag`]s of this [`Outline`].
    pub tags: Vec<Tag>,

    /// Steps containing `<placeholder>`s.
    pub steps: Vec<Step>,

    /// Tables providing placeholder values.
    pub examples: Vec<Examples>,
}

/// Table of values for an [`Outline`].
#[derive(Clone, Debug)]
pub struct Examples {
    /// Keyword, like `Examples`.
    pub keyword: String,

    /// Title of this [`Examples`] table, possibly empty.
    pub name: String,

    /// Where this [`Examples`] table is declared.
    pub location: Location,

    /// [`Tag`]s of this [`Examples`] table.
    pub tags: Vec<Tag>,

    /// Placeholder names.
    pub header: Vec<String>,

    /// Data rows, each as wide as the `header`.
    pub rows: Vec<Row>,
}

/// Data row of an [`Examples`] table.
#[derive(Clone, Debug)]
pub struct Row {
    /// Where this [`Row`] is written.
    pub location: Location,

    /// Cell values.
    pub cells: Vec<String>,
}

/// Step of a [`Background`], [`Scenario`] or [`Outline`].
#[derive(Clone, Debug)]
pub struct Step {
    /// Keyword, like `Given ` or `And `.
    pub keyword: String,

    /// Text of this [`Step`] after the keyword.
    pub text: String,

    /// Where this [`Step`] is written.
    pub location: Location,

    /// Multiline argument, if any.
    pub argument: Option<Argument>,
}

/// Multiline argument of a [`Step`].
#[derive(Clone, Debug, Eq, From, PartialEq)]
pub enum Argument {
    /// Free-form text block.
    DocString(DocString),

    /// Table of cells.
    DataTable(DataTable),
}

/// Free-form text block argument.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DocString {
    /// Content of this [`DocString`].
    pub content: String,

    /// Declared media type of the `content`, if any.
    pub content_type: Option<String>,
}

/// Rectangular table argument.
#[derive(Clone, Debug)]
pub struct DataTable {
    /// Rows of cells, all equally wide.
    rows: Vec<Vec<String>>,

    /// Header-keyed view of the `rows`, computed on first access.
    hashes: OnceCell<Vec<HashMap<String, String>>>,
}

impl DataTable {
    /// Creates a new [`DataTable`].
    ///
    /// # Errors
    ///
    /// If rows differ in width.
    pub fn new(
        rows: Vec<Vec<String>>,
        location: &Location,
    ) -> Result<Self, MalformedTable> {
        if let Some(first) = rows.first() {
            if let Some((row, cells)) = rows
                .iter()
                .enumerate()
                .find(|(_, r)| r.len() != first.len())
            {
                return Err(MalformedTable {
                    location: location.clone(),
                    row,
                    expected: first.len(),
                    found: cells.len(),
                });
            }
        }
        Ok(Self {
            rows,
            hashes: OnceCell::new(),
        })
    }

    /// Returns rows of this [`DataTable`].
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns every row after the first one keyed by the first one.
    #[must_use]
    pub fn hashes(&self) -> &[HashMap<String, String>] {
        self.hashes.get_or_init(|| {
            let Some((header, body)) = self.rows.split_first() else {
                return Vec::new();
            };
            body.iter()
                .map(|row| header.iter().cloned().zip(row.iter().cloned()).collect())
                .collect()
        })
    }

    /// Returns a new [`DataTable`] with every cell mapped by `f`.
    #[must_use]
    pub fn map_cells(&self, mut f: impl FnMut(&str) -> String) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .map(|r| r.iter().map(|c| f(c)).collect())
                .collect(),
            hashes: OnceCell::new(),
        }
    }
}

impl PartialEq for DataTable {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
    }
}

impl Eq for DataTable {}

/// Error of a [`DataTable`] having rows of different widths.
#[derive(Clone, Debug, Display, Error)]
#[display(
    "Malformed table at {location}: row {row} has {found} cells, expected \
     {expected}"
)]
pub struct MalformedTable {
    /// Where the table is written.
    #[error(not(source))]
    pub location: Location,

    /// Zero-based index of the offending row.
    pub row: usize,

    /// Width of the first row.
    pub expected: usize,

    /// Width of the offending row.
    pub found: usize,
}

/// Error of building a document tree.
#[derive(Clone, Debug, Display, Error, From)]
pub enum Error {
    /// Some node has no valid [`Location`].
    #[display("{_0}")]
    Location(InvalidLocation),

    /// Some table is not rectangular.
    #[display("{_0}")]
    Table(MalformedTable),
}
