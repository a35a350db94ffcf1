// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`gherkin::Feature`] extension converting it into a [`document::Feature`].
//!
//! [`document::Feature`]: super::Feature

use sealed::sealed;

use crate::{location::Location, tag::Tag};

use super::{
    Argument, Background, Child, DataTable, Definition, DocString, Error,
    Examples, Feature, Outline, Row, Rule, Scenario, Step,
};

/// File name used for [`gherkin::Feature`]s parsed from memory.
pub const IN_MEMORY: &str = "<in-memory>.feature";

/// Conversion of a [`gherkin::Feature`] into a [`document::Feature`].
///
/// [`document::Feature`]: super::Feature
#[sealed]
pub trait Ext {
    /// Converts this [`gherkin::Feature`] into a [`document::Feature`].
    ///
    /// `Scenario Outline`s/`Scenario Template`s without `Examples` stay
    /// [`Outline`]s, so the compiler reports them.
    ///
    /// # Errors
    ///
    /// If some table of the feature is not rectangular.
    ///
    /// [`document::Feature`]: super::Feature
    fn to_document(&self) -> Result<Feature, Error>;
}

#[sealed]
impl Ext for gherkin::Feature {
    fn to_document(&self) -> Result<Feature, Error> {
        let file = self
            .path
            .as_ref()
            .map_or_else(|| IN_MEMORY.to_owned(), |p| p.display().to_string());
        let conv = Converter { file: &file };

        let mut children = self
            .scenarios
            .iter()
            .map(|s| Ok((s.position.line, Child::from(conv.definition(s)?))))
            .chain(
                self.rules
                    .iter()
                    .map(|r| Ok((r.position.line, Child::from(conv.rule(r)?)))),
            )
            .collect::<Result<Vec<_>, Error>>()?;
        children.sort_by_key(|(line, _)| *line);

        Ok(Feature {
            keyword: self.keyword.clone(),
            name: self.name.clone(),
            location: conv.location(self.position)?,
            tags: conv.tags(&self.tags, self.position)?,
            background: self
                .background
                .as_ref()
                .map(|b| conv.background(b))
                .transpose()?,
            children: children.into_iter().map(|(_, c)| c).collect(),
        })
    }
}

/// Converter of [`gherkin`] nodes belonging to a single `file`.
struct Converter<'f> {
    file: &'f str,
}

impl Converter<'_> {
    fn location(&self, pos: gherkin::LineCol) -> Result<Location, Error> {
        Ok(Location::exact(self.file, pos.line)?)
    }

    /// [`gherkin`] doesn't track tag positions, so tags are located at their
    /// owner's line.
    fn tags(
        &self,
        tags: &[String],
        owner: gherkin::LineCol,
    ) -> Result<Vec<Tag>, Error> {
        let location = self.location(owner)?;
        Ok(tags.iter().map(|t| Tag::new(t, location.clone())).collect())
    }

    fn rule(&self, rule: &gherkin::Rule) -> Result<Rule, Error> {
        Ok(Rule {
            keyword: rule.keyword.clone(),
            name: rule.name.clone(),
            location: self.location(rule.position)?,
            tags: self.tags(&rule.tags, rule.position)?,
            background: rule
                .background
                .as_ref()
                .map(|b| self.background(b))
                .transpose()?,
            children: rule
                .scenarios
                .iter()
                .map(|s| self.definition(s))
                .collect::<Result<_, _>>()?,
        })
    }

    fn background(&self, bg: &gherkin::Background) -> Result<Background, Error> {
        Ok(Background {
            keyword: bg.keyword.clone(),
            name: bg.name.clone(),
            location: self.location(bg.position)?,
            steps: self.steps(&bg.steps)?,
        })
    }

    fn definition(&self, sc: &gherkin::Scenario) -> Result<Definition, Error> {
        // `gherkin` parses outlines as plain scenarios and keeps its keyword
        // tables private, so an outline without `Examples` is recognized by
        // its English keywords only.
        let is_outline = !sc.examples.is_empty()
            || sc.keyword.contains("Outline")
            || sc.keyword.contains("Template");
        let location = self.location(sc.position)?;
        let tags = self.tags(&sc.tags, sc.position)?;
        let steps = self.steps(&sc.steps)?;

        if !is_outline {
            return Ok(Scenario {
                keyword: sc.keyword.clone(),
                name: sc.name.clone(),
                location,
                tags,
                steps,
            }
            .into());
        }
        Ok(Outline {
            keyword: sc.keyword.clone(),
            name: sc.name.clone(),
            location,
            tags,
            steps,
            examples: sc
                .examples
                .iter()
                .map(|ex| self.examples(ex))
                .collect::<Result<_, _>>()?,
        }
        .into())
    }

    fn examples(&self, ex: &gherkin::Examples) -> Result<Examples, Error> {
        let (header, rows) = match &ex.table {
            Some(table) => {
                let (header, body) = match table.rows.split_first() {
                    Some((h, b)) => (h.clone(), b),
                    None => (Vec::new(), &[][..]),
                };
                let rows = body
                    .iter()
                    .enumerate()
                    .map(|(i, cells)| {
                        let mut pos = table.position;
                        pos.line += i + 1;
                        Ok(Row {
                            location: self.location(pos)?,
                            cells: cells.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, Error>>()?;
                (header, rows)
            }
            None => (Vec::new(), Vec::new()),
        };

        Ok(Examples {
            keyword: ex.keyword.clone(),
            name: ex.name.clone().unwrap_or_default(),
            location: self.location(ex.position)?,
            tags: self.tags(&ex.tags, ex.position)?,
            header,
            rows,
        })
    }

    fn steps(&self, steps: &[gherkin::Step]) -> Result<Vec<Step>, Error> {
        steps
            .iter()
            .map(|s| {
                let location = self.location(s.position)?;
                let argument = match (&s.docstring, &s.table) {
                    (Some(content), _) => Some(Argument::from(DocString {
                        content: content.clone(),
                        content_type: None,
                    })),
                    (None, Some(table)) => Some(Argument::from(
                        DataTable::new(table.rows.clone(), &location)?,
                    )),
                    (None, None) => None,
                };
                Ok(Step {
                    keyword: s.keyword.clone(),
                    text: s.value.clone(),
                    location,
                    argument,
                })
            })
            .collect()
    }
}
