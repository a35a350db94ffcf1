// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compilation of [`document::Feature`]s into flat, ordered [`test::Case`]s.
//!
//! Every scenario becomes one [`test::Case`] and every row of every
//! `Examples` table of an outline becomes one as well. Background steps are
//! prepended to the steps of every case they apply to: the feature's ones
//! first, then the rule's ones.

use derive_more::{Display, Error};

use crate::{
    document::{
        self, Argument, Background, Child, Definition, DocString, Outline,
        Scenario,
    },
    filter::Receiver,
    location::Location,
    tag::Tag,
    test::{
        self,
        source::{self, Chain, Header, Node},
        Case, Suite,
    },
};

/// Error of compiling a [`document::Feature`].
#[derive(Clone, Debug, Display, Error)]
pub enum Error {
    /// Outline has no `Examples` to expand it with.
    #[display("Scenario outline `{name}` at {location} has no examples")]
    MissingExamples {
        /// Title of the outline.
        #[error(not(source))]
        name: String,

        /// Where the outline is declared.
        location: Location,
    },
}

/// Compiles the given `features` in order, pushing every [`Case`] into the
/// `receiver` and signalling it done afterwards.
///
/// Each feature is compiled as a whole before any of its cases is pushed, so
/// a malformed feature pushes nothing.
///
/// # Errors
///
/// If some feature cannot be compiled, or the `receiver` fails.
pub fn compile<'f, R>(
    features: impl IntoIterator<Item = &'f document::Feature>,
    mut receiver: R,
) -> crate::Result<()>
where
    R: Receiver,
{
    for feature in features {
        for case in compile_feature(feature)? {
            receiver.test_case(case)?;
        }
    }
    receiver.done()
}

/// Compiles the given `features` straight into a [`Suite`].
///
/// # Errors
///
/// If some feature cannot be compiled.
pub fn compile_suite<'f>(
    features: impl IntoIterator<Item = &'f document::Feature>,
) -> crate::Result<Suite> {
    let mut suite = Suite::new();
    compile(features, &mut suite)?;
    Ok(suite)
}

/// Compiles a single [`document::Feature`] into its [`Case`]s in document
/// order.
///
/// # Errors
///
/// If some outline has no `Examples`.
pub fn compile_feature(
    feature: &document::Feature,
) -> Result<Vec<Case>, Error> {
    let root = Chain::new(Node::Feature(header(
        &feature.keyword,
        &feature.name,
        &feature.location,
        &feature.tags,
    )));
    let mut cases = Vec::new();

    for child in &feature.children {
        match child {
            Child::Definition(def) => {
                let backgrounds =
                    feature.background.iter().collect::<Vec<_>>();
                definition(&root, &backgrounds, def, &mut cases)?;
            }
            Child::Rule(rule) => {
                let chain = root.with(Node::Rule(header(
                    &rule.keyword,
                    &rule.name,
                    &rule.location,
                    &rule.tags,
                )));
                let backgrounds = feature
                    .background
                    .iter()
                    .chain(&rule.background)
                    .collect::<Vec<_>>();
                for def in &rule.children {
                    definition(&chain, &backgrounds, def, &mut cases)?;
                }
            }
        }
    }

    for case in &cases {
        tracing::trace!(
            id = %case.id(),
            name = case.name(),
            location = %case.location(),
            steps = case.steps().len(),
            "compiled test case",
        );
    }
    Ok(cases)
}

/// Compiles a single [`Definition`] under the `parent` chain.
fn definition(
    parent: &Chain,
    backgrounds: &[&Background],
    def: &Definition,
    cases: &mut Vec<Case>,
) -> Result<(), Error> {
    match def {
        Definition::Scenario(sc) => {
            cases.push(scenario(parent, backgrounds, sc));
            Ok(())
        }
        Definition::Outline(outline) => {
            cases.extend(expand(parent, backgrounds, outline)?);
            Ok(())
        }
    }
}

fn scenario(
    parent: &Chain,
    backgrounds: &[&Background],
    sc: &Scenario,
) -> Case {
    let chain = parent.with(Node::Scenario(header(
        &sc.keyword,
        &sc.name,
        &sc.location,
        &sc.tags,
    )));
    let steps = background_steps(&chain, backgrounds)
        .chain(sc.steps.iter().map(|s| step(&chain, s, &[])))
        .collect();
    Case::new(chain, steps)
}

/// Expands the `outline` into one [`Case`] per `Examples` row.
fn expand(
    parent: &Chain,
    backgrounds: &[&Background],
    outline: &Outline,
) -> Result<Vec<Case>, Error> {
    if outline.examples.is_empty() {
        return Err(Error::MissingExamples {
            name: outline.name.clone(),
            location: outline.location.clone(),
        });
    }

    let chain = parent.with(Node::Outline(header(
        &outline.keyword,
        &outline.name,
        &outline.location,
        &outline.tags,
    )));
    let mut cases = Vec::new();
    for examples in &outline.examples {
        let examples_chain = chain.with(Node::Examples(header(
            &examples.keyword,
            &examples.name,
            &examples.location,
            &examples.tags,
        )));
        for (i, row) in examples.rows.iter().enumerate() {
            let values = examples
                .header
                .iter()
                .cloned()
                .zip(row.cells.iter().cloned())
                .collect::<Vec<_>>();
            let row_chain = examples_chain.with(Node::Row(source::Row {
                number: i + 1,
                location: row.location.clone(),
                values: values.clone(),
            }));
            let steps = background_steps(&row_chain, backgrounds)
                .chain(
                    outline.steps.iter().map(|s| step(&row_chain, s, &values)),
                )
                .collect();
            cases.push(Case::new(row_chain, steps));
        }
    }
    Ok(cases)
}

/// Compiles the steps of every background applying to the `case` chain.
fn background_steps<'a>(
    case: &'a Chain,
    backgrounds: &'a [&'a Background],
) -> impl Iterator<Item = test::Step> + 'a {
    backgrounds.iter().flat_map(move |bg| {
        let chain = case.with(Node::Background(Header {
            keyword: bg.keyword.clone(),
            name: bg.name.clone(),
            location: bg.location.clone(),
            tags: Vec::new(),
        }));
        bg.steps
            .iter()
            .map(|s| step(&chain, s, &[]))
            .collect::<Vec<_>>()
    })
}

/// Compiles a single document step, substituting the `values` into it.
fn step(
    parent: &Chain,
    s: &document::Step,
    values: &[(String, String)],
) -> test::Step {
    let chain = parent.with(Node::Step(source::Step {
        keyword: s.keyword.clone(),
        text: s.text.clone(),
        location: s.location.clone(),
    }));
    let argument = s.argument.as_ref().map(|arg| match arg {
        Argument::DocString(doc) => Argument::DocString(DocString {
            content: substitute(&doc.content, values),
            content_type: doc.content_type.clone(),
        }),
        Argument::DataTable(table) => {
            Argument::DataTable(table.map_cells(|c| substitute(c, values)))
        }
    });
    test::Step::new(substitute(&s.text, values), argument, chain)
}

/// Replaces `<name>` placeholders in the `text` with their `values`.
///
/// Replacements are never re-scanned, and unknown placeholders are kept
/// verbatim.
fn substitute(text: &str, values: &[(String, String)]) -> String {
    if values.is_empty() {
        return text.to_owned();
    }
    lazy_regex::regex!(r"<([^>\s]+)>")
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            caps.get(1)
                .and_then(|name| {
                    values.iter().find(|(k, _)| k == name.as_str())
                })
                .map_or_else(|| whole.to_owned(), |(_, v)| v.clone())
        })
        .into_owned()
}

fn header(
    keyword: &str,
    name: &str,
    location: &Location,
    tags: &[Tag],
) -> Header {
    Header {
        keyword: keyword.to_owned(),
        name: name.to_owned(),
        location: location.clone(),
        tags: tags.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{document::Feature, parser};

    fn feature(src: &str) -> Feature {
        parser::parse_str(src).unwrap_or_else(|e| panic!("{e}"))
    }

    fn texts(case: &Case) -> Vec<&str> {
        case.steps().iter().map(test::Step::text).collect()
    }

    #[test]
    fn prepends_background_to_every_scenario() {
        let f = feature(
            "\
Feature: Basket
  Background:
    Given a basket

  Scenario: one
    When I add 1

  Scenario: two
    When I add 2
",
        );

        let cases = compile_feature(&f).unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(texts(&cases[0]), ["a basket", "I add 1"]);
        assert_eq!(texts(&cases[1]), ["a basket", "I add 2"]);
        assert_eq!(cases[1].name(), "Scenario: two");
    }

    #[test]
    fn expands_outline_per_examples_row() {
        let f = feature(
            "\
Feature: Eating
  Scenario Outline: eat
    Given <start> cucumbers
    When I eat <eat> of <start>
      \"\"\"
      ate <eat>
      \"\"\"

    Examples:
      | start | eat |
      | 12    | 5   |
      | 20    | 5   |

    @big
    Examples:
      | start | eat |
      | 7     | <start> |
",
        );

        let cases = compile_feature(&f).unwrap();

        assert_eq!(cases.len(), 3);
        assert!(cases.iter().all(|c| c.steps().len() == 2));
        assert_eq!(texts(&cases[0]), ["12 cucumbers", "I eat 5 of 12"]);
        assert_eq!(texts(&cases[1]), ["20 cucumbers", "I eat 5 of 20"]);
        assert_eq!(texts(&cases[2])[1], "I eat <start> of 7");
        assert_eq!(cases[1].name(), "Scenario Outline: eat, row 2");
        assert_eq!(cases[2].tag_names().collect::<Vec<_>>(), ["@big"]);
        assert!(matches!(
            cases[0].steps()[1].argument(),
            Some(Argument::DocString(d)) if d.content.contains("ate 5"),
        ));
        assert!(cases[0].steps()[0].argument().is_none());
    }

    #[test]
    fn names_rows_after_their_examples_table() {
        let f = feature(
            "\
Feature: Eating
  Scenario Outline: eat
    Given <n> cucumbers

    Examples: Named
      | n |
      | 1 |

    Examples:
      | n |
      | 2 |
",
        );

        let cases = compile_feature(&f).unwrap();

        let names = cases.iter().map(Case::name).collect::<Vec<_>>();
        assert_eq!(
            names,
            ["Scenario Outline: eat, Named", "Scenario Outline: eat, row 1"],
        );
    }

    #[test]
    fn places_rule_background_after_feature_one() {
        let f = feature(
            "\
@f
Feature: Rules
  Background:
    Given feature setup

  Rule: first
    Background:
      Given rule setup

    @s
    Scenario: ruled
      Then it works
",
        );

        let cases = compile_feature(&f).unwrap();

        assert_eq!(
            texts(&cases[0]),
            ["feature setup", "rule setup", "it works"],
        );
        assert_eq!(cases[0].tag_names().collect::<Vec<_>>(), ["@f", "@s"]);
        assert!(matches!(
            cases[0].source().nodes().nth(1),
            Some(Node::Rule(h)) if h.name == "first",
        ));
    }

    #[test]
    fn rejects_outlines_without_examples() {
        let f = feature(
            "\
Feature: Broken
  Scenario Outline: nothing to expand
    Given <x>
",
        );

        let err = compile_feature(&f).unwrap_err();

        assert!(matches!(
            err,
            Error::MissingExamples { ref name, .. } if name == "nothing to expand",
        ));

        let f = feature(
            "\
Feature: Broken
  Scenario Template: nothing either
    Given <x>
",
        );
        assert!(matches!(
            compile_feature(&f),
            Err(Error::MissingExamples { .. }),
        ));
    }

    #[test]
    fn compiles_deterministically() {
        let src = "\
Feature: Twice
  Scenario: a
    Given x
  Scenario Outline: b
    Given <y>
    Examples:
      | y |
      | 1 |
";

        let first = compile_suite([&feature(src)]).unwrap();
        let second = compile_suite([&feature(src)]).unwrap();

        let shape = |s: &Suite| {
            s.iter()
                .map(|c| (c.name().to_owned(), c.steps().len()))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&first), shape(&second));
        assert_ne!(first[0].id(), second[0].id());
    }

    #[test]
    fn keeps_unknown_placeholders() {
        let values = [("a".to_owned(), "<b>".to_owned())];

        assert_eq!(substitute("<a> <b> <a b>", &values), "<b> <b> <a b>");
    }
}
