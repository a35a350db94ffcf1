// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Boolean tag expressions with optional occurrence limits.
//!
//! Grammar:
//! ```text
//! expression  := conjunction (("or" | ",") conjunction)*
//! conjunction := term ("and" term)*
//! term        := ("not" | "~")? literal
//! literal     := "@" name (":" limit)?
//! ```
//!
//! So `@fast and not @wip, @smoke:3` reads as
//! `(@fast ∧ ¬@wip) ∨ @smoke`, additionally limiting `@smoke` to 3
//! occurrences across the whole run.

use std::{fmt, str::FromStr};

use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;

/// Parsed tag expression: a disjunction of [`Conjunction`]s.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Expression {
    /// Alternatives, any of which has to hold.
    any: Vec<Conjunction>,

    /// Occurrence limits declared by literals.
    limits: Vec<Limit>,
}

/// Conjunction of [`Term`]s, all of which have to hold.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Conjunction {
    all: Vec<Term>,
}

/// Possibly negated tag literal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Term {
    /// Whether the literal is negated.
    pub negated: bool,

    /// Tag name, including its leading `@`.
    pub tag: String,
}

/// Maximum number of occurrences of a tag across a whole run.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display("{tag}:{max}")]
pub struct Limit {
    /// Tag name, including its leading `@`.
    pub tag: String,

    /// Maximum allowed occurrences.
    pub max: usize,
}

impl Expression {
    /// Parses the given `input`.
    ///
    /// # Errors
    ///
    /// If the `input` is not a well-formed tag expression.
    pub fn parse(input: &str) -> Result<Self, ExpressionError> {
        Parser::new(input).expression()
    }

    /// Evaluates this [`Expression`] against the given tag names.
    #[must_use]
    pub fn eval<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        self.any.iter().any(|c| {
            c.all.iter().all(|t| {
                let present =
                    tags.clone().into_iter().any(|tag| tag.as_ref() == t.tag);
                present != t.negated
            })
        })
    }

    /// Returns the occurrence [`Limit`]s declared by this [`Expression`], in
    /// declaration order.
    #[must_use]
    pub fn limits(&self) -> &[Limit] {
        &self.limits
    }

    /// Returns the alternatives of this [`Expression`].
    #[must_use]
    pub fn conjunctions(&self) -> &[Conjunction] {
        &self.any
    }
}

impl Conjunction {
    /// Returns the [`Term`]s of this [`Conjunction`].
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.all
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .any
            .iter()
            .map(|c| {
                c.all
                    .iter()
                    .map(|t| {
                        let limit = self
                            .limits
                            .iter()
                            .find(|l| !t.negated && l.tag == t.tag)
                            .map(|l| format!(":{}", l.max))
                            .unwrap_or_default();
                        let not = if t.negated { "not " } else { "" };
                        format!("{not}{}{limit}", t.tag)
                    })
                    .join(" and ")
            })
            .join(" or ");
        write!(f, "{rendered}")
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error of parsing a malformed tag [`Expression`].
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("Invalid tag expression `{expression}`: {reason}")]
pub struct ExpressionError {
    /// The malformed expression.
    #[error(not(source))]
    pub expression: String,

    /// What is wrong with it.
    #[error(not(source))]
    pub reason: String,
}

/// Lexical token of a tag expression.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Token<'i> {
    Or,
    And,
    Not,
    Literal(&'i str),
}

impl<'i> Token<'i> {
    /// Classifies a whitespace-delimited word.
    fn word(word: &'i str) -> Self {
        match word {
            "or" => Self::Or,
            "and" => Self::And,
            "not" => Self::Not,
            literal => Self::Literal(literal),
        }
    }
}

/// Splits the given `input` into [`Token`]s.
fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in input.char_indices() {
        if c != ',' && c != '~' && !c.is_whitespace() {
            if start.is_none() {
                start = Some(i);
            }
            continue;
        }
        if let Some(from) = start.take() {
            tokens.push(Token::word(&input[from..i]));
        }
        match c {
            ',' => tokens.push(Token::Or),
            '~' => tokens.push(Token::Not),
            _ => {}
        }
    }
    if let Some(from) = start {
        tokens.push(Token::word(&input[from..]));
    }
    tokens
}

/// Splits an optional `:N` occurrence limit off a tag literal.
fn split_limit(literal: &str) -> Result<(&str, Option<usize>), String> {
    match literal.rsplit_once(':') {
        None => Ok((literal, None)),
        Some((tag, max)) => max
            .parse()
            .map(|max| (tag, Some(max)))
            .map_err(|_| format!("malformed limit `{max}` of `{tag}`")),
    }
}

/// Recursive-descent parser of [`Expression`]s.
struct Parser<'i> {
    input: &'i str,
    tokens: Vec<Token<'i>>,
    pos: usize,
    limits: Vec<Limit>,
}

impl<'i> Parser<'i> {
    fn new(input: &'i str) -> Self {
        Self {
            input,
            tokens: tokenize(input),
            pos: 0,
            limits: Vec::new(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> ExpressionError {
        ExpressionError {
            expression: self.input.to_owned(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<&Token<'i>> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token<'i>> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expression(mut self) -> Result<Expression, ExpressionError> {
        if self.tokens.is_empty() {
            return Err(self.error("expression is empty"));
        }
        let mut any = vec![self.conjunction()?];
        while let Some(token) = self.next() {
            match token {
                Token::Or => any.push(self.conjunction()?),
                other => {
                    return Err(
                        self.error(format!("expected `or`, found {other:?}"))
                    );
                }
            }
        }
        Ok(Expression {
            any,
            limits: self.limits,
        })
    }

    fn conjunction(&mut self) -> Result<Conjunction, ExpressionError> {
        let mut all = vec![self.term()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            all.push(self.term()?);
        }
        Ok(Conjunction { all })
    }

    fn term(&mut self) -> Result<Term, ExpressionError> {
        let negated = self.peek() == Some(&Token::Not);
        if negated {
            self.pos += 1;
        }
        match self.next() {
            Some(Token::Literal(literal)) => {
                let (tag, max) =
                    split_limit(literal).map_err(|e| self.error(e))?;
                if !tag.starts_with('@') || tag.len() < 2 {
                    return Err(self.error(format!(
                        "tag `{tag}` must start with `@` and have a name",
                    )));
                }
                if let Some(max) = max {
                    if negated {
                        return Err(self.error(format!(
                            "negated tag `{tag}` cannot have a limit",
                        )));
                    }
                    self.limits.push(Limit {
                        tag: tag.to_owned(),
                        max,
                    });
                }
                Ok(Term {
                    negated,
                    tag: tag.to_owned(),
                })
            }
            Some(other) => {
                Err(self.error(format!("expected a tag, found {other:?}")))
            }
            None => Err(self.error("unexpected end of expression")),
        }
    }
}
