// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Regex`]-based step definitions with tag-scoped hooks.

use std::rc::Rc;

use derive_more::with_trait::Debug;
use regex::Regex;

use crate::{
    document::Argument,
    location::Location,
    result::Ambiguous,
    tag::Expression,
    test::{Action, Around, Case, Step},
};

use super::{CaseHooks, Mapper, StepHooks};

/// Name of a capturing group inside a [`Regex`].
pub type CaptureName = Option<String>;

/// Body of a step definition.
pub type StepFn = Rc<dyn Fn(&Context) -> anyhow::Result<()>>;

/// Body of a `Before`/`After` hook.
pub type CaseFn = Rc<dyn Fn(&Case) -> anyhow::Result<()>>;

/// Body of an `AfterStep` hook.
pub type StepHookFn = Rc<dyn Fn(&Step) -> anyhow::Result<()>>;

/// What a step definition receives when invoked.
#[derive(Clone, Debug)]
pub struct Context {
    /// Text of the matched [`Step`].
    pub text: String,

    /// [`Regex`] captures, the whole match first. Unmatched optional groups
    /// are empty.
    pub captures: Vec<(CaptureName, String)>,

    /// Multiline [`Argument`] of the matched [`Step`].
    pub argument: Option<Argument>,
}

impl Context {
    /// Returns the value of the named capture group, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|(n, _)| n.as_deref() == Some(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of the capture group at the `index` (0 is the whole
    /// match).
    #[must_use]
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).map(|(_, v)| v.as_str())
    }
}

/// Registered step definition.
#[derive(Clone, Debug)]
struct Definition {
    regex: Regex,
    location: Location,
    #[debug(skip)]
    block: StepFn,
}

/// Registered hook applying to cases whose tags satisfy its expression.
#[derive(Clone, Debug)]
#[debug("Scoped({location}, {tags:?})")]
struct Scoped<H> {
    tags: Option<Expression>,
    location: Location,
    hook: H,
}

impl<H> Scoped<H> {
    fn applies<'t>(
        &self,
        tags: impl Iterator<Item = &'t str> + Clone,
    ) -> bool {
        self.tags.as_ref().map_or(true, |e| e.eval(tags))
    }
}

/// Registry of step definitions and hooks, acting as a [`Mapper`].
///
/// Every step text should be matched by exactly one definition. Several
/// matches bind an [`Action`] failing with [`Ambiguous`].
#[derive(Clone, Debug, Default)]
pub struct Definitions {
    steps: Vec<Definition>,
    before: Vec<Scoped<CaseFn>>,
    after: Vec<Scoped<CaseFn>>,
    after_step: Vec<Scoped<StepHookFn>>,
    around: Vec<Scoped<Around>>,
}

impl Definitions {
    /// Creates an empty [`Definitions`] registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a step definition matching step texts by the `regex`.
    #[must_use]
    #[track_caller]
    pub fn step(
        mut self,
        regex: Regex,
        block: impl Fn(&Context) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.steps.push(Definition {
            regex,
            location: Location::caller(),
            block: Rc::new(block),
        });
        self
    }

    /// Registers a hook running before the steps of every [`Case`] matching
    /// the `tags`.
    ///
    /// The `hook` receives the [`Case`] as compiled: its [`Step`]s are not
    /// bound yet, and it has no hook [`Step`]s.
    #[must_use]
    #[track_caller]
    pub fn before(
        mut self,
        tags: Option<Expression>,
        hook: impl Fn(&Case) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.before.push(Scoped {
            tags,
            location: Location::caller(),
            hook: Rc::new(hook),
        });
        self
    }

    /// Registers a hook running after the steps of every [`Case`] matching
    /// the `tags`.
    ///
    /// The `hook` receives the [`Case`] as compiled: its [`Step`]s are not
    /// bound yet, and it has no hook [`Step`]s.
    #[must_use]
    #[track_caller]
    pub fn after(
        mut self,
        tags: Option<Expression>,
        hook: impl Fn(&Case) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.after.push(Scoped {
            tags,
            location: Location::caller(),
            hook: Rc::new(hook),
        });
        self
    }

    /// Registers a hook running after every [`Step`] whose source matches
    /// the `tags`.
    #[must_use]
    #[track_caller]
    pub fn after_step(
        mut self,
        tags: Option<Expression>,
        hook: impl Fn(&Step) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.after_step.push(Scoped {
            tags,
            location: Location::caller(),
            hook: Rc::new(hook),
        });
        self
    }

    /// Registers a hook wrapping the execution of every [`Case`] matching
    /// the `tags`.
    ///
    /// See [`Around::new()`] for the `hook` contract.
    #[must_use]
    #[track_caller]
    pub fn around(
        mut self,
        tags: Option<Expression>,
        hook: impl Fn(&mut dyn FnMut()) + 'static,
    ) -> Self {
        let location = Location::caller();
        self.around.push(Scoped {
            tags,
            hook: Around::at(location.clone(), hook),
            location,
        });
        self
    }

    /// Finds every definition matching the given `text`, along with its
    /// captures.
    fn find(
        &self,
        text: &str,
    ) -> Vec<(&Definition, Vec<(CaptureName, String)>)> {
        self.steps
            .iter()
            .filter_map(|def| {
                let captures = def.regex.captures(text)?;
                let values = def
                    .regex
                    .capture_names()
                    .zip(captures.iter())
                    .map(|(name, m)| {
                        (
                            name.map(ToOwned::to_owned),
                            m.map(|m| m.as_str().to_owned()).unwrap_or_default(),
                        )
                    })
                    .collect();
                Some((def, values))
            })
            .collect()
    }
}

/// Binds a case-level `hook` to the `case`.
fn case_action(scoped: &Scoped<CaseFn>, case: &Case) -> Action {
    let hook = Rc::clone(&scoped.hook);
    let case = case.clone();
    Action::at(scoped.location.clone(), move || hook(&case))
}

impl Mapper for Definitions {
    fn bind_case(&self, case: &Case, hooks: &mut CaseHooks) {
        for scoped in self.before.iter().filter(|h| h.applies(case.tag_names()))
        {
            hooks.before(case_action(scoped, case));
        }
        for scoped in self.after.iter().filter(|h| h.applies(case.tag_names()))
        {
            hooks.after(case_action(scoped, case));
        }
        for scoped in self.around.iter().filter(|h| h.applies(case.tag_names()))
        {
            hooks.around(scoped.hook.clone());
        }
    }

    fn bind_step(&self, step: &Step, hooks: &mut StepHooks) -> Option<Action> {
        let tags = step.source().tags().map(|t| t.name.as_str());
        for scoped in self.after_step.iter().filter(|h| h.applies(tags.clone()))
        {
            let hook = Rc::clone(&scoped.hook);
            let step = step.clone();
            hooks.after(Action::at(scoped.location.clone(), move || {
                hook(&step)
            }));
        }

        let mut found = self.find(step.text());
        match found.len() {
            0 => None,
            1 => {
                let (def, captures) = found.remove(0);
                let block = Rc::clone(&def.block);
                let ctx = Context {
                    text: step.text().to_owned(),
                    captures,
                    argument: step.argument().cloned(),
                };
                Some(Action::at(def.location.clone(), move || block(&ctx)))
            }
            _ => {
                let ambiguous = Ambiguous {
                    step: step.text().to_owned(),
                    locations: found
                        .iter()
                        .map(|(def, _)| def.location.to_string())
                        .collect(),
                };
                tracing::debug!(%ambiguous, "ambiguous step");
                let location = found[0].0.location.clone();
                Some(Action::at(location, move || {
                    Err(anyhow::Error::new(ambiguous.clone()))
                }))
            }
        }
    }
}
