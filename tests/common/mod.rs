// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.


//! Step definitions of the `basket.feature` fixture.

#![allow(dead_code)]

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use anyhow::{anyhow, ensure};
use cucumber_core::{
    document::Feature,
    mapping::{Context, Definitions},
    parser,
};
use regex::Regex;

pub const FIXTURE: &str = "tests/features/basket.feature";

/// Contents of the basket, by item.
pub type Basket = Rc<RefCell<HashMap<String, u32>>>;

pub fn init_tracing() {
    _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn feature() -> Feature {
    let mut features = parser::parse(FIXTURE).unwrap();
    assert_eq!(features.len(), 1);
    features.remove(0)
}

fn number(ctx: &Context, index: usize) -> anyhow::Result<u32> {
    Ok(ctx.capture(index).unwrap_or_default().parse()?)
}

pub fn definitions(basket: &Basket) -> Definitions {
    Definitions::new()
        .step(Regex::new("^an empty basket$").unwrap(), {
            let basket = Rc::clone(basket);
            move |_| {
                basket.borrow_mut().clear();
                Ok(())
            }
        })
        .step(Regex::new("^a friend$").unwrap(), |_| Ok(()))
        .step(Regex::new(r"^I add (\d+) (\w+)$").unwrap(), {
            let basket = Rc::clone(basket);
            move |ctx| {
                let n = number(ctx, 1)?;
                let item = ctx.capture(2).unwrap_or_default().to_owned();
                *basket.borrow_mut().entry(item).or_default() += n;
                Ok(())
            }
        })
        .step(Regex::new(r"^I (eat|give) (\d+) cucumbers").unwrap(), {
            let basket = Rc::clone(basket);
            move |ctx| {
                let n = number(ctx, 2)?;
                let mut basket = basket.borrow_mut();
                let left = basket.entry("cucumbers".into()).or_default();
                let had = *left;
                *left = had
                    .checked_sub(n)
                    .ok_or_else(|| anyhow!("only {had} cucumbers left"))?;
                Ok(())
            }
        })
        .step(Regex::new(r"^the basket has (\d+) (\w+)$").unwrap(), {
            let basket = Rc::clone(basket);
            move |ctx| {
                let n = number(ctx, 1)?;
                let item = ctx.capture(2).unwrap_or_default();
                let actual =
                    basket.borrow().get(item).copied().unwrap_or_default();
                ensure!(actual == n, "expected {n} {item}, found {actual}");
                Ok(())
            }
        })
}
