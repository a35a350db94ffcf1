// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Loading of `.feature` files into [`document::Feature`]s.
//!
//! [`document::Feature`]: crate::document::Feature

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use derive_more::{Display, Error, From};

use crate::document::{self, gherkin::Ext as _, Feature};

/// Alias of a [`std::result::Result`] with a parser [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Parses the `.feature` file at the given `path`, or every `.feature` file
/// under it (case-insensitively, sorted by path) if it's a directory.
///
/// # Errors
///
/// If the `path` cannot be read or some file is not a valid feature.
pub fn parse(path: impl AsRef<Path>) -> Result<Vec<Feature>> {
    let path = path.as_ref().canonicalize().map_err(Arc::new)?;

    let files = if path.is_file() {
        vec![path.clone()]
    } else {
        let mut files =
            globwalk::GlobWalkerBuilder::new(path.as_path(), "*.feature")
                .case_insensitive(true)
                .build()
                .map_err(Arc::new)?
                .filter_map(std::result::Result::ok)
                .map(|entry| entry.path().to_path_buf())
                .collect::<Vec<PathBuf>>();
        files.sort();
        files
    };
    tracing::debug!(
        count = files.len(),
        root = %path.display(),
        "parsing features",
    );

    files.iter().map(|f| parse_file(f)).collect()
}

/// Parses a single `.feature` file.
///
/// # Errors
///
/// If the file cannot be read or is not a valid feature.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Feature> {
    let env = gherkin::GherkinEnv::default();
    let feature =
        gherkin::Feature::parse_path(path, env).map_err(Arc::new)?;
    Ok(feature.to_document()?)
}

/// Parses a feature from the given in-memory `input`.
///
/// # Errors
///
/// If the `input` is not a valid feature.
pub fn parse_str(input: &str) -> Result<Feature> {
    let env = gherkin::GherkinEnv::default();
    let feature = gherkin::Feature::parse(input, env).map_err(Arc::new)?;
    Ok(feature.to_document()?)
}

/// Error of loading features.
#[derive(Clone, Debug, Display, Error, From)]
pub enum Error {
    /// The given path cannot be accessed.
    #[display("Failed to access features path: {_0}")]
    Io(Arc<io::Error>),

    /// Failed to walk a features directory.
    #[display("Failed to walk features directory: {_0}")]
    Walk(Arc<globwalk::GlobError>),

    /// Failed to parse a feature file.
    #[display("Failed to parse feature: {_0}")]
    Parsing(Arc<gherkin::ParseFileError>),

    /// Failed to parse an in-memory feature.
    #[display("Failed to parse feature: {_0}")]
    InMemory(Arc<gherkin::ParseError>),

    /// Parsed feature doesn't fit a [`document::Feature`].
    #[display("{_0}")]
    Document(document::Error),
}
