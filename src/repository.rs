// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Loading of the repository list consumed by a census run.
//!
//! The list is a plain text file with one repository URL or path per line.
//! Only the trailing `owner/name` segments of each line are significant, so
//! `https://github.com/acme/widget`, `github.com/acme/widget` and
//! `acme/widget` all identify the same repository.

use std::{fs, path::Path};

use serde::Serialize;

use crate::error::{self, Error};

/// Identifies a remote repository by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct RepositoryRef
{
    /// Account or organization that owns the repository.
    pub owner: String,
    /// Repository name.
    pub name:  String,
}

impl RepositoryRef
{
    /// Creates a reference from owner and name.
    pub fn new(owner: impl Into<String,>, name: impl Into<String,>,) -> Self
    {
        Self {
            owner: owner.into(), name: name.into(),
        }
    }
}

impl std::fmt::Display for RepositoryRef
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parses one line of the repository list.
///
/// Surrounding whitespace and trailing slashes are stripped, the remainder is
/// split on `/` and the last two segments are taken as owner and name.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the line has fewer than two
/// `/`-separated segments.
///
/// # Examples
///
/// ```
/// use repo_census::parse_repository_url;
///
/// let repo = parse_repository_url("https://github.com/acme/widget",)?;
/// assert_eq!(repo.owner, "acme");
/// assert_eq!(repo.name, "widget");
/// # Ok::<(), repo_census::Error>(())
/// ```
pub fn parse_repository_url(line: &str,) -> Result<RepositoryRef, Error,>
{
    let trimmed = line.trim().trim_end_matches('/',);
    let mut segments = trimmed.rsplit('/',);

    match (segments.next(), segments.next(),) {
        (Some(name,), Some(owner,),) => Ok(RepositoryRef::new(owner, name,),),
        _ => Err(Error::validation(format!(
            "expected a repository URL ending in owner/name, got '{}'",
            line.trim()
        ),),),
    }
}

/// Parses every significant line of a repository list document.
///
/// Blank lines are skipped; every other line yields one entry, in order.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the 1-based line number of the first
/// malformed entry.
pub fn parse_repository_list(contents: &str,) -> Result<Vec<RepositoryRef,>, Error,>
{
    let mut repositories = Vec::new();

    for (index, line,) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let repository = parse_repository_url(trimmed,).map_err(|error| match error {
            Error::Validation {
                message,
            } => Error::validation(format!("line {}: {message}", index + 1),),
            other => other,
        },)?;
        repositories.push(repository,);
    }

    Ok(repositories,)
}

/// Reads and parses the repository list stored at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and
/// [`Error::Validation`] when a line is malformed.
pub fn load_repositories(path: &Path,) -> Result<Vec<RepositoryRef,>, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_repository_list(&contents,)
}
