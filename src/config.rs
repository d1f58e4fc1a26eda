// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Run settings for a census.
//!
//! Settings come from three layers with decreasing precedence: command-line
//! flags, an optional YAML document, and the built-in defaults below. Every
//! field of the YAML document is optional so a partial file only overrides
//! what it names.

use std::{
    fs,
    path::{Path, PathBuf},
};

use octocrab::{Octocrab, service::middleware::retry::RetryConfig as TransportRetry};
use serde::{Deserialize, Serialize};

use crate::{
    credential::Credential,
    error::{self, Error},
    retry::RetryConfig,
};

/// Repository list read when no input path is configured.
pub const DEFAULT_INPUT: &str = "repos.txt";
/// Output file written when no output path is configured.
pub const DEFAULT_OUTPUT: &str = "output/repos.json";
/// Base URI of the GitHub API serving both GraphQL and REST endpoints.
pub const DEFAULT_API_BASE_URI: &str = "https://api.github.com";
/// Page size requested from the contributors listing, also its maximum.
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// Upper bound on contributor pages fetched per repository.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Complete configuration of a census run.
///
/// # Examples
///
/// ```
/// use repo_census::Settings;
///
/// let yaml = r#"
/// output: data/repos.json
/// max_pages: null
/// retry:
///   max_attempts: 5
/// "#;
/// let settings: Settings = serde_yaml::from_str(yaml,).expect("valid settings",);
/// assert_eq!(settings.input.to_str(), Some("repos.txt"));
/// assert_eq!(settings.max_pages, None);
/// assert_eq!(settings.retry.max_attempts, 5);
/// assert_eq!(settings.retry.initial_delay_ms, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
#[serde(default, deny_unknown_fields)]
pub struct Settings
{
    /// Repository list, one URL per line.
    pub input:        PathBuf,
    /// Newline-delimited JSON output file.
    pub output:       PathBuf,
    /// Base URI for `/graphql` and `/repos/...` requests.
    pub api_base_uri: String,
    /// Contributors requested per page.
    pub page_size:    u8,
    /// Maximum contributor pages per repository; `None` walks every page.
    pub max_pages:    Option<u32,>,
    /// Retry policy for the GraphQL query and each page request.
    pub retry:        RetryConfig,
}

impl Default for Settings
{
    fn default() -> Self
    {
        Self {
            input:        PathBuf::from(DEFAULT_INPUT,),
            output:       PathBuf::from(DEFAULT_OUTPUT,),
            api_base_uri: DEFAULT_API_BASE_URI.to_owned(),
            page_size:    DEFAULT_PAGE_SIZE,
            max_pages:    Some(DEFAULT_MAX_PAGES,),
            retry:        RetryConfig::default(),
        }
    }
}

impl Settings
{
    /// Loads settings from a YAML document, filling absent fields with
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Config`] when it is not a valid settings document.
    pub fn load(path: &Path,) -> Result<Self, Error,>
    {
        let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
        Self::parse(path, &contents,)
    }

    fn parse(path: &Path, contents: &str,) -> Result<Self, Error,>
    {
        if contents.trim().is_empty() {
            return Ok(Self::default(),);
        }

        serde_yaml::from_str(contents,).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        },)
    }

    /// Checks the invariants the fetchers rely on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the first violated rule.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.page_size == 0 || self.page_size > DEFAULT_PAGE_SIZE {
            return Err(Error::validation(format!(
                "page_size must be between 1 and {DEFAULT_PAGE_SIZE}, got {}",
                self.page_size
            ),),);
        }

        if self.max_pages == Some(0,) {
            return Err(Error::validation("max_pages must be positive or null",),);
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::validation("retry.max_attempts must be at least 1",),);
        }

        if self.retry.backoff_factor.is_nan() || self.retry.backoff_factor < 1.0 {
            return Err(Error::validation(format!(
                "retry.backoff_factor must be at least 1.0, got {}",
                self.retry.backoff_factor
            ),),);
        }

        if self.api_base_uri.trim().is_empty() {
            return Err(Error::validation("api_base_uri cannot be empty",),);
        }

        Ok((),)
    }

    /// API endpoints derived from [`Self::api_base_uri`].
    pub fn api(&self,) -> ApiEndpoint
    {
        ApiEndpoint::new(&self.api_base_uri,)
    }

    /// Pagination limits for the contributor walk.
    pub fn pagination(&self,) -> Pagination
    {
        Pagination {
            page_size: self.page_size, max_pages: self.max_pages,
        }
    }
}

/// Base URI shared by the GraphQL and REST endpoints.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ApiEndpoint
{
    base: String,
}

impl ApiEndpoint
{
    /// Normalizes the base URI by dropping trailing slashes.
    pub fn new(base: &str,) -> Self
    {
        Self {
            base: base.trim().trim_end_matches('/',).to_owned(),
        }
    }

    /// Base URI without a trailing slash.
    pub fn base(&self,) -> &str
    {
        &self.base
    }

    /// Absolute URL of the GraphQL endpoint.
    pub fn graphql_url(&self,) -> String
    {
        format!("{}/graphql", self.base)
    }

    /// Builds a client session against this endpoint, authenticated when a
    /// credential is given and anonymous otherwise.
    ///
    /// octocrab's transport-level retry is switched off so [`RetryConfig`]
    /// alone decides how often a request is sent.
    pub(crate) fn client(&self, credential: Option<&Credential,>,) -> Result<Octocrab, Error,>
    {
        let mut builder = Octocrab::builder()
            .base_uri(self.base.clone(),)
            .map_err(|e| Error::service(format!("invalid API base URI {}: {e}", self.base),),)?
            .add_retry_config(TransportRetry::None,);
        if let Some(credential,) = credential {
            builder = builder.personal_token(credential.expose().to_owned(),);
        }

        builder
            .build()
            .map_err(|e| Error::service(format!("failed to initialize GitHub client: {e}"),),)
    }
}

impl Default for ApiEndpoint
{
    fn default() -> Self
    {
        Self::new(DEFAULT_API_BASE_URI,)
    }
}

/// Limits applied while following contributor pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct Pagination
{
    /// Contributors requested per page.
    pub page_size: u8,
    /// Maximum pages fetched; `None` means unbounded.
    pub max_pages: Option<u32,>,
}

impl Default for Pagination
{
    fn default() -> Self
    {
        Self {
            page_size: DEFAULT_PAGE_SIZE, max_pages: Some(DEFAULT_MAX_PAGES,),
        }
    }
}
