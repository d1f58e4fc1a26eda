// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Sequential census over a repository list.
///
/// For each repository the metadata query and the contributor walk run one
/// after the other, the results are merged and the record is appended to the
/// output as soon as it is complete.
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::{
    config::Settings,
    contributors::fetch_contributors,
    credential::Credential,
    error::Error,
    metadata::fetch_repository_metadata,
    repository::load_repositories,
    writer::{RecordWriter, merge_contributors},
};

/// Outcome of a completed census run.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct CensusSummary
{
    /// Number of records written, one per input repository.
    pub repositories: usize,
    /// File the records were written to.
    pub output:       PathBuf,
}

impl std::fmt::Display for CensusSummary
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        write!(f, "wrote {} repositories to {}", self.repositories, self.output.display())
    }
}

/// Runs a full census with the provided settings.
///
/// Repositories are processed strictly in input order. The first failure
/// aborts the run; records appended before it remain in the output file.
///
/// # Errors
///
/// Returns [`Error::Validation`] for invalid settings or a malformed
/// repository list, and propagates loader, fetcher and writer errors.
///
/// # Example
///
/// ```no_run
/// use repo_census::{Credential, Settings, run_census};
///
/// # async fn example() -> Result<(), repo_census::Error> {
/// let credential = Credential::new(std::env::var("GH_TOKEN",).ok(),)?;
/// let summary = run_census(&Settings::default(), &credential,).await?;
/// println!("{summary}");
/// # Ok(())
/// # }
/// ```
pub async fn run_census(settings: &Settings, credential: &Credential,) -> Result<CensusSummary, Error,>
{
    settings.validate()?;

    let repositories = load_repositories(&settings.input,)?;
    info!("Loaded {} repositories from {}", repositories.len(), settings.input.display());

    let api = settings.api();
    let pagination = settings.pagination();
    let mut writer = RecordWriter::create(&settings.output,)?;

    let pb = ProgressBar::new(repositories.len() as u64,);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.yellow} [{elapsed_precise}] {pos}/{len} {msg}",)
            .unwrap_or_else(|_| ProgressStyle::default_bar(),),
    );

    for repository in &repositories {
        pb.set_message(format!("Downloading repo: {repository}"),);
        info!("Downloading repo: {}", repository);

        let metadata =
            fetch_repository_metadata(&api, repository, credential, &settings.retry,).await?;
        let contributors =
            fetch_contributors(&api, repository, &pagination, &settings.retry,).await?;

        writer.append(&merge_contributors(metadata, contributors,),)?;
        pb.inc(1,);
    }

    let written = writer.finish()?;
    pb.finish_with_message(format!("Census complete: {written} repositories"),);

    let summary = CensusSummary {
        repositories: written, output: settings.output.clone(),
    };
    info!("Census complete: {}", summary);

    Ok(summary,)
}
