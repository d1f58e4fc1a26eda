// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Repository metadata fetched through the GitHub GraphQL API.
///
/// One query per repository gathers search counts for pull requests and
/// issues together with repository facts: creation date, forks, root file
/// tree, recent pull request statuses, releases and stars.
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{
    config::ApiEndpoint,
    credential::Credential,
    error::Error,
    repository::RepositoryRef,
    retry::{RetryConfig, retry_with_backoff_if},
};

/// Decoded `data` object of the metadata query, field order preserved.
pub type RepositoryMetadata = Map<String, Value,>;

/// Builds the GraphQL query text for a repository.
///
/// The `owner/name` pair is embedded as a literal `repo:` search qualifier in
/// five aliased search sub-queries and as arguments of the nested
/// `repository` lookup.
///
/// # Examples
///
/// ```
/// use repo_census::{RepositoryRef, metadata_query};
///
/// let query = metadata_query(&RepositoryRef::new("acme", "widget",),);
/// assert!(query.contains(r#"query: "is:PR is:merged repo:acme/widget""#));
/// assert!(query.contains(r#"repository(owner: "acme", name: "widget")"#));
/// ```
pub fn metadata_query(repository: &RepositoryRef,) -> String
{
    let owner = escape(&repository.owner,);
    let name = escape(&repository.name,);
    let repo_id = format!("{owner}/{name}");

    format!(
        r#"query {{
    closePRs: search(first: 1, type: ISSUE, query: "is:PR is:closed repo:{repo_id}") {{
        issueCount
    }}
    mergedPRs: search(first: 1, type: ISSUE, query: "is:PR is:merged repo:{repo_id}") {{
        issueCount
    }}
    openPRs: search(first: 1, type: ISSUE, query: "is:PR is:open repo:{repo_id}") {{
        issueCount
    }}
    closedIssues: search(first: 1, type: ISSUE, query: "is:issue is:closed repo:{repo_id}") {{
        issueCount
    }}
    openIssues: search(first: 1, type: ISSUE, query: "is:issue is:open repo:{repo_id}") {{
        issueCount
    }}
    repository(owner: "{owner}", name: "{name}") {{
        createdAt
        forkCount
        issues {{
            totalCount
        }}
        files: object(expression: "HEAD:") {{
            ... on Tree {{
                entries {{
                    name
                    extension
                }}
            }}
        }}
        name
        pullRequests(last: 10) {{
            totalCount
            nodes {{
                commits(last: 1) {{
                    nodes {{
                        commit {{
                            status {{
                                state
                            }}
                        }}
                    }}
                }}
            }}
        }}
        releases(last: 100) {{
            totalCount
            nodes {{
                name
                tagName
            }}
        }}
        stargazerCount
    }}
}}"#
    )
}

fn escape(value: &str,) -> String
{
    value.replace('\\', "\\\\",).replace('"', "\\\"",)
}

/// Runs the metadata query for one repository.
///
/// A dedicated authenticated client session is created for the call and
/// released when it returns, whatever the outcome. Transport failures and
/// server errors are retried according to `retry`; client errors and
/// GraphQL-level errors are not.
///
/// # Errors
///
/// Returns [`Error::Service`] when the request cannot be completed,
/// [`Error::Api`] when GitHub answers with an error status (bad credentials
/// included) and [`Error::Query`] when the response reports errors or lacks
/// a `data` object.
///
/// # Example
///
/// ```no_run
/// use repo_census::{ApiEndpoint, Credential, RepositoryRef, fetch_repository_metadata, retry::RetryConfig};
///
/// # async fn example() -> Result<(), repo_census::Error> {
/// let credential = Credential::new(std::env::var("GH_TOKEN",).ok(),)?;
/// let metadata = fetch_repository_metadata(
///     &ApiEndpoint::default(),
///     &RepositoryRef::new("rust-lang", "cargo",),
///     &credential,
///     &RetryConfig::default(),
/// )
/// .await?;
/// println!("{:?}", metadata.get("repository"));
/// # Ok(())
/// # }
/// ```
pub async fn fetch_repository_metadata(
    api: &ApiEndpoint,
    repository: &RepositoryRef,
    credential: &Credential,
    retry: &RetryConfig,
) -> Result<RepositoryMetadata, Error,>
{
    let octocrab = api.client(Some(credential,),)?;

    let payload = json!({ "query": metadata_query(repository) });
    debug!("Querying {} for {}", api.graphql_url(), repository);

    let client = &octocrab;
    let body = &payload;
    let response = retry_with_backoff_if(
        retry,
        &format!("metadata query for {repository}"),
        Error::is_transient,
        move || async move {
            let response: Value = client.graphql(body,).await?;
            Ok::<_, Error,>(response,)
        },
    )
    .await?;

    extract_data(response,)
}

/// Splits a GraphQL response into its `data` object, failing on any reported
/// error.
fn extract_data(response: Value,) -> Result<RepositoryMetadata, Error,>
{
    let Value::Object(mut envelope,) = response else {
        return Err(Error::query("response is not a JSON object",),);
    };

    if let Some(Value::Array(errors,),) = envelope.get("errors",)
        && !errors.is_empty()
    {
        let messages: Vec<String,> = errors
            .iter()
            .map(|error| match error.get("message",).and_then(Value::as_str,) {
                Some(message,) => message.to_owned(),
                None => error.to_string(),
            },)
            .collect();
        return Err(Error::query(messages.join("; ",),),);
    }

    match envelope.remove("data",) {
        Some(Value::Object(data,),) => Ok(data,),
        _ => Err(Error::query("response does not contain a data object",),),
    }
}
