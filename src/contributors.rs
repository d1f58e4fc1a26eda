// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Contributor listing for repository census records.
///
/// Walks the paginated REST contributors endpoint by following the
/// `rel="next"` relation of each response's `Link` header and concatenates
/// every page in order. Records are kept as opaque JSON values.
use octocrab::Octocrab;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    config::{ApiEndpoint, Pagination},
    error::Error,
    link::next_page_url,
    repository::RepositoryRef,
    retry::{RetryConfig, retry_with_backoff_if},
};

/// One decoded page of the contributors listing.
#[derive(Debug,)]
struct ContributorPage
{
    records: Vec<Value,>,
    next:    Option<String,>,
}

/// URL of the first contributors page for a repository.
///
/// # Examples
///
/// ```
/// use repo_census::{ApiEndpoint, RepositoryRef, contributors_url};
///
/// let url = contributors_url(&ApiEndpoint::default(), &RepositoryRef::new("acme", "widget",), 100,);
/// assert_eq!(url, "https://api.github.com/repos/acme/widget/contributors?per_page=100");
/// ```
pub fn contributors_url(api: &ApiEndpoint, repository: &RepositoryRef, page_size: u8,) -> String
{
    format!(
        "{}/repos/{}/{}/contributors?per_page={page_size}",
        api.base(),
        repository.owner,
        repository.name
    )
}

/// Fetches every contributor record of a repository.
///
/// Requests are sent without an authorization header. The walk stops when a
/// response carries no `next` link, or once `pagination.max_pages` pages were
/// fetched, in which case a warning is logged and the records gathered so far
/// are returned.
///
/// # Errors
///
/// Returns [`Error::Service`] on transport failures and [`Error::Decode`]
/// when a page body is not a JSON array. Only transport failures and
/// decode failures of 5xx responses are retried.
///
/// # Example
///
/// ```no_run
/// use repo_census::{ApiEndpoint, Pagination, RepositoryRef, fetch_contributors, retry::RetryConfig};
///
/// # async fn example() -> Result<(), repo_census::Error> {
/// let contributors = fetch_contributors(
///     &ApiEndpoint::default(),
///     &RepositoryRef::new("rust-lang", "cargo",),
///     &Pagination::default(),
///     &RetryConfig::default(),
/// )
/// .await?;
/// println!("{} contributors", contributors.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_contributors(
    api: &ApiEndpoint,
    repository: &RepositoryRef,
    pagination: &Pagination,
    retry: &RetryConfig,
) -> Result<Vec<Value,>, Error,>
{
    let octocrab = api.client(None,)?;

    let mut contributors = Vec::new();
    let mut next = Some(contributors_url(api, repository, pagination.page_size,),);
    let mut pages = 0u32;

    while let Some(url,) = next.take() {
        if let Some(limit,) = pagination.max_pages
            && pages >= limit
        {
            warn!(
                "Stopping contributor listing for {} after {} pages; {} records collected",
                repository,
                limit,
                contributors.len()
            );
            break;
        }

        let client = &octocrab;
        let target = url.as_str();
        let page = retry_with_backoff_if(
            retry,
            &format!("contributors page {} for {repository}", pages + 1),
            Error::is_transient,
            move || fetch_page(client, target,),
        )
        .await?;

        pages += 1;
        debug!("Fetched {} contributors from {}", page.records.len(), url);
        contributors.extend(page.records,);
        next = page.next;
    }

    info!("Found {} contributors across {} pages for {}", contributors.len(), pages, repository);

    Ok(contributors,)
}

async fn fetch_page(octocrab: &Octocrab, url: &str,) -> Result<ContributorPage, Error,>
{
    let response = octocrab._get(url,).await?;
    let status = response.status().as_u16();
    let next = next_page_url(
        response.headers().get("link",).and_then(|value| value.to_str().ok(),),
    );
    let body = octocrab.body_to_string(response,).await?;

    // Empty repositories answer with 204 and no body.
    if body.trim().is_empty() {
        return Ok(ContributorPage {
            records: Vec::new(),
            next,
        },);
    }

    let records = serde_json::from_str::<Vec<Value,>,>(&body,).map_err(|source| Error::Decode {
        url: url.to_owned(),
        status,
        source,
    },)?;

    Ok(ContributorPage {
        records,
        next,
    },)
}

#[cfg(test)]
mod tests
{
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;

    const FIRST_PAGE: &str = "/repos/acme/widget/contributors?per_page=100";

    fn contributors(start: usize, count: usize,) -> String
    {
        let records: Vec<Value,> = (start..start + count)
            .map(|id| json!({ "login": format!("user{id}"), "id": id, "contributions": 1 }),)
            .collect();
        Value::Array(records,).to_string()
    }

    fn next_link(base: &str, page: u32,) -> String
    {
        format!("<{base}{FIRST_PAGE}&page={page}>; rel=\"next\", <{base}{FIRST_PAGE}&page=3>; rel=\"last\"")
    }

    #[test]
    fn first_page_url_uses_page_size()
    {
        let url = contributors_url(
            &ApiEndpoint::new("http://localhost:8080/",),
            &RepositoryRef::new("acme", "widget",),
            30,
        );
        assert_eq!(url, "http://localhost:8080/repos/acme/widget/contributors?per_page=30");
    }

    #[tokio::test]
    async fn concatenates_pages_in_order()
    {
        let mut server = Server::new_async().await;
        let base = server.url();

        let first = server
            .mock("GET", FIRST_PAGE,)
            .match_header("authorization", Matcher::Missing,)
            .with_header("content-type", "application/json",)
            .with_header("link", next_link(&base, 2,).as_str(),)
            .with_body(contributors(0, 100,),)
            .create_async()
            .await;
        let second = server
            .mock("GET", format!("{FIRST_PAGE}&page=2").as_str(),)
            .with_header("content-type", "application/json",)
            .with_header("link", next_link(&base, 3,).as_str(),)
            .with_body(contributors(100, 100,),)
            .create_async()
            .await;
        let third = server
            .mock("GET", format!("{FIRST_PAGE}&page=3").as_str(),)
            .with_header("content-type", "application/json",)
            .with_header("link", format!("<{base}{FIRST_PAGE}&page=2>; rel=\"prev\"").as_str(),)
            .with_body(contributors(200, 37,),)
            .create_async()
            .await;

        let records = fetch_contributors(
            &ApiEndpoint::new(&base,),
            &RepositoryRef::new("acme", "widget",),
            &Pagination::default(),
            &RetryConfig::disabled(),
        )
        .await
        .expect("contributor fetch failed",);

        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;

        assert_eq!(records.len(), 237);
        for (index, record,) in records.iter().enumerate() {
            assert_eq!(record["id"], index);
        }
    }

    #[tokio::test]
    async fn stops_at_page_limit()
    {
        let mut server = Server::new_async().await;
        let base = server.url();

        let endless = server
            .mock("GET", FIRST_PAGE,)
            .with_header("content-type", "application/json",)
            .with_header("link", format!("<{base}{FIRST_PAGE}>; rel=\"next\"").as_str(),)
            .with_body(contributors(0, 2,),)
            .expect(3,)
            .create_async()
            .await;

        let pagination = Pagination {
            page_size: 100, max_pages: Some(3,),
        };
        let records = fetch_contributors(
            &ApiEndpoint::new(&base,),
            &RepositoryRef::new("acme", "widget",),
            &pagination,
            &RetryConfig::disabled(),
        )
        .await
        .expect("contributor fetch failed",);

        endless.assert_async().await;
        assert_eq!(records.len(), 6);
    }

    #[tokio::test]
    async fn treats_empty_body_as_empty_page()
    {
        let mut server = Server::new_async().await;
        let _mock = server.mock("GET", FIRST_PAGE,).with_status(204,).create_async().await;

        let records = fetch_contributors(
            &ApiEndpoint::new(&server.url(),),
            &RepositoryRef::new("acme", "widget",),
            &Pagination::default(),
            &RetryConfig::disabled(),
        )
        .await
        .expect("contributor fetch failed",);

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn non_array_body_is_decode_error()
    {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", FIRST_PAGE,)
            .with_header("content-type", "application/json",)
            .with_body(r#"{"message":"unexpected"}"#,)
            .create_async()
            .await;

        let error = fetch_contributors(
            &ApiEndpoint::new(&server.url(),),
            &RepositoryRef::new("acme", "widget",),
            &Pagination::default(),
            &RetryConfig::disabled(),
        )
        .await
        .expect_err("expected decode error",);

        match error {
            Error::Decode {
                url,
                status,
                ..
            } => {
                assert!(url.ends_with(FIRST_PAGE));
                assert_eq!(status, 200);
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn disabled_retry_sends_one_request_on_server_error()
    {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", FIRST_PAGE,)
            .with_status(500,)
            .with_header("content-type", "application/json",)
            .with_body(r#"{"message":"Server Error"}"#,)
            .expect(1,)
            .create_async()
            .await;

        let error = fetch_contributors(
            &ApiEndpoint::new(&server.url(),),
            &RepositoryRef::new("acme", "widget",),
            &Pagination::default(),
            &RetryConfig::disabled(),
        )
        .await
        .expect_err("expected decode error",);

        mock.assert_async().await;
        assert!(matches!(error, Error::Decode { status: 500, .. }), "unexpected error: {error:?}");
    }

    #[tokio::test]
    async fn missing_repository_is_not_retried()
    {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", FIRST_PAGE,)
            .with_status(404,)
            .with_header("content-type", "application/json",)
            .with_body(r#"{"message":"Not Found"}"#,)
            .expect(1,)
            .create_async()
            .await;

        let retry = RetryConfig {
            max_attempts: 3, initial_delay_ms: 5, backoff_factor: 2.0,
        };
        let error = fetch_contributors(
            &ApiEndpoint::new(&server.url(),),
            &RepositoryRef::new("acme", "widget",),
            &Pagination::default(),
            &retry,
        )
        .await
        .expect_err("expected decode error",);

        mock.assert_async().await;
        assert!(matches!(error, Error::Decode { status: 404, .. }));
    }
}
