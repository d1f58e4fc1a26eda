//! Repository census: GitHub metadata and contributors as newline-delimited
//! JSON.
//!
//! The library reads a list of repository URLs, runs one GraphQL metadata
//! query and one paginated contributors walk per repository, merges both
//! results and streams each merged record as a line of JSON. Every stage is
//! exposed on its own so callers can reuse the loader, the fetchers or the
//! writer independently of [`run_census`].

mod census;
mod config;
mod contributors;
mod credential;
mod error;
mod link;
mod metadata;
mod repository;
pub mod retry;
mod writer;

pub use census::{CensusSummary, run_census};
pub use config::{
    ApiEndpoint, DEFAULT_API_BASE_URI, DEFAULT_INPUT, DEFAULT_MAX_PAGES, DEFAULT_OUTPUT,
    DEFAULT_PAGE_SIZE, Pagination, Settings,
};
pub use contributors::{contributors_url, fetch_contributors};
pub use credential::{Credential, TOKEN_VARIABLE};
pub use error::{Error, io_error, output_error};
pub use link::next_page_url;
pub use metadata::{RepositoryMetadata, fetch_repository_metadata, metadata_query};
pub use repository::{RepositoryRef, load_repositories, parse_repository_list, parse_repository_url};
pub use writer::{CONTRIBUTORS_KEY, RecordWriter, merge_contributors, write_records};
