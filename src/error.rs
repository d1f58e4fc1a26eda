#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the census crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the loader, fetchers, writer and CLI.
///
/// Every failure is fatal for a census run: nothing in the crate recovers from
/// an [`Error`], it unwinds to the binary which reports it and exits.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading the repository list or the
    /// settings document.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// Location of the file being read.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps I/O errors that occur while writing census records.
    #[error("failed to write census output at {path:?}: {source}")]
    Output {
        /// Location of the output file or its parent directory.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors raised by the settings loader.
    #[error("failed to parse settings from {path:?}: {source}")]
    Config {
        /// Location of the settings document.
        path:   PathBuf,
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when input or settings violate invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Returned when no bearer token was supplied for the GraphQL API.
    #[error("missing GitHub token: set {variable} or pass --token")]
    MissingCredential {
        /// Environment variable the token is expected in.
        variable: String
    },
    /// Transport or HTTP failures while talking to the remote API.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    },
    /// Error status answered by the GitHub API, with its reported reason.
    #[error("GitHub API responded with HTTP {status}: {message}")]
    Api {
        /// HTTP status code of the response.
        status:  u16,
        /// Message from the response body.
        message: String
    },
    /// GraphQL responses carrying errors or lacking a data object.
    #[error("GraphQL query failed: {message}")]
    Query {
        /// Messages reported by the GraphQL endpoint.
        message: String
    },
    /// A contributor page whose body is not a JSON array.
    #[error("failed to decode contributor page {url} (HTTP {status}): {source}")]
    Decode {
        /// Page URL that produced the body.
        url:    String,
        /// HTTP status code of the response.
        status: u16,
        /// Underlying decoding error.
        source: serde_json::Error
    },
    /// Wraps serialization errors when writing census records.
    #[error("failed to serialize record: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the service error.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Constructs a GraphQL query error.
    pub fn query<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Query {
            message: message.into()
        }
    }

    /// Whether another attempt of the same request may succeed.
    ///
    /// Transport failures and server-side (5xx) statuses are transient;
    /// client errors such as bad credentials or a missing repository are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Service {
                ..
            } => true,
            Self::Api {
                status, ..
            }
            | Self::Decode {
                status, ..
            } => *status >= 500,
            _ => false
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(error: octocrab::Error) -> Self {
        match error {
            octocrab::Error::GitHub {
                source, ..
            } => Self::Api {
                status:  source.status_code.as_u16(),
                message: source.message
            },
            // The variant's own Display appends a captured backtrace.
            other => Self::Service {
                message: match std::error::Error::source(&other) {
                    Some(source) => source.to_string(),
                    None => "request to the GitHub API failed".to_owned()
                }
            }
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the input file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::Output`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Output file or directory that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn output_error(path: &Path, source: std::io::Error) -> Error {
    Error::Output {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn validation_constructor_populates_message() {
        let error = Error::validation("something went wrong");
        match error {
            Error::Validation {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::query("Bad credentials");
        assert_eq!(error.to_string(), error.to_display_string());
        assert_eq!(error.to_string(), "GraphQL query failed: Bad credentials");
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/repos.txt");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::io_error(path, io_error);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}")
        }
    }

    #[test]
    fn output_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/output/repos.json");
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = super::output_error(path, io_error);

        match error {
            Error::Output {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected output error, got {other:?}")
        }
    }

    #[test]
    fn serde_json_conversion_maps_to_serialize_variant() {
        let invalid = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let mapped: Error = invalid.into();
        assert!(matches!(mapped, Error::Serialize { .. }));
    }

    #[test]
    fn transport_and_server_errors_are_transient() {
        assert!(Error::service("connection reset").is_transient());
        assert!(
            Error::Api {
                status:  502,
                message: "Bad Gateway".to_owned()
            }
            .is_transient()
        );
    }

    #[test]
    fn client_errors_are_not_transient() {
        let unauthorized = Error::Api {
            status:  401,
            message: "Bad credentials".to_owned()
        };
        assert!(!unauthorized.is_transient());
        assert_eq!(
            unauthorized.to_string(),
            "GitHub API responded with HTTP 401: Bad credentials"
        );

        let source = serde_json::from_str::<Vec<serde_json::Value>>("{}").unwrap_err();
        let not_found = Error::Decode {
            url: "http://localhost/repos/acme/widget/contributors".to_owned(),
            status: 404,
            source
        };
        assert!(!not_found.is_transient());
        assert!(!Error::query("Could not resolve to a Repository").is_transient());
    }

    #[test]
    fn missing_credential_names_variable() {
        let error = Error::MissingCredential {
            variable: "GH_TOKEN".to_owned()
        };
        assert!(error.to_string().contains("GH_TOKEN"));
    }
}
