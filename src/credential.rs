// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Bearer token handed explicitly to the metadata fetcher.

use crate::error::Error;

/// Environment variable the binary reads the GraphQL token from.
pub const TOKEN_VARIABLE: &str = "GH_TOKEN";

/// Opaque bearer token for the GraphQL API.
///
/// The library never reads the token from the process environment; callers
/// construct it and pass it into [`fetch_repository_metadata`](crate::fetch_repository_metadata).
#[derive(Clone,)]
pub struct Credential
{
    token: String,
}

impl Credential
{
    /// Wraps a token value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] when the token is absent or blank.
    pub fn new(token: Option<String,>,) -> Result<Self, Error,>
    {
        match token.map(|value| value.trim().to_owned(),) {
            Some(token,) if !token.is_empty() => Ok(Self {
                token,
            },),
            _ => Err(Error::MissingCredential {
                variable: TOKEN_VARIABLE.to_owned(),
            },),
        }
    }

    /// Raw token value for the authorization header.
    pub fn expose(&self,) -> &str
    {
        &self.token
    }
}

impl std::fmt::Debug for Credential
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("Credential",).field("token", &"<redacted>",).finish()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn trims_token_value()
    {
        let credential = Credential::new(Some(" ghp_abc \n".to_owned(),),).expect("valid token",);
        assert_eq!(credential.expose(), "ghp_abc");
    }

    #[test]
    fn rejects_missing_and_blank_tokens()
    {
        assert!(matches!(Credential::new(None), Err(Error::MissingCredential { .. })));
        assert!(matches!(
            Credential::new(Some("   ".to_owned())),
            Err(Error::MissingCredential { .. })
        ));
    }

    #[test]
    fn debug_output_is_redacted()
    {
        let credential = Credential::new(Some("ghp_secret".to_owned(),),).expect("valid token",);
        let debug = format!("{credential:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("redacted"));
    }
}
