// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `Link` header parsing for REST pagination.
//!
//! GitHub advertises neighbouring pages as
//! `<url>; rel="next", <url>; rel="last"`. Only the `next` relation drives the
//! contributor walk.

const NEXT_RELATION: &str = "rel=\"next\"";

/// Extracts the URL tagged `rel="next"` from a `Link` header value.
///
/// Returns `None` when the header is absent, empty, or has no `next` entry.
///
/// # Examples
///
/// ```
/// use repo_census::next_page_url;
///
/// let header = r#"<https://api.x.com/page2>; rel="next", <https://api.x.com/page1>; rel="prev""#;
/// assert_eq!(next_page_url(Some(header,),).as_deref(), Some("https://api.x.com/page2"));
/// assert_eq!(next_page_url(None,), None);
/// ```
pub fn next_page_url(header: Option<&str,>,) -> Option<String,>
{
    header?.split(',',).find_map(|entry| {
        let mut parts = entry.split(';',).map(str::trim,);
        let target = parts.next()?;
        if !parts.any(|param| param == NEXT_RELATION,) {
            return None;
        }

        target
            .strip_prefix('<',)
            .and_then(|rest| rest.strip_suffix('>',),)
            .map(str::to_owned,)
    },)
}

#[cfg(test)]
mod tests
{
    use super::next_page_url;

    #[test]
    fn extracts_next_before_prev()
    {
        let header = r#"<https://api.x.com/page2>; rel="next", <https://api.x.com/page1>; rel="prev""#;
        assert_eq!(next_page_url(Some(header)).as_deref(), Some("https://api.x.com/page2"));
    }

    #[test]
    fn extracts_next_when_not_first()
    {
        let header = concat!(
            r#"<https://api.github.com/repositories/1/contributors?per_page=100&page=1>; rel="prev", "#,
            r#"<https://api.github.com/repositories/1/contributors?per_page=100&page=3>; rel="next", "#,
            r#"<https://api.github.com/repositories/1/contributors?per_page=100&page=5>; rel="last""#,
        );
        assert_eq!(
            next_page_url(Some(header)).as_deref(),
            Some("https://api.github.com/repositories/1/contributors?per_page=100&page=3")
        );
    }

    #[test]
    fn absent_without_next_relation()
    {
        let header = r#"<https://api.x.com/page1>; rel="prev", <https://api.x.com/page1>; rel="first""#;
        assert_eq!(next_page_url(Some(header)), None);
    }

    #[test]
    fn absent_without_header()
    {
        assert_eq!(next_page_url(None), None);
        assert_eq!(next_page_url(Some("")), None);
    }

    #[test]
    fn ignores_malformed_target()
    {
        assert_eq!(next_page_url(Some(r#"https://api.x.com/page2; rel="next""#)), None);
    }
}
