//! Query-string assembly.

use std::collections::BTreeMap;

use url::Url;
use url::form_urlencoded;

use crate::error::Result;

/// Append `params` to `base` and parse the result.
///
/// The encoded pairs are joined with `&` when `base` already carries a query
/// (contains `?`), otherwise with a leading `?`. An empty map leaves `base`
/// untouched.
pub fn build_url(base: &str, params: &BTreeMap<String, String>) -> Result<Url> {
    if params.is_empty() {
        return Ok(Url::parse(base)?);
    }

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    let separator = if base.contains('?') { '&' } else { '?' };
    Ok(Url::parse(&format!("{base}{separator}{encoded}"))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestError;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_appends_with_question_mark() {
        let url = build_url("https://example.com/search", &params(&[("a", "1")])).unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?a=1");
    }

    #[test]
    fn test_appends_to_existing_query() {
        let url = build_url("https://example.com/search?x=1", &params(&[("a", "1")])).unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?x=1&a=1");
    }

    #[test]
    fn test_empty_params_leave_url_alone() {
        let url = build_url("https://example.com/path?keep=yes", &BTreeMap::new()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/path?keep=yes");
    }

    #[test]
    fn test_values_are_form_encoded() {
        let url = build_url(
            "https://example.com/",
            &params(&[("q", "rust lang"), ("tag", "a&b=c")]),
        )
        .unwrap();
        let pairs: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, params(&[("q", "rust lang"), ("tag", "a&b=c")]));
        assert!(url.as_str().contains("q=rust+lang"));
    }

    #[test]
    fn test_malformed_url() {
        let err = build_url("not a url", &params(&[("a", "1")])).unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl(_)));
    }
}
