//! Turning a [`Route`] into a concrete HTTP request.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{Map, Value};
use url::Url;

use super::Route;
use crate::{Error, Result};

/// A fully built request, ready for a transport.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl PreparedRequest {
    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Absolute URL including the query string.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path component of the URL.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable request headers, for the client's session headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Raw body bytes.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Body decoded as JSON, if any.
    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }

    /// Decoded query pairs in URL order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Split into parts for a transport.
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Option<Vec<u8>>) {
        (self.method, self.url, self.headers, self.body)
    }
}

impl Route {
    /// Build the HTTP request for this route against `base_url`.
    ///
    /// POST routes send their parameters as a JSON body. Other methods encode
    /// them as query pairs, which must be scalars.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a non-POST route carries a nested
    /// parameter value.
    pub fn prepare(&self, base_url: &Url) -> Result<PreparedRequest> {
        let method = self.method();

        let mut url = base_url.clone();
        let path = format!("{}{}", base_url.path().trim_end_matches('/'), self.path());
        url.set_path(&path);

        let mut headers = self.headers();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let params = self.parameters();
        let body = if method == Method::POST {
            params
                .map(|params| serde_json::to_vec(&Value::Object(params)))
                .transpose()?
        } else {
            if let Some(params) = params {
                let pairs = query_pairs(self.name(), &params)?;
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs);
                }
            }
            None
        };

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

fn query_pairs(route: &str, params: &Map<String, Value>) -> Result<Vec<(String, String)>> {
    params
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(Error::InvalidInput(format!(
                        "{} parameter `{}` is not a scalar and cannot go in a query string",
                        route, key
                    )))
                }
            };
            Ok((key.clone(), text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaRef, MediaType};
    use crate::route::Pagination;
    use secrecy::SecretString;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("https://api.trakt.tv").unwrap()
    }

    #[test]
    fn test_get_query() {
        let route = Route::Trending(MediaType::Movies, Pagination::new(2, 10).unwrap());
        let request = route.prepare(&base()).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/movies/trending");
        assert!(request.body().is_none());

        let pairs = request.query_pairs();
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "10".to_string())));
        assert!(pairs.contains(&("extended".to_string(), "full,images".to_string())));
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_post_body_matches_parameters() {
        let route = Route::AddToWatchlist(vec![MediaRef::new(MediaType::Movies, 11u64)]);
        let request = route.prepare(&base()).unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().query(), None);
        assert_eq!(
            request.json_body().unwrap(),
            Value::Object(route.parameters().unwrap())
        );
        assert_eq!(
            request.json_body().unwrap(),
            json!({"movies": [{"ids": {"trakt": 11}}]})
        );
    }

    #[test]
    fn test_delete_without_parameters() {
        let route = Route::HideRecommendation(MediaRef::new(MediaType::Shows, 3u64));
        let request = route.prepare(&base()).unwrap();

        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.url().as_str(), "https://api.trakt.tv/recommendations/shows/3");
        assert!(request.body().is_none());
    }

    #[test]
    fn test_base_url_with_prefix() {
        let base = Url::parse("http://localhost:8080/api/").unwrap();
        let request = Route::Movie("tron-legacy-2010".into()).prepare(&base).unwrap();
        assert_eq!(request.path(), "/api/movies/tron-legacy-2010");
    }

    #[test]
    fn test_post_secrets_in_body_only() {
        let route = Route::PollDevice {
            device_code: "dev".into(),
            client_id: "id".into(),
            client_secret: SecretString::from("s3cr3t".to_string()),
        };
        let request = route.prepare(&base()).unwrap();
        assert!(!request.url().as_str().contains("s3cr3t"));
        assert_eq!(request.json_body().unwrap()["client_secret"], "s3cr3t");
    }

    #[test]
    fn test_every_non_post_route_has_scalar_parameters() {
        for route in crate::route::tests::catalog() {
            let prepared = route.prepare(&base());
            assert!(prepared.is_ok(), "{} failed to prepare", route.name());
        }
    }

    #[test]
    fn test_nested_query_value_is_rejected() {
        let mut params = Map::new();
        params.insert("ids".to_string(), json!({"trakt": 1}));
        let err = query_pairs("Example", &params).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
