use std::collections::BTreeMap;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;
use url::Url;

use crate::auth::AuthScheme;
use crate::transport::{decode_json, ensure_success, join_url};
use crate::Error;

const BACKEND: &str = "REST";

// ── Request ──────────────────────────────────────────────────────────

/// A fully resolved outbound REST call.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RestRequest {
    /// Resolve method, URL, headers and body for one call.
    ///
    /// The method is upper-cased and defaults to `GET`. The body is only
    /// attached for `POST`, `PUT` and `PATCH`, and only when non-empty.
    /// `default_headers` are applied first and `query_headers` overwrite
    /// them by name. `Content-Type: application/json` is added when a
    /// body is attached and no content type was given.
    pub fn new(
        base_url: &Url,
        endpoint: &str,
        method: Option<&str>,
        default_headers: &BTreeMap<String, String>,
        query_headers: &BTreeMap<String, String>,
        body: Option<&str>,
    ) -> Result<Self, Error> {
        let method = match method.map(str::trim).filter(|m| !m.is_empty()) {
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|_| Error::InvalidMethod(m.to_owned()))?,
            None => Method::GET,
        };

        let url = join_url(base_url, endpoint)?;

        let body = body
            .filter(|b| !b.is_empty())
            .filter(|_| matches!(method, Method::POST | Method::PUT | Method::PATCH))
            .map(str::to_owned);

        let mut headers = HeaderMap::new();
        for (name, value) in default_headers.iter().chain(query_headers) {
            let (name, value) = encode_header(name, value)?;
            headers.insert(name, value);
        }
        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }
}

fn encode_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), Error> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
            name: name.to_owned(),
            reason: e.to_string(),
        })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name: name.to_owned(),
        reason: e.to_string(),
    })?;
    Ok((header_name, header_value))
}

// ── Client ───────────────────────────────────────────────────────────

/// Executes [`RestRequest`]s and decodes the answer as arbitrary JSON.
pub struct RestClient<'a> {
    http: &'a reqwest::Client,
    auth: &'a AuthScheme,
}

impl<'a> RestClient<'a> {
    pub fn new(http: &'a reqwest::Client, auth: &'a AuthScheme) -> Self {
        Self { http, auth }
    }

    /// Send the request. Non-2xx answers and non-JSON bodies are errors.
    pub async fn execute(&self, request: RestRequest) -> Result<serde_json::Value, Error> {
        let RestRequest {
            method,
            url,
            mut headers,
            body,
        } = request;
        debug!(%method, %url, "REST request");

        self.auth.strip_conflicting(&mut headers);
        let mut req = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }
        let req = self.auth.apply(req);

        let resp = ensure_success(req.send().await?, BACKEND).await?;
        decode_json(resp).await
    }
}
