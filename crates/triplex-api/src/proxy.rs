// Raw passthrough to a backend.
//
// Method, headers, body and query string go out as given; status,
// headers and body come back as received. Only the configured auth
// scheme is layered on top.

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{CONTENT_LENGTH, HOST, HeaderMap};
use tracing::debug;
use url::Url;

use crate::auth::AuthScheme;
use crate::transport::join_url;
use crate::Error;

/// An inbound request to relay.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Path relative to the backend base URL.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    /// A bodiless `GET` for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

/// What the backend answered, untouched.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyResponse {
    /// A locally generated `{"error": "<message>"}` answer.
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        Self {
            status,
            headers,
            body: Bytes::from(body),
        }
    }
}

/// Relay `request` to `base_url`. Any upstream status is a success here;
/// only transport failures are errors.
pub async fn forward(
    http: &reqwest::Client,
    base_url: &Url,
    auth: &AuthScheme,
    request: ProxyRequest,
) -> Result<ProxyResponse, Error> {
    let ProxyRequest {
        method,
        path,
        query,
        mut headers,
        body,
    } = request;

    let mut url = join_url(base_url, &path)?;
    if let Some(query) = query.as_deref().filter(|q| !q.is_empty()) {
        url.set_query(Some(query));
    }
    debug!(%method, %url, "proxying request");

    // reqwest derives these from the target and body.
    headers.remove(HOST);
    headers.remove(CONTENT_LENGTH);
    auth.strip_conflicting(&mut headers);

    let mut req = http.request(method, url).headers(headers);
    if !body.is_empty() {
        req = req.body(body);
    }
    let resp = auth.apply(req).send().await?;

    let status = resp.status().as_u16();
    let headers = resp.headers().clone();
    let body = resp.bytes().await?;
    debug!(status, bytes = body.len(), "proxy response");

    Ok(ProxyResponse {
        status,
        headers,
        body,
    })
}
