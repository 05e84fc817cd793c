// triplex-api: Async HTTP clients for Prometheus, Loki and JSON REST backends

pub mod auth;
pub mod error;
pub mod loki;
pub mod prometheus;
pub mod proxy;
pub mod rest;
pub mod transport;

pub use auth::{API_KEY_HEADER, AuthScheme, AuthStrategy, BasicAuth, Credentials};
pub use error::Error;
pub use loki::LokiClient;
pub use prometheus::PrometheusClient;
pub use proxy::{ProxyRequest, ProxyResponse};
pub use rest::{RestClient, RestRequest};
pub use transport::{TlsMode, TransportConfig};
